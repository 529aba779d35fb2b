//! Name registry and calculator configuration
//!
//! The environment answers the lexer's and evaluator's name lookups and supplies the
//! numeric settings (output mode, decimal scale, long-division cap). It is read-only
//! while an expression is being evaluated; definitions happen between evaluations.
//!
//! # Example
//! ```
//! use symcalc::{Environment, OutputMode};
//!
//! let mut env = Environment::new()
//!     .with_output_mode(OutputMode::Exact)
//!     .with_max_division_iterations(50);
//! env.define_variable("x").unwrap();
//! assert!(env.has_variable("x"));
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::parser::{self, Operator, TokenKind};
use crate::{CalcError, Combinable, Number, NumberForm, Symbol};

/// Default digits kept by non-terminating decimal quotients
pub const DEFAULT_DECIMAL_SCALE: u32 = 12;
/// Default cap on polynomial long-division steps
pub const DEFAULT_DIVISION_ITERATIONS: usize = 25;

/// How numeric literals are read and presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Decimal literals and rounded decimal quotients
    #[default]
    Approximate,
    /// Literals become exact fractions
    Exact,
}

impl OutputMode {
    /// Number form given to literals read in this mode
    pub fn number_form(self) -> NumberForm {
        match self {
            OutputMode::Approximate => NumberForm::Decimal,
            OutputMode::Exact => NumberForm::Fraction,
        }
    }
}

/// Registered symbolic function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: Arc<str>,
    pub arity: usize,
    /// LaTeX command used for the function name, e.g. `\sin`
    pub markup: Arc<str>,
}

/// Registered constant with its fixed value
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDef {
    pub name: Arc<str>,
    pub value: Number,
    pub markup: Arc<str>,
}

impl ConstantDef {
    pub fn symbol(&self) -> Symbol {
        Symbol::Constant {
            name: self.name.clone(),
            markup: self.markup.clone(),
        }
    }
}

/// Registered variable: unbound indeterminate or bound to a value
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDef {
    pub name: Arc<str>,
    pub value: Option<Combinable>,
}

impl VariableDef {
    pub fn symbol(&self) -> Symbol {
        Symbol::Variable(self.name.clone())
    }

    /// The value a reference to this variable evaluates to
    pub fn resolve(&self) -> Combinable {
        self.value
            .clone()
            .unwrap_or_else(|| Combinable::symbol(self.symbol()))
    }
}

/// Operator/function/variable registry plus numeric configuration
#[derive(Debug, Clone)]
pub struct Environment {
    functions: FxHashMap<String, FunctionDef>,
    variables: FxHashMap<String, VariableDef>,
    constants: FxHashMap<String, ConstantDef>,
    output_mode: OutputMode,
    decimal_scale: u32,
    max_division_iterations: usize,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Environment with the built-in functions (`sin`, `cos`) and constant (`pi`)
    pub fn new() -> Self {
        let mut env = Self::empty();
        env.functions.insert("sin".into(), builtin_function("sin", "\\sin"));
        env.functions.insert("cos".into(), builtin_function("cos", "\\cos"));
        let pi = ConstantDef {
            name: "pi".into(),
            value: Number::parse_decimal("3.14159", NumberForm::Decimal)
                .unwrap_or_else(Number::zero),
            markup: "\\pi ".into(),
        };
        env.constants.insert("pi".into(), pi);
        env
    }

    /// Environment with operators only
    pub fn empty() -> Self {
        Environment {
            functions: FxHashMap::default(),
            variables: FxHashMap::default(),
            constants: FxHashMap::default(),
            output_mode: OutputMode::default(),
            decimal_scale: DEFAULT_DECIMAL_SCALE,
            max_division_iterations: DEFAULT_DIVISION_ITERATIONS,
        }
    }

    // ===== Configuration =====

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn with_decimal_scale(mut self, scale: u32) -> Self {
        self.decimal_scale = scale;
        self
    }

    pub fn with_max_division_iterations(mut self, iterations: usize) -> Self {
        self.max_division_iterations = iterations;
        self
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn set_decimal_scale(&mut self, scale: u32) {
        self.decimal_scale = scale;
    }

    pub fn set_max_division_iterations(&mut self, iterations: usize) {
        self.max_division_iterations = iterations;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    pub fn decimal_scale(&self) -> u32 {
        self.decimal_scale
    }

    pub fn max_division_iterations(&self) -> usize {
        self.max_division_iterations
    }

    // ===== Queries =====

    pub fn has_operator(&self, name: &str) -> bool {
        Operator::from_symbol(name).is_some()
    }

    pub fn operator(&self, name: &str) -> Option<Operator> {
        Operator::from_symbol(name)
    }

    /// The user-visible operators, in lexing order
    pub fn all_operators(&self) -> &'static [Operator] {
        &Operator::VISIBLE
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name)
    }

    pub fn all_functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.functions.values()
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableDef> {
        self.variables.get(name)
    }

    pub fn all_variables(&self) -> impl Iterator<Item = &VariableDef> {
        self.variables.values()
    }

    pub fn has_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    pub fn constant(&self, name: &str) -> Option<&ConstantDef> {
        self.constants.get(name)
    }

    /// Variable and constant names, longest first so the lexer prefers `sint` over `s`
    pub(crate) fn symbol_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .variables
            .keys()
            .chain(self.constants.keys())
            .map(String::as_str)
            .collect();
        names.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        names
    }

    /// Function names, longest first
    pub(crate) fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        names
    }

    // ===== Definitions =====

    /// Register an unbound variable
    ///
    /// # Errors
    /// `NameCollision` if the name is taken by a function or constant, `Syntax` if the
    /// name is not an identifier.
    pub fn define_variable(&mut self, name: &str) -> Result<(), CalcError> {
        self.check_name(name, NameKind::Variable)?;
        log::debug!("defining variable {name}");
        self.variables.insert(
            name.to_string(),
            VariableDef {
                name: name.into(),
                value: None,
            },
        );
        Ok(())
    }

    /// Bind a variable to the value of `text`, evaluated in this environment
    ///
    /// A single token is bound directly and must be a value; anything longer runs
    /// through the full pipeline.
    ///
    /// # Errors
    /// `Type` when the text is a lone operator, parenthesis, comma or function name;
    /// any pipeline error otherwise.
    pub fn bind_variable(&mut self, name: &str, text: &str) -> Result<(), CalcError> {
        self.check_name(name, NameKind::Variable)?;
        let tokens = parser::tokenize(text, self)?;
        let value = match tokens.as_slice() {
            [single] => match &single.kind {
                TokenKind::Value(value) => value.clone(),
                _ => return Err(CalcError::type_mismatch(name, single.to_string())),
            },
            _ => crate::evaluate_str(text, self)?,
        };
        self.bind_variable_value(name, value)
    }

    /// Bind a variable to an already evaluated value
    ///
    /// # Errors
    /// `NameCollision` if the name is taken by a function or constant.
    pub fn bind_variable_value(&mut self, name: &str, value: Combinable) -> Result<(), CalcError> {
        self.check_name(name, NameKind::Variable)?;
        log::debug!("binding variable {name} = {value}");
        self.variables.insert(
            name.to_string(),
            VariableDef {
                name: name.into(),
                value: Some(value),
            },
        );
        Ok(())
    }

    /// Remove a variable; returns whether it existed
    pub fn undefine_variable(&mut self, name: &str) -> bool {
        self.variables.remove(name).is_some()
    }

    /// Register a constant with a fixed value
    ///
    /// # Errors
    /// `NameCollision` if the name is taken by a function or variable.
    pub fn define_constant(
        &mut self,
        name: &str,
        value: Number,
        markup: Option<&str>,
    ) -> Result<(), CalcError> {
        self.check_name(name, NameKind::Constant)?;
        self.constants.insert(
            name.to_string(),
            ConstantDef {
                name: name.into(),
                value,
                markup: markup.unwrap_or(name).into(),
            },
        );
        Ok(())
    }

    /// Register a symbolic function of fixed arity
    ///
    /// # Errors
    /// `NameCollision` if the name is taken by a variable or constant; `Syntax` for a
    /// zero arity or a non-identifier name.
    pub fn define_function(
        &mut self,
        name: &str,
        arity: usize,
        markup: Option<&str>,
    ) -> Result<(), CalcError> {
        self.check_name(name, NameKind::Function)?;
        if arity == 0 {
            return Err(CalcError::syntax(format!(
                "Function \"{name}\" must take at least one argument"
            )));
        }
        let markup = markup.map_or_else(|| format!("\\operatorname{{{name}}}"), str::to_string);
        self.functions.insert(
            name.to_string(),
            FunctionDef {
                name: name.into(),
                arity,
                markup: markup.into(),
            },
        );
        Ok(())
    }

    fn check_name(&self, name: &str, kind: NameKind) -> Result<(), CalcError> {
        let mut chars = name.chars();
        let valid = chars.next().is_some_and(char::is_alphabetic)
            && chars.all(|c| c.is_alphanumeric() || c == '_');
        if !valid {
            return Err(CalcError::syntax(format!("Invalid name \"{name}\"")));
        }

        let taken = match kind {
            NameKind::Variable => self.has_function(name) || self.has_constant(name),
            NameKind::Constant => self.has_function(name) || self.has_variable(name),
            NameKind::Function => self.has_variable(name) || self.has_constant(name),
        };
        if taken {
            return Err(CalcError::NameCollision {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum NameKind {
    Variable,
    Constant,
    Function,
}

fn builtin_function(name: &str, markup: &str) -> FunctionDef {
    FunctionDef {
        name: name.into(),
        arity: 1,
        markup: markup.into(),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let env = Environment::new();
        assert!(env.has_function("sin"));
        assert!(env.has_function("cos"));
        assert!(env.has_constant("pi"));
        assert!(env.has_operator("^"));
        assert!(!env.has_operator("%"));
        assert_eq!(env.function("sin").map(|f| f.arity), Some(1));
        assert_eq!(env.output_mode(), OutputMode::Approximate);
        assert_eq!(env.decimal_scale(), 12);
        assert_eq!(env.max_division_iterations(), 25);
    }

    #[test]
    fn test_name_collision() {
        let mut env = Environment::new();
        assert!(matches!(
            env.define_variable("sin"),
            Err(CalcError::NameCollision { .. })
        ));
        assert!(matches!(
            env.define_variable("pi"),
            Err(CalcError::NameCollision { .. })
        ));
        assert!(env.define_variable("2x").is_err());
    }

    #[test]
    fn test_symbol_names_longest_first() {
        let mut env = Environment::empty();
        env.define_variable("s").unwrap();
        env.define_variable("sint").unwrap();
        env.define_variable("x").unwrap();
        assert_eq!(env.symbol_names(), vec!["sint", "s", "x"]);
    }

    #[test]
    fn test_bind_variable_single_value() {
        let mut env = Environment::new().with_output_mode(OutputMode::Exact);
        env.bind_variable("y", "5").unwrap();
        let y = env.variable("y").unwrap().resolve();
        assert_eq!(y.as_number(), Some(Number::from_integer(5)));
    }

    #[test]
    fn test_bind_variable_rejects_operator() {
        let mut env = Environment::new();
        let err = env.bind_variable("y", "+").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Type mismatch for y. Expected type Combinable, but found +"
        );
    }

    #[test]
    fn test_bind_variable_expression() {
        let mut env = Environment::new().with_output_mode(OutputMode::Exact);
        env.define_variable("x").unwrap();
        env.bind_variable("y", "(x+1)(x+1)").unwrap();
        assert_eq!(env.variable("y").unwrap().resolve().to_string(), "x^2+2x+1");
    }

    #[test]
    fn test_define_function() {
        let mut env = Environment::new();
        env.define_function("f", 2, None).unwrap();
        assert_eq!(env.function("f").unwrap().markup.as_ref(), "\\operatorname{f}");
        assert!(env.define_function("g", 0, None).is_err());
    }
}
