#![allow(
    clippy::unwrap_used,
    clippy::panic,
    reason = "Standard test relaxations"
)]

mod end_to_end_tests;
mod error_tests;
mod property_tests;
