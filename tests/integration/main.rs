#[path = "../common/mod.rs"]
mod common;

mod environment_tests;
mod session_tests;
