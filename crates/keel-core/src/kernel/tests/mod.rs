pub mod common;
pub mod chain_tests;
