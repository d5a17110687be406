//! Engine and builder test suites.

mod builder_tests;
mod stack_tests;
