//! Crate-level suites exercising the terminal classification boundary.
