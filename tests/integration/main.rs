//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against mock adapters.  All tests run on the host with no sensor or
//! storage required.

mod mock_ports;
mod scheduler_tests;
