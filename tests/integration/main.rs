//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the public API against the
//! simulated board.  All tests run on the host with no real hardware.

mod cycle_scenarios;
mod mock_hw;
mod sensor_tests;
