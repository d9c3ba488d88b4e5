//! Integration test modules.

mod hunt_flow_test;
mod progression_test;
mod skip_reset_test;
