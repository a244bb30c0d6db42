pub mod end_to_end_tests;
pub mod overflow_tests;
pub mod shutdown_tests;
