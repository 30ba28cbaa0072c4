mod common;
mod config_test;
mod exit_codes_test;
mod list_test;
mod resolve_test;
mod run_test;
