//! CLI subcommand implementations.

pub mod doctor;
pub mod onboard;
pub mod review;
pub mod run;
