//! `taskbridge` - task breakdowns through a command-line AI tool
//!
//! Drives a locally installed AI CLI as a subprocess and turns its free-form
//! answers into validated task data.

pub mod cli;
pub mod core;
pub mod fs;
