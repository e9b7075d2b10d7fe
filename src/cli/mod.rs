pub mod args;
mod commands;
pub mod output;

pub use commands::{execute, run_cli};
