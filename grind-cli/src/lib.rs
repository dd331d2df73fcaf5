//! # grind-cli
//!
//! Argument parsing, the console transport, and the stdin message pump.

pub mod cli;
pub mod console;

pub use cli::{gem_command, load_base, parse_tiers, Cli, Commands};
pub use console::{parse_line, pump_stdin, ConsoleTransport, TypedLine};
