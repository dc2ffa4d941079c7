//! CLI interface module: command definitions, handlers, and output
//! formatting for the `muniops` binary.

pub mod commands;
pub mod output;
pub mod runtime;
