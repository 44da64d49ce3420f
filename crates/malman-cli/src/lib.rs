pub mod cli;
pub mod commands;
pub mod config;
pub mod formatting;
pub mod logging;
