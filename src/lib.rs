pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod merge;
pub mod trace;
pub mod types;
