mod config;

pub use config::{Config, MergeDefaults};
