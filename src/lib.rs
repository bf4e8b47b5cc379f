pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod terminal;
pub mod types;
pub mod utils;
