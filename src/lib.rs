pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod runners;
pub mod system;
