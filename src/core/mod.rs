// src/core/mod.rs

pub mod dispatcher;
pub mod environment;
pub mod hierarchy;
pub mod mode;
pub mod paths;
pub mod project;
