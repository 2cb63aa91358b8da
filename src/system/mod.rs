//! # System Interaction Layer
//!
//! The boundary between the dispatch core and the operating system.
//!
//! - **`executor`**: spawns external processes strictly sequentially and
//!   turns nonzero exit statuses into explicit errors.
//! - **`tools`**: probes `PATH` for the backend binaries (docker-compose,
//!   kubectl, helm) at dispatcher construction time.

pub mod executor;
pub mod tools;
