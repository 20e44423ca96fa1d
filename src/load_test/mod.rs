//! Load generator that simulates concurrent users hitting the gateway.
//!
//! - `config`: validated run parameters and target description
//! - `user`: a simulated user (request, think, repeat until the deadline)
//! - `metrics`: thread-safe aggregation of per-request outcomes
//! - `runner`: ramps users up, waits for them, produces the summary
//! - `report`: the serializable summary

pub mod config;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod user;

pub use config::{LoadTarget, LoadTestConfig, LoadTestError, LoadTestParams, WaitTime};
pub use metrics::LoadMetrics;
pub use report::{LoadTestResult, ResponseTimeStats};
pub use runner::LoadTestRunner;
pub use user::SimulatedUser;
