//! Configuration structs for load test runs.

use rand::Rng;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::LoadTestSettings;

/// Path that simulated users request unless told otherwise
pub const DEFAULT_PATH: &str = "/api/";

/// Per-request timeout for simulated users
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest accepted run, in seconds (one year)
pub const MAX_TEST_TIME: i64 = 365 * 24 * 60 * 60;

/// Load test parameter validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadTestError {
    #[error("{field} must be greater than 0 (got {value})")]
    NotPositive { field: &'static str, value: i64 },

    #[error("{field} is too large (got {value})")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("test_time must be at most {max} seconds (got {value})")]
    TooLong { value: u64, max: u64 },
}

/// Raw query parameters of `GET /api/load-test`
///
/// Signed so that negative input reaches validation instead of failing to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LoadTestParams {
    pub users: i64,
    pub spawn_rate: i64,
    pub test_time: i64,
}

/// Validated load test parameters. All three values are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTestConfig {
    users: u32,
    spawn_rate: u32,
    test_time: u64,
}

impl LoadTestConfig {
    pub fn new(users: i64, spawn_rate: i64, test_time: i64) -> Result<Self, LoadTestError> {
        Ok(Self {
            users: positive_u32("users", users)?,
            spawn_rate: positive_u32("spawn_rate", spawn_rate)?,
            test_time: bounded_test_time(test_time)?,
        })
    }

    /// Number of simulated users to start
    pub fn users(&self) -> u32 {
        self.users
    }

    /// Users started per second during ramp-up
    pub fn spawn_rate(&self) -> u32 {
        self.spawn_rate
    }

    /// Run duration in seconds
    pub fn test_time(&self) -> u64 {
        self.test_time
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.test_time)
    }

    /// Delay between two consecutive user spawns
    pub fn spawn_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.spawn_rate as f64)
    }

    /// Reject runs longer than `max` seconds
    pub fn ensure_max_duration(&self, max: u64) -> Result<(), LoadTestError> {
        if self.test_time > max {
            return Err(LoadTestError::TooLong {
                value: self.test_time,
                max,
            });
        }
        Ok(())
    }
}

impl TryFrom<LoadTestParams> for LoadTestConfig {
    type Error = LoadTestError;

    fn try_from(params: LoadTestParams) -> Result<Self, Self::Error> {
        Self::new(params.users, params.spawn_rate, params.test_time)
    }
}

fn positive(field: &'static str, value: i64) -> Result<i64, LoadTestError> {
    if value <= 0 {
        return Err(LoadTestError::NotPositive { field, value });
    }
    Ok(value)
}

fn bounded_test_time(value: i64) -> Result<u64, LoadTestError> {
    let value = positive("test_time", value)?;
    if value > MAX_TEST_TIME {
        return Err(LoadTestError::OutOfRange {
            field: "test_time",
            value,
        });
    }
    Ok(value as u64)
}

fn positive_u32(field: &'static str, value: i64) -> Result<u32, LoadTestError> {
    let value = positive(field, value)?;
    u32::try_from(value).map_err(|_| LoadTestError::OutOfRange { field, value })
}

/// Uniformly random pause between two requests of one user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitTime {
    min: Duration,
    max: Duration,
}

impl WaitTime {
    /// Wait between `min` and `max` (inclusive). Bounds are swapped if inverted.
    pub fn between(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn constant(wait: Duration) -> Self {
        Self::between(wait, wait)
    }

    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

/// Where simulated users send traffic and how they pace it
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTarget {
    /// Base URL without trailing slash, e.g. `http://127.0.0.1:8000`
    pub base_url: String,
    /// Request path, e.g. `/api/`
    pub path: String,
    pub wait: WaitTime,
    pub request_timeout: Duration,
}

impl LoadTarget {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path: DEFAULT_PATH.to_string(),
            wait: WaitTime::between(Duration::from_secs(1), Duration::from_secs(2)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Target described by the gateway configuration
    pub fn from_settings(settings: &LoadTestSettings) -> Self {
        Self {
            wait: WaitTime::between(settings.wait_min, settings.wait_max),
            ..Self::new(settings.target_url.clone())
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path: String = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    pub fn with_wait(mut self, wait: WaitTime) -> Self {
        self.wait = wait;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL requested by each user
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_config_round_trips() {
        let config = LoadTestConfig::new(10, 2, 30).unwrap();
        assert_eq!(config.users(), 10);
        assert_eq!(config.spawn_rate(), 2);
        assert_eq!(config.test_time(), 30);
    }

    #[test]
    fn test_negative_users_rejected() {
        let err = LoadTestConfig::new(-1, 2, 30).unwrap_err();
        assert_eq!(
            err,
            LoadTestError::NotPositive {
                field: "users",
                value: -1
            }
        );
        assert_eq!(err.to_string(), "users must be greater than 0 (got -1)");
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(LoadTestConfig::new(1, 0, 30).is_err());
        assert!(LoadTestConfig::new(1, 1, 0).is_err());
    }

    #[test]
    fn test_users_out_of_range() {
        let err = LoadTestConfig::new(i64::from(u32::MAX) + 1, 1, 1).unwrap_err();
        assert!(matches!(err, LoadTestError::OutOfRange { field: "users", .. }));
    }

    #[test]
    fn test_test_time_out_of_range() {
        let err = LoadTestConfig::new(1, 1, i64::MAX).unwrap_err();
        assert_eq!(
            err,
            LoadTestError::OutOfRange {
                field: "test_time",
                value: i64::MAX
            }
        );
        assert!(LoadTestConfig::new(1, 1, MAX_TEST_TIME + 1).is_err());
        assert_eq!(
            LoadTestConfig::new(1, 1, MAX_TEST_TIME).unwrap().test_time(),
            MAX_TEST_TIME as u64
        );
    }

    #[test]
    fn test_try_from_params() {
        let params = LoadTestParams {
            users: 2,
            spawn_rate: 1,
            test_time: 2,
        };
        let config = LoadTestConfig::try_from(params).unwrap();
        assert_eq!(config.users(), 2);
    }

    #[test]
    fn test_spawn_interval() {
        let config = LoadTestConfig::new(10, 4, 30).unwrap();
        assert_eq!(config.spawn_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_ensure_max_duration() {
        let config = LoadTestConfig::new(1, 1, 601).unwrap();
        assert_eq!(
            config.ensure_max_duration(600),
            Err(LoadTestError::TooLong { value: 601, max: 600 })
        );
        assert!(config.ensure_max_duration(601).is_ok());
    }

    #[test]
    fn test_wait_time_sample_in_bounds() {
        let wait = WaitTime::between(Duration::from_millis(100), Duration::from_millis(200));
        for _ in 0..100 {
            let sample = wait.sample();
            assert!(sample >= Duration::from_millis(100));
            assert!(sample <= Duration::from_millis(200));
        }
    }

    #[test]
    fn test_wait_time_inverted_bounds() {
        let wait = WaitTime::between(Duration::from_millis(200), Duration::from_millis(100));
        assert_eq!(
            wait,
            WaitTime::between(Duration::from_millis(100), Duration::from_millis(200))
        );
    }

    #[test]
    fn test_target_url() {
        let target = LoadTarget::new("http://localhost:8000/");
        assert_eq!(target.url(), "http://localhost:8000/api/");

        let target = target.with_path("health");
        assert_eq!(target.url(), "http://localhost:8000/health");
    }

    #[test]
    fn test_target_from_settings() {
        let settings = LoadTestSettings {
            target_url: "http://127.0.0.1:9000".to_string(),
            wait_min: Duration::from_millis(10),
            wait_max: Duration::from_millis(20),
            max_duration: 60,
        };
        let target = LoadTarget::from_settings(&settings);
        assert_eq!(target.url(), "http://127.0.0.1:9000/api/");
        assert_eq!(
            target.wait,
            WaitTime::between(Duration::from_millis(10), Duration::from_millis(20))
        );
    }

    proptest! {
        #[test]
        fn prop_positive_values_accepted(
            users in 1i64..=10_000,
            spawn_rate in 1i64..=1_000,
            test_time in 1i64..=86_400,
        ) {
            let config = LoadTestConfig::new(users, spawn_rate, test_time).unwrap();
            prop_assert_eq!(i64::from(config.users()), users);
            prop_assert_eq!(i64::from(config.spawn_rate()), spawn_rate);
            prop_assert_eq!(config.test_time() as i64, test_time);
        }

        #[test]
        fn prop_non_positive_value_rejected(
            bad in i64::MIN..=0,
            position in 0usize..3,
        ) {
            let mut values = [5i64, 5, 5];
            values[position] = bad;
            prop_assert!(LoadTestConfig::new(values[0], values[1], values[2]).is_err());
        }
    }
}
