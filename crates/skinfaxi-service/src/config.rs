//! Service configuration.

use std::time::Duration;

/// Environment-backed configuration for the service.
///
/// The queue URL and timeout belong to the queue backend; the pipeline has
/// no internal timeout of its own, so a job that outlives
/// [`job_timeout`](Self::job_timeout) is failed by the queue, not by us.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Connection endpoint of the job queue backend.
    pub queue_url: String,
    /// Shot count used when a request does not specify one.
    pub default_shots: u32,
    /// Queue-side execution budget per job, in seconds.
    pub job_timeout_secs: u64,
}

impl ServiceConfig {
    /// Read configuration from the environment, falling back to defaults.
    ///
    /// Variables: `QUEUE_URL`, `DEFAULT_SHOTS`, `JOB_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            queue_url: std::env::var("QUEUE_URL").unwrap_or(defaults.queue_url),
            default_shots: env_parse("DEFAULT_SHOTS").unwrap_or(defaults.default_shots),
            job_timeout_secs: env_parse("JOB_TIMEOUT_SECS").unwrap_or(defaults.job_timeout_secs),
        }
    }

    /// The queue-side execution budget as a duration.
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            queue_url: "redis://localhost:5040".to_string(),
            default_shots: 1024,
            job_timeout_secs: 3600,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
