//! NLU client configuration with documented constants

use std::time::Duration;

/// Configuration for the NLU service client
///
/// Endpoint and key are deployment-specific and come from the
/// environment; the timeout has a conservative default so a slow NLU
/// backend cannot stall a slot-filling turn indefinitely.
#[derive(Debug, Clone)]
pub struct NluConfig {
    /// Base URL of the NLU prediction endpoint
    pub endpoint: String,

    /// Subscription/API key sent with every query
    pub api_key: String,

    /// Hard request timeout, enforced at the HTTP client level
    ///
    /// A query that exceeds this is reported as an NLU error; the
    /// in-progress action instance is left untouched.
    pub timeout: Duration,
}

impl NluConfig {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            endpoint,
            api_key,
            timeout: Duration::from_secs(5),
        }
    }

    /// Create a config from environment variables
    ///
    /// Required: NLU_ENDPOINT, NLU_API_KEY
    /// Optional: NLU_TIMEOUT_SECS (defaults to 5)
    pub fn from_env() -> crate::core::error::Result<Self> {
        use crate::core::error::BindError;

        let endpoint = std::env::var("NLU_ENDPOINT")
            .map_err(|_| BindError::InvalidArgument("NLU_ENDPOINT not set".into()))?;
        let api_key = std::env::var("NLU_API_KEY")
            .map_err(|_| BindError::InvalidArgument("NLU_API_KEY not set".into()))?;
        let timeout = std::env::var("NLU_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));

        Ok(Self {
            endpoint,
            api_key,
            timeout,
        })
    }
}
