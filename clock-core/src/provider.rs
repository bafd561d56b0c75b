use crate::{Config, error::RetrievalError, model::ClockSnapshot};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod climateclock;

pub use climateclock::{ClimateClockApi, parse_snapshot};

/// A source of clock snapshots.
#[async_trait]
pub trait ClockProvider: Send + Sync + Debug {
    /// One fetch; fails before anything is rendered.
    async fn retrieve(&self) -> Result<ClockSnapshot, RetrievalError>;
}

/// Construct the provider described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn ClockProvider>, RetrievalError> {
    Ok(Box::new(ClimateClockApi::new(config)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_default_config_builds() {
        let provider = provider_from_config(&Config::default());
        assert!(provider.is_ok());
    }

    #[test]
    fn api_uses_configured_endpoint() {
        let cfg = Config { endpoint: "http://localhost:1234/clock".into(), ..Config::default() };
        let api = ClimateClockApi::new(&cfg).unwrap();

        assert_eq!(api.endpoint(), "http://localhost:1234/clock");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let cfg = Config {
            endpoint: "http://127.0.0.1:9/v1/clock".into(),
            timeout_secs: 2,
            ..Config::default()
        };
        let provider = provider_from_config(&cfg).unwrap();

        let err = provider.retrieve().await.unwrap_err();
        assert!(matches!(err, RetrievalError::Request { .. }), "got {err:?}");
    }
}
