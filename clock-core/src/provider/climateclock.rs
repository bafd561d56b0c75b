use std::{collections::HashMap, time::Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    config::Config,
    error::RetrievalError,
    model::{
        CARBON_DEADLINE, ClockSnapshot, INDIGENOUS_LAND, INITIATIVE_30X30, NEWSFEED, RENEWABLES,
    },
};

use super::ClockProvider;

/// Fetches the clock from the Climate Clock HTTP API.
#[derive(Debug, Clone)]
pub struct ClimateClockApi {
    endpoint: String,
    http: Client,
}

impl ClimateClockApi {
    pub fn new(config: &Config) -> Result<Self, RetrievalError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("climate-clock/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RetrievalError::Client)?;

        Ok(Self { endpoint: config.endpoint.clone(), http })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ClockProvider for ClimateClockApi {
    async fn retrieve(&self) -> Result<ClockSnapshot, RetrievalError> {
        tracing::debug!(url = %self.endpoint, "requesting clock data");
        let started = Instant::now();

        let res = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|source| RetrievalError::Request { url: self.endpoint.clone(), source })?;

        let status = res.status();
        let body = res.text().await.map_err(RetrievalError::Body)?;

        tracing::debug!(
            %status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "clock response received"
        );

        if !status.is_success() {
            tracing::warn!(%status, "clock request was not successful");
            return Err(RetrievalError::Status { status, body: truncate_body(&body) });
        }

        parse_snapshot(&body)
    }
}

#[derive(Debug, Deserialize)]
struct CcEnvelope {
    data: CcData,
}

#[derive(Debug, Deserialize)]
struct CcData {
    modules: HashMap<String, serde_json::Value>,
}

/// Parse a clock response body and pick out the five modules the report uses.
///
/// `initiative_30x30` is exposed as `green_climate_fund_1`; any upstream module
/// that already carries that name is ignored.
pub fn parse_snapshot(body: &str) -> Result<ClockSnapshot, RetrievalError> {
    let envelope: CcEnvelope = serde_json::from_str(body).map_err(RetrievalError::Json)?;
    let mut modules = envelope.data.modules;

    Ok(ClockSnapshot {
        carbon_deadline: take_module(&mut modules, CARBON_DEADLINE)?,
        renewables: take_module(&mut modules, RENEWABLES)?,
        green_climate_fund: take_module(&mut modules, INITIATIVE_30X30)?,
        indigenous_land: take_module(&mut modules, INDIGENOUS_LAND)?,
        newsfeed: take_module(&mut modules, NEWSFEED)?,
    })
}

fn take_module<T: DeserializeOwned>(
    modules: &mut HashMap<String, serde_json::Value>,
    key: &'static str,
) -> Result<T, RetrievalError> {
    let value = modules.remove(key).ok_or(RetrievalError::MissingModule(key))?;
    serde_json::from_value(value).map_err(|source| RetrievalError::InvalidModule { module: key, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GREEN_CLIMATE_FUND;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    const FIXTURE: &str = include_str!("../../testdata/clock.json");

    fn fixture_without(key: &str) -> String {
        let mut value: serde_json::Value = serde_json::from_str(FIXTURE).unwrap();
        value["data"]["modules"].as_object_mut().unwrap().remove(key);
        value.to_string()
    }

    /// Serves exactly one canned HTTP response on a random local port.
    async fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let mut read = Vec::new();
            while !read.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                read.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/v1/clock")
    }

    fn api_for(endpoint: String) -> ClimateClockApi {
        let config = Config { endpoint, timeout_secs: 5, ..Config::default() };
        ClimateClockApi::new(&config).unwrap()
    }

    #[test]
    fn parses_fixture_and_rekeys_initiative() {
        let snapshot = parse_snapshot(FIXTURE).expect("fixture must parse");

        assert_eq!(
            snapshot.carbon_deadline.timestamp.as_deref(),
            Some("2029-07-22T16:00:03+00:00")
        );
        assert_eq!(snapshot.renewables.initial, Some(11.4));
        assert_eq!(snapshot.newsfeed.newsfeed.len(), 12);

        // exposed under the renamed key, taken from initiative_30x30
        assert_eq!(snapshot.green_climate_fund.labels[0], "LAND PROTECTED UNDER 30X30");
        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value.get(GREEN_CLIMATE_FUND).is_some());
        assert!(value.get(INITIATIVE_30X30).is_none());
    }

    #[test]
    fn every_required_module_is_checked() {
        for key in [CARBON_DEADLINE, RENEWABLES, INITIATIVE_30X30, INDIGENOUS_LAND, NEWSFEED] {
            let err = parse_snapshot(&fixture_without(key)).unwrap_err();
            match err {
                RetrievalError::MissingModule(missing) => assert_eq!(missing, key),
                other => panic!("expected MissingModule({key}), got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_json_is_a_retrieval_error() {
        assert!(matches!(parse_snapshot("<html>oops</html>"), Err(RetrievalError::Json(_))));
        assert!(matches!(parse_snapshot(r#"{"data": {}}"#), Err(RetrievalError::Json(_))));
    }

    #[test]
    fn wrongly_typed_module_is_a_retrieval_error() {
        let mut value: serde_json::Value = serde_json::from_str(FIXTURE).unwrap();
        value["data"]["modules"][RENEWABLES]["rate"] = "fast".into();

        let err = parse_snapshot(&value.to_string()).unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidModule { module: RENEWABLES, .. }));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);

        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn retrieve_fetches_and_parses() {
        let endpoint = serve_once("200 OK", FIXTURE.to_string()).await;

        let snapshot = api_for(endpoint).retrieve().await.expect("retrieve should succeed");
        assert_eq!(snapshot, parse_snapshot(FIXTURE).unwrap());
    }

    #[tokio::test]
    async fn retrieve_rejects_error_status() {
        let endpoint = serve_once("503 Service Unavailable", r#"{"status":"down"}"#.into()).await;

        let err = api_for(endpoint).retrieve().await.unwrap_err();
        match err {
            RetrievalError::Status { status, body } => {
                assert_eq!(status.as_u16(), 503);
                assert!(body.contains("down"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn retrieve_reports_missing_module() {
        let endpoint = serve_once("200 OK", fixture_without(NEWSFEED)).await;

        let err = api_for(endpoint).retrieve().await.unwrap_err();
        assert!(matches!(err, RetrievalError::MissingModule(NEWSFEED)));
    }
}
