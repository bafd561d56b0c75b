use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataShapeError;

pub const CARBON_DEADLINE: &str = "carbon_deadline_1";
pub const RENEWABLES: &str = "renewables_1";
pub const GREEN_CLIMATE_FUND: &str = "green_climate_fund_1";
pub const INDIGENOUS_LAND: &str = "indigenous_land_1";
pub const NEWSFEED: &str = "newsfeed_1";

/// Upstream key of the 30x30 initiative, exposed as [`GREEN_CLIMATE_FUND`].
pub const INITIATIVE_30X30: &str = "initiative_30x30";

/// The five modules the report is built from, keyed the way the rest of the crate sees them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClockSnapshot {
    #[serde(rename = "carbon_deadline_1")]
    pub carbon_deadline: TimerModule,
    #[serde(rename = "renewables_1")]
    pub renewables: RateModule,
    #[serde(rename = "green_climate_fund_1")]
    pub green_climate_fund: ValueModule,
    #[serde(rename = "indigenous_land_1")]
    pub indigenous_land: ValueModule,
    #[serde(rename = "newsfeed_1")]
    pub newsfeed: NewsfeedModule,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimerModule {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateModule {
    #[serde(default)]
    pub initial: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Percent per second.
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub unit_labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValueModule {
    /// Kept as the raw JSON number so it prints exactly as received.
    #[serde(default)]
    pub initial: Option<serde_json::Number>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub unit_labels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewsfeedModule {
    #[serde(default)]
    pub newsfeed: Vec<NewsItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    #[serde(default)]
    pub headline: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineInfo {
    pub timestamp: DateTime<Utc>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenewablesInfo {
    pub initial: f64,
    pub timestamp: DateTime<Utc>,
    pub rate: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticStat {
    pub initial: serde_json::Number,
    pub label: String,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsFeed {
    pub headlines: Vec<String>,
}

impl TimerModule {
    pub fn deadline_info(&self) -> Result<DeadlineInfo, DataShapeError> {
        let raw = required(CARBON_DEADLINE, "timestamp", self.timestamp.as_ref())?;

        Ok(DeadlineInfo {
            timestamp: parse_timestamp(CARBON_DEADLINE, raw)?,
            label: first(CARBON_DEADLINE, "labels", &self.labels)?,
        })
    }
}

impl RateModule {
    pub fn renewables_info(&self) -> Result<RenewablesInfo, DataShapeError> {
        let raw = required(RENEWABLES, "timestamp", self.timestamp.as_ref())?;

        Ok(RenewablesInfo {
            initial: *required(RENEWABLES, "initial", self.initial.as_ref())?,
            timestamp: parse_timestamp(RENEWABLES, raw)?,
            rate: *required(RENEWABLES, "rate", self.rate.as_ref())?,
            label: first(RENEWABLES, "labels", &self.labels)?,
        })
    }
}

impl ValueModule {
    /// `module` only names the module in errors.
    pub fn static_stat(&self, module: &'static str) -> Result<StaticStat, DataShapeError> {
        Ok(StaticStat {
            initial: required(module, "initial", self.initial.as_ref())?.clone(),
            label: first(module, "labels", &self.labels)?,
            unit: first(module, "unit_labels", &self.unit_labels)?,
        })
    }
}

impl NewsfeedModule {
    /// First `limit` headlines in feed order. A shorter feed yields fewer headlines.
    pub fn news_feed(&self, limit: usize) -> Result<NewsFeed, DataShapeError> {
        let headlines = self
            .newsfeed
            .iter()
            .take(limit)
            .map(|item| required(NEWSFEED, "headline", item.headline.as_ref()).cloned())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewsFeed { headlines })
    }
}

impl StaticStat {
    /// Value and unit with no separator, e.g. `40%`.
    pub fn value_with_unit(&self) -> String {
        format!("{}{}", self.initial, self.unit)
    }
}

impl RenewablesInfo {
    pub fn percent_at(&self, now: DateTime<Utc>) -> f64 {
        let elapsed = (now - self.timestamp).num_milliseconds() as f64 / 1000.0;
        self.rate * elapsed + self.initial
    }
}

/// Accepts RFC 3339 timestamps; naive ones are read as UTC.
pub fn parse_timestamp(module: &'static str, raw: &str) -> Result<DateTime<Utc>, DataShapeError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|ndt| ndt.and_utc())
        .map_err(|_| DataShapeError::InvalidTimestamp { module, value: raw.to_string() })
}

fn required<'a, T>(
    module: &'static str,
    field: &'static str,
    value: Option<&'a T>,
) -> Result<&'a T, DataShapeError> {
    value.ok_or(DataShapeError::MissingField { module, field })
}

fn first(
    module: &'static str,
    field: &'static str,
    list: &[String],
) -> Result<String, DataShapeError> {
    list.first().cloned().ok_or(DataShapeError::EmptyList { module, field })
}
