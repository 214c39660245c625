//! Enum types for stats requests

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metric family a stats request asks for.
///
/// Each metric type owns one model shape; the cache keys slots by
/// `(site, metric, granularity, date)` so different metrics never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricType {
    Referrers,
    SearchTerms,
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            MetricType::Referrers => "referrers",
            MetricType::SearchTerms => "search_terms",
        };
        write!(f, "{}", value)
    }
}

/// Time bucket size for a stats period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    Days,
    Weeks,
    Months,
    Years,
}

impl Granularity {
    /// Path segment used by upstream stats endpoints.
    pub fn as_period_str(&self) -> &'static str {
        match self {
            Granularity::Days => "day",
            Granularity::Weeks => "week",
            Granularity::Months => "month",
            Granularity::Years => "year",
        }
    }

    pub fn from_period_str(s: &str) -> Result<Self, GranularityParseError> {
        match s {
            "day" => Ok(Granularity::Days),
            "week" => Ok(Granularity::Weeks),
            "month" => Ok(Granularity::Months),
            "year" => Ok(Granularity::Years),
            other => Err(GranularityParseError(other.to_string())),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_period_str())
    }
}

impl FromStr for Granularity {
    type Err = GranularityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_period_str(s)
    }
}

/// Error when parsing an invalid granularity string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GranularityParseError(pub String);

impl fmt::Display for GranularityParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid granularity: {}", self.0)
    }
}

impl std::error::Error for GranularityParseError {}
