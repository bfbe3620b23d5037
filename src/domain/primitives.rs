//! Domain primitives: TimeMs, Symbol, Side, TimeDimension.

use serde::{Deserialize, Serialize};

/// Time in milliseconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeMs(pub i64);

impl TimeMs {
    /// Create a TimeMs from milliseconds.
    pub fn new(ms: i64) -> Self {
        TimeMs(ms)
    }

    /// Current wall-clock time.
    pub fn now() -> Self {
        TimeMs(chrono::Utc::now().timestamp_millis())
    }

    /// Get the underlying milliseconds value.
    pub fn as_ms(&self) -> i64 {
        self.0
    }
}

/// Instrument identifier (e.g., "BTCUSDT").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a Symbol from a string.
    pub fn new(symbol: impl Into<String>) -> Self {
        Symbol(symbol.into())
    }

    /// Get the symbol as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trade side: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy side (adds long exposure).
    Buy,
    /// Sell side (adds short exposure).
    Sell,
}

impl Side {
    /// Get the signed multiplier for this side (+1.0 for Buy, -1.0 for Sell).
    pub fn sign(&self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Query window for the equity curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeDimension {
    /// Trailing day.
    Day,
    /// Trailing 30 days.
    Month,
    /// Trailing year.
    Year,
}

impl TimeDimension {
    /// Length of the query window in days.
    pub fn days(&self) -> i64 {
        match self {
            TimeDimension::Day => 1,
            TimeDimension::Month => 30,
            TimeDimension::Year => 365,
        }
    }

    /// Maximum number of equity points emitted for this window.
    pub fn point_cap(&self) -> usize {
        match self {
            TimeDimension::Day => 24,
            TimeDimension::Month => 30,
            TimeDimension::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeDimension::Day => "day",
            TimeDimension::Month => "month",
            TimeDimension::Year => "year",
        }
    }
}

impl std::str::FromStr for TimeDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(TimeDimension::Day),
            "month" => Ok(TimeDimension::Month),
            "year" => Ok(TimeDimension::Year),
            other => Err(format!("unknown time dimension: {}", other)),
        }
    }
}

impl std::fmt::Display for TimeDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
