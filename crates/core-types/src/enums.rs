use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side of the order
    pub fn opposite(&self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

/// The decision a strategy makes for the latest candle.
///
/// `Hold` means "no signal". Signals are consumed immediately by the
/// backtester and are never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

/// Why a DCA position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The profit target was reached.
    Profit,
    /// The stop loss was hit after every planned lot was filled.
    Loss,
    /// The candle series ended while the position was still open.
    Forced,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Profit => "profit",
            ExitReason::Loss => "loss",
            ExitReason::Forced => "forced",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one of the available entry strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyId {
    Rsi,
    Macd,
    Bollinger,
    ProximityBollinger,
    MultiSignal,
    HybridSmart,
}

impl StrategyId {
    pub const ALL: [StrategyId; 6] = [
        StrategyId::Rsi,
        StrategyId::Macd,
        StrategyId::Bollinger,
        StrategyId::ProximityBollinger,
        StrategyId::MultiSignal,
        StrategyId::HybridSmart,
    ];

    /// The identifier used in config files, CLI flags and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyId::Rsi => "rsi",
            StrategyId::Macd => "macd",
            StrategyId::Bollinger => "bollinger",
            StrategyId::ProximityBollinger => "proximity_bollinger",
            StrategyId::MultiSignal => "multi_signal",
            StrategyId::HybridSmart => "hybrid_smart",
        }
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        StrategyId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| CoreError::InvalidInput("strategy".to_string(), s.to_string()))
    }
}

/// Candle granularity. Drives Sharpe ratio annualisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
}

const MINUTES_PER_YEAR: u32 = 365 * 24 * 60;

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::ThreeMinutes => "3m",
            Interval::FiveMinutes => "5m",
            Interval::TenMinutes => "10m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1w",
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            Interval::OneMinute => 1,
            Interval::ThreeMinutes => 3,
            Interval::FiveMinutes => 5,
            Interval::TenMinutes => 10,
            Interval::FifteenMinutes => 15,
            Interval::ThirtyMinutes => 30,
            Interval::OneHour => 60,
            Interval::FourHours => 240,
            Interval::OneDay => 1440,
            Interval::OneWeek => 10080,
        }
    }

    /// Number of bars in one year, used to annualise periodic returns.
    ///
    /// Daily bars follow the trading-day convention (252), weekly bars use 52,
    /// and intraday bars assume a market that trades around the clock.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Interval::OneDay => 252,
            Interval::OneWeek => 52,
            intraday => MINUTES_PER_YEAR / intraday.minutes(),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1m" => Ok(Interval::OneMinute),
            "3m" => Ok(Interval::ThreeMinutes),
            "5m" => Ok(Interval::FiveMinutes),
            "10m" => Ok(Interval::TenMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "1h" | "60m" => Ok(Interval::OneHour),
            "4h" | "240m" => Ok(Interval::FourHours),
            "1d" | "day" => Ok(Interval::OneDay),
            "1w" | "week" => Ok(Interval::OneWeek),
            other => Err(CoreError::InvalidInput("interval".to_string(), other.to_string())),
        }
    }
}
