//! Price history aggregation for pool charts
//!
//! Turns an ordered run of [`PriceHistoryPoint`]s into a chart series, the
//! period price change and the current price. Pure: the same inputs always
//! produce the same output.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use types::{AmmError, PriceEventKind, PriceHistoryPoint};

/// Chart window, measured back from "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1H")]
    OneHour,
    #[default]
    #[serde(rename = "24H")]
    OneDay,
    #[serde(rename = "7D")]
    SevenDays,
    #[serde(rename = "30D")]
    ThirtyDays,
    #[serde(rename = "ALL")]
    All,
}

impl TimeRange {
    pub const ALL_RANGES: [TimeRange; 5] = [
        Self::OneHour,
        Self::OneDay,
        Self::SevenDays,
        Self::ThirtyDays,
        Self::All,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneHour => "1H",
            Self::OneDay => "24H",
            Self::SevenDays => "7D",
            Self::ThirtyDays => "30D",
            Self::All => "ALL",
        }
    }

    /// Length of the window, `None` for the unbounded range
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::OneHour => Some(Duration::hours(1)),
            Self::OneDay => Some(Duration::hours(24)),
            Self::SevenDays => Some(Duration::days(7)),
            Self::ThirtyDays => Some(Duration::days(30)),
            Self::All => None,
        }
    }

    /// Inclusive lower bound of the window ending at `now`
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.duration() {
            Some(length) => now - length,
            None => Utc.timestamp_opt(0, 0).single().unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeRange {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_RANGES
            .into_iter()
            .find(|range| range.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| AmmError::InvalidTimeRange(s.to_string()))
    }
}

/// One chart sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: Decimal,
    pub reserve_a: Decimal,
    pub reserve_b: Decimal,
    pub kind: PriceEventKind,
    pub timestamp: DateTime<Utc>,
}

impl From<&PriceHistoryPoint> for PricePoint {
    fn from(point: &PriceHistoryPoint) -> Self {
        Self {
            price: point.price,
            reserve_a: point.reserve_a,
            reserve_b: point.reserve_b,
            kind: point.kind,
            timestamp: point.timestamp,
        }
    }
}

/// Change between the first and last point of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceChange {
    pub value: Decimal,
    pub percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub series: Vec<PricePoint>,
    pub price_change: PriceChange,
    pub current_price: Decimal,
}

/// Points inside `[start, end]`, ascending by timestamp then sequence
///
/// The returned iterator borrows `points` and can be cloned to restart it.
pub fn window<'a>(
    points: &'a [PriceHistoryPoint],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> impl Iterator<Item = &'a PriceHistoryPoint> + Clone + 'a {
    let mut ordered: Vec<&PriceHistoryPoint> = points
        .iter()
        .filter(move |point| point.timestamp >= start && point.timestamp <= end)
        .collect();
    // Equal timestamps fall back to the ledger-assigned sequence
    ordered.sort_by_key(|point| (point.timestamp, point.sequence));
    ordered.into_iter()
}

/// Percent change relative to `base`
///
/// Zero when `base` is not positive. A change too large for `Decimal`
/// saturates at `Decimal::MAX` (or `Decimal::MIN` for a drop).
fn change_percent(value: Decimal, base: Decimal) -> Decimal {
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    value
        .checked_div(base)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if value.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Chart series, price change and current price for a window
///
/// `live_price` is the current price when the window is empty. Never fails.
pub fn build_series(
    points: &[PriceHistoryPoint],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    live_price: Decimal,
) -> PriceSeries {
    let series: Vec<PricePoint> = window(points, start, end).map(PricePoint::from).collect();

    let price_change = match (series.first(), series.last()) {
        (Some(first), Some(last)) if series.len() >= 2 => {
            let value = last.price - first.price;
            PriceChange {
                value,
                percent: change_percent(value, first.price),
            }
        }
        _ => PriceChange::default(),
    };

    let current_price = series
        .last()
        .map(|point| point.price)
        .unwrap_or(live_price);

    PriceSeries {
        series,
        price_change,
        current_price,
    }
}
