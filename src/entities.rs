use anyhow::{Result, anyhow, bail};
use chrono::{Duration, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Weight Entry
// ============================================================================

/// One dated body-weight measurement. `date` is the collection key and is
/// kept as the ISO string it was written with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub date: String,
    pub weight: f64,
}

impl WeightEntry {
    pub fn new(date: impl Into<String>, weight: f64) -> Self {
        Self {
            date: date.into(),
            weight,
        }
    }

    pub fn on(date: NaiveDate, weight: f64) -> Self {
        Self::new(date_key(date), weight)
    }

    /// Calendar date of the entry, if the key is a well-formed ISO date.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }

    pub fn rounded(mut self) -> Self {
        self.weight = round_weight(self.weight);
        self
    }
}

impl fmt::Display for WeightEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  {:.1} kg", self.date, self.weight)
    }
}

/// The collection key for a calendar date.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Rounds the exact binary value to two decimals, ties away from zero.
/// Values too large for a decimal are returned unchanged.
pub fn round_weight(weight: f64) -> f64 {
    Decimal::from_f64_retain(weight)
        .map(|exact| exact.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_string().parse::<f64>().ok())
        .filter(|rounded| rounded.is_finite())
        .unwrap_or(weight)
}

// ============================================================================
// Import Record
// ============================================================================

/// An incoming record that has not been validated yet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportRecord {
    pub date: Option<String>,
    pub weight: Option<f64>,
}

impl ImportRecord {
    pub fn new(date: impl Into<String>, weight: f64) -> Self {
        Self {
            date: Some(date.into()),
            weight: Some(weight),
        }
    }

    /// Reads a JSON element. Only a string `date` and a numeric `weight`
    /// are taken; anything else leaves the field empty.
    pub fn from_value(value: &Value) -> Self {
        Self {
            date: value.get("date").and_then(Value::as_str).map(str::to_string),
            weight: value.get("weight").and_then(Value::as_f64),
        }
    }

    /// The entry this record describes, if it is acceptable for a merge.
    pub fn validated(&self) -> Option<WeightEntry> {
        let date = self.date.as_deref().filter(|d| !d.is_empty())?;
        let weight = self.weight.filter(|w| w.is_finite())?;
        Some(WeightEntry::new(date, weight))
    }
}

impl From<WeightEntry> for ImportRecord {
    fn from(entry: WeightEntry) -> Self {
        Self {
            date: Some(entry.date),
            weight: Some(entry.weight),
        }
    }
}

// ============================================================================
// Input Boundary Validation
// ============================================================================

pub fn parse_entry_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|e| anyhow!("invalid date '{}' (expected YYYY-MM-DD): {}", input, e))
}

/// Parses a user-typed weight. Accepts `,` as decimal separator and rejects
/// anything that is not a positive finite number.
pub fn parse_weight_input(input: &str) -> Result<f64> {
    let normalized = input.trim().replace(',', ".");
    let weight: f64 = normalized
        .parse()
        .map_err(|_| anyhow!("invalid weight '{}'", input))?;

    if !weight.is_finite() || weight <= 0.0 {
        bail!("weight must be a positive number, got '{}'", input);
    }
    Ok(weight)
}

// ============================================================================
// Filter Period
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPeriod {
    Month,
    ThreeMonths,
    Year,
    All,
}

impl FilterPeriod {
    /// First date included by the period, counted back from `today`.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            FilterPeriod::Month => Some(today - Duration::days(30)),
            FilterPeriod::ThreeMonths => Some(today - Duration::days(90)),
            FilterPeriod::Year => today.checked_sub_months(Months::new(12)),
            FilterPeriod::All => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterPeriod::Month => "last 30 days",
            FilterPeriod::ThreeMonths => "last 90 days",
            FilterPeriod::Year => "last year",
            FilterPeriod::All => "all time",
        }
    }
}
