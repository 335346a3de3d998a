//! Synthetic property valuation series for the dashboard chart.
//!
//! Values follow a fixed market-trend formula with a little random variance;
//! nothing is fetched from a real valuation source.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use rand::{Rng, SeedableRng, rngs::StdRng};
use time::{Date, Month};
use tracing::debug;

use crate::models::PropertyRecord;

pub const APARTMENT_TYPE: &str = "Lägenhet";
const APARTMENT_BASE_VALUE: f64 = 3_200_000.0;
const HOUSE_BASE_VALUE: f64 = 4_500_000.0;
const AVERAGE_AREA_SQM: f64 = 65.0;
const SERIES_MONTHS: u32 = 24;
const MAX_VARIANCE: f64 = 0.025;
const YIELD_FALLBACK_VALUE: u64 = 3_500_000;

/// Rental yield the dashboard compares against, in percent.
pub const REGIONAL_RENTAL_YIELD: f64 = 4.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValuationPeriod {
    SixMonths,
    TwelveMonths,
    #[default]
    TwentyFourMonths,
}

impl ValuationPeriod {
    pub const ALL: [ValuationPeriod; 3] = [
        ValuationPeriod::SixMonths,
        ValuationPeriod::TwelveMonths,
        ValuationPeriod::TwentyFourMonths,
    ];

    pub fn months(self) -> usize {
        match self {
            ValuationPeriod::SixMonths => 6,
            ValuationPeriod::TwelveMonths => 12,
            ValuationPeriod::TwentyFourMonths => 24,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValuationPeriod::SixMonths => "6 mån",
            ValuationPeriod::TwelveMonths => "1 år",
            ValuationPeriod::TwentyFourMonths => "2 år",
        }
    }
}

impl fmt::Display for ValuationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.months())
    }
}

impl FromStr for ValuationPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "6m" => Ok(ValuationPeriod::SixMonths),
            "12m" => Ok(ValuationPeriod::TwelveMonths),
            "24m" => Ok(ValuationPeriod::TwentyFourMonths),
            other => anyhow::bail!("Unknown valuation period {:?} (expected 6m, 12m or 24m)", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuationPoint {
    /// `YYYY-MM`
    pub month: String,
    /// Swedish short month and two-digit year, e.g. `jan. 25`
    pub display_month: String,
    pub value: u64,
    pub sqm_price: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketTrend {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketComparison {
    pub current_value: u64,
    /// Percent change against twelve months earlier, one decimal.
    pub year_change: f64,
    pub trend: MarketTrend,
    pub regional_average: u64,
    pub national_average: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationReport {
    pub period: ValuationPeriod,
    pub address: String,
    pub series: Vec<ValuationPoint>,
    pub comparison: MarketComparison,
    pub rental_yield: f64,
}

pub fn base_value(property_type: &str) -> f64 {
    if property_type == APARTMENT_TYPE {
        APARTMENT_BASE_VALUE
    } else {
        HOUSE_BASE_VALUE
    }
}

/// Peak, decline, bottom, recovery.
fn trend_multiplier(months_back: u32) -> f64 {
    match months_back {
        m if m > 18 => 1.15,
        m if m > 12 => 0.95,
        m if m > 6 => 0.98,
        _ => 1.02,
    }
}

/// Twenty-four monthly points ending at `today`'s month, oldest first.
pub fn generate_series<R: Rng>(
    property_type: &str,
    today: Date,
    rng: &mut R,
) -> anyhow::Result<Vec<ValuationPoint>> {
    let base = base_value(property_type);
    let current = today.year() * 12 + i32::from(u8::from(today.month())) - 1;

    (0..SERIES_MONTHS)
        .rev()
        .map(|months_back| -> anyhow::Result<ValuationPoint> {
            let index = current - months_back as i32;
            let year = index.div_euclid(12);
            let month = Month::try_from((index.rem_euclid(12) + 1) as u8)
                .context("month index out of range")?;

            let variance = rng.gen_range(-MAX_VARIANCE..MAX_VARIANCE);
            let value = (base * trend_multiplier(months_back) * (1.0 + variance)).round() as u64;

            Ok(ValuationPoint {
                month: format!("{:04}-{:02}", year, u8::from(month)),
                display_month: format!(
                    "{} {:02}",
                    swedish_short_month(month),
                    year.rem_euclid(100)
                ),
                value,
                sqm_price: (value as f64 / AVERAGE_AREA_SQM).round() as u64,
            })
        })
        .collect()
}

pub fn market_comparison(series: &[ValuationPoint]) -> Option<MarketComparison> {
    let current_value = series.last()?.value;
    let year_ago_value = series
        .len()
        .checked_sub(13)
        .and_then(|i| series.get(i))
        .map(|p| p.value)
        .filter(|v| *v > 0)
        .unwrap_or(current_value);

    let change = (current_value as f64 - year_ago_value as f64) / year_ago_value as f64 * 100.0;
    let year_change = round_one_decimal(change);

    Some(MarketComparison {
        current_value,
        year_change,
        trend: if year_change > 0.0 {
            MarketTrend::Up
        } else {
            MarketTrend::Down
        },
        regional_average: (current_value as f64 * 0.95).round() as u64,
        national_average: (current_value as f64 * 0.88).round() as u64,
    })
}

/// Yearly rent as a percentage of the market value, one decimal.
pub fn rental_yield(monthly_rent: u32, current_value: Option<u64>) -> f64 {
    let value = current_value
        .filter(|v| *v > 0)
        .unwrap_or(YIELD_FALLBACK_VALUE);
    round_one_decimal(f64::from(monthly_rent) * 12.0 / value as f64 * 100.0)
}

fn round_one_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// `3 200 000 kr`, grouped with no-break spaces the way sv-SE formats SEK.
pub fn format_sek(value: u64) -> String {
    format!("{}\u{a0}kr", group_thousands(value))
}

pub fn format_sqm_price(value: u64) -> String {
    format!("{} kr/m²", group_thousands(value))
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('\u{a0}');
        }
        out.push(c);
    }
    out
}

fn swedish_short_month(month: Month) -> &'static str {
    match month {
        Month::January => "jan.",
        Month::February => "feb.",
        Month::March => "mars",
        Month::April => "apr.",
        Month::May => "maj",
        Month::June => "juni",
        Month::July => "juli",
        Month::August => "aug.",
        Month::September => "sep.",
        Month::October => "okt.",
        Month::November => "nov.",
        Month::December => "dec.",
    }
}

/// Produces valuation reports, pausing like a remote lookup would.
#[derive(Debug)]
pub struct ValuationService<R: Rng = StdRng> {
    rng: R,
    fetch_delay: Duration,
}

impl ValuationService<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for ValuationService<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> ValuationService<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            fetch_delay: Duration::from_secs(1),
        }
    }

    pub fn with_fetch_delay(mut self, fetch_delay: Duration) -> Self {
        self.fetch_delay = fetch_delay;
        self
    }

    pub async fn load(
        &mut self,
        record: &PropertyRecord,
        period: ValuationPeriod,
        today: Date,
    ) -> anyhow::Result<ValuationReport> {
        tokio::time::sleep(self.fetch_delay).await;
        self.build(record, period, today)
    }

    /// The comparison always uses the full series; `period` only trims what is
    /// returned for display.
    pub fn build(
        &mut self,
        record: &PropertyRecord,
        period: ValuationPeriod,
        today: Date,
    ) -> anyhow::Result<ValuationReport> {
        let full = generate_series(&record.property_type, today, &mut self.rng)?;
        let comparison = market_comparison(&full).context("empty valuation series")?;
        let rental_yield = rental_yield(record.monthly_rent, Some(comparison.current_value));
        let skip = full.len().saturating_sub(period.months());
        debug!(%period, points = full.len() - skip, "Built valuation report");

        Ok(ValuationReport {
            period,
            address: record.address.clone(),
            series: full.into_iter().skip(skip).collect(),
            comparison,
            rental_yield,
        })
    }
}
