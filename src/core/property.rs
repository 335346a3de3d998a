use std::fmt;

use time::{Date, OffsetDateTime, macros::format_description};
use tracing::{debug, warn};

use crate::core::db::KeyValueStore;
use crate::models::{PropertyField, PropertyRecord};

pub const PROPERTY_KEY: &str = "rental-dashboard-property";

/// Load/store of the one property record under [`PROPERTY_KEY`].
#[derive(Debug, Clone)]
pub struct PropertyRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> PropertyRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> anyhow::Result<Option<PropertyRecord>> {
        match self.store.load(PROPERTY_KEY).await? {
            None => Ok(None),
            Some(blob) => match serde_json::from_str(&blob) {
                Ok(record) => Ok(Some(record)),
                Err(e) => {
                    warn!("Unreadable property record, using defaults: {}", e);
                    Ok(None)
                }
            },
        }
    }

    pub async fn load_or_default(&self) -> anyhow::Result<PropertyRecord> {
        Ok(self.load().await?.unwrap_or_default())
    }

    pub async fn save(&self, record: &PropertyRecord) -> anyhow::Result<()> {
        let blob = serde_json::to_string(record)?;
        self.store.store(PROPERTY_KEY, &blob).await
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        self.store.remove(PROPERTY_KEY).await
    }
}

/// Local copy of the property record that writes through on every edit.
#[derive(Debug, Clone)]
pub struct Dashboard<S: KeyValueStore> {
    repo: PropertyRepository<S>,
    record: PropertyRecord,
}

impl<S: KeyValueStore> Dashboard<S> {
    pub async fn open(store: S) -> anyhow::Result<Self> {
        let repo = PropertyRepository::new(store);
        let record = repo.load_or_default().await?;
        Ok(Self { repo, record })
    }

    pub fn record(&self) -> &PropertyRecord {
        &self.record
    }

    pub fn repository(&self) -> &PropertyRepository<S> {
        &self.repo
    }

    /// Change one field and persist the whole record. Input that does not parse
    /// leaves the record untouched.
    pub async fn edit(&mut self, field: PropertyField, raw: &str) -> anyhow::Result<&PropertyRecord> {
        let mut updated = self.record.clone();
        updated.set_field(field, raw)?;
        self.record = updated;
        debug!(%field, "Property field edited");
        self.repo.save(&self.record).await?;
        Ok(&self.record)
    }

    pub async fn replace(&mut self, record: PropertyRecord) -> anyhow::Result<()> {
        self.record = record;
        self.repo.save(&self.record).await
    }

    pub async fn reset(&mut self) -> anyhow::Result<()> {
        self.repo.clear().await?;
        self.record = PropertyRecord::default();
        Ok(())
    }

    pub fn summary(&self, today: Date) -> DashboardSummary {
        DashboardSummary::compute(&self.record, today)
    }
}

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub monthly_rent: u32,
    pub occupancy_percent: u8,
    pub days_to_permit_expiry: Option<i64>,
    pub days_until_rent_due: Option<i64>,
    pub unread_messages: u32,
    pub rent_paid: bool,
}

impl DashboardSummary {
    pub fn compute(record: &PropertyRecord, today: Date) -> Self {
        let days_from_today =
            |raw: &str| parse_date(raw).map(|date| (date - today).whole_days());
        Self {
            monthly_rent: record.monthly_rent,
            occupancy_percent: if record.is_occupied() { 100 } else { 0 },
            days_to_permit_expiry: days_from_today(&record.brf_permit_expiry),
            days_until_rent_due: days_from_today(&record.next_rent_due),
            unread_messages: u32::from(!record.last_message.trim().is_empty()),
            rent_paid: record.rent_received,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateWarning {
    Unparseable { field: PropertyField, value: String },
    RentDueBeforeMoveIn,
    PermitExpiresBeforeMoveIn,
}

impl fmt::Display for DateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWarning::Unparseable { field, value } => {
                write!(f, "{} is not a YYYY-MM-DD date: {:?}", field, value)
            }
            DateWarning::RentDueBeforeMoveIn => f.write_str("next rent due is before move-in"),
            DateWarning::PermitExpiresBeforeMoveIn => {
                f.write_str("BRF permit expires before move-in")
            }
        }
    }
}

impl PropertyRecord {
    /// Advisory checks on the free-text date fields. Nothing is rejected.
    pub fn date_warnings(&self) -> Vec<DateWarning> {
        let mut warnings = Vec::new();
        for field in PropertyField::ALL.into_iter().filter(|f| f.is_date()) {
            let value = self.get_field(field);
            if !value.trim().is_empty() && parse_date(&value).is_none() {
                warnings.push(DateWarning::Unparseable { field, value });
            }
        }

        let move_in = parse_date(&self.move_in_date);
        if let (Some(move_in), Some(due)) = (move_in, parse_date(&self.next_rent_due)) {
            if due < move_in {
                warnings.push(DateWarning::RentDueBeforeMoveIn);
            }
        }
        if let (Some(move_in), Some(expiry)) = (move_in, parse_date(&self.brf_permit_expiry)) {
            if expiry < move_in {
                warnings.push(DateWarning::PermitExpiresBeforeMoveIn);
            }
        }
        warnings
    }
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Local calendar date, falling back to UTC when the offset is unknown.
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}
