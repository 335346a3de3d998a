use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity handed to the app shell once a BankID login completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub personal_number: String,
    pub name: String,
    pub order_ref: String,
}

/// The single rental unit shown on the dashboard.
///
/// Field values are stored the way the user typed them. Dates are kept as
/// free text; `date_warnings` reports inconsistencies without rejecting them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub monthly_rent: u32,
    pub property_type: String,
    pub address: String,
    pub tenant_name: String,
    pub tenant_status: String,
    pub next_rent_due: String,
    pub brf_permit_expiry: String,
    pub last_message: String,
    pub move_in_date: String,
    pub rent_received: bool,
    pub rent_received_date: String,
}

impl Default for PropertyRecord {
    fn default() -> Self {
        Self {
            monthly_rent: 14_000,
            property_type: "Lägenhet".to_string(),
            address: "Södermalm, Stockholm".to_string(),
            tenant_name: "Anna Andersson".to_string(),
            tenant_status: "Occupied".to_string(),
            next_rent_due: "2025-07-01".to_string(),
            brf_permit_expiry: "2026-05-01".to_string(),
            last_message: "Can I get Wi-Fi info?".to_string(),
            move_in_date: "2025-06-28".to_string(),
            rent_received: true,
            rent_received_date: "2025-06-01".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyField {
    MonthlyRent,
    PropertyType,
    Address,
    TenantName,
    TenantStatus,
    NextRentDue,
    BrfPermitExpiry,
    LastMessage,
    MoveInDate,
    RentReceived,
    RentReceivedDate,
}

impl PropertyField {
    pub const ALL: [PropertyField; 11] = [
        PropertyField::MonthlyRent,
        PropertyField::PropertyType,
        PropertyField::Address,
        PropertyField::TenantName,
        PropertyField::TenantStatus,
        PropertyField::NextRentDue,
        PropertyField::BrfPermitExpiry,
        PropertyField::LastMessage,
        PropertyField::MoveInDate,
        PropertyField::RentReceived,
        PropertyField::RentReceivedDate,
    ];

    /// Key used in the persisted blob and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            PropertyField::MonthlyRent => "monthlyRent",
            PropertyField::PropertyType => "propertyType",
            PropertyField::Address => "address",
            PropertyField::TenantName => "tenantName",
            PropertyField::TenantStatus => "tenantStatus",
            PropertyField::NextRentDue => "nextRentDue",
            PropertyField::BrfPermitExpiry => "brfPermitExpiry",
            PropertyField::LastMessage => "lastMessage",
            PropertyField::MoveInDate => "moveInDate",
            PropertyField::RentReceived => "rentReceived",
            PropertyField::RentReceivedDate => "rentReceivedDate",
        }
    }

    /// Swedish label shown in the settings view.
    pub fn label(self) -> &'static str {
        match self {
            PropertyField::MonthlyRent => "Månadshyra (SEK)",
            PropertyField::PropertyType => "Bostadstyp",
            PropertyField::Address => "Adress",
            PropertyField::TenantName => "Hyresgäst",
            PropertyField::TenantStatus => "Hyresgästens status",
            PropertyField::NextRentDue => "Nästa hyresdag",
            PropertyField::BrfPermitExpiry => "BRF-tillstånd går ut",
            PropertyField::LastMessage => "Senaste meddelande",
            PropertyField::MoveInDate => "Inflyttningsdatum",
            PropertyField::RentReceived => "Hyra mottagen",
            PropertyField::RentReceivedDate => "Hyra mottagen datum",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(
            self,
            PropertyField::NextRentDue
                | PropertyField::BrfPermitExpiry
                | PropertyField::MoveInDate
                | PropertyField::RentReceivedDate
        )
    }
}

impl fmt::Display for PropertyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PropertyField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace(['-', '_'], "").to_lowercase();
        PropertyField::ALL
            .into_iter()
            .find(|field| field.key().to_lowercase() == wanted)
            .ok_or_else(|| anyhow::anyhow!("Unknown property field: {}", s))
    }
}

impl PropertyRecord {
    /// Overwrite a single field from user input. Only `monthlyRent` and
    /// `rentReceived` are parsed; everything else is taken verbatim.
    pub fn set_field(&mut self, field: PropertyField, raw: &str) -> anyhow::Result<()> {
        match field {
            PropertyField::MonthlyRent => {
                self.monthly_rent = raw
                    .trim()
                    .replace([' ', '\u{a0}'], "")
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid monthly rent {:?}: {}", raw, e))?;
            }
            PropertyField::RentReceived => {
                self.rent_received = parse_flag(raw)?;
            }
            PropertyField::PropertyType => self.property_type = raw.to_string(),
            PropertyField::Address => self.address = raw.to_string(),
            PropertyField::TenantName => self.tenant_name = raw.to_string(),
            PropertyField::TenantStatus => self.tenant_status = raw.to_string(),
            PropertyField::NextRentDue => self.next_rent_due = raw.to_string(),
            PropertyField::BrfPermitExpiry => self.brf_permit_expiry = raw.to_string(),
            PropertyField::LastMessage => self.last_message = raw.to_string(),
            PropertyField::MoveInDate => self.move_in_date = raw.to_string(),
            PropertyField::RentReceivedDate => self.rent_received_date = raw.to_string(),
        }
        Ok(())
    }

    pub fn get_field(&self, field: PropertyField) -> String {
        match field {
            PropertyField::MonthlyRent => self.monthly_rent.to_string(),
            PropertyField::PropertyType => self.property_type.clone(),
            PropertyField::Address => self.address.clone(),
            PropertyField::TenantName => self.tenant_name.clone(),
            PropertyField::TenantStatus => self.tenant_status.clone(),
            PropertyField::NextRentDue => self.next_rent_due.clone(),
            PropertyField::BrfPermitExpiry => self.brf_permit_expiry.clone(),
            PropertyField::LastMessage => self.last_message.clone(),
            PropertyField::MoveInDate => self.move_in_date.clone(),
            PropertyField::RentReceived => self.rent_received.to_string(),
            PropertyField::RentReceivedDate => self.rent_received_date.clone(),
        }
    }

    pub fn is_occupied(&self) -> bool {
        matches!(
            self.tenant_status.trim().to_lowercase().as_str(),
            "occupied" | "uthyrd" | "inflyttad"
        )
    }
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "ja" | "yes" | "1" => Ok(true),
        "false" | "nej" | "no" | "0" => Ok(false),
        other => anyhow::bail!("Invalid yes/no value: {:?}", other),
    }
}
