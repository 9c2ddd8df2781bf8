use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::ports::LeadTimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Province,
    District,
    Ward,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Province => "province",
            Level::District => "district",
            Level::Ward => "ward",
        };
        f.write_str(name)
    }
}

/// A province, district or ward record as returned by the taxonomy service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrativeUnit {
    pub level: Level,
    pub code: String,
    pub name: String,
}

impl AdministrativeUnit {
    pub fn new(level: Level, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            level,
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(pub String);

impl From<&str> for AddressId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for AddressId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-owned address. Raw fields are free text; `resolved` is derived and
/// dropped whenever one of the administrative fields changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    province_name: String,
    district_name: String,
    ward_name: String,
    #[serde(default)]
    street_line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    resolved: Option<ResolvedTriple>,
}

impl Address {
    pub fn new(
        id: impl Into<AddressId>,
        province_name: impl Into<String>,
        district_name: impl Into<String>,
        ward_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            province_name: province_name.into(),
            district_name: district_name.into(),
            ward_name: ward_name.into(),
            street_line: String::new(),
            resolved: None,
        }
    }

    pub fn with_street_line(mut self, street_line: impl Into<String>) -> Self {
        self.street_line = street_line.into();
        self
    }

    pub fn province_name(&self) -> &str {
        &self.province_name
    }

    pub fn district_name(&self) -> &str {
        &self.district_name
    }

    pub fn ward_name(&self) -> &str {
        &self.ward_name
    }

    pub fn street_line(&self) -> &str {
        &self.street_line
    }

    pub fn resolved(&self) -> Option<&ResolvedTriple> {
        self.resolved.as_ref()
    }

    pub fn set_province_name(&mut self, name: impl Into<String>) {
        self.province_name = name.into();
        self.resolved = None;
    }

    pub fn set_district_name(&mut self, name: impl Into<String>) {
        self.district_name = name.into();
        self.resolved = None;
    }

    pub fn set_ward_name(&mut self, name: impl Into<String>) {
        self.ward_name = name.into();
        self.resolved = None;
    }

    pub fn set_street_line(&mut self, street_line: impl Into<String>) {
        self.street_line = street_line.into();
    }

    /// Stores the triple of a completed resolution, replacing any previous one.
    /// Partial or failed resolutions clear it.
    pub fn record(&mut self, outcome: &AddressResolution) {
        self.resolved = match &outcome.resolution {
            ResolutionOutcome::Resolved(triple) => Some(triple.clone()),
            _ => None,
        };
    }
}

impl From<String> for AddressId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTriple {
    pub province_code: String,
    pub district_code: String,
    pub ward_code: String,
    pub canonical_province_name: String,
}

/// Codes matched before the cascade stopped at `failed_level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialResolution {
    pub failed_level: Level,
    pub province_code: Option<String>,
    pub district_code: Option<String>,
    pub canonical_province_name: Option<String>,
}

impl PartialResolution {
    pub fn province_not_found() -> Self {
        Self {
            failed_level: Level::Province,
            province_code: None,
            district_code: None,
            canonical_province_name: None,
        }
    }
}

/// Result of the three-level cascade when the taxonomy answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedTriple),
    Partial(PartialResolution),
}

impl Resolution {
    pub fn canonical_province_name(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(triple) => Some(&triple.canonical_province_name),
            Resolution::Partial(partial) => partial.canonical_province_name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub fee_minor_units: u64,
    /// `false` means the province is missing from the fee table. A zero fee in
    /// that case is "unknown", not "free".
    pub known: bool,
}

impl FeeEstimate {
    pub fn unknown() -> Self {
        Self {
            fee_minor_units: 0,
            known: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimeWindow {
    pub leadtime_seconds: u64,
    pub eta_from: DateTime<Utc>,
    pub eta_to: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LeadTimeStatus {
    Estimated { window: LeadTimeWindow },
    Unavailable { reason: LeadTimeError },
    /// District or ward code missing, so no request was made.
    NotRequested,
}

impl LeadTimeStatus {
    pub fn window(&self) -> Option<&LeadTimeWindow> {
        match self {
            LeadTimeStatus::Estimated { window } => Some(window),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingQuote {
    pub fee: FeeEstimate,
    pub lead_time: LeadTimeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    Idle,
    Resolving,
    Resolved,
    PartiallyResolved,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Resolved(ResolvedTriple),
    Partial(PartialResolution),
    /// The taxonomy could not be consulted (transient failure or timeout).
    Failed { reason: String },
}

/// Everything a form or checkout screen needs to display for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressResolution {
    pub address_id: AddressId,
    pub state: ResolutionState,
    pub resolution: ResolutionOutcome,
    pub quote: ShippingQuote,
}

impl AddressResolution {
    /// Only an unmatched province leaves the fee uncomputable; every other
    /// partial outcome is advisory.
    pub fn blocks_checkout(&self) -> bool {
        matches!(
            &self.resolution,
            ResolutionOutcome::Partial(PartialResolution {
                failed_level: Level::Province,
                ..
            })
        )
    }
}
