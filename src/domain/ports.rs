use crate::domain::model::{AdministrativeUnit, LeadTimeWindow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transient taxonomy failures. An unmatched name is not an error: it is
/// reported as a `PartialResolution`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("taxonomy service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("taxonomy request timed out")]
    Timeout,
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadTimeError {
    #[error("lead-time service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("route rejected by lead-time service: {message}")]
    InvalidRoute { message: String },

    #[error("lead-time request timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadTimeRequest {
    pub from_district_code: String,
    pub from_ward_code: String,
    pub to_district_code: String,
    pub to_ward_code: String,
    pub service_id: u32,
}

/// Read-only view of the external province/district/ward hierarchy.
#[async_trait]
pub trait TaxonomySource: Send + Sync {
    async fn provinces(&self) -> Result<Vec<AdministrativeUnit>, TaxonomyError>;
    async fn districts(&self, province_code: &str)
        -> Result<Vec<AdministrativeUnit>, TaxonomyError>;
    async fn wards(&self, district_code: &str) -> Result<Vec<AdministrativeUnit>, TaxonomyError>;
}

#[async_trait]
pub trait LeadTimeSource: Send + Sync {
    async fn lead_time(&self, request: &LeadTimeRequest) -> Result<LeadTimeWindow, LeadTimeError>;
}

#[async_trait]
impl<T: TaxonomySource + ?Sized> TaxonomySource for std::sync::Arc<T> {
    async fn provinces(&self) -> Result<Vec<AdministrativeUnit>, TaxonomyError> {
        (**self).provinces().await
    }

    async fn districts(
        &self,
        province_code: &str,
    ) -> Result<Vec<AdministrativeUnit>, TaxonomyError> {
        (**self).districts(province_code).await
    }

    async fn wards(&self, district_code: &str) -> Result<Vec<AdministrativeUnit>, TaxonomyError> {
        (**self).wards(district_code).await
    }
}

#[async_trait]
impl<T: LeadTimeSource + ?Sized> LeadTimeSource for std::sync::Arc<T> {
    async fn lead_time(&self, request: &LeadTimeRequest) -> Result<LeadTimeWindow, LeadTimeError> {
        (**self).lead_time(request).await
    }
}
