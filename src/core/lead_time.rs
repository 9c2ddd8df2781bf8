use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::domain::model::LeadTimeWindow;
use crate::domain::ports::{LeadTimeError, LeadTimeRequest, LeadTimeSource};

/// Fixed pickup point every shipment leaves from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub district_code: String,
    pub ward_code: String,
}

/// Wraps the lead-time service with the configured origin, a timeout per call
/// and a bound on requests in flight across all addresses.
pub struct LeadTimeClient<L: LeadTimeSource> {
    source: L,
    origin: Origin,
    service_id: u32,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl<L: LeadTimeSource> LeadTimeClient<L> {
    pub fn new(
        source: L,
        origin: Origin,
        service_id: u32,
        timeout: Duration,
        max_in_flight: usize,
    ) -> Self {
        Self {
            source,
            origin,
            service_id,
            timeout,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// The timeout covers the call itself, not the wait for a permit.
    pub async fn estimate_lead_time(
        &self,
        to_district_code: &str,
        to_ward_code: &str,
    ) -> Result<LeadTimeWindow, LeadTimeError> {
        let request = LeadTimeRequest {
            from_district_code: self.origin.district_code.clone(),
            from_ward_code: self.origin.ward_code.clone(),
            to_district_code: to_district_code.to_string(),
            to_ward_code: to_ward_code.to_string(),
            service_id: self.service_id,
        };

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| LeadTimeError::ServiceUnavailable {
                message: "lead-time client is shutting down".to_string(),
            })?;

        match tokio::time::timeout(self.timeout, self.source.lead_time(&request)).await {
            Ok(Ok(window)) => {
                tracing::debug!(
                    "Lead time to {}/{}: {}s",
                    to_district_code,
                    to_ward_code,
                    window.leadtime_seconds
                );
                Ok(window)
            }
            Ok(Err(e)) => {
                tracing::warn!("Lead time to {}/{} unavailable: {}", to_district_code, to_ward_code, e);
                Err(e)
            }
            Err(_) => {
                tracing::warn!(
                    "Lead time to {}/{} timed out after {:?}",
                    to_district_code,
                    to_ward_code,
                    self.timeout
                );
                Err(LeadTimeError::Timeout)
            }
        }
    }
}
