//! In-memory ports for unit tests. Each mock records the calls it receives.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::model::{AdministrativeUnit, LeadTimeWindow, Level};
use crate::domain::ports::{
    LeadTimeError, LeadTimeRequest, LeadTimeSource, TaxonomyError, TaxonomySource,
};

fn unit(level: Level, code: &str, name: &str) -> AdministrativeUnit {
    AdministrativeUnit::new(level, code, name)
}

pub struct MockTaxonomy {
    provinces: Vec<AdministrativeUnit>,
    districts: HashMap<String, Vec<AdministrativeUnit>>,
    wards: HashMap<String, Vec<AdministrativeUnit>>,
    delays: HashMap<String, Duration>,
    province_failures: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl MockTaxonomy {
    pub fn sample() -> Self {
        let provinces = vec![
            unit(Level::Province, "01", "Hà Nội"),
            unit(Level::Province, "46", "Thừa Thiên - Huế"),
            unit(Level::Province, "74", "Tỉnh Bình Dương"),
            unit(Level::Province, "79", "Thành phố Hồ Chí Minh"),
            unit(Level::Province, "99", "Đặc khu Côn Sơn"),
        ];

        let districts = HashMap::from([
            (
                "01".to_string(),
                vec![
                    unit(Level::District, "001", "Quận Ba Đình"),
                    unit(Level::District, "002", "Quận Hoàn Kiếm"),
                ],
            ),
            (
                "46".to_string(),
                vec![unit(Level::District, "474", "Thành phố Huế")],
            ),
            (
                "74".to_string(),
                vec![
                    unit(Level::District, "718", "Thành phố Thủ Dầu Một"),
                    unit(Level::District, "724", "Thị xã Dĩ An"),
                ],
            ),
            (
                "79".to_string(),
                vec![unit(Level::District, "760", "Quận 1")],
            ),
            (
                "99".to_string(),
                vec![unit(Level::District, "991", "Côn Đảo")],
            ),
        ]);

        let wards = HashMap::from([
            (
                "001".to_string(),
                vec![unit(Level::Ward, "00001", "Phường Phúc Xá")],
            ),
            (
                "002".to_string(),
                vec![unit(Level::Ward, "00037", "Phường Hàng Bạc")],
            ),
            (
                "474".to_string(),
                vec![unit(Level::Ward, "19753", "Phường Phú Hội")],
            ),
            (
                "718".to_string(),
                vec![unit(Level::Ward, "25747", "Phường Phú Cường")],
            ),
            (
                "724".to_string(),
                vec![
                    unit(Level::Ward, "25942", "Phường Tân Đông Hiệp"),
                    unit(Level::Ward, "25945", "Phường Đông Hòa"),
                ],
            ),
            (
                "760".to_string(),
                vec![unit(Level::Ward, "26734", "Phường Bến Nghé")],
            ),
            (
                "991".to_string(),
                vec![unit(Level::Ward, "99101", "Côn Sơn")],
            ),
        ]);

        Self {
            provinces,
            districts,
            wards,
            delays: HashMap::new(),
            province_failures: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Delays the call recorded as `call` (e.g. `"districts:74"`).
    pub fn with_delay(mut self, call: &str, delay: Duration) -> Self {
        self.delays.insert(call.to_string(), delay);
        self
    }

    pub fn fail_next_provinces(self, count: usize) -> Self {
        self.province_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call.clone());
        if let Some(delay) = self.delays.get(&call) {
            tokio::time::sleep(*delay).await;
        }
    }
}

#[async_trait]
impl TaxonomySource for MockTaxonomy {
    async fn provinces(&self) -> Result<Vec<AdministrativeUnit>, TaxonomyError> {
        self.record("provinces".to_string()).await;
        let failing = self
            .province_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TaxonomyError::ServiceUnavailable {
                message: "HTTP 503".to_string(),
            });
        }
        Ok(self.provinces.clone())
    }

    async fn districts(
        &self,
        province_code: &str,
    ) -> Result<Vec<AdministrativeUnit>, TaxonomyError> {
        self.record(format!("districts:{}", province_code)).await;
        Ok(self.districts.get(province_code).cloned().unwrap_or_default())
    }

    async fn wards(&self, district_code: &str) -> Result<Vec<AdministrativeUnit>, TaxonomyError> {
        self.record(format!("wards:{}", district_code)).await;
        Ok(self.wards.get(district_code).cloned().unwrap_or_default())
    }
}

pub fn sample_window() -> LeadTimeWindow {
    LeadTimeWindow {
        leadtime_seconds: 172_800,
        eta_from: Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap(),
        eta_to: Utc.with_ymd_and_hms(2024, 6, 5, 0, 0, 0).unwrap(),
    }
}

pub struct MockLeadTime {
    outcome: Result<LeadTimeWindow, LeadTimeError>,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<LeadTimeRequest>>,
}

impl MockLeadTime {
    pub fn ok() -> Self {
        Self::with_outcome(Ok(sample_window()))
    }

    pub fn with_outcome(outcome: Result<LeadTimeWindow, LeadTimeError>) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<LeadTimeRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LeadTimeSource for MockLeadTime {
    async fn lead_time(&self, request: &LeadTimeRequest) -> Result<LeadTimeWindow, LeadTimeError> {
        self.requests.lock().unwrap().push(request.clone());
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
