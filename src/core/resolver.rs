use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::core::normalize::normalize;
use crate::core::tables::ShippingTables;
use crate::domain::model::{
    Address, AdministrativeUnit, Level, PartialResolution, Resolution, ResolvedTriple,
};
use crate::domain::ports::{TaxonomyError, TaxonomySource};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ListKey {
    Provinces,
    Districts(String),
    Wards(String),
}

impl ListKey {
    fn level(&self) -> Level {
        match self {
            ListKey::Provinces => Level::Province,
            ListKey::Districts(_) => Level::District,
            ListKey::Wards(_) => Level::Ward,
        }
    }
}

/// Session cache of unit lists, keyed by the parent code that scoped the
/// fetch. A list never changes once stored; two concurrent misses for the
/// same key store identical data.
#[derive(Debug, Default)]
struct UnitCache {
    lists: RwLock<HashMap<ListKey, Arc<[AdministrativeUnit]>>>,
}

impl UnitCache {
    fn get(&self, key: &ListKey) -> Option<Arc<[AdministrativeUnit]>> {
        let lists = self.lists.read().unwrap_or_else(PoisonError::into_inner);
        lists.get(key).cloned()
    }

    fn store(&self, key: ListKey, units: Vec<AdministrativeUnit>) -> Arc<[AdministrativeUnit]> {
        let mut lists = self.lists.write().unwrap_or_else(PoisonError::into_inner);
        lists.entry(key).or_insert_with(|| units.into()).clone()
    }

    fn clear(&self) {
        self.lists
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Resolves the three free-text administrative fields of an address against
/// the taxonomy, one level at a time.
pub struct LocationResolver<T: TaxonomySource> {
    taxonomy: T,
    tables: Arc<ShippingTables>,
    cache: UnitCache,
    fetch_timeout: Duration,
}

impl<T: TaxonomySource> LocationResolver<T> {
    pub fn new(taxonomy: T, tables: Arc<ShippingTables>, fetch_timeout: Duration) -> Self {
        Self {
            taxonomy,
            tables,
            cache: UnitCache::default(),
            fetch_timeout,
        }
    }

    /// Matching is exact after `normalize`. A level without a match stops the
    /// cascade and returns the codes found so far; lower levels are never
    /// fetched in that case.
    pub async fn resolve_triple(&self, address: &Address) -> Result<Resolution, TaxonomyError> {
        let provinces = self.units(ListKey::Provinces).await?;
        let Some(province) = find_by_name(&provinces, address.province_name()) else {
            tracing::debug!("No province matches '{}'", address.province_name());
            return Ok(Resolution::Partial(PartialResolution::province_not_found()));
        };

        let canonical_province_name = self
            .tables
            .aliases()
            .resolve_canonical_province(&normalize(address.province_name()))
            .unwrap_or(province.name.as_str())
            .to_string();

        let districts = self
            .units(ListKey::Districts(province.code.clone()))
            .await?;
        let Some(district) = find_by_name(&districts, address.district_name()) else {
            tracing::debug!(
                "No district matches '{}' in province {}",
                address.district_name(),
                province.code
            );
            return Ok(Resolution::Partial(PartialResolution {
                failed_level: Level::District,
                province_code: Some(province.code.clone()),
                district_code: None,
                canonical_province_name: Some(canonical_province_name),
            }));
        };

        let wards = self.units(ListKey::Wards(district.code.clone())).await?;
        let Some(ward) = find_by_name(&wards, address.ward_name()) else {
            tracing::debug!(
                "No ward matches '{}' in district {}",
                address.ward_name(),
                district.code
            );
            return Ok(Resolution::Partial(PartialResolution {
                failed_level: Level::Ward,
                province_code: Some(province.code.clone()),
                district_code: Some(district.code.clone()),
                canonical_province_name: Some(canonical_province_name),
            }));
        };

        Ok(Resolution::Resolved(ResolvedTriple {
            province_code: province.code.clone(),
            district_code: district.code.clone(),
            ward_code: ward.code.clone(),
            canonical_province_name,
        }))
    }

    /// Forgets every cached list, starting a new session.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn tables(&self) -> &ShippingTables {
        &self.tables
    }

    async fn units(&self, key: ListKey) -> Result<Arc<[AdministrativeUnit]>, TaxonomyError> {
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("Cache hit for {:?}", key);
            return Ok(hit);
        }

        tracing::debug!("📡 Fetching {} list for {:?}", key.level(), key);
        let fetch = async {
            match &key {
                ListKey::Provinces => self.taxonomy.provinces().await,
                ListKey::Districts(province_code) => self.taxonomy.districts(province_code).await,
                ListKey::Wards(district_code) => self.taxonomy.wards(district_code).await,
            }
        };

        let units = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!("Taxonomy fetch for {:?} timed out", key);
                return Err(TaxonomyError::Timeout);
            }
        };

        Ok(self.cache.store(key, units))
    }
}

fn find_by_name<'a>(units: &'a [AdministrativeUnit], raw: &str) -> Option<&'a AdministrativeUnit> {
    let target = normalize(raw);
    if target.is_empty() {
        return None;
    }

    let mut matches = units.iter().filter(|unit| normalize(&unit.name) == target);
    let first = matches.next()?;
    if let Some(other) = matches.next() {
        tracing::warn!(
            "'{}' matches both {} ({}) and {} ({}); using the first",
            raw,
            first.name,
            first.code,
            other.name,
            other.code
        );
    }
    Some(first)
}
