use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::watch;

use crate::core::lead_time::LeadTimeClient;
use crate::core::normalize::normalize;
use crate::core::resolver::LocationResolver;
use crate::domain::model::{
    Address, AddressId, AddressResolution, LeadTimeStatus, Resolution, ResolutionOutcome,
    ResolutionState, ShippingQuote,
};
use crate::domain::ports::{LeadTimeSource, TaxonomySource};

/// Internal only: a completion that lost the race to a newer request for the
/// same address.
#[derive(Error, Debug)]
enum ResolveError {
    #[error("resolution {token} for address {address_id} was superseded")]
    StaleResult { address_id: AddressId, token: u64 },
}

struct Slot {
    generation: u64,
    state: ResolutionState,
    published: watch::Sender<Option<Arc<AddressResolution>>>,
}

impl Slot {
    fn new() -> Self {
        let (published, _) = watch::channel(None);
        Self {
            generation: 0,
            state: ResolutionState::Idle,
            published,
        }
    }
}

/// Single entry point used by both the address form and checkout: resolves an
/// address, prices it, and asks for a delivery window.
///
/// One slot is kept per address id that was resolved or subscribed to. Slots
/// live until `forget`; callers drop deleted addresses through it.
pub struct ResolutionOrchestrator<T: TaxonomySource, L: LeadTimeSource> {
    resolver: LocationResolver<T>,
    lead_time: LeadTimeClient<L>,
    slots: Mutex<HashMap<AddressId, Slot>>,
    // Shared by every slot and never reset, so a token outlives `forget`.
    generations: AtomicU64,
}

impl<T: TaxonomySource, L: LeadTimeSource> ResolutionOrchestrator<T, L> {
    pub fn new(resolver: LocationResolver<T>, lead_time: LeadTimeClient<L>) -> Self {
        Self {
            resolver,
            lead_time,
            slots: Mutex::new(HashMap::new()),
            generations: AtomicU64::new(0),
        }
    }

    /// Never fails: taxonomy and lead-time problems are encoded in the result.
    ///
    /// Returns `None` when a newer `resolve` for the same address id started
    /// before this one finished. The newer call publishes its own result; this
    /// one is dropped regardless of which network response arrived first.
    pub async fn resolve(&self, address: &Address) -> Option<AddressResolution> {
        let token = self.begin(&address.id);
        let resolution = self.compute(address).await;

        match self.finish(token, resolution) {
            Ok(resolution) => Some(resolution),
            Err(e) => {
                tracing::debug!("Discarding result: {}", e);
                None
            }
        }
    }

    /// Resolves every address concurrently. Lead-time calls stay bounded by
    /// the client's in-flight limit.
    pub async fn resolve_all(&self, addresses: &[Address]) -> Vec<Option<AddressResolution>> {
        tracing::info!("📦 Resolving {} addresses", addresses.len());
        futures::future::join_all(addresses.iter().map(|address| self.resolve(address))).await
    }

    /// Latest published (never stale) resolution for `id`.
    pub fn subscribe(&self, id: &AddressId) -> watch::Receiver<Option<Arc<AddressResolution>>> {
        let mut slots = self.lock_slots();
        slots
            .entry(id.clone())
            .or_insert_with(Slot::new)
            .published
            .subscribe()
    }

    pub fn latest(&self, id: &AddressId) -> Option<Arc<AddressResolution>> {
        self.lock_slots()
            .get(id)
            .and_then(|slot| slot.published.borrow().clone())
    }

    pub fn state(&self, id: &AddressId) -> ResolutionState {
        self.lock_slots()
            .get(id)
            .map(|slot| slot.state)
            .unwrap_or(ResolutionState::Idle)
    }

    /// Drops tracking for an address: state, latest result and subscribers.
    /// An in-flight resolution for it becomes stale, even if the address is
    /// resolved again before that resolution finishes.
    pub fn forget(&self, id: &AddressId) {
        self.lock_slots().remove(id);
    }

    fn begin(&self, id: &AddressId) -> u64 {
        let mut slots = self.lock_slots();
        let slot = slots.entry(id.clone()).or_insert_with(Slot::new);
        if slot.state == ResolutionState::Resolving {
            tracing::debug!("Superseding in-flight resolution {} of {}", slot.generation, id);
        }
        slot.generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        slot.state = ResolutionState::Resolving;
        slot.generation
    }

    fn finish(
        &self,
        token: u64,
        resolution: AddressResolution,
    ) -> Result<AddressResolution, ResolveError> {
        let mut slots = self.lock_slots();
        let slot = match slots.get_mut(&resolution.address_id) {
            Some(slot) if slot.generation == token => slot,
            _ => {
                return Err(ResolveError::StaleResult {
                    address_id: resolution.address_id,
                    token,
                })
            }
        };

        slot.state = resolution.state;
        slot.published.send_replace(Some(Arc::new(resolution.clone())));
        Ok(resolution)
    }

    async fn compute(&self, address: &Address) -> AddressResolution {
        let resolution = self.resolver.resolve_triple(address).await;

        let fee_key = match &resolution {
            Ok(resolution) => resolution
                .canonical_province_name()
                .map(str::to_string)
                .unwrap_or_else(|| normalize(address.province_name())),
            Err(_) => normalize(address.province_name()),
        };
        let fee = self.resolver.tables().fees().estimate_fee(&fee_key);

        let lead_time = match &resolution {
            Ok(Resolution::Resolved(triple)) => {
                match self
                    .lead_time
                    .estimate_lead_time(&triple.district_code, &triple.ward_code)
                    .await
                {
                    Ok(window) => LeadTimeStatus::Estimated { window },
                    Err(reason) => LeadTimeStatus::Unavailable { reason },
                }
            }
            _ => LeadTimeStatus::NotRequested,
        };

        let (state, outcome) = match resolution {
            Ok(Resolution::Resolved(triple)) => {
                let state = if lead_time.window().is_some() {
                    ResolutionState::Resolved
                } else {
                    ResolutionState::PartiallyResolved
                };
                (state, ResolutionOutcome::Resolved(triple))
            }
            Ok(Resolution::Partial(partial)) => (
                ResolutionState::PartiallyResolved,
                ResolutionOutcome::Partial(partial),
            ),
            Err(e) => {
                tracing::warn!("Taxonomy lookup for {} failed: {}", address.id, e);
                (
                    ResolutionState::Failed,
                    ResolutionOutcome::Failed {
                        reason: e.to_string(),
                    },
                )
            }
        };

        tracing::info!(
            "Address {} -> {:?}, fee {} (known: {})",
            address.id,
            state,
            fee.fee_minor_units,
            fee.known
        );

        AddressResolution {
            address_id: address.id.clone(),
            state,
            resolution: outcome,
            quote: ShippingQuote { fee, lead_time },
        }
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<AddressId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
