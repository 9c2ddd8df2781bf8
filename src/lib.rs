pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ServiceConfig;

pub use adapters::http::{HttpLeadTime, HttpOrchestrator, HttpTaxonomy};
pub use core::{
    lead_time::{LeadTimeClient, Origin},
    normalize::normalize,
    orchestrator::ResolutionOrchestrator,
    resolver::LocationResolver,
    tables::ShippingTables,
};
pub use domain::model::{
    Address, AddressId, AddressResolution, Level, LeadTimeStatus, PartialResolution,
    ResolutionOutcome, ResolutionState, ResolvedTriple, ShippingQuote,
};
pub use utils::error::{QuoteError, Result};
