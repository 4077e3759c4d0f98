//! Identity resolution over source records: fold discovered profiles into
//! canonical entities, enrich them one hop through cross-source references,
//! and rank the result.

pub mod discovery;
pub mod enrichment;
pub mod entity;
pub mod error;
pub mod matching;
pub mod ranking;
pub mod registry;
pub mod resolver;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use discovery::{DiscoveryOutcome, DiscoveryRequest, Prospector, RunReport};
pub use enrichment::{EnrichmentStats, EnrichmentWalker};
pub use entity::CanonicalEntity;
pub use error::{ResolveError, Result};
pub use ranking::rank;
pub use registry::SourceRegistry;
pub use resolver::{IdentityResolver, MatchRule, Resolution, ResolveStats};
