//! C5 — TTL-gated alternative-data signal cache and hybrid entity
//! resolver.

pub mod fuzzy;
pub mod model;
pub mod resolver;
pub mod schema;
pub mod store;

pub use resolver::{EmbeddingClient, EntitySeed, HybridResolver, ResolutionMethod, ResolvedEntity};
pub use store::{SignalProvider, SignalStore};
