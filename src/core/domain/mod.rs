//! Plain data types shared across `core` modules. Nothing here talks to a
//! database or the network — that belongs to `store`, `index`, `signals`.

pub mod entity;
pub mod filing;
pub mod market;

pub use entity::{Entity, SignalPayload, SignalRecord, SocialVariant};
pub use filing::{Filing, ProcessedFiling, SchedulerEvent};
pub use market::{MacroEvent, MacroProbabilitySnapshot, MarketMetadata, Outcome};
