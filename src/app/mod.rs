//! Configuration and orchestration context.

mod config;
mod context;

pub use config::Config;
pub use context::{init_logging, Context};
