//! Explicit, passed-around bundle of config/store/scheduler/logger state —
//! the "Context value" DESIGN NOTES §9 calls for, replacing module-level
//! singletons.

use std::sync::Arc;

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing_subscriber::EnvFilter;

use crate::core::adapter::{AdapterRegistry, EdgarAdapter, MarketKey, NseAdapter};
use crate::core::discovery::catalog::CatalogClient;
use crate::core::discovery::SnapshotStore;
use crate::core::index::MarketIndex;
use crate::core::signals::{HybridResolver, SignalStore};
use crate::core::store::{create_pool, DbPool, SqliteStateStore, StateStore};
use crate::error::{Error, Result};

use super::config::Config;

const STATE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/state");
const INDEX_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/market_index");
const SIGNALS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/signals");

pub struct Context {
    pub config: Config,
    pub state_store: Arc<dyn StateStore>,
    pub registry: Arc<AdapterRegistry>,
    pub index: Arc<MarketIndex>,
    pub snapshots: Arc<SnapshotStore>,
    pub signals: Arc<SignalStore>,
    pub resolver: Arc<HybridResolver>,
    pub catalog: Arc<CatalogClient>,
}

impl Context {
    /// Open every database, run pending migrations, and wire up the
    /// adapters/catalog/resolver a full run needs.
    pub fn build(config: Config) -> Result<Self> {
        let state_pool = create_pool(&config.state_db_path.to_string_lossy())?;
        run_migrations(&state_pool, STATE_MIGRATIONS)?;
        let state_store: Arc<dyn StateStore> = Arc::new(SqliteStateStore::new(state_pool));

        let index_pool = create_pool(&config.index_db_path.to_string_lossy())?;
        run_migrations(&index_pool, INDEX_MIGRATIONS)?;
        let index = Arc::new(MarketIndex::new(index_pool.clone(), Some(config.index_db_path.clone())));
        let snapshots = Arc::new(SnapshotStore::new(index_pool));

        let signals_pool = create_pool(&config.signals_db_path.to_string_lossy())?;
        run_migrations(&signals_pool, SIGNALS_MIGRATIONS)?;
        let signals = Arc::new(SignalStore::with_ttl(signals_pool, config.signal_ttl_hours));

        let mut registry = AdapterRegistry::new();
        registry.register(
            MarketKey::Edgar,
            Arc::new(EdgarAdapter::new(config.user_agent.clone())?),
        );
        registry.register(MarketKey::Nse, Arc::new(NseAdapter::new()?));

        let catalog = Arc::new(CatalogClient::new()?);
        let resolver = Arc::new(HybridResolver::new(config.semantic_threshold));

        Ok(Self {
            config,
            state_store,
            registry: Arc::new(registry),
            index,
            snapshots,
            signals,
            resolver,
            catalog,
        })
    }
}

fn run_migrations(pool: &DbPool, migrations: EmbeddedMigrations) -> Result<()> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(migrations)
        .map_err(|e| Error::Migration(e.to_string()))?;
    Ok(())
}

/// Initialize structured logging from `log_level`, mirroring the
/// teacher's `config.init_logging()`.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
