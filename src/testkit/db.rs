//! In-memory, migrated connection pools for each of the three databases,
//! so integration tests can build a full [`crate::app::Context`]-shaped
//! set of stores without touching disk.

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::core::store::{create_pool, DbPool};

const STATE_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/state");
const INDEX_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/market_index");
const SIGNALS_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/signals");

fn migrated_pool(migrations: EmbeddedMigrations) -> DbPool {
    let pool = create_pool(":memory:").expect("failed to create in-memory pool");
    let mut conn = pool.get().expect("failed to check out connection");
    conn.run_pending_migrations(migrations).expect("failed to run migrations");
    pool
}

pub fn state_pool() -> DbPool {
    migrated_pool(STATE_MIGRATIONS)
}

pub fn index_pool() -> DbPool {
    migrated_pool(INDEX_MIGRATIONS)
}

pub fn signals_pool() -> DbPool {
    migrated_pool(SIGNALS_MIGRATIONS)
}
