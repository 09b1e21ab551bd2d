pub mod config;
pub mod error;
pub mod model;
pub mod seed;
pub mod store;

pub use error::SeedError;

// Export all model types
pub use model::*;

// Export seeding entry points
pub use seed::{run_seed, Flavor, SeedPlan, SeedReport};

// Export store types
pub use store::{FailPoint, MemoryStore, PostgresStore, SeedStore, SeedTransaction};

/// Initialise `env_logger` from `RUST_LOG`, defaulting to info and keeping sqlx quiet
pub fn init_logging() {
    use env_logger::{Builder, Env};
    use log::LevelFilter;

    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .filter_module("sqlx", LevelFilter::Warn) // Suppress per-statement sqlx logs
        .try_init();
}
