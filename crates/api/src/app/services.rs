//! Store and service wiring.
//!
//! `DATABASE_URL` selects Postgres; without it everything runs against the
//! in-memory store (dev/test).

use std::sync::Arc;
use std::time::Duration;

use classroll_auth::Hs256Tokens;
use classroll_core::{Clock, SystemClock};
use classroll_infra::{
    AccountService, AttendanceService, BroadcastService, InMemoryRecordStore, PostgresRecordStore, RecordStore,
    RosterService, StoreError,
};

use crate::config::Config;

const POOL_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Services shared by every request.
pub struct AppServices {
    pub accounts: AccountService<dyn RecordStore>,
    pub attendance: AttendanceService<dyn RecordStore>,
    pub roster: RosterService<dyn RecordStore>,
    pub broadcast: BroadcastService<dyn RecordStore>,
    pub tokens: Arc<Hs256Tokens>,
    pub clock: Arc<dyn Clock>,
}

impl AppServices {
    pub fn new(store: Arc<dyn RecordStore>, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let tokens = Arc::new(Hs256Tokens::new(config.jwt_secret.as_bytes(), config.session_ttl));
        Self {
            accounts: AccountService::new(store.clone(), tokens.clone(), clock.clone()),
            attendance: AttendanceService::new(store.clone(), clock.clone(), config.day_boundary),
            roster: RosterService::new(store.clone(), clock.clone(), config.day_boundary),
            broadcast: BroadcastService::new(store, clock.clone()),
            tokens,
            clock,
        }
    }

    /// In-memory store, caller-supplied clock.
    pub fn in_memory(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(InMemoryRecordStore::new()), config, clock)
    }

    /// Store selected by `config`, system clock.
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        match &config.database_url {
            Some(url) => {
                let store =
                    PostgresRecordStore::connect(url, config.database_max_connections, POOL_ACQUIRE_TIMEOUT).await?;
                store.migrate().await?;
                tracing::info!(max_connections = config.database_max_connections, "using postgres store");
                Ok(Self::new(Arc::new(store), config, clock))
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory store");
                Ok(Self::in_memory(config, clock))
            }
        }
    }
}
