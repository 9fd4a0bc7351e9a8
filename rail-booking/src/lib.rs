pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod repository;
pub mod services;

pub use config::Config;
pub use error::{RailError, RailResult};

use config::SearchConfig;
use ledger::SqliteLedger;
use rail_graph_db::storage::rocksdb_store::RocksDbStorage;
use rail_graph_db::GraphStorage;
use repository::{ScheduleRepository, StationRepository};
use services::{AuditService, BookingService, LifecycleService, RouteSearchService, UserService};
use std::sync::Arc;

/// Every service, wired over one graph store and one ledger
#[derive(Clone)]
pub struct RailSystem {
    pub route_search: Arc<RouteSearchService>,
    pub booking: Arc<BookingService>,
    pub lifecycle: Arc<LifecycleService>,
    pub users: Arc<UserService>,
    pub audit: Arc<AuditService>,
}

impl RailSystem {
    /// Open both stores named by the configuration
    pub fn open(config: &Config) -> RailResult<Self> {
        let storage = Arc::new(RocksDbStorage::new(
            &config.graph.path,
            config.graph.namespace.as_str(),
        )?);
        let ledger = Arc::new(SqliteLedger::open(&config.ledger.path)?);

        tracing::info!(
            graph = %config.graph.path,
            ledger = %config.ledger.path,
            "stores initialized"
        );

        Ok(Self::from_stores(storage, ledger, config.search.clone()))
    }

    pub fn from_stores(
        storage: Arc<dyn GraphStorage>,
        ledger: Arc<SqliteLedger>,
        search: SearchConfig,
    ) -> Self {
        // Create repositories
        let station_repo = Arc::new(StationRepository::new(storage.clone()));
        let schedule_repo = Arc::new(ScheduleRepository::new(storage));

        // Create services
        Self {
            route_search: Arc::new(RouteSearchService::new(
                station_repo.clone(),
                schedule_repo.clone(),
                search,
            )),
            booking: Arc::new(BookingService::new(ledger.clone())),
            lifecycle: Arc::new(LifecycleService::new(
                ledger.clone(),
                station_repo,
                schedule_repo.clone(),
            )),
            users: Arc::new(UserService::new(ledger.clone())),
            audit: Arc::new(AuditService::new(ledger, schedule_repo)),
        }
    }
}
