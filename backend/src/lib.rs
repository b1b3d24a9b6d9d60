//! Restaurant order management core.
//!
//! A single-process backend over flat CSV files: menu management, the
//! kitchen order queue with its status state machine, sales reporting,
//! and CSV export. The UI layer talks to [`Backend`] exclusively
//! through the typed request/response surface in [`api`].

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

use chrono::{DateTime, Duration, Utc};
use config::AppConfig;
use domain::{ExportService, MenuService, OrderQueueService};
use error::Result;
use log::{info, warn};
use storage::csv::{CsvConnection, MenuRepository, OrderRepository};

/// The tables whose backups are pruned on the daily timer.
const PRUNED_TABLES: [&str; 3] = ["menu_items", "orders", "sales_reports"];

/// Top-level application state. One instance owns the data directory;
/// the host loop drives it with commands via [`Backend::handle`] and
/// time via [`Backend::tick`].
pub struct Backend {
    config: AppConfig,
    connection: CsvConnection,
    menu: MenuService<MenuRepository>,
    queue: OrderQueueService<OrderRepository>,
    order_store: OrderRepository,
    export: ExportService,
    last_auto_save: DateTime<Utc>,
    last_backup_prune: DateTime<Utc>,
}

impl Backend {
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::new_at(config, Utc::now())
    }

    /// Construct with an explicit clock reading so the timers are
    /// deterministic under test.
    pub fn new_at(config: AppConfig, now: DateTime<Utc>) -> Result<Self> {
        let connection = CsvConnection::new(&config.data_dir, config.max_backups)?;
        let menu = MenuService::new(MenuRepository::new(connection.clone()))?;
        let order_store = OrderRepository::new(connection.clone());
        let queue = OrderQueueService::new(order_store.clone())?;
        let export = ExportService::new(connection.clone(), config.reports_dir.clone());
        info!("backend ready, data directory {}", config.data_dir.display());
        Ok(Self {
            config,
            connection,
            menu,
            queue,
            order_store,
            export,
            last_auto_save: now,
            last_backup_prune: now,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Cooperative timer hook. The host calls this periodically from the
    /// same thread that issues commands; it flushes dirty state on the
    /// auto-save interval and prunes aged backups on the prune interval.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if now - self.last_auto_save >= Duration::seconds(self.config.auto_save_interval_secs as i64) {
            self.last_auto_save = now;
            if let Err(e) = self.menu.flush_if_dirty() {
                warn!("auto-save of menu failed: {}", e);
            }
            if let Err(e) = self.queue.flush_if_dirty() {
                warn!("auto-save of orders failed: {}", e);
            }
        }

        if now - self.last_backup_prune
            >= Duration::seconds(self.config.backup_prune_interval_secs as i64)
        {
            self.last_backup_prune = now;
            for table in PRUNED_TABLES {
                if let Err(e) = self.connection.prune_backups(table) {
                    warn!("backup pruning for {} failed: {}", table, e);
                }
            }
        }
    }

    /// Final flush before the process exits.
    pub fn shutdown(&mut self) -> Result<()> {
        self.menu.persist_now()?;
        self.queue.persist_now()?;
        info!("backend shut down cleanly");
        Ok(())
    }
}

/// Install the global log subscriber. Filtering follows `RUST_LOG`,
/// defaulting to info.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
