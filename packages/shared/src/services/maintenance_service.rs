use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::services::matchmaking_service::MatchmakingService;
use crate::services::sweeper_service::SweeperService;

/// Drives the periodic upkeep: timeout sweep first, then the auto-match
/// sweep. One instance is owned by the process and shared with the request
/// path, which may call `run_once` whenever an agent polls its status.
pub struct MaintenanceService {
    sweeper: Arc<SweeperService>,
    matchmaking: Arc<MatchmakingService>,
    running: Mutex<()>,
}

impl MaintenanceService {
    pub fn new(sweeper: Arc<SweeperService>, matchmaking: Arc<MatchmakingService>) -> Self {
        MaintenanceService {
            sweeper,
            matchmaking,
            running: Mutex::new(()),
        }
    }

    /// One maintenance pass. Single-flight: if a pass is already running
    /// (timer and request path can race), the call returns immediately
    /// without doing anything. Phase failures are logged, never raised.
    pub async fn run_once(&self) -> bool {
        let Ok(_guard) = self.running.try_lock() else {
            debug!("Maintenance pass already running, skipping");
            return false;
        };

        match self.sweeper.sweep().await {
            Ok(0) => {}
            Ok(n) => info!("Timeout sweep forfeited {} games", n),
            Err(e) => error!("Timeout sweep failed: {}", e),
        }

        match self.matchmaking.auto_match_sweep().await {
            Ok(0) => {}
            Ok(n) => info!("Auto-match sweep paired {} games", n),
            Err(e) => error!("Auto-match sweep failed: {}", e),
        }

        true
    }

    /// Spawns the long-lived maintenance loop. The task never exits on its
    /// own; errors stay inside `run_once`.
    pub fn spawn(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                service.run_once().await;
            }
        })
    }
}
