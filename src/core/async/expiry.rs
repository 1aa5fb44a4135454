//! Periodic expiry of pending transfers
//!
//! Pending transfers with a timeout are not expired lazily by reads. A
//! sweeper task wakes up on a fixed period and expires everything that is due
//! according to the engine's clock, under the engine's write lock.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use super::AsyncLedgerEngine;

/// Running sweeper; dropping it without calling `stop` leaves the task running
#[derive(Debug)]
pub struct ExpirySweeper {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ExpirySweeper {
    /// Signal the sweeper and wait for it to finish its current pass
    pub async fn stop(self) {
        // The task may already have exited; either way it is done after the join
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

/// Start a sweeper on the current tokio runtime
///
/// # Arguments
///
/// * `engine` - The engine to expire transfers in
/// * `period` - Time between sweeps; the first sweep runs immediately
pub fn spawn_expiry_sweeper(engine: AsyncLedgerEngine, period: Duration) -> ExpirySweeper {
    let (shutdown, mut stopped) = oneshot::channel();
    let task = tokio::spawn(async move {
        let mut ticks = time::interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut stopped => break,
                _ = ticks.tick() => {
                    let expired = engine.expire_due_now().await;
                    if !expired.is_empty() {
                        info!(expired = expired.len(), "sweeper expired pending transfers");
                    }
                }
            }
        }
        debug!("expiry sweeper stopped");
    });
    ExpirySweeper { shutdown, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::clock::ManualClock;
    use crate::core::LedgerEngine;
    use crate::types::{Account, PendingStatus, Transfer, TransferFlags, NS_PER_SECOND};

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_expires_due_transfers() {
        let clock = Arc::new(ManualClock::new(NS_PER_SECOND));
        let engine = AsyncLedgerEngine::new(LedgerEngine::new(clock.clone()));
        engine
            .create_accounts(&[Account::new(1, 1, 1), Account::new(2, 1, 1)])
            .await;
        let mut pending = Transfer::new(9, 1, 2, 10, 1, 1).with_flags(TransferFlags::PENDING);
        pending.timeout = 1;
        assert!(engine.create_transfers(&[pending]).await.is_empty());

        let sweeper = spawn_expiry_sweeper(engine.clone(), Duration::from_millis(5));
        time::sleep(Duration::from_millis(20)).await;
        assert_eq!(engine.pending_status(9).await, Some(PendingStatus::Pending));

        // The paused runtime clock only moves when every task is idle, so each
        // sleep lets the sweeper run a fixed number of ticks
        clock.advance(2 * NS_PER_SECOND);
        time::sleep(Duration::from_millis(50)).await;
        sweeper.stop().await;

        assert_eq!(engine.pending_status(9).await, Some(PendingStatus::Expired));
        assert_eq!(engine.lookup_accounts(&[1]).await[0].debits_pending, 0);
    }

    #[tokio::test]
    async fn test_stop_ends_the_task() {
        let engine = AsyncLedgerEngine::default();
        let sweeper = spawn_expiry_sweeper(engine, Duration::from_secs(3600));
        sweeper.stop().await;
    }
}
