//! Scheduler
//!
//! Two states: **Armed** (a timer is pending) and **Terminating**.
//!
//! - Fires immediately on start, then re-arms for the interval after each
//!   cycle completes
//! - Without an interval, runs exactly one cycle and completes with its result
//! - With an interval, cycle failures are logged and never stop the loop
//! - A shutdown signal wins at any point, including mid-cycle; the in-flight
//!   cycle is dropped, not drained

use super::{CycleOutcome, UpdateCycle};
use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

/// Why the scheduler stopped
#[derive(Debug)]
pub enum Termination {
    /// A shutdown signal arrived
    Signalled(&'static str),

    /// The single one-shot cycle finished
    Completed(Result<CycleOutcome>),
}

impl Termination {
    /// Process exit code for this termination
    ///
    /// 0 for a signal or a successful one-shot cycle, 1 for a failed one.
    pub fn exit_code(&self) -> u8 {
        match self {
            Termination::Signalled(_) => 0,
            Termination::Completed(Ok(_)) => 0,
            Termination::Completed(Err(_)) => 1,
        }
    }
}

/// Drives an [`UpdateCycle`] on the configured interval
pub struct Scheduler {
    cycle: UpdateCycle,
    interval: Option<Duration>,
}

impl Scheduler {
    /// Create a scheduler using the cycle's configured interval
    pub fn new(cycle: UpdateCycle) -> Self {
        let interval = cycle.config().interval;
        Self { cycle, interval }
    }

    /// Run until `shutdown` resolves or the one-shot cycle completes
    ///
    /// `shutdown` resolves to the name of the signal that was received.
    /// Whichever of the timer and the signal is ready first wins.
    pub async fn run_until<F>(&self, shutdown: F) -> Termination
    where
        F: Future<Output = &'static str>,
    {
        tokio::pin!(shutdown);

        match self.interval {
            Some(interval) => info!("Polling every {:?}", interval),
            None => info!("No interval configured, running a single cycle"),
        }

        let mut delay = Duration::ZERO;
        loop {
            tokio::select! {
                signal = &mut shutdown => {
                    info!("Shutting down due to signal: {}", signal);
                    return Termination::Signalled(signal);
                }

                result = self.fire_after(delay) => {
                    if let Err(e) = &result {
                        error!("Failed to update records during {}: {}", e.phase(), e);
                    }

                    match self.interval {
                        Some(interval) => delay = interval,
                        None => return Termination::Completed(result),
                    }
                }
            }
        }
    }

    /// Wait out the armed timer, then run one cycle to completion
    async fn fire_after(&self, delay: Duration) -> Result<CycleOutcome> {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.cycle.run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Termination::Signalled("SIGINT").exit_code(), 0);
        assert_eq!(
            Termination::Completed(Ok(CycleOutcome::Unchanged {
                address: std::net::Ipv4Addr::new(192, 0, 2, 1),
            }))
            .exit_code(),
            0
        );
        assert_eq!(
            Termination::Completed(Err(Error::lookup("no DNS results"))).exit_code(),
            1
        );
    }
}
