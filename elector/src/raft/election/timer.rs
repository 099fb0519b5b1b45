use crate::configuration::ElectionConfiguration;
use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;

/// Expiry of the countdown started by the `generation`-th reset.
#[derive(Debug)]
pub struct Elapsed {
    generation: u64,
}

/// Range the election timeout is drawn from.
#[derive(Clone, Copy, Debug)]
pub struct ElectionTimeout {
    millis: u64,
    jitter_millis: u64,
}

impl ElectionTimeout {
    pub fn new(millis: u64, jitter_millis: u64) -> Self {
        Self {
            millis,
            jitter_millis,
        }
    }

    pub fn sample(&self) -> Duration {
        let mut rng = rand::thread_rng();
        Duration::from_millis(self.millis + rng.gen_range(0..=self.jitter_millis))
    }
}

impl From<&ElectionConfiguration> for ElectionTimeout {
    fn from(conf: &ElectionConfiguration) -> Self {
        Self::new(
            conf.election_timeout_millis,
            conf.election_timeout_jitter_millis,
        )
    }
}

/// Countdown which fires whenever no reset arrives within a randomized timeout.
///
/// A fresh timeout is drawn after every expiry and every reset.
/// An expiry counted before the latest reset is never reported.
/// The countdown stops when the timer is dropped.
pub struct ElectionTimer {
    generation: u64,
    tx: watch::Sender<u64>,
    rx: mpsc::Receiver<Elapsed>,
}

impl ElectionTimer {
    pub fn spawn(timeout: ElectionTimeout) -> Self {
        let (tx_reset, rx_reset) = watch::channel(0);
        let (tx_elapsed, rx_elapsed) = mpsc::channel(1);
        let process = ElectionTimerProcess {
            generation: 0,
            rx: rx_reset,
            tx: tx_elapsed,
            timeout,
        };
        tokio::spawn(process.run());

        ElectionTimer {
            generation: 0,
            tx: tx_reset,
            rx: rx_elapsed,
        }
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        if self.tx.send(self.generation).is_err() {
            tracing::warn!("failed to reset the election timer: timer has stopped")
        }
    }

    /// Waits until the timeout elapses.
    pub async fn elapsed(&mut self) -> Option<Elapsed> {
        loop {
            let elapsed = self.rx.recv().await?;
            if elapsed.generation == self.generation {
                return Some(elapsed);
            }
            tracing::trace!(
                generation = elapsed.generation,
                current = self.generation,
                "discard an expiry counted before the last reset"
            );
        }
    }
}

struct ElectionTimerProcess {
    generation: u64,
    rx: watch::Receiver<u64>,
    tx: mpsc::Sender<Elapsed>,
    timeout: ElectionTimeout,
}

impl ElectionTimerProcess {
    async fn run(mut self) {
        loop {
            let d = self.timeout.sample();
            let res = tokio::time::timeout(d, self.rx.changed()).await;
            match res {
                Ok(Ok(())) => {
                    self.generation = *self.rx.borrow();
                }
                Ok(Err(_)) => {
                    tracing::trace!("election timer is terminated since the owner is dropped");
                    return;
                }
                Err(_) => {
                    tracing::trace!(millis = d.as_millis() as u64, "election timeout elapsed");
                    let elapsed = Elapsed {
                        generation: self.generation,
                    };
                    if self.tx.send(elapsed).await.is_err() {
                        tracing::trace!("election timer is terminated since the owner is dropped");
                        return;
                    }
                }
            }
        }
    }
}
