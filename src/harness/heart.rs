//! Structures to keep the process alive until some event occurs

use std::fmt;
use tokio::signal::ctrl_c;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tracing::{debug, error, warn};

/// Reason why the heart stopped beating
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeathReason {
    /// Internal kill signal has been sent
    Killed(String),
    /// SIGINT, SIGTERM or other process-external cause
    Terminated,
}

impl fmt::Display for DeathReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathReason::Killed(reason) => write!(f, "Killed ({})", reason),
            DeathReason::Terminated => write!(f, "Terminated due to external signal"),
        }
    }
}

/// Lifecycle management struct that can be used to keep the application alive
pub struct Heart {
    rx: Receiver<String>,
}

impl Heart {
    /// Creates a new heart and linked stone
    pub fn new() -> (Self, HeartStone) {
        let (tx, rx) = channel(2);

        (Self { rx }, HeartStone { remote: tx })
    }

    /// Creates a new heart which only dies from external signals
    pub fn without_heart_stone() -> Self {
        Heart::new().0
    }

    /// Future that waits until the heart dies for the returned reason
    pub async fn death(&mut self) -> DeathReason {
        debug!("Heart starts beating");

        tokio::select! {
            Some(reason) = self.rx.recv() => DeathReason::Killed(reason),
            _ = termination_signal() => DeathReason::Terminated,
        }
    }
}

async fn termination_signal() {
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!("Unable to listen for SIGTERM: {}", e);
            if let Err(e) = ctrl_c().await {
                error!("Unable to listen for SIGINT: {}", e);
                futures::future::pending::<()>().await;
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {},
        result = ctrl_c() => {
            if let Err(e) = result {
                error!("Unable to listen for SIGINT: {}", e);
                sigterm.recv().await;
            }
        },
    }
}

/// Remote controller for the heart
#[derive(Clone)]
pub struct HeartStone {
    remote: Sender<String>,
}

impl HeartStone {
    /// Kill the associated heart
    pub async fn kill(&self, reason: impl Into<String>) {
        if self.remote.send(reason.into()).await.is_err() {
            error!("Failed to kill heart as it is already dead");
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use futures::poll;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use tokio::task::{spawn, yield_now};
    use tokio::time::sleep;

    #[tokio::test]
    async fn live_without_stone() {
        let mut heart = Heart::without_heart_stone();

        let handle = spawn(async move { heart.death().await });
        sleep(Duration::from_millis(100)).await;
        yield_now().await;

        assert!(!poll!(handle).is_ready());
    }

    #[tokio::test]
    async fn die_when_killed() {
        let (mut heart, stone) = Heart::new();

        let handle = spawn(async move { heart.death().await });
        stone.kill("testing").await;

        assert_eq!(handle.await.unwrap(), DeathReason::Killed("testing".into()));
    }
}
