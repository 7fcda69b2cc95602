use super::{DeathReason, Heart};
use crate::library::{BoxedError, EmptyResult};
use async_trait::async_trait;
use jatsl::JobScheduler;
use std::any::type_name;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

/// Executable module
#[async_trait]
pub trait Module {
    /// Executed before running the core loop
    async fn pre_startup(&mut self) -> EmptyResult {
        Ok(())
    }

    /// Core run loop of the module
    ///
    /// When the function returns `Some(_)` the death of the returned [`Heart`] is awaited before calling the shutdown hook.
    /// Useful for situations where you dispatch background jobs in the run loop but want to hand-off the program lifecycle management.
    ///
    /// Returning `None` results in the program entering a shutdown state right away.
    async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError>;

    /// Shutdown hook executed after the core loop and all associated jobs have terminated
    #[instrument(skip(self))]
    async fn post_shutdown(&mut self, termination_reason: ModuleTerminationReason) {
        match termination_reason {
            ModuleTerminationReason::HeartDied(_) | ModuleTerminationReason::ExitedNormally => {
                info!("Module exited normally")
            }
            _ => error!("Module terminated with an error"),
        }
    }
}

/// Reason why a module has terminated
#[derive(Error, Debug)]
pub enum ModuleTerminationReason {
    /// Startup routine threw an error
    #[error("startup routine threw an error")]
    StartupFailed(#[source] BoxedError),
    /// Core run loop threw an error
    #[error("error during operation")]
    OperationalError(#[source] BoxedError),
    /// [`Heart`] provided by module died
    #[error("heart provided by module died: {0}")]
    HeartDied(DeathReason),
    /// Run loop exited cleanly
    #[error("run loop exited cleanly")]
    ExitedNormally,
    /// Timeout during startup
    #[error("timeout during startup")]
    Timeout,
}

/// Runner for [`Module`] implementations
pub struct ModuleRunner {
    startup_timeout: Duration,
    shutdown_timeout: Duration,
    termination_timeout: Duration,
}

impl Default for ModuleRunner {
    fn default() -> Self {
        Self {
            startup_timeout: Duration::from_secs(60),
            shutdown_timeout: Duration::from_secs(60),
            termination_timeout: Duration::from_secs(5),
        }
    }
}

impl ModuleRunner {
    /// Creates a runner with custom lifecycle timeouts
    pub fn new(startup_timeout: Duration, shutdown_timeout: Duration) -> Self {
        Self {
            startup_timeout,
            shutdown_timeout,
            ..Default::default()
        }
    }

    /// Executes a [`Module`] until it exits by calling the corresponding lifecycle functions in order.
    #[instrument(skip(self, module), fields(module_name = type_name::<M>()))]
    pub async fn run<M: Module + Send + Sync>(&self, mut module: M) {
        let scheduler = JobScheduler::default();
        let mut termination_reason = ModuleTerminationReason::ExitedNormally;

        info!("Commencing module startup sequence");
        let startup = timeout(self.startup_timeout, module.pre_startup()).await;

        match startup {
            Ok(Ok(_)) => {
                self.run_loop(&mut module, &scheduler, &mut termination_reason)
                    .await
            }
            Ok(Err(error)) => {
                error!(?error, "Module startup sequence encountered an error");
                termination_reason = ModuleTerminationReason::StartupFailed(error);
            }
            Err(_) => {
                error!("Module startup sequence timed out");
                termination_reason = ModuleTerminationReason::Timeout
            }
        }

        info!("Terminating remaining jobs");
        scheduler.terminate_jobs(self.termination_timeout).await;

        info!("Commencing module shutdown sequence");
        let result = timeout(
            self.shutdown_timeout,
            module.post_shutdown(termination_reason),
        )
        .await;

        if result.is_err() {
            error!("Module shutdown sequence timed out");
        }
    }

    #[instrument(skip(self, module, scheduler, termination_reason))]
    async fn run_loop<M: Module + Send + Sync>(
        &self,
        module: &mut M,
        scheduler: &JobScheduler,
        termination_reason: &mut ModuleTerminationReason,
    ) {
        info!("Executing module run procedure");
        match module.run(scheduler).await {
            Ok(None) => {
                debug!("Module run procedure completed successfully");
            }
            Ok(Some(mut heart)) => {
                debug!("Module run procedure completed successfully, entering run loop");
                let death_reason = heart.death().await;
                info!(%death_reason, "Heart provided by run procedure died");
                *termination_reason = ModuleTerminationReason::HeartDied(death_reason);
            }
            Err(error) => {
                error!(?error, "Module run procedure encountered an error");
                *termination_reason = ModuleTerminationReason::OperationalError(error);
            }
        }
    }
}

#[cfg(test)]
mod does {
    use super::*;
    use crate::harness::HeartStone;
    use jatsl::{Job, JobManager};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    struct IdleJob;

    #[async_trait]
    impl Job for IdleJob {
        const NAME: &'static str = "idle";
        const SUPPORTS_GRACEFUL_TERMINATION: bool = true;

        async fn execute(&self, manager: JobManager) -> EmptyResult {
            manager.ready().await;
            manager.termination_signal().await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingModule {
        fail_startup: bool,
        stone: Option<HeartStone>,
        reason: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl Module for RecordingModule {
        async fn pre_startup(&mut self) -> EmptyResult {
            if self.fail_startup {
                Err("no database".into())
            } else {
                Ok(())
            }
        }

        async fn run(&mut self, scheduler: &JobScheduler) -> Result<Option<Heart>, BoxedError> {
            scheduler.spawn_job(IdleJob).await;

            let (heart, stone) = Heart::new();
            stone.kill("done").await;
            self.stone = Some(stone);

            Ok(Some(heart))
        }

        async fn post_shutdown(&mut self, termination_reason: ModuleTerminationReason) {
            *self.reason.lock().unwrap() = Some(termination_reason.to_string());
        }
    }

    #[tokio::test]
    async fn run_until_heart_dies() {
        let module = RecordingModule::default();
        let reason = module.reason.clone();

        ModuleRunner::default().run(module).await;

        assert_eq!(
            reason.lock().unwrap().clone(),
            Some("heart provided by module died: Killed (done)".to_owned())
        );
    }

    #[tokio::test]
    async fn skip_run_when_startup_fails() {
        let module = RecordingModule {
            fail_startup: true,
            ..Default::default()
        };
        let reason = module.reason.clone();

        ModuleRunner::default().run(module).await;

        assert_eq!(
            reason.lock().unwrap().clone(),
            Some("startup routine threw an error".to_owned())
        );
    }
}
