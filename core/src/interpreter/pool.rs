//! Worker-pool executor
//!
//! Drives asynchronous requests to completion on a tokio multi-thread
//! runtime. Each request future is polled by `block_on` on the calling
//! thread; the configured workers supply the timer and IO reactor and run
//! anything the request spawns. The pool belongs to the executor: it is
//! started when the executor is built and shut down when the interpreter
//! releases it.

use super::executor::Executor;
use super::future::AsyncEffect;
use crate::config::ExecutorConfig;
use crate::process::Failure;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::info;

pub struct PooledExecutor {
    runtime: Option<Runtime>,
    shutdown_timeout: Duration,
}

impl PooledExecutor {
    /// Start a worker pool sized and named by `config`
    pub fn new(config: &ExecutorConfig) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(config.worker_threads)
            .thread_name(config.thread_name.clone())
            .enable_all()
            .build()?;

        info!(
            workers = config.worker_threads,
            thread_name = %config.thread_name,
            "worker pool started"
        );

        Ok(Self {
            runtime: Some(runtime),
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn is_running(&self) -> bool {
        self.runtime.is_some()
    }
}

impl<F: AsyncEffect> Executor<F> for PooledExecutor {
    /// Block the caller until `request` completes
    fn execute(&mut self, request: F) -> Result<F::Output, Failure> {
        let runtime = self
            .runtime
            .as_ref()
            .ok_or_else(|| Failure::effect("worker pool has been shut down"))?;
        runtime.block_on(request.perform())
    }

    fn shutdown(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            info!(timeout_ms = self.shutdown_timeout.as_millis() as u64, "shutting down worker pool");
            runtime.shutdown_timeout(self.shutdown_timeout);
        }
    }
}
