//! Ordered command dispatch.
//!
//! The dispatcher owns a tokio task that executes [`PlatformCommand`]s one at
//! a time, in the order they were queued. Queuing never blocks, so lifecycle
//! handlers hand their commands off and return immediately.
//!
//! Failures are logged and counted, never retried.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::PlatformCommand;

use super::Platform;

// ============================================================================
// DispatcherCommand
// ============================================================================

/// Internal messages for the worker.
enum DispatcherCommand {
    /// Execute a platform command.
    Execute(PlatformCommand),
    /// Signal once everything queued before has run.
    Flush(oneshot::Sender<()>),
    /// Stop the worker.
    Shutdown,
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Handle to the command worker.
///
/// Cheap to clone; all clones feed the same worker.
#[derive(Clone)]
pub struct Dispatcher {
    /// Channel into the worker.
    command_tx: mpsc::UnboundedSender<DispatcherCommand>,
    /// Commands the platform rejected.
    failures: Arc<AtomicUsize>,
}

impl Dispatcher {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(platform: Arc<dyn Platform>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let failures = Arc::new(AtomicUsize::new(0));

        tokio::spawn(Self::run_event_loop(platform, command_rx, Arc::clone(&failures)));

        Self {
            command_tx,
            failures,
        }
    }

    /// Queues a command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DispatcherClosed`] if the worker has stopped.
    pub fn send(&self, command: PlatformCommand) -> Result<()> {
        trace!(method = command.method(), "Queued platform command");
        self.command_tx
            .send(DispatcherCommand::Execute(command))
            .map_err(|_| Error::DispatcherClosed)
    }

    /// Queues several commands, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DispatcherClosed`] if the worker has stopped.
    pub fn send_all(&self, commands: impl IntoIterator<Item = PlatformCommand>) -> Result<()> {
        for command in commands {
            self.send(command)?;
        }
        Ok(())
    }

    /// Waits until every command queued so far has been executed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DispatcherClosed`] if the worker has stopped.
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.command_tx
            .send(DispatcherCommand::Flush(tx))
            .map_err(|_| Error::DispatcherClosed)?;
        rx.await.map_err(|_| Error::DispatcherClosed)
    }

    /// Number of commands the platform rejected so far.
    #[inline]
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    /// Returns `true` while the worker is running.
    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.command_tx.is_closed()
    }

    /// Stops the worker after the commands already queued.
    pub fn shutdown(&self) {
        let _ = self.command_tx.send(DispatcherCommand::Shutdown);
    }

    /// Worker loop.
    async fn run_event_loop(
        platform: Arc<dyn Platform>,
        mut command_rx: mpsc::UnboundedReceiver<DispatcherCommand>,
        failures: Arc<AtomicUsize>,
    ) {
        while let Some(command) = command_rx.recv().await {
            match command {
                DispatcherCommand::Execute(command) => {
                    if let Err(e) = platform.execute(&command).await {
                        failures.fetch_add(1, Ordering::Relaxed);
                        warn!(method = command.method(), error = %e, "Platform command failed");
                    }
                }

                DispatcherCommand::Flush(done) => {
                    let _ = done.send(());
                }

                DispatcherCommand::Shutdown => {
                    debug!("Shutdown command received");
                    break;
                }
            }
        }

        debug!("Dispatcher terminated");
    }
}

// ============================================================================
// Tests
// ============================================================================
