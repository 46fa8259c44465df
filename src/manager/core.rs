//! Succession manager coordinator.
//!
//! The [`SuccessionManager`] owns the chain mirror and routes every change
//! through it before the platform hears about it. Handlers lock the state,
//! compute the commands synchronously, and queue them on the dispatcher
//! before the lock is released, so the platform replays mutations in exactly
//! the order the mirror applied them. A later handler always sees the
//! post-mutation topology, even while earlier platform calls are in flight.
//!
//! # Example
//!
//! ```
//! use tab_succession::{MemoryPlatform, Node, SuccessionManager, TabId, WindowId};
//!
//! # async fn example() -> tab_succession::Result<()> {
//! let window = WindowId::new(1);
//! let (a, b) = (TabId::new(1).unwrap(), TabId::new(2).unwrap());
//! let platform = MemoryPlatform::new([
//!     Node::new(a, window).with_active(true),
//!     Node::new(b, window),
//! ]);
//!
//! let manager = SuccessionManager::builder().platform(platform).build()?;
//! manager.start().await?;
//! assert_eq!(manager.chain_from(a), vec![a, b]);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chain::{
    AuditReport, ChainState, RelocateMode, audit, chain_from, discard_targets, log_audit,
};
use crate::error::{Error, Result};
use crate::identifiers::TabId;
use crate::platform::{Dispatcher, Platform};
use crate::protocol::{Event, LifecycleEvent, PlatformCommand};

use super::builder::ManagerBuilder;
use super::options::ManagerOptions;

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the manager.
pub(crate) struct ManagerInner {
    /// Behavior switches.
    pub options: ManagerOptions,

    /// Browser primitives, for queries.
    pub platform: Arc<dyn Platform>,

    /// Successor mirror and pending groups.
    pub state: Mutex<ChainState>,

    /// Ordered command worker.
    pub dispatcher: Dispatcher,

    /// Runtime the audit timer is spawned on.
    pub runtime: Handle,

    /// Pending debounced audit.
    pub audit_task: Mutex<Option<JoinHandle<()>>>,

    /// Audits completed by the timer.
    pub audit_runs: AtomicUsize,
}

/// A tab whose mirrored successor disagrees with the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessorDrift {
    /// The tab.
    pub tab_id: TabId,
    /// Successor in the local mirror.
    pub mirror: Option<TabId>,
    /// Successor the platform reports.
    pub platform: Option<TabId>,
}

// ============================================================================
// SuccessionManager
// ============================================================================

/// Keeps every window's tabs threaded into explicit successor chains.
///
/// Cheap to clone; clones share the same mirror and dispatcher.
#[derive(Clone)]
pub struct SuccessionManager {
    /// Shared inner state.
    pub(crate) inner: Arc<ManagerInner>,
}

// ============================================================================
// SuccessionManager - Display
// ============================================================================

impl fmt::Debug for SuccessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuccessionManager")
            .field("options", &self.inner.options)
            .field("tab_count", &self.inner.state.lock().tabs().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SuccessionManager - Construction
// ============================================================================

impl SuccessionManager {
    /// Creates a configuration builder for the manager.
    #[inline]
    #[must_use]
    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    /// Creates a manager with an empty mirror.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub(crate) fn new(platform: Arc<dyn Platform>, options: ManagerOptions) -> Self {
        let dispatcher = Dispatcher::spawn(Arc::clone(&platform));

        Self {
            inner: Arc::new(ManagerInner {
                options,
                platform,
                state: Mutex::new(ChainState::new()),
                dispatcher,
                runtime: Handle::current(),
                audit_task: Mutex::new(None),
                audit_runs: AtomicUsize::new(0),
            }),
        }
    }

    /// The options this manager was built with.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &ManagerOptions {
        &self.inner.options
    }
}

// ============================================================================
// SuccessionManager - Chain Building
// ============================================================================

impl SuccessionManager {
    /// Loads every open tab from the platform and threads each window into
    /// one chain headed by its active tab.
    ///
    /// Existing links are kept unless `reset_on_start` is set.
    ///
    /// # Errors
    ///
    /// Returns the platform's error if the tab listing fails.
    pub async fn start(&self) -> Result<()> {
        self.rebuild(self.inner.options.reset_on_start).await
    }

    /// Rebuilds every chain from scratch, ignoring existing successors.
    ///
    /// # Errors
    ///
    /// Returns the platform's error if the tab listing fails.
    pub async fn reset(&self) -> Result<()> {
        self.rebuild(true).await
    }

    async fn rebuild(&self, full_reset: bool) -> Result<()> {
        let nodes = self.inner.platform.query_tabs().await?;
        let tab_count = nodes.len();

        let command_count = self.mutate(|state| {
            state.load(nodes);
            let commands = state.build_initial_chains(full_reset);
            (commands.len(), commands)
        });

        info!(
            tabs = tab_count,
            commands = command_count,
            full_reset,
            "Initial chains built"
        );
        Ok(())
    }
}

// ============================================================================
// SuccessionManager - Events
// ============================================================================

impl SuccessionManager {
    /// Applies one lifecycle notification.
    ///
    /// Never fails: anything the mirror cannot resolve degrades to no chain
    /// change.
    pub fn handle(&self, event: &LifecycleEvent) {
        if matches!(event, LifecycleEvent::Unknown { .. }) {
            return;
        }
        self.mutate(|state| ((), state.apply(event)));
        self.schedule_audit();
    }

    /// Decodes and applies a raw notification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEvent`] if the params do not decode.
    pub fn handle_event(&self, event: &Event) -> Result<()> {
        let event = event.parse()?;
        self.handle(&event);
        Ok(())
    }

    /// Moves `nodes` relative to `anchor` and tells the platform.
    ///
    /// Returns `false` when the request was a no-op.
    pub fn relocate(&self, nodes: &[TabId], anchor: Option<TabId>, mode: RelocateMode) -> bool {
        self.mutate(|state| {
            let command = state.relocate(nodes, anchor, mode);
            (command.is_some(), command.into_iter().collect())
        })
    }

    /// Discards `initiating`, or its whole highlighted selection.
    ///
    /// Chains are rerouted around the discarded tabs first, and an active
    /// tab among them hands activation to its first usable successor. An
    /// active tab with no usable successor is left loaded.
    ///
    /// Returns the tabs that were actually discarded.
    ///
    /// # Errors
    ///
    /// - [`Error::TabNotFound`] if `initiating` is not in the mirror
    /// - The platform's error if the highlighted query fails
    pub async fn discard(&self, initiating: TabId) -> Result<Vec<TabId>> {
        let window = self
            .inner
            .state
            .lock()
            .tabs()
            .window_of(initiating)
            .ok_or_else(|| Error::tab_not_found(initiating))?;

        let highlighted = if self.inner.options.discard_highlighted {
            self.inner.platform.highlighted_tabs(window).await?
        } else {
            Vec::new()
        };
        let targets = discard_targets(initiating, &highlighted, self.inner.options.discard_highlighted);

        let discarded = self.mutate(|state| {
            let commands = state.discard(&targets);
            let discarded = match commands.last() {
                Some(PlatformCommand::Discard { tab_ids }) => tab_ids.clone(),
                _ => Vec::new(),
            };
            (discarded, commands)
        });

        debug!(tab_id = %initiating, window_id = %window, discarded = ?discarded, "Discard requested");
        Ok(discarded)
    }

    /// Waits until every queued platform command has run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DispatcherClosed`] after [`shutdown`](Self::shutdown).
    pub async fn flush(&self) -> Result<()> {
        self.inner.dispatcher.flush().await
    }

    /// Stops the dispatcher and cancels any pending audit.
    pub fn shutdown(&self) {
        if let Some(task) = self.inner.audit_task.lock().take() {
            task.abort();
        }
        self.inner.dispatcher.shutdown();
    }

    /// Applies a mutation and queues its commands under the same lock.
    fn mutate<T>(&self, mutation: impl FnOnce(&mut ChainState) -> (T, Vec<PlatformCommand>)) -> T {
        let mut state = self.inner.state.lock();
        let (value, commands) = mutation(&mut state);
        self.submit(commands);
        value
    }

    fn submit(&self, commands: Vec<PlatformCommand>) {
        if commands.is_empty() {
            return;
        }
        if commands.iter().any(PlatformCommand::is_succession_change) {
            self.schedule_audit();
        }
        if let Err(e) = self.inner.dispatcher.send_all(commands) {
            warn!(error = %e, "Platform commands dropped");
        }
    }
}

// ============================================================================
// SuccessionManager - Inspection
// ============================================================================

impl SuccessionManager {
    /// Copy of the current mirror and pending groups.
    #[must_use]
    pub fn snapshot(&self) -> ChainState {
        self.inner.state.lock().clone()
    }

    /// Mirrored successor of a tab.
    #[must_use]
    pub fn successor(&self, tab_id: TabId) -> Option<TabId> {
        self.inner.state.lock().tabs().successor(tab_id)
    }

    /// The mirrored chain starting at `tab_id`.
    #[must_use]
    pub fn chain_from(&self, tab_id: TabId) -> Vec<TabId> {
        chain_from(self.inner.state.lock().tabs(), tab_id)
    }

    /// Audits the mirror now, without logging.
    #[must_use]
    pub fn audit(&self) -> AuditReport {
        audit(self.inner.state.lock().tabs())
    }

    /// Number of debounced audits that have run.
    #[inline]
    #[must_use]
    pub fn audit_runs(&self) -> usize {
        self.inner.audit_runs.load(Ordering::Relaxed)
    }

    /// Compares mirrored successors with the platform's.
    ///
    /// Waits for queued commands first. Every divergence is logged; none is
    /// corrected. Tabs only one side knows about are skipped.
    ///
    /// # Errors
    ///
    /// Returns the platform's error if the tab listing fails.
    pub async fn verify_against_platform(&self) -> Result<Vec<SuccessorDrift>> {
        self.flush().await?;
        let remote: FxHashMap<TabId, Option<TabId>> = self
            .inner
            .platform
            .query_tabs()
            .await?
            .into_iter()
            .map(|node| (node.id, node.successor_id))
            .collect();

        let mut drift: Vec<SuccessorDrift> = {
            let state = self.inner.state.lock();
            state
                .tabs()
                .iter()
                .filter_map(|node| {
                    let platform = *remote.get(&node.id)?;
                    (platform != node.successor_id).then_some(SuccessorDrift {
                        tab_id: node.id,
                        mirror: node.successor_id,
                        platform,
                    })
                })
                .collect()
        };
        drift.sort_unstable_by_key(|d| d.tab_id);

        for d in &drift {
            warn!(
                tab_id = %d.tab_id,
                mirror = ?d.mirror,
                platform = ?d.platform,
                "Successor mirror drifted from platform"
            );
        }
        Ok(drift)
    }
}

// ============================================================================
// SuccessionManager - Audit Scheduling
// ============================================================================

impl SuccessionManager {
    /// Restarts the audit timer.
    fn schedule_audit(&self) {
        if !self.inner.options.audit_enabled {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let debounce = self.inner.options.audit_debounce;

        let mut slot = self.inner.audit_task.lock();
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let report = log_audit(inner.state.lock().tabs());
            inner.audit_runs.fetch_add(1, Ordering::Relaxed);
            if !report.is_consistent() {
                debug!("Audit found violations");
            }
        }));
    }
}

// ============================================================================
// Tests
// ============================================================================
