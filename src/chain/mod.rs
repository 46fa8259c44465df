//! Succession chain bookkeeping.
//!
//! Everything in here is synchronous and operates on the local mirror.
//! Each mutating operation returns the [`PlatformCommand`]s that replay the
//! same change on the browser side; sending them is the manager's job.
//!
//! [`PlatformCommand`]: crate::protocol::PlatformCommand
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `node` | Tab nodes and the successor/predecessor mirror |
//! | `mutator` | Relocation with gap healing |
//! | `resolver` | Cycle-safe chain walks |
//! | `builder` | One chain per window at startup or reset |
//! | `opener` | Pending background-tab groups |
//! | `lifecycle` | Lifecycle notification handlers |
//! | `discard` | Bulk discard rerouting |
//! | `audit` | Invariant checks and debug report |

// ============================================================================
// Submodules
// ============================================================================

pub mod audit;
pub mod builder;
pub mod discard;
pub mod lifecycle;
pub mod mutator;
pub mod node;
pub mod opener;
pub mod resolver;

// ============================================================================
// Re-exports
// ============================================================================

pub use audit::{AuditReport, TabSummary, WindowAudit, audit, log_audit};
pub use builder::build_initial_chains;
pub use discard::{DiscardPlan, discard_targets};
pub use lifecycle::ChainState;
pub use mutator::{RelocateMode, relocate};
pub use node::{Node, TabTable};
pub use opener::{OpenerGroups, activation_order};
pub use resolver::{ChainIter, chain_from, find_successor};
