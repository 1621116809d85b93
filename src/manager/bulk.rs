//! Fleet-wide operations
//!
//! Containers are visited in sorted name order. A failure on one container
//! is recorded and the loop moves on; only an interrupt ends a batch early,
//! and it does so between containers, never in the middle of one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{ContainerState, Manager, Operation};
use crate::error::{LlxcError, Result};
use crate::runtime::Runtime;

/// Cooperative cancellation flag shared with the signal handler
#[derive(Debug, Clone, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Which containers a bulk action touches and what it does to them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    StartAll,
    HaltAll,
    KillAll,
}

impl BulkAction {
    pub fn operation(&self) -> Operation {
        match self {
            Self::StartAll => Operation::Start,
            Self::HaltAll => Operation::Halt,
            Self::KillAll => Operation::Kill,
        }
    }

    /// Whether a container in `state` is a target of this action
    pub fn applies_to(&self, state: ContainerState) -> bool {
        match self {
            Self::StartAll => state == ContainerState::Stopped,
            Self::HaltAll => state == ContainerState::Running,
            Self::KillAll => matches!(state, ContainerState::Running | ContainerState::Frozen),
        }
    }
}

/// Per-container outcome of a batch
#[derive(Debug, Default)]
pub struct BulkReport {
    pub succeeded: Vec<String>,
    /// Containers not in a state the action applies to
    pub skipped: Vec<String>,
    pub failed: Vec<(String, LlxcError)>,
    /// The batch stopped early on an interrupt
    pub interrupted: bool,
}

impl BulkReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && !self.interrupted
    }

    pub(crate) fn record(&mut self, name: &str, result: Result<()>) {
        match result {
            Ok(()) => self.succeeded.push(name.to_string()),
            Err(e) => {
                log::warn!("{}: {}", name, e);
                self.failed.push((name.to_string(), e));
            }
        }
    }
}

impl<R: Runtime> Manager<R> {
    /// Apply `action` to every live container whose state it targets
    pub async fn bulk(&self, action: BulkAction) -> Result<BulkReport> {
        self.validator.require_privilege()?;

        let op = action.operation();
        let mut report = BulkReport::default();

        for name in self.live_names() {
            if self.interrupt.is_triggered() {
                log::warn!("Interrupted, stopping before {}", name);
                report.interrupted = true;
                break;
            }

            let state = match self.state(&name).await {
                Ok(state) => state,
                Err(e) => {
                    report.record(&name, Err(e));
                    continue;
                }
            };

            if !action.applies_to(state) {
                log::debug!("Skipping {} ({})", name, state);
                report.skipped.push(name);
                continue;
            }

            log::info!("Bulk {}: {}", op.as_str(), name);
            let result = self.apply(op, &name).await;
            report.record(&name, result);
        }

        Ok(report)
    }

    pub async fn start_all(&self) -> Result<BulkReport> {
        self.bulk(BulkAction::StartAll).await
    }

    pub async fn halt_all(&self) -> Result<BulkReport> {
        self.bulk(BulkAction::HaltAll).await
    }

    pub async fn kill_all(&self) -> Result<BulkReport> {
        self.bulk(BulkAction::KillAll).await
    }
}
