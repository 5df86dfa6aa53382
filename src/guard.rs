use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use spacefs_lib::ids::EntryId;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Downloading,
    Renaming,
    Deleting,
    Moving,
    Creating,
    Uploading,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Downloading => "downloading",
            OperationKind::Renaming => "renaming",
            OperationKind::Deleting => "deleting",
            OperationKind::Moving => "moving",
            OperationKind::Creating => "creating",
            OperationKind::Uploading => "uploading",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    Idle,
    Active {
        kind: OperationKind,
        target: Option<EntryId>,
    }
}

impl OperationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, OperationState::Idle)
    }

    pub fn kind(&self) -> Option<OperationKind> {
        match self {
            OperationState::Idle => None,
            OperationState::Active { kind, .. } => Some(*kind),
        }
    }

    pub fn target(&self) -> Option<&EntryId> {
        match self {
            OperationState::Idle => None,
            OperationState::Active { target, .. } => target.as_ref(),
        }
    }
}

impl Default for OperationState {
    fn default() -> Self {
        OperationState::Idle
    }
}

/// allows a single mutating operation at a time.
///
/// [`try_acquire`](OperationGuard::try_acquire) hands out an
/// [`OperationSlot`] that returns the guard to idle when dropped, so every
/// exit path of the caller releases it, a cancelled future included.
#[derive(Debug, Default)]
pub struct OperationGuard {
    state: Mutex<OperationState>,
}

impl OperationGuard {
    pub fn new() -> Self {
        OperationGuard::default()
    }

    fn lock(&self) -> MutexGuard<'_, OperationState> {
        // the state is a plain value, a panic elsewhere cannot leave it torn
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> OperationState {
        self.lock().clone()
    }

    pub fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    pub fn try_acquire(&self, kind: OperationKind, target: Option<EntryId>) -> Result<OperationSlot<'_>> {
        let mut state = self.lock();

        if let Some(active) = state.kind() {
            return Err(Error::OperationInProgress(active));
        }

        *state = OperationState::Active { kind, target };

        Ok(OperationSlot { guard: self, kind })
    }
}

/// proof that the holder owns the guard
#[derive(Debug)]
pub struct OperationSlot<'a> {
    guard: &'a OperationGuard,
    kind: OperationKind,
}

impl OperationSlot<'_> {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl Drop for OperationSlot<'_> {
    fn drop(&mut self) {
        *self.guard.lock() = OperationState::Idle;
    }
}
