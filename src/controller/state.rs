//! Lifecycle states and the snapshot renderers consume

use crate::controller::error::ErrorRecord;
use crate::image::{ImageRef, TranslationResult};
use crate::options::TranslationConfig;
use std::fmt;
use std::sync::Arc;

/// Top-level request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// No image selected
    #[default]
    Idle,
    /// Image present, no request in flight
    Ready,
    /// Request in flight
    Submitting,
    /// Translation result available
    Succeeded,
    /// Error available
    Failed,
}

impl LifecycleState {
    /// Whether `submit()` may start from this state, given an image is present
    pub fn can_submit(&self) -> bool {
        matches!(
            self,
            LifecycleState::Ready | LifecycleState::Succeeded | LifecycleState::Failed
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Ready => "ready",
            LifecycleState::Submitting => "submitting",
            LifecycleState::Succeeded => "succeeded",
            LifecycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Immutable view of the controller, published after every transition
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub state: LifecycleState,
    pub image: Option<Arc<ImageRef>>,
    pub result: Option<Arc<TranslationResult>>,
    pub error: Option<ErrorRecord>,
    /// Current loading phrase, only while submitting
    pub status: Option<String>,
    pub configuration: TranslationConfig,
}

impl Snapshot {
    pub fn is_busy(&self) -> bool {
        self.state == LifecycleState::Submitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        assert_eq!(LifecycleState::default(), LifecycleState::Idle);
        assert!(!Snapshot::default().is_busy());
    }

    #[test]
    fn test_can_submit() {
        assert!(!LifecycleState::Idle.can_submit());
        assert!(LifecycleState::Ready.can_submit());
        assert!(!LifecycleState::Submitting.can_submit());
        assert!(LifecycleState::Succeeded.can_submit());
        assert!(LifecycleState::Failed.can_submit());
    }
}
