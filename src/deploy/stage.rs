//! Deployment progress.
//!
//! ```text
//! Idle → SignerReady → Deployed → Confirmed(1) → Confirmed(5) → Verified
//!                                                             ↘ VerificationFailed
//! ```
//! Stages only move forward.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "stage", content = "confirmations")]
pub enum DeployStage {
    Idle,
    SignerReady,
    Deployed,
    Confirmed(u64),
    Verified,
    VerificationFailed,
}

impl DeployStage {
    fn rank(self) -> (u8, u64) {
        match self {
            DeployStage::Idle => (0, 0),
            DeployStage::SignerReady => (1, 0),
            DeployStage::Deployed => (2, 0),
            DeployStage::Confirmed(n) => (3, n),
            DeployStage::Verified | DeployStage::VerificationFailed => (4, 0),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeployStage::Verified | DeployStage::VerificationFailed)
    }
}

impl fmt::Display for DeployStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStage::Idle => write!(f, "idle"),
            DeployStage::SignerReady => write!(f, "signer ready"),
            DeployStage::Deployed => write!(f, "deployed"),
            DeployStage::Confirmed(n) => write!(f, "confirmed ({})", n),
            DeployStage::Verified => write!(f, "verified"),
            DeployStage::VerificationFailed => write!(f, "verification failed"),
        }
    }
}

/// Tracks the current stage of one run.
#[derive(Debug)]
pub struct StageTracker {
    current: DeployStage,
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: DeployStage::Idle,
        }
    }

    pub fn current(&self) -> DeployStage {
        self.current
    }

    /// Move to `next`. Returns false, leaving the stage unchanged, when
    /// `next` would not be a step forward.
    pub fn advance(&mut self, next: DeployStage) -> bool {
        if self.current.is_terminal() || next.rank() <= self.current.rank() {
            tracing::warn!(from = %self.current, to = %next, "Ignoring backward stage transition");
            return false;
        }
        tracing::debug!(from = %self.current, to = %next, "Deployment stage");
        self.current = next;
        true
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}
