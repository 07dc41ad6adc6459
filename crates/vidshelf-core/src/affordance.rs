//! Per-control request gating.
//!
//! # Design
//! - Each user control owns one gate: `Idle -> Pending -> Idle | Failed`.
//! - A gate in `Pending` rejects new triggers with [`ControllerError::Busy`].
//! - The in-flight token settles the gate; dropping it unsettled returns to `Idle`.

use std::cell::Cell;
use std::fmt::{self, Display, Formatter};

use crate::error::{ControllerError, ControllerResult};

/// User controls whose requests are serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Affordance {
    /// Load button of the player.
    Load,
    /// Drop zone and file-browse input.
    Upload,
    /// Delete button opening the removal dialog.
    OpenRemoval,
    /// Confirm button inside the removal dialog.
    ConfirmRemoval,
}

impl Affordance {
    /// Stable lowercase label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Upload => "upload",
            Self::OpenRemoval => "open_removal",
            Self::ConfirmRemoval => "confirm_removal",
        }
    }
}

impl Display for Affordance {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Request state of one affordance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AffordanceState {
    /// Ready for input.
    #[default]
    Idle,
    /// A request is outstanding; input is ignored.
    Pending,
    /// The last request failed; input is accepted again.
    Failed,
}

#[derive(Debug)]
pub(crate) struct AffordanceGate {
    kind: Affordance,
    state: Cell<AffordanceState>,
}

impl AffordanceGate {
    pub(crate) const fn new(kind: Affordance) -> Self {
        Self {
            kind,
            state: Cell::new(AffordanceState::Idle),
        }
    }

    pub(crate) fn state(&self) -> AffordanceState {
        self.state.get()
    }

    pub(crate) fn ensure_ready(&self) -> ControllerResult<()> {
        if self.state.get() == AffordanceState::Pending {
            tracing::debug!(affordance = %self.kind, "ignoring trigger while request is pending");
            return Err(ControllerError::Busy {
                affordance: self.kind,
            });
        }
        Ok(())
    }

    pub(crate) fn begin(&self) -> ControllerResult<InFlight<'_>> {
        self.ensure_ready()?;
        self.state.set(AffordanceState::Pending);
        Ok(InFlight {
            gate: self,
            settled: false,
        })
    }
}

/// Token held while a request is outstanding.
#[must_use]
pub(crate) struct InFlight<'a> {
    gate: &'a AffordanceGate,
    settled: bool,
}

impl InFlight<'_> {
    pub(crate) fn finish<T>(mut self, result: &ControllerResult<T>) {
        let next = if result.is_ok() {
            AffordanceState::Idle
        } else {
            AffordanceState::Failed
        };
        self.gate.state.set(next);
        self.settled = true;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.gate.state.set(AffordanceState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_gate_rejects_second_trigger() {
        let gate = AffordanceGate::new(Affordance::Upload);
        let flight = gate.begin();
        assert!(flight.is_ok());
        assert_eq!(gate.state(), AffordanceState::Pending);
        assert!(matches!(
            gate.begin(),
            Err(ControllerError::Busy {
                affordance: Affordance::Upload
            })
        ));
        drop(flight);
        assert_eq!(gate.state(), AffordanceState::Idle);
    }

    #[test]
    fn finish_records_failure_and_accepts_retry() -> ControllerResult<()> {
        let gate = AffordanceGate::new(Affordance::ConfirmRemoval);
        let failed: ControllerResult<()> = Err(ControllerError::RemoteFailure {
            operation: crate::error::Operation::Delete,
            message: "Failed to delete".to_string(),
        });
        gate.begin()?.finish(&failed);
        assert_eq!(gate.state(), AffordanceState::Failed);

        gate.begin()?.finish(&Ok(()));
        assert_eq!(gate.state(), AffordanceState::Idle);
        Ok(())
    }
}
