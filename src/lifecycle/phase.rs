//! Host lifecycle phases.

use std::fmt;

/// Where a [`Host`](crate::Host) is in its lifecycle.
///
/// Transitions are strictly forward; a phase is never re-entered.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Created = 0,
    Configured = 1,
    Running = 2,
    Draining = 3,
    Stopped = 4,
}

impl Phase {
    /// Services may still be added.
    pub fn accepts_registration(self) -> bool {
        matches!(self, Phase::Created | Phase::Configured)
    }

    /// Advance to `next`, rejecting any backward or same-phase move.
    ///
    /// `Created → Configured` is the only transition that may be repeated as
    /// a no-op (every successful registration requests it).
    pub fn advance(&mut self, next: Phase) -> Result<(), PhaseError> {
        if *self == Phase::Configured && next == Phase::Configured {
            return Ok(());
        }
        if next <= *self {
            return Err(PhaseError {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Created => "created",
            Phase::Configured => "configured",
            Phase::Running => "running",
            Phase::Draining => "draining",
            Phase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Attempted backward transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid phase transition {from} -> {to}")]
pub struct PhaseError {
    pub from: Phase,
    pub to: Phase,
}
