use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    SchemaReady,
    StationsImported,
    ImportingDay,
    Committed,
    Closed,
}

#[derive(Debug, Error, PartialEq)]
#[error("illegal run transition from {from:?} to {to:?}")]
pub struct TransitionError {
    pub from: RunPhase,
    pub to: RunPhase,
}

/// Phase tracker for one import run:
/// `Idle -> SchemaReady -> StationsImported -> ImportingDay* -> Committed -> Closed`.
/// Any phase may jump to `Closed` so the connection is released on abort.
#[derive(Debug, Clone)]
pub struct RunStateMachine {
    phase: RunPhase,
}

impl Default for RunStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStateMachine {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn advance(&mut self, next: RunPhase) -> Result<RunPhase, TransitionError> {
        use RunPhase::*;

        let allowed = matches!(
            (self.phase, next),
            (Idle, SchemaReady)
                | (SchemaReady, StationsImported)
                | (StationsImported, ImportingDay)
                | (StationsImported, Committed)
                | (ImportingDay, ImportingDay)
                | (ImportingDay, Committed)
        ) || (next == Closed && self.phase != Closed);

        if !allowed {
            return Err(TransitionError {
                from: self.phase,
                to: next,
            });
        }

        let previous = self.phase;
        self.phase = next;
        tracing::debug!(from = ?previous, to = ?next, "run phase changed");
        Ok(previous)
    }
}
