use crate::{
    core::Tick,
    error::{NebulaError, NebulaResult},
};

/// The render loop, expressed as an explicit registration with a
/// cancellation flag. Owns the monotonic tick accumulator and advances it by
/// exactly one fixed logical step per tick; wall-clock frame jitter never
/// feeds the accumulator.
///
/// Exactly one registration may be active per mounted instance: `begin` on
/// an already-active scheduler is an error, and a cancelled registration
/// refuses to advance.
#[derive(Clone, Debug, Default)]
pub struct FrameScheduler {
    tick: Tick,
    active: bool,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> NebulaResult<()> {
        if self.active {
            return Err(NebulaError::lifecycle(
                "scheduler already has an active registration",
            ));
        }
        self.active = true;
        Ok(())
    }

    /// Deterministically deactivate. Idempotent; the accumulator keeps its
    /// value so a later inspection still sees how far the loop ran.
    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance by one fixed logical step and return the new tick.
    pub fn advance(&mut self) -> NebulaResult<Tick> {
        if !self.active {
            return Err(NebulaError::lifecycle(
                "cannot advance a cancelled scheduler",
            ));
        }
        self.tick = self.tick.next();
        Ok(self.tick)
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Reset the accumulator to zero for a fresh mount. Only legal while no
    /// registration is active.
    pub fn reset(&mut self) -> NebulaResult<()> {
        if self.active {
            return Err(NebulaError::lifecycle(
                "cannot reset the accumulator while a registration is active",
            ));
        }
        self.tick = Tick::ZERO;
        Ok(())
    }
}
