//! Idle escalation timer.
//!
//! One pending deadline, re-armed by every qualifying interaction. When it
//! fires uninterrupted the egg says "hmm", then reverts to baseline shortly
//! after. Pure bookkeeping; the stage tick drives it and applies the text.

/// Idle escalation delay.
pub const IDLE_MS: f64 = 45_000.0;

/// How long the "hmm" lingers before reverting to baseline.
pub const IDLE_REVERT_MS: f64 = 1100.0;

pub enum IdleEvent {
    /// The deadline fired: show the idle message.
    Escalate,
    /// The linger elapsed: back to baseline.
    Revert,
}

pub struct IdleTimer {
    deadline: Option<f64>,
    revert_at: Option<f64>,
}

impl IdleTimer {
    /// Armed at startup, as if an interaction just happened.
    pub fn armed(now: f64) -> Self {
        Self {
            deadline: Some(now + IDLE_MS),
            revert_at: None,
        }
    }

    /// A qualifying interaction: cancel and reschedule the single deadline.
    pub fn interact(&mut self, now: f64) {
        self.deadline = Some(now + IDLE_MS);
    }

    /// Advance to `now`. After firing, the timer stays disarmed until the
    /// next interaction.
    pub fn tick(&mut self, now: f64) -> Option<IdleEvent> {
        if let Some(deadline) = self.deadline {
            if now >= deadline {
                self.deadline = None;
                self.revert_at = Some(now + IDLE_REVERT_MS);
                return Some(IdleEvent::Escalate);
            }
        }
        if let Some(at) = self.revert_at {
            if now >= at {
                self.revert_at = None;
                return Some(IdleEvent::Revert);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_the_full_delay() {
        let mut idle = IdleTimer::armed(0.0);
        assert!(idle.tick(IDLE_MS - 1.0).is_none());
        assert!(matches!(idle.tick(IDLE_MS), Some(IdleEvent::Escalate)));
    }

    #[test]
    fn interaction_postpones_the_deadline() {
        let mut idle = IdleTimer::armed(0.0);
        idle.interact(30_000.0);
        assert!(idle.tick(IDLE_MS).is_none(), "old deadline must be gone");
        assert!(idle.tick(30_000.0 + IDLE_MS - 1.0).is_none());
        assert!(matches!(
            idle.tick(30_000.0 + IDLE_MS),
            Some(IdleEvent::Escalate)
        ));
    }

    #[test]
    fn reverts_after_the_linger_then_stays_quiet() {
        let mut idle = IdleTimer::armed(0.0);
        assert!(matches!(idle.tick(IDLE_MS), Some(IdleEvent::Escalate)));
        assert!(idle.tick(IDLE_MS + IDLE_REVERT_MS - 1.0).is_none());
        assert!(matches!(
            idle.tick(IDLE_MS + IDLE_REVERT_MS),
            Some(IdleEvent::Revert)
        ));
        // Disarmed until the next interaction, however long we wait.
        assert!(idle.tick(IDLE_MS * 10.0).is_none());
        idle.interact(IDLE_MS * 10.0);
        assert!(matches!(
            idle.tick(IDLE_MS * 11.0),
            Some(IdleEvent::Escalate)
        ));
    }
}
