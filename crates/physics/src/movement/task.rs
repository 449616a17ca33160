//! Time-boxed task progress shared by every movement mode.

use serde::{Deserialize, Serialize};

/// Elapsed time of a task with a hard duration.
///
/// Tasks are advanced once per tick by the controller. Reaching the
/// duration finishes the task; the owner then runs its completion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskTimer {
    pub elapsed: f32,
    pub duration: f32,
}

impl TaskTimer {
    pub fn new(duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
        }
    }

    /// Advance by `dt`. Returns `true` once the duration has been reached.
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_finished()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Completion in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn remaining(&self) -> f32 {
        (self.duration - self.elapsed).max(0.0)
    }
}
