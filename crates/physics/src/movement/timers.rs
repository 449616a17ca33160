//! Countdown timers and the dash-charge pool.

use serde::{Deserialize, Serialize};

/// Count a timer down by `dt`, flooring at zero.
#[inline]
pub fn tick_down(timer: &mut f32, dt: f32) {
    *timer = (*timer - dt).max(0.0);
}

/// A pool of dash charges, each with its own recharge timer.
///
/// A slot is available when its timer has run down to zero. Spending a
/// charge arms the earliest available slot with the recharge delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashCharges {
    slots: Vec<f32>,
    recharge_delay: f32,
}

impl DashCharges {
    /// A full pool of `count` charges.
    pub fn new(count: usize, recharge_delay: f32) -> Self {
        Self {
            slots: vec![0.0; count],
            recharge_delay,
        }
    }

    /// Total number of charges.
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Number of charges ready to use.
    pub fn available(&self) -> usize {
        self.slots.iter().filter(|t| **t <= 0.0).count()
    }

    /// Spend the earliest available charge.
    ///
    /// Returns `false` if every slot is still recharging.
    pub fn try_consume(&mut self) -> bool {
        match self.slots.iter_mut().find(|t| **t <= 0.0) {
            Some(slot) => {
                *slot = self.recharge_delay;
                true
            }
            None => false,
        }
    }

    /// Advance every slot's recharge.
    pub fn tick(&mut self, dt: f32) {
        for slot in &mut self.slots {
            tick_down(slot, dt);
        }
    }

    /// Make every charge available again.
    pub fn refill(&mut self) {
        self.slots.iter_mut().for_each(|t| *t = 0.0);
    }

    /// Fill level for a cooldown meter.
    ///
    /// `1.0` while any charge is ready, otherwise how far the slot closest
    /// to recharging has come.
    pub fn cooldown_fraction(&self) -> f32 {
        if self.available() > 0 || self.recharge_delay <= 0.0 {
            return 1.0;
        }
        let nearest = self.slots.iter().copied().fold(f32::INFINITY, f32::min);
        1.0 - (nearest / self.recharge_delay).clamp(0.0, 1.0)
    }
}
