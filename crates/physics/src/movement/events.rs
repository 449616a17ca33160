//! Movement notifications for presentation code (particles, audio, HUD).
//!
//! The controller owns a [`NotificationBus`]; listeners subscribe with a
//! callback and get every event published after each tick.

use serde::{Deserialize, Serialize};

use super::sensor::WallSide;

/// A movement state change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementEvent {
    SprintStarted,
    SprintStopped,
    DashStarted,
    DashEnded,
    SlideStarted,
    SlideEnded,
    WallRunStarted { side: WallSide },
    WallRunEnded,
    /// Landing fast enough to roll. `impact_speed` is positive.
    HardLanding { impact_speed: f32 },
    MantleStarted,
    MantleEnded,
    Jumped { chain: u32, off_wall: bool },
    /// New dash meter fill level in `[0, 1]`.
    DashCooldownChanged(f32),
}

/// Handle returned by [`NotificationBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&MovementEvent)>;

/// Fire-and-forget fan-out of movement events.
#[derive(Default)]
pub struct NotificationBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&MovementEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Deliver an event to every listener in subscription order.
    pub fn publish(&mut self, event: &MovementEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("listeners", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
