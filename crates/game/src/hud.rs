//! HUD bindings fed from the movement event bus.

use std::cell::Cell;
use std::rc::Rc;

use freerun_physics::movement::{MovementEvent, NotificationBus, SubscriptionId};

/// Dash cooldown meter.
///
/// Subscribes to a controller's bus and tracks the latest cooldown fill.
#[derive(Debug)]
pub struct DashMeter {
    fill: Rc<Cell<f32>>,
    subscription: Option<SubscriptionId>,
}

impl DashMeter {
    pub fn new() -> Self {
        Self {
            fill: Rc::new(Cell::new(1.0)),
            subscription: None,
        }
    }

    /// Start listening on `bus`. A meter listens on one bus at a time.
    pub fn attach(&mut self, bus: &mut NotificationBus) {
        if self.subscription.is_some() {
            log::warn!("dash meter already attached");
            return;
        }
        let fill = Rc::clone(&self.fill);
        let id = bus.subscribe(move |event| {
            if let MovementEvent::DashCooldownChanged(value) = event {
                fill.set(*value);
            }
        });
        self.subscription = Some(id);
    }

    /// Stop listening. Returns `false` if the meter was not attached.
    pub fn detach(&mut self, bus: &mut NotificationBus) -> bool {
        match self.subscription.take() {
            Some(id) => bus.unsubscribe(id),
            None => false,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Fill level in `[0, 1]`; full means a dash is ready.
    pub fn fill(&self) -> f32 {
        self.fill.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_follows_events() {
        let mut bus = NotificationBus::new();
        let mut meter = DashMeter::new();
        meter.attach(&mut bus);
        assert_eq!(meter.fill(), 1.0);

        bus.publish(&MovementEvent::DashCooldownChanged(0.25));
        bus.publish(&MovementEvent::DashStarted);
        assert_eq!(meter.fill(), 0.25);

        assert!(meter.detach(&mut bus));
        bus.publish(&MovementEvent::DashCooldownChanged(1.0));
        assert_eq!(meter.fill(), 0.25);
        assert_eq!(bus.listener_count(), 0);
        assert!(!meter.detach(&mut bus));
    }

    #[test]
    fn test_double_attach_keeps_one_listener() {
        let mut bus = NotificationBus::new();
        let mut meter = DashMeter::new();
        meter.attach(&mut bus);
        meter.attach(&mut bus);
        assert_eq!(bus.listener_count(), 1);
    }
}
