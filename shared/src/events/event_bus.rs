use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::Rc,
};

use crate::scene::scene::Scene;

use super::{error::HandlerError, event_data::EventData};

pub type HandlerResult = Result<(), HandlerError>;

type HandlerFn = dyn FnMut(&mut Scene, &EventData) -> HandlerResult;

/// Shared handle to a subscribed handler. The `RefCell` doubles as the
/// re-entrancy guard: a handler that is already running cannot be borrowed
/// again.
pub type Handler = Rc<RefCell<HandlerFn>>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

/// Named publish/subscribe registry.
///
/// The bus only stores subscriptions. Delivery lives in `Scene::raise`, since
/// handlers receive the Scene that owns the bus.
pub struct EventBus {
    next_id: u64,
    handlers: HashMap<String, Vec<(SubscriptionId, Handler)>>,
    names: HashMap<SubscriptionId, String>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            handlers: HashMap::new(),
            names: HashMap::new(),
        }
    }

    pub fn subscribe<F>(&mut self, name: &str, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut Scene, &EventData) -> HandlerResult + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let handler: Handler = Rc::new(RefCell::new(handler));
        self.handlers
            .entry(name.to_string())
            .or_default()
            .push((id, handler));
        self.names.insert(id, name.to_string());
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let Some(name) = self.names.remove(&id) else {
            return false;
        };
        if let Some(list) = self.handlers.get_mut(&name) {
            list.retain(|(handler_id, _)| *handler_id != id);
            if list.is_empty() {
                self.handlers.remove(&name);
            }
        }
        true
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.names.contains_key(&id)
    }

    /// Copy of the current handlers for `name`, in subscription order.
    pub fn snapshot(&self, name: &str) -> Vec<(SubscriptionId, Handler)> {
        match self.handlers.get(name) {
            Some(list) => list.clone(),
            None => Vec::new(),
        }
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
        self.names.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut Scene, _: &EventData) -> HandlerResult {
        Ok(())
    }

    #[test]
    fn unsubscribe_removes_only_that_handler() {
        let mut bus = EventBus::new();
        let first = bus.subscribe("hit", noop);
        let second = bus.subscribe("hit", noop);

        assert!(bus.unsubscribe(first));
        assert!(!bus.unsubscribe(first));
        assert!(bus.is_subscribed(second));

        let remaining: Vec<SubscriptionId> =
            bus.snapshot("hit").into_iter().map(|(id, _)| id).collect();
        assert_eq!(remaining, vec![second]);
    }

    #[test]
    fn snapshot_of_unknown_event_is_empty() {
        let bus = EventBus::new();
        assert!(bus.snapshot("nothing").is_empty());
        assert_eq!(bus.subscriber_count("nothing"), 0);
    }
}
