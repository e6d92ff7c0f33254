use std::{cell::RefCell, rc::Rc};

use thengill_shared::{EventData, Scene};

/// Records every payload raised under one event name.
#[derive(Clone, Default)]
pub struct EventLog {
    seen: Rc<RefCell<Vec<EventData>>>,
}

impl EventLog {
    pub fn attach(scene: &mut Scene, event: &str) -> Self {
        let log = Self::default();
        let sink = log.seen.clone();
        scene.on_event(event, move |_, data| {
            sink.borrow_mut().push(data.clone());
            Ok(())
        });
        log
    }

    pub fn len(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }

    pub fn events(&self) -> Vec<EventData> {
        self.seen.borrow().clone()
    }

    pub fn last(&self) -> Option<EventData> {
        self.seen.borrow().last().cloned()
    }
}
