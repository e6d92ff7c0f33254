use std::{
    any::Any,
    fmt, mem,
    panic::{self, AssertUnwindSafe},
};

use log::{debug, error, info, trace, warn};

use crate::{
    events::{
        event_bus::{EventBus, HandlerResult, SubscriptionId},
        event_data::EventData,
    },
    world::{
        component::{
            component_store::{Component, ComponentStore},
            components::{register_builtin, LocalInput},
        },
        entity::{entity_id::EntityId, entity_registry::EntityRegistry},
    },
};

use super::{authority::Authority, system::System, time::FrameTime};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneState {
    Constructed,
    Initialized,
    Running,
    TornDown,
}

/// How a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub winner: EntityId,
    /// The winner is driven by this peer's input.
    pub local_win: bool,
}

/// Scene stack change requested by a Scene, applied by the director after
/// the frame's draw.
pub enum Transition {
    Push(Box<Scene>),
    Pop,
    Replace(Box<Scene>),
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Push(scene) => write!(f, "Push({})", scene.name()),
            Transition::Pop => write!(f, "Pop"),
            Transition::Replace(scene) => write!(f, "Replace({})", scene.name()),
        }
    }
}

/// Container for the entities, components, systems and event subscriptions
/// of one level.
///
/// All gameplay code touches the data model through this type. Systems
/// receive the Scene explicitly in every callback.
pub struct Scene {
    name: String,
    state: SceneState,
    registry: EntityRegistry,
    components: ComponentStore,
    events: EventBus,
    systems: Vec<Box<dyn System>>,
    pending_systems: Vec<Box<dyn System>>,
    authority: Authority,
    outcome: Option<Outcome>,
    transition: Option<Transition>,
    time: FrameTime,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        let mut components = ComponentStore::new();
        register_builtin(&mut components);

        Self {
            name: name.into(),
            state: SceneState::Constructed,
            registry: EntityRegistry::new(),
            components,
            events: EventBus::new(),
            systems: Vec::new(),
            pending_systems: Vec::new(),
            authority: Authority::Local,
            outcome: None,
            transition: None,
            time: FrameTime::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn time(&self) -> FrameTime {
        self.time
    }

    // Lifecycle

    /// Calls `init` on every registered system once, in registration order.
    /// Systems added while initializing are initialized in the same call.
    pub fn init(&mut self) {
        if self.state != SceneState::Constructed {
            panic!(
                "Scene `{}` cannot be initialized in state {:?}",
                self.name, self.state
            );
        }
        self.state = SceneState::Initialized;
        self.init_pending_systems();
        info!(
            "Scene `{}` initialized with {} system(s)",
            self.name,
            self.systems.len()
        );
    }

    /// Runs one frame: `begin_frame` on every system, then `update`, then
    /// `end_frame`, then releases entity ids destroyed before this frame.
    pub fn update(&mut self, t: f64, dt: f64) {
        match self.state {
            SceneState::Constructed => {
                panic!("Scene `{}` updated before init()", self.name);
            }
            SceneState::TornDown => return,
            SceneState::Initialized | SceneState::Running => {}
        }
        self.state = SceneState::Running;
        let time = FrameTime::sanitized(t, dt, self.time.t);
        self.time = time;

        self.init_pending_systems();

        let mut systems = mem::take(&mut self.systems);
        for system in systems.iter_mut() {
            system.begin_frame(self, &time);
        }
        for system in systems.iter_mut() {
            if self.state == SceneState::TornDown {
                break;
            }
            system.update(self, &time);
        }
        for system in systems.iter_mut() {
            if self.state == SceneState::TornDown {
                break;
            }
            system.end_frame(self, &time);
        }
        if self.state == SceneState::TornDown {
            self.teardown_systems(systems);
            return;
        }
        self.systems = systems;

        self.registry.end_frame();
    }

    /// Calls `draw` on every system with read-only access to the Scene.
    pub fn draw(&mut self, t: f64, dt: f64) {
        if self.state != SceneState::Running {
            return;
        }
        let time = FrameTime::sanitized(t, dt, self.time.t);
        self.time = time;

        let mut systems = mem::take(&mut self.systems);
        for system in systems.iter_mut() {
            system.draw(self, &time);
        }
        self.systems = systems;
    }

    /// Drops every system and subscription. Later update and draw calls do
    /// nothing.
    pub fn teardown(&mut self) {
        if self.state == SceneState::TornDown {
            return;
        }
        self.state = SceneState::TornDown;
        let systems = mem::take(&mut self.systems);
        self.teardown_systems(systems);
        info!("Scene `{}` torn down", self.name);
    }

    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.add_boxed_system(Box::new(system));
    }

    pub fn add_boxed_system(&mut self, system: Box<dyn System>) {
        if self.state == SceneState::TornDown {
            warn!(
                "Dropping system `{}` added to torn down Scene `{}`",
                system.name(),
                self.name
            );
            return;
        }
        self.pending_systems.push(system);
    }

    pub fn system_count(&self) -> usize {
        self.systems.len() + self.pending_systems.len()
    }

    fn init_pending_systems(&mut self) {
        while !self.pending_systems.is_empty() {
            let batch = mem::take(&mut self.pending_systems);
            for mut system in batch {
                debug!("Scene `{}`: init system `{}`", self.name, system.name());
                system.init(self);
                self.systems.push(system);
            }
        }
    }

    fn teardown_systems(&mut self, mut systems: Vec<Box<dyn System>>) {
        systems.append(&mut self.pending_systems);
        for system in systems.iter_mut() {
            system.teardown(self);
        }
        drop(systems);
        self.systems.clear();
        self.pending_systems.clear();
        self.events.clear();
    }

    // Entities & Components

    pub fn register_component<C: Component>(&mut self) {
        self.components.register::<C>();
    }

    pub fn add_entity(&mut self) -> EntityId {
        self.registry.allocate()
    }

    pub fn is_alive(&self, entity: &EntityId) -> bool {
        self.registry.is_alive(entity)
    }

    pub fn entities(&self) -> Vec<EntityId> {
        self.registry.entities()
    }

    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    /// Removes every component of `entity`, then destroys it. The id becomes
    /// reusable after the next frame boundary.
    pub fn remove_entity(&mut self, entity: &EntityId) {
        if !self.registry.is_alive(entity) {
            panic!("Cannot remove entity {}: it is not alive", entity);
        }
        let removed = self.components.remove_all(entity);
        for _ in 0..removed {
            self.registry.detach(entity);
        }
        self.registry.destroy(entity);
        trace!("Scene `{}`: removed entity {}", self.name, entity);
    }

    /// Inserts or replaces the `C` of `entity`.
    pub fn add_component<C: Component>(&mut self, entity: &EntityId, component: C) {
        if !self.registry.is_alive(entity) {
            panic!("Cannot add a component to entity {}: it is not alive", entity);
        }
        if self.components.set(*entity, component) {
            self.registry.attach(entity);
        }
    }

    pub fn remove_component<C: Component>(&mut self, entity: &EntityId) -> Option<C> {
        let removed = self.components.remove::<C>(entity)?;
        self.registry.detach(entity);
        Some(removed)
    }

    pub fn get_component_from_entity<C: Component>(&self, entity: &EntityId) -> Option<&C> {
        self.components.get::<C>(entity)
    }

    /// Mutable access. Marks the entity as changed for replication.
    pub fn get_component_mut<C: Component>(&mut self, entity: &EntityId) -> Option<&mut C> {
        self.components.get_mut::<C>(entity)
    }

    /// Snapshot of every `C` in insertion order.
    pub fn get_components<C: Component>(&self) -> Vec<(EntityId, C)> {
        self.components.all::<C>()
    }

    pub fn entities_with<C: Component>(&self) -> Vec<EntityId> {
        self.components.entities_with::<C>()
    }

    pub fn entity_has_component<C: Component>(&self, entity: &EntityId) -> bool {
        self.components.contains::<C>(entity)
    }

    pub fn component_count(&self, entity: &EntityId) -> usize {
        self.registry.component_count(entity)
    }

    /// Drains the entities written to since the last call.
    pub fn take_changed_entities(&mut self) -> Vec<EntityId> {
        self.components.take_changed()
    }

    // Events

    pub fn on_event<F>(&mut self, name: &str, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut Scene, &EventData) -> HandlerResult + 'static,
    {
        self.events.subscribe(name, handler)
    }

    pub fn off_event(&mut self, subscription: SubscriptionId) -> bool {
        self.events.unsubscribe(subscription)
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.events.subscriber_count(name)
    }

    /// Delivers `data` to every handler subscribed to `name` at the moment of
    /// the call, in subscription order.
    ///
    /// A handler unsubscribed by an earlier handler is skipped. A handler that
    /// is already running further up the stack is skipped. Errors and panics
    /// are logged and do not stop delivery.
    pub fn raise(&mut self, name: &str, data: EventData) {
        if self.state == SceneState::TornDown {
            debug!(
                "Scene `{}` is torn down, dropping event `{}`",
                self.name, name
            );
            return;
        }
        let handlers = self.events.snapshot(name);
        trace!(
            "Scene `{}`: raise `{}` to {} handler(s)",
            self.name,
            name,
            handlers.len()
        );

        for (id, handler) in handlers {
            if !self.events.is_subscribed(id) {
                continue;
            }
            let Ok(mut callback) = handler.try_borrow_mut() else {
                warn!(
                    "Skipping re-entrant call of {:?} for event `{}`",
                    id, name
                );
                continue;
            };
            let result = panic::catch_unwind(AssertUnwindSafe(|| (&mut *callback)(self, &data)));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    warn!("Handler {:?} for event `{}` failed: {}", id, name, err);
                }
                Err(payload) => {
                    error!(
                        "Handler {:?} for event `{}` panicked: {}",
                        id,
                        name,
                        panic_message(payload.as_ref())
                    );
                }
            }
        }
    }

    // Authority

    pub fn authority(&self) -> Authority {
        self.authority
    }

    pub fn is_authoritative(&self) -> bool {
        self.authority.is_authoritative()
    }

    pub fn set_authority(&mut self, authority: Authority) {
        if self.authority != authority {
            info!(
                "Scene `{}`: authority {:?} -> {:?}",
                self.name, self.authority, authority
            );
            self.authority = authority;
        }
    }

    // Outcome & Transitions

    /// Records the end of the round. Only the first call has an effect;
    /// returns whether this call ended the game.
    pub fn end_game(&mut self, winner: EntityId) -> bool {
        if let Some(outcome) = &self.outcome {
            debug!(
                "Scene `{}` already ended (winner {}), ignoring winner {}",
                self.name, outcome.winner, winner
            );
            return false;
        }
        let local_win = self.entity_has_component::<LocalInput>(&winner);
        self.outcome = Some(Outcome { winner, local_win });
        info!(
            "Scene `{}` ended, winner {} ({})",
            self.name,
            winner,
            if local_win { "won" } else { "lost" }
        );
        true
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.outcome.is_some()
    }

    /// Asks the director to change the scene stack after this frame's draw.
    /// Returns `false` if a transition is already pending.
    pub fn request_transition(&mut self, transition: Transition) -> bool {
        if let Some(pending) = &self.transition {
            warn!(
                "Scene `{}`: transition {:?} already pending, ignoring {:?}",
                self.name, pending, transition
            );
            return false;
        }
        self.transition = Some(transition);
        true
    }

    pub fn has_pending_transition(&self) -> bool {
        self.transition.is_some()
    }

    pub fn take_transition(&mut self) -> Option<Transition> {
        self.transition.take()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
