use std::{
    any::Any,
    collections::{HashMap, HashSet},
    fmt::Debug,
};

use crate::world::entity::entity_id::EntityId;

use super::{component_kinds::ComponentKind, error::ComponentError};

/// Data that can be attached to an entity. Each type must be registered with
/// the store before use.
pub trait Component: Any + Clone + Debug {}

// Column

trait ComponentColumn {
    fn contains(&self, entity: &EntityId) -> bool;
    fn remove_entity(&mut self, entity: &EntityId) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Dense storage for one component type. `dense` keeps insertion order,
/// `index` points into it.
struct Column<C: Component> {
    dense: Vec<(EntityId, C)>,
    index: HashMap<EntityId, usize>,
}

impl<C: Component> Column<C> {
    fn new() -> Self {
        Self {
            dense: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn get(&self, entity: &EntityId) -> Option<&C> {
        let position = self.index.get(entity)?;
        Some(&self.dense[*position].1)
    }

    fn get_mut(&mut self, entity: &EntityId) -> Option<&mut C> {
        let position = self.index.get(entity)?;
        Some(&mut self.dense[*position].1)
    }

    fn set(&mut self, entity: EntityId, component: C) -> bool {
        if let Some(position) = self.index.get(&entity) {
            self.dense[*position].1 = component;
            return false;
        }
        self.index.insert(entity, self.dense.len());
        self.dense.push((entity, component));
        true
    }

    fn remove(&mut self, entity: &EntityId) -> Option<C> {
        let position = self.index.remove(entity)?;
        let (_, component) = self.dense.remove(position);
        // keep insertion order: everything after the hole shifts down by one
        for (entity, _) in &self.dense[position..] {
            if let Some(index) = self.index.get_mut(entity) {
                *index -= 1;
            }
        }
        Some(component)
    }
}

impl<C: Component> ComponentColumn for Column<C> {
    fn contains(&self, entity: &EntityId) -> bool {
        self.index.contains_key(entity)
    }

    fn remove_entity(&mut self, entity: &EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ComponentStore

/// Typed storage of every component in a Scene: component kind → (entity →
/// component).
///
/// Iteration over a kind follows insertion order. Any write (`set`,
/// `get_mut`) marks the entity as changed; `take_changed` drains those marks
/// in the order they were first made.
pub struct ComponentStore {
    columns: HashMap<ComponentKind, Box<dyn ComponentColumn>>,
    kinds: Vec<ComponentKind>,
    changed: Vec<EntityId>,
    changed_set: HashSet<EntityId>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
            kinds: Vec::new(),
            changed: Vec::new(),
            changed_set: HashSet::new(),
        }
    }

    // Registration

    pub fn register<C: Component>(&mut self) {
        let kind = ComponentKind::of::<C>();
        if self.columns.contains_key(&kind) {
            panic!(
                "{}",
                ComponentError::ComponentAlreadyRegistered {
                    component_name: kind.name()
                }
            );
        }
        self.columns.insert(kind, Box::new(Column::<C>::new()));
        self.kinds.push(kind);
    }

    pub fn is_registered<C: Component>(&self) -> bool {
        self.columns.contains_key(&ComponentKind::of::<C>())
    }

    pub fn kinds(&self) -> &[ComponentKind] {
        &self.kinds
    }

    // Access

    /// Inserts or replaces the component of type `C` for `entity`. Returns
    /// `true` if the entity did not have one before.
    pub fn set<C: Component>(&mut self, entity: EntityId, component: C) -> bool {
        let added = self.column_mut::<C>().set(entity, component);
        self.mark_changed(entity);
        added
    }

    pub fn get<C: Component>(&self, entity: &EntityId) -> Option<&C> {
        self.column::<C>().get(entity)
    }

    /// Mutable access. Counts as a write for change tracking, whether or not
    /// the caller actually modifies the component.
    pub fn get_mut<C: Component>(&mut self, entity: &EntityId) -> Option<&mut C> {
        if !self.column::<C>().contains(entity) {
            return None;
        }
        self.mark_changed(*entity);
        self.column_mut::<C>().get_mut(entity)
    }

    pub fn contains<C: Component>(&self, entity: &EntityId) -> bool {
        self.column::<C>().contains(entity)
    }

    pub fn remove<C: Component>(&mut self, entity: &EntityId) -> Option<C> {
        self.column_mut::<C>().remove(entity)
    }

    /// Removes every component of `entity`. Returns how many were removed.
    pub fn remove_all(&mut self, entity: &EntityId) -> usize {
        let mut removed = 0;
        for kind in &self.kinds {
            if let Some(column) = self.columns.get_mut(kind) {
                if column.remove_entity(entity) {
                    removed += 1;
                }
            }
        }
        self.forget_changed(entity);
        removed
    }

    /// Snapshot of every `(entity, component)` pair of type `C`, in insertion
    /// order. Later mutation of the store does not affect the snapshot.
    pub fn all<C: Component>(&self) -> Vec<(EntityId, C)> {
        self.column::<C>().dense.clone()
    }

    /// Snapshot of the entities holding a `C`, in insertion order.
    pub fn entities_with<C: Component>(&self) -> Vec<EntityId> {
        self.column::<C>()
            .dense
            .iter()
            .map(|(entity, _)| *entity)
            .collect()
    }

    pub fn count<C: Component>(&self) -> usize {
        self.column::<C>().dense.len()
    }

    // Change tracking

    pub fn is_changed(&self, entity: &EntityId) -> bool {
        self.changed_set.contains(entity)
    }

    pub fn take_changed(&mut self) -> Vec<EntityId> {
        self.changed_set.clear();
        std::mem::take(&mut self.changed)
    }

    fn mark_changed(&mut self, entity: EntityId) {
        if self.changed_set.insert(entity) {
            self.changed.push(entity);
        }
    }

    fn forget_changed(&mut self, entity: &EntityId) {
        if self.changed_set.remove(entity) {
            self.changed.retain(|changed| changed != entity);
        }
    }

    // Internal

    fn column<C: Component>(&self) -> &Column<C> {
        let kind = ComponentKind::of::<C>();
        let Some(column) = self.columns.get(&kind) else {
            panic!(
                "{}",
                ComponentError::ComponentNotRegistered {
                    component_name: kind.name()
                }
            );
        };
        column
            .as_any()
            .downcast_ref::<Column<C>>()
            .expect("column registered under the kind of its own component type")
    }

    fn column_mut<C: Component>(&mut self) -> &mut Column<C> {
        let kind = ComponentKind::of::<C>();
        let Some(column) = self.columns.get_mut(&kind) else {
            panic!(
                "{}",
                ComponentError::ComponentNotRegistered {
                    component_name: kind.name()
                }
            );
        };
        column
            .as_any_mut()
            .downcast_mut::<Column<C>>()
            .expect("column registered under the kind of its own component type")
    }
}

impl Default for ComponentStore {
    fn default() -> Self {
        Self::new()
    }
}
