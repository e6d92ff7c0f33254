use std::{any::TypeId, fmt, hash::Hash};

use super::component_store::Component;

/// Runtime identity of a component type.
#[derive(Eq, Hash, Copy, Clone, PartialEq)]
pub struct ComponentKind {
    type_id: TypeId,
    name: &'static str,
}

impl ComponentKind {
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: short_type_name(std::any::type_name::<C>()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentKind({})", self.name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    match full.rfind("::") {
        Some(index) => &full[index + 2..],
        None => full,
    }
}
