use thiserror::Error;

/// Misuse of the component store. These are programming errors: the store
/// panics with the rendered message rather than returning them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    /// Component kind not registered with the store
    #[error("Component not registered with the Scene. Must call `register_component()` before use. Component: {component_name}")]
    ComponentNotRegistered { component_name: &'static str },

    /// Component kind registered twice
    #[error("Component already registered with the Scene: {component_name}")]
    ComponentAlreadyRegistered { component_name: &'static str },
}
