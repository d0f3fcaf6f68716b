//! Process-wide access to the current [`Environment`].
//!
//! Use it only where an environment cannot be passed in as a parameter. Only one
//! environment can be current at a time; running several environments in one
//! process through this handle is unsupported.
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use thiserror::Error;

use crate::kernel::component::Component;
use crate::kernel::environment::Environment;

static CURRENT: Lazy<RwLock<Option<Arc<Environment>>>> = Lazy::new(|| RwLock::new(None));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("No environment has been published")]
    NotPublished,

    #[error("Current environment has no component '{0}'")]
    UnknownComponent(String),

    #[error("Component '{identity}' is not a {expected}")]
    TypeMismatch { identity: String, expected: &'static str },
}

/// Make `env` the current environment, returning the one it replaces.
pub fn publish(env: Arc<Environment>) -> Option<Arc<Environment>> {
    let previous = CURRENT.write().replace(env);
    if previous.is_some() {
        log::warn!("Replacing the published environment; the previous one is no longer reachable through the handle");
    }
    previous
}

/// Empty the slot, returning the environment that was current.
pub fn clear() -> Option<Arc<Environment>> {
    CURRENT.write().take()
}

/// The current environment itself, as opposed to a lookup through it.
pub fn current() -> Result<Arc<Environment>, HandleError> {
    CURRENT.read().clone().ok_or(HandleError::NotPublished)
}

pub fn is_published() -> bool {
    CURRENT.read().is_some()
}

/// Look up a component of the current environment.
pub fn component(identity: &str) -> Result<Arc<dyn Component>, HandleError> {
    current()?
        .get(identity)
        .ok_or_else(|| HandleError::UnknownComponent(identity.to_string()))
}

/// Look up a component of the current environment by its concrete type.
pub fn component_as<T: Component>(identity: &str) -> Result<Arc<T>, HandleError> {
    let env = current()?;
    if !env.contains(identity) {
        return Err(HandleError::UnknownComponent(identity.to_string()));
    }
    env.component::<T>(identity).ok_or_else(|| HandleError::TypeMismatch {
        identity: identity.to_string(),
        expected: std::any::type_name::<T>(),
    })
}

/// Run `f` against the current environment.
pub fn with<R>(f: impl FnOnce(&Environment) -> R) -> Result<R, HandleError> {
    let env = current()?;
    Ok(f(&env))
}
