//! Process-wide default registry
//!
//! Convenience for applications which declare their components from many
//! places at startup. Everything here forwards to a single [Registry].

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    component::Component,
    container::InstancePool,
    errors::{RegisterError, ResolveError},
    registry::{InjectionOptions, Registry},
    types::TypeInfo,
};

static REGISTRY: Mutex<Registry> = Mutex::new(Registry::new());

fn registry() -> MutexGuard<'static, Registry> {
    // Registry updates can't be left half done, a poisoned lock is still usable
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Declares a component on the default registry
///
/// See [Registry::register].
pub fn declare_component<T: Component>(
    dependencies: Vec<TypeInfo>,
    options: Option<InjectionOptions<T>>,
) -> Result<(), RegisterError> {
    registry().register::<T>(dependencies, options).map(|_| ())
}

/// Declares a component on the default registry, with the dependencies it lists itself
pub fn declare<T: Component>() -> Result<(), RegisterError> {
    registry().declare::<T>().map(|_| ())
}

/// Instantiates every component declared on the default registry
///
/// Resolves a snapshot, declarations made while the run is in progress are
/// not part of it. The registry is left untouched, so every call produces
/// fresh instances.
pub async fn resolve_all() -> Result<InstancePool, ResolveError> {
    let snapshot = registry().clone();
    snapshot.resolve().await
}
