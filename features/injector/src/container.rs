use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
};

use crate::{
    errors::RequireError,
    types::{Injectable, Instance, TypeInfo},
};

/// Instances produced by one resolution run
///
/// Owned by the caller, the engine keeps no reference to it.
pub struct InstancePool {
    instances: HashMap<TypeId, Instance>,
}
impl Debug for InstancePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.instances.values().map(|i| i.info.type_name).collect();
        names.sort_unstable();
        f.debug_struct("InstancePool")
            .field("instances", &names)
            .finish()
    }
}

impl InstancePool {
    pub(crate) fn new(instances: HashMap<TypeId, Instance>) -> Self {
        Self { instances }
    }

    /// Attempts to get the requested type
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        match self.instances.get(&TypeId::of::<T>()) {
            Some(instance) => {
                instance
                    .downcast()
                    .map_err(|actual_type| RequireError::DowncastFailed {
                        required_type: type_name::<T>(),
                        actual_type,
                    })
            }
            None => Err(RequireError::TypeMissing(type_name::<T>())),
        }
    }

    pub fn get<T: Injectable>(&self) -> Option<Arc<T>> {
        self.require::<T>().ok()
    }

    /// The type-erased instance of a component
    pub fn instance(&self, info: &TypeInfo) -> Option<&Instance> {
        self.instances.get(&info.type_id)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.instances.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Iterates the instances in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }
}
