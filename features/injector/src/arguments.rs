use std::{any::type_name, sync::Arc};

use crate::{
    errors::ArgumentError,
    types::{Injectable, Instance, TypeInfo},
};

/// Positional constructor arguments of one component
///
/// Holds one slot per declared dependency, in declared order. A slot is empty
/// when the dependency has no instance in the current run, which is the case
/// for dependencies that were never registered.
pub struct Arguments {
    component: TypeInfo,
    declared: usize,
    taken: usize,
    slots: std::vec::IntoIter<(TypeInfo, Option<Instance>)>,
}

impl Arguments {
    pub(crate) fn new(component: TypeInfo, slots: Vec<(TypeInfo, Option<Instance>)>) -> Self {
        Arguments {
            component,
            declared: slots.len(),
            taken: 0,
            slots: slots.into_iter(),
        }
    }

    /// Takes the next argument
    ///
    /// ```ignore
    /// fn construct(mut args: Arguments) -> Result<Self, DynError> {
    ///     let repository = args.next::<Arc<Repository>>()?;
    ///     let cache = args.next::<Option<Arc<Cache>>>()?;
    ///     Ok(Service { repository, cache })
    /// }
    /// ```
    pub fn next<A: FromArgument>(&mut self) -> Result<A, ArgumentError> {
        self.taken += 1;
        let Some((dependency, instance)) = self.slots.next() else {
            return Err(ArgumentError::Exhausted {
                component: self.component,
                declared: self.declared,
                requested: self.taken,
            });
        };

        A::from_argument(dependency, instance)
    }

    /// The component being constructed
    pub fn component(&self) -> TypeInfo {
        self.component
    }

    /// Number of arguments not yet taken
    pub fn remaining(&self) -> usize {
        self.slots.len()
    }
}

/// Extracts a value out of an argument slot
pub trait FromArgument: Sized {
    fn from_argument(dependency: TypeInfo, instance: Option<Instance>)
        -> Result<Self, ArgumentError>;
}

/// Required dependency
impl<T: Injectable> FromArgument for Arc<T> {
    fn from_argument(
        dependency: TypeInfo,
        instance: Option<Instance>,
    ) -> Result<Self, ArgumentError> {
        let instance = instance.ok_or(ArgumentError::Absent(dependency))?;
        instance
            .downcast::<T>()
            .map_err(|actual_type| ArgumentError::TypeMismatch {
                required_type: type_name::<T>(),
                actual_type,
            })
    }
}

/// Raw, type-erased dependency
impl FromArgument for Instance {
    fn from_argument(
        dependency: TypeInfo,
        instance: Option<Instance>,
    ) -> Result<Self, ArgumentError> {
        instance.ok_or(ArgumentError::Absent(dependency))
    }
}

impl<Resolvable: FromArgument> FromArgument for Option<Resolvable> {
    fn from_argument(
        dependency: TypeInfo,
        instance: Option<Instance>,
    ) -> Result<Self, ArgumentError> {
        match Resolvable::from_argument(dependency, instance) {
            Ok(resolved) => Ok(Some(resolved)),
            // An absent dependency is not an error for an optional argument
            Err(ArgumentError::Absent(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
