use std::sync::Arc;

use crate::{
    arguments::Arguments,
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// A type the resolution engine can construct from its dependencies
///
/// # Example
/// ```rust
/// use std::sync::Arc;
/// use injector::{deps, Arguments, Component, DynError, TypeInfo};
///
/// struct Database;
/// impl Component for Database {
///     fn construct(_: Arguments) -> Result<Self, DynError> {
///         Ok(Database)
///     }
/// }
///
/// struct UserService {
///     database: Arc<Database>,
/// }
/// impl Component for UserService {
///     fn dependencies() -> Vec<TypeInfo> {
///         deps![Database]
///     }
///
///     fn construct(mut args: Arguments) -> Result<Self, DynError> {
///         Ok(UserService {
///             database: args.next()?,
///         })
///     }
/// }
/// ```
pub trait Component: Injectable + Sized {
    /// Ordered list of dependencies handed to [Component::construct]
    fn dependencies() -> Vec<TypeInfo> {
        Vec::new()
    }

    /// Builds the component from one argument per declared dependency
    fn construct(args: Arguments) -> Result<Self, DynError>;
}

/// Type-erased constructor
pub(crate) type ConstructFn = Arc<dyn Fn(Arguments) -> Result<Instance, DynError> + Send + Sync>;

pub(crate) fn constructor_of<T: Component>() -> ConstructFn {
    Arc::new(|args| T::construct(args).map(Instance::new))
}

pub(crate) fn constructor_fn<T, C>(constructor: C) -> ConstructFn
where
    T: Injectable,
    C: Fn(Arguments) -> Result<T, DynError> + Send + Sync + 'static,
{
    Arc::new(move |args| constructor(args).map(Instance::new))
}
