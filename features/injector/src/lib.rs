//! Dependency injection resolution engine
//!
//! Components are declared on a [Registry], either with an ordered list of
//! constructor dependencies or with a factory. Resolving the registry
//! instantiates every component exactly once and returns them as an
//! [InstancePool].
//!
//! Resolution consists of two phases:
//! 1. All factories are invoked, deferred factory results are awaited concurrently
//! 2. Constructors run in rounds, each round instantiating every component whose
//!    dependencies are no longer pending. A round without progress is an injection cycle.
//!
//! Dependencies which are never registered are handed to the constructor as
//! absent arguments, see [MissingDependencyPolicy] to change that.
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use injector::{deps, Arguments, Component, DynError, InjectionOptions, Produced, Registry};
//!
//! struct Settings {
//!     url: String,
//! }
//!
//! struct Connection {
//!     settings: Arc<Settings>,
//! }
//! impl Component for Connection {
//!     fn construct(mut args: Arguments) -> Result<Self, DynError> {
//!         Ok(Connection { settings: args.next()? })
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_factory(injector::FactoryFn::new(|| {
//!         Ok(Produced::ready(Settings { url: "postgres://localhost".into() }))
//!     }))
//!     .unwrap()
//!     .register::<Connection>(deps![Settings], None)
//!     .unwrap();
//!
//! let pool = futures::executor::block_on(registry.resolve()).unwrap();
//! let connection = pool.require::<Connection>().unwrap();
//! assert_eq!(connection.settings.url, "postgres://localhost");
//! ```

pub mod arguments;
pub mod component;
pub mod container;
pub mod dependency_graph;
pub mod errors;
pub mod factories;
pub mod global;
pub(crate) mod initiator;
pub mod options;
pub mod registry;
pub mod types;

pub use arguments::{Arguments, FromArgument};
pub use component::Component;
pub use container::InstancePool;
pub use errors::{ArgumentError, MissingDependency, RegisterError, RequireError, ResolveError};
pub use factories::{FactoryFn, InstanceFactory, Produced};
pub use global::{declare, declare_component, resolve_all};
pub use options::{MissingDependencyPolicy, ResolveOptions};
pub use registry::{Declaration, InjectionOptions, Registry};
pub use types::{DynError, Injectable, Instance, TypeInfo};

/// Builds an ordered dependency list
///
/// `deps![A, B]` is `vec![TypeInfo::of::<A>(), TypeInfo::of::<B>()]`.
#[macro_export]
macro_rules! deps {
    ($($dependency:ty),* $(,)?) => {
        vec![$($crate::TypeInfo::of::<$dependency>()),*]
    };
}
