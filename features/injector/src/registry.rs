use std::{fmt::Debug, marker::PhantomData, sync::Arc};

use crate::{
    arguments::Arguments,
    component::{constructor_fn, constructor_of, Component, ConstructFn},
    container::InstancePool,
    errors::{RegisterError, ResolveError},
    factories::{FactoryFn, InstanceFactory, Produced, ProvidedInstance, SharedFactory},
    initiator::Initiator,
    options::ResolveOptions,
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// The registry's record of one component
#[derive(Clone)]
pub struct Declaration {
    info: TypeInfo,
    dependencies: Vec<TypeInfo>,
    provider: Provider,
}

#[derive(Clone)]
enum Provider {
    Constructor(ConstructFn),
    Factory(SharedFactory),
}

impl Debug for Declaration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Declaration")
            .field("component", &self.info.type_name)
            .field("dependencies", &self.dependencies)
            .field("factory", &self.is_factory())
            .finish()
    }
}

impl Declaration {
    /// Constructor injection through the [Component] impl of `T`
    pub fn constructor<T: Component>(dependencies: Vec<TypeInfo>) -> Self {
        Declaration {
            info: TypeInfo::of::<T>(),
            dependencies,
            provider: Provider::Constructor(constructor_of::<T>()),
        }
    }

    /// Constructor injection through a closure
    pub fn constructor_fn<T, C>(dependencies: Vec<TypeInfo>, constructor: C) -> Self
    where
        T: Injectable,
        C: Fn(Arguments) -> Result<T, DynError> + Send + Sync + 'static,
    {
        Declaration {
            info: TypeInfo::of::<T>(),
            dependencies,
            provider: Provider::Constructor(constructor_fn(constructor)),
        }
    }

    /// Built by a factory, without dependencies
    pub fn factory<Factory: InstanceFactory>(factory: Factory) -> Self {
        Self::from_shared_factory(Arc::new(factory))
    }

    /// An already created instance, shared by every run
    pub fn instance<T: Injectable>(instance: T) -> Self {
        Self::from_shared_factory(Arc::new(ProvidedInstance(Instance::new(instance))))
    }

    fn from_shared_factory(factory: SharedFactory) -> Self {
        Declaration {
            info: factory.supplies(),
            dependencies: Vec::new(),
            provider: Provider::Factory(factory),
        }
    }

    pub fn info(&self) -> TypeInfo {
        self.info
    }

    pub fn dependencies(&self) -> &[TypeInfo] {
        &self.dependencies
    }

    pub fn is_factory(&self) -> bool {
        matches!(self.provider, Provider::Factory(_))
    }

    pub(crate) fn shared_factory(&self) -> Option<&SharedFactory> {
        match &self.provider {
            Provider::Factory(factory) => Some(factory),
            Provider::Constructor(_) => None,
        }
    }

    /// Runs the constructor, factories have nothing to construct
    pub(crate) fn construct(&self, args: Arguments) -> Option<Result<Instance, DynError>> {
        match &self.provider {
            Provider::Constructor(constructor) => Some(constructor(args)),
            Provider::Factory(_) => None,
        }
    }
}

/// Factory options of a registration
///
/// When passed to [Registry::register], the factory replaces constructor injection.
pub struct InjectionOptions<T> {
    factory: SharedFactory,
    _provides: PhantomData<fn() -> T>,
}
impl<T: Injectable> InjectionOptions<T> {
    pub fn factory<Fun>(factory: Fun) -> Self
    where
        Fun: Fn() -> Result<Produced<T>, DynError> + Send + Sync + 'static,
    {
        Self::from_factory(FactoryFn::new(factory))
    }

    pub fn from_factory<Factory: InstanceFactory<Provides = T>>(factory: Factory) -> Self {
        InjectionOptions {
            factory: Arc::new(factory),
            _provides: PhantomData,
        }
    }
}

/// Ordered store of component declarations
///
/// Each component can only be declared once. Dependencies are not validated on
/// registration, dangling ones only show during resolution.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    declarations: Vec<Declaration>,
}

impl Registry {
    pub const fn new() -> Self {
        Registry {
            declarations: Vec::new(),
        }
    }

    /// Declares a component
    ///
    /// With a factory in `options` the given `dependencies` are ignored and the
    /// component is produced by the factory instead of its constructor.
    pub fn register<T: Component>(
        &mut self,
        dependencies: Vec<TypeInfo>,
        options: Option<InjectionOptions<T>>,
    ) -> Result<&mut Self, RegisterError> {
        let declaration = match options {
            Some(options) => Declaration::from_shared_factory(options.factory),
            None => Declaration::constructor::<T>(dependencies),
        };
        self.insert(declaration)
    }

    /// Declares a component with the dependencies it lists itself
    pub fn declare<T: Component>(&mut self) -> Result<&mut Self, RegisterError> {
        self.register::<T>(T::dependencies(), None)
    }

    pub fn register_with<T, C>(
        &mut self,
        dependencies: Vec<TypeInfo>,
        constructor: C,
    ) -> Result<&mut Self, RegisterError>
    where
        T: Injectable,
        C: Fn(Arguments) -> Result<T, DynError> + Send + Sync + 'static,
    {
        self.insert(Declaration::constructor_fn(dependencies, constructor))
    }

    pub fn register_factory<Factory: InstanceFactory>(
        &mut self,
        factory: Factory,
    ) -> Result<&mut Self, RegisterError> {
        self.insert(Declaration::factory(factory))
    }

    pub fn register_instance<T: Injectable>(
        &mut self,
        instance: T,
    ) -> Result<&mut Self, RegisterError> {
        self.insert(Declaration::instance(instance))
    }

    /// Adds a declaration, keeping the existing one on duplicates
    pub fn insert(&mut self, declaration: Declaration) -> Result<&mut Self, RegisterError> {
        let info = declaration.info();
        if self.contains_info(&info) {
            return Err(RegisterError::DuplicateRegistration(info));
        }

        tracing::trace!(
            "Registered {} with {} dependencies",
            info.type_name,
            declaration.dependencies().len()
        );
        self.declarations.push(declaration);
        Ok(self)
    }

    /// All declarations, in registration order
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.contains_info(&TypeInfo::of::<T>())
    }

    fn contains_info(&self, info: &TypeInfo) -> bool {
        self.declarations.iter().any(|d| d.info == *info)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Instantiates every declared component
    pub async fn resolve(&self) -> Result<InstancePool, ResolveError> {
        self.resolve_with(ResolveOptions::default()).await
    }

    pub async fn resolve_with(&self, options: ResolveOptions) -> Result<InstancePool, ResolveError> {
        Initiator::new(options).initiate(&self.declarations).await
    }
}
