use std::{any::TypeId, collections::HashMap, future::Future, sync::Arc};

use futures::{
    future::BoxFuture,
    stream::FuturesUnordered,
    FutureExt, StreamExt, TryFutureExt,
};

use crate::{
    errors::ResolveError,
    registry::Declaration,
    types::{DynError, Injectable, Instance, TypeInfo},
};

/// Result of invoking a factory
///
/// A factory either hands out its value right away, or a computation which
/// yields the value later.
pub enum Produced<T> {
    /// The value is available immediately
    Ready(T),
    /// The value is produced by a deferred computation
    Deferred(BoxFuture<'static, Result<T, DynError>>),
}

impl<T: Send + 'static> Produced<T> {
    pub fn ready(value: T) -> Self {
        Produced::Ready(value)
    }

    pub fn deferred<Fut, E>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<DynError>,
    {
        Produced::Deferred(future.map_err(|error| -> DynError { error.into() }).boxed())
    }
}

/// A Factory providing instances of a given type, outside of constructor injection
///
/// Factories take no dependencies.
pub trait InstanceFactory: Send + Sync + 'static {
    type Provides: Injectable;

    /// Invokes the factory
    ///
    /// Returns an error if the factory fails synchronously.
    fn produce(&self) -> Result<Produced<Self::Provides>, DynError>;
}

/// Any function returning a [Produced] value can be used as a factory
pub struct FactoryFn<Fun>(pub Fun);
impl<Fun> FactoryFn<Fun> {
    pub fn new<T>(function: Fun) -> Self
    where
        T: Injectable,
        Fun: Fn() -> Result<Produced<T>, DynError> + Send + Sync + 'static,
    {
        FactoryFn(function)
    }
}
impl<T, Fun> InstanceFactory for FactoryFn<Fun>
where
    T: Injectable,
    Fun: Fn() -> Result<Produced<T>, DynError> + Send + Sync + 'static,
{
    type Provides = T;

    fn produce(&self) -> Result<Produced<T>, DynError> {
        (self.0)()
    }
}

/// Wrapper Trait for factories, providing type-erased instances
pub(crate) trait DynFactory: Send + Sync {
    fn supplies(&self) -> TypeInfo;

    fn produce(&self) -> Result<Produced<Instance>, DynError>;
}
// Impl DynFactory for any InstanceFactory
impl<T: Injectable, SpecificFactory: InstanceFactory<Provides = T>> DynFactory for SpecificFactory {
    fn supplies(&self) -> TypeInfo {
        TypeInfo::of::<T>()
    }

    fn produce(&self) -> Result<Produced<Instance>, DynError> {
        // Forward the call to the specific implementation
        Ok(match InstanceFactory::produce(self)? {
            Produced::Ready(value) => Produced::Ready(Instance::new(value)),
            Produced::Deferred(future) => Produced::Deferred(future.map_ok(Instance::new).boxed()),
        })
    }
}

/// Hands out the same pre-built instance on every run
pub(crate) struct ProvidedInstance(pub(crate) Instance);
impl DynFactory for ProvidedInstance {
    fn supplies(&self) -> TypeInfo {
        self.0.info
    }

    fn produce(&self) -> Result<Produced<Instance>, DynError> {
        Ok(Produced::Ready(self.0.clone()))
    }
}

pub(crate) type SharedFactory = Arc<dyn DynFactory>;

/// Invokes every factory declaration and waits for all of them
///
/// Factories are invoked in declaration order, deferred results are driven
/// concurrently. The first failure aborts the batch, siblings which are still
/// pending are dropped.
pub(crate) async fn instantiate_factories(
    declarations: &[&Declaration],
) -> Result<HashMap<TypeId, Instance>, ResolveError> {
    let mut instances = HashMap::with_capacity(declarations.len());
    let mut deferred = FuturesUnordered::new();

    for declaration in declarations {
        let Some(factory) = declaration.shared_factory() else {
            continue;
        };
        let info = declaration.info();

        match factory.produce() {
            Ok(Produced::Ready(instance)) => {
                tracing::trace!("Factory for {} produced an instance", info.type_name);
                instances.insert(info.type_id, instance);
            }
            Ok(Produced::Deferred(future)) => {
                tracing::trace!("Factory for {} deferred its instance", info.type_name);
                deferred.push(future.map(move |result| (info, result)));
            }
            Err(error) => {
                tracing::debug!("Factory for {} failed: {error}", info.type_name);
                return Err(ResolveError::instantiation(info, error));
            }
        }
    }

    let deferred_count = deferred.len();
    tracing::debug!(
        "Waiting for {deferred_count} deferred factories ({} already complete)",
        instances.len()
    );

    while let Some((info, result)) = deferred.next().await {
        match result {
            Ok(instance) => {
                tracing::trace!("Deferred factory for {} completed", info.type_name);
                instances.insert(info.type_id, instance);
            }
            Err(error) => {
                // If one factory fails - abort, the remaining ones are not awaited
                tracing::debug!(
                    "Deferred factory for {} failed with {} still pending: {error}",
                    info.type_name,
                    deferred.len()
                );
                return Err(ResolveError::instantiation(info, error));
            }
        }
    }

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use std::{
        error::Error as _,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use futures::{channel::oneshot, executor::block_on};

    use super::*;
    use crate::{arguments::Arguments, registry::Declaration};

    const CONTROL: &str = "Control string.";

    #[derive(Debug)]
    struct TestInjection {
        prop: &'static str,
    }
    struct TestInjection2;
    struct Constructed;

    fn ready() -> Result<Produced<TestInjection>, DynError> {
        Ok(Produced::ready(TestInjection { prop: CONTROL }))
    }

    fn deferred() -> Result<Produced<TestInjection2>, DynError> {
        Ok(Produced::deferred(async { Ok::<_, DynError>(TestInjection2) }))
    }

    fn run(declarations: &[Declaration]) -> Result<HashMap<TypeId, Instance>, ResolveError> {
        let refs: Vec<&Declaration> = declarations.iter().collect();
        block_on(instantiate_factories(&refs))
    }

    #[test]
    fn instantiates_synchronous_factory() {
        let instances = run(&[Declaration::factory(FactoryFn::new(ready))]).unwrap();

        let instance = instances[&TypeId::of::<TestInjection>()]
            .downcast::<TestInjection>()
            .unwrap();
        assert_eq!(instance.prop, CONTROL);
    }

    #[test]
    fn instantiates_several_factories() {
        let instances = run(&[
            Declaration::factory(FactoryFn::new(ready)),
            Declaration::factory(FactoryFn::new(deferred)),
        ])
        .unwrap();

        assert_eq!(instances.len(), 2);
        assert!(instances.contains_key(&TypeId::of::<TestInjection>()));
        assert!(instances.contains_key(&TypeId::of::<TestInjection2>()));
    }

    #[test]
    fn skips_constructor_declarations() {
        let constructed = Declaration::constructor_fn(vec![], |_: Arguments| Ok(Constructed));
        let instances = run(&[constructed]).unwrap();
        assert!(instances.is_empty());
    }

    #[test]
    fn synchronous_failure_stops_invoking_factories() {
        let invoked = Arc::new(AtomicUsize::new(0));
        let later = {
            let invoked = invoked.clone();
            move || -> Result<Produced<TestInjection2>, DynError> {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok(Produced::ready(TestInjection2))
            }
        };
        let failing = || -> Result<Produced<TestInjection>, DynError> { Err("sync failure".into()) };

        let error = run(&[
            Declaration::factory(FactoryFn::new(failing)),
            Declaration::factory(FactoryFn::new(later)),
        ])
        .unwrap_err();

        assert_eq!(error.component(), Some(TypeInfo::of::<TestInjection>()));
        assert_eq!(error.source().unwrap().to_string(), "sync failure");
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn deferred_failure_does_not_wait_for_pending_siblings() {
        let stuck = || -> Result<Produced<TestInjection>, DynError> {
            Ok(Produced::deferred(futures::future::pending::<Result<TestInjection, DynError>>()))
        };
        let failing = || -> Result<Produced<TestInjection2>, DynError> {
            Ok(Produced::deferred(async { Err::<TestInjection2, _>("async failure") }))
        };

        let error = run(&[
            Declaration::factory(FactoryFn::new(stuck)),
            Declaration::factory(FactoryFn::new(failing)),
        ])
        .unwrap_err();

        assert!(matches!(
            error,
            ResolveError::Instantiation { component, .. } if component == TypeInfo::of::<TestInjection2>()
        ));
    }

    #[test]
    fn deferred_factories_run_concurrently() {
        // The first factory can only finish once the second one has run
        let (tx, rx) = oneshot::channel::<&'static str>();
        let rx = std::sync::Mutex::new(Some(rx));
        let tx = std::sync::Mutex::new(Some(tx));

        let waiting = move || -> Result<Produced<TestInjection>, DynError> {
            let rx = rx.lock().unwrap().take().ok_or("invoked twice")?;
            Ok(Produced::deferred(async move {
                let prop = rx.await?;
                Ok::<_, DynError>(TestInjection { prop })
            }))
        };
        let signalling = move || -> Result<Produced<TestInjection2>, DynError> {
            let tx = tx.lock().unwrap().take().ok_or("invoked twice")?;
            Ok(Produced::deferred(async move {
                tx.send(CONTROL).map_err(|_| "receiver dropped")?;
                Ok::<_, DynError>(TestInjection2)
            }))
        };

        let instances = run(&[
            Declaration::factory(FactoryFn::new(waiting)),
            Declaration::factory(FactoryFn::new(signalling)),
        ])
        .unwrap();

        let waited = instances[&TypeId::of::<TestInjection>()]
            .downcast::<TestInjection>()
            .unwrap();
        assert_eq!(waited.prop, CONTROL);
    }

    #[test]
    fn provided_instance_is_shared_between_runs() {
        let declaration = Declaration::instance(String::from("shared"));

        let first = run(std::slice::from_ref(&declaration)).unwrap();
        let second = run(std::slice::from_ref(&declaration)).unwrap();

        let key = TypeId::of::<String>();
        assert!(first[&key].ptr_eq(&second[&key]));
    }
}
