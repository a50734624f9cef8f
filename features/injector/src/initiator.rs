use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
};

use crate::{
    arguments::Arguments,
    container::InstancePool,
    dependency_graph::DependencyGraph,
    errors::{format_chain, ResolveError},
    factories::instantiate_factories,
    options::{MissingDependencyPolicy, ResolveOptions},
    registry::Declaration,
    types::{Instance, TypeInfo},
};

/// Outcome of one round over the pending set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Round {
    /// At least one component was instantiated
    Running { instantiated: usize },
    /// Components are pending, but none of them can be instantiated
    Stalled,
    /// Nothing is pending anymore
    Done,
}

/// Resolves a list of declarations into an [InstancePool]
pub(crate) struct Initiator {
    options: ResolveOptions,
    /// All produced instances
    instances: HashMap<TypeId, Instance>,
}

impl Initiator {
    pub(crate) fn new(options: ResolveOptions) -> Initiator {
        Initiator {
            options,
            instances: HashMap::new(),
        }
    }

    pub async fn initiate(mut self, declarations: &[Declaration]) -> Result<InstancePool, ResolveError> {
        let graph = DependencyGraph::new(declarations);
        self.check_missing_dependencies(&graph)?;

        let (factories, constructors): (Vec<&Declaration>, Vec<&Declaration>) =
            declarations.iter().partition(|d| d.is_factory());

        tracing::debug!(
            "Resolving {} components with {} factories",
            declarations.len(),
            factories.len()
        );

        // ###############################################
        // Factories first, they have no dependencies
        self.instances = instantiate_factories(&factories).await?;

        let mut pending: Vec<&Declaration> = constructors
            .into_iter()
            .filter(|d| !self.instances.contains_key(&d.info().type_id))
            .collect();

        // ###############################################
        // Instantiate constructors in dependency order
        loop {
            match self.resolve_round(&mut pending)? {
                Round::Running { instantiated } => {
                    tracing::trace!(
                        "Instantiated {instantiated} components, {} pending",
                        pending.len()
                    );
                }
                Round::Stalled => {
                    let pending: Vec<TypeInfo> = pending.iter().map(|d| d.info()).collect();
                    let chain = graph.find_cycle(&pending);
                    tracing::error!(
                        "Injection cycle among {} pending components: {}",
                        pending.len(),
                        format_chain(&chain)
                    );
                    return Err(ResolveError::InjectionCycle { pending, chain });
                }
                Round::Done => break,
            }
        }

        tracing::debug!("All {} components instantiated", self.instances.len());
        Ok(InstancePool::new(self.instances))
    }

    /// Instantiates every pending declaration whose dependencies are not pending
    ///
    /// Candidates are selected before any of them is instantiated, so components
    /// instantiated in the same round never depend on each other.
    fn resolve_round(&mut self, pending: &mut Vec<&Declaration>) -> Result<Round, ResolveError> {
        if pending.is_empty() {
            return Ok(Round::Done);
        }

        let pending_ids: HashSet<TypeId> = pending.iter().map(|d| d.info().type_id).collect();
        let (candidates, blocked): (Vec<&Declaration>, Vec<&Declaration>) =
            pending.drain(..).partition(|declaration| {
                declaration
                    .dependencies()
                    .iter()
                    .all(|dependency| !pending_ids.contains(&dependency.type_id))
            });
        *pending = blocked;

        if candidates.is_empty() {
            return Ok(Round::Stalled);
        }

        let instantiated = candidates.len();
        for candidate in candidates {
            self.instantiate(candidate)?;
        }

        Ok(Round::Running { instantiated })
    }

    fn instantiate(&mut self, declaration: &Declaration) -> Result<(), ResolveError> {
        let info = declaration.info();
        let slots = declaration
            .dependencies()
            .iter()
            .map(|dependency| (*dependency, self.instances.get(&dependency.type_id).cloned()))
            .collect();

        let Some(result) = declaration.construct(Arguments::new(info, slots)) else {
            // Factories are resolved before the constructor loop
            return Ok(());
        };
        let instance = result.map_err(|error| {
            tracing::debug!("Constructor of {} failed: {error}", info.type_name);
            ResolveError::instantiation(info, error)
        })?;

        tracing::trace!("Constructed instance of {}", info.type_name);
        self.instances.insert(info.type_id, instance);
        Ok(())
    }

    fn check_missing_dependencies(&self, graph: &DependencyGraph<'_>) -> Result<(), ResolveError> {
        let missing = graph.missing_dependencies();
        if missing.is_empty() {
            return Ok(());
        }

        match self.options.missing_dependencies {
            MissingDependencyPolicy::Ignore => {
                tracing::debug!(
                    "{} dependencies are not registered and resolve to absent arguments",
                    missing.len()
                );
                Ok(())
            }
            MissingDependencyPolicy::Warn => {
                for entry in &missing {
                    tracing::warn!(
                        "'{}' needs '{}' but it is not registered",
                        entry.required_by,
                        entry.dependency
                    );
                }
                Ok(())
            }
            MissingDependencyPolicy::Reject => Err(ResolveError::MissingDependencies(missing)),
        }
    }
}
