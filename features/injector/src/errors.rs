use std::sync::Arc;

use thiserror::Error;

use crate::types::{DynError, TypeInfo};

/// Errors while declaring components
#[derive(Error, Debug, Clone)]
pub enum RegisterError {
    /// The component already has a declaration in this registry
    #[error("Duplicate registration of '{0}'")]
    DuplicateRegistration(TypeInfo),
}

/// Errors while resolving a registry into an instance pool
///
/// Any of these aborts the run, no partial pool is returned.
#[derive(Error, Debug, Clone)]
pub enum ResolveError {
    /// A factory or constructor failed
    ///
    /// The underlying failure is kept as the error source.
    #[error("Injection factory internal error occurred while instantiating '{component}'")]
    Instantiation {
        component: TypeInfo,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// No pending component could be instantiated
    #[error("An injection cycle encountered among injections {}", join_names(.pending, "-"))]
    InjectionCycle {
        /// Every component still pending when the run stalled, in registry order
        pending: Vec<TypeInfo>,
        /// One dependency chain closing the cycle, first and last entry are equal
        chain: Vec<TypeInfo>,
    },

    /// Rejected dangling dependencies
    #[error("{} dependencies are not registered: {}", .0.len(), join_missing(.0))]
    MissingDependencies(Vec<MissingDependency>),
}

impl ResolveError {
    pub(crate) fn instantiation(component: TypeInfo, error: DynError) -> Self {
        ResolveError::Instantiation {
            component,
            source: Arc::from(error),
        }
    }

    /// The component the error is about, if it names a single one
    pub fn component(&self) -> Option<TypeInfo> {
        match self {
            ResolveError::Instantiation { component, .. } => Some(*component),
            _ => None,
        }
    }
}

/// A declared dependency without a declaration of its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingDependency {
    pub dependency: TypeInfo,
    pub required_by: TypeInfo,
}
impl std::fmt::Display for MissingDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "'{}' needs '{}'", self.required_by, self.dependency)
    }
}

/// Errors when a constructor takes its arguments
#[derive(Error, Debug, Clone)]
pub enum ArgumentError {
    /// The dependency has no instance in this run
    #[error("No instance of '{0}' is available")]
    Absent(TypeInfo),
    /// More arguments were taken than dependencies were declared
    #[error("'{component}' declares {declared} dependencies, argument {requested} was requested")]
    Exhausted {
        component: TypeInfo,
        declared: usize,
        requested: usize,
    },
    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    TypeMismatch {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors when trying to require a type from an instance pool
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    /// The required type was not produced
    #[error("The required type '{0}' is not known.")]
    TypeMissing(&'static str),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

fn join_names(infos: &[TypeInfo], separator: &str) -> String {
    infos
        .iter()
        .map(|info| info.type_name)
        .collect::<Vec<_>>()
        .join(separator)
}

fn join_missing(missing: &[MissingDependency]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders a dependency chain as `A -> B -> A`
pub(crate) fn format_chain(chain: &[TypeInfo]) -> String {
    join_names(chain, " -> ")
}
