/// How a resolution run treats dependencies that were never registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingDependencyPolicy {
    /// Resolve them to absent arguments
    #[default]
    Ignore,
    /// Resolve them to absent arguments and log a warning per dangling dependency
    Warn,
    /// Fail the run before anything is instantiated
    Reject,
}

/// Settings of a single resolution run
///
/// # Example
/// ```rust
/// use injector::{MissingDependencyPolicy, ResolveOptions};
///
/// let options = ResolveOptions::new().missing_dependencies(MissingDependencyPolicy::Warn);
/// assert_eq!(options.missing_dependencies, MissingDependencyPolicy::Warn);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub missing_dependencies: MissingDependencyPolicy,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn missing_dependencies(mut self, policy: MissingDependencyPolicy) -> Self {
        self.missing_dependencies = policy;
        self
    }

    /// Shorthand for [MissingDependencyPolicy::Reject]
    pub fn strict() -> Self {
        Self::new().missing_dependencies(MissingDependencyPolicy::Reject)
    }
}
