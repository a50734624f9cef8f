use std::{
    any::TypeId,
    collections::{HashMap, HashSet},
};

use crate::{errors::MissingDependency, registry::Declaration, types::TypeInfo};

/// Static view of the declared dependencies
///
/// Used for diagnostics only, resolution itself works on the pending set.
pub struct DependencyGraph<'a> {
    entries: Vec<DependencyGraphEntry<'a>>,
    index: HashMap<TypeId, usize>,
}

struct DependencyGraphEntry<'a> {
    info: TypeInfo,
    dependencies: &'a [TypeInfo],
}

impl<'a> DependencyGraph<'a> {
    pub fn new(declarations: &'a [Declaration]) -> Self {
        let entries: Vec<_> = declarations
            .iter()
            .map(|declaration| DependencyGraphEntry {
                info: declaration.info(),
                dependencies: declaration.dependencies(),
            })
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.info.type_id, position))
            .collect();

        Self { entries, index }
    }

    /// Every dependency without a declaration, in declaration order
    pub fn missing_dependencies(&self) -> Vec<MissingDependency> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .dependencies
                    .iter()
                    .filter(|dependency| !self.index.contains_key(&dependency.type_id))
                    .map(|dependency| MissingDependency {
                        dependency: *dependency,
                        required_by: entry.info,
                    })
            })
            .collect()
    }

    /// Finds one dependency chain which closes a cycle among `pending`
    ///
    /// Only dependencies which are themselves pending are followed. The first
    /// and last element of the returned chain are the same component. Returns
    /// an empty chain if `pending` contains no cycle.
    pub fn find_cycle(&self, pending: &[TypeInfo]) -> Vec<TypeInfo> {
        let pending_ids: HashSet<TypeId> = pending.iter().map(|info| info.type_id).collect();
        let mut checked = HashSet::new();

        for start in pending {
            let mut chain = Vec::new();
            if let Some(cycle) = self.walk(*start, &pending_ids, &mut checked, &mut chain) {
                return cycle;
            }
        }

        Vec::new()
    }

    fn walk(
        &self,
        info: TypeInfo,
        pending: &HashSet<TypeId>,
        checked: &mut HashSet<TypeId>,
        chain: &mut Vec<TypeInfo>,
    ) -> Option<Vec<TypeInfo>> {
        // Circular Dependency Check
        if let Some(position) = chain.iter().position(|entry| *entry == info) {
            let mut cycle = chain[position..].to_vec();
            cycle.push(info); // Add current so chain is complete
            return Some(cycle);
        }

        // Fully explored without finding a cycle
        if !checked.insert(info.type_id) {
            return None;
        }

        let entry = &self.entries[*self.index.get(&info.type_id)?];
        chain.push(info);
        for dependency in entry.dependencies {
            if !pending.contains(&dependency.type_id) {
                continue;
            }
            if let Some(cycle) = self.walk(*dependency, pending, checked, chain) {
                return Some(cycle);
            }
        }
        chain.pop();

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arguments::Arguments, deps, types::DynError};

    struct A;
    struct B;
    struct C;
    struct D;
    struct Unregistered;

    fn declare<T: Send + Sync + 'static>(dependencies: Vec<TypeInfo>, value: fn() -> T) -> Declaration {
        Declaration::constructor_fn(dependencies, move |_: Arguments| Ok::<_, DynError>(value()))
    }

    #[test]
    fn lists_missing_dependencies() {
        let declarations = vec![
            declare(deps![B, Unregistered], || A),
            declare(deps![], || B),
        ];
        let graph = DependencyGraph::new(&declarations);

        assert_eq!(
            graph.missing_dependencies(),
            vec![MissingDependency {
                dependency: TypeInfo::of::<Unregistered>(),
                required_by: TypeInfo::of::<A>(),
            }]
        );
    }

    #[test]
    fn finds_cycle_chain() {
        // D hangs off the cycle A -> B -> C -> A
        let declarations = vec![
            declare(deps![A], || D),
            declare(deps![B], || A),
            declare(deps![C], || B),
            declare(deps![A], || C),
        ];
        let graph = DependencyGraph::new(&declarations);

        let cycle = graph.find_cycle(&deps![D, A, B, C]);
        assert_eq!(cycle, deps![A, B, C, A]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let declarations = vec![declare(deps![A], || A)];
        let graph = DependencyGraph::new(&declarations);

        assert_eq!(graph.find_cycle(&deps![A]), deps![A, A]);
    }

    #[test]
    fn ignores_resolved_dependencies() {
        let declarations = vec![declare(deps![B], || A), declare(deps![A], || B)];
        let graph = DependencyGraph::new(&declarations);

        assert!(graph.find_cycle(&deps![A]).is_empty());
    }
}
