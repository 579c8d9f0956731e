use crate::domain::model::PackageSpec;
use crate::utils::error::{ProvisionError, Result};
use std::collections::HashMap;

/// Directed dependency graph over package names.
///
/// The install order used to be a hand-maintained list; packages now declare
/// `depends_on` edges and the order is computed, so plan edits cannot
/// silently break the sequencing.
pub struct DependencyGraph {
    nodes: Vec<String>,
    index: HashMap<String, usize>,
    /// dependents[i] lists the nodes that depend on node i.
    dependents: Vec<Vec<usize>>,
    indegree: Vec<usize>,
}

impl DependencyGraph {
    pub fn from_packages(packages: &[PackageSpec]) -> Result<Self> {
        let nodes: Vec<String> = packages.iter().map(|p| p.name.clone()).collect();
        let mut index = HashMap::new();
        for (i, name) in nodes.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(ProvisionError::ConfigError {
                    message: format!("Duplicate package name in plan: {}", name),
                });
            }
        }

        let mut dependents = vec![Vec::new(); nodes.len()];
        let mut indegree = vec![0usize; nodes.len()];

        for (i, package) in packages.iter().enumerate() {
            for dep in &package.depends_on {
                let dep_idx =
                    *index
                        .get(dep)
                        .ok_or_else(|| ProvisionError::UnknownDependency {
                            package: package.name.clone(),
                            dependency: dep.clone(),
                        })?;
                dependents[dep_idx].push(i);
                indegree[i] += 1;
            }
        }

        Ok(Self {
            nodes,
            index,
            dependents,
            indegree,
        })
    }

    /// Topological order via Kahn's algorithm, always picking the ready node
    /// with the lowest declaration index. Deterministic: the same plan yields
    /// the same order on every run.
    pub fn topo_order(&self) -> Result<Vec<String>> {
        let mut indegree = self.indegree.clone();
        let mut emitted = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());

        while order.len() < self.nodes.len() {
            let next = (0..self.nodes.len()).find(|&i| !emitted[i] && indegree[i] == 0);

            match next {
                Some(i) => {
                    emitted[i] = true;
                    order.push(self.nodes[i].clone());
                    for &dependent in &self.dependents[i] {
                        indegree[dependent] -= 1;
                    }
                }
                None => {
                    let members: Vec<String> = (0..self.nodes.len())
                        .filter(|&i| !emitted[i])
                        .map(|i| self.nodes[i].clone())
                        .collect();
                    return Err(ProvisionError::DependencyCycle { members });
                }
            }
        }

        Ok(order)
    }
}
