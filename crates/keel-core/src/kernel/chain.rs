use std::collections::HashSet;

use indexmap::IndexMap;
use thiserror::Error;

use crate::kernel::component::Phase;

/// Error that can occur while ordering components for a phase
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Anchor component '{anchor}' for phase '{phase}' is not instantiated")]
    MissingAnchor { phase: Phase, anchor: String },

    #[error("Component '{component}' requires '{dependency}' for phase '{phase}', which is not instantiated")]
    MissingDependency {
        phase: Phase,
        component: String,
        dependency: String,
    },

    #[error("Circular dependency detected for phase '{phase}': {}", .path.join(" -> "))]
    CyclicDependency { phase: Phase, path: Vec<String> },
}

/// Orders components for one lifecycle phase.
///
/// Nodes are visited depth-first in insertion order, so components that no
/// requirement constrains keep the order they were added in. The anchor is
/// always placed first and its own requirements are never visited.
#[derive(Debug)]
pub struct ChainBuilder<'a> {
    phase: Phase,
    nodes: IndexMap<&'a str, &'a [&'static str]>,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            nodes: IndexMap::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Add a component together with its requirements for this builder's phase.
    pub fn add_node(&mut self, identity: &'a str, requires: &'a [&'static str]) -> &mut Self {
        self.nodes.insert(identity, requires);
        self
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.nodes.contains_key(identity)
    }

    /// Compute the chain, anchor first.
    pub fn build(&self, anchor: &str) -> Result<Vec<&'a str>, ChainError> {
        let (&anchor, _) = self.nodes.get_key_value(anchor).ok_or_else(|| ChainError::MissingAnchor {
            phase: self.phase,
            anchor: anchor.to_string(),
        })?;

        let mut seq = vec![anchor];
        let mut placed = HashSet::from([anchor]);
        let mut visiting = Vec::new();

        for &identity in self.nodes.keys() {
            self.visit(identity, &mut seq, &mut placed, &mut visiting)?;
        }

        log::debug!("Chain for phase [{}]: {}", self.phase, seq.join(", "));
        Ok(seq)
    }

    fn visit(
        &self,
        identity: &'a str,
        seq: &mut Vec<&'a str>,
        placed: &mut HashSet<&'a str>,
        visiting: &mut Vec<&'a str>,
    ) -> Result<(), ChainError> {
        if placed.contains(identity) {
            return Ok(());
        }

        if let Some(start) = visiting.iter().position(|v| *v == identity) {
            let mut path: Vec<String> = visiting[start..].iter().map(|v| v.to_string()).collect();
            path.push(identity.to_string());
            return Err(ChainError::CyclicDependency {
                phase: self.phase,
                path,
            });
        }

        let requires = self.nodes.get(identity).copied().unwrap_or(&[]);

        // Every requirement must resolve before any of them is visited.
        let mut resolved = Vec::with_capacity(requires.len());
        for dependency in requires {
            match self.nodes.get_key_value(*dependency) {
                Some((&key, _)) => resolved.push(key),
                None => {
                    return Err(ChainError::MissingDependency {
                        phase: self.phase,
                        component: identity.to_string(),
                        dependency: dependency.to_string(),
                    });
                }
            }
        }

        visiting.push(identity);
        for dependency in resolved {
            self.visit(dependency, seq, placed, visiting)?;
        }
        visiting.pop();

        if placed.insert(identity) {
            seq.push(identity);
        }
        Ok(())
    }
}
