//! Prefetch request trees.
//!
//! Dotted relation paths such as `books__tags` are folded into a tree keyed by
//! relation name. Each entry may carry a terminal load request and nested
//! requests for deeper segments.

use tracing::debug;

use super::filter::Q;
use crate::catalog::ModelRegistry;
use crate::error::Error;

/// What to load for one relation.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSpec {
    /// Model to load.
    pub model: String,
    /// Optional filter restricting the related rows.
    pub filter: Option<Q>,
}

impl LoadSpec {
    /// Load every related row of `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            filter: None,
        }
    }

    /// Restrict the related rows.
    pub fn with_filter(mut self, filter: Q) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// One relation in a prefetch tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchEntry {
    /// Load request bound directly to this relation.
    pub terminal: Option<LoadSpec>,
    /// Requests for relations of the related model.
    pub nested: PrefetchTree,
}

/// Hierarchical map of related-object load requests.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchTree {
    model: String,
    entries: Vec<(String, PrefetchEntry)>,
}

impl PrefetchTree {
    /// Create an empty tree rooted at `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            entries: Vec::new(),
        }
    }

    /// Model this tree's relations belong to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Bind `load_spec` at `path`.
    ///
    /// Rebinding a terminal replaces the previous one. Nested paths under the
    /// same relation accumulate. `load_spec` must load the model the path
    /// reaches.
    pub fn attach(
        &mut self,
        registry: &dyn ModelRegistry,
        path: &str,
        load_spec: LoadSpec,
    ) -> Result<(), Error> {
        let target = self.validate(registry, path)?;
        if load_spec.model != target {
            return Err(Error::Operational(format!(
                "prefetch {path} loads {target}, not {}",
                load_spec.model
            )));
        }
        self.insert(registry, path, load_spec)
    }

    /// Bind the default load request (the related model, unfiltered) at `path`.
    pub fn attach_path(&mut self, registry: &dyn ModelRegistry, path: &str) -> Result<(), Error> {
        let target = self.validate(registry, path)?;
        self.insert(registry, path, LoadSpec::new(target))
    }

    /// Entry for a relation of this tree's model.
    pub fn get(&self, relation: &str) -> Option<&PrefetchEntry> {
        self.entries
            .iter()
            .find(|(name, _)| name == relation)
            .map(|(_, entry)| entry)
    }

    /// Every terminal path, in insertion order.
    pub fn paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (name, entry) in &self.entries {
            if entry.terminal.is_some() {
                out.push(name.clone());
            }
            out.extend(
                entry
                    .nested
                    .paths()
                    .into_iter()
                    .map(|rest| format!("{name}__{rest}")),
            );
        }
        out
    }

    /// Whether no relation has been attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every segment of `path`, returning the model the last one reaches.
    fn validate(&self, registry: &dyn ModelRegistry, path: &str) -> Result<String, Error> {
        let mut model = registry.require(&self.model)?;
        for segment in path.split("__") {
            let relation = model.relation(segment).ok_or_else(|| {
                Error::Operational(format!(
                    "relation {segment} for {} not found",
                    model.table()
                ))
            })?;
            model = registry.require(&relation.target)?;
        }
        Ok(model.name().to_string())
    }

    fn insert(
        &mut self,
        registry: &dyn ModelRegistry,
        path: &str,
        load_spec: LoadSpec,
    ) -> Result<(), Error> {
        let (head, rest) = match path.split_once("__") {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let target = registry
            .require(&self.model)?
            .relation(head)
            .map(|r| r.target.clone())
            .ok_or_else(|| Error::Operational(format!("relation {head} not found")))?;

        let idx = match self.entries.iter().position(|(name, _)| name == head) {
            Some(idx) => idx,
            None => {
                self.entries.push((
                    head.to_string(),
                    PrefetchEntry {
                        terminal: None,
                        nested: PrefetchTree::new(target),
                    },
                ));
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[idx].1;

        match rest {
            None => {
                if entry.terminal.is_some() {
                    debug!(model = %self.model, relation = head, "replacing prefetch request");
                }
                entry.terminal = Some(load_spec);
                Ok(())
            }
            Some(rest) => entry.nested.insert(registry, rest, load_spec),
        }
    }
}
