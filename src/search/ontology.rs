//! Shared ontology parents

use crate::error::LookupError;
use crate::links::identifiers_url;
use crate::query::OntologyOptions;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// An ontology entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OntologyTerm {
    pub ns: String,
    pub id: String,
}

impl OntologyTerm {
    pub fn new(ns: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            ns: ns.into(),
            id: id.into(),
        }
    }
}

/// A common ancestor with display name and resolver link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyParent {
    pub name: String,
    pub ns: String,
    pub id: String,
    pub url: Option<String>,
}

/// External ontology ancestry lookup
pub trait OntologyLookup: Send + Sync {
    /// Ancestors shared by two terms, as `(name, term)`.
    ///
    /// With `immediate_only`, only direct parents are considered.
    /// `relations` restricts which relation types are followed.
    fn common_parents(
        &self,
        first: &OntologyTerm,
        second: &OntologyTerm,
        immediate_only: bool,
        relations: Option<&HashSet<String>>,
    ) -> Result<Vec<(String, OntologyTerm)>, LookupError>;
}

/// One parent edge of the in-memory ontology
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentLink {
    pub child: OntologyTerm,
    pub parent: OntologyTerm,
    /// Relation type, e.g. "isa" or "partof"
    pub relation: String,
}

/// Serialized in-memory ontology
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OntologyFile {
    #[serde(default)]
    pub names: Vec<(OntologyTerm, String)>,
    #[serde(default)]
    pub links: Vec<ParentLink>,
}

/// In-memory ontology: parent links plus display names
#[derive(Debug, Clone, Default)]
pub struct InMemoryOntology {
    parents: HashMap<OntologyTerm, Vec<(OntologyTerm, String)>>,
    names: HashMap<OntologyTerm, String>,
}

impl InMemoryOntology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, term: OntologyTerm, name: impl Into<String>) -> Self {
        self.names.insert(term, name.into());
        self
    }

    pub fn with_parent(mut self, child: OntologyTerm, parent: OntologyTerm, relation: impl Into<String>) -> Self {
        self.parents
            .entry(child)
            .or_default()
            .push((parent, relation.into()));
        self
    }

    /// Build from a serialized ontology
    pub fn from_file(file: OntologyFile) -> Self {
        let mut ontology = Self::new();
        for (term, name) in file.names {
            ontology.names.insert(term, name);
        }
        for link in file.links {
            ontology = ontology.with_parent(link.child, link.parent, link.relation);
        }
        ontology
    }

    fn ancestors(
        &self,
        term: &OntologyTerm,
        immediate_only: bool,
        relations: Option<&HashSet<String>>,
    ) -> BTreeSet<OntologyTerm> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([term.clone()]);
        while let Some(current) = queue.pop_front() {
            for (parent, relation) in self.parents.get(&current).into_iter().flatten() {
                if relations.map_or(false, |r| !r.contains(relation)) {
                    continue;
                }
                if seen.insert(parent.clone()) && !immediate_only {
                    queue.push_back(parent.clone());
                }
            }
        }
        seen
    }

    fn name_of(&self, term: &OntologyTerm) -> String {
        self.names
            .get(term)
            .cloned()
            .unwrap_or_else(|| term.id.clone())
    }
}

impl OntologyLookup for InMemoryOntology {
    fn common_parents(
        &self,
        first: &OntologyTerm,
        second: &OntologyTerm,
        immediate_only: bool,
        relations: Option<&HashSet<String>>,
    ) -> Result<Vec<(String, OntologyTerm)>, LookupError> {
        let a = self.ancestors(first, immediate_only, relations);
        let b = self.ancestors(second, immediate_only, relations);
        Ok(a.intersection(&b)
            .map(|term| (self.name_of(term), term.clone()))
            .collect())
    }
}

/// Common ancestors of the two entities, sorted by name, namespace and
/// identifier and truncated to `max_paths`. Lookup failures propagate.
pub fn shared_parents(
    lookup: &dyn OntologyLookup,
    options: &OntologyOptions,
) -> Result<Vec<OntologyParent>, LookupError> {
    let first = OntologyTerm::new(options.source_ns.clone(), options.source_id.clone());
    let second = OntologyTerm::new(options.target_ns.clone(), options.target_id.clone());
    let mut parents: Vec<OntologyParent> = lookup
        .common_parents(
            &first,
            &second,
            options.immediate_only,
            options.is_a_part_of.as_ref(),
        )?
        .into_iter()
        .map(|(name, term)| OntologyParent {
            url: identifiers_url(&term.ns, &term.id),
            name,
            ns: term.ns,
            id: term.id,
        })
        .collect();
    parents.sort_by(|a, b| (&a.name, &a.ns, &a.id).cmp(&(&b.name, &b.ns, &b.id)));
    parents.truncate(options.max_paths);
    Ok(parents)
}
