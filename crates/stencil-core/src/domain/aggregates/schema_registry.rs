//! Schema registry: forward index by path plus a reverse `$ref` index.
//!
//! ```text
//! schemas:    "to/task/f_task.json" ──► Schema
//! dependents: "common/base/defs.json" ──► { "to/task/f_task.json", ... }
//! ```
//!
//! The reverse index only holds canonical path strings that are keys of the
//! forward map, never references to the schemas themselves.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::domain::{
    entities::Schema,
    error::DomainError,
    value_objects::{PathFilter, SchemaPath},
};

/// One `schema → $ref` edge whose target is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingReference {
    pub schema: String,
    pub reference: String,
}

/// Outcome of [`SchemaRegistry::validate_dependencies`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub valid: bool,
    pub missing: Vec<MissingReference>,
    /// Each cycle as the list of paths around it, first path repeated last.
    pub circular: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Schema>,
    dependents: HashMap<String, HashSet<String>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `schema` and its outgoing references.
    ///
    /// A schema already registered at the same path is replaced and its old
    /// edges are pruned first.
    ///
    /// # Errors
    ///
    /// `DependencyError` if any `$ref` is blank.
    pub fn register(&mut self, schema: Schema) -> Result<(), DomainError> {
        let key = schema.path().path();

        if let Some(blank) = schema.references().iter().find(|r| r.trim().is_empty()) {
            return Err(DomainError::DependencyError {
                schema: key,
                reason: format!("blank $ref '{blank}'"),
            });
        }

        if self.schemas.contains_key(&key) {
            self.unlink(&key);
        }

        for reference in schema.references() {
            self.dependents
                .entry(reference.clone())
                .or_default()
                .insert(key.clone());
        }
        self.schemas.insert(key, schema);
        Ok(())
    }

    /// Drop the schema at `path` and every reverse edge it contributed.
    ///
    /// Returns `false` if nothing was registered there.
    pub fn remove(&mut self, path: &SchemaPath) -> bool {
        let key = path.path();
        if self.schemas.remove(&key).is_none() {
            return false;
        }
        self.unlink(&key);
        true
    }

    fn unlink(&mut self, key: &str) {
        self.dependents.retain(|_, set| {
            set.remove(key);
            !set.is_empty()
        });
    }

    pub fn get(&self, path: &SchemaPath) -> Option<&Schema> {
        self.schemas.get(&path.path())
    }

    pub fn contains(&self, path: &SchemaPath) -> bool {
        self.schemas.contains_key(&path.path())
    }

    /// Schemas passing `filter`, sorted by canonical path.
    pub fn list(&self, filter: &PathFilter) -> Vec<&Schema> {
        let mut out: Vec<&Schema> = self
            .schemas
            .values()
            .filter(|s| s.path().matches(filter))
            .collect();
        out.sort_by(|a, b| a.path().cmp(b.path()));
        out
    }

    /// Paths of schemas declaring `$ref == reference`, sorted.
    pub fn dependents_of(&self, reference: &str) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .dependents
            .get(reference)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn clear(&mut self) {
        self.schemas.clear();
        self.dependents.clear();
    }

    /// Check every registered edge.
    ///
    /// A reference is resolved by its document part (anything before `#`);
    /// pure fragment references (`#/definitions/x`) point inside the same
    /// document and are never reported missing.
    pub fn validate_dependencies(&self) -> DependencyReport {
        let mut missing = Vec::new();
        for (reference, sources) in &self.dependents {
            let Some(target) = document_part(reference) else {
                continue;
            };
            if self.schemas.contains_key(target) {
                continue;
            }
            for schema in sources {
                missing.push(MissingReference {
                    schema: schema.clone(),
                    reference: reference.clone(),
                });
            }
        }
        missing.sort_by(|a, b| (&a.schema, &a.reference).cmp(&(&b.schema, &b.reference)));

        let circular = self.find_cycles();
        DependencyReport {
            valid: missing.is_empty() && circular.is_empty(),
            missing,
            circular,
        }
    }

    /// Forward adjacency (`schema → registered targets`) built from the
    /// reverse index, with deterministic ordering.
    fn edges(&self) -> HashMap<&str, BTreeSet<&str>> {
        let mut edges: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for (reference, sources) in &self.dependents {
            let Some(target) = document_part(reference) else {
                continue;
            };
            let Some((target, _)) = self.schemas.get_key_value(target) else {
                continue;
            };
            for source in sources {
                edges
                    .entry(source.as_str())
                    .or_default()
                    .insert(target.as_str());
            }
        }
        edges
    }

    /// Every elementary cycle, each reported once and rotated to start at
    /// its smallest path.
    ///
    /// A cycle is found only from its smallest member: the search from
    /// `start` never enters a path that sorts below `start`.
    fn find_cycles(&self) -> Vec<Vec<String>> {
        let edges = self.edges();
        let mut starts: Vec<&str> = edges.keys().copied().collect();
        starts.sort_unstable();

        let mut found: BTreeSet<Vec<String>> = BTreeSet::new();
        for start in starts {
            let mut stack = vec![start];
            let mut on_stack: HashSet<&str> = HashSet::from([start]);
            visit(start, start, &edges, &mut stack, &mut on_stack, &mut found);
        }

        found.into_iter().collect()
    }
}

fn visit<'a>(
    start: &'a str,
    node: &'a str,
    edges: &HashMap<&'a str, BTreeSet<&'a str>>,
    stack: &mut Vec<&'a str>,
    on_stack: &mut HashSet<&'a str>,
    found: &mut BTreeSet<Vec<String>>,
) {
    let Some(targets) = edges.get(node) else {
        return;
    };
    for &next in targets {
        if next == start {
            found.insert(normalize_cycle(stack));
        } else if next > start && !on_stack.contains(next) {
            stack.push(next);
            on_stack.insert(next);
            visit(start, next, edges, stack, on_stack, found);
            stack.pop();
            on_stack.remove(next);
        }
    }
}

fn normalize_cycle(members: &[&str]) -> Vec<String> {
    let pivot = members
        .iter()
        .enumerate()
        .min_by_key(|(_, n)| **n)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut cycle: Vec<String> = members[pivot..]
        .iter()
        .chain(&members[..pivot])
        .map(|n| n.to_string())
        .collect();
    if let Some(first) = cycle.first().cloned() {
        cycle.push(first);
    }
    cycle
}

/// `a/b/c.json#/defs/x` → `a/b/c.json`; `#/defs/x` → `None`.
fn document_part(reference: &str) -> Option<&str> {
    let doc = reference.split('#').next().unwrap_or_default();
    (!doc.is_empty()).then_some(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SchemaContent;
    use serde_json::{Value, json};

    fn schema(path: &str, refs: &[&str]) -> Schema {
        let props: serde_json::Map<String, Value> = refs
            .iter()
            .enumerate()
            .map(|(i, r)| (format!("p{i}"), json!({ "$ref": r })))
            .collect();
        Schema::new(
            SchemaPath::from_string(path).unwrap(),
            SchemaContent::create(json!({ "type": "object", "properties": props })).unwrap(),
        )
    }

    fn path(s: &str) -> SchemaPath {
        SchemaPath::from_string(s).unwrap()
    }

    #[test]
    fn register_indexes_reverse_edges() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema("to/task/a.json", &["common/base/x.json"]))
            .unwrap();
        reg.register(schema("to/issue/b.json", &["common/base/x.json"]))
            .unwrap();

        assert_eq!(reg.len(), 2);
        assert_eq!(
            reg.dependents_of("common/base/x.json"),
            ["to/issue/b.json", "to/task/a.json"]
        );
    }

    #[test]
    fn remove_prunes_reverse_edges() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema("to/task/a.json", &["common/base/x.json"]))
            .unwrap();

        assert!(reg.remove(&path("to/task/a.json")));
        assert!(reg.dependents_of("common/base/x.json").is_empty());
        assert!(reg.dependents.is_empty());
        assert!(!reg.remove(&path("to/task/a.json")));

        let report = reg.validate_dependencies();
        assert!(report.valid);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn reregister_replaces_edges() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema("to/task/a.json", &["x/y/old.json"])).unwrap();
        reg.register(schema("to/task/a.json", &["x/y/new.json"])).unwrap();

        assert_eq!(reg.len(), 1);
        assert!(reg.dependents_of("x/y/old.json").is_empty());
        assert_eq!(reg.dependents_of("x/y/new.json"), ["to/task/a.json"]);
    }

    #[test]
    fn blank_ref_is_rejected() {
        let mut reg = SchemaRegistry::new();
        let err = reg.register(schema("to/task/a.json", &[" "])).unwrap_err();
        assert!(matches!(err, DomainError::DependencyError { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn missing_references_are_reported() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema(
            "to/task/a.json",
            &["to/task/b.json", "nope/none/c.json", "#/definitions/local"],
        ))
        .unwrap();
        reg.register(schema("to/task/b.json", &["to/task/b.json#/defs/self"]))
            .unwrap();

        let report = reg.validate_dependencies();
        assert!(!report.valid);
        assert_eq!(
            report.missing,
            vec![MissingReference {
                schema: "to/task/a.json".into(),
                reference: "nope/none/c.json".into(),
            }]
        );
    }

    #[test]
    fn cycles_are_detected_once() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema("d/l/a.json", &["d/l/b.json"])).unwrap();
        reg.register(schema("d/l/b.json", &["d/l/c.json"])).unwrap();
        reg.register(schema("d/l/c.json", &["d/l/a.json"])).unwrap();
        reg.register(schema("d/l/z.json", &["d/l/a.json"])).unwrap();

        let report = reg.validate_dependencies();
        assert!(!report.valid);
        assert!(report.missing.is_empty());
        assert_eq!(
            report.circular,
            vec![vec![
                "d/l/a.json".to_string(),
                "d/l/b.json".into(),
                "d/l/c.json".into(),
                "d/l/a.json".into(),
            ]]
        );
    }

    #[test]
    fn cycles_sharing_a_node_are_all_reported() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema("d/l/a.json", &["d/l/b.json", "d/l/c.json"]))
            .unwrap();
        reg.register(schema("d/l/b.json", &["d/l/c.json"])).unwrap();
        reg.register(schema("d/l/c.json", &["d/l/a.json"])).unwrap();

        let report = reg.validate_dependencies();
        assert_eq!(
            report.circular,
            vec![
                vec![
                    "d/l/a.json".to_string(),
                    "d/l/b.json".into(),
                    "d/l/c.json".into(),
                    "d/l/a.json".into(),
                ],
                vec![
                    "d/l/a.json".to_string(),
                    "d/l/c.json".into(),
                    "d/l/a.json".into(),
                ],
            ]
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema("d/l/a.json", &["d/l/a.json"])).unwrap();
        let report = reg.validate_dependencies();
        assert_eq!(
            report.circular,
            vec![vec!["d/l/a.json".to_string(), "d/l/a.json".into()]]
        );
    }

    #[test]
    fn acyclic_graph_is_valid() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema("d/l/a.json", &["d/l/b.json", "d/l/c.json"]))
            .unwrap();
        reg.register(schema("d/l/b.json", &["d/l/c.json"])).unwrap();
        reg.register(schema("d/l/c.json", &[])).unwrap();
        let report = reg.validate_dependencies();
        assert!(report.valid, "{report:?}");
    }

    #[test]
    fn list_filter_is_intersection() {
        let mut reg = SchemaRegistry::new();
        for p in [
            "to/task/a.json",
            "to/issue/b.json",
            "summary/task/c.json",
            "summary/issue/d.json",
        ] {
            reg.register(schema(p, &[])).unwrap();
        }

        let keys = |f: PathFilter| -> Vec<String> {
            reg.list(&f).iter().map(|s| s.path().path()).collect()
        };

        let both = keys(PathFilter::new().directive("to").layer("task"));
        let by_dir = keys(PathFilter::new().directive("to"));
        let by_layer = keys(PathFilter::new().layer("task"));
        let intersection: Vec<String> = by_dir
            .iter()
            .filter(|p| by_layer.contains(p))
            .cloned()
            .collect();

        assert_eq!(both, intersection);
        assert_eq!(both, ["to/task/a.json"]);
        assert_eq!(keys(PathFilter::new()).len(), 4);
    }

    #[test]
    fn clear_empties_both_indexes() {
        let mut reg = SchemaRegistry::new();
        reg.register(schema("to/task/a.json", &["x/y/z.json"])).unwrap();
        reg.clear();
        assert!(reg.is_empty());
        assert!(reg.dependents_of("x/y/z.json").is_empty());
    }
}
