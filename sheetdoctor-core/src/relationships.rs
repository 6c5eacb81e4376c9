//! Relationship parts (`*.rels`): parsing, target resolution and existence checks

use crate::namespaces::PACKAGE_RELATIONSHIPS;
use crate::package::Package;
use crate::problem::Problem;
use crate::xml::load_xml;
use std::collections::HashMap;
use tracing::{debug, trace};

/// How a relationship target is addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// Target is a part inside the package
    Internal,
    /// Target is a resource outside the package (URL, file path, ...)
    External,
}

impl TargetMode {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("External") => TargetMode::External,
            _ => TargetMode::Internal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: Option<String>,
    /// Target exactly as declared
    pub target: String,
    pub mode: TargetMode,
    /// Part path of the target; `None` for external relationships
    pub resolved: Option<String>,
}

/// Relationships declared by one `.rels` part, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RelationshipTable {
    rels_part: String,
    relationships: Vec<Relationship>,
    by_id: HashMap<String, usize>,
}

impl RelationshipTable {
    pub fn new(rels_part: impl Into<String>) -> Self {
        Self {
            rels_part: rels_part.into(),
            ..Default::default()
        }
    }

    pub fn rels_part(&self) -> &str {
        &self.rels_part
    }

    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id).map(|&index| &self.relationships[index])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    /// First relationship whose type is one of `rel_types`
    pub fn find_by_type(&self, rel_types: &[&str]) -> Option<&Relationship> {
        self.relationships.iter().find(|r| {
            r.rel_type
                .as_deref()
                .is_some_and(|t| rel_types.contains(&t))
        })
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// Add a relationship. Returns false (and keeps the existing entry) when
    /// the id is already taken.
    fn insert(&mut self, relationship: Relationship) -> bool {
        if self.by_id.contains_key(&relationship.id) {
            return false;
        }
        self.by_id
            .insert(relationship.id.clone(), self.relationships.len());
        self.relationships.push(relationship);
        true
    }
}

/// Path of the relationships part that belongs to `part`.
///
/// `xl/workbook.xml` -> `xl/_rels/workbook.xml.rels`
pub fn rels_part_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file_name)) => format!("{}/_rels/{}.rels", dir, file_name),
        None => format!("_rels/{}.rels", part),
    }
}

/// The part that owns a relationships part.
///
/// `D/_rels/F.rels` -> `D/F`. The package root's `_rels/.rels` is owned by
/// the package itself, represented by the empty string.
pub fn source_part_for(rels_part: &str) -> String {
    let (dir, file_name) = match rels_part.rsplit_once('/') {
        Some((dir, file_name)) => (dir, file_name),
        None => ("", rels_part),
    };
    let dir = dir
        .strip_suffix("_rels")
        .map(|d| d.trim_end_matches('/'))
        .unwrap_or(dir);
    let file_name = file_name.strip_suffix(".rels").unwrap_or(file_name);

    if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{}/{}", dir, file_name)
    }
}

/// Resolve a relationship target against the part that declares it.
///
/// Absolute targets (leading `/`) are taken verbatim without the slash.
/// Relative targets are joined to the source part's directory and
/// normalised. `..` segments that climb above the package root are kept,
/// so such a target never matches a part.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let base_dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let joined = if base_dir.is_empty() {
        target.to_string()
    } else {
        format!("{}/{}", base_dir, target)
    };
    normalize(&joined)
}

fn normalize(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match out.last() {
                Some(&last) if last != ".." => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out.join("/")
}

/// Parse a relationships part and check every internal target exists.
///
/// Callers always get a table back; when the part is missing or malformed
/// it is empty and the reason is in the problem list.
pub fn resolve_relationships(
    package: &Package,
    rels_part: &str,
) -> (RelationshipTable, Vec<Problem>) {
    let mut table = RelationshipTable::new(rels_part);
    let mut problems = Vec::new();

    let document = match load_xml(package, rels_part) {
        Ok(Some(document)) => document,
        Ok(None) => {
            problems.push(Problem::MissingRelationshipsPart {
                rels_part: rels_part.to_string(),
            });
            return (table, problems);
        }
        Err(problem) => {
            problems.push(problem);
            return (table, problems);
        }
    };

    let source_part = source_part_for(rels_part);

    for element in document
        .root()
        .children_named(&[PACKAGE_RELATIONSHIPS], "Relationship")
    {
        let id = element.attribute("Id").filter(|v| !v.is_empty());
        let target = element.attribute("Target").filter(|v| !v.is_empty());
        let (Some(id), Some(target)) = (id, target) else {
            problems.push(Problem::RelationshipMissingIdOrTarget {
                rels_part: rels_part.to_string(),
            });
            continue;
        };

        let rel_type = element.attribute("Type").map(str::to_string);
        let mode = TargetMode::parse(element.attribute("TargetMode"));
        let resolved = match mode {
            TargetMode::External => None,
            TargetMode::Internal => Some(resolve_target(&source_part, target)),
        };
        trace!(rels_part, id, target, ?mode, ?resolved, "relationship");

        if let Some(path) = &resolved
            && !package.has_part(path)
        {
            problems.push(Problem::DanglingRelationship {
                rels_part: rels_part.to_string(),
                id: id.to_string(),
                target: path.clone(),
                rel_type: rel_type.clone(),
            });
        }

        let relationship = Relationship {
            id: id.to_string(),
            rel_type,
            target: target.to_string(),
            mode,
            resolved,
        };
        if !table.insert(relationship) {
            problems.push(Problem::DuplicateRelationshipId {
                rels_part: rels_part.to_string(),
                id: id.to_string(),
            });
        }
    }

    debug!(
        rels_part,
        relationships = table.len(),
        problems = problems.len(),
        "resolved relationships"
    );
    (table, problems)
}
