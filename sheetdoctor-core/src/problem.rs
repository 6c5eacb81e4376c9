//! Structural problems found in a package

use crate::namespaces::CONTENT_TYPES_PART;
use serde::Serialize;
use std::fmt;

/// A single structural defect.
///
/// Each variant carries the identifiers needed to locate the defect, so
/// tests and tools can match on fields instead of rendered text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Problem {
    /// A part the package cannot work without is absent
    MissingRequiredPart { part: String },
    /// A part is not well-formed XML
    MalformedXml { part: String, message: String },
    /// A part is listed in the archive but its data cannot be decompressed
    UnreadablePart { part: String, message: String },
    MissingRelationshipsPart { rels_part: String },
    RelationshipMissingIdOrTarget { rels_part: String },
    /// An internal relationship points at a part that does not exist
    DanglingRelationship {
        rels_part: String,
        id: String,
        target: String,
        rel_type: Option<String>,
    },
    DuplicateRelationshipId { rels_part: String, id: String },
    OverrideTargetsMissingPart { part_name: String },
    OverrideMissingPartName,
    SheetMissingRelationshipReference { workbook: String, sheet: String },
    UnknownSheetRelationship {
        workbook: String,
        sheet: String,
        id: String,
    },
    UnexpectedExternalSheetRelationship {
        workbook: String,
        sheet: String,
        id: String,
    },
    /// The sheet's relationship resolves, but to a part that does not exist
    SheetTargetPartMissing {
        workbook: String,
        sheet: String,
        target: String,
    },
    MissingSheetList { workbook: String },
    /// A `<f>` element with no formula text
    EmptyFormulaTag { part: String, cell: String },
}

/// Discriminant of a [`Problem`], with a stable code per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ProblemKind {
    MissingRequiredPart,
    MalformedXml,
    UnreadablePart,
    MissingRelationshipsPart,
    RelationshipMissingIdOrTarget,
    DanglingRelationship,
    DuplicateRelationshipId,
    OverrideTargetsMissingPart,
    OverrideMissingPartName,
    SheetMissingRelationshipReference,
    UnknownSheetRelationship,
    UnexpectedExternalSheetRelationship,
    SheetTargetPartMissing,
    MissingSheetList,
    EmptyFormulaTag,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; 15] = [
        ProblemKind::MissingRequiredPart,
        ProblemKind::MalformedXml,
        ProblemKind::UnreadablePart,
        ProblemKind::MissingRelationshipsPart,
        ProblemKind::RelationshipMissingIdOrTarget,
        ProblemKind::DanglingRelationship,
        ProblemKind::DuplicateRelationshipId,
        ProblemKind::OverrideTargetsMissingPart,
        ProblemKind::OverrideMissingPartName,
        ProblemKind::SheetMissingRelationshipReference,
        ProblemKind::UnknownSheetRelationship,
        ProblemKind::UnexpectedExternalSheetRelationship,
        ProblemKind::SheetTargetPartMissing,
        ProblemKind::MissingSheetList,
        ProblemKind::EmptyFormulaTag,
    ];

    /// Stable identifier (e.g. "REL003") used in configuration files
    pub fn code(&self) -> &'static str {
        match self {
            ProblemKind::MissingRequiredPart => "PKG001",
            ProblemKind::MalformedXml => "PKG002",
            ProblemKind::UnreadablePart => "PKG003",
            ProblemKind::MissingRelationshipsPart => "REL001",
            ProblemKind::RelationshipMissingIdOrTarget => "REL002",
            ProblemKind::DanglingRelationship => "REL003",
            ProblemKind::DuplicateRelationshipId => "REL004",
            ProblemKind::OverrideTargetsMissingPart => "CT001",
            ProblemKind::OverrideMissingPartName => "CT002",
            ProblemKind::SheetMissingRelationshipReference => "WB001",
            ProblemKind::UnknownSheetRelationship => "WB002",
            ProblemKind::UnexpectedExternalSheetRelationship => "WB003",
            ProblemKind::SheetTargetPartMissing => "WB004",
            ProblemKind::MissingSheetList => "WB005",
            ProblemKind::EmptyFormulaTag => "WS001",
        }
    }
}

impl Problem {
    pub fn kind(&self) -> ProblemKind {
        match self {
            Problem::MissingRequiredPart { .. } => ProblemKind::MissingRequiredPart,
            Problem::MalformedXml { .. } => ProblemKind::MalformedXml,
            Problem::UnreadablePart { .. } => ProblemKind::UnreadablePart,
            Problem::MissingRelationshipsPart { .. } => ProblemKind::MissingRelationshipsPart,
            Problem::RelationshipMissingIdOrTarget { .. } => {
                ProblemKind::RelationshipMissingIdOrTarget
            }
            Problem::DanglingRelationship { .. } => ProblemKind::DanglingRelationship,
            Problem::DuplicateRelationshipId { .. } => ProblemKind::DuplicateRelationshipId,
            Problem::OverrideTargetsMissingPart { .. } => ProblemKind::OverrideTargetsMissingPart,
            Problem::OverrideMissingPartName => ProblemKind::OverrideMissingPartName,
            Problem::SheetMissingRelationshipReference { .. } => {
                ProblemKind::SheetMissingRelationshipReference
            }
            Problem::UnknownSheetRelationship { .. } => ProblemKind::UnknownSheetRelationship,
            Problem::UnexpectedExternalSheetRelationship { .. } => {
                ProblemKind::UnexpectedExternalSheetRelationship
            }
            Problem::SheetTargetPartMissing { .. } => ProblemKind::SheetTargetPartMissing,
            Problem::MissingSheetList { .. } => ProblemKind::MissingSheetList,
            Problem::EmptyFormulaTag { .. } => ProblemKind::EmptyFormulaTag,
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// The part in which the defect was observed, when there is one
    pub fn location(&self) -> Option<&str> {
        match self {
            Problem::MissingRequiredPart { .. } | Problem::MissingRelationshipsPart { .. } => None,
            Problem::MalformedXml { part, .. }
            | Problem::UnreadablePart { part, .. }
            | Problem::EmptyFormulaTag { part, .. } => Some(part),
            Problem::RelationshipMissingIdOrTarget { rels_part }
            | Problem::DanglingRelationship { rels_part, .. }
            | Problem::DuplicateRelationshipId { rels_part, .. } => Some(rels_part),
            Problem::OverrideTargetsMissingPart { .. } | Problem::OverrideMissingPartName => {
                Some(CONTENT_TYPES_PART)
            }
            Problem::SheetMissingRelationshipReference { workbook, .. }
            | Problem::UnknownSheetRelationship { workbook, .. }
            | Problem::UnexpectedExternalSheetRelationship { workbook, .. }
            | Problem::SheetTargetPartMissing { workbook, .. }
            | Problem::MissingSheetList { workbook } => Some(workbook),
        }
    }

    /// The element the defect is attached to (relationship id, sheet, cell)
    pub fn element(&self) -> Option<&str> {
        match self {
            Problem::DanglingRelationship { id, .. }
            | Problem::DuplicateRelationshipId { id, .. } => Some(id),
            Problem::SheetMissingRelationshipReference { sheet, .. }
            | Problem::UnknownSheetRelationship { sheet, .. }
            | Problem::UnexpectedExternalSheetRelationship { sheet, .. }
            | Problem::SheetTargetPartMissing { sheet, .. } => Some(sheet),
            Problem::EmptyFormulaTag { cell, .. } => Some(cell),
            _ => None,
        }
    }

    /// Human-readable description, without the location prefix
    pub fn message(&self) -> String {
        match self {
            Problem::MissingRequiredPart { part } => format!("Missing required part: {}", part),
            Problem::MalformedXml { message, .. } => format!("XML parse error: {}", message),
            Problem::UnreadablePart { message, .. } => {
                format!("Part data could not be read: {}", message)
            }
            Problem::MissingRelationshipsPart { rels_part } => {
                format!("Missing relationships part: {}", rels_part)
            }
            Problem::RelationshipMissingIdOrTarget { .. } => {
                "Relationship missing Id/Target".to_string()
            }
            Problem::DanglingRelationship {
                id,
                target,
                rel_type,
                ..
            } => format!(
                "Relationship {} -> missing part '{}' (Type={})",
                id,
                target,
                rel_type.as_deref().unwrap_or("None")
            ),
            Problem::DuplicateRelationshipId { id, .. } => {
                format!("Relationship Id '{}' is declared more than once", id)
            }
            Problem::OverrideTargetsMissingPart { part_name } => {
                format!("Override references missing part '{}'", part_name)
            }
            Problem::OverrideMissingPartName => "Override element has no PartName".to_string(),
            Problem::SheetMissingRelationshipReference { sheet, .. } => {
                format!("sheet '{}' has no relationship id", sheet)
            }
            Problem::UnknownSheetRelationship { sheet, id, .. } => {
                format!("sheet '{}' references unknown relationship '{}'", sheet, id)
            }
            Problem::UnexpectedExternalSheetRelationship { sheet, id, .. } => format!(
                "sheet '{}' relationship '{}' is External (unexpected)",
                sheet, id
            ),
            Problem::SheetTargetPartMissing { sheet, target, .. } => {
                format!("sheet '{}' target part missing: '{}'", sheet, target)
            }
            Problem::MissingSheetList { .. } => "Missing <sheets> element".to_string(),
            Problem::EmptyFormulaTag { cell, .. } => format!("empty formula tag at cell {}", cell),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location() {
            Some(location) => write!(f, "{}: {}", location, self.message()),
            None => write!(f, "{}", self.message()),
        }
    }
}
