//! Workbook sheet list cross-checked against the workbook relationships

use crate::namespaces::{
    DEFAULT_WORKBOOK_PART, OFFICE_RELATIONSHIPS, OFFICE_RELATIONSHIPS_STRICT,
    REL_TYPE_OFFICE_DOCUMENT, REL_TYPE_OFFICE_DOCUMENT_STRICT, SPREADSHEETML,
    SPREADSHEETML_STRICT,
};
use crate::package::Package;
use crate::problem::Problem;
use crate::relationships::{RelationshipTable, TargetMode};
use crate::xml::load_xml;
use tracing::debug;

const SHEET_NAMESPACES: &[&str] = &[SPREADSHEETML, SPREADSHEETML_STRICT];
const REL_ID_NAMESPACES: &[&str] = &[OFFICE_RELATIONSHIPS, OFFICE_RELATIONSHIPS_STRICT];

/// A `<sheet>` entry of the workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub relationship_id: Option<String>,
}

/// Find the primary workbook part.
///
/// Uses the internal target of the package's `officeDocument` relationship,
/// falling back to `xl/workbook.xml` when the root table declares none.
pub fn locate_workbook(root_rels: &RelationshipTable) -> String {
    root_rels
        .find_by_type(&[REL_TYPE_OFFICE_DOCUMENT, REL_TYPE_OFFICE_DOCUMENT_STRICT])
        .filter(|rel| rel.mode == TargetMode::Internal)
        .and_then(|rel| rel.resolved.clone())
        .unwrap_or_else(|| DEFAULT_WORKBOOK_PART.to_string())
}

/// Check every sheet of the workbook resolves to an internal, existing part.
///
/// A sheet pointing at a missing part is reported here even though the
/// relationship resolver already flagged the dangling relationship: this is
/// the sheet-level symptom, the other is the cause.
pub fn check_workbook_sheets(
    package: &Package,
    workbook_part: &str,
    workbook_rels: &RelationshipTable,
) -> Vec<Problem> {
    let mut problems = Vec::new();

    let document = match load_xml(package, workbook_part) {
        Ok(Some(document)) => document,
        Ok(None) => {
            problems.push(Problem::MissingRequiredPart {
                part: workbook_part.to_string(),
            });
            return problems;
        }
        Err(problem) => {
            problems.push(problem);
            return problems;
        }
    };

    let Some(sheet_list) = document.root().child(SHEET_NAMESPACES, "sheets") else {
        problems.push(Problem::MissingSheetList {
            workbook: workbook_part.to_string(),
        });
        return problems;
    };

    let sheets: Vec<Sheet> = sheet_list
        .children_named(SHEET_NAMESPACES, "sheet")
        .map(|element| Sheet {
            name: element.attribute("name").unwrap_or("?").to_string(),
            relationship_id: element
                .attribute_ns(REL_ID_NAMESPACES, "id")
                .map(str::to_string),
        })
        .collect();

    for sheet in &sheets {
        if let Some(problem) = check_sheet(package, workbook_part, workbook_rels, sheet) {
            problems.push(problem);
        }
    }

    debug!(
        workbook = workbook_part,
        sheets = sheets.len(),
        problems = problems.len(),
        "checked workbook sheets"
    );
    problems
}

fn check_sheet(
    package: &Package,
    workbook_part: &str,
    workbook_rels: &RelationshipTable,
    sheet: &Sheet,
) -> Option<Problem> {
    let workbook = workbook_part.to_string();
    let name = sheet.name.clone();

    let Some(id) = &sheet.relationship_id else {
        return Some(Problem::SheetMissingRelationshipReference {
            workbook,
            sheet: name,
        });
    };

    let Some(relationship) = workbook_rels.get(id) else {
        return Some(Problem::UnknownSheetRelationship {
            workbook,
            sheet: name,
            id: id.clone(),
        });
    };

    match (&relationship.mode, &relationship.resolved) {
        (TargetMode::External, _) => Some(Problem::UnexpectedExternalSheetRelationship {
            workbook,
            sheet: name,
            id: id.clone(),
        }),
        (TargetMode::Internal, Some(target)) if !package.has_part(target) => {
            Some(Problem::SheetTargetPartMissing {
                workbook,
                sheet: name,
                target: target.clone(),
            })
        }
        _ => None,
    }
}
