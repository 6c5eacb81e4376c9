//! Worksheet parts: empty formula detection and cell storage listing

use crate::namespaces::{SPREADSHEETML, SPREADSHEETML_STRICT};
use crate::package::Package;
use crate::problem::Problem;
use crate::xml::{XmlElement, load_xml};
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

const SHEET_NAMESPACES: &[&str] = &[SPREADSHEETML, SPREADSHEETML_STRICT];

/// Worksheet parts of the workbook at `workbook_part`, in sorted order.
///
/// Worksheets live under `<workbook dir>/worksheets/` and end in `.xml`;
/// their `.rels` parts are not included.
pub fn worksheet_parts<'a>(package: &'a Package, workbook_part: &str) -> Vec<&'a str> {
    let prefix = match workbook_part.rsplit_once('/') {
        Some((dir, _)) => format!("{}/worksheets/", dir),
        None => "worksheets/".to_string(),
    };
    package
        .part_names()
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".xml"))
        .collect()
}

/// Report every `<f>` element whose formula text is empty or blank.
pub fn scan_worksheets(package: &Package, workbook_part: &str) -> Vec<Problem> {
    let mut problems = Vec::new();

    for part in worksheet_parts(package, workbook_part) {
        match load_xml(package, part) {
            Ok(Some(document)) => {
                let before = problems.len();
                collect_empty_formulas(part, document.root(), None, &mut problems);
                debug!(
                    part,
                    empty_formulas = problems.len() - before,
                    "scanned worksheet"
                );
            }
            Ok(None) => {}
            Err(problem) => problems.push(problem),
        }
    }

    problems
}

fn collect_empty_formulas(
    part: &str,
    element: &XmlElement,
    cell: Option<&str>,
    problems: &mut Vec<Problem>,
) {
    if element.is(SHEET_NAMESPACES, "f") && element.text().trim().is_empty() {
        problems.push(Problem::EmptyFormulaTag {
            part: part.to_string(),
            cell: cell.unwrap_or("?").to_string(),
        });
    }

    let cell = if element.is(SHEET_NAMESPACES, "c") {
        element.attribute("r")
    } else {
        cell
    };
    for child in element.children() {
        collect_empty_formulas(part, child, cell, problems);
    }
}

/// How a cell's value is stored, according to its `t` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageKind {
    /// `t="str"`: formula string result stored inline
    Text,
    /// `t="s"`: index into the shared string table
    SharedString,
    /// Anything else; an absent `t` means numeric
    Number,
}

impl StorageKind {
    pub fn from_type_attribute(cell_type: Option<&str>) -> Self {
        match cell_type {
            Some("str") => StorageKind::Text,
            Some("s") => StorageKind::SharedString,
            _ => StorageKind::Number,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StorageKind::Text => "TEXT",
            StorageKind::SharedString => "SHARED STRING",
            StorageKind::Number => "NUMBER",
        }
    }
}

/// Informational description of one cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellTypeReport {
    pub part: String,
    pub reference: Option<String>,
    pub value: Option<String>,
    pub kind: StorageKind,
}

impl fmt::Display for CellTypeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reference = self.reference.as_deref().unwrap_or("?");
        let value = self.value.as_deref().unwrap_or("None");
        match self.kind {
            StorageKind::Number => {
                write!(f, "{}: {} (stored as {})", reference, value, self.kind.as_str())
            }
            _ => write!(
                f,
                "{}: '{}' (stored as {})",
                reference,
                value,
                self.kind.as_str()
            ),
        }
    }
}

/// List every cell of every worksheet with its stored value and storage kind.
///
/// Diagnostic aid only: worksheets that cannot be read are skipped.
pub fn describe_cell_types(package: &Package, workbook_part: &str) -> Vec<CellTypeReport> {
    let mut reports = Vec::new();

    for part in worksheet_parts(package, workbook_part) {
        let document = match load_xml(package, part) {
            Ok(Some(document)) => document,
            Ok(None) => continue,
            Err(problem) => {
                warn!(%problem, "skipping worksheet");
                continue;
            }
        };

        for cell in document
            .root()
            .descendants()
            .filter(|e| e.is(SHEET_NAMESPACES, "c"))
        {
            reports.push(CellTypeReport {
                part: part.to_string(),
                reference: cell.attribute("r").map(str::to_string),
                value: cell
                    .child(SHEET_NAMESPACES, "v")
                    .map(|v| v.text().to_string()),
                kind: StorageKind::from_type_attribute(cell.attribute("t")),
            });
        }
    }

    reports
}
