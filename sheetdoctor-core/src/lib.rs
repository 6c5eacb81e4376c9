//! sheetdoctor-core: structural validation of OOXML spreadsheet packages
//!
//! Opens a zip-based office document, rebuilds its part and relationship
//! graph and reports every inconsistency that would make a consuming
//! application reject the file, even though the zip itself is fine.

pub mod config;
pub mod content_types;
pub mod error;
pub mod namespaces;
pub mod package;
pub mod problem;
pub mod relationships;
pub mod report;
pub mod workbook;
pub mod worksheets;
pub mod xml;

use std::path::Path;
use tracing::debug;

pub use config::ValidatorConfig;
pub use error::{Error, Result};
pub use package::Package;
pub use problem::{Problem, ProblemKind};
pub use report::{Phase, Report};
pub use worksheets::{CellTypeReport, StorageKind};

/// Main validator interface
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    /// Create a new validator with default configuration
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    /// Create a new validator with custom configuration
    pub fn with_config(config: ValidatorConfig) -> Self {
        Self { config }
    }

    /// Open and validate the package at `path`.
    ///
    /// Fails only when the archive cannot be opened; every other defect is
    /// part of the returned report.
    pub fn validate_file<P: AsRef<Path>>(&self, path: P) -> Result<Report> {
        let package = Package::open(path)?;
        Ok(self.validate_package(&package))
    }

    /// Validate an already opened package
    pub fn validate_package(&self, package: &Package) -> Report {
        let mut report = Report::new();

        self.record(
            &mut report,
            Phase::ContentTypes,
            content_types::check_content_types(package),
        );

        let (root_rels, problems) =
            relationships::resolve_relationships(package, namespaces::ROOT_RELS_PART);
        self.record(&mut report, Phase::RootRelationships, problems);

        let workbook_part = workbook::locate_workbook(&root_rels);
        let (workbook_rels, problems) = relationships::resolve_relationships(
            package,
            &relationships::rels_part_for(&workbook_part),
        );
        self.record(&mut report, Phase::WorkbookRelationships, problems);

        self.record(
            &mut report,
            Phase::WorkbookSheets,
            workbook::check_workbook_sheets(package, &workbook_part, &workbook_rels),
        );

        let worksheet_parts = worksheets::worksheet_parts(package, &workbook_part);

        if self.config.worksheet_relationships {
            let problems = worksheet_parts
                .iter()
                .map(|part| relationships::rels_part_for(part))
                .filter(|rels_part| package.has_part(rels_part))
                .flat_map(|rels_part| relationships::resolve_relationships(package, &rels_part).1)
                .collect();
            self.record(&mut report, Phase::WorksheetRelationships, problems);
        }

        if self.config.formulas {
            self.record(
                &mut report,
                Phase::WorksheetFormulas,
                worksheets::scan_worksheets(package, &workbook_part),
            );
        }

        debug!(
            problems = report.len(),
            sound = report.is_structurally_sound(),
            "validation finished"
        );
        report
    }

    /// List every worksheet cell with its storage kind (informational only)
    pub fn describe_cell_types(&self, package: &Package) -> Vec<CellTypeReport> {
        let (root_rels, _) =
            relationships::resolve_relationships(package, namespaces::ROOT_RELS_PART);
        let workbook_part = workbook::locate_workbook(&root_rels);
        worksheets::describe_cell_types(package, &workbook_part)
    }

    fn record(&self, report: &mut Report, phase: Phase, problems: Vec<Problem>) {
        let found = problems.len();
        let kept: Vec<Problem> = problems
            .into_iter()
            .filter(|p| self.config.is_check_enabled(p.code()))
            .collect();
        debug!(?phase, found, reported = kept.len(), "phase complete");
        report.extend(kept);
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate the package at `path` with the default configuration
pub fn validate<P: AsRef<Path>>(path: P) -> Result<Report> {
    Validator::new().validate_file(path)
}
