//! `[Content_Types].xml` override checks

use crate::namespaces::{CONTENT_TYPES, CONTENT_TYPES_PART};
use crate::package::Package;
use crate::problem::Problem;
use crate::xml::load_xml;
use tracing::debug;

/// Check every `Override` in the content-type table names an existing part.
///
/// `Default` (extension-based) entries are not checked: they may apply to
/// parts that do not exist.
pub fn check_content_types(package: &Package) -> Vec<Problem> {
    let mut problems = Vec::new();

    let document = match load_xml(package, CONTENT_TYPES_PART) {
        Ok(Some(document)) => document,
        Ok(None) => {
            problems.push(Problem::MissingRequiredPart {
                part: CONTENT_TYPES_PART.to_string(),
            });
            return problems;
        }
        Err(problem) => {
            problems.push(problem);
            return problems;
        }
    };

    let mut overrides = 0;
    for element in document.root().children_named(&[CONTENT_TYPES], "Override") {
        overrides += 1;
        let part_name = element
            .attribute("PartName")
            .map(|name| name.trim_start_matches('/'))
            .unwrap_or_default();

        if part_name.is_empty() {
            problems.push(Problem::OverrideMissingPartName);
        } else if !package.has_part(part_name) {
            problems.push(Problem::OverrideTargetsMissingPart {
                part_name: part_name.to_string(),
            });
        }
    }

    debug!(overrides, problems = problems.len(), "checked content types");
    problems
}
