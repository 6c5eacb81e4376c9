//! Output formatters for validation reports

use anyhow::Result;
use colored::*;
use sheetdoctor_core::{CellTypeReport, ProblemKind, Report};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;

/// Print the report in human-readable format
pub fn print_human(file_path: &Path, report: &Report) -> Result<()> {
    let stdout = io::stdout();
    write_human(&mut stdout.lock(), file_path, report)?;
    Ok(())
}

/// Render the report as a summary line followed by one line per problem,
/// in the order the checks produced them
fn write_human(out: &mut impl Write, file_path: &Path, report: &Report) -> io::Result<()> {
    writeln!(out, "{}", format!("Checking: {}", file_path.display()).bold())?;
    writeln!(out)?;

    if report.is_structurally_sound() {
        return writeln!(
            out,
            "{}",
            "✓ No packaging issues detected. The package looks structurally sound."
                .green()
                .bold()
        );
    }

    writeln!(
        out,
        "{}",
        format!("Potential issues detected ({}):", report.len())
            .red()
            .bold()
    )?;
    for problem in report.problems() {
        writeln!(out, " - [{}] {}", problem.code().bright_black(), problem)?;
    }

    writeln!(out)?;
    writeln!(out, "{}", "Summary:".bold().underline())?;
    for (code, count) in summary(report) {
        writeln!(out, "  {} {}", format!("{}:", code).yellow(), count)?;
    }
    Ok(())
}

/// Problem count per code, in code order, for codes that occurred
fn summary(report: &Report) -> BTreeMap<&'static str, usize> {
    ProblemKind::ALL
        .iter()
        .map(|kind| (kind.code(), report.count(*kind)))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Print the report in JSON format
pub fn print_json(file_path: &Path, report: &Report) -> Result<()> {
    let problems: Vec<serde_json::Value> = report
        .problems()
        .iter()
        .map(|problem| {
            serde_json::json!({
                "code": problem.code(),
                "details": problem,
                "location": problem.location(),
                "element": problem.element(),
                "message": problem.message(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "is_structurally_sound": report.is_structurally_sound(),
        "problems": problems,
        "summary": {
            "total": report.len(),
            "by_code": summary(report),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print the cell storage listing, one block per worksheet
pub fn print_cell_types(file_path: &Path, reports: &[CellTypeReport]) {
    println!("{}", format!("Cell types: {}", file_path.display()).bold());

    let mut current_part: Option<&str> = None;
    for report in reports {
        if current_part != Some(report.part.as_str()) {
            println!();
            println!("{} {}", "Checking".bold(), report.part.cyan().bold());
            current_part = Some(report.part.as_str());
        }
        println!("  {}", report);
    }
}

/// Print the cell storage listing in JSON format
pub fn print_cell_types_json(file_path: &Path, reports: &[CellTypeReport]) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "cells": reports,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
