use sheetdoctor_core::{
    Error, Package, Problem, ProblemKind, StorageKind, Validator, ValidatorConfig, validate,
};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = "[Content_Types].xml";
const ROOT_RELS: &str = "_rels/.rels";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHEET1: &str = "xl/worksheets/sheet1.xml";

/// Parts of a minimal, structurally sound workbook with one sheet
fn minimal_parts() -> BTreeMap<String, String> {
    let mut parts = BTreeMap::new();
    parts.insert(
        CONTENT_TYPES.to_string(),
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#
            .to_string(),
    );
    parts.insert(
        ROOT_RELS.to_string(),
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
            .to_string(),
    );
    parts.insert(
        WORKBOOK.to_string(),
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#
            .to_string(),
    );
    parts.insert(WORKBOOK_RELS.to_string(), workbook_rels("worksheets/sheet1.xml"));
    parts.insert(
        SHEET1.to_string(),
        worksheet(r#"<row r="1"><c r="A1"><v>1</v></c></row>"#),
    );
    parts
}

fn workbook_rels(sheet_target: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="{}"/>
</Relationships>"#,
        sheet_target
    )
}

fn worksheet(sheet_data: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        sheet_data
    )
}

// Helper to write a package to disk for testing
fn write_package(dir: &Path, name: &str, parts: &BTreeMap<String, String>) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    let file = File::create(&path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (part, content) in parts {
        zip.start_file(part.as_str(), options)?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()?;
    Ok(path)
}

fn kinds(problems: &[Problem]) -> Vec<ProblemKind> {
    problems.iter().map(|p| p.kind()).collect()
}

#[test]
fn test_scenario_a_minimal_package_is_sound() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_package(dir.path(), "minimal.xlsx", &minimal_parts())?;

    let report = validate(&path)?;

    assert!(report.is_structurally_sound(), "unexpected problems:\n{}", report);
    assert!(report.problems().is_empty());
    Ok(())
}

#[test]
fn test_scenario_b_sheet_points_at_missing_part() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parts = minimal_parts();
    parts.insert(WORKBOOK_RELS.to_string(), workbook_rels("worksheets/sheet2.xml"));
    let path = write_package(dir.path(), "dangling.xlsx", &parts)?;

    let report = validate(&path)?;

    assert_eq!(
        report.problems(),
        &[
            Problem::DanglingRelationship {
                rels_part: WORKBOOK_RELS.to_string(),
                id: "rId1".to_string(),
                target: "xl/worksheets/sheet2.xml".to_string(),
                rel_type: Some(
                    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet"
                        .to_string()
                ),
            },
            Problem::SheetTargetPartMissing {
                workbook: WORKBOOK.to_string(),
                sheet: "Sheet1".to_string(),
                target: "xl/worksheets/sheet2.xml".to_string(),
            },
        ]
    );
    Ok(())
}

#[test]
fn test_scenario_c_empty_formula() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parts = minimal_parts();
    parts.insert(
        SHEET1.to_string(),
        worksheet(
            r#"<row r="1"><c r="A1"><f>1+1</f><v>2</v></c></row><row r="2"><c r="B2"><f></f><v>0</v></c></row>"#,
        ),
    );
    let path = write_package(dir.path(), "formula.xlsx", &parts)?;

    let report = validate(&path)?;

    assert_eq!(
        report.problems(),
        &[Problem::EmptyFormulaTag {
            part: SHEET1.to_string(),
            cell: "B2".to_string(),
        }]
    );
    Ok(())
}

#[test]
fn test_scenario_d_corrupted_archive() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("corrupt.xlsx");
    std::fs::write(&path, b"PK\x03\x04 this is not really a zip archive")?;

    match validate(&path) {
        Err(Error::ArchiveOpen { path: reported, .. }) => assert_eq!(reported, path),
        Ok(report) => panic!("expected ArchiveOpen error, got report:\n{}", report),
        Err(other) => panic!("expected ArchiveOpen error, got {}", other),
    }
    Ok(())
}

#[test]
fn test_missing_file_is_archive_open_error() {
    let result = validate("does/not/exist.xlsx");
    assert!(matches!(result, Err(Error::ArchiveOpen { .. })));
}

#[test]
fn test_missing_content_types_reported_once() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parts = minimal_parts();
    parts.remove(CONTENT_TYPES);
    let path = write_package(dir.path(), "no_ct.xlsx", &parts)?;

    let report = validate(&path)?;

    assert_eq!(
        report.problems(),
        &[Problem::MissingRequiredPart {
            part: CONTENT_TYPES.to_string()
        }]
    );
    Ok(())
}

#[test]
fn test_dangling_overrides_counted_exactly() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parts = minimal_parts();
    parts.insert(
        CONTENT_TYPES.to_string(),
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Override PartName="/xl/workbook.xml" ContentType="a"/>
<Override PartName="/xl/styles.xml" ContentType="b"/>
<Override PartName="/xl/theme/theme1.xml" ContentType="c"/>
<Override PartName="xl/sharedStrings.xml" ContentType="d"/>
</Types>"#
            .to_string(),
    );
    let path = write_package(dir.path(), "overrides.xlsx", &parts)?;

    let report = validate(&path)?;

    assert_eq!(report.count(ProblemKind::OverrideTargetsMissingPart), 3);
    assert_eq!(report.len(), 3);
    Ok(())
}

#[test]
fn test_external_relationships_never_dangle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parts = minimal_parts();
    parts.insert(
        "xl/worksheets/_rels/sheet1.xml.rels".to_string(),
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/report" TargetMode="External"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="../media/missing.png" TargetMode="External"/>
</Relationships>"#
            .to_string(),
    );
    let path = write_package(dir.path(), "external.xlsx", &parts)?;

    let report = validate(&path)?;

    assert_eq!(report.count(ProblemKind::DanglingRelationship), 0);
    assert!(report.is_structurally_sound());
    Ok(())
}

#[test]
fn test_worksheet_relationships_resolved_relative_to_worksheet() -> anyhow::Result<()> {
    let mut parts = minimal_parts();
    parts.insert(
        "xl/worksheets/_rels/sheet1.xml.rels".to_string(),
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
</Relationships>"#
            .to_string(),
    );
    parts.insert("xl/media/image1.png".to_string(), "png".to_string());
    let package = Package::from_parts(parts);

    let report = Validator::new().validate_package(&package);

    assert_eq!(
        report.problems(),
        &[Problem::DanglingRelationship {
            rels_part: "xl/worksheets/_rels/sheet1.xml.rels".to_string(),
            id: "rId1".to_string(),
            target: "xl/drawings/drawing1.xml".to_string(),
            rel_type: Some(
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing"
                    .to_string()
            ),
        }]
    );
    Ok(())
}

#[test]
fn test_unknown_sheet_relationship_only() {
    let mut parts = minimal_parts();
    parts.insert(
        WORKBOOK.to_string(),
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/><sheet name="Ghost" sheetId="2" r:id="rId7"/></sheets>
</workbook>"#
            .to_string(),
    );
    let package = Package::from_parts(parts);

    let report = Validator::new().validate_package(&package);

    assert_eq!(
        kinds(report.problems()),
        vec![ProblemKind::UnknownSheetRelationship]
    );
    assert_eq!(report.count(ProblemKind::SheetTargetPartMissing), 0);
}

#[test]
fn test_malformed_part_does_not_stop_other_checks() {
    let mut parts = minimal_parts();
    parts.insert(WORKBOOK.to_string(), "<workbook><sheets></workbook>".to_string());
    parts.insert(
        SHEET1.to_string(),
        worksheet(r#"<row r="3"><c r="C3"><f> </f></c></row>"#),
    );
    parts.remove(CONTENT_TYPES);
    let package = Package::from_parts(parts);

    let report = Validator::new().validate_package(&package);

    assert_eq!(
        kinds(report.problems()),
        vec![
            ProblemKind::MissingRequiredPart,
            ProblemKind::MalformedXml,
            ProblemKind::EmptyFormulaTag,
        ]
    );
}

#[test]
fn test_problems_follow_phase_order() {
    let mut parts = minimal_parts();
    parts.remove(ROOT_RELS);
    parts.insert(WORKBOOK_RELS.to_string(), workbook_rels("worksheets/sheet9.xml"));
    parts.insert(
        CONTENT_TYPES.to_string(),
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/docProps/core.xml" ContentType="x"/></Types>"#
            .to_string(),
    );
    parts.insert(SHEET1.to_string(), worksheet(r#"<row r="1"><c r="A1"><f/></c></row>"#));
    let package = Package::from_parts(parts);

    let report = Validator::new().validate_package(&package);

    assert_eq!(
        kinds(report.problems()),
        vec![
            ProblemKind::OverrideTargetsMissingPart,
            ProblemKind::MissingRelationshipsPart,
            ProblemKind::DanglingRelationship,
            ProblemKind::SheetTargetPartMissing,
            ProblemKind::EmptyFormulaTag,
        ]
    );
}

#[test]
fn test_disabled_checks_are_filtered() {
    let mut parts = minimal_parts();
    parts.insert(WORKBOOK_RELS.to_string(), workbook_rels("worksheets/sheet2.xml"));
    let package = Package::from_parts(parts);

    let mut config = ValidatorConfig::default();
    config.disabled_checks.insert("REL".to_string());
    let report = Validator::with_config(config).validate_package(&package);

    assert_eq!(
        kinds(report.problems()),
        vec![ProblemKind::SheetTargetPartMissing]
    );
}

#[test]
fn test_formula_scan_can_be_disabled() {
    let mut parts = minimal_parts();
    parts.insert(SHEET1.to_string(), worksheet(r#"<row r="1"><c r="A1"><f/></c></row>"#));
    let package = Package::from_parts(parts);

    let config = ValidatorConfig {
        formulas: false,
        ..Default::default()
    };
    let report = Validator::with_config(config).validate_package(&package);

    assert!(report.is_structurally_sound());
}

#[test]
fn test_describe_cell_types_end_to_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parts = minimal_parts();
    parts.insert(
        SHEET1.to_string(),
        worksheet(r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>3.5</v></c><c r="C1" t="str"><f>A1</f><v>x</v></c></row>"#),
    );
    let path = write_package(dir.path(), "cells.xlsx", &parts)?;
    let package = Package::open(&path)?;

    let reports = Validator::new().describe_cell_types(&package);

    let summary: Vec<(Option<&str>, StorageKind)> = reports
        .iter()
        .map(|r| (r.reference.as_deref(), r.kind))
        .collect();
    assert_eq!(
        summary,
        vec![
            (Some("A1"), StorageKind::SharedString),
            (Some("B1"), StorageKind::Number),
            (Some("C1"), StorageKind::Text),
        ]
    );
    Ok(())
}

#[test]
fn test_corrupted_part_is_unreadable_and_checks_continue() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let mut parts = minimal_parts();
    parts.remove(ROOT_RELS);
    let rows: String = (1..=200)
        .map(|r| format!(r#"<row r="{r}"><c r="A{r}"><v>{}</v></c></row>"#, r * 7919 % 1013))
        .collect();
    parts.insert(SHEET1.to_string(), worksheet(&rows));
    let path = write_package(dir.path(), "damaged.xlsx", &parts)?;

    // Flip bytes in the middle of sheet1's compressed data
    let (start, size) = {
        let mut archive = zip::ZipArchive::new(File::open(&path)?)?;
        let entry = archive.by_name(SHEET1)?;
        (entry.data_start() as usize, entry.compressed_size() as usize)
    };
    assert!(size > 40);
    let mut bytes = std::fs::read(&path)?;
    for byte in &mut bytes[start + size / 2 - 10..start + size / 2 + 10] {
        *byte ^= 0xA5;
    }
    std::fs::write(&path, &bytes)?;

    let report = validate(&path)?;

    assert_eq!(
        kinds(report.problems()),
        vec![
            ProblemKind::MissingRelationshipsPart,
            ProblemKind::UnreadablePart,
        ]
    );
    assert!(matches!(
        &report.problems()[1],
        Problem::UnreadablePart { part, .. } if part == SHEET1
    ));
    Ok(())
}
