use sheetdoctor_core::Package;
use sheetdoctor_core::relationships::{TargetMode, rels_part_for, resolve_relationships};
use sheetdoctor_core::workbook::locate_workbook;
use sheetdoctor_core::worksheets::worksheet_parts;
use std::env;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.xlsx>", args[0]);
        std::process::exit(1);
    }

    let package = Package::open(&args[1])?;
    println!("File: {}", args[1]);
    println!("Parts: {}", package.len());

    let (root_rels, _) = resolve_relationships(&package, "_rels/.rels");
    let workbook = locate_workbook(&root_rels);

    let mut rels_parts = vec!["_rels/.rels".to_string(), rels_part_for(&workbook)];
    rels_parts.extend(
        worksheet_parts(&package, &workbook)
            .into_iter()
            .map(rels_part_for)
            .filter(|rels| package.has_part(rels)),
    );

    for rels_part in rels_parts {
        let (table, problems) = resolve_relationships(&package, &rels_part);
        println!("\n=== {} ===", rels_part);
        for rel in table.iter() {
            let exists = match (&rel.mode, &rel.resolved) {
                (TargetMode::External, _) => "external",
                (_, Some(path)) if package.has_part(path) => "ok",
                _ => "MISSING",
            };
            println!(
                "  {} -> {} [{}] {}",
                rel.id,
                rel.resolved.as_deref().unwrap_or(&rel.target),
                exists,
                rel.rel_type.as_deref().unwrap_or("")
            );
        }
        for problem in problems {
            println!("  ! {}", problem);
        }
    }

    Ok(())
}
