use std::{fs, path::Path};

use anyhow::Context;
use ts_rs::TS;

fn generate_types_content() -> String {
    let decls = [
        db::entity::EntityRef::decl(),
        db::pagination::Pageable::decl(),
        db::models::region::Region::decl(),
        db::models::region::RegionPayload::decl(),
        db::models::country::Country::decl(),
        db::models::country::CountryWithRegion::decl(),
        db::models::country::CountryPayload::decl(),
        db::models::location::Location::decl(),
        db::models::location::LocationWithCountry::decl(),
        db::models::location::LocationPayload::decl(),
        db::models::department::Department::decl(),
        db::models::department::DepartmentWithLocation::decl(),
        db::models::department::DepartmentPayload::decl(),
        db::models::employee::Employee::decl(),
        db::models::employee::EmployeeWithRelations::decl(),
        db::models::employee::EmployeePayload::decl(),
        db::models::piece_of_work::PieceOfWork::decl(),
        db::models::piece_of_work::PieceOfWorkPayload::decl(),
        db::models::job::Job::decl(),
        db::models::job::JobWithRelations::decl(),
        db::models::job::JobPayload::decl(),
        db::models::job_history::JobHistory::decl(),
        db::models::job_history::JobHistoryWithRelations::decl(),
        db::models::job_history::JobHistoryPayload::decl(),
        server::error::ErrorDetails::decl(),
        utils::response::ApiResponse::<(), ()>::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|d| {
            let trimmed = d.trim_start();
            if trimmed.starts_with("export") {
                d
            } else {
                format!("export {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "// This file was generated by `cargo run --bin generate_types`.\n// Do not edit it by hand.\n\n{body}\n"
    )
}

fn main() -> anyhow::Result<()> {
    let check_mode = std::env::args().any(|arg| arg == "--check");
    let output = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../shared/types.ts");
    let generated = generate_types_content();

    if check_mode {
        let current = fs::read_to_string(&output)
            .with_context(|| format!("reading {}", output.display()))?;
        if current != generated {
            anyhow::bail!("shared/types.ts is out of date; run `cargo run --bin generate_types`");
        }
        println!("shared/types.ts is up to date.");
        return Ok(());
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, generated).with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}
