use std::{fs, path::PathBuf};

use db::models::{
    idea::Idea,
    project_task::{CreateProjectTask, ProjectTask, TaskPriority, TaskStatus, UpdateProjectTask},
    project_timeline::{
        CreateProjectTimeline, PhaseStatus, ProjectTimeline, UpdateProjectTimeline,
    },
};
use server::routes::{
    project_tasks::{TaskResponse, TasksResponse},
    timeline::{PhaseResponse, PhasesResponse},
};
use ts_rs::TS;
use utils::response::{ErrorResponse, SuccessResponse};

fn generate_types_content() -> String {
    let header = "// This file was generated by `cargo run --bin generate_types`. Do not edit.\n\n";
    let decls = [
        Idea::decl(),
        PhaseStatus::decl(),
        ProjectTimeline::decl(),
        CreateProjectTimeline::decl(),
        UpdateProjectTimeline::decl(),
        TaskStatus::decl(),
        TaskPriority::decl(),
        ProjectTask::decl(),
        CreateProjectTask::decl(),
        UpdateProjectTask::decl(),
        PhaseResponse::decl(),
        PhasesResponse::decl(),
        TaskResponse::decl(),
        TasksResponse::decl(),
        ErrorResponse::decl(),
        SuccessResponse::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|d| format!("export {}", d.trim_start_matches("export ")))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("{header}{body}\n")
}

fn main() -> anyhow::Result<()> {
    let out_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../shared");
    fs::create_dir_all(&out_dir)?;
    let path = out_dir.join("types.ts");
    fs::write(&path, generate_types_content())?;
    println!("Wrote {}", path.display());
    Ok(())
}
