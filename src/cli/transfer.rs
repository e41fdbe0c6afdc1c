//! tasklist export/import commands.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::load_context;
use crate::error::Result;
use crate::manager::ImportReport;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::transfer;

pub struct ExportOptions {
    pub output: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ImportOptions {
    pub path: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ExportOutput {
    path: PathBuf,
    count: usize,
    version: &'static str,
}

#[derive(Serialize)]
struct ImportOutput {
    path: PathBuf,
    #[serde(flatten)]
    report: ImportReport,
    total: usize,
}

pub fn run_export(options: ExportOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let (manager, config) = ctx.into_manager();
    let cwd = std::env::current_dir()?;
    let path = transfer::write_export(
        manager.tasks(),
        options.output.as_deref(),
        &cwd,
        &config.export.file_prefix,
    )?;
    let count = manager.tasks().len();

    let mut human = HumanOutput::new("Tasks exported");
    human.push_summary("File", path.display().to_string());
    human.push_summary("Tasks", count.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "export",
        &ExportOutput {
            path,
            count,
            version: transfer::EXPORT_VERSION,
        },
        Some(&human),
    )
}

pub fn run_import(options: ImportOptions) -> Result<()> {
    // Parse before opening the store so a bad file never touches it.
    let incoming = transfer::read_import(&options.path)?;
    let ctx = load_context(options.data_dir)?;
    let (mut manager, _) = ctx.into_manager();
    let report = manager.import(incoming)?;

    let mut human = HumanOutput::new("Tasks imported");
    human.push_summary("File", options.path.display().to_string());
    human.push_summary("Imported", report.imported.to_string());
    human.push_summary("Total", manager.tasks().len().to_string());
    if report.skipped > 0 {
        human.push_warning(format!(
            "skipped {} task(s) with invalid text",
            report.skipped
        ));
    }

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "import",
        &ImportOutput {
            path: options.path.clone(),
            total: manager.tasks().len(),
            report,
        },
        Some(&human),
    )
}
