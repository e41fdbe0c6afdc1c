//! tasklist theme command.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::load_context;
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::theme::{self, Theme};

pub struct ThemeOptions {
    pub action: String,
    pub data_dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThemeOutput {
    theme: Theme,
    dark_mode: bool,
    changed: bool,
}

pub fn run(options: ThemeOptions) -> Result<()> {
    let ctx = load_context(options.data_dir)?;
    let key = ctx.config.storage.theme_key.clone();
    let mut store = ctx.store;

    let before = theme::load(&store, &key);
    let after = match options.action.trim().to_ascii_lowercase().as_str() {
        "show" => before,
        "toggle" => theme::toggle(&mut store, &key)?,
        "dark" | "light" => {
            let target: Theme = options.action.parse()?;
            theme::set(&mut store, &key, target)?;
            target
        }
        other => {
            return Err(Error::InvalidArgument(format!(
                "invalid theme action '{other}' (expected show|toggle|dark|light)"
            )))
        }
    };

    let mut human = HumanOutput::new("Theme");
    human.push_summary("Current", after.to_string());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "theme",
        &ThemeOutput {
            theme: after,
            dark_mode: after.is_dark(),
            changed: after != before,
        },
        Some(&human),
    )
}
