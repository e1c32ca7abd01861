use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, crate_name};
use clap_complete::{Shell, generate};

use crate::{
    cli::Arguments,
    config::{RawSettings, Settings},
    events::{PickOutcome, PickerEvent},
    params::PickerParams,
    picker::{init_with, open_source},
    smoke,
    ui::{ScriptedFrontend, Tui},
};

pub fn handle_print_completions(shell: Shell) -> Result<()> {
    let mut cmd = Arguments::command();
    generate(shell, &mut cmd, crate_name!(), &mut io::stdout());
    Ok(())
}

pub fn handle_print_man() -> Result<()> {
    let man = clap_mangen::Man::new(Arguments::command());
    man.render(&mut io::stdout())?;
    Ok(())
}

pub fn handle_print_schema() -> Result<()> {
    println!("{}", RawSettings::schema()?);
    Ok(())
}

/// Writes `eyedrop.yaml` and `eyedrop.schema.json` into `dir`, or the XDG config
/// dir when `dir` is `None`. Refuses to overwrite existing files.
pub fn handle_make_default_config(dir: Option<&Path>) -> Result<()> {
    let (config_path, schema_path) = default_config_paths(dir)?;

    if config_path.exists() || schema_path.exists() {
        anyhow::bail!(format!(
            "Configuration files already exist. Please move or rename any existing files:
- {}
- {}
before running this command again.",
            config_path.display(),
            schema_path.display()
        ));
    }

    // make sure parent directories exist
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&schema_path, RawSettings::schema()?)?;
    let schema_filename = schema_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::fs::write(
        &config_path,
        format!(
            "# yaml-language-server: $schema=./{}\n{}",
            schema_filename,
            RawSettings::default_yaml()?
        ),
    )?;
    println!("Wrote {}", config_path.display());
    Ok(())
}

fn default_config_paths(dir: Option<&Path>) -> Result<(PathBuf, PathBuf)> {
    let config_filename = format!("{}.yaml", crate_name!());
    let schema_filename = format!("{}.schema.json", crate_name!());
    Ok(match dir {
        Some(dir) => (dir.join(&config_filename), dir.join(&schema_filename)),
        None => {
            let base_dirs = xdg::BaseDirectories::with_prefix(crate_name!())?;
            (
                base_dirs.get_config_file(&config_filename),
                base_dirs.get_config_file(&schema_filename),
            )
        }
    })
}

/// Runs one picking session with the frontend the arguments ask for.
fn run_picker(
    args: &Arguments,
    settings: &Settings,
    emit: impl FnMut(PickerEvent),
    params: PickerParams,
) -> Result<PickOutcome> {
    let source = open_source(settings)?;
    match &args.keys {
        Some(script) => {
            let mut ui = ScriptedFrontend::from_script(script)?;
            init_with(&mut ui, source, emit, params, settings)
        }
        None => {
            let mut tui = Tui::start(settings.tick_rate())?;
            init_with(&mut tui, source, emit, params, settings)
        }
    }
}

fn print_json_event(event: &PickerEvent) {
    match serde_json::to_string(event) {
        Ok(line) => {
            let mut stdout = io::stdout().lock();
            if let Err(e) = writeln!(stdout, "{line}").and_then(|_| stdout.flush()) {
                log::warn!("Failed to write event: {e}");
            }
        }
        Err(e) => log::warn!("Failed to serialize event {event:?}: {e}"),
    }
}

pub fn handle_pick(args: &Arguments, settings: &Settings) -> Result<()> {
    let params = args.params(PickerParams {
        grid_size: settings.grid_size,
        ..PickerParams::default()
    });
    let json = args.json;
    let outcome = run_picker(
        args,
        settings,
        |event| {
            log::debug!("Picker event: {event:?}");
            if json {
                print_json_event(&event);
            }
        },
        params,
    )
    .with_context(|| "Picker failed")?;

    match outcome {
        PickOutcome::Picked(color) => {
            if !json {
                println!("{color}");
            }
            Ok(())
        }
        PickOutcome::Cancelled(color) => {
            eprintln!("{color}");
            anyhow::bail!("Picker cancelled")
        }
    }
}

pub fn handle_smoke(args: &Arguments, settings: &Settings) -> Result<()> {
    let params = args.params(smoke::smoke_params());
    smoke::run(io::stdout(), params, |emit, params| {
        run_picker(args, settings, emit, params)
    })?;
    Ok(())
}
