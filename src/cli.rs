use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap_complete::Shell;

use crate::color::Rgb;
use crate::config::Settings;
use crate::handler::{
    handle_make_default_config, handle_pick, handle_print_completions, handle_print_man,
    handle_print_schema, handle_smoke,
};
use crate::logging;
use crate::params::PickerParams;

#[derive(Parser, Default, Debug)]
#[clap(author = "eyedrop developers", version)]
/// eyedrop is a colour picker that magnifies a captured screen in your terminal.
///
/// Move the cursor with the arrow keys or h/j/k/l (hold Shift to move faster), press Enter, Space or click to pick, Esc to cancel. The picked colour is printed to stdout as #RRGGBB.
pub struct Arguments {
    #[clap(short, long, value_name = "#RRGGBB")]
    /// Colour being replaced. Reported before any sampling and shown next to the current colour.
    pub previous_color: Option<Rgb>,

    #[clap(short, long)]
    /// Number of cells per side of the magnifier grid. Must be odd.
    pub grid_size: Option<usize>,

    #[clap(short, long, value_name = "PATH")]
    /// Screenshot to pick from, overriding `capture_file` from the config.
    pub capture: Option<PathBuf>,

    #[clap(short, long)]
    /// Print every picker event to stdout as a JSON line.
    pub json: bool,

    #[clap(long, value_name = "SCRIPT")]
    /// Run without a terminal UI, replaying the given key words (e.g. "right right down enter").
    pub keys: Option<String>,

    #[clap(long)]
    /// Wire the picker to an event emitter that prints each event, using #112233 and a 3x3 grid unless overridden.
    pub smoke: bool,

    #[clap(long)]
    /// Print the JSON schema of the configuration file.
    pub print_schema: bool,

    #[clap(long, value_name = "DIR")]
    /// Write a starter configuration file and its schema, to DIR or the XDG config dir.
    pub make_default_config: Option<Option<PathBuf>>,

    #[clap(long, value_name = "SHELL")]
    /// Print shell completions.
    pub print_completions: Option<Shell>,

    #[clap(long)]
    /// Print a man page.
    pub print_man: bool,
}

impl Arguments {
    /// Applies the command line overrides on top of `defaults`.
    pub fn params(&self, defaults: PickerParams) -> PickerParams {
        PickerParams {
            previous_color: self.previous_color.unwrap_or(defaults.previous_color),
            grid_size: self.grid_size.unwrap_or(defaults.grid_size),
        }
    }
}

/// Parses the command line arguments and runs the program. Called from `main.rs`.
pub fn parse() -> Result<()> {
    let args = Arguments::parse();

    if let Some(shell) = args.print_completions {
        return handle_print_completions(shell);
    }
    if args.print_man {
        return handle_print_man();
    }
    if args.print_schema {
        return handle_print_schema();
    }
    if let Some(dir) = &args.make_default_config {
        return handle_make_default_config(dir.as_deref());
    }

    let mut settings = Settings::load()?;
    let log_file = logging::init(settings.log_level)?;
    log::info!("Logging to {}", log_file.display());

    if let Some(path) = &args.capture {
        settings.capture_file = Some(path.clone());
    }

    if args.smoke {
        handle_smoke(&args, &settings)
    } else {
        handle_pick(&args, &settings)
    }
}
