#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use mapty::cli::{self, Cmd};
use mapty::controller::App;
use mapty::error::Error;
use mapty::snapshot::SqliteStore;
use mapty::terminal::{self, TerminalMap, TerminalPresenter};
use mapty::types::WorkoutKind;
use mapty::utils;

#[macro_use]
extern crate mapty;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = cli.config();
    let storage = SqliteStore::open(&config.db_path)?;
    dlog!(
        "db={} key={} zoom={}",
        config.db_path.display(),
        config.storage_key,
        config.zoom_level
    );

    let echo_rows = matches!(cli.cmd, Cmd::List | Cmd::Add { .. });
    let mut app = App::start(config, TerminalMap, TerminalPresenter::new(echo_rows), storage);

    let home = match &cli.cmd {
        Cmd::Add { workout } => cli.home.or(Some(workout.location())),
        _ => cli.home,
    };
    if let Some(home) = home {
        app.on_location(Ok(home))?;
    } else {
        dlog!("no home location given; map stays unloaded");
    }

    match cli.cmd {
        Cmd::List => {
            if app.store().is_empty() {
                println!("No workouts logged yet.");
            }
        }
        Cmd::Add { workout } => {
            app.on_map_clicked(workout.location())?;
            let form = workout.form();
            // The form opens on running; picking cycling swaps the extra field.
            if form.kind == WorkoutKind::Cycling {
                app.on_type_changed()?;
            }
            let id = app
                .on_form_submitted(form)
                .with_context(|| format!("logging {} workout", form.kind))?;
            tracing::info!(id = %id, "saved");
        }
        Cmd::Show { id } => match app.on_list_item_selected(&id) {
            Ok(at) if !app.map_ready() => println!("{}", terminal::unloaded_focus_notice(&id, at)),
            Ok(_) => {}
            Err(Error::NotFound(_)) => tracing::warn!(id = %id, "no workout with this id"),
            Err(e) => return Err(e.into()),
        },
        Cmd::Reset => app.on_reset()?,
    }

    Ok(())
}
