use crate::config::{Config, DEFAULT_DB_PATH, DEFAULT_STORAGE_KEY, DEFAULT_ZOOM_LEVEL};
use crate::controller::FormInput;
use crate::types::Coords;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts at map locations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,

    /// SQLite file holding the workout snapshot.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB_PATH, global = true)]
    pub db: PathBuf,

    /// Key the snapshot is stored under.
    #[arg(long, default_value = DEFAULT_STORAGE_KEY, global = true)]
    pub key: String,

    /// Zoom level used when the map centers on a location.
    #[arg(long, default_value_t = DEFAULT_ZOOM_LEVEL, global = true)]
    pub zoom: u8,

    /// Current location as LAT,LNG. Without it the map stays unloaded
    /// (`add` falls back to its own location).
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true, global = true)]
    pub home: Option<Coords>,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Print every stored workout in the order it was logged.
    List,
    /// Log a workout at a map location.
    Add {
        #[command(subcommand)]
        workout: NewWorkout,
    },
    /// Select a workout by id and center the map on it.
    Show { id: String },
    /// Delete every workout and the stored snapshot.
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum NewWorkout {
    Running {
        /// Where on the map, as LAT,LNG.
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        at: Coords,
        /// km
        #[arg(long, allow_hyphen_values = true)]
        distance: f64,
        /// min
        #[arg(long, allow_hyphen_values = true)]
        duration: f64,
        /// steps/min
        #[arg(long, allow_hyphen_values = true)]
        cadence: f64,
    },
    Cycling {
        /// Where on the map, as LAT,LNG.
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        at: Coords,
        /// km
        #[arg(long, allow_hyphen_values = true)]
        distance: f64,
        /// min
        #[arg(long, allow_hyphen_values = true)]
        duration: f64,
        /// meters
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        elevation: f64,
    },
}

impl NewWorkout {
    pub const fn location(&self) -> Coords {
        match self {
            Self::Running { at, .. } | Self::Cycling { at, .. } => *at,
        }
    }

    pub const fn form(&self) -> FormInput {
        match *self {
            Self::Running {
                distance,
                duration,
                cadence,
                ..
            } => FormInput::running(distance, duration, cadence),
            Self::Cycling {
                distance,
                duration,
                elevation,
                ..
            } => FormInput::cycling(distance, duration, elevation),
        }
    }
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            zoom_level: self.zoom,
            storage_key: self.key.clone(),
            db_path: self.db.clone(),
        }
    }
}
