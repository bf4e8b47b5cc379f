//! Terminal stand-ins for the map and the workout list.

use crate::controller::{MapView, Presenter};
use crate::dlog;
use crate::types::{Coords, Metrics, WorkoutRecord};

/// Tab-separated list row: id, title, distance, duration, then pace and
/// cadence for runs or speed and elevation for rides.
pub fn format_row(w: &WorkoutRecord) -> String {
    let details = match w.metrics {
        Metrics::Running { cadence, pace } => format!("{pace:.1} min/km\t{cadence} spm"),
        Metrics::Cycling {
            elevation_gain,
            speed,
        } => format!("{speed:.1} km/h\t{elevation_gain} m"),
    };
    format!(
        "{}\t{}\t{} km\t{} min\t{details}",
        w.id,
        w.marker_label(),
        w.distance,
        w.duration
    )
}

/// Shown when a workout is selected before any location loaded the map.
pub fn unloaded_focus_notice(id: &str, at: Coords) -> String {
    format!("workout {id} is at {at}; pass --home LAT,LNG to center the map on it")
}

/// There is no map to draw on; markers go to the debug log and focus moves
/// are printed.
#[derive(Debug, Default)]
pub struct TerminalMap;

impl MapView for TerminalMap {
    fn render_marker(&mut self, coords: Coords, icon_label: &str, popup_text: &str) {
        dlog!("marker at={coords} icon={icon_label} popup={popup_text:?}");
    }

    fn focus_on(&mut self, coords: Coords, zoom: u8) {
        println!("map centered on {coords} (zoom {zoom})");
    }
}

#[derive(Debug, Default)]
pub struct TerminalPresenter {
    echo_rows: bool,
}

impl TerminalPresenter {
    /// With `echo_rows` off, list rows are only logged at debug level.
    pub const fn new(echo_rows: bool) -> Self {
        Self { echo_rows }
    }
}

impl Presenter for TerminalPresenter {
    fn render_list_item(&mut self, workout: &WorkoutRecord) {
        if self.echo_rows {
            println!("{}", format_row(workout));
        } else {
            dlog!("row {}", format_row(workout));
        }
    }

    fn show_validation_error(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn show_location_error(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn show_form(&mut self) {
        dlog!("form shown");
    }

    fn hide_form(&mut self) {
        dlog!("form hidden");
    }

    fn toggle_secondary_field(&mut self) {
        dlog!("form secondary field toggled");
    }

    fn set_reset_visible(&mut self, visible: bool) {
        dlog!("reset control visible={visible}");
    }

    fn reload(&mut self) {
        println!("All workouts deleted.");
    }
}
