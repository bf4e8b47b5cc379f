//! Event handling for a workout-logging session.
//!
//! [`App`] owns the store and the form state. Each `on_*` handler runs one
//! external event to completion; map, presentation and storage are reached
//! only through the injected collaborators.

use crate::config::Config;
use crate::dlog;
use crate::error::{Error, INVALID_INPUT_MESSAGE, ValidationError};
use crate::snapshot::{self, KeyValueStore};
use crate::store::WorkoutStore;
use crate::types::{Coords, Workout, WorkoutKind, WorkoutRecord};
use chrono::{DateTime, Local};

pub const LOCATION_ERROR_MESSAGE: &str = "sorry, we couldn't get your location";

pub trait MapView {
    fn render_marker(&mut self, coords: Coords, icon_label: &str, popup_text: &str);
    fn focus_on(&mut self, coords: Coords, zoom: u8);
}

pub trait Presenter {
    /// Appends one row to the workout list.
    fn render_list_item(&mut self, workout: &WorkoutRecord);
    fn show_validation_error(&mut self, message: &str);
    fn show_location_error(&mut self, message: &str);
    fn show_form(&mut self);
    /// Hides the form and clears its inputs.
    fn hide_form(&mut self);
    /// Swaps the cadence and elevation inputs.
    fn toggle_secondary_field(&mut self);
    fn set_reset_visible(&mut self, visible: bool);
    /// Throws the presentation away; a new session starts from scratch.
    fn reload(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    Idle,
    /// Form open for a workout at `pending`.
    AwaitingInput { pending: Coords },
    /// Reset ran; this session accepts no more events.
    Closed,
}

/// Raw numbers from the workout form. `type_param` is the cadence for
/// running and the elevation gain for cycling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormInput {
    pub kind: WorkoutKind,
    pub distance: f64,
    pub duration: f64,
    pub type_param: f64,
}

impl FormInput {
    pub const fn running(distance: f64, duration: f64, cadence: f64) -> Self {
        Self {
            kind: WorkoutKind::Running,
            distance,
            duration,
            type_param: cadence,
        }
    }

    pub const fn cycling(distance: f64, duration: f64, elevation: f64) -> Self {
        Self {
            kind: WorkoutKind::Cycling,
            distance,
            duration,
            type_param: elevation,
        }
    }

    /// Every number finite, distance and duration above zero. Cadence must
    /// be a positive whole number; elevation may be zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("distance", self.distance),
            ("duration", self.duration),
            (self.kind.secondary_field(), self.type_param),
        ];

        if let Some(&(field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::NotFinite { field });
        }
        if let Some(&(field, _)) = fields[..2].iter().find(|(_, v)| *v <= 0.0) {
            return Err(ValidationError::NotPositive { field });
        }

        let field = self.kind.secondary_field();
        match self.kind {
            WorkoutKind::Running => {
                if self.type_param <= 0.0 {
                    return Err(ValidationError::NotPositive { field });
                }
                if self.type_param.fract() != 0.0 || self.type_param > f64::from(u32::MAX) {
                    return Err(ValidationError::NotWhole { field });
                }
            }
            WorkoutKind::Cycling => {
                if self.type_param < 0.0 {
                    return Err(ValidationError::Negative { field });
                }
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn build(&self, coords: Coords, created_at: DateTime<Local>) -> Workout {
        match self.kind {
            WorkoutKind::Running => Workout::running(
                coords,
                self.distance,
                self.duration,
                self.type_param as u32,
                created_at,
            ),
            WorkoutKind::Cycling => Workout::cycling(
                coords,
                self.distance,
                self.duration,
                self.type_param,
                created_at,
            ),
        }
    }
}

type Clock = Box<dyn FnMut() -> DateTime<Local>>;

pub struct App<M, P, K> {
    config: Config,
    map: M,
    presenter: P,
    storage: K,
    store: WorkoutStore,
    phase: Phase,
    map_ready: bool,
    clock: Clock,
}

impl<M: MapView, P: Presenter, K: KeyValueStore> App<M, P, K> {
    /// Restores the persisted workouts and lists them. An unreadable snapshot
    /// is logged and the session starts empty.
    pub fn start(config: Config, map: M, presenter: P, storage: K) -> Self {
        let mut app = Self {
            config,
            map,
            presenter,
            storage,
            store: WorkoutStore::new(),
            phase: Phase::Idle,
            map_ready: false,
            clock: Box::new(Local::now),
        };
        app.load_snapshot();
        app
    }

    /// Replaces the creation-time source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl FnMut() -> DateTime<Local> + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    fn load_snapshot(&mut self) {
        let key = &self.config.storage_key;
        match snapshot::read_snapshot(&self.storage, key) {
            Ok(records) => {
                tracing::info!(workouts = records.len(), key = %key, "restored workouts");
                self.store.restore(records);
            }
            Err(e) => {
                tracing::warn!(err = %e, key = %key, "ignoring unreadable workout snapshot");
                self.store.clear();
            }
        }

        for entry in self.store.all() {
            self.presenter.render_list_item(entry.record());
        }
        self.presenter.set_reset_visible(!self.store.is_empty());
    }

    /// Result of the location request. The first success loads the map,
    /// centers on `location` and shows a marker per stored workout; later
    /// ones only move the center.
    pub fn on_location(&mut self, location: Result<Coords, String>) -> Result<(), Error> {
        self.ensure_open()?;
        let coords = match location {
            Ok(coords) => coords,
            Err(reason) => {
                tracing::warn!(reason = %reason, "location unavailable");
                self.presenter.show_location_error(LOCATION_ERROR_MESSAGE);
                return Err(Error::GeolocationUnavailable(reason));
            }
        };

        self.map.focus_on(coords, self.config.zoom_level);
        if self.map_ready {
            dlog!("map_recentered at={coords}");
            return Ok(());
        }
        self.map_ready = true;
        for record in self.store.records() {
            self.map
                .render_marker(record.coords, record.kind().icon(), &record.marker_label());
        }
        dlog!("map_loaded at={coords} markers={}", self.store.len());
        Ok(())
    }

    /// Buffers `coords` and opens the form. A second click before submitting
    /// moves the buffered location.
    pub fn on_map_clicked(&mut self, coords: Coords) -> Result<(), Error> {
        self.ensure_open()?;
        if !self.map_ready {
            return Err(Error::GeolocationUnavailable(
                "map is not loaded yet".to_string(),
            ));
        }
        self.phase = Phase::AwaitingInput { pending: coords };
        self.presenter.show_form();
        dlog!("map_clicked at={coords}");
        Ok(())
    }

    pub fn on_type_changed(&mut self) -> Result<(), Error> {
        self.ensure_open()?;
        self.presenter.toggle_secondary_field();
        Ok(())
    }

    pub fn on_form_cancelled(&mut self) -> Result<(), Error> {
        self.ensure_open()?;
        if matches!(self.phase, Phase::AwaitingInput { .. }) {
            self.presenter.hide_form();
            self.phase = Phase::Idle;
        }
        Ok(())
    }

    /// Validates the form and logs a workout at the buffered location.
    ///
    /// Rejected input leaves the form open and the store untouched. On
    /// success the whole store is persisted and the new id returned.
    pub fn on_form_submitted(&mut self, input: FormInput) -> Result<String, Error> {
        self.ensure_open()?;
        let Phase::AwaitingInput { pending } = self.phase else {
            return Err(Error::NoPendingLocation);
        };

        if let Err(e) = input.validate() {
            tracing::debug!(err = %e, kind = %input.kind, "rejected workout input");
            self.presenter.show_validation_error(INVALID_INPUT_MESSAGE);
            return Err(e.into());
        }

        let workout = input.build(pending, (self.clock)());
        let id = workout.id().to_string();

        // Nothing is shown or kept until the snapshot holding it is written.
        let mut records = self.store.snapshot();
        records.push(workout.record().clone());
        if let Err(e) =
            snapshot::write_snapshot(&mut self.storage, &self.config.storage_key, &records)
        {
            tracing::error!(err = %e, id = %id, "workout not saved");
            return Err(e);
        }

        let record = workout.record();
        self.map
            .render_marker(record.coords, record.kind().icon(), &record.marker_label());
        self.presenter.render_list_item(record);
        self.store.add(workout);

        self.presenter.hide_form();
        self.presenter.set_reset_visible(true);
        self.phase = Phase::Idle;

        tracing::info!(id = %id, kind = %input.kind, workouts = self.store.len(), "workout logged");
        Ok(id)
    }

    /// Centers the map on the selected workout and returns its location.
    /// Unknown ids change nothing. Without a loaded map only the click is
    /// counted; callers can report the location themselves.
    pub fn on_list_item_selected(&mut self, id: &str) -> Result<Coords, Error> {
        self.ensure_open()?;
        let coords = match self.store.find_by_id(id) {
            Ok(entry) => entry.record().coords,
            Err(e) => {
                dlog!("selection_ignored {e}");
                return Err(e);
            }
        };

        if self.map_ready {
            self.map.focus_on(coords, self.config.zoom_level);
        } else {
            dlog!("focus_skipped id={id} reason=map_not_loaded");
        }

        match self.store.click(id) {
            Ok(clicks) => {
                dlog!("workout_clicked id={id} clicks={clicks}");
            }
            Err(Error::ClickUnsupported(_)) => {
                dlog!("click_not_counted id={id} reason=restored");
            }
            Err(e) => return Err(e),
        }
        Ok(coords)
    }

    /// Drops every workout and the snapshot, then asks for a reload. The
    /// session is finished afterwards.
    pub fn on_reset(&mut self) -> Result<(), Error> {
        self.ensure_open()?;
        snapshot::erase_snapshot(&mut self.storage, &self.config.storage_key)?;
        let dropped = self.store.len();
        self.store.clear();
        self.phase = Phase::Closed;
        self.presenter.reload();
        tracing::info!(workouts = dropped, "workouts reset");
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if matches!(self.phase, Phase::Closed) {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    pub const fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn map_ready(&self) -> bool {
        self.map_ready
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    pub const fn presenter(&self) -> &P {
        &self.presenter
    }

    pub const fn storage(&self) -> &K {
        &self.storage
    }

    pub fn into_parts(self) -> (M, P, K) {
        (self.map, self.presenter, self.storage)
    }
}
