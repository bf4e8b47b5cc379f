use chrono::{DateTime, Duration, Local, TimeZone};
use mapty::config::Config;
use mapty::controller::{App, FormInput, MapView, Presenter};
use mapty::error::Error;
use mapty::snapshot::{self, KeyValueStore, SqliteStore};
use mapty::types::{Coords, WorkoutKind, WorkoutRecord};
use std::path::Path;

#[derive(Default)]
struct Map {
    focus: Vec<Coords>,
    markers: usize,
}

impl MapView for Map {
    fn render_marker(&mut self, _coords: Coords, _icon_label: &str, _popup_text: &str) {
        self.markers += 1;
    }

    fn focus_on(&mut self, coords: Coords, _zoom: u8) {
        self.focus.push(coords);
    }
}

#[derive(Default)]
struct List {
    rows: Vec<WorkoutRecord>,
    errors: Vec<String>,
    reloaded: bool,
}

impl Presenter for List {
    fn render_list_item(&mut self, workout: &WorkoutRecord) {
        self.rows.push(workout.clone());
    }

    fn show_validation_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn show_location_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn show_form(&mut self) {}

    fn hide_form(&mut self) {}

    fn toggle_secondary_field(&mut self) {}

    fn set_reset_visible(&mut self, _visible: bool) {}

    fn reload(&mut self) {
        self.reloaded = true;
    }
}

fn clock() -> impl FnMut() -> DateTime<Local> {
    let base = Local
        .with_ymd_and_hms(2026, 3, 5, 6, 0, 0)
        .single()
        .expect("local time");
    let mut minutes = 0;
    move || {
        minutes += 1;
        base + Duration::minutes(minutes)
    }
}

fn open(db: &Path) -> App<Map, List, SqliteStore> {
    let storage = SqliteStore::open(db).expect("open sqlite");
    App::start(Config::default(), Map::default(), List::default(), storage).with_clock(clock())
}

#[test]
fn workouts_survive_a_restart_as_display_only_records() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("mapty.sqlite3");

    let (run_id, ride_id) = {
        let mut app = open(&db);
        app.on_location(Ok(Coords::new(40.0, -73.0))).expect("location");

        app.on_map_clicked(Coords::new(40.0, -73.0)).expect("click");
        let run = app
            .on_form_submitted(FormInput::running(5.0, 25.0, 180.0))
            .expect("running");

        app.on_map_clicked(Coords::new(40.01, -73.02)).expect("click");
        let ride = app
            .on_form_submitted(FormInput::cycling(20.0, 60.0, 150.0))
            .expect("cycling");

        app.on_list_item_selected(&run).expect("select live");
        assert_eq!(app.store().find_by_id(&run).expect("run").record().clicks, 1);
        (run, ride)
    };

    let mut app = open(&db);
    let rows = &app.presenter().rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, run_id);
    assert_eq!(rows[0].kind(), WorkoutKind::Running);
    assert_eq!(rows[0].distance, 5.0);
    assert_eq!(rows[0].duration, 25.0);
    assert_eq!(rows[0].pace(), Some(5.0));
    assert_eq!(rows[0].description, "Running on March 5");
    assert_eq!(rows[1].id, ride_id);
    assert_eq!(rows[1].kind(), WorkoutKind::Cycling);
    assert_eq!(rows[1].speed(), Some(20.0));
    assert_eq!(rows[1].description, "Cycling on March 5");

    app.on_location(Ok(Coords::new(40.0, -73.0))).expect("location");
    assert_eq!(app.map().markers, 2);

    // Restored entries still focus the map, but their click count is frozen.
    app.on_list_item_selected(&ride_id).expect("select restored");
    assert_eq!(app.map().focus.last(), Some(&Coords::new(40.01, -73.02)));
    assert!(!app.store().find_by_id(&ride_id).expect("ride").is_live());
    assert!(app.store().records().all(|r| r.clicks == 0));
}

#[test]
fn rejected_input_leaves_disk_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("mapty.sqlite3");

    let mut app = open(&db);
    app.on_location(Ok(Coords::new(0.0, 0.0))).expect("location");
    app.on_map_clicked(Coords::new(1.0, 1.0)).expect("click");
    app.on_form_submitted(FormInput::running(5.0, 25.0, 180.0))
        .expect("valid");

    let before = app.storage().get("workouts").expect("read");
    app.on_map_clicked(Coords::new(2.0, 2.0)).expect("click");
    for input in [
        FormInput::running(0.0, 25.0, 180.0),
        FormInput::running(5.0, -5.0, 180.0),
        FormInput::running(5.0, 25.0, f64::NAN),
    ] {
        assert!(matches!(
            app.on_form_submitted(input),
            Err(Error::Validation(_))
        ));
    }
    assert_eq!(app.store().len(), 1);
    assert_eq!(app.storage().get("workouts").expect("read"), before);
    assert_eq!(app.presenter().errors.len(), 3);
}

#[test]
fn reset_removes_the_snapshot_for_good() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("mapty.sqlite3");

    {
        let mut app = open(&db);
        app.on_location(Ok(Coords::new(0.0, 0.0))).expect("location");
        app.on_map_clicked(Coords::new(1.0, 1.0)).expect("click");
        app.on_form_submitted(FormInput::cycling(12.0, 40.0, 0.0))
            .expect("valid");
        app.on_reset().expect("reset");
        assert!(app.presenter().reloaded);
        assert!(app.store().is_empty());
    }

    let app = open(&db);
    assert!(app.store().is_empty());
    assert!(app.presenter().rows.is_empty());
    assert_eq!(app.storage().get("workouts").expect("read"), None);
    assert!(
        snapshot::read_snapshot(app.storage(), "workouts")
            .expect("read")
            .is_empty()
    );
}

#[test]
fn corrupt_file_snapshot_does_not_block_startup() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = dir.path().join("mapty.sqlite3");
    {
        let mut kv = SqliteStore::open(&db).expect("open");
        kv.set("workouts", "definitely not json").expect("set");
    }

    let mut app = open(&db);
    assert!(app.store().is_empty());

    app.on_location(Ok(Coords::new(0.0, 0.0))).expect("location");
    app.on_map_clicked(Coords::new(1.0, 1.0)).expect("click");
    app.on_form_submitted(FormInput::running(10.0, 50.0, 170.0))
        .expect("valid");
    let saved = snapshot::read_snapshot(app.storage(), "workouts").expect("rewritten");
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].pace(), Some(5.0));
}
