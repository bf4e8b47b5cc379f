use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Digits kept from the epoch-millisecond timestamp when minting an id.
const ID_DIGITS: usize = 10;

/// A map position. Serialized as `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Parses `LAT,LNG`, e.g. `40.0,-73.0`.
impl FromStr for Coords {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG, got {s:?}"))?;
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad latitude {lat:?}: {e}"))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad longitude {lng:?}: {e}"))?;
        if !lat.is_finite() || !lng.is_finite() {
            return Err(format!("coordinates must be finite: {s:?}"));
        }
        Ok(Self { lat, lng })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    /// Capitalized name used in descriptions.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }

    /// Name of the form field that only this kind uses.
    pub const fn secondary_field(self) -> &'static str {
        match self {
            Self::Running => "cadence",
            Self::Cycling => "elevation",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-kind payload. The `type` key doubles as the kind discriminator in
/// persisted snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Metrics {
    Running {
        /// Steps per minute.
        cadence: u32,
        /// Minutes per km.
        pace: f64,
    },
    Cycling {
        /// Meters climbed.
        #[serde(rename = "elevationGains")]
        elevation_gain: f64,
        /// km/h.
        speed: f64,
    },
}

impl Metrics {
    pub const fn kind(&self) -> WorkoutKind {
        match self {
            Self::Running { .. } => WorkoutKind::Running,
            Self::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// Plain workout data, exactly what a snapshot holds.
///
/// Derived values (`description`, pace, speed) are stored, not recomputed.
/// A record read back from a snapshot is display-only: click counting needs a
/// live [`Workout`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    pub date: DateTime<Local>,
    pub coords: Coords,
    /// km
    pub distance: f64,
    /// minutes
    pub duration: f64,
    #[serde(default)]
    pub clicks: u32,
    pub description: String,
    #[serde(flatten)]
    pub metrics: Metrics,
}

impl WorkoutRecord {
    pub const fn kind(&self) -> WorkoutKind {
        self.metrics.kind()
    }

    pub const fn pace(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Running { pace, .. } => Some(pace),
            Metrics::Cycling { .. } => None,
        }
    }

    pub const fn speed(&self) -> Option<f64> {
        match self.metrics {
            Metrics::Cycling { speed, .. } => Some(speed),
            Metrics::Running { .. } => None,
        }
    }

    /// Popup text shown next to the map marker.
    pub fn marker_label(&self) -> String {
        format!("{} {}", self.kind().icon(), self.description)
    }
}

/// A workout created during this session.
///
/// Fields are fixed at construction; only the click counter moves.
#[derive(Debug, Clone, PartialEq)]
pub struct Workout {
    record: WorkoutRecord,
}

impl Workout {
    /// Inputs are trusted; the controller validates them first.
    pub fn running(
        coords: Coords,
        distance: f64,
        duration: f64,
        cadence: u32,
        created_at: DateTime<Local>,
    ) -> Self {
        let pace = duration / distance;
        Self::build(
            coords,
            distance,
            duration,
            Metrics::Running { cadence, pace },
            created_at,
        )
    }

    /// Inputs are trusted; the controller validates them first.
    pub fn cycling(
        coords: Coords,
        distance: f64,
        duration: f64,
        elevation_gain: f64,
        created_at: DateTime<Local>,
    ) -> Self {
        let speed = distance / (duration / 60.0);
        Self::build(
            coords,
            distance,
            duration,
            Metrics::Cycling {
                elevation_gain,
                speed,
            },
            created_at,
        )
    }

    fn build(
        coords: Coords,
        distance: f64,
        duration: f64,
        metrics: Metrics,
        created_at: DateTime<Local>,
    ) -> Self {
        let description = describe(metrics.kind(), &created_at);
        Self {
            record: WorkoutRecord {
                id: id_from_timestamp(&created_at),
                date: created_at,
                coords,
                distance,
                duration,
                clicks: 0,
                description,
                metrics,
            },
        }
    }

    pub const fn record(&self) -> &WorkoutRecord {
        &self.record
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Counts one selection of this workout and returns the new total.
    pub const fn click(&mut self) -> u32 {
        self.record.clicks = self.record.clicks.saturating_add(1);
        self.record.clicks
    }

    pub fn into_record(self) -> WorkoutRecord {
        self.record
    }
}

/// `"<Kind> on <Month> <day>"`, e.g. `"Running on March 5"`.
pub fn describe(kind: WorkoutKind, date: &DateTime<Local>) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} on {month} {}", kind.label(), date.day())
}

/// Last digits of the epoch milliseconds. Unique only as long as two workouts
/// are not created within the same millisecond.
pub fn id_from_timestamp(date: &DateTime<Local>) -> String {
    let ms = date.timestamp_millis().to_string();
    let start = ms.len().saturating_sub(ID_DIGITS);
    ms[start..].to_string()
}
