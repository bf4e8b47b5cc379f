use crate::error::Error;
use crate::types::{Workout, WorkoutRecord};

/// One slot of the store.
///
/// Workouts created this session stay `Live`; anything read back from a
/// snapshot is `Restored` and only supports display.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Live(Workout),
    Restored(WorkoutRecord),
}

impl Entry {
    pub const fn record(&self) -> &WorkoutRecord {
        match self {
            Self::Live(w) => w.record(),
            Self::Restored(r) => r,
        }
    }

    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }
}

/// Workouts in insertion order. No dedup, no capacity limit.
#[derive(Debug, Default)]
pub struct WorkoutStore {
    entries: Vec<Entry>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, workout: Workout) {
        self.entries.push(Entry::Live(workout));
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &WorkoutRecord> {
        self.entries.iter().map(Entry::record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with `id`, scanning in insertion order.
    pub fn find_by_id(&self, id: &str) -> Result<&Entry, Error> {
        self.entries
            .iter()
            .find(|e| e.record().id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Counts a click on the first entry with `id`.
    pub fn click(&mut self, id: &str) -> Result<u32, Error> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.record().id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        match entry {
            Entry::Live(w) => Ok(w.click()),
            Entry::Restored(r) => Err(Error::ClickUnsupported(r.id.clone())),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replaces everything with records read from a snapshot.
    pub fn restore(&mut self, records: Vec<WorkoutRecord>) {
        self.entries = records.into_iter().map(Entry::Restored).collect();
    }

    pub fn snapshot(&self) -> Vec<WorkoutRecord> {
        self.records().cloned().collect()
    }
}
