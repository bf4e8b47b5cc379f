use crate::dlog;
use crate::error::Error;
use crate::types::WorkoutRecord;
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;

/// Key-value storage holding string snapshots.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process storage. Forgets everything on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a single `kv` table in a SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display();
        let conn =
            Connection::open(path).with_context(|| format!("Opening SQLite DB: {display}"))?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory SQLite DB")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS kv (
              key    text PRIMARY KEY,
              value  text NOT NULL
            );
            ",
        )
        .context("Ensuring SQLite schema")?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Reading key {key:?}"))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                r"
                INSERT INTO kv (key, value) VALUES (?1, ?2)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value
                ",
                params![key, value],
            )
            .with_context(|| format!("Writing key {key:?}"))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .with_context(|| format!("Deleting key {key:?}"))?;
        Ok(())
    }
}

/// Overwrites the snapshot under `key` with the whole collection.
pub fn write_snapshot(
    kv: &mut impl KeyValueStore,
    key: &str,
    records: &[WorkoutRecord],
) -> Result<(), Error> {
    let json = serde_json::to_string(records).context("Serializing workouts")?;
    kv.set(key, &json)?;
    dlog!("snapshot_written key={key} workouts={}", records.len());
    Ok(())
}

/// Reads the snapshot under `key`. A missing key or a JSON `null` is an
/// empty collection; anything unparseable is [`Error::PersistenceCorrupt`].
pub fn read_snapshot(kv: &impl KeyValueStore, key: &str) -> Result<Vec<WorkoutRecord>, Error> {
    let Some(raw) = kv.get(key)? else {
        dlog!("snapshot_missing key={key}");
        return Ok(Vec::new());
    };
    let records: Option<Vec<WorkoutRecord>> = serde_json::from_str(&raw)?;
    Ok(records.unwrap_or_default())
}

pub fn erase_snapshot(kv: &mut impl KeyValueStore, key: &str) -> Result<(), Error> {
    kv.remove(key)?;
    dlog!("snapshot_erased key={key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coords, Workout};
    use chrono::{Duration, Local, TimeZone};

    const KEY: &str = "workouts";

    fn sample() -> Vec<WorkoutRecord> {
        let start = Local
            .with_ymd_and_hms(2026, 3, 5, 7, 30, 0)
            .single()
            .expect("local time");
        vec![
            Workout::running(Coords::new(40.0, -73.0), 5.0, 25.0, 180, start).into_record(),
            Workout::cycling(
                Coords::new(40.1, -73.1),
                20.0,
                60.0,
                150.0,
                start + Duration::minutes(90),
            )
            .into_record(),
        ]
    }

    #[test]
    fn sqlite_store_sets_overwrites_and_removes() {
        let mut kv = SqliteStore::in_memory().expect("sqlite");
        assert_eq!(kv.get("k").expect("get"), None);

        kv.set("k", "one").expect("set");
        kv.set("k", "two").expect("overwrite");
        assert_eq!(kv.get("k").expect("get").as_deref(), Some("two"));

        kv.remove("k").expect("remove");
        assert_eq!(kv.get("k").expect("get"), None);
        kv.remove("k").expect("removing a missing key is fine");
    }

    #[test]
    fn snapshot_survives_sqlite_round_trip_in_order() {
        let mut kv = SqliteStore::in_memory().expect("sqlite");
        let records = sample();
        write_snapshot(&mut kv, KEY, &records).expect("write");

        let back = read_snapshot(&kv, KEY).expect("read");
        assert_eq!(back, records);
    }

    #[test]
    fn missing_or_null_snapshot_is_empty() {
        let mut kv = MemoryStore::new();
        assert!(read_snapshot(&kv, KEY).expect("missing").is_empty());

        kv.set(KEY, "null").expect("set");
        assert!(read_snapshot(&kv, KEY).expect("null").is_empty());
    }

    #[test]
    fn unparseable_snapshot_is_reported_as_corrupt() {
        let mut kv = MemoryStore::new();
        kv.set(KEY, "{not json").expect("set");
        assert!(matches!(read_snapshot(&kv, KEY), Err(Error::PersistenceCorrupt(_))));

        kv.set(KEY, r#"[{"id": "1", "type": "swimming"}]"#).expect("set");
        assert!(matches!(read_snapshot(&kv, KEY), Err(Error::PersistenceCorrupt(_))));
    }

    #[test]
    fn erase_deletes_the_key() {
        let mut kv = MemoryStore::new();
        write_snapshot(&mut kv, KEY, &sample()).expect("write");
        assert!(kv.contains(KEY));

        erase_snapshot(&mut kv, KEY).expect("erase");
        assert!(!kv.contains(KEY));
        assert!(read_snapshot(&kv, KEY).expect("read").is_empty());
    }

    #[test]
    fn awkward_floats_come_back_bit_identical() {
        let start = Local
            .with_ymd_and_hms(2026, 3, 5, 7, 30, 0)
            .single()
            .expect("local time");
        let mut records = vec![
            Workout::cycling(Coords::new(51.507_351, -0.127_758), 27.0, 95.0, 312.4, start)
                .into_record(),
            Workout::running(
                Coords::new(40.712_776_123_45, -74.005_974_987_65),
                21.133_474_145_090_602,
                97.3,
                171,
                start,
            )
            .into_record(),
        ];
        for i in 1..200_u32 {
            let n = f64::from(i);
            let at = Coords::new(n / 7.0 - 13.0, n * 0.913_3 - 91.0);
            let date = start + Duration::seconds(i64::from(i));
            let w = if i % 2 == 0 {
                Workout::running(at, n / 3.0 + 0.1, n * 1.7 + 1.0 / 3.0, 150 + i, date)
            } else {
                Workout::cycling(at, n * 0.37 + 1.0 / 9.0, n / 1.3 + 0.7, n * 2.9, date)
            };
            records.push(w.into_record());
        }

        let mut kv = MemoryStore::new();
        write_snapshot(&mut kv, KEY, &records).expect("write");
        let back = read_snapshot(&kv, KEY).expect("read");

        assert_eq!(back.len(), records.len());
        for (saved, restored) in records.iter().zip(&back) {
            assert_eq!(restored, saved);
            assert_eq!(restored.distance.to_bits(), saved.distance.to_bits());
            assert_eq!(
                restored.pace().map(f64::to_bits),
                saved.pace().map(f64::to_bits)
            );
            assert_eq!(
                restored.speed().map(f64::to_bits),
                saved.speed().map(f64::to_bits)
            );
        }
    }
}
