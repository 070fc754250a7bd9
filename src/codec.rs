//! Moving schedules across process boundaries.
//!
//! The record format is one JSON object per hour mapping each stage to an
//! artist record or `null`. It is meant for client-side state, so reading it
//! is lenient: anything that doesn't look like an artist becomes an empty slot.
//!
//! The CSV format has one column per stage and one row per hour, with each
//! booking written as `Name<br>Size: Small<br>Genre: Indie`.

use log::warn;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::io;

use crate::config::FestivalRules;
use crate::data::{Artist, ArtistSize, Genre, Schedule, Slot};
use crate::error::ScheduleError;

pub const ARTIST_TYPE_TAG: &str = "Artist";

/// One hour of a serialized schedule: stage name to artist record or null.
pub type ScheduleRecord = serde_json::Map<String, Value>;

#[derive(Debug, Serialize, Deserialize)]
struct ArtistRecord {
    name: String,
    size: ArtistSize,
    genre: Genre,
    #[serde(rename = "_type")]
    type_tag: String,
}

impl Artist {
    pub fn to_record(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "size": self.size,
            "genre": self.genre,
            "_type": ARTIST_TYPE_TAG,
        })
    }

    /// `None` for anything that isn't a complete, tagged artist record.
    pub fn from_record(value: &Value) -> Option<Artist> {
        let record = ArtistRecord::deserialize(value).ok()?;
        if record.type_tag != ARTIST_TYPE_TAG {
            return None;
        }
        Some(Artist::new(record.name, record.size, record.genre))
    }

    pub fn to_cell(&self) -> String {
        format!(
            "{}<br>Size: {}<br>Genre: {}",
            self.name,
            self.size.title(),
            self.genre.title()
        )
    }

    pub fn from_cell(text: &str) -> Option<Artist> {
        let mut parts = text.split("<br>");
        let name = parts.next()?.trim();
        let size: ArtistSize = parts.next()?.trim().strip_prefix("Size:")?.parse().ok()?;
        let genre: Genre = parts.next()?.trim().strip_prefix("Genre:")?.parse().ok()?;
        if name.is_empty() || parts.next().is_some() {
            return None;
        }
        Some(Artist::new(name, size, genre))
    }
}

/// Writes a booked cell as a tagged artist record, the same way schedules are sent.
pub(crate) fn serialize_artist_record<S: Serializer>(
    artist: &Option<Artist>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match artist {
        Some(artist) => artist.to_record().serialize(serializer),
        None => serializer.serialize_none(),
    }
}

pub fn serialize_schedule(schedule: &Schedule) -> Vec<ScheduleRecord> {
    (0..schedule.hour_count())
        .map(|hour| {
            schedule
                .stages()
                .iter()
                .enumerate()
                .map(|(stage, name)| {
                    let cell = schedule
                        .get(Slot::new(hour, stage))
                        .map_or(Value::Null, Artist::to_record);
                    (name.clone(), cell)
                })
                .collect()
        })
        .collect()
}

/// Rebuilds a schedule from records, first record = first hour. Missing
/// trailing hours are empty; more records than hours is an error.
pub fn deserialize_schedule(
    rules: &FestivalRules,
    records: &[ScheduleRecord],
) -> Result<Schedule, ScheduleError> {
    let mut schedule = rules.empty_schedule();
    if records.len() > schedule.hour_count() {
        return Err(ScheduleError::InvalidShape(format!(
            "{} hourly records for a {} hour day",
            records.len(),
            schedule.hour_count()
        )));
    }
    for (hour, record) in records.iter().enumerate() {
        for (stage, name) in rules.stages().iter().enumerate() {
            let artist = record.get(name).and_then(Artist::from_record);
            schedule.set(Slot::new(hour, stage), artist);
        }
    }
    Ok(schedule)
}

/// Loads a schedule previously written with [`write_csv`]. An `hour` column
/// (or an unnamed index column) is ignored.
pub fn read_csv<R: io::Read>(rules: &FestivalRules, reader: R) -> Result<Schedule, ScheduleError> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut columns = Vec::with_capacity(headers.len());
    for header in headers.iter() {
        if header.is_empty() || header.eq_ignore_ascii_case("hour") {
            columns.push(None);
            continue;
        }
        let stage = rules
            .stages()
            .iter()
            .position(|s| s == header)
            .ok_or_else(|| ScheduleError::InvalidShape(format!("unknown stage column '{}'", header)))?;
        columns.push(Some(stage));
    }
    if let Some(missing) = (0..rules.stages().len()).find(|s| !columns.contains(&Some(*s))) {
        return Err(ScheduleError::InvalidShape(format!(
            "missing stage column '{}'",
            rules.stages()[missing]
        )));
    }

    let mut schedule = rules.empty_schedule();
    let mut rows = 0;
    for (hour, row) in reader.records().enumerate() {
        let row = row?;
        rows += 1;
        if hour >= schedule.hour_count() {
            continue;
        }
        for (column, cell) in columns.iter().zip(row.iter()) {
            let Some(stage) = column else { continue };
            if cell.trim().is_empty() {
                continue;
            }
            let artist = Artist::from_cell(cell);
            if artist.is_none() {
                warn!("Unreadable booking '{}' loaded as an empty slot", cell);
            }
            schedule.set(Slot::new(hour, *stage), artist);
        }
    }
    if rows != schedule.hour_count() {
        return Err(ScheduleError::InvalidShape(format!(
            "{} rows for a {} hour day",
            rows,
            schedule.hour_count()
        )));
    }
    Ok(schedule)
}

pub fn write_csv<W: io::Write>(schedule: &Schedule, writer: W) -> Result<(), ScheduleError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(schedule.stages())?;
    for hour in 0..schedule.hour_count() {
        writer.write_record((0..schedule.stage_count()).map(|stage| {
            schedule
                .get(Slot::new(hour, stage))
                .map(Artist::to_cell)
                .unwrap_or_default()
        }))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
