use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ScheduleError;

// Type aliases for clarity
pub type Hour = u32;
pub type StageName = String;

/// Rough popularity of an artist. Ordinal: later in the day means bigger acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArtistSize {
    Small,
    Medium,
    Large,
}

impl ArtistSize {
    pub const ALL: [ArtistSize; 3] = [ArtistSize::Small, ArtistSize::Medium, ArtistSize::Large];

    pub fn title(self) -> &'static str {
        match self {
            ArtistSize::Small => "Small",
            ArtistSize::Medium => "Medium",
            ArtistSize::Large => "Large",
        }
    }
}

impl fmt::Display for ArtistSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtistSize::Small => "small",
            ArtistSize::Medium => "medium",
            ArtistSize::Large => "large",
        })
    }
}

impl FromStr for ArtistSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtistSize::ALL
            .into_iter()
            .find(|size| size.title().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown artist size '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Genre {
    Pop,
    Rap,
    Edm,
    Indie,
}

impl Genre {
    pub const ALL: [Genre; 4] = [Genre::Pop, Genre::Rap, Genre::Edm, Genre::Indie];

    pub fn title(self) -> &'static str {
        match self {
            Genre::Pop => "Pop",
            Genre::Rap => "Rap",
            Genre::Edm => "Edm",
            Genre::Indie => "Indie",
        }
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .into_iter()
            .find(|genre| genre.title().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown genre '{}'", s))
    }
}

/// A performer from the catalog. Two artists are the same artist if they share a name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    pub size: ArtistSize,
    pub genre: Genre,
}

impl Artist {
    pub fn new(name: impl Into<String>, size: ArtistSize, genre: Genre) -> Self {
        Self {
            name: name.into(),
            size,
            genre,
        }
    }
}

impl PartialEq for Artist {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Artist {}

impl Hash for Artist {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.size, self.genre.title())
    }
}

/// Position of a cell in the grid, by hour index and stage index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub hour: usize,
    pub stage: usize,
}

impl Slot {
    pub fn new(hour: usize, stage: usize) -> Self {
        Self { hour, stage }
    }
}

/// An artist (or an empty cell) booked on a stage at an hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Concert {
    #[serde(serialize_with = "crate::codec::serialize_artist_record")]
    pub artist: Option<Artist>,
    pub stage: StageName,
    pub hour: Hour,
    #[serde(skip)]
    pub slot: Slot,
}

impl fmt::Display for Concert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.artist {
            Some(artist) => write!(f, "{} at {}:00 on {}", artist, self.hour, self.stage),
            None => write!(f, "empty slot at {}:00 on {}", self.hour, self.stage),
        }
    }
}

/// Which placement rule a conflict breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConflictKind {
    ConsecutiveBooking,
    NeighborsSimultaneous,
    UnderBookedStage,
    SizeWindow,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictKind::ConsecutiveBooking => "Consecutive Booking",
            ConflictKind::NeighborsSimultaneous => "Simultaneous Neighbors",
            ConflictKind::UnderBookedStage => "Under-Booked Stage",
            ConflictKind::SizeWindow => "Size Window",
        })
    }
}

/// Two concerts that break a rule together. For single-cell rules both
/// concerts are the same cell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConflict {
    pub kind: ConflictKind,
    pub first: Concert,
    pub second: Concert,
}

impl ScheduleConflict {
    pub fn pair(kind: ConflictKind, first: Concert, second: Concert) -> Self {
        Self {
            kind,
            first,
            second,
        }
    }

    pub fn single(kind: ConflictKind, concert: Concert) -> Self {
        Self {
            kind,
            first: concert.clone(),
            second: concert,
        }
    }
}

// the pair is unordered
impl PartialEq for ScheduleConflict {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && ((self.first == other.first && self.second == other.second)
                || (self.first == other.second && self.second == other.first))
    }
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] conflict between {} and {}",
            self.kind, self.first, self.second
        )
    }
}

/// A day of bookings: hours × stages, stored hour-major.
///
/// Cloning copies the cells only; the hour axis and stage list are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    hours: Arc<[Hour]>,
    stages: Arc<[StageName]>,
    cells: Vec<Option<Artist>>,
}

impl Schedule {
    pub fn empty(hours: Arc<[Hour]>, stages: Arc<[StageName]>) -> Self {
        let cells = vec![None; hours.len() * stages.len()];
        Self {
            hours,
            stages,
            cells,
        }
    }

    pub fn hours(&self) -> &[Hour] {
        &self.hours
    }

    pub fn stages(&self) -> &[StageName] {
        &self.stages
    }

    pub fn hour_count(&self) -> usize {
        self.hours.len()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn hour_index(&self, hour: Hour) -> Option<usize> {
        self.hours.iter().position(|h| *h == hour)
    }

    pub fn stage_index(&self, stage: &str) -> Option<usize> {
        self.stages.iter().position(|s| s == stage)
    }

    fn index(&self, slot: Slot) -> usize {
        debug_assert!(slot.hour < self.hour_count() && slot.stage < self.stage_count());
        slot.hour * self.stages.len() + slot.stage
    }

    pub fn get(&self, slot: Slot) -> Option<&Artist> {
        self.cells[self.index(slot)].as_ref()
    }

    /// Puts `artist` into the cell and returns whatever was there before.
    pub fn set(&mut self, slot: Slot, artist: Option<Artist>) -> Option<Artist> {
        let index = self.index(slot);
        std::mem::replace(&mut self.cells[index], artist)
    }

    /// Exchanges the contents of two cells. Swapping a cell with itself is a no-op.
    pub fn swap(&mut self, a: Slot, b: Slot) {
        let (a, b) = (self.index(a), self.index(b));
        self.cells.swap(a, b);
    }

    /// Resolves a booking by wall-clock hour and stage name.
    pub fn artist_at(&self, hour: Hour, stage: &str) -> Option<&Artist> {
        let slot = Slot::new(self.hour_index(hour)?, self.stage_index(stage)?);
        self.get(slot)
    }

    /// Every slot, hour-major.
    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        let stages = self.stage_count();
        (0..self.hour_count()).flat_map(move |hour| (0..stages).map(move |stage| Slot::new(hour, stage)))
    }

    pub fn performances_on(&self, stage: usize) -> usize {
        (0..self.hour_count())
            .filter(|hour| self.get(Slot::new(*hour, stage)).is_some())
            .count()
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    pub fn concert(&self, slot: Slot) -> Concert {
        Concert {
            artist: self.get(slot).cloned(),
            stage: self.stages[slot.stage].clone(),
            hour: self.hours[slot.hour],
            slot,
        }
    }

    /// Checks the grid against the layout it claims to have: a consecutive hour
    /// axis, unique stage columns, and one cell per hour and stage.
    pub fn validate_shape(&self) -> Result<(), ScheduleError> {
        if self.hours.is_empty() || self.stages.is_empty() {
            return Err(ScheduleError::InvalidShape(
                "a schedule needs at least one hour and one stage".to_string(),
            ));
        }
        if self.hours.windows(2).any(|w| w[1] != w[0] + 1) {
            return Err(ScheduleError::InvalidShape(
                "hours must be consecutive and increasing".to_string(),
            ));
        }
        for (i, stage) in self.stages.iter().enumerate() {
            if self.stages[..i].contains(stage) {
                return Err(ScheduleError::InvalidShape(format!(
                    "stage '{}' appears more than once",
                    stage
                )));
            }
        }
        if self.cells.len() != self.hours.len() * self.stages.len() {
            return Err(ScheduleError::InvalidShape(format!(
                "expected {} cells, found {}",
                self.hours.len() * self.stages.len(),
                self.cells.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}", "hour")?;
        for stage in self.stages.iter() {
            write!(f, " | {:<22}", stage)?;
        }
        writeln!(f)?;
        for (h, hour) in self.hours.iter().enumerate() {
            write!(f, "{:>5}", hour)?;
            for s in 0..self.stage_count() {
                let name = self.get(Slot::new(h, s)).map_or("", |a| a.name.as_str());
                write!(f, " | {:<22}", name)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
