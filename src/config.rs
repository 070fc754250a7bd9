use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::data::{ArtistSize, Hour, Schedule, StageName};
use crate::error::ScheduleError;

/// Longest festival day, in hours.
pub const MAX_DAY_HOURS: usize = 24;

/// Artist sizes allowed on stage between `start` and `end` (both inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeWindow {
    pub start: Hour,
    pub end: Hour,
    pub sizes: Vec<ArtistSize>,
}

impl SizeWindow {
    pub fn new(start: Hour, end: Hour, sizes: &[ArtistSize]) -> Self {
        Self {
            start,
            end,
            sizes: sizes.to_vec(),
        }
    }

    fn covers(&self, hour: Hour) -> bool {
        self.start <= hour && hour <= self.end
    }
}

/// Relative frequency of each artist size among the generated bookings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeWeights {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl SizeWeights {
    pub fn weight(&self, size: ArtistSize) -> f64 {
        match size {
            ArtistSize::Small => self.small,
            ArtistSize::Medium => self.medium,
            ArtistSize::Large => self.large,
        }
    }
}

/// Every knob of the festival. Mostly tuned by playtesting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FestivalConfig {
    pub first_hour: Hour,
    pub last_hour: Hour,
    pub stages: Vec<StageName>,
    /// Stages that can't play at the same time. Declaring one direction is enough.
    pub neighbors: Vec<(StageName, StageName)>,
    pub size_windows: Vec<SizeWindow>,
    /// Bounds of the fraction of stage/hour slots the generator fills.
    pub min_event_frequency: f64,
    pub max_event_frequency: f64,
    pub size_weights: SizeWeights,
    pub min_performances_per_stage: usize,
    pub max_repair_iterations: usize,
    /// Chance of keeping a swap that didn't fix anything.
    pub acceptance_probability: f64,
    pub max_sampling_attempts: usize,
    /// `None` keeps restarting until a schedule converges.
    pub max_restarts: Option<u32>,
}

impl Default for FestivalConfig {
    fn default() -> Self {
        use ArtistSize::{Large, Medium, Small};

        Self {
            first_hour: 12,
            last_hour: 22,
            stages: ["Bud Light", "Tito's", "Bacardi", "BMI", "Perry's", "IHG", "T-Mobile"]
                .into_iter()
                .map(String::from)
                .collect(),
            neighbors: vec![
                ("Bud Light".to_string(), "Tito's".to_string()),
                ("IHG".to_string(), "T-Mobile".to_string()),
            ],
            size_windows: vec![
                SizeWindow::new(12, 13, &[Small]),
                SizeWindow::new(14, 16, &[Small, Medium]),
                SizeWindow::new(17, 19, &[Small, Medium, Large]),
                SizeWindow::new(20, 21, &[Medium, Large]),
                SizeWindow::new(22, 22, &[Large]),
            ],
            min_event_frequency: 0.55,
            max_event_frequency: 0.65,
            size_weights: SizeWeights {
                small: 0.45,
                medium: 0.35,
                large: 0.20,
            },
            min_performances_per_stage: 3,
            max_repair_iterations: 1000,
            acceptance_probability: 0.1,
            max_sampling_attempts: 10_000,
            max_restarts: None,
        }
    }
}

/// A validated [`FestivalConfig`] with the lookups the detector needs
/// precomputed: neighbor by stage index, allowed sizes by hour index.
#[derive(Debug, Clone)]
pub struct FestivalRules {
    config: FestivalConfig,
    hours: Arc<[Hour]>,
    stages: Arc<[StageName]>,
    neighbors: Vec<Option<usize>>,
    allowed_sizes: Vec<Vec<ArtistSize>>,
}

impl FestivalRules {
    pub fn new(config: FestivalConfig) -> Result<Self, ScheduleError> {
        if config.first_hour > config.last_hour {
            return Err(invalid(format!(
                "first hour {} is after last hour {}",
                config.first_hour, config.last_hour
            )));
        }
        let day_length = (config.last_hour - config.first_hour) as usize + 1;
        if day_length > MAX_DAY_HOURS {
            return Err(invalid(format!(
                "a {} hour day is longer than the {} hour limit",
                day_length, MAX_DAY_HOURS
            )));
        }
        let hours: Arc<[Hour]> = (config.first_hour..=config.last_hour).collect();

        if config.stages.is_empty() {
            return Err(invalid("at least one stage is required".to_string()));
        }
        let stages: Arc<[StageName]> = Arc::from(config.stages.clone());
        let stage_index = |name: &str| -> Result<usize, ScheduleError> {
            stages
                .iter()
                .position(|s| s == name)
                .ok_or_else(|| invalid(format!("unknown stage '{}'", name)))
        };
        for (i, stage) in stages.iter().enumerate() {
            if stages[..i].contains(stage) {
                return Err(invalid(format!("stage '{}' is listed twice", stage)));
            }
        }

        // add the reverse mapping; stages without a neighbor stay None
        let mut neighbors = vec![None; stages.len()];
        for (a, b) in &config.neighbors {
            let (a, b) = (stage_index(a)?, stage_index(b)?);
            if a == b {
                return Err(invalid(format!("stage '{}' can't neighbor itself", stages[a])));
            }
            for (from, to) in [(a, b), (b, a)] {
                let current = neighbors[from];
                match current {
                    Some(existing) if existing != to => {
                        return Err(invalid(format!(
                            "stage '{}' already neighbors '{}'",
                            stages[from], stages[existing]
                        )));
                    }
                    _ => neighbors[from] = Some(to),
                }
            }
        }

        let mut allowed_sizes = Vec::with_capacity(hours.len());
        for hour in hours.iter() {
            let mut covering = config.size_windows.iter().filter(|w| w.covers(*hour));
            let window = covering
                .next()
                .ok_or_else(|| invalid(format!("no size window covers {}:00", hour)))?;
            if covering.next().is_some() {
                return Err(invalid(format!("size windows overlap at {}:00", hour)));
            }
            if window.sizes.is_empty() {
                return Err(invalid(format!("size window at {}:00 allows no sizes", hour)));
            }
            allowed_sizes.push(window.sizes.clone());
        }

        let in_unit = |x: f64| (0.0..=1.0).contains(&x);
        if !in_unit(config.min_event_frequency)
            || !in_unit(config.max_event_frequency)
            || config.min_event_frequency > config.max_event_frequency
        {
            return Err(invalid(format!(
                "event frequency range {}..{} must lie within 0..1",
                config.min_event_frequency, config.max_event_frequency
            )));
        }

        let weights = config.size_weights;
        let total: f64 = ArtistSize::ALL.iter().map(|s| weights.weight(*s)).sum();
        if ArtistSize::ALL.iter().any(|s| weights.weight(*s) < 0.0) || (total - 1.0).abs() > 1e-9 {
            return Err(invalid(format!(
                "artist size frequencies must be non-negative and sum to 1, got {}",
                total
            )));
        }

        if !in_unit(config.acceptance_probability) {
            return Err(invalid(format!(
                "acceptance probability {} must lie within 0..1",
                config.acceptance_probability
            )));
        }
        if config.max_sampling_attempts == 0 {
            return Err(invalid("max sampling attempts must be positive".to_string()));
        }
        check_bookable(&config, &hours, &neighbors)?;

        Ok(Self {
            config,
            hours,
            stages,
            neighbors,
            allowed_sizes,
        })
    }

    pub fn config(&self) -> &FestivalConfig {
        &self.config
    }

    pub fn hours(&self) -> &[Hour] {
        &self.hours
    }

    pub fn stages(&self) -> &[StageName] {
        &self.stages
    }

    pub fn slot_count(&self) -> usize {
        self.hours.len() * self.stages.len()
    }

    pub fn neighbor_of(&self, stage: usize) -> Option<usize> {
        self.neighbors[stage]
    }

    pub fn allows(&self, hour: usize, size: ArtistSize) -> bool {
        self.allowed_sizes[hour].contains(&size)
    }

    pub fn empty_schedule(&self) -> Schedule {
        Schedule::empty(self.hours.clone(), self.stages.clone())
    }

    /// Whether `schedule` was laid out for this festival.
    pub fn check_layout(&self, schedule: &Schedule) -> Result<(), ScheduleError> {
        schedule.validate_shape()?;
        if schedule.hours() != &*self.hours || schedule.stages() != &*self.stages {
            return Err(ScheduleError::InvalidShape(
                "hours or stages differ from the festival layout".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rejects minimums no schedule can meet. A stage never plays two hours in a
/// row, so it fits at most every other hour, and two neighbors share the hours
/// between them.
fn check_bookable(
    config: &FestivalConfig,
    hours: &[Hour],
    neighbors: &[Option<usize>],
) -> Result<(), ScheduleError> {
    let min = config.min_performances_per_stage;
    let per_stage = hours.len().div_ceil(2);
    if min > per_stage {
        return Err(invalid(format!(
            "{} performances per stage can't fit in {} hours without back to back bookings",
            min,
            hours.len()
        )));
    }
    if neighbors.iter().any(Option::is_some) && 2 * min > hours.len() {
        return Err(invalid(format!(
            "neighboring stages can't both get {} performances in {} hours",
            min,
            hours.len()
        )));
    }
    let slots = hours.len() * config.stages.len();
    let busiest = (slots as f64 * config.max_event_frequency).floor() as usize;
    if min * config.stages.len() > busiest {
        return Err(invalid(format!(
            "{} stages with {} performances each need more than the {} bookings of a busy day",
            config.stages.len(),
            min,
            busiest
        )));
    }
    Ok(())
}

fn invalid(message: String) -> ScheduleError {
    ScheduleError::InvalidConfig(message)
}
