use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

use crate::catalog::Catalog;
use crate::config::FestivalRules;
use crate::data::Schedule;
use crate::error::ScheduleError;
use crate::generator::{check_catalog, generate_initial_schedule};
use crate::repair::repair_schedule;

/// A conflict-free festival day.
#[derive(Debug, Clone)]
pub struct Solution {
    pub schedule: Schedule,
    pub restarts: u32,
    pub repair_attempts: usize,
}

/// Generates and repairs schedules until one comes out conflict-free.
///
/// Every restart starts over from a fresh random schedule; nothing carries
/// over from a failed run. Restarts are unbounded unless the config sets
/// `max_restarts`.
pub fn solve<R: Rng + ?Sized>(
    rules: &FestivalRules,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<Solution, ScheduleError> {
    let start_time = Instant::now();
    // bad configs fail here, not halfway through a repair
    check_catalog(catalog, rules)?;

    let mut restarts = 0;
    loop {
        let outcome = match generate_initial_schedule(rules, catalog, rng) {
            Ok(schedule) => repair_schedule(rules, schedule, rng),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(repaired) => {
                info!(
                    "Valid schedule found in {:.2?} after {} restarts",
                    start_time.elapsed(),
                    restarts
                );
                debug!("Final schedule:\n{}", repaired.schedule);
                return Ok(Solution {
                    schedule: repaired.schedule,
                    restarts,
                    repair_attempts: repaired.attempts,
                });
            }
            Err(e) if e.is_restartable() => {
                if rules.config().max_restarts.is_some_and(|max| restarts >= max) {
                    return Err(ScheduleError::RestartsExhausted { restarts });
                }
                restarts += 1;
                warn!("{}; starting over (restart {})", e, restarts);
            }
            Err(e) => return Err(e),
        }
    }
}

/// [`solve`] with a ChaCha generator. Without a seed one is drawn and logged so
/// the run can be reproduced.
pub fn solve_seeded(
    rules: &FestivalRules,
    catalog: &Catalog,
    seed: Option<u64>,
) -> Result<Solution, ScheduleError> {
    let seed = seed.unwrap_or_else(|| rand::rng().random());
    info!("Solving festival schedule with seed {}", seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    solve(rules, catalog, &mut rng)
}
