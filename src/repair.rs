//! Local search that swaps conflicting bookings around until none are left.

use log::{debug, info, trace};
use rand::Rng;

use crate::config::FestivalRules;
use crate::conflicts::{check_slot, first_conflict};
use crate::data::{Schedule, ScheduleConflict, Slot};
use crate::error::ScheduleError;

/// A conflict-free schedule and what it took to get there.
#[derive(Debug, Clone)]
pub struct Repaired {
    pub schedule: Schedule,
    pub attempts: usize,
    pub accepted: usize,
}

/// Repeatedly takes the first conflict, swaps one of its concerts with a
/// random slot and keeps the swap if it cleared both touched slots, or at
/// random with the configured acceptance probability.
///
/// Fails with [`ScheduleError::NonConvergence`] once the attempt bound is hit
/// while a conflict remains. The partial result is dropped.
pub fn repair_schedule<R: Rng + ?Sized>(
    rules: &FestivalRules,
    schedule: Schedule,
    rng: &mut R,
) -> Result<Repaired, ScheduleError> {
    rules.check_layout(&schedule)?;
    let config = rules.config();
    let mut working = schedule;
    let mut attempts = 0;
    let mut accepted = 0;

    loop {
        let Some(conflict) = first_conflict(rules, &working) else {
            info!(
                "No conflicts remaining after {} attempts ({} swaps kept)",
                attempts, accepted
            );
            return Ok(Repaired {
                schedule: working,
                attempts,
                accepted,
            });
        };
        if attempts >= config.max_repair_iterations {
            debug!("Giving up on {}", conflict);
            return Err(ScheduleError::NonConvergence { attempts });
        }
        attempts += 1;

        if let Some(candidate) = attempt_swap(rules, &working, &conflict, rng) {
            working = candidate;
            accepted += 1;
        }
    }
}

/// Swaps one concert of `conflict` with a random slot. Returns the new
/// schedule if the swap is kept: both touched cells came out clean, or the
/// escape draw came up.
fn attempt_swap<R: Rng + ?Sized>(
    rules: &FestivalRules,
    working: &Schedule,
    conflict: &ScheduleConflict,
    rng: &mut R,
) -> Option<Schedule> {
    let source = if rng.random_bool(0.5) {
        conflict.first.slot
    } else {
        conflict.second.slot
    };
    let target = Slot::new(
        rng.random_range(0..working.hour_count()),
        rng.random_range(0..working.stage_count()),
    );

    let mut candidate = working.clone();
    candidate.swap(source, target);

    let resolved = check_slot(rules, &candidate, source).is_none()
        && check_slot(rules, &candidate, target).is_none();
    let escape = rng.random_bool(rules.config().acceptance_probability);
    trace!(
        "Swapping {:?} with {:?} due to {} (resolved: {}, escape: {})",
        source, target, conflict, resolved, escape
    );

    (resolved || escape).then_some(candidate)
}
