//! Placement rules a festival schedule must satisfy.
//!
//! Each rule looks at one cell and reports at most one conflict. Rules run in a
//! fixed order and the first hit wins; a whole-schedule scan stops at the first
//! conflicting cell. Nothing here mutates the schedule.

use crate::config::FestivalRules;
use crate::data::{ConflictKind, Schedule, ScheduleConflict, Slot};

type Rule = fn(&FestivalRules, &Schedule, Slot) -> Option<ScheduleConflict>;

const RULES: [Rule; 4] = [
    stage_booked_consecutively,
    neighbor_booked_simultaneously,
    slot_free_and_stage_under_booked,
    size_window_violated,
];

/// First conflict in the schedule, scanning stage by stage and hour by hour.
pub fn first_conflict(rules: &FestivalRules, schedule: &Schedule) -> Option<ScheduleConflict> {
    (0..schedule.stage_count())
        .flat_map(|stage| (0..schedule.hour_count()).map(move |hour| Slot::new(hour, stage)))
        .find_map(|slot| check_slot(rules, schedule, slot))
}

/// First conflict involving a single cell.
pub fn check_slot(rules: &FestivalRules, schedule: &Schedule, slot: Slot) -> Option<ScheduleConflict> {
    RULES.iter().find_map(|rule| rule(rules, schedule, slot))
}

pub fn is_conflict_free(rules: &FestivalRules, schedule: &Schedule) -> bool {
    first_conflict(rules, schedule).is_none()
}

/// The same stage can't host two hours in a row. The last hour has no successor.
pub fn stage_booked_consecutively(
    _rules: &FestivalRules,
    schedule: &Schedule,
    slot: Slot,
) -> Option<ScheduleConflict> {
    if slot.hour + 1 >= schedule.hour_count() {
        return None;
    }
    let next = Slot::new(slot.hour + 1, slot.stage);
    schedule.get(slot)?;
    schedule.get(next)?;
    Some(ScheduleConflict::pair(
        ConflictKind::ConsecutiveBooking,
        schedule.concert(slot),
        schedule.concert(next),
    ))
}

/// Neighboring stages can't play in the same hour.
pub fn neighbor_booked_simultaneously(
    rules: &FestivalRules,
    schedule: &Schedule,
    slot: Slot,
) -> Option<ScheduleConflict> {
    schedule.get(slot)?;
    let neighbor = Slot::new(slot.hour, rules.neighbor_of(slot.stage)?);
    schedule.get(neighbor)?;
    Some(ScheduleConflict::pair(
        ConflictKind::NeighborsSimultaneous,
        schedule.concert(slot),
        schedule.concert(neighbor),
    ))
}

/// While a stage has fewer performances than the daily minimum, each of its
/// empty slots is a conflict on its own.
pub fn slot_free_and_stage_under_booked(
    rules: &FestivalRules,
    schedule: &Schedule,
    slot: Slot,
) -> Option<ScheduleConflict> {
    if schedule.get(slot).is_some() {
        return None;
    }
    if schedule.performances_on(slot.stage) >= rules.config().min_performances_per_stage {
        return None;
    }
    Some(ScheduleConflict::single(
        ConflictKind::UnderBookedStage,
        schedule.concert(slot),
    ))
}

/// Artists get bigger as the day goes on.
pub fn size_window_violated(
    rules: &FestivalRules,
    schedule: &Schedule,
    slot: Slot,
) -> Option<ScheduleConflict> {
    let artist = schedule.get(slot)?;
    if rules.allows(slot.hour, artist.size) {
        return None;
    }
    Some(ScheduleConflict::single(
        ConflictKind::SizeWindow,
        schedule.concert(slot),
    ))
}
