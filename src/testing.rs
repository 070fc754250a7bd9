//! Shared fixtures for unit tests.

use crate::catalog::Catalog;
use crate::config::{FestivalConfig, FestivalRules, SizeWindow};
use crate::data::{Artist, ArtistSize, Genre, Schedule, Slot};

pub fn default_rules() -> FestivalRules {
    FestivalRules::new(FestivalConfig::default()).unwrap()
}

/// Three bookings per stage of the default festival, never back to back,
/// neighbor pairs staggered, every size inside its window.
pub fn conflict_free_default() -> Schedule {
    let rules = default_rules();
    let mut schedule = rules.empty_schedule();
    let mut n = 0;
    let mut next_artist = |size: ArtistSize| {
        n += 1;
        Some(Artist::new(format!("Artist {}", n), size, Genre::Rap))
    };
    // hour indices: 12 -> 0, 17 -> 5, 22 -> 10
    for stage in [2, 3, 4] {
        for (hour, size) in [(0, ArtistSize::Small), (5, ArtistSize::Large), (10, ArtistSize::Large)] {
            schedule.set(Slot::new(hour, stage), next_artist(size));
        }
    }
    for (a, b) in [(0, 1), (5, 6)] {
        for (hour, size) in [(0, ArtistSize::Small), (4, ArtistSize::Medium), (8, ArtistSize::Large)] {
            schedule.set(Slot::new(hour, a), next_artist(size));
        }
        for (hour, size) in [(1, ArtistSize::Small), (5, ArtistSize::Medium), (10, ArtistSize::Large)] {
            schedule.set(Slot::new(hour, b), next_artist(size));
        }
    }
    schedule
}

/// Two unrelated stages from 12:00 to 17:00, any size at any hour.
pub fn two_stage_rules(max_repair_iterations: usize) -> FestivalRules {
    FestivalRules::new(FestivalConfig {
        first_hour: 12,
        last_hour: 17,
        stages: vec!["Main".to_string(), "Side".to_string()],
        neighbors: vec![],
        size_windows: vec![SizeWindow::new(12, 17, &ArtistSize::ALL)],
        max_repair_iterations,
        ..FestivalConfig::default()
    })
    .unwrap()
}

/// Six bookings on [`two_stage_rules`]; the only conflict is Side at 14:00 and 15:00.
pub fn one_conflict_two_stage(rules: &FestivalRules) -> Schedule {
    let mut schedule = rules.empty_schedule();
    let names = ["Saba", "Eggy", "Daya", "Sales", "IDK", "Lane 8"];
    let slots = [(0, 0), (2, 0), (4, 0), (0, 1), (2, 1), (3, 1)];
    for (name, (hour, stage)) in names.into_iter().zip(slots) {
        schedule.set(
            Slot::new(hour, stage),
            Some(Artist::new(name, ArtistSize::Small, Genre::Indie)),
        );
    }
    schedule
}

/// Plenty of artists, but every small act is Pop.
pub fn single_genre_small_acts() -> Catalog {
    let small = (0..40).map(|i| Artist::new(format!("Pop act {}", i), ArtistSize::Small, Genre::Pop));
    let rest = [ArtistSize::Medium, ArtistSize::Large].into_iter().flat_map(|size| {
        Genre::ALL.into_iter().flat_map(move |genre| {
            (0..20).map(move |i| Artist::new(format!("{} {} act {}", size, genre.title(), i), size, genre))
        })
    });
    Catalog::new(small.chain(rest))
}
