use itertools::Itertools;
use log::warn;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::{HashMap, HashSet};

use crate::data::{Artist, ArtistSize, Genre};

/// The artists a festival can book, bucketed by size.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_size: HashMap<ArtistSize, Vec<Artist>>,
}

impl Catalog {
    /// Builds a catalog; a repeated name keeps its first entry.
    pub fn new(artists: impl IntoIterator<Item = Artist>) -> Self {
        let mut seen = HashSet::new();
        let by_size = artists
            .into_iter()
            .filter(|artist| {
                let fresh = seen.insert(artist.name.clone());
                if !fresh {
                    warn!("Ignoring duplicate catalog entry for '{}'", artist.name);
                }
                fresh
            })
            .map(|artist| (artist.size, artist))
            .into_group_map();
        Self { by_size }
    }

    /// The built-in festival lineup.
    pub fn lollapalooza() -> Self {
        use ArtistSize::{Large, Medium, Small};
        use Genre::{Edm, Indie, Pop, Rap};

        #[rustfmt::skip]
        let lineup: [(ArtistSize, Genre, &[&str]); 13] = [
            (Small, Indie, &[
                "Eddie", "Eggy", "Courtney Barnett", "Parcels", "Morgan Wade",
                "Sincere Engineer", "Blondshell", "Men I Trust", "Sales",
            ]),
            (Medium, Indie, &[
                "Couch", "Lawrence", "Beabadoobee", "Clairo", "Japanese Breakfast",
                "Phoebe Bridgers", "The 1975", "Madison Cunningham", "Beach House",
                "Faye Webster", "Rex Orange County", "Lizzy McAlpine", "The Marias",
                "Unknown Mortal Orchestra", "Peach Pitt", "Flipturn", "Mt. Joy",
            ]),
            (Large, Indie, &[
                "Bon Iver", "Hozier", "Noah Kahan", "Cage the Elephant", "Foster the People",
                "The Killers", "Tame Impala", "Florence + The Machine", "LCD Soundsystem",
                "MGMT", "Hippo Campus",
            ]),
            (Small, Pop, &[
                "Daya", "Charlotte Lawrence", "Audrey Mika", "CVBZ", "Lauren Spencer-Smith",
                "Sam Fischer", "Lyn Lapid", "JP Cooper",
            ]),
            (Medium, Pop, &[
                "Benee", "Ruel", "mxmtoon", "Victoria Monét", "J Balvin", "Ice Spice",
                "Omar Apollo", "Troye Sivan", "Charlie Puth", "Julia Michaels", "Bazzi",
                "Conan Gray", "Girl in Red", "RAYE", "dodie", "Teddy Swims",
            ]),
            (Large, Pop, &[
                "Sabrina Carpenter", "Taylor Swift", "Beyoncé", "Ariana Grande", "Ed Sheeran",
                "Billie Eilish", "The Weeknd", "Harry Styles", "Rihanna", "Bruno Mars",
                "Benson Boone", "Olivia Rodrigo",
            ]),
            (Small, Edm, &[
                "Flux Pavilion", "Bob Moses", "SG Lewis", "DJ Seinfeld", "Lane 8", "Mura Masa",
                "TOKiMONSTA", "Shallou",
            ]),
            (Medium, Edm, &[
                "Dom Dolla", "Louis The Child", "Diplo", "Illenium", "Fisher",
                "Alison Wonderland", "Kygo", "Marshmello", "Calvin Harris", "Porter Robinson",
                "Madeon", "Gesaffelstein",
            ]),
            (Large, Edm, &[
                "Zedd", "Martin Garrix", "Tiësto", "David Guetta", "Swedish House Mafia",
                "Armin van Buuren", "Skrillex", "Deadmau5", "Avicii", "Steve Aoki",
                "Eric Prydz", "ODESZA",
            ]),
            (Small, Rap, &[
                "Cordae", "EarthGang", "Saba", "Denzel Curry", "IDK", "Rapsody", "GoldLink",
                "Mick Jenkins",
            ]),
            (Medium, Rap, &[
                "Doja Cat", "Lil Baby", "Roddy Ricch", "Lil Tjay", "DaBaby", "Post Malone",
                "21 Savage", "Saweetie", "Gunna", "Jack Harlow", "Joey Bada$$", "Noname",
            ]),
            (Large, Rap, &[
                "Kendrick Lamar", "Jay-Z", "Future x Metro Boomin", "J Cole",
                "Tyler, The Creator", "Travis Scott", "Nicki Minaj", "Lil Wayne", "Cardi B",
            ]),
            (Large, Pop, &["SZA", "Doechii"]),
        ];

        Self::new(lineup.into_iter().flat_map(|(size, genre, names)| {
            names.iter().map(move |name| Artist::new(*name, size, genre))
        }))
    }

    pub fn bucket(&self, size: ArtistSize) -> &[Artist] {
        self.by_size.get(&size).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_size.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Uniformly random artist of `size`, with replacement. `None` if the bucket is empty.
    pub fn random_of_size<R: Rng + ?Sized>(&self, size: ArtistSize, rng: &mut R) -> Option<&Artist> {
        self.bucket(size).choose(rng)
    }

    pub fn find(&self, name: &str) -> Option<&Artist> {
        self.by_size.values().flatten().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn lineup_covers_every_size_and_genre() {
        let catalog = Catalog::lollapalooza();
        assert!(catalog.len() >= 90);
        for size in ArtistSize::ALL {
            for genre in Genre::ALL {
                assert!(
                    catalog.bucket(size).iter().any(|a| a.genre == genre),
                    "no {} {} artists",
                    size,
                    genre.title()
                );
            }
        }
    }

    #[test]
    fn sampling_stays_in_the_requested_bucket() {
        let catalog = Catalog::lollapalooza();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            let artist = catalog.random_of_size(ArtistSize::Large, &mut rng).unwrap();
            assert_eq!(artist.size, ArtistSize::Large);
        }
    }

    #[test]
    fn empty_bucket_samples_nothing() {
        let catalog = Catalog::new([Artist::new("Saba", ArtistSize::Small, Genre::Rap)]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(catalog.random_of_size(ArtistSize::Large, &mut rng).is_none());
        assert_eq!(catalog.bucket(ArtistSize::Large).len(), 0);
    }

    #[test]
    fn duplicate_names_keep_the_first_entry() {
        let catalog = Catalog::new([
            Artist::new("Saba", ArtistSize::Small, Genre::Rap),
            Artist::new("Saba", ArtistSize::Large, Genre::Pop),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find("Saba").map(|a| a.size), Some(ArtistSize::Small));
    }
}
