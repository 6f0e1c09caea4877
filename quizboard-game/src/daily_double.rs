//! Random placement of one daily double per category.
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::Serialize;
use sha2::Sha256;
use std::collections::BTreeSet;

use crate::board::{Board, ClueId};

/// Clues flagged as daily doubles for the current game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DailyDoubleMap {
    ids: BTreeSet<ClueId>,
}

impl DailyDoubleMap {
    #[must_use]
    pub fn contains(&self, id: ClueId) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ClueId> + '_ {
        self.ids.iter().copied()
    }

    /// The flagged clue in `category`, if any.
    #[must_use]
    pub fn in_category(&self, category: usize) -> Option<ClueId> {
        self.iter().find(|id| id.category() == Some(category))
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

impl FromIterator<ClueId> for DailyDoubleMap {
    fn from_iter<I: IntoIterator<Item = ClueId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

pub struct DailyDoubleAssigner;

impl DailyDoubleAssigner {
    /// Draw one clue uniformly per non-empty category.
    ///
    /// Categories are visited in board order and each consumes exactly one
    /// draw, so a scripted source yields a predictable assignment.
    pub fn assign<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> DailyDoubleMap {
        board
            .categories
            .iter()
            .enumerate()
            .filter(|(_, category)| !category.clues.is_empty())
            .map(|(index, category)| ClueId::grid(index, rng.gen_range(0..category.clues.len())))
            .collect()
    }
}

/// Derive an independent stream seed from a user seed and a domain tag.
pub(crate) fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
