use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use uuid::Uuid;

use crate::models::{Exercise, TriSet};

/// Lookback during which a used item counts as recent.
pub const FRESHNESS_WINDOW_DAYS: i64 = 28;

/// Fresh tri-sets needed before stale ones are ignored.
pub const TRI_SET_MIN_FRESH: usize = 2;

/// Anything that rotates through the freshness window.
pub trait Rotating {
    fn rotation_id(&self) -> Uuid;
    fn last_used(&self) -> Option<DateTime<Utc>>;
}

impl Rotating for Exercise {
    fn rotation_id(&self) -> Uuid {
        self.id
    }

    fn last_used(&self) -> Option<DateTime<Utc>> {
        self.last_used
    }
}

impl Rotating for TriSet {
    fn rotation_id(&self) -> Uuid {
        self.id
    }

    fn last_used(&self) -> Option<DateTime<Utc>> {
        self.last_used
    }
}

pub fn is_fresh(last_used: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    last_used.map_or(true, |used| used < now - Duration::days(FRESHNESS_WINDOW_DAYS))
}

/// Outcome of a pick.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<T> {
    /// No candidate survived the exclusion set.
    Exhausted,
    /// Up to the requested count; `relaxed` when recent items were allowed back in.
    Picked { items: Vec<T>, relaxed: bool },
}

impl<T> Selection<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Selection::Exhausted => Vec::new(),
            Selection::Picked { items, .. } => items,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Selection::Exhausted)
    }
}

/// Freshness-windowed random picker over an injectable generator.
#[derive(Debug)]
pub struct SlotSelector {
    rng: Mutex<StdRng>,
}

impl SlotSelector {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng: Mutex::new(rng) }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    /// Pick `count` items outside `exclude`. Only fresh items are considered
    /// while at least `min_fresh` of them exist; otherwise the whole
    /// exclusion-filtered set is used. Exclusion is never relaxed.
    pub fn pick<T: Rotating>(
        &self,
        candidates: Vec<T>,
        count: usize,
        min_fresh: usize,
        exclude: &HashSet<Uuid>,
        now: DateTime<Utc>,
    ) -> Selection<T> {
        let allowed: Vec<T> = candidates
            .into_iter()
            .filter(|candidate| !exclude.contains(&candidate.rotation_id()))
            .collect();

        if allowed.is_empty() {
            return Selection::Exhausted;
        }

        let fresh_count = allowed.iter().filter(|c| is_fresh(c.last_used(), now)).count();
        let relaxed = fresh_count < min_fresh.max(1);
        let mut pool: Vec<T> = if relaxed {
            allowed
        } else {
            allowed.into_iter().filter(|c| is_fresh(c.last_used(), now)).collect()
        };

        {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            pool.shuffle(&mut *rng);
        }
        pool.truncate(count);

        Selection::Picked { items: pool, relaxed }
    }

    /// Exercise policy: fall back once fewer than `count` are fresh.
    pub fn pick_exercises(
        &self,
        candidates: Vec<Exercise>,
        count: usize,
        exclude: &HashSet<Uuid>,
    ) -> Selection<Exercise> {
        self.pick(candidates, count, count, exclude, Utc::now())
    }

    /// Tri-set policy: one winner, fall back below two fresh candidates.
    pub fn pick_tri_set(&self, candidates: Vec<TriSet>, exclude: &HashSet<Uuid>) -> Option<TriSet> {
        self.pick(candidates, 1, TRI_SET_MIN_FRESH, exclude, Utc::now())
            .into_items()
            .pop()
    }
}

impl Default for SlotSelector {
    fn default() -> Self {
        Self::new(None)
    }
}
