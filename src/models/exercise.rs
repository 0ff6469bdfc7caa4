use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::{DayType, Focus, StaticCondition};

/// Last words that end in "s" without being plurals.
const NON_PLURAL_ENDINGS: [&str; 8] = ["focus", "cross", "press", "bus", "plus", "us", "is", "as"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub station: u8,
    pub focus: Option<Focus>,
    pub day_type: DayType,
    pub is_static: bool,
    pub static_condition: Option<StaticCondition>,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Exercise {
    pub fn new(user_id: Uuid, name: &str, station: u8, day_type: DayType, focus: Option<Focus>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.trim().to_string(),
            station,
            focus,
            day_type,
            is_static: false,
            static_condition: None,
            last_used: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExerciseRequest {
    pub name: String,
    pub station: u8,
    pub focus: Option<Focus>,
    pub day_type: DayType,
    #[serde(default)]
    pub is_static: bool,
    pub static_condition: Option<StaticCondition>,
}

/// Catalog edit. Never carries `last_used`: usage is owned by the rotation ledger.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExerciseRequest {
    pub name: Option<String>,
    pub station: Option<u8>,
    pub focus: Option<Focus>,
    pub day_type: Option<DayType>,
    pub is_static: Option<bool>,
    pub static_condition: Option<StaticCondition>,
}

/// Catalog listing parameters as they arrive on the query string.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseListQuery {
    pub station: Option<u8>,
    pub day_type: Option<DayType>,
    /// Comma separated focus values; honored for Station 1 only.
    pub focus: Option<String>,
    #[serde(default)]
    pub dedupe: bool,
}

/// Structural filter over a user's catalog.
#[derive(Debug, Clone, Default)]
pub struct ExerciseQuery {
    pub station: Option<u8>,
    pub day_type: Option<DayType>,
    /// Empty means any focus.
    pub focus: Vec<Focus>,
    pub is_static: Option<bool>,
    pub static_condition: Option<StaticCondition>,
    pub only_ids: Option<HashSet<Uuid>>,
    pub exclude_ids: HashSet<Uuid>,
}

impl ExerciseQuery {
    pub fn station(station: u8) -> Self {
        Self {
            station: Some(station),
            ..Self::default()
        }
    }

    pub fn day_type(mut self, day_type: DayType) -> Self {
        self.day_type = Some(day_type);
        self
    }

    pub fn focus(mut self, focus: impl IntoIterator<Item = Focus>) -> Self {
        self.focus = focus.into_iter().collect();
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    pub fn static_condition(mut self, condition: StaticCondition) -> Self {
        self.static_condition = Some(condition);
        self
    }

    pub fn only(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.only_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn excluding<'a>(mut self, ids: impl IntoIterator<Item = &'a Uuid>) -> Self {
        self.exclude_ids.extend(ids);
        self
    }

    pub fn matches(&self, exercise: &Exercise) -> bool {
        if self.station.is_some_and(|station| exercise.station != station) {
            return false;
        }
        if self.day_type.is_some_and(|day_type| exercise.day_type != day_type) {
            return false;
        }
        if !self.focus.is_empty() && !exercise.focus.is_some_and(|focus| self.focus.contains(&focus)) {
            return false;
        }
        if self.is_static.is_some_and(|is_static| exercise.is_static != is_static) {
            return false;
        }
        if self.static_condition.is_some() && exercise.static_condition != self.static_condition {
            return false;
        }
        if let Some(only) = &self.only_ids {
            if !only.contains(&exercise.id) {
                return false;
            }
        }
        !self.exclude_ids.contains(&exercise.id)
    }
}

/// Display de-duplication key: trimmed, lowercased, and with a trailing plural "s"
/// on the last word folded away ("Flutter Kicks" == "flutter kick").
pub fn name_key(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut words: Vec<&str> = lowered.split_whitespace().collect();

    if let Some(last) = words.last_mut() {
        let word: &str = *last;
        if word.len() > 1 && word.ends_with('s') && !word.ends_with("ss") && !NON_PLURAL_ENDINGS.contains(&word) {
            *last = &word[..word.len() - 1];
        }
    }

    words.join(" ")
}

/// Label comparison that ignores case, hyphens and whitespace
/// ("Non-Stop Sparring" == "nonstop sparring").
pub fn label_key(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Keep the first exercise for every distinct [`name_key`], preserving order.
pub fn dedupe_by_name(exercises: Vec<Exercise>) -> Vec<Exercise> {
    let mut seen = HashSet::new();
    exercises
        .into_iter()
        .filter(|exercise| seen.insert(exercise.name_key()))
        .collect()
}
