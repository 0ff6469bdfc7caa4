use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar weekday a workout belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }

    /// Days counted from the Sunday that starts the week.
    pub fn offset(&self) -> i64 {
        match self {
            DayOfWeek::Sunday => 0,
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
        }
    }

    /// The days that carry a program, in generation order.
    pub fn training_days() -> impl Iterator<Item = DayOfWeek> {
        Self::ALL.into_iter().filter(|day| day_config(*day).is_some())
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid day: {s}"))
    }
}

/// Training category, independent of the calendar weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayType {
    Kickboxing,
    Boxing,
    Technique,
    Conditioning,
}

impl DayType {
    pub const ALL: [DayType; 4] = [
        DayType::Kickboxing,
        DayType::Boxing,
        DayType::Technique,
        DayType::Conditioning,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Kickboxing => "Kickboxing",
            DayType::Boxing => "Boxing",
            DayType::Technique => "Technique",
            DayType::Conditioning => "Conditioning",
        }
    }

    /// Static condition marking the exercise pinned to Station 3 position B, if this
    /// day type has one.
    pub fn station3_position_b_condition(&self) -> Option<StaticCondition> {
        match self {
            DayType::Kickboxing => Some(StaticCondition::KickboxingStation3B),
            DayType::Boxing => Some(StaticCondition::BoxingStation3B),
            DayType::Technique | DayType::Conditioning => None,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayType::ALL
            .into_iter()
            .find(|day_type| day_type.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid day type: {s}"))
    }
}

/// Station 1 focus tag of an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Focus {
    Upper,
    Lower,
    Mixed,
    #[serde(rename = "Full Body")]
    FullBody,
    Cardio,
    Abs,
}

impl Focus {
    pub const ALL: [Focus; 6] = [
        Focus::Upper,
        Focus::Lower,
        Focus::Mixed,
        Focus::FullBody,
        Focus::Cardio,
        Focus::Abs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Upper => "Upper",
            Focus::Lower => "Lower",
            Focus::Mixed => "Mixed",
            Focus::FullBody => "Full Body",
            Focus::Cardio => "Cardio",
            Focus::Abs => "Abs",
        }
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Focus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Focus::ALL
            .into_iter()
            .find(|focus| focus.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid focus: {s}"))
    }
}

/// Overall focus of a training day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    #[serde(rename = "Upper Body")]
    UpperBody,
    #[serde(rename = "Lower Body")]
    LowerBody,
    #[serde(rename = "Mixed/Full Body")]
    MixedFullBody,
    #[serde(rename = "Full Body")]
    FullBody,
    Cardio,
    Abs,
}

impl Filter {
    pub const ALL: [Filter; 6] = [
        Filter::UpperBody,
        Filter::LowerBody,
        Filter::MixedFullBody,
        Filter::FullBody,
        Filter::Cardio,
        Filter::Abs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::UpperBody => "Upper Body",
            Filter::LowerBody => "Lower Body",
            Filter::MixedFullBody => "Mixed/Full Body",
            Filter::FullBody => "Full Body",
            Filter::Cardio => "Cardio",
            Filter::Abs => "Abs",
        }
    }

    /// Station 1 focus used when picking exercises for a day with this filter.
    ///
    /// Upper/Lower body map to their focus; the specialized tags (Full Body, Cardio,
    /// Abs) pass through unchanged; anything else resolves to Mixed.
    pub fn station1_focus(&self) -> Focus {
        match self {
            Filter::UpperBody => Focus::Upper,
            Filter::LowerBody => Focus::Lower,
            Filter::FullBody => Focus::FullBody,
            Filter::Cardio => Focus::Cardio,
            Filter::Abs => Focus::Abs,
            Filter::MixedFullBody => Focus::Mixed,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Filter::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid filter: {s}"))
    }
}

/// Fixed placement rule for a static exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaticCondition {
    #[serde(rename = "kickboxing-station3-b")]
    KickboxingStation3B,
    #[serde(rename = "boxing-station3-b")]
    BoxingStation3B,
    #[serde(rename = "technique-station3")]
    TechniqueStation3,
    #[serde(rename = "conditioning-station3")]
    ConditioningStation3,
}

impl StaticCondition {
    pub const ALL: [StaticCondition; 4] = [
        StaticCondition::KickboxingStation3B,
        StaticCondition::BoxingStation3B,
        StaticCondition::TechniqueStation3,
        StaticCondition::ConditioningStation3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StaticCondition::KickboxingStation3B => "kickboxing-station3-b",
            StaticCondition::BoxingStation3B => "boxing-station3-b",
            StaticCondition::TechniqueStation3 => "technique-station3",
            StaticCondition::ConditioningStation3 => "conditioning-station3",
        }
    }
}

impl FromStr for StaticCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StaticCondition::ALL
            .into_iter()
            .find(|condition| condition.as_str() == s.trim())
            .ok_or_else(|| format!("Invalid static condition: {s}"))
    }
}

/// The two technique days whose Station 1 comes from tri-sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechniqueDay {
    Monday,
    Saturday,
}

/// Structural shape of a training day, selected once from the static schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayKind {
    /// Independent random picks for every station.
    RandomStation,
    /// Random Station 1/2, Station 3 fixed to Non-Stop Sparring.
    FixedDrill,
    /// Station 1 from a tri-set, Station 3 fixed to Non-Stop Sparring.
    Technique(TechniqueDay),
}

impl DayKind {
    pub fn station3_is_fixed(&self) -> bool {
        matches!(self, DayKind::FixedDrill | DayKind::Technique(_))
    }

    pub fn technique_day(&self) -> Option<TechniqueDay> {
        match self {
            DayKind::Technique(day) => Some(*day),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayConfig {
    pub day: DayOfWeek,
    pub day_type: DayType,
    pub filter: Filter,
    pub kind: DayKind,
}

/// Static weekly program. Friday carries no configuration and is never assembled.
pub fn day_config(day: DayOfWeek) -> Option<DayConfig> {
    let (day_type, filter, kind) = match day {
        DayOfWeek::Sunday => (DayType::Kickboxing, Filter::UpperBody, DayKind::RandomStation),
        DayOfWeek::Monday => (
            DayType::Technique,
            Filter::MixedFullBody,
            DayKind::Technique(TechniqueDay::Monday),
        ),
        DayOfWeek::Tuesday => (DayType::Boxing, Filter::UpperBody, DayKind::RandomStation),
        DayOfWeek::Wednesday => (DayType::Conditioning, Filter::LowerBody, DayKind::FixedDrill),
        DayOfWeek::Thursday => (
            DayType::Kickboxing,
            Filter::MixedFullBody,
            DayKind::RandomStation,
        ),
        DayOfWeek::Saturday => (
            DayType::Technique,
            Filter::LowerBody,
            DayKind::Technique(TechniqueDay::Saturday),
        ),
        DayOfWeek::Friday => return None,
    };

    Some(DayConfig {
        day,
        day_type,
        filter,
        kind,
    })
}

/// Station 3 on these days always resolves to Non-Stop Sparring.
pub fn is_fixed_station3_day(day: DayOfWeek) -> bool {
    day_config(day).is_some_and(|config| config.kind.station3_is_fixed())
}

/// Align any date to the Sunday that starts its week.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_sunday = date.weekday().num_days_from_sunday();
    date - Duration::days(days_from_sunday as i64)
}
