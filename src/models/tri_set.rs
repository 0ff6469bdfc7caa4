use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::{DayOfWeek, Focus, TechniqueDay};

/// Exercises per tri-set phase, in grid order A, B, C.
pub const TRI_SET_SIZE: usize = 3;

/// Which technique day a tri-set serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriSetFocus {
    /// Monday.
    Mixed,
    /// Saturday.
    Lower,
}

impl TriSetFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriSetFocus::Mixed => "Mixed",
            TriSetFocus::Lower => "Lower",
        }
    }

    pub fn for_day(day: TechniqueDay) -> Self {
        match day {
            TechniqueDay::Monday => TriSetFocus::Mixed,
            TechniqueDay::Saturday => TriSetFocus::Lower,
        }
    }

    pub fn day(&self) -> DayOfWeek {
        match self {
            TriSetFocus::Mixed => DayOfWeek::Monday,
            TriSetFocus::Lower => DayOfWeek::Saturday,
        }
    }

    /// Exercise focus values a member exercise may carry.
    pub fn accepted_exercise_focus(&self) -> &'static [Focus] {
        match self {
            TriSetFocus::Mixed => &[Focus::Mixed, Focus::FullBody],
            TriSetFocus::Lower => &[Focus::Lower],
        }
    }
}

impl fmt::Display for TriSetFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriSetFocus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Mixed" | "mixed" => Ok(TriSetFocus::Mixed),
            "Lower" | "lower" => Ok(TriSetFocus::Lower),
            other => Err(format!("Invalid tri-set focus: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriSetShape {
    SinglePhase,
    DualPhase,
}

/// Shape a caller needs from tri-set candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRequirement {
    Any,
    SinglePhase,
    DualPhase,
}

impl ShapeRequirement {
    pub fn accepts(&self, shape: TriSetShape) -> bool {
        match self {
            ShapeRequirement::Any => true,
            ShapeRequirement::SinglePhase => shape == TriSetShape::SinglePhase,
            ShapeRequirement::DualPhase => shape == TriSetShape::DualPhase,
        }
    }
}

/// A member exercise as stored on a tri-set: reference plus name snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriSetMember {
    pub exercise_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriSet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub focus: TriSetFocus,
    pub name: String,
    pub concept: String,
    pub phase1: Vec<TriSetMember>,
    pub phase2: Vec<TriSetMember>,
    pub last_used: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TriSet {
    /// `None` for a malformed record (phase 1 not exactly 3, phase 2 neither 0 nor 3).
    pub fn shape(&self) -> Option<TriSetShape> {
        if self.phase1.len() != TRI_SET_SIZE {
            return None;
        }
        match self.phase2.len() {
            0 => Some(TriSetShape::SinglePhase),
            TRI_SET_SIZE => Some(TriSetShape::DualPhase),
            _ => None,
        }
    }

    /// The group that follows Monday's fixed drill: Phase 2 when present, else Phase 1.
    pub fn technique_group(&self) -> &[TriSetMember] {
        if self.phase2.len() == TRI_SET_SIZE {
            &self.phase2
        } else {
            &self.phase1
        }
    }

    pub fn exercise_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.phase1.iter().chain(self.phase2.iter()).map(|member| member.exercise_id)
    }

    /// Concept when set, otherwise the Phase 1 names joined in order.
    pub fn display_name(&self) -> String {
        if !self.concept.trim().is_empty() {
            return self.concept.trim().to_string();
        }
        if !self.name.trim().is_empty() {
            return self.name.trim().to_string();
        }
        self.phase1
            .iter()
            .map(|member| member.name.as_str())
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTriSetRequest {
    pub focus: TriSetFocus,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub concept: String,
    pub exercise_ids: Vec<Uuid>,
    #[serde(default)]
    pub phase2_exercise_ids: Vec<Uuid>,
}
