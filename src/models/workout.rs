use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::exercise::Exercise;
use super::schedule::{DayConfig, DayOfWeek, DayType, Filter};
use super::tri_set::TriSetMember;

pub const SLOTS_PER_GROUP: usize = 3;

/// One exercise slot: reference plus the name at assignment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub exercise_id: Uuid,
    pub name: String,
}

impl From<&Exercise> for Slot {
    fn from(exercise: &Exercise) -> Self {
        Slot {
            exercise_id: exercise.id,
            name: exercise.name.clone(),
        }
    }
}

impl From<&TriSetMember> for Slot {
    fn from(member: &TriSetMember) -> Self {
        Slot {
            exercise_id: member.exercise_id,
            name: member.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station1 {
    pub phase1: Vec<Slot>,
    pub phase2: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: DayOfWeek,
    pub day_type: DayType,
    pub filter: Filter,
    pub week_start_date: NaiveDate,
    pub station1: Station1,
    pub station2: Vec<Slot>,
    pub station3: Vec<Slot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workout {
    pub fn new(user_id: Uuid, config: &DayConfig, week_start_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            day_of_week: config.day,
            day_type: config.day_type,
            filter: config.filter,
            week_start_date,
            station1: Station1::default(),
            station2: Vec::new(),
            station3: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.station1
            .phase1
            .iter()
            .chain(self.station1.phase2.iter())
            .chain(self.station2.iter())
            .chain(self.station3.iter())
    }

    pub fn exercise_ids(&self) -> HashSet<Uuid> {
        self.slots().map(|slot| slot.exercise_id).collect()
    }

    /// Ids of every slot except `address`.
    pub fn exercise_ids_except(&self, address: SlotAddress) -> HashSet<Uuid> {
        SlotGroup::ALL
            .iter()
            .flat_map(|group| {
                self.group(*group)
                    .iter()
                    .enumerate()
                    .filter(move |(index, _)| !(address.group == *group && address.index == *index))
                    .map(|(_, slot)| slot.exercise_id)
            })
            .collect()
    }

    pub fn group(&self, group: SlotGroup) -> &Vec<Slot> {
        match group {
            SlotGroup::Station1Phase1 => &self.station1.phase1,
            SlotGroup::Station1Phase2 => &self.station1.phase2,
            SlotGroup::Station2 => &self.station2,
            SlotGroup::Station3 => &self.station3,
        }
    }

    pub fn group_mut(&mut self, group: SlotGroup) -> &mut Vec<Slot> {
        match group {
            SlotGroup::Station1Phase1 => &mut self.station1.phase1,
            SlotGroup::Station1Phase2 => &mut self.station1.phase2,
            SlotGroup::Station2 => &mut self.station2,
            SlotGroup::Station3 => &mut self.station3,
        }
    }

    pub fn slot(&self, address: SlotAddress) -> Option<&Slot> {
        self.group(address.group).get(address.index)
    }
}

/// A station (and, for Station 1, phase) holding three slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotGroup {
    Station1Phase1,
    Station1Phase2,
    Station2,
    Station3,
}

impl SlotGroup {
    pub const ALL: [SlotGroup; 4] = [
        SlotGroup::Station1Phase1,
        SlotGroup::Station1Phase2,
        SlotGroup::Station2,
        SlotGroup::Station3,
    ];

    pub fn station(&self) -> u8 {
        match self {
            SlotGroup::Station1Phase1 | SlotGroup::Station1Phase2 => 1,
            SlotGroup::Station2 => 2,
            SlotGroup::Station3 => 3,
        }
    }
}

/// Validated slot coordinates within a workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotAddress {
    pub group: SlotGroup,
    pub index: usize,
}

impl SlotAddress {
    /// Station 1..=3, slot 0..=2; phase 2 selects Station 1 Phase 2, anything else Phase 1.
    pub fn new(station: u8, phase: Option<u8>, index: usize) -> Result<Self, String> {
        let group = match (station, phase) {
            (1, Some(2)) => SlotGroup::Station1Phase2,
            (1, None | Some(1)) => SlotGroup::Station1Phase1,
            (1, Some(other)) => return Err(format!("Invalid phase {other} (1 or 2)")),
            (2, _) => SlotGroup::Station2,
            (3, _) => SlotGroup::Station3,
            (other, _) => return Err(format!("Invalid station {other} (1, 2, or 3)")),
        };

        if index >= SLOTS_PER_GROUP {
            return Err(format!("Invalid slotIndex {index} (0, 1, or 2)"));
        }

        Ok(Self { group, index })
    }

    pub fn station(&self) -> u8 {
        self.group.station()
    }
}

/// Finds a workout either by id or by its (week, day) coordinates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutLocator {
    pub id: Option<Uuid>,
    pub week_start_date: Option<NaiveDate>,
    pub day_of_week: Option<DayOfWeek>,
}

impl WorkoutLocator {
    pub fn new(id: Option<Uuid>, week_start_date: Option<NaiveDate>, day_of_week: Option<DayOfWeek>) -> Self {
        Self {
            id,
            week_start_date,
            day_of_week,
        }
    }

    pub fn by_id(id: Uuid) -> Self {
        Self::new(Some(id), None, None)
    }

    pub fn by_day(week_start_date: NaiveDate, day_of_week: DayOfWeek) -> Self {
        Self::new(None, Some(week_start_date), Some(day_of_week))
    }
}

/// New value for a slot: an existing exercise or a free-text name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
    ExerciseId(Uuid),
    ExerciseName(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateDayRequest {
    pub day_of_week: DayOfWeek,
    pub week_start_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWeekRequest {
    pub week_start_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekQuery {
    pub week_start_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceSlotRequest {
    pub station: u8,
    pub phase: Option<u8>,
    pub slot_index: usize,
    pub exercise_id: Option<Uuid>,
    pub exercise_name: Option<String>,
    pub week_start_date: Option<NaiveDate>,
    pub day_of_week: Option<DayOfWeek>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegenerateSlotRequest {
    pub station: u8,
    pub phase: Option<u8>,
    pub slot_index: usize,
    pub week_start_date: Option<NaiveDate>,
    pub day_of_week: Option<DayOfWeek>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTriSetRequest {
    pub tri_set_id: Uuid,
    pub week_start_date: Option<NaiveDate>,
    pub day_of_week: Option<DayOfWeek>,
}
