use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::DayOfWeek;

/// A weekday the user has taken out of a given week's program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedDay {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start_date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub created_at: DateTime<Utc>,
}

impl BlockedDay {
    pub fn new(user_id: Uuid, week_start_date: NaiveDate, day_of_week: DayOfWeek) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            week_start_date,
            day_of_week,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedDayRequest {
    pub week_start_date: NaiveDate,
    pub day_of_week: DayOfWeek,
}
