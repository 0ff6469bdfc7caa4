use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{WorkoutError, WorkoutResult};
use crate::models::{day_config, week_start, BlockedDay, DayOfWeek};
use crate::repository::Store;

/// Weekdays a user has taken out of a week; week generation skips them.
#[derive(Clone)]
pub struct BlockedDayService {
    store: Arc<dyn Store>,
}

impl BlockedDayService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(&self, user_id: Uuid, week_start_date: NaiveDate) -> WorkoutResult<Vec<BlockedDay>> {
        Ok(self
            .store
            .list_blocked_days(user_id, week_start(week_start_date))
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn block(&self, user_id: Uuid, week_start_date: NaiveDate, day: DayOfWeek) -> WorkoutResult<BlockedDay> {
        if day_config(day).is_none() {
            return Err(WorkoutError::validation(format!("{day} has no workout to block")));
        }

        let blocked = self
            .store
            .insert_blocked_day(&BlockedDay::new(user_id, week_start(week_start_date), day))
            .await?;
        info!(%day, week = %blocked.week_start_date, "day blocked");
        Ok(blocked)
    }

    #[instrument(skip(self))]
    pub async fn unblock(&self, user_id: Uuid, week_start_date: NaiveDate, day: DayOfWeek) -> WorkoutResult<()> {
        if !self
            .store
            .delete_blocked_day(user_id, week_start(week_start_date), day)
            .await?
        {
            return Err(WorkoutError::not_found("Blocked day not found"));
        }
        Ok(())
    }
}
