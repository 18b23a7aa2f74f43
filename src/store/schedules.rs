use tracing::{info, warn};

use super::EntityStore;
use crate::error::Result;
use crate::models::{new_id, NewSchedule, SchedulePatch, SundaySchedule};

impl EntityStore {
    /// Every schedule, ascending by date. Same-day schedules keep storage
    /// order.
    pub fn schedules(&self) -> Result<Vec<SundaySchedule>> {
        let mut schedules = self.gateway.list_schedules()?;
        schedules.sort_by_key(|schedule| schedule.date);
        Ok(schedules)
    }

    pub fn create_schedule(&mut self, draft: NewSchedule) -> Result<SundaySchedule> {
        let schedule = draft.into_schedule(new_id());
        self.gateway.insert_schedule(&schedule)?;
        info!(schedule_id = %schedule.id, date = %schedule.date, "schedule created");
        Ok(schedule)
    }

    pub fn update_schedule(
        &mut self,
        id: &str,
        patch: &SchedulePatch,
    ) -> Result<Option<SundaySchedule>> {
        let updated = self.gateway.update_schedule(id, patch)?;
        match &updated {
            Some(_) => info!(schedule_id = %id, "schedule updated"),
            None => warn!(schedule_id = %id, "schedule update skipped: not found"),
        }
        Ok(updated)
    }

    pub fn delete_schedule(&mut self, id: &str) -> Result<bool> {
        let deleted = self.gateway.delete_schedule(id)?;
        if deleted {
            info!(schedule_id = %id, "schedule deleted");
        } else {
            warn!(schedule_id = %id, "schedule delete skipped: not found");
        }
        Ok(deleted)
    }
}
