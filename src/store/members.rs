use chrono::NaiveDate;
use tracing::{info, warn};

use super::{reorder_plan, sort_for_display, EntityStore};
use crate::availability::upsert_record;
use crate::error::Result;
use crate::models::{new_id, BandMember, MemberPatch, NewMember};

impl EntityStore {
    /// Every member in display order, availability included.
    pub fn members(&self) -> Result<Vec<BandMember>> {
        let mut members = self.gateway.list_members()?;
        sort_for_display(&mut members);
        Ok(members)
    }

    pub fn member(&self, id: &str) -> Result<Option<BandMember>> {
        Ok(self
            .gateway
            .list_members()?
            .into_iter()
            .find(|member| member.id == id))
    }

    pub fn create_member(&mut self, draft: NewMember) -> Result<BandMember> {
        let member = draft.into_member(new_id());
        self.gateway.insert_member(&member)?;
        info!(member_id = %member.id, name = %member.full_name(), "member created");
        Ok(member)
    }

    pub fn update_member(&mut self, id: &str, patch: &MemberPatch) -> Result<Option<BandMember>> {
        let updated = self.gateway.update_member(id, patch)?;
        match &updated {
            Some(_) => info!(member_id = %id, "member updated"),
            None => warn!(member_id = %id, "member update skipped: not found"),
        }
        Ok(updated)
    }

    pub fn delete_member(&mut self, id: &str) -> Result<bool> {
        let deleted = self.gateway.delete_member(id)?;
        if deleted {
            info!(member_id = %id, "member deleted");
        } else {
            warn!(member_id = %id, "member delete skipped: not found");
        }
        Ok(deleted)
    }

    pub fn reorder_members(&mut self, ids: &[String]) -> Result<Vec<BandMember>> {
        let current = self.members()?;
        for (id, order) in reorder_plan(&current, ids) {
            let patch = MemberPatch {
                order: Some(order),
                ..MemberPatch::default()
            };
            self.gateway.update_member(&id, &patch)?;
        }
        info!(count = current.len(), "members reordered");
        self.members()
    }

    /// Upsert the member's answer for `date` and persist the full list.
    pub fn set_availability(
        &mut self,
        member_id: &str,
        date: NaiveDate,
        available: bool,
    ) -> Result<Option<BandMember>> {
        let Some(member) = self.member(member_id)? else {
            warn!(%member_id, %date, "availability skipped: member not found");
            return Ok(None);
        };
        let mut availability = member.availability;
        upsert_record(&mut availability, date, available);
        let patch = MemberPatch {
            availability: Some(availability),
            ..MemberPatch::default()
        };
        let updated = self.gateway.update_member(member_id, &patch)?;
        info!(%member_id, %date, available, "availability recorded");
        Ok(updated)
    }
}
