//! Availability reconciliation.
//!
//! Availability records are sparse: a member only has a record for the
//! Sundays they answered. What a missing record means depends on who asks,
//! and the two answers deliberately differ:
//!
//! | Policy               | Missing record means |
//! |----------------------|----------------------|
//! | `MemberDetail`       | available            |
//! | `ScheduleAssignment` | not available        |
//!
//! The member grid shows everyone as available until they opt out, while a
//! schedule only accepts members who explicitly opted in.

use chrono::NaiveDate;

use crate::calendar::sundays_in_month;
use crate::models::{AvailabilityRecord, BandMember};

/// How a missing availability record is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityPolicy {
    /// Member-detail grid: no answer counts as available.
    MemberDetail,
    /// Schedule assignment: only an explicit "available" counts.
    ScheduleAssignment,
}

impl AvailabilityPolicy {
    pub fn default_when_absent(self) -> bool {
        match self {
            AvailabilityPolicy::MemberDetail => true,
            AvailabilityPolicy::ScheduleAssignment => false,
        }
    }
}

/// The member's record for `date`, if they answered for it.
pub fn record_for(member: &BandMember, date: NaiveDate) -> Option<&AvailabilityRecord> {
    member
        .availability
        .iter()
        .find(|record| record.date == date)
}

/// Effective availability of `member` on `date` under `policy`.
pub fn is_available(member: &BandMember, date: NaiveDate, policy: AvailabilityPolicy) -> bool {
    record_for(member, date)
        .map(|record| record.available)
        .unwrap_or_else(|| policy.default_when_absent())
}

/// Value a toggle in the member-detail grid switches to.
pub fn toggled_availability(member: &BandMember, date: NaiveDate) -> bool {
    !is_available(member, date, AvailabilityPolicy::MemberDetail)
}

/// Replace the record for `date` or append a new one. Keeps at most one record
/// per date.
pub fn upsert_record(records: &mut Vec<AvailabilityRecord>, date: NaiveDate, available: bool) {
    match records.iter_mut().find(|record| record.date == date) {
        Some(record) => record.available = available,
        None => records.push(AvailabilityRecord { date, available }),
    }
}

/// Member-detail grid for one month: every Sunday with its effective
/// availability (zero-based `month`).
pub fn month_availability(member: &BandMember, year: i32, month: u32) -> Vec<AvailabilityRecord> {
    sundays_in_month(year, month)
        .into_iter()
        .map(|date| AvailabilityRecord {
            date,
            available: is_available(member, date, AvailabilityPolicy::MemberDetail),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(records: Vec<AvailabilityRecord>) -> BandMember {
        BandMember {
            id: "m1".into(),
            first_name: "Ana".into(),
            last_name: "Martínez".into(),
            instruments: vec!["VOX3".into(), "AG".into()],
            availability: records,
            order: None,
        }
    }

    #[test]
    fn missing_record_depends_on_policy() {
        let ana = member(Vec::new());
        let sunday = date(2024, 6, 2);
        assert!(is_available(&ana, sunday, AvailabilityPolicy::MemberDetail));
        assert!(!is_available(
            &ana,
            sunday,
            AvailabilityPolicy::ScheduleAssignment
        ));
    }

    #[test]
    fn explicit_record_wins_under_both_policies() {
        let sunday = date(2024, 6, 2);
        let ana = member(vec![AvailabilityRecord {
            date: sunday,
            available: true,
        }]);
        assert!(is_available(&ana, sunday, AvailabilityPolicy::ScheduleAssignment));

        let ana = member(vec![AvailabilityRecord {
            date: sunday,
            available: false,
        }]);
        assert!(!is_available(&ana, sunday, AvailabilityPolicy::MemberDetail));
    }

    #[test]
    fn toggle_flips_implied_true_to_false() {
        let sunday = date(2024, 6, 9);
        let mut ana = member(Vec::new());
        assert!(!toggled_availability(&ana, sunday));

        upsert_record(&mut ana.availability, sunday, false);
        assert!(toggled_availability(&ana, sunday));
    }

    #[test]
    fn upsert_replaces_same_date() {
        let sunday = date(2024, 6, 2);
        let mut records = Vec::new();
        upsert_record(&mut records, sunday, true);
        upsert_record(&mut records, sunday, false);
        upsert_record(&mut records, date(2024, 6, 9), true);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            AvailabilityRecord {
                date: sunday,
                available: false
            }
        );
    }

    #[test]
    fn month_grid_defaults_to_available() {
        let ana = member(vec![AvailabilityRecord {
            date: date(2024, 6, 16),
            available: false,
        }]);
        let grid = month_availability(&ana, 2024, 5);
        assert_eq!(grid.len(), 5);
        let unavailable: Vec<_> = grid
            .iter()
            .filter(|record| !record.available)
            .map(|record| record.date)
            .collect();
        assert_eq!(unavailable, vec![date(2024, 6, 16)]);
    }
}
