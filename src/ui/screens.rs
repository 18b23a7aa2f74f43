use chrono::{Datelike, NaiveDate};

use crate::calendar::{next_month, previous_month, sundays_in_month};
use crate::models::{BandMember, Category, INSTRUMENT_PALETTE};

use super::helpers::offset_index;

/// Which list of the schedule tab receives navigation keys.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum SchedulePane {
    #[default]
    Schedules,
    Songs,
    Band,
}

impl SchedulePane {
    pub(crate) fn next(self) -> Self {
        match self {
            SchedulePane::Schedules => SchedulePane::Songs,
            SchedulePane::Songs => SchedulePane::Band,
            SchedulePane::Band => SchedulePane::Schedules,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            SchedulePane::Schedules => SchedulePane::Band,
            SchedulePane::Songs => SchedulePane::Schedules,
            SchedulePane::Band => SchedulePane::Songs,
        }
    }
}

/// Cursor state of the schedule tab: the highlighted schedule and, inside it,
/// the highlighted song or band placement.
#[derive(Default)]
pub(crate) struct ScheduleScreen {
    pub(crate) selected: usize,
    pub(crate) pane: SchedulePane,
    pub(crate) entry: usize,
}

impl ScheduleScreen {
    pub(crate) fn move_schedule(&mut self, offset: isize, len: usize) {
        let next = offset_index(self.selected, offset, len);
        if next != self.selected {
            self.selected = next;
            self.entry = 0;
        }
    }

    pub(crate) fn move_entry(&mut self, offset: isize, len: usize) {
        self.entry = offset_index(self.entry, offset, len);
    }

    pub(crate) fn clamp(&mut self, schedules: usize, entries: usize) {
        self.selected = self.selected.min(schedules.saturating_sub(1));
        self.entry = self.entry.min(entries.saturating_sub(1));
    }

    pub(crate) fn cycle_pane(&mut self, forward: bool) {
        self.pane = if forward {
            self.pane.next()
        } else {
            self.pane.previous()
        };
        self.entry = 0;
    }
}

/// A list tab (songs or members) with an optional inline search.
#[derive(Default)]
pub(crate) struct ListScreen {
    pub(crate) selected: usize,
    pub(crate) filter: Option<String>,
}

impl ListScreen {
    pub(crate) fn query(&self) -> &str {
        self.filter.as_deref().unwrap_or("")
    }

    pub(crate) fn move_selection(&mut self, offset: isize, len: usize) {
        self.selected = offset_index(self.selected, offset, len);
    }

    pub(crate) fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    pub(crate) fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

/// Members whose full name contains `query`, ignoring case.
pub(crate) fn search_members<'a>(members: &'a [BandMember], query: &str) -> Vec<&'a BandMember> {
    let needle = query.to_lowercase();
    members
        .iter()
        .filter(|member| member.full_name().to_lowercase().contains(&needle))
        .collect()
}

/// The ids of `ids` with the entry at `index` swapped with its neighbour at
/// `index + offset`. `None` when the neighbour does not exist.
pub(crate) fn swapped_ids(mut ids: Vec<String>, index: usize, offset: isize) -> Option<Vec<String>> {
    let target = index as isize + offset;
    if index >= ids.len() || target < 0 || target as usize >= ids.len() {
        return None;
    }
    ids.swap(index, target as usize);
    Some(ids)
}

/// Picker for adding a song to a schedule.
pub(crate) struct SongPicker {
    pub(crate) schedule_id: String,
    pub(crate) query: String,
    pub(crate) category: Option<Category>,
    pub(crate) selected: usize,
}

impl SongPicker {
    pub(crate) fn new(schedule_id: String) -> Self {
        Self {
            schedule_id,
            query: String::new(),
            category: None,
            selected: 0,
        }
    }

    /// All categories, then each category in turn.
    pub(crate) fn cycle_category(&mut self) {
        self.category = match self.category {
            None => Some(Category::ALL[0]),
            Some(category) if category == Category::ALL[Category::ALL.len() - 1] => None,
            Some(category) => Some(category.cycle()),
        };
        self.selected = 0;
    }
}

/// Picker for adding a member to a schedule.
pub(crate) struct MemberPicker {
    pub(crate) schedule_id: String,
    pub(crate) query: String,
    pub(crate) instrument: Option<&'static str>,
    pub(crate) selected: usize,
}

impl MemberPicker {
    pub(crate) fn new(schedule_id: String) -> Self {
        Self {
            schedule_id,
            query: String::new(),
            instrument: None,
            selected: 0,
        }
    }

    /// Any instrument, then each palette entry in turn.
    pub(crate) fn cycle_instrument(&mut self) {
        self.instrument = match self.instrument {
            None => INSTRUMENT_PALETTE.first().copied(),
            Some(current) => INSTRUMENT_PALETTE
                .iter()
                .position(|tag| *tag == current)
                .and_then(|index| INSTRUMENT_PALETTE.get(index + 1))
                .copied(),
        };
        self.selected = 0;
    }
}

/// Second step of adding a member: which instrument they play that Sunday.
pub(crate) struct InstrumentPicker {
    pub(crate) schedule_id: String,
    pub(crate) member_id: String,
    pub(crate) member_name: String,
    pub(crate) options: Vec<String>,
    pub(crate) selected: usize,
}

impl InstrumentPicker {
    /// The member's own instruments, or the whole palette when they list none.
    pub(crate) fn new(schedule_id: String, member: &BandMember) -> Self {
        let options = if member.instruments.is_empty() {
            INSTRUMENT_PALETTE.iter().map(|tag| tag.to_string()).collect()
        } else {
            member.instruments.clone()
        };
        Self {
            schedule_id,
            member_id: member.id.clone(),
            member_name: member.full_name(),
            options,
            selected: 0,
        }
    }
}

/// Singer choice for one song placement. The first option clears the singer.
pub(crate) struct SingerPicker {
    pub(crate) schedule_id: String,
    pub(crate) schedule_item_id: String,
    pub(crate) song_name: String,
    pub(crate) options: Vec<String>,
    pub(crate) selected: usize,
}

impl SingerPicker {
    pub(crate) fn new(
        schedule_id: String,
        schedule_item_id: String,
        song_name: String,
        candidates: Vec<String>,
        current: &str,
    ) -> Self {
        let mut options = vec![String::new()];
        for name in candidates {
            if !options.contains(&name) {
                options.push(name);
            }
        }
        let selected = options.iter().position(|name| name == current).unwrap_or(0);
        Self {
            schedule_id,
            schedule_item_id,
            song_name,
            options,
            selected,
        }
    }
}

/// Month grid of one member's Sundays.
pub(crate) struct AvailabilityView {
    pub(crate) member_id: String,
    pub(crate) year: i32,
    /// Zero-based.
    pub(crate) month: u32,
    pub(crate) cursor: usize,
}

impl AvailabilityView {
    pub(crate) fn new(member_id: String, today: NaiveDate) -> Self {
        Self {
            member_id,
            year: today.year(),
            month: today.month0(),
            cursor: 0,
        }
    }

    pub(crate) fn sundays(&self) -> Vec<NaiveDate> {
        sundays_in_month(self.year, self.month)
    }

    pub(crate) fn current_date(&self) -> Option<NaiveDate> {
        self.sundays().get(self.cursor).copied()
    }

    pub(crate) fn move_cursor(&mut self, offset: isize) {
        self.cursor = offset_index(self.cursor, offset, self.sundays().len());
    }

    pub(crate) fn next_month(&mut self) {
        (self.year, self.month) = next_month(self.year, self.month);
        self.cursor = 0;
    }

    pub(crate) fn previous_month(&mut self) {
        (self.year, self.month) = previous_month(self.year, self.month);
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swapped_ids_respects_bounds() {
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(
            swapped_ids(ids.clone(), 1, -1),
            Some(vec!["b".to_string(), "a".to_string(), "c".to_string()])
        );
        assert_eq!(swapped_ids(ids.clone(), 0, -1), None);
        assert_eq!(swapped_ids(ids, 2, 1), None);
    }

    #[test]
    fn category_filter_cycles_back_to_all() {
        let mut picker = SongPicker::new("s".into());
        let mut seen = Vec::new();
        for _ in 0..=Category::ALL.len() {
            picker.cycle_category();
            seen.push(picker.category);
        }
        assert_eq!(seen.first(), Some(&Some(Category::Worship)));
        assert_eq!(seen.last(), Some(&None));
    }

    #[test]
    fn instrument_filter_walks_the_palette() {
        let mut picker = MemberPicker::new("s".into());
        for _ in 0..INSTRUMENT_PALETTE.len() {
            picker.cycle_instrument();
        }
        assert_eq!(picker.instrument, Some("KEYS"));
        picker.cycle_instrument();
        assert_eq!(picker.instrument, None);
    }

    #[test]
    fn singer_picker_starts_on_current_singer() {
        let picker = SingerPicker::new(
            "s".into(),
            "i".into(),
            "Hosanna".into(),
            vec!["Ana".into(), "Luis".into(), "Ana".into()],
            "Luis",
        );
        assert_eq!(picker.options, vec!["", "Ana", "Luis"]);
        assert_eq!(picker.selected, 2);
    }

    #[test]
    fn availability_view_wraps_years() {
        let mut view = AvailabilityView::new("m".into(), NaiveDate::from_ymd_opt(2024, 12, 3).unwrap());
        view.next_month();
        assert_eq!((view.year, view.month), (2025, 0));
        view.previous_month();
        view.previous_month();
        assert_eq!((view.year, view.month), (2024, 10));
    }
}
