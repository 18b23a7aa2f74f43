use std::mem;

use anyhow::{bail, Result};
use chrono::NaiveDate;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use crate::availability::month_availability;
use crate::calendar::{group_by_month, month_year_label, sunday_label, Locale};
use crate::dashboard::{Dashboard, DragLocation};
use crate::error::DashboardError;
use crate::models::{BandMember, LeaderRole, Song, SundaySchedule};

use super::forms::{role_label, ConfirmDelete, LeadersForm, MemberForm, SongForm};
use super::helpers::{centered_rect, key_hints, offset_index, surface_error};
use super::screens::{
    search_members, swapped_ids, AvailabilityView, InstrumentPicker, ListScreen, MemberPicker,
    SchedulePane, ScheduleScreen, SingerPicker, SongPicker,
};

/// Footer space: a border line, the status line, and key hints.
const FOOTER_HEIGHT: u16 = 4;
const PAGE: isize = 5;
const TAB_TITLES: [&str; 3] = ["1 Schedules", "2 Songs", "3 Members"];
const POINTER: &str = "▶ ";

/// Top-level tabs.
#[derive(Copy, Clone, PartialEq, Eq)]
enum Tab {
    Schedules,
    Songs,
    Members,
}

impl Tab {
    fn index(self) -> usize {
        match self {
            Tab::Schedules => 0,
            Tab::Songs => 1,
            Tab::Members => 2,
        }
    }
}

/// Modal state layered over the current tab.
enum Mode {
    Normal,
    Searching(SearchState),
    SongForm {
        id: Option<String>,
        form: SongForm,
    },
    MemberForm {
        id: Option<String>,
        form: MemberForm,
    },
    LeadersForm {
        schedule_id: String,
        form: LeadersForm,
    },
    PickingSong(SongPicker),
    PickingMember(MemberPicker),
    PickingInstrument(InstrumentPicker),
    PickingSinger(SingerPicker),
    Availability(AvailabilityView),
    Confirming(ConfirmDelete),
}

#[derive(Copy, Clone)]
enum SearchTarget {
    Songs,
    Members,
}

struct SearchState {
    target: SearchTarget,
    query: String,
}

struct StatusMessage {
    text: String,
    kind: StatusKind,
}

enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Application state shared across the TUI.
pub struct App {
    dashboard: Dashboard,
    locale: Locale,
    today: NaiveDate,
    tab: Tab,
    schedules: ScheduleScreen,
    songs: ListScreen,
    members: ListScreen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(dashboard: Dashboard, locale: Locale, today: NaiveDate) -> Self {
        let mut app = Self {
            dashboard,
            locale,
            today,
            tab: Tab::Schedules,
            schedules: ScheduleScreen::default(),
            songs: ListScreen::default(),
            members: ListScreen::default(),
            mode: Mode::Normal,
            status: None,
        };
        app.select_first_upcoming();
        app
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::SongForm { id, form } => self.handle_song_form(code, id, form),
            Mode::MemberForm { id, form } => self.handle_member_form(code, id, form),
            Mode::LeadersForm { schedule_id, form } => {
                self.handle_leaders_form(code, schedule_id, form)
            }
            Mode::PickingSong(picker) => self.handle_song_picker(code, picker),
            Mode::PickingMember(picker) => self.handle_member_picker(code, picker),
            Mode::PickingInstrument(picker) => self.handle_instrument_picker(code, picker),
            Mode::PickingSinger(picker) => self.handle_singer_picker(code, picker),
            Mode::Availability(view) => self.handle_availability(code, view),
            Mode::Confirming(confirm) => self.handle_confirm(code, confirm),
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
                return Ok(Mode::Normal);
            }
            KeyCode::Char('1') => return Ok(self.switch_tab(Tab::Schedules)),
            KeyCode::Char('2') => return Ok(self.switch_tab(Tab::Songs)),
            KeyCode::Char('3') => return Ok(self.switch_tab(Tab::Members)),
            _ => {}
        }

        Ok(match self.tab {
            Tab::Schedules => self.handle_schedule_key(code),
            Tab::Songs => self.handle_songs_key(code),
            Tab::Members => self.handle_members_key(code),
        })
    }

    fn switch_tab(&mut self, tab: Tab) -> Mode {
        self.tab = tab;
        self.clear_status();
        Mode::Normal
    }

    // Schedules tab

    fn handle_schedule_key(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Up => self.move_in_pane(-1),
            KeyCode::Down => self.move_in_pane(1),
            KeyCode::PageUp => self.move_in_pane(-PAGE),
            KeyCode::PageDown => self.move_in_pane(PAGE),
            KeyCode::Tab => self.schedules.cycle_pane(true),
            KeyCode::BackTab => self.schedules.cycle_pane(false),
            KeyCode::Char('n') => self.add_next_sunday(),
            KeyCode::Char('s') => {
                if let Some(schedule) = self.require_schedule() {
                    return Mode::PickingSong(SongPicker::new(schedule.id));
                }
            }
            KeyCode::Char('b') => {
                if let Some(schedule) = self.require_schedule() {
                    return Mode::PickingMember(MemberPicker::new(schedule.id));
                }
            }
            KeyCode::Char('l') => {
                if let Some(schedule) = self.require_schedule() {
                    return Mode::LeadersForm {
                        form: LeadersForm::from_leaders(&schedule.leaders),
                        schedule_id: schedule.id,
                    };
                }
            }
            KeyCode::Char('x') => {
                if let Some(schedule) = self.require_schedule() {
                    return Mode::Confirming(ConfirmDelete::Schedule {
                        label: sunday_label(schedule.date, self.locale),
                        id: schedule.id,
                    });
                }
            }
            KeyCode::Char('v') => {
                if let Some(picker) = self.singer_picker() {
                    return Mode::PickingSinger(picker);
                }
            }
            KeyCode::Char('-') | KeyCode::Delete => self.remove_current_entry(),
            KeyCode::Char('[') => self.shift_current_entry(-1),
            KeyCode::Char(']') => self.shift_current_entry(1),
            KeyCode::Esc => self.clear_status(),
            _ => {}
        }
        Mode::Normal
    }

    fn move_in_pane(&mut self, offset: isize) {
        match self.schedules.pane {
            SchedulePane::Schedules => {
                let len = self.dashboard.schedules().len();
                self.schedules.move_schedule(offset, len);
            }
            SchedulePane::Songs => {
                let len = self.current_schedule().map_or(0, |s| s.songs.len());
                self.schedules.move_entry(offset, len);
            }
            SchedulePane::Band => {
                let len = self.current_schedule().map_or(0, |s| s.band.len());
                self.schedules.move_entry(offset, len);
            }
        }
    }

    fn add_next_sunday(&mut self) {
        match self.dashboard.add_next_sunday(self.today) {
            Ok(schedule) => {
                if let Some(index) = self
                    .dashboard
                    .schedules()
                    .iter()
                    .position(|candidate| candidate.id == schedule.id)
                {
                    self.schedules.selected = index;
                    self.schedules.entry = 0;
                }
                let label = sunday_label(schedule.date, self.locale);
                self.set_status(format!("Added {label}."), StatusKind::Info);
            }
            Err(err) => self.report(err),
        }
    }

    fn singer_picker(&mut self) -> Option<SingerPicker> {
        if self.schedules.pane != SchedulePane::Songs {
            self.set_status("Focus the song list (Tab) to pick a singer.", StatusKind::Error);
            return None;
        }
        let schedule = self.current_schedule()?;
        let Some(entry) = schedule.songs.get(self.schedules.entry) else {
            self.set_status("No song selected.", StatusKind::Error);
            return None;
        };
        let candidates = self
            .dashboard
            .singer_candidates(&schedule.id)
            .into_iter()
            .map(|band| band.name.clone())
            .collect::<Vec<_>>();
        if candidates.is_empty() {
            self.set_status("Add a VOX member to this Sunday first.", StatusKind::Error);
            return None;
        }
        Some(SingerPicker::new(
            schedule.id.clone(),
            entry.schedule_item_id.clone(),
            entry.name.clone(),
            candidates,
            &entry.singer,
        ))
    }

    fn remove_current_entry(&mut self) {
        let (pane, entry) = (self.schedules.pane, self.schedules.entry);
        let Some(schedule) = self.current_schedule() else {
            return;
        };
        let schedule_id = schedule.id.clone();
        let target = match pane {
            SchedulePane::Songs => schedule
                .songs
                .get(entry)
                .map(|song| (song.schedule_item_id.clone(), song.name.clone())),
            SchedulePane::Band => schedule
                .band
                .get(entry)
                .map(|band| (band.schedule_item_id.clone(), band.name.clone())),
            SchedulePane::Schedules => None,
        };
        let Some((item_id, name)) = target else {
            self.set_status("Focus a song or band entry first (Tab).", StatusKind::Error);
            return;
        };
        let outcome = if pane == SchedulePane::Songs {
            self.dashboard.remove_song(&schedule_id, &item_id)
        } else {
            self.dashboard.remove_band_member(&schedule_id, &item_id)
        };
        self.apply_outcome(outcome, format!("Removed {name}."));
        self.clamp_cursors();
    }

    fn shift_current_entry(&mut self, offset: isize) {
        let (pane, entry) = (self.schedules.pane, self.schedules.entry);
        let Some(schedule) = self.current_schedule() else {
            return;
        };
        let len = match pane {
            SchedulePane::Songs => schedule.songs.len(),
            SchedulePane::Band => schedule.band.len(),
            SchedulePane::Schedules => return,
        };
        let target = entry as isize + offset;
        if target < 0 || target as usize >= len {
            return;
        }
        let source = DragLocation::new(schedule.id.clone(), entry);
        let destination = DragLocation::new(schedule.id.clone(), target as usize);
        let outcome = match pane {
            SchedulePane::Songs => self.dashboard.move_song(&source, &destination),
            _ => self.dashboard.move_band_member(&source, &destination),
        };
        match outcome {
            Ok(true) => {
                self.schedules.entry = target as usize;
                self.clear_status();
            }
            Ok(false) => {}
            Err(err) => self.report(err),
        }
    }

    // Songs tab

    fn handle_songs_key(&mut self, code: KeyCode) -> Mode {
        let len = self.visible_songs().len();
        match code {
            KeyCode::Up => self.songs.move_selection(-1, len),
            KeyCode::Down => self.songs.move_selection(1, len),
            KeyCode::PageUp => self.songs.move_selection(-PAGE, len),
            KeyCode::PageDown => self.songs.move_selection(PAGE, len),
            KeyCode::Home => self.songs.selected = 0,
            KeyCode::End => self.songs.select_last(len),
            KeyCode::Char('f') => {
                return Mode::Searching(SearchState {
                    target: SearchTarget::Songs,
                    query: self.songs.query().to_string(),
                });
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::SongForm {
                    id: None,
                    form: SongForm::default(),
                };
            }
            KeyCode::Char('e') | KeyCode::Char('E') => match self.current_song() {
                Some(song) => {
                    return Mode::SongForm {
                        id: Some(song.id.clone()),
                        form: SongForm::from_song(song),
                    };
                }
                None => self.set_status("No song selected to edit.", StatusKind::Error),
            },
            KeyCode::Char('-') => match self.current_song() {
                Some(song) => {
                    return Mode::Confirming(ConfirmDelete::Song {
                        id: song.id.clone(),
                        name: song.name.clone(),
                    });
                }
                None => self.set_status("No song selected to delete.", StatusKind::Error),
            },
            KeyCode::Enter => self.open_current_link(),
            KeyCode::Char('[') => self.reorder_song(-1),
            KeyCode::Char(']') => self.reorder_song(1),
            KeyCode::Esc => {
                self.songs.filter = None;
                self.clear_status();
            }
            _ => {}
        }
        Mode::Normal
    }

    fn open_current_link(&mut self) {
        let Some(song) = self.current_song() else {
            return;
        };
        let link = song.youtube_link.trim().to_string();
        let title = song.display_title();
        if link.is_empty() {
            self.set_status("This song does not have a link.", StatusKind::Error);
        } else if let Err(err) = open_link(&link) {
            self.set_status(format!("Failed to open link: {err}"), StatusKind::Error);
        } else {
            self.set_status(format!("Opened {title}."), StatusKind::Info);
        }
    }

    fn reorder_song(&mut self, offset: isize) {
        if self.songs.filter.is_some() {
            self.set_status("Clear the search (Esc) to reorder.", StatusKind::Error);
            return;
        }
        let ids = self
            .dashboard
            .songs()
            .iter()
            .map(|song| song.id.clone())
            .collect();
        let index = self.songs.selected;
        let Some(ids) = swapped_ids(ids, index, offset) else {
            return;
        };
        match self.dashboard.reorder_songs(&ids) {
            Ok(()) => self.songs.selected = (index as isize + offset) as usize,
            Err(err) => self.report(err),
        }
    }

    // Members tab

    fn handle_members_key(&mut self, code: KeyCode) -> Mode {
        let len = self.visible_members().len();
        match code {
            KeyCode::Up => self.members.move_selection(-1, len),
            KeyCode::Down => self.members.move_selection(1, len),
            KeyCode::PageUp => self.members.move_selection(-PAGE, len),
            KeyCode::PageDown => self.members.move_selection(PAGE, len),
            KeyCode::Home => self.members.selected = 0,
            KeyCode::End => self.members.select_last(len),
            KeyCode::Char('f') => {
                return Mode::Searching(SearchState {
                    target: SearchTarget::Members,
                    query: self.members.query().to_string(),
                });
            }
            KeyCode::Char('+') => {
                self.clear_status();
                return Mode::MemberForm {
                    id: None,
                    form: MemberForm::default(),
                };
            }
            KeyCode::Char('e') | KeyCode::Char('E') => match self.current_member() {
                Some(member) => {
                    return Mode::MemberForm {
                        id: Some(member.id.clone()),
                        form: MemberForm::from_member(member),
                    };
                }
                None => self.set_status("No member selected to edit.", StatusKind::Error),
            },
            KeyCode::Char('-') => match self.current_member() {
                Some(member) => {
                    return Mode::Confirming(ConfirmDelete::Member {
                        id: member.id.clone(),
                        name: member.full_name(),
                    });
                }
                None => self.set_status("No member selected to delete.", StatusKind::Error),
            },
            KeyCode::Char('a') | KeyCode::Enter => match self.current_member() {
                Some(member) => {
                    return Mode::Availability(AvailabilityView::new(member.id.clone(), self.today));
                }
                None => self.set_status("No member selected.", StatusKind::Error),
            },
            KeyCode::Char('[') => self.reorder_member(-1),
            KeyCode::Char(']') => self.reorder_member(1),
            KeyCode::Esc => {
                self.members.filter = None;
                self.clear_status();
            }
            _ => {}
        }
        Mode::Normal
    }

    fn reorder_member(&mut self, offset: isize) {
        if self.members.filter.is_some() {
            self.set_status("Clear the search (Esc) to reorder.", StatusKind::Error);
            return;
        }
        let ids = self
            .dashboard
            .members()
            .iter()
            .map(|member| member.id.clone())
            .collect();
        let index = self.members.selected;
        let Some(ids) = swapped_ids(ids, index, offset) else {
            return;
        };
        match self.dashboard.reorder_members(&ids) {
            Ok(()) => self.members.selected = (index as isize + offset) as usize,
            Err(err) => self.report(err),
        }
    }

    // Modal handlers

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                let list = self.list_mut(state.target);
                list.filter = None;
                list.selected = 0;
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Up | KeyCode::Down => {
                let offset = if code == KeyCode::Up { -1 } else { 1 };
                let len = match state.target {
                    SearchTarget::Songs => self.visible_songs().len(),
                    SearchTarget::Members => self.visible_members().len(),
                };
                self.list_mut(state.target).move_selection(offset, len);
                return Mode::Searching(state);
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) => state.query.push(ch),
            _ => return Mode::Searching(state),
        }

        let list = self.list_mut(state.target);
        list.filter = (!state.query.is_empty()).then(|| state.query.clone());
        list.selected = 0;
        Mode::Searching(state)
    }

    fn handle_song_form(&mut self, code: KeyCode, id: Option<String>, mut form: SongForm) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_song(id.as_deref(), &form) {
                Ok(message) => {
                    self.set_status(message, StatusKind::Info);
                    keep_open = false;
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::SongForm { id, form }
        } else {
            Mode::Normal
        }
    }

    fn save_song(&mut self, id: Option<&str>, form: &SongForm) -> Result<String> {
        let input = form.parse_inputs()?;
        match id {
            Some(id) => {
                if !self.dashboard.update_song(id, &input.into_patch())? {
                    bail!("That song no longer exists.");
                }
                Ok("Song updated.".to_string())
            }
            None => {
                let song = self.dashboard.create_song(input.into_draft())?;
                self.songs.filter = None;
                if let Some(index) = self.dashboard.songs().iter().position(|s| s.id == song.id) {
                    self.songs.selected = index;
                }
                Ok(format!("Added {}.", song.name))
            }
        }
    }

    fn handle_member_form(
        &mut self,
        code: KeyCode,
        id: Option<String>,
        mut form: MemberForm,
    ) -> Mode {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_member(id.as_deref(), &form) {
                Ok(message) => {
                    self.set_status(message, StatusKind::Info);
                    keep_open = false;
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Mode::MemberForm { id, form }
        } else {
            Mode::Normal
        }
    }

    fn save_member(&mut self, id: Option<&str>, form: &MemberForm) -> Result<String> {
        match id {
            Some(id) => {
                if !self.dashboard.update_member(id, &form.patch()?)? {
                    bail!("That member no longer exists.");
                }
                Ok("Member updated.".to_string())
            }
            None => {
                let member = self.dashboard.create_member(form.draft()?)?;
                self.members.filter = None;
                if let Some(index) = self
                    .dashboard
                    .members()
                    .iter()
                    .position(|m| m.id == member.id)
                {
                    self.members.selected = index;
                }
                Ok(format!("Added {}.", member.full_name()))
            }
        }
    }

    fn handle_leaders_form(
        &mut self,
        code: KeyCode,
        schedule_id: String,
        mut form: LeadersForm,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_leaders(&schedule_id, &form) {
                Ok(0) => {
                    self.set_status("No changes.", StatusKind::Info);
                    return Mode::Normal;
                }
                Ok(_) => {
                    self.set_status("Leaders updated.", StatusKind::Info);
                    return Mode::Normal;
                }
                Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
            },
            KeyCode::Char(ch) => {
                form.push_char(ch);
            }
            _ => {}
        }
        Mode::LeadersForm { schedule_id, form }
    }

    fn save_leaders(&mut self, schedule_id: &str, form: &LeadersForm) -> Result<usize> {
        let Some(schedule) = self.dashboard.schedule(schedule_id) else {
            bail!("That schedule no longer exists.");
        };
        let changes = form.changes(&schedule.leaders);
        for (role, value) in &changes {
            self.dashboard.update_leader(schedule_id, *role, value)?;
        }
        Ok(changes.len())
    }

    fn handle_song_picker(&mut self, code: KeyCode, mut picker: SongPicker) -> Mode {
        let options: Vec<String> = self
            .dashboard
            .filter_songs(&picker.query, picker.category)
            .into_iter()
            .map(|song| song.id.clone())
            .collect();
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Up => picker.selected = offset_index(picker.selected, -1, options.len()),
            KeyCode::Down => picker.selected = offset_index(picker.selected, 1, options.len()),
            KeyCode::Tab => picker.cycle_category(),
            KeyCode::Backspace => {
                picker.query.pop();
                picker.selected = 0;
            }
            KeyCode::Char(ch) => {
                picker.query.push(ch);
                picker.selected = 0;
            }
            KeyCode::Enter => {
                let Some(song_id) = options.get(picker.selected) else {
                    return Mode::PickingSong(picker);
                };
                let outcome = self.dashboard.append_song(&picker.schedule_id, song_id, None);
                if self.finish_pick(outcome, "Song added to the Sunday.") {
                    return Mode::Normal;
                }
            }
            _ => {}
        }
        Mode::PickingSong(picker)
    }

    fn handle_member_picker(&mut self, code: KeyCode, mut picker: MemberPicker) -> Mode {
        let options: Vec<BandMember> = self
            .dashboard
            .members_for_schedule(&picker.schedule_id, &picker.query, picker.instrument)
            .into_iter()
            .cloned()
            .collect();
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Up => picker.selected = offset_index(picker.selected, -1, options.len()),
            KeyCode::Down => picker.selected = offset_index(picker.selected, 1, options.len()),
            KeyCode::Tab => picker.cycle_instrument(),
            KeyCode::Backspace => {
                picker.query.pop();
                picker.selected = 0;
            }
            KeyCode::Char(ch) => {
                picker.query.push(ch);
                picker.selected = 0;
            }
            KeyCode::Enter => {
                if let Some(member) = options.get(picker.selected) {
                    return Mode::PickingInstrument(InstrumentPicker::new(
                        picker.schedule_id,
                        member,
                    ));
                }
            }
            _ => {}
        }
        Mode::PickingMember(picker)
    }

    fn handle_instrument_picker(&mut self, code: KeyCode, mut picker: InstrumentPicker) -> Mode {
        let len = picker.options.len();
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Up => picker.selected = offset_index(picker.selected, -1, len),
            KeyCode::Down => picker.selected = offset_index(picker.selected, 1, len),
            KeyCode::Enter => {
                let Some(instrument) = picker.options.get(picker.selected) else {
                    return Mode::PickingInstrument(picker);
                };
                let outcome = self.dashboard.append_band_member(
                    &picker.schedule_id,
                    &picker.member_id,
                    instrument,
                );
                let message = format!("{} plays {instrument}.", picker.member_name);
                if self.finish_pick(outcome, message) {
                    return Mode::Normal;
                }
            }
            _ => {}
        }
        Mode::PickingInstrument(picker)
    }

    fn handle_singer_picker(&mut self, code: KeyCode, mut picker: SingerPicker) -> Mode {
        let len = picker.options.len();
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Up => picker.selected = offset_index(picker.selected, -1, len),
            KeyCode::Down => picker.selected = offset_index(picker.selected, 1, len),
            KeyCode::Enter => {
                let singer = picker.options.get(picker.selected).cloned().unwrap_or_default();
                let outcome = self.dashboard.update_singer(
                    &picker.schedule_id,
                    &picker.schedule_item_id,
                    &singer,
                );
                if self.finish_pick(outcome, "Singer updated.") {
                    return Mode::Normal;
                }
            }
            _ => {}
        }
        Mode::PickingSinger(picker)
    }

    fn handle_availability(&mut self, code: KeyCode, mut view: AvailabilityView) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('a') => return Mode::Normal,
            KeyCode::Left | KeyCode::Up => view.move_cursor(-1),
            KeyCode::Right | KeyCode::Down => view.move_cursor(1),
            KeyCode::Char('<') | KeyCode::Char(',') | KeyCode::PageUp => view.previous_month(),
            KeyCode::Char('>') | KeyCode::Char('.') | KeyCode::PageDown => view.next_month(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(date) = view.current_date() {
                    match self.dashboard.toggle_availability(&view.member_id, date) {
                        Ok(true) => self.clear_status(),
                        Ok(false) => {
                            self.set_status("That member no longer exists.", StatusKind::Error);
                            return Mode::Normal;
                        }
                        Err(err) => self.report(err),
                    }
                }
            }
            _ => {}
        }
        Mode::Availability(view)
    }

    fn handle_confirm(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let outcome = match &confirm {
                    ConfirmDelete::Song { id, .. } => self.dashboard.delete_song(id),
                    ConfirmDelete::Member { id, .. } => self.dashboard.delete_member(id),
                    ConfirmDelete::Schedule { id, .. } => self.dashboard.delete_schedule(id),
                };
                match outcome {
                    Ok(_) => {
                        self.set_status("Deleted.", StatusKind::Info);
                        self.clamp_cursors();
                        Mode::Normal
                    }
                    Err(err) => {
                        self.report(err);
                        Mode::Confirming(confirm)
                    }
                }
            }
            _ => Mode::Confirming(confirm),
        }
    }

    /// Report a picker action. Returns `true` when the picker should close;
    /// rejections keep it open so another choice can be made.
    fn finish_pick(
        &mut self,
        outcome: Result<bool, DashboardError>,
        success: impl Into<String>,
    ) -> bool {
        match outcome {
            Ok(true) => {
                self.set_status(success, StatusKind::Info);
                true
            }
            Ok(false) => {
                self.set_status("That Sunday no longer exists.", StatusKind::Error);
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    fn apply_outcome(&mut self, outcome: Result<bool, DashboardError>, success: impl Into<String>) {
        match outcome {
            Ok(true) => self.set_status(success, StatusKind::Info),
            Ok(false) => self.set_status("Nothing changed.", StatusKind::Error),
            Err(err) => self.report(err),
        }
    }

    // Drawing

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT.min(area.height)),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.tab {
            Tab::Schedules => self.draw_schedules(frame, chunks[1]),
            Tab::Songs => self.draw_songs(frame, chunks[1]),
            Tab::Members => self.draw_members(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::Searching(state) => self.draw_search_bar(frame, chunks[1], state),
            Mode::SongForm { id, form } => {
                let title = if id.is_some() { "Edit Song" } else { "Add Song" };
                self.draw_form(frame, area, title, form.lines(), &form.error, form.cursor());
            }
            Mode::MemberForm { id, form } => {
                let title = if id.is_some() {
                    "Edit Member"
                } else {
                    "Add Member"
                };
                self.draw_form(frame, area, title, form.lines(), &form.error, form.cursor());
            }
            Mode::LeadersForm { form, .. } => {
                self.draw_form(frame, area, "Leaders", form.lines(), &None, form.cursor());
            }
            Mode::PickingSong(picker) => self.draw_song_picker(frame, area, picker),
            Mode::PickingMember(picker) => self.draw_member_picker(frame, area, picker),
            Mode::PickingInstrument(picker) => {
                let title = format!("Instrument for {}", picker.member_name);
                let items = picker.options.iter().map(|tag| ListItem::new(tag.clone())).collect();
                self.draw_picker(frame, area, &title, None, items, picker.selected);
            }
            Mode::PickingSinger(picker) => {
                let title = format!("Singer for {}", picker.song_name);
                let items = picker
                    .options
                    .iter()
                    .map(|name| {
                        if name.is_empty() {
                            ListItem::new(Span::styled(
                                "(no singer)",
                                Style::default().fg(Color::DarkGray),
                            ))
                        } else {
                            ListItem::new(name.clone())
                        }
                    })
                    .collect();
                self.draw_picker(frame, area, &title, None, items, picker.selected);
            }
            Mode::Availability(view) => self.draw_availability(frame, area, view),
            Mode::Confirming(confirm) => self.draw_confirm(frame, area, confirm),
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let tabs = Tabs::new(TAB_TITLES)
            .select(self.tab.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Band Schedule Manager"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_schedules(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);

        let schedules = self.dashboard.schedules();
        if schedules.is_empty() {
            let message = Paragraph::new("No Sundays yet. Press 'n' to add the next one.")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Sundays"));
            frame.render_widget(message, area);
            return;
        }

        let mut items = Vec::new();
        let mut selected_row = 0;
        let mut index = 0;
        for group in group_by_month(schedules, self.locale) {
            items.push(ListItem::new(Line::from(Span::styled(
                group.name().to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))));
            for entry in &group.schedules {
                if index == self.schedules.selected {
                    selected_row = items.len();
                }
                let schedule = entry.schedule;
                items.push(ListItem::new(format!(
                    "{}  ({} songs, {} band)",
                    sunday_label(schedule.date, self.locale),
                    schedule.songs.len(),
                    schedule.band.len()
                )));
                index += 1;
            }
        }

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Sundays"))
            .highlight_style(self.pane_highlight(SchedulePane::Schedules))
            .highlight_symbol(POINTER);
        let mut state = ListState::default();
        state.select(Some(selected_row));
        frame.render_stateful_widget(list, columns[0], &mut state);

        if let Some(schedule) = self.current_schedule() {
            self.draw_schedule_detail(frame, columns[1], schedule);
        }
    }

    fn draw_schedule_detail(&self, frame: &mut Frame, area: Rect, schedule: &SundaySchedule) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(4),
                Constraint::Min(4),
                Constraint::Length(5),
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(
                sunday_label(schedule.date, self.locale),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  {}", schedule.date)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, rows[0]);

        let songs: Vec<ListItem> = schedule
            .songs
            .iter()
            .map(|song| {
                let singer = if song.singer.is_empty() {
                    Span::styled("no singer", Style::default().fg(Color::DarkGray))
                } else {
                    Span::styled(song.singer.clone(), Style::default().fg(Color::Green))
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{}. {}  ", song.order, song.name)),
                    Span::styled(format!("[{}]  ", song.key), Style::default().fg(Color::Cyan)),
                    singer,
                ]))
            })
            .collect();
        self.render_entries(frame, rows[1], "Songs", songs, SchedulePane::Songs);

        let band: Vec<ListItem> = schedule
            .band
            .iter()
            .map(|member| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{}. {}  ", member.order, member.name)),
                    Span::styled(member.instrument.clone(), Style::default().fg(Color::Cyan)),
                ]))
            })
            .collect();
        self.render_entries(frame, rows[2], "Band", band, SchedulePane::Band);

        let leaders: Vec<Line> = LeaderRole::ALL
            .iter()
            .map(|role| {
                let value = schedule.leaders.get(*role);
                Line::from(vec![
                    Span::raw(format!("{}: ", role_label(*role))),
                    if value.is_empty() {
                        Span::styled("-", Style::default().fg(Color::DarkGray))
                    } else {
                        Span::raw(value.to_string())
                    },
                ])
            })
            .collect();
        let leaders = Paragraph::new(leaders)
            .block(Block::default().borders(Borders::ALL).title("Leaders"));
        frame.render_widget(leaders, rows[3]);
    }

    fn render_entries(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        items: Vec<ListItem>,
        pane: SchedulePane,
    ) {
        let focused = self.schedules.pane == pane;
        let mut block = Block::default().borders(Borders::ALL).title(title.to_string());
        if focused {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }
        if items.is_empty() {
            let hint = match pane {
                SchedulePane::Songs => "No songs yet. Press 's' to add one.",
                _ => "No band yet. Press 'b' to add someone.",
            };
            let message = Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
                .block(block);
            frame.render_widget(message, area);
            return;
        }
        let list = List::new(items)
            .block(block)
            .highlight_style(self.pane_highlight(pane))
            .highlight_symbol(POINTER);
        let mut state = ListState::default();
        if focused {
            state.select(Some(self.schedules.entry));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn pane_highlight(&self, pane: SchedulePane) -> Style {
        if self.schedules.pane == pane {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    fn draw_songs(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);

        let title = match &self.songs.filter {
            Some(query) => format!("Songs (search: {query})"),
            None => "Songs".to_string(),
        };
        let songs = self.visible_songs();
        if songs.is_empty() {
            let text = if self.dashboard.songs().is_empty() {
                "No songs yet. Press '+' to add one."
            } else {
                "No songs match the current search."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = songs
            .iter()
            .map(|song| {
                ListItem::new(Line::from(vec![
                    Span::raw(song.display_title()),
                    Span::styled(
                        format!("  [{}]  {}", song.current_key, song.category),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol(POINTER);
        let mut state = ListState::default();
        state.select(Some(self.songs.selected));
        frame.render_stateful_widget(list, columns[0], &mut state);

        if let Some(song) = songs.get(self.songs.selected) {
            self.draw_song_detail(frame, columns[1], song);
        }
    }

    fn draw_song_detail(&self, frame: &mut Frame, area: Rect, song: &Song) {
        let label = Style::default().fg(Color::Gray);
        let mut lines = vec![
            Line::from(Span::styled(
                song.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(vec![
                Span::styled("Original singer: ", label),
                Span::raw(song.original_singer.clone()),
            ]),
            Line::from(vec![
                Span::styled("Key: ", label),
                Span::raw(song.current_key.clone()),
            ]),
        ];
        if !song.key_history.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Previous keys: ", label),
                Span::raw(song.key_history.join(", ")),
            ]));
        }
        lines.push(Line::from(vec![
            Span::styled("Category: ", label),
            Span::raw(song.category.to_string()),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Duration: ", label),
            Span::raw(song.display_duration()),
        ]));
        if !song.youtube_link.trim().is_empty() {
            lines.push(Line::from(Span::styled(
                song.youtube_link.trim().to_string(),
                Style::default().fg(Color::Cyan),
            )));
        }
        if !song.verses.trim().is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::styled("Verses: ", label),
                Span::raw(song.verses.clone()),
            ]));
        }

        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Details"));
        frame.render_widget(paragraph, area);
    }

    fn draw_members(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let title = match &self.members.filter {
            Some(query) => format!("Band (search: {query})"),
            None => "Band".to_string(),
        };
        let members = self.visible_members();
        if members.is_empty() {
            let text = if self.dashboard.members().is_empty() {
                "No band members yet. Press '+' to add one."
            } else {
                "No members match the current search."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = members
            .iter()
            .map(|member| {
                ListItem::new(Line::from(vec![
                    Span::raw(member.full_name()),
                    Span::styled(
                        format!("  {}", member.instruments.join(" ")),
                        Style::default().fg(Color::Cyan),
                    ),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol(POINTER);
        let mut state = ListState::default();
        state.select(Some(self.members.selected));
        frame.render_stateful_widget(list, columns[0], &mut state);

        if let Some(member) = members.get(self.members.selected) {
            let view = AvailabilityView::new(member.id.clone(), self.today);
            let lines = self.availability_lines(member, &view, false);
            let paragraph = Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(month_year_label(view.year, view.month, self.locale)),
            );
            frame.render_widget(paragraph, columns[1]);
        }
    }

    fn availability_lines(
        &self,
        member: &BandMember,
        view: &AvailabilityView,
        with_cursor: bool,
    ) -> Vec<Line<'static>> {
        month_availability(member, view.year, view.month)
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let (mark, style) = if record.available {
                    ("[x] available  ", Style::default().fg(Color::Green))
                } else {
                    ("[ ] unavailable", Style::default().fg(Color::Red))
                };
                let pointer = if with_cursor && index == view.cursor {
                    POINTER
                } else {
                    "  "
                };
                let mut line = Line::from(vec![
                    Span::raw(pointer),
                    Span::styled(mark, style),
                    Span::raw(format!("  {}", sunday_label(record.date, self.locale))),
                ]);
                if with_cursor && index == view.cursor {
                    line = line.style(Style::default().add_modifier(Modifier::BOLD));
                }
                line
            })
            .collect()
    }

    fn draw_availability(&self, frame: &mut Frame, area: Rect, view: &AvailabilityView) {
        let Some(member) = self.dashboard.member(&view.member_id) else {
            return;
        };
        let popup_area = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(format!(
            "{} - {}",
            member.full_name(),
            month_year_label(view.year, view.month, self.locale)
        ));
        let mut lines = self.availability_lines(member, view, true);
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Space to toggle, < > to change month, Esc to close",
            Style::default().fg(Color::Gray),
        )));
        let paragraph = Paragraph::new(lines).block(block);
        frame.render_widget(paragraph, popup_area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = match &self.status {
            Some(status) => Line::from(vec![Span::styled(status.text.clone(), status.kind.style())]),
            None => Line::from(""),
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        match (&self.mode, self.tab) {
            (Mode::Searching(_), _) => {
                key_hints(&[("type", "Filter"), ("Enter", "Keep"), ("Esc", "Clear")])
            }
            (Mode::SongForm { .. } | Mode::MemberForm { .. } | Mode::LeadersForm { .. }, _) => {
                key_hints(&[("Tab", "Next field"), ("Enter", "Save"), ("Esc", "Cancel")])
            }
            (Mode::PickingSong(_), _) => key_hints(&[
                ("type", "Search"),
                ("Tab", "Category"),
                ("Enter", "Add"),
                ("Esc", "Close"),
            ]),
            (Mode::PickingMember(_), _) => key_hints(&[
                ("type", "Search"),
                ("Tab", "Instrument"),
                ("Enter", "Choose"),
                ("Esc", "Close"),
            ]),
            (Mode::PickingInstrument(_) | Mode::PickingSinger(_), _) => {
                key_hints(&[("↑↓", "Select"), ("Enter", "Confirm"), ("Esc", "Close")])
            }
            (Mode::Availability(_), _) => key_hints(&[
                ("←→", "Sunday"),
                ("Space", "Toggle"),
                ("< >", "Month"),
                ("Esc", "Close"),
            ]),
            (Mode::Confirming(_), _) => key_hints(&[("y", "Delete"), ("n", "Cancel")]),
            (Mode::Normal, Tab::Schedules) => key_hints(&[
                ("↑↓", "Select"),
                ("Tab", "Focus"),
                ("s", "Add song"),
                ("b", "Add band"),
                ("v", "Singer"),
                ("[ ]", "Move"),
                ("-", "Remove"),
                ("l", "Leaders"),
                ("n", "Next Sunday"),
                ("x", "Delete Sunday"),
                ("1-3", "Tabs"),
                ("q", "Quit"),
            ]),
            (Mode::Normal, Tab::Songs) => key_hints(&[
                ("↑↓", "Select"),
                ("Enter", "Open link"),
                ("f", "Search"),
                ("+", "Add"),
                ("e", "Edit"),
                ("-", "Delete"),
                ("[ ]", "Reorder"),
                ("1-3", "Tabs"),
                ("q", "Quit"),
            ]),
            (Mode::Normal, Tab::Members) => key_hints(&[
                ("↑↓", "Select"),
                ("a", "Availability"),
                ("f", "Search"),
                ("+", "Add"),
                ("e", "Edit"),
                ("-", "Delete"),
                ("[ ]", "Reorder"),
                ("1-3", "Tabs"),
                ("q", "Quit"),
            ]),
        }
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let popup_area = Rect {
            height: 3u16.min(area.height),
            ..area
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        mut lines: Vec<Line<'static>>,
        error: &Option<String>,
        cursor: (u16, u16),
    ) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        match error {
            Some(error) => lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Enter to save, Tab to switch, Esc to cancel",
                Style::default().fg(Color::Gray),
            ))),
        }
        frame.render_widget(Paragraph::new(lines), inner);

        let (row, col) = cursor;
        frame.set_cursor_position((inner.x + col, inner.y + row));
    }

    fn draw_song_picker(&self, frame: &mut Frame, area: Rect, picker: &SongPicker) {
        let category = picker
            .category
            .map(|category| category.to_string())
            .unwrap_or_else(|| "all".to_string());
        let header = Line::from(vec![
            Span::raw(format!("Search: {}", picker.query)),
            Span::styled(
                format!("   Category: {category}"),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let items = self
            .dashboard
            .filter_songs(&picker.query, picker.category)
            .into_iter()
            .map(|song| {
                ListItem::new(format!(
                    "{}  [{}]  {}",
                    song.display_title(),
                    song.current_key,
                    song.category
                ))
            })
            .collect();
        self.draw_picker(frame, area, "Add Song", Some(header), items, picker.selected);
    }

    fn draw_member_picker(&self, frame: &mut Frame, area: Rect, picker: &MemberPicker) {
        let header = Line::from(vec![
            Span::raw(format!("Search: {}", picker.query)),
            Span::styled(
                format!("   Instrument: {}", picker.instrument.unwrap_or("any")),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let items = self
            .dashboard
            .members_for_schedule(&picker.schedule_id, &picker.query, picker.instrument)
            .into_iter()
            .map(|member| {
                ListItem::new(format!(
                    "{}  {}",
                    member.full_name(),
                    member.instruments.join(" ")
                ))
            })
            .collect();
        self.draw_picker(
            frame,
            area,
            "Add Band Member (available only)",
            Some(header),
            items,
            picker.selected,
        );
    }

    fn draw_picker(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        header: Option<Line<'static>>,
        items: Vec<ListItem>,
        selected: usize,
    ) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let mut inner = block.inner(popup_area);

        if let Some(header) = header {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(0)])
                .split(inner);
            frame.render_widget(Paragraph::new(header), chunks[0]);
            inner = chunks[1];
        }

        if items.is_empty() {
            let message = Paragraph::new(Span::styled(
                "Nothing matches.",
                Style::default().fg(Color::DarkGray),
            ));
            frame.render_widget(message, inner);
            return;
        }

        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol(POINTER);
        let mut state = ListState::default();
        state.select(Some(selected));
        frame.render_stateful_widget(list, inner, &mut state);
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(confirm.prompt()),
            Line::from(confirm.warning()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    // State helpers

    fn current_schedule(&self) -> Option<&SundaySchedule> {
        self.dashboard.schedules().get(self.schedules.selected)
    }

    fn require_schedule(&mut self) -> Option<SundaySchedule> {
        let schedule = self.current_schedule().cloned();
        if schedule.is_none() {
            self.set_status("No Sunday selected. Press 'n' to add one.", StatusKind::Error);
        }
        schedule
    }

    fn visible_songs(&self) -> Vec<&Song> {
        self.dashboard.filter_songs(self.songs.query(), None)
    }

    fn current_song(&self) -> Option<&Song> {
        self.visible_songs().get(self.songs.selected).copied()
    }

    fn visible_members(&self) -> Vec<&BandMember> {
        search_members(self.dashboard.members(), self.members.query())
    }

    fn current_member(&self) -> Option<&BandMember> {
        self.visible_members().get(self.members.selected).copied()
    }

    fn list_mut(&mut self, target: SearchTarget) -> &mut ListScreen {
        match target {
            SearchTarget::Songs => &mut self.songs,
            SearchTarget::Members => &mut self.members,
        }
    }

    /// Start on the first Sunday that is not in the past.
    fn select_first_upcoming(&mut self) {
        let today = self.today;
        self.schedules.selected = self
            .dashboard
            .schedules()
            .iter()
            .position(|schedule| schedule.date >= today)
            .unwrap_or(0);
    }

    fn clamp_cursors(&mut self) {
        let schedules = self.dashboard.schedules().len();
        let entries = match self.schedules.pane {
            SchedulePane::Songs => self.current_schedule().map_or(0, |s| s.songs.len()),
            SchedulePane::Band => self.current_schedule().map_or(0, |s| s.band.len()),
            SchedulePane::Schedules => 0,
        };
        self.schedules.clamp(schedules, entries);
        let songs = self.visible_songs().len();
        self.songs.clamp(songs);
        let members = self.visible_members().len();
        self.members.clamp(members);
    }

    fn report(&mut self, err: impl Into<anyhow::Error>) {
        let err = err.into();
        self.set_status(surface_error(&err), StatusKind::Error);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }
}
