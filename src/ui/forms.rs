use anyhow::{anyhow, Context, Result};
use ratatui::text::Line;

use crate::models::{
    BandMember, Category, LeaderRole, Leaders, MemberPatch, NewMember, NewSong, Song, SongPatch,
};

use super::helpers::field_line;

/// Fields of the song form, in focus order.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum SongField {
    #[default]
    Name,
    Key,
    KeyHistory,
    OriginalSinger,
    Link,
    Duration,
    Category,
    Verses,
}

impl SongField {
    pub(crate) const ALL: [SongField; 8] = [
        SongField::Name,
        SongField::Key,
        SongField::KeyHistory,
        SongField::OriginalSinger,
        SongField::Link,
        SongField::Duration,
        SongField::Category,
        SongField::Verses,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            SongField::Name => "Name",
            SongField::Key => "Key",
            SongField::KeyHistory => "Previous keys",
            SongField::OriginalSinger => "Original singer",
            SongField::Link => "YouTube link",
            SongField::Duration => "Duration (s)",
            SongField::Category => "Category",
            SongField::Verses => "Verses",
        }
    }
}

/// Song create/edit form. Text is kept raw until [`SongForm::parse_inputs`].
#[derive(Default, Clone)]
pub(crate) struct SongForm {
    pub(crate) name: String,
    pub(crate) key: String,
    pub(crate) key_history: String,
    pub(crate) original_singer: String,
    pub(crate) link: String,
    pub(crate) duration: String,
    pub(crate) category: Category,
    pub(crate) verses: String,
    pub(crate) active: SongField,
    pub(crate) error: Option<String>,
}

/// Parsed song form, ready to become a draft or a patch.
pub(crate) struct SongInput {
    name: String,
    key: String,
    key_history: Vec<String>,
    original_singer: String,
    link: String,
    duration: u32,
    category: Category,
    verses: String,
}

impl SongInput {
    pub(crate) fn into_draft(self) -> NewSong {
        NewSong {
            name: self.name,
            current_key: self.key,
            key_history: self.key_history,
            original_singer: self.original_singer,
            youtube_link: self.link,
            lyrics: String::new(),
            verses: self.verses,
            duration: self.duration,
            category: self.category,
            order: None,
        }
    }

    pub(crate) fn into_patch(self) -> SongPatch {
        SongPatch {
            name: Some(self.name),
            current_key: Some(self.key),
            key_history: Some(self.key_history),
            original_singer: Some(self.original_singer),
            youtube_link: Some(self.link),
            lyrics: None,
            verses: Some(self.verses),
            duration: Some(self.duration),
            category: Some(self.category),
            order: None,
        }
    }
}

impl SongForm {
    pub(crate) fn from_song(song: &Song) -> Self {
        Self {
            name: song.name.clone(),
            key: song.current_key.clone(),
            key_history: song.key_history.join(", "),
            original_singer: song.original_singer.clone(),
            link: song.youtube_link.clone(),
            duration: if song.duration == 0 {
                String::new()
            } else {
                song.duration.to_string()
            },
            category: song.category,
            verses: song.verses.clone(),
            active: SongField::Name,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = step(&SongField::ALL, self.active, 1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = step(&SongField::ALL, self.active, -1);
    }

    /// Category is a closed set, so typing on it cycles instead of inserting.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        match self.active {
            SongField::Category => {
                self.category = self.category.cycle();
                true
            }
            SongField::Duration => {
                if ch.is_ascii_digit() {
                    self.duration.push(ch);
                    true
                } else {
                    false
                }
            }
            field => {
                if let Some(value) = self.text_mut(field) {
                    value.push(ch);
                }
                true
            }
        }
    }

    pub(crate) fn backspace(&mut self) {
        if let Some(value) = self.text_mut(self.active) {
            value.pop();
        }
    }

    fn text_mut(&mut self, field: SongField) -> Option<&mut String> {
        match field {
            SongField::Name => Some(&mut self.name),
            SongField::Key => Some(&mut self.key),
            SongField::KeyHistory => Some(&mut self.key_history),
            SongField::OriginalSinger => Some(&mut self.original_singer),
            SongField::Link => Some(&mut self.link),
            SongField::Duration => Some(&mut self.duration),
            SongField::Verses => Some(&mut self.verses),
            SongField::Category => None,
        }
    }

    fn text(&self, field: SongField) -> String {
        match field {
            SongField::Name => self.name.clone(),
            SongField::Key => self.key.clone(),
            SongField::KeyHistory => self.key_history.clone(),
            SongField::OriginalSinger => self.original_singer.clone(),
            SongField::Link => self.link.clone(),
            SongField::Duration => self.duration.clone(),
            SongField::Category => self.category.to_string(),
            SongField::Verses => self.verses.clone(),
        }
    }

    pub(crate) fn parse_inputs(&self) -> Result<SongInput> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(anyhow!("Song name is required."));
        }
        let duration = match self.duration.trim() {
            "" => 0,
            raw => raw
                .parse::<u32>()
                .context("Duration must be a whole number of seconds.")?,
        };
        Ok(SongInput {
            name: name.to_string(),
            key: self.key.trim().to_string(),
            key_history: split_list(&self.key_history),
            original_singer: self.original_singer.trim().to_string(),
            link: self.link.trim().to_string(),
            duration,
            category: self.category,
            verses: self.verses.trim().to_string(),
        })
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        SongField::ALL
            .iter()
            .map(|field| {
                let placeholder = match field {
                    SongField::Name => "<required>",
                    SongField::KeyHistory => "<comma separated>",
                    SongField::Category => "",
                    _ => "<optional>",
                };
                field_line(
                    field.label(),
                    &self.text(*field),
                    placeholder,
                    self.active == *field,
                )
            })
            .collect()
    }

    /// Row and column of the cursor inside the form body.
    pub(crate) fn cursor(&self) -> (u16, u16) {
        let row = SongField::ALL
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        let label = self.active.label();
        let col = label.chars().count() + 2 + self.text(self.active).chars().count();
        (row as u16, col as u16)
    }
}

#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum MemberField {
    #[default]
    FirstName,
    LastName,
    Instruments,
}

impl MemberField {
    pub(crate) const ALL: [MemberField; 3] = [
        MemberField::FirstName,
        MemberField::LastName,
        MemberField::Instruments,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            MemberField::FirstName => "First name",
            MemberField::LastName => "Last name",
            MemberField::Instruments => "Instruments",
        }
    }
}

/// Member create/edit form. Instruments are typed as a comma separated list.
#[derive(Default, Clone)]
pub(crate) struct MemberForm {
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) instruments: String,
    pub(crate) active: MemberField,
    pub(crate) error: Option<String>,
}

impl MemberForm {
    pub(crate) fn from_member(member: &BandMember) -> Self {
        Self {
            first_name: member.first_name.clone(),
            last_name: member.last_name.clone(),
            instruments: member.instruments.join(", "),
            active: MemberField::FirstName,
            error: None,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = step(&MemberField::ALL, self.active, 1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = step(&MemberField::ALL, self.active, -1);
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.text_mut(self.active).push(ch);
        true
    }

    pub(crate) fn backspace(&mut self) {
        self.text_mut(self.active).pop();
    }

    fn text_mut(&mut self, field: MemberField) -> &mut String {
        match field {
            MemberField::FirstName => &mut self.first_name,
            MemberField::LastName => &mut self.last_name,
            MemberField::Instruments => &mut self.instruments,
        }
    }

    fn text(&self, field: MemberField) -> &str {
        match field {
            MemberField::FirstName => &self.first_name,
            MemberField::LastName => &self.last_name,
            MemberField::Instruments => &self.instruments,
        }
    }

    /// First name plus cleaned-up fields.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, Vec<String>)> {
        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            return Err(anyhow!("First name is required."));
        }
        Ok((
            first_name.to_string(),
            self.last_name.trim().to_string(),
            split_list(&self.instruments),
        ))
    }

    pub(crate) fn draft(&self) -> Result<NewMember> {
        let (first_name, last_name, instruments) = self.parse_inputs()?;
        Ok(NewMember {
            first_name,
            last_name,
            instruments,
            availability: Vec::new(),
            order: None,
        })
    }

    /// Availability and order are left untouched on edit.
    pub(crate) fn patch(&self) -> Result<MemberPatch> {
        let (first_name, last_name, instruments) = self.parse_inputs()?;
        Ok(MemberPatch {
            first_name: Some(first_name),
            last_name: Some(last_name),
            instruments: Some(instruments),
            ..MemberPatch::default()
        })
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        MemberField::ALL
            .iter()
            .map(|field| {
                let placeholder = match field {
                    MemberField::FirstName => "<required>",
                    MemberField::LastName => "<optional>",
                    MemberField::Instruments => "VOX1, AG, ...",
                };
                field_line(
                    field.label(),
                    self.text(*field),
                    placeholder,
                    self.active == *field,
                )
            })
            .collect()
    }

    pub(crate) fn cursor(&self) -> (u16, u16) {
        let row = MemberField::ALL
            .iter()
            .position(|field| *field == self.active)
            .unwrap_or(0);
        let col = self.active.label().chars().count() + 2 + self.text(self.active).chars().count();
        (row as u16, col as u16)
    }
}

/// Leader roles of one schedule, edited together.
#[derive(Clone)]
pub(crate) struct LeadersForm {
    pub(crate) values: Leaders,
    pub(crate) active: LeaderRole,
}

impl LeadersForm {
    pub(crate) fn from_leaders(leaders: &Leaders) -> Self {
        Self {
            values: leaders.clone(),
            active: LeaderRole::Talkback,
        }
    }

    pub(crate) fn next_field(&mut self) {
        self.active = step(&LeaderRole::ALL, self.active, 1);
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = step(&LeaderRole::ALL, self.active, -1);
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let mut value = self.values.get(self.active).to_string();
        value.push(ch);
        self.values.set(self.active, value);
        true
    }

    pub(crate) fn backspace(&mut self) {
        let mut value = self.values.get(self.active).to_string();
        value.pop();
        self.values.set(self.active, value);
    }

    /// Roles whose trimmed value differs from `current`.
    pub(crate) fn changes(&self, current: &Leaders) -> Vec<(LeaderRole, String)> {
        LeaderRole::ALL
            .iter()
            .filter_map(|role| {
                let value = self.values.get(*role).trim();
                (value != current.get(*role)).then(|| (*role, value.to_string()))
            })
            .collect()
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        LeaderRole::ALL
            .iter()
            .map(|role| {
                field_line(
                    role_label(*role),
                    self.values.get(*role),
                    "<unassigned>",
                    self.active == *role,
                )
            })
            .collect()
    }

    pub(crate) fn cursor(&self) -> (u16, u16) {
        let row = LeaderRole::ALL
            .iter()
            .position(|role| *role == self.active)
            .unwrap_or(0);
        let col = role_label(self.active).chars().count() + 2 + self.values.get(self.active).chars().count();
        (row as u16, col as u16)
    }
}

pub(crate) fn role_label(role: LeaderRole) -> &'static str {
    match role {
        LeaderRole::Talkback => "Talkback",
        LeaderRole::Dm1 => "DM 1",
        LeaderRole::Dm2 => "DM 2",
    }
}

/// What a delete confirmation is about to remove.
#[derive(Clone)]
pub(crate) enum ConfirmDelete {
    Song { id: String, name: String },
    Member { id: String, name: String },
    Schedule { id: String, label: String },
}

impl ConfirmDelete {
    pub(crate) fn prompt(&self) -> String {
        match self {
            ConfirmDelete::Song { name, .. } => format!("Delete the song '{name}'?"),
            ConfirmDelete::Member { name, .. } => format!("Delete the band member '{name}'?"),
            ConfirmDelete::Schedule { label, .. } => format!("Delete the schedule for {label}?"),
        }
    }

    pub(crate) fn warning(&self) -> &'static str {
        match self {
            ConfirmDelete::Song { .. } => "It will also be removed from every schedule.",
            ConfirmDelete::Member { .. } => {
                "Their availability and schedule placements are removed too."
            }
            ConfirmDelete::Schedule { .. } => "Songs, band, and leaders of that Sunday are lost.",
        }
    }
}

/// Comma separated input into trimmed, non-empty values.
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

fn step<T: Copy + PartialEq>(all: &[T], current: T, offset: isize) -> T {
    let len = all.len() as isize;
    let index = all.iter().position(|item| *item == current).unwrap_or(0) as isize;
    all[(index + offset).rem_euclid(len) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_form_requires_a_name() {
        let form = SongForm::default();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn song_form_parses_lists_and_duration() {
        let mut form = SongForm {
            name: " Hosanna ".into(),
            key_history: "E, D,, C".into(),
            duration: "245".into(),
            ..SongForm::default()
        };
        form.active = SongField::Category;
        form.push_char('x');
        let draft = form.parse_inputs().unwrap().into_draft();
        assert_eq!(draft.name, "Hosanna");
        assert_eq!(draft.key_history, vec!["E", "D", "C"]);
        assert_eq!(draft.duration, 245);
        assert_eq!(draft.category, Category::Praise);
    }

    #[test]
    fn duration_rejects_letters() {
        let mut form = SongForm {
            name: "Hosanna".into(),
            active: SongField::Duration,
            ..SongForm::default()
        };
        assert!(!form.push_char('a'));
        assert!(form.push_char('9'));
        assert_eq!(form.duration, "9");
    }

    #[test]
    fn field_focus_wraps() {
        let mut form = MemberForm::default();
        form.previous_field();
        assert!(form.active == MemberField::Instruments);
        form.next_field();
        assert!(form.active == MemberField::FirstName);
    }

    #[test]
    fn leaders_form_reports_only_changes() {
        let current = Leaders {
            talkback: "Ana".into(),
            dm1: String::new(),
            dm2: "Juan".into(),
        };
        let mut form = LeadersForm::from_leaders(&current);
        form.next_field();
        for ch in "Luis".chars() {
            form.push_char(ch);
        }
        assert_eq!(form.changes(&current), vec![(LeaderRole::Dm1, "Luis".to_string())]);
    }
}
