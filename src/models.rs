//! Domain models shared by the persistence gateways, the entity store, and the
//! terminal UI. These types stay light-weight data holders; the serde shape
//! (camelCase, dates as `YYYY-MM-DD`) is the in-memory entity shape that the
//! local document store writes verbatim and the SQLite gateway maps onto rows.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::date_format;

/// Instrument tags offered when creating a member. Members may also carry
/// free-form tags outside this palette.
pub const INSTRUMENT_PALETTE: [&str; 10] = [
    "VOX1", "VOX2", "VOX3", "VOX4", "BASS", "DRUMS", "EG1", "EG2", "AG", "KEYS",
];

/// Substring marking an instrument as a vocal slot. Matching is
/// case-sensitive.
pub const VOCAL_MARKER: &str = "VOX";

/// Fresh random identifier for entities and schedule placements.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Closed set of song categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Worship,
    Praise,
    Hymn,
    Special,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Worship,
        Category::Praise,
        Category::Hymn,
        Category::Special,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Worship => "worship",
            Category::Praise => "praise",
            Category::Hymn => "hymn",
            Category::Special => "special",
        }
    }

    /// The next category in [`Category::ALL`], wrapping around. Used by the
    /// song form to cycle through the closed set.
    pub fn cycle(&self) -> Category {
        let index = Category::ALL
            .iter()
            .position(|category| category == self)
            .unwrap_or(0);
        Category::ALL[(index + 1) % Category::ALL.len()]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "worship" => Ok(Category::Worship),
            "praise" => Ok(Category::Praise),
            "hymn" => Ok(Category::Hymn),
            "special" => Ok(Category::Special),
            other => Err(format!("unknown song category: {other}")),
        }
    }
}

/// A song in the band's repertoire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Key the band currently plays the song in.
    #[serde(default)]
    pub current_key: String,
    /// Keys the song has been played in before, oldest first.
    #[serde(default)]
    pub key_history: Vec<String>,
    #[serde(default)]
    pub original_singer: String,
    #[serde(default)]
    pub youtube_link: String,
    #[serde(default)]
    pub lyrics: String,
    /// Free-text scripture references the song draws on.
    #[serde(default)]
    pub verses: String,
    /// Length in seconds.
    #[serde(default)]
    pub duration: u32,
    #[serde(default)]
    pub category: Category,
    /// Explicit position set by a manual reorder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Song {
    /// `Name - Original singer`, omitting the hyphen when the singer is blank.
    pub fn display_title(&self) -> String {
        if self.original_singer.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.name, self.original_singer)
        }
    }

    /// Duration rendered as `m:ss`.
    pub fn display_duration(&self) -> String {
        format!("{}:{:02}", self.duration / 60, self.duration % 60)
    }

    /// Shallow merge: provided fields replace the stored ones, lists included.
    pub fn apply(&mut self, patch: &SongPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(key) = &patch.current_key {
            self.current_key = key.clone();
        }
        if let Some(history) = &patch.key_history {
            self.key_history = history.clone();
        }
        if let Some(singer) = &patch.original_singer {
            self.original_singer = singer.clone();
        }
        if let Some(link) = &patch.youtube_link {
            self.youtube_link = link.clone();
        }
        if let Some(lyrics) = &patch.lyrics {
            self.lyrics = lyrics.clone();
        }
        if let Some(verses) = &patch.verses {
            self.verses = verses.clone();
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(order) = patch.order {
            self.order = Some(order);
        }
    }
}

/// Input for creating a song; the store assigns the identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewSong {
    pub name: String,
    pub current_key: String,
    pub key_history: Vec<String>,
    pub original_singer: String,
    pub youtube_link: String,
    pub lyrics: String,
    pub verses: String,
    pub duration: u32,
    pub category: Category,
    pub order: Option<i64>,
}

impl NewSong {
    pub fn into_song(self, id: String) -> Song {
        Song {
            id,
            name: self.name,
            current_key: self.current_key,
            key_history: self.key_history,
            original_singer: self.original_singer,
            youtube_link: self.youtube_link,
            lyrics: self.lyrics,
            verses: self.verses,
            duration: self.duration,
            category: self.category,
            order: self.order,
        }
    }
}

/// Partial song update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongPatch {
    pub name: Option<String>,
    pub current_key: Option<String>,
    pub key_history: Option<Vec<String>>,
    pub original_singer: Option<String>,
    pub youtube_link: Option<String>,
    pub lyrics: Option<String>,
    pub verses: Option<String>,
    pub duration: Option<u32>,
    pub category: Option<Category>,
    pub order: Option<i64>,
}

/// A member's stated availability for one Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    #[serde(default)]
    pub available: bool,
}

/// A band member and the Sundays they have answered for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandMember {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub instruments: Vec<String>,
    /// Sparse: a missing date means "no answer", which each caller interprets
    /// through an [`AvailabilityPolicy`](crate::availability::AvailabilityPolicy).
    #[serde(default)]
    pub availability: Vec<AvailabilityRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl BandMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn apply(&mut self, patch: &MemberPatch) {
        if let Some(first_name) = &patch.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(instruments) = &patch.instruments {
            self.instruments = instruments.clone();
        }
        if let Some(availability) = &patch.availability {
            self.availability = availability.clone();
        }
        if let Some(order) = patch.order {
            self.order = Some(order);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMember {
    pub first_name: String,
    pub last_name: String,
    pub instruments: Vec<String>,
    pub availability: Vec<AvailabilityRecord>,
    pub order: Option<i64>,
}

impl NewMember {
    pub fn into_member(self, id: String) -> BandMember {
        BandMember {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            instruments: self.instruments,
            availability: self.availability,
            order: self.order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub instruments: Option<Vec<String>>,
    pub availability: Option<Vec<AvailabilityRecord>>,
    pub order: Option<i64>,
}

/// A song placed on a schedule. `schedule_item_id` identifies the placement,
/// `song_id` the underlying song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSongEntry {
    #[serde(rename = "id")]
    pub song_id: String,
    pub schedule_item_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub singer: String,
    /// 1-based position in the schedule's song list.
    #[serde(default)]
    pub order: u32,
}

/// A member placed on a schedule under one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleBandEntry {
    #[serde(rename = "id")]
    pub member_id: String,
    pub schedule_item_id: String,
    /// Member first name, as shown on the schedule.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub instrument: String,
    #[serde(default)]
    pub order: u32,
}

impl ScheduleBandEntry {
    pub fn is_vocal(&self) -> bool {
        self.instrument.contains(VOCAL_MARKER)
    }
}

/// Non-musical role slots carried per schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaderRole {
    Talkback,
    Dm1,
    Dm2,
}

impl LeaderRole {
    pub const ALL: [LeaderRole; 3] = [LeaderRole::Talkback, LeaderRole::Dm1, LeaderRole::Dm2];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeaderRole::Talkback => "talkback",
            LeaderRole::Dm1 => "dm1",
            LeaderRole::Dm2 => "dm2",
        }
    }
}

impl fmt::Display for LeaderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LeaderRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "talkback" => Ok(LeaderRole::Talkback),
            "dm1" => Ok(LeaderRole::Dm1),
            "dm2" => Ok(LeaderRole::Dm2),
            other => Err(format!("unknown leader role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaders {
    #[serde(default)]
    pub talkback: String,
    #[serde(default)]
    pub dm1: String,
    #[serde(default)]
    pub dm2: String,
}

impl Leaders {
    pub fn get(&self, role: LeaderRole) -> &str {
        match role {
            LeaderRole::Talkback => &self.talkback,
            LeaderRole::Dm1 => &self.dm1,
            LeaderRole::Dm2 => &self.dm2,
        }
    }

    pub fn set(&mut self, role: LeaderRole, value: impl Into<String>) {
        let value = value.into();
        match role {
            LeaderRole::Talkback => self.talkback = value,
            LeaderRole::Dm1 => self.dm1 = value,
            LeaderRole::Dm2 => self.dm2 = value,
        }
    }

    pub fn apply(&mut self, patch: &LeadersPatch) {
        if let Some(talkback) = &patch.talkback {
            self.talkback = talkback.clone();
        }
        if let Some(dm1) = &patch.dm1 {
            self.dm1 = dm1.clone();
        }
        if let Some(dm2) = &patch.dm2 {
            self.dm2 = dm2.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadersPatch {
    pub talkback: Option<String>,
    pub dm1: Option<String>,
    pub dm2: Option<String>,
}

impl LeadersPatch {
    /// A patch touching exactly one role.
    pub fn single(role: LeaderRole, value: impl Into<String>) -> Self {
        let value = Some(value.into());
        match role {
            LeaderRole::Talkback => Self {
                talkback: value,
                ..Self::default()
            },
            LeaderRole::Dm1 => Self {
                dm1: value,
                ..Self::default()
            },
            LeaderRole::Dm2 => Self {
                dm2: value,
                ..Self::default()
            },
        }
    }
}

/// One Sunday's plan: songs with singers, band with instruments, and leaders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SundaySchedule {
    pub id: String,
    #[serde(with = "date_format")]
    pub date: NaiveDate,
    #[serde(default)]
    pub songs: Vec<ScheduleSongEntry>,
    #[serde(default)]
    pub band: Vec<ScheduleBandEntry>,
    #[serde(default)]
    pub leaders: Leaders,
}

impl SundaySchedule {
    pub fn apply(&mut self, patch: &SchedulePatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(songs) = &patch.songs {
            self.songs = songs.clone();
        }
        if let Some(band) = &patch.band {
            self.band = band.clone();
        }
        if let Some(leaders) = &patch.leaders {
            self.leaders.apply(leaders);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSchedule {
    pub date: NaiveDate,
    pub songs: Vec<ScheduleSongEntry>,
    pub band: Vec<ScheduleBandEntry>,
    pub leaders: Leaders,
}

impl NewSchedule {
    /// A schedule for `date` with nothing assigned yet.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            songs: Vec::new(),
            band: Vec::new(),
            leaders: Leaders::default(),
        }
    }

    pub fn into_schedule(self, id: String) -> SundaySchedule {
        SundaySchedule {
            id,
            date: self.date,
            songs: self.songs,
            band: self.band,
            leaders: self.leaders,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulePatch {
    pub date: Option<NaiveDate>,
    pub songs: Option<Vec<ScheduleSongEntry>>,
    pub band: Option<Vec<ScheduleBandEntry>>,
    pub leaders: Option<LeadersPatch>,
}
