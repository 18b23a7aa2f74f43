//! Calendar helpers: Sundays of a month, month navigation, grouping schedules
//! by month, and the date-only normalization every stored date goes through.
//!
//! Months are zero-based throughout (`0` = January, `11` = December) so month
//! keys stay compatible with the `"{year}-{month}"` keys the dashboard has
//! always used.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::SundaySchedule;

/// Format used for every persisted calendar date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const MONTHS_EN: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Language used for month/year display names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

/// Descriptor for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthInfo {
    /// `"{year}-{zero_based_month}"`.
    pub key: String,
    /// Localized "month year" label.
    pub name: String,
    pub year: i32,
    /// Zero-based month index.
    pub month: u32,
}

/// The months around a given month, used by the availability grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacentMonths {
    pub previous: MonthInfo,
    pub current: MonthInfo,
    pub next: MonthInfo,
}

/// A schedule tagged with the display name of the month it belongs to.
#[derive(Debug, Clone)]
pub struct MonthlySchedule<'a> {
    pub month_name: String,
    pub schedule: &'a SundaySchedule,
}

/// Schedules sharing one calendar month, in their original relative order.
#[derive(Debug, Clone)]
pub struct MonthGroup<'a> {
    pub key: String,
    pub schedules: Vec<MonthlySchedule<'a>>,
}

impl MonthGroup<'_> {
    /// Display name of the group (identical on every member).
    pub fn name(&self) -> &str {
        self.schedules
            .first()
            .map(|entry| entry.month_name.as_str())
            .unwrap_or_default()
    }
}

/// Every Sunday of `month` (zero-based) in `year`, ascending.
pub fn sundays_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    if month > 11 {
        return Vec::new();
    }
    let Some(first) = NaiveDate::from_ymd_opt(year, month + 1, 1) else {
        return Vec::new();
    };
    let (next_year, next_month) = next_month(year, month);
    let Some(next_first) = NaiveDate::from_ymd_opt(next_year, next_month + 1, 1) else {
        return Vec::new();
    };
    sundays_in_range(first, next_first - Duration::days(1))
}

/// Every Sunday between `start` and `end`, both inclusive. Empty when the range
/// is inverted or simply holds no Sunday.
pub fn sundays_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut sundays = Vec::new();
    if start > end {
        return sundays;
    }
    let offset = (7 - start.weekday().num_days_from_sunday()) % 7;
    let mut current = start + Duration::days(i64::from(offset));
    while current <= end {
        debug_assert_eq!(current.weekday(), Weekday::Sun);
        sundays.push(current);
        current += Duration::days(7);
    }
    sundays
}

/// Sundays of the month containing `today` followed by those of the next month.
pub fn sundays_for_current_and_next_month(today: NaiveDate) -> Vec<NaiveDate> {
    upcoming_sundays(today, 2)
}

/// Sundays of the month containing `today` and the `months - 1` months after
/// it. Used to seed an empty schedule collection.
pub fn upcoming_sundays(today: NaiveDate, months: u32) -> Vec<NaiveDate> {
    let (mut year, mut month) = (today.year(), today.month0());
    let mut sundays = Vec::new();
    for _ in 0..months {
        sundays.extend(sundays_in_month(year, month));
        (year, month) = next_month(year, month);
    }
    sundays
}

/// The month after `(year, month)`, wrapping December into January.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 11 {
        (year + 1, 0)
    } else {
        (year, month + 1)
    }
}

/// The month before `(year, month)`, wrapping January into December.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 0 {
        (year - 1, 11)
    } else {
        (year, month - 1)
    }
}

/// Localized "month year" label, e.g. `junio de 2024` or `June 2024`.
pub fn month_year_label(year: i32, month: u32, locale: Locale) -> String {
    let index = (month as usize).min(11);
    match locale {
        Locale::Es => format!("{} de {year}", MONTHS_ES[index]),
        Locale::En => format!("{} {year}", MONTHS_EN[index]),
    }
}

/// Localized day label for a schedule row, e.g. `domingo 2 de junio` or
/// `Sunday, June 2`.
pub fn sunday_label(date: NaiveDate, locale: Locale) -> String {
    let index = date.month0() as usize;
    match locale {
        Locale::Es => format!("domingo {} de {}", date.day(), MONTHS_ES[index]),
        Locale::En => format!("Sunday, {} {}", MONTHS_EN[index], date.day()),
    }
}

pub fn month_info(year: i32, month: u32, locale: Locale) -> MonthInfo {
    MonthInfo {
        key: month_key(year, month),
        name: month_year_label(year, month, locale),
        year,
        month,
    }
}

/// Previous / current / next month descriptors in the default locale.
pub fn adjacent_months(year: i32, month: u32) -> AdjacentMonths {
    adjacent_months_in(year, month, Locale::default())
}

pub fn adjacent_months_in(year: i32, month: u32, locale: Locale) -> AdjacentMonths {
    let (prev_year, prev_month) = previous_month(year, month);
    let (next_year, next_month) = next_month(year, month);
    AdjacentMonths {
        previous: month_info(prev_year, prev_month, locale),
        current: month_info(year, month, locale),
        next: month_info(next_year, next_month, locale),
    }
}

/// Group schedules by calendar month. Groups appear in the order their first
/// schedule appears; schedules keep their input order inside a group.
pub fn group_by_month(schedules: &[SundaySchedule], locale: Locale) -> Vec<MonthGroup<'_>> {
    let mut groups: Vec<MonthGroup<'_>> = Vec::new();
    for schedule in schedules {
        let (year, month) = (schedule.date.year(), schedule.date.month0());
        let key = month_key(year, month);
        let entry = MonthlySchedule {
            month_name: month_year_label(year, month, locale),
            schedule,
        };
        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.schedules.push(entry),
            None => groups.push(MonthGroup {
                key,
                schedules: vec![entry],
            }),
        }
    }
    groups
}

fn month_key(year: i32, month: u32) -> String {
    format!("{year}-{month}")
}

/// Parse a stored date, keeping only its calendar-date portion. Accepts
/// `YYYY-MM-DD` as well as full ISO timestamps such as
/// `2024-06-02T05:00:00.000Z`; the time of day and offset are dropped.
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date_part = text.get(..10)?;
    match text[10..].chars().next() {
        None | Some('T') | Some('t') | Some(' ') => {}
        Some(_) => return None,
    }
    NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()
}

pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Serde adapter storing [`NaiveDate`] as `YYYY-MM-DD` and reading it back
/// through [`parse_calendar_date`].
pub mod date_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_calendar_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid calendar date: {raw}")))
    }
}
