//! Planning horizon and weekday arithmetic.
//!
//! A horizon is a run of `num_days` consecutive days, day 0 falling on
//! `first_weekday`. Everything here is a pure function of those two values.
//!
//! # Blocks
//! - **Week block**: days `[7k, 7k + 7)`. Only complete blocks are reported.
//! - **Weekend block**: the Saturday/Sunday pair
//!   `(we * 7 + s, we * 7 + s + 1)` where `s` is the number of days until the
//!   first Saturday. At most [`MAX_WEEKEND_BLOCKS`] blocks are used, and only
//!   pairs lying fully inside the horizon.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of weekend blocks considered by weekend rules.
pub const MAX_WEEKEND_BLOCKS: usize = 4;

/// Day of the week, Monday first.
///
/// Serializes as `"mon"`..`"sun"`; deserializes from any name [`FromStr`]
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

/// Language used for weekday names in column labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekdayNames {
    /// `Mon`, `Tue`, ...
    #[default]
    English,
    /// `月`, `火`, ...
    Japanese,
}

const ENGLISH: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const ENGLISH_LONG: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];
const JAPANESE: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];

impl Weekday {
    /// All weekdays, Monday first.
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Zero-based index (Mon = 0, Sun = 6).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Weekday for an index, wrapping modulo 7.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % 7]
    }

    /// Whether this is Saturday or Sunday.
    #[inline]
    pub fn is_weekend(self) -> bool {
        matches!(self, Weekday::Sat | Weekday::Sun)
    }

    /// Display name in the given style.
    pub fn name(self, names: WeekdayNames) -> &'static str {
        match names {
            WeekdayNames::English => ENGLISH[self.index()],
            WeekdayNames::Japanese => JAPANESE[self.index()],
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(WeekdayNames::English))
    }
}

/// Error returned when a weekday name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weekday name '{0}'")]
pub struct ParseWeekdayError(pub String);

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    /// Accepts `Mon`, `monday`, `月` and friends, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();
        (0..7)
            .find(|&i| {
                lower == ENGLISH[i].to_lowercase()
                    || lower == ENGLISH_LONG[i]
                    || trimmed == JAPANESE[i]
                    || trimmed == format!("{}曜日", JAPANESE[i])
            })
            .map(Weekday::from_index)
            .ok_or_else(|| ParseWeekdayError(s.to_string()))
    }
}

impl TryFrom<String> for Weekday {
    type Error = ParseWeekdayError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// The planning horizon: `num_days` days starting on `first_weekday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    num_days: usize,
    first_weekday: Weekday,
}

impl Horizon {
    /// Creates a horizon.
    pub fn new(num_days: usize, first_weekday: Weekday) -> Self {
        Self {
            num_days,
            first_weekday,
        }
    }

    /// Number of days.
    #[inline]
    pub fn num_days(&self) -> usize {
        self.num_days
    }

    /// Weekday of day 0.
    #[inline]
    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    /// Day indices `0..num_days`.
    #[inline]
    pub fn days(&self) -> Range<usize> {
        0..self.num_days
    }

    /// Weekday of day `d`: `(first_weekday + d) mod 7`.
    #[inline]
    pub fn weekday(&self, day: usize) -> Weekday {
        Weekday::from_index(self.first_weekday.index() + day)
    }

    /// Whether day `d` falls on Saturday or Sunday.
    #[inline]
    pub fn is_weekend(&self, day: usize) -> bool {
        self.weekday(day).is_weekend()
    }

    /// Week block index of day `d` (`d / 7`).
    #[inline]
    pub fn week_block(&self, day: usize) -> usize {
        day / 7
    }

    /// Day ranges of the complete 7-day blocks.
    ///
    /// A trailing partial week is not reported.
    pub fn week_blocks(&self) -> impl Iterator<Item = Range<usize>> {
        (0..self.num_days / 7).map(|k| k * 7..k * 7 + 7)
    }

    /// Days from day 0 to the first Saturday (0..=6).
    #[inline]
    pub fn days_until_first_saturday(&self) -> usize {
        (Weekday::Sat.index() + 7 - self.first_weekday.index()) % 7
    }

    /// Saturday and Sunday of weekend block `we`.
    ///
    /// Returns `None` if `we >= MAX_WEEKEND_BLOCKS` or the pair does not lie
    /// fully inside the horizon.
    pub fn weekend_block(&self, we: usize) -> Option<(usize, usize)> {
        if we >= MAX_WEEKEND_BLOCKS {
            return None;
        }
        let sat = we * 7 + self.days_until_first_saturday();
        let sun = sat + 1;
        (sun < self.num_days).then_some((sat, sun))
    }

    /// All complete weekend blocks as `(block, saturday, sunday)`.
    pub fn weekend_blocks(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..MAX_WEEKEND_BLOCKS)
            .filter_map(move |we| self.weekend_block(we).map(|(sat, sun)| (we, sat, sun)))
    }

    /// Days falling on `weekday`.
    pub fn days_on(&self, weekday: Weekday) -> impl Iterator<Item = usize> + '_ {
        self.days().filter(move |&d| self.weekday(d) == weekday)
    }

    /// Whether `weekday` occurs at least once in the horizon.
    pub fn contains_weekday(&self, weekday: Weekday) -> bool {
        self.days_on(weekday).next().is_some()
    }

    /// Column label for day `d`: `"{day_number} ({weekday_name})"`, 1-based.
    pub fn column_label(&self, day: usize, names: WeekdayNames) -> String {
        format!("{} ({})", day + 1, self.weekday(day).name(names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_wraps() {
        let h = Horizon::new(30, Weekday::Fri);
        assert_eq!(h.weekday(0), Weekday::Fri);
        assert_eq!(h.weekday(1), Weekday::Sat);
        assert_eq!(h.weekday(3), Weekday::Mon);
        assert_eq!(h.weekday(7), Weekday::Fri);
        assert!(h.is_weekend(2));
        assert!(!h.is_weekend(3));
    }

    #[test]
    fn test_week_blocks_skip_partial_week() {
        let h = Horizon::new(30, Weekday::Mon);
        let blocks: Vec<_> = h.week_blocks().collect();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[3], 21..28);
        assert_eq!(h.week_block(29), 4);
    }

    #[test]
    fn test_weekend_blocks_from_monday() {
        let h = Horizon::new(28, Weekday::Mon);
        assert_eq!(h.days_until_first_saturday(), 5);
        let blocks: Vec<_> = h.weekend_blocks().collect();
        assert_eq!(blocks, vec![(0, 5, 6), (1, 12, 13), (2, 19, 20), (3, 26, 27)]);
    }

    #[test]
    fn test_weekend_block_outside_horizon() {
        // Day 0 is Sunday: first Saturday is day 6, block 3 needs day 28.
        let h = Horizon::new(28, Weekday::Sun);
        assert_eq!(h.weekend_block(0), Some((6, 7)));
        assert_eq!(h.weekend_block(3), None);
        assert_eq!(h.weekend_blocks().count(), 3);
        assert_eq!(h.weekend_block(4), None);
    }

    #[test]
    fn test_weekend_block_days_are_weekend() {
        for first in Weekday::ALL {
            let h = Horizon::new(31, first);
            for (_, sat, sun) in h.weekend_blocks() {
                assert_eq!(h.weekday(sat), Weekday::Sat);
                assert_eq!(h.weekday(sun), Weekday::Sun);
            }
        }
    }

    #[test]
    fn test_days_on() {
        let h = Horizon::new(10, Weekday::Wed);
        let mondays: Vec<_> = h.days_on(Weekday::Mon).collect();
        assert_eq!(mondays, vec![5]);
        assert!(!Horizon::new(3, Weekday::Mon).contains_weekday(Weekday::Sun));
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!("Mon".parse::<Weekday>(), Ok(Weekday::Mon));
        assert_eq!("SATURDAY".parse::<Weekday>(), Ok(Weekday::Sat));
        assert_eq!("日".parse::<Weekday>(), Ok(Weekday::Sun));
        assert_eq!("水曜日".parse::<Weekday>(), Ok(Weekday::Wed));
        assert!("Funday".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_weekday_json_is_case_insensitive() {
        for (json, expected) in [
            (r#""Saturday""#, Weekday::Sat),
            (r#""SAT""#, Weekday::Sat),
            (r#""土""#, Weekday::Sat),
            (r#""mon""#, Weekday::Mon),
            (r#""水曜日""#, Weekday::Wed),
        ] {
            assert_eq!(serde_json::from_str::<Weekday>(json).unwrap(), expected, "{json}");
        }
        assert!(serde_json::from_str::<Weekday>(r#""caturday""#).is_err());
    }

    #[test]
    fn test_weekday_json_round_trip() {
        for wd in Weekday::ALL {
            let text = serde_json::to_string(&wd).unwrap();
            assert_eq!(serde_json::from_str::<Weekday>(&text).unwrap(), wd);
        }
        assert_eq!(serde_json::to_string(&Weekday::Thu).unwrap(), r#""thu""#);
    }

    #[test]
    fn test_column_label() {
        let h = Horizon::new(7, Weekday::Mon);
        assert_eq!(h.column_label(0, WeekdayNames::English), "1 (Mon)");
        assert_eq!(h.column_label(6, WeekdayNames::Japanese), "7 (日)");
    }
}
