//! Culture-aware parsing of loosely formatted date and time text.
//!
//! ISO-8601 forms are always accepted. Slash/dash/dot separated forms are
//! ambiguous (`01/02/2007`), so a [`DateTimeDecider`] resolves them with a
//! [`DateOrder`] taken from the culture or settled from sample values with
//! [`guess_date_format`].

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::DialectError;

const ISO_DATE_TIMES: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const ISO_DATES: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

const MONTH_FIRST_DATE_TIMES: &[&str] = &[
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m-%d-%Y %H:%M:%S%.f",
    "%m.%d.%Y %H:%M:%S%.f",
];
const MONTH_FIRST_DATES: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y", "%b %d %Y", "%B %d %Y"];

const DAY_FIRST_DATE_TIMES: &[&str] = &[
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %I:%M:%S %p",
    "%d/%m/%Y %I:%M %p",
    "%d-%m-%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
];
const DAY_FIRST_DATES: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %b %Y", "%d %B %Y"];

const TIMES: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// Culture used to read ambiguous dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Culture {
    /// Month first, like en-US.
    #[default]
    #[serde(rename = "invariant", alias = "")]
    Invariant,
    #[serde(rename = "en-US", alias = "en-us")]
    EnUs,
    #[serde(rename = "en-GB", alias = "en-gb")]
    EnGb,
}

impl Culture {
    pub fn name(&self) -> &'static str {
        match self {
            Culture::Invariant => "invariant",
            Culture::EnUs => "en-US",
            Culture::EnGb => "en-GB",
        }
    }

    /// Component order this culture uses for numeric dates.
    pub fn date_order(&self) -> DateOrder {
        match self {
            Culture::Invariant | Culture::EnUs => DateOrder::MonthFirst,
            Culture::EnGb => DateOrder::DayFirst,
        }
    }
}

impl FromStr for Culture {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "invariant" => Ok(Culture::Invariant),
            "en-us" | "en_us" => Ok(Culture::EnUs),
            "en-gb" | "en_gb" => Ok(Culture::EnGb),
            other => Err(DialectError::Config(format!(
                "Unknown culture: '{}'. Supported cultures: invariant, en-US, en-GB",
                other
            ))),
        }
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which numeric component of an ambiguous date is the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthFirst,
    DayFirst,
}

/// Leading two numeric components of a separated date, unless it is ISO.
fn leading_components(text: &str) -> Option<(u32, u32)> {
    let mut parts = text
        .trim()
        .split(|c: char| c == '/' || c == '-' || c == '.' || c.is_whitespace());
    let first = parts.next()?;
    let second = parts.next()?;
    if first.len() == 4 {
        return None;
    }
    Some((first.parse().ok()?, second.parse().ok()?))
}

/// Settle the component order of a set of samples.
///
/// Each sample whose first component exceeds 12 votes day-first; each whose
/// second component exceeds 12 votes month-first. Ties (including no votes)
/// fall back to `fallback`.
pub fn guess_date_format<'a, I>(samples: I, fallback: DateOrder) -> DateOrder
where
    I: IntoIterator<Item = &'a str>,
{
    let (mut day_first, mut month_first) = (0usize, 0usize);
    for (a, b) in samples.into_iter().filter_map(leading_components) {
        if a > 12 && b <= 12 {
            day_first += 1;
        } else if b > 12 && a <= 12 {
            month_first += 1;
        }
    }
    match day_first.cmp(&month_first) {
        std::cmp::Ordering::Greater => DateOrder::DayFirst,
        std::cmp::Ordering::Less => DateOrder::MonthFirst,
        std::cmp::Ordering::Equal => fallback,
    }
}

/// Parses date/time text for one culture, optionally pinned to a settled order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeDecider {
    culture: Culture,
    order: DateOrder,
}

impl Default for DateTimeDecider {
    fn default() -> Self {
        Self::new(Culture::default())
    }
}

impl DateTimeDecider {
    pub fn new(culture: Culture) -> Self {
        Self {
            culture,
            order: culture.date_order(),
        }
    }

    /// A decider whose order was settled from `samples`.
    pub fn from_samples<'a, I>(culture: Culture, samples: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            culture,
            order: guess_date_format(samples, culture.date_order()),
        }
    }

    pub fn culture(&self) -> Culture {
        self.culture
    }

    pub fn order(&self) -> DateOrder {
        self.order
    }

    fn ordered_formats(&self) -> (&'static [&'static str], &'static [&'static str]) {
        match self.order {
            DateOrder::MonthFirst => (MONTH_FIRST_DATE_TIMES, MONTH_FIRST_DATES),
            DateOrder::DayFirst => (DAY_FIRST_DATE_TIMES, DAY_FIRST_DATES),
        }
    }

    /// Parse a date or date-time. Date-only text resolves to midnight.
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let (date_times, dates) = self.ordered_formats();
        ISO_DATE_TIMES
            .iter()
            .chain(date_times)
            .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
            .or_else(|| {
                ISO_DATES
                    .iter()
                    .chain(dates)
                    .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }

    /// Parse a time of day.
    pub fn parse_time(&self, text: &str) -> Option<NaiveTime> {
        let text = text.trim();
        TIMES
            .iter()
            .find_map(|f| NaiveTime::parse_from_str(text, f).ok())
    }

    pub fn is_date(&self, text: &str) -> bool {
        self.parse(text).is_some()
    }

    pub fn is_time(&self, text: &str) -> bool {
        self.parse_time(text).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_iso_and_us_text_agree() {
        let decider = DateTimeDecider::new(Culture::EnUs);
        assert_eq!(decider.parse("01/01/2007 00:00:00"), Some(ymd(2007, 1, 1)));
        assert_eq!(decider.parse("2007-01-01 00:00:00"), Some(ymd(2007, 1, 1)));
        assert_eq!(decider.parse("2007-01-01"), Some(ymd(2007, 1, 1)));
    }

    #[test]
    fn test_culture_decides_ambiguous_dates() {
        assert_eq!(
            DateTimeDecider::new(Culture::EnUs).parse("02/03/2010"),
            Some(ymd(2010, 2, 3))
        );
        assert_eq!(
            DateTimeDecider::new(Culture::EnGb).parse("02/03/2010"),
            Some(ymd(2010, 3, 2))
        );
    }

    #[test]
    fn test_guess_date_format_from_samples() {
        let samples = ["01/02/2001", "28/02/2001", "13/11/2001"];
        assert_eq!(
            guess_date_format(samples.iter().copied(), DateOrder::MonthFirst),
            DateOrder::DayFirst
        );
        let decider = DateTimeDecider::from_samples(Culture::EnUs, samples.iter().copied());
        assert_eq!(decider.parse("01/02/2001"), Some(ymd(2001, 2, 1)));
    }

    #[test]
    fn test_guess_date_format_tie_uses_fallback() {
        let samples = ["01/02/2001", "2001-05-06"];
        assert_eq!(
            guess_date_format(samples.iter().copied(), DateOrder::DayFirst),
            DateOrder::DayFirst
        );
    }

    #[test]
    fn test_not_dates() {
        let decider = DateTimeDecider::default();
        for text in ["", "hello", "15", "29.9", "13/13/2001"] {
            assert!(!decider.is_date(text), "{}", text);
        }
    }

    #[test]
    fn test_parse_time() {
        let decider = DateTimeDecider::default();
        assert_eq!(decider.parse_time("13:45"), NaiveTime::from_hms_opt(13, 45, 0));
        assert_eq!(decider.parse_time("1:05:09 PM"), NaiveTime::from_hms_opt(13, 5, 9));
        assert!(decider.parse_time("2007-01-01").is_none());
    }

    #[test]
    fn test_culture_from_str() {
        assert_eq!("en-GB".parse::<Culture>().unwrap(), Culture::EnGb);
        assert_eq!("EN-us".parse::<Culture>().unwrap(), Culture::EnUs);
        assert!("fr-FR".parse::<Culture>().is_err());
        let json = serde_json::to_string(&Culture::EnGb).unwrap();
        assert_eq!(json, "\"en-GB\"");
    }
}
