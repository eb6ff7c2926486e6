use std::fmt;
use std::ops::Index;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

/// Longest slug generated from a title.
pub const MAX_SLUG_LEN: usize = 50;

/// Date of a post as written in its front matter.
///
/// Jekyll accepts a bare day (`2024-01-15`) as well as a day with time and an
/// optional UTC offset (`2024-01-15 10:30:00 +0100`). The offset is kept as
/// written; the calendar day is the one the author typed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostDate {
    pub date_time: NaiveDateTime,
    pub has_time: bool,
    pub offset: Option<FixedOffset>,
}

impl PostDate {
    pub fn day(&self) -> NaiveDate {
        self.date_time.date()
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_time {
            return write!(f, "{}", self.date_time.format("%Y-%m-%d"));
        }
        write!(f, "{}", self.date_time.format("%Y-%m-%d %H:%M:%S"))?;
        if let Some(offset) = self.offset {
            let secs = offset.local_minus_utc();
            let sign = if secs < 0 { '-' } else { '+' };
            let secs = secs.abs();
            write!(f, " {}{:02}{:02}", sign, secs / 3600, (secs % 3600) / 60)?;
        }
        Ok(())
    }
}

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

fn parse_offset(buf: &str, date_str: &str) -> Result<FixedOffset, String> {
    if buf == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(|| format!("Invalid offset in {}", date_str));
    }

    let sign = if buf.starts_with('-') { -1 } else { 1 };
    let digits: String = buf[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 {
        return Err(format!("Invalid offset {} in {}", buf, date_str));
    }
    let hours: i32 = to_int(&digits[0..2], date_str)?;
    let minutes: i32 = to_int(&digits[2..4], date_str)?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| format!("Invalid offset {} in {}", buf, date_str))
}

/// Parses a front matter date: `YYYY-MM-DD`, optionally followed by a time
/// (`HH:MM` or `HH:MM:SS`, fractions ignored) separated by a space or `T`, and an
/// optional `Z` / `±HHMM` / `±HH:MM` offset.
pub fn parse_post_date(buf: &str) -> Result<PostDate, String> {
    lazy_static! {
        static ref DATE_REGEX: Regex = Regex::new(
            r"^(\d{4})-(\d{2})-(\d{2})(?:[T ](\d{1,2}):(\d{2})(?::(\d{2})(?:\.\d+)?)?)?\s*(Z|[+-]\d{2}:?\d{2})?$"
        ).unwrap();
    }

    let buf = buf.trim();
    let Some(caps) = DATE_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date {}", buf));
    };

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;

    let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
        return Err(format!("{} is not a calendar date", buf));
    };

    let has_time = caps.get(4).is_some();
    let time = if has_time {
        let h: u32 = to_u32(caps.index(4))?;
        let mn: u32 = to_u32(caps.index(5))?;
        let s: u32 = match caps.get(6) {
            Some(s) => to_u32(s.as_str())?,
            None => 0,
        };
        NaiveTime::from_hms_opt(h, mn, s).ok_or_else(|| format!("{} has an invalid time", buf))?
    } else {
        NaiveTime::MIN
    };

    let offset = match caps.get(7) {
        Some(offset) => Some(parse_offset(offset.as_str(), buf)?),
        None => None,
    };

    Ok(PostDate {
        date_time: NaiveDateTime::new(date, time),
        has_time,
        offset,
    })
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Turns a title into a file name slug: ASCII only, lowercase, words joined by `-`.
pub fn slugify(title: &str) -> String {
    let ascii = unidecode::unidecode(title);
    let kept: String = ascii.chars()
        .filter(|&c| c.is_ascii_alphanumeric() || c.is_whitespace() || c == '-')
        .map(|c| if c.is_whitespace() { '-' } else { c.to_ascii_lowercase() })
        .collect();

    let mut slug = String::new();
    let mut prev_char = None;
    for c in kept.trim_matches('-').chars() {
        if c != '-' || prev_char != Some('-') {
            slug.push(c);
        }
        prev_char = Some(c);
    }

    let slug: String = slug.chars().take(MAX_SLUG_LEN).collect();
    slug.trim_end_matches('-').to_string()
}

/// Anchor id for a heading, in the style kramdown generates them.
pub fn anchor_id(text: &str) -> String {
    let mut id = String::new();
    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '_' || c == '-' {
            id.extend(c.to_lowercase());
        } else if c.is_whitespace() {
            id.push('-');
        }
    }
    if id.is_empty() {
        return "section".to_string();
    }
    id
}
