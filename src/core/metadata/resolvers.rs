//! Capture-date resolvers, tried in order until one succeeds.

use super::DateSource;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use exif::{Exif, In, Tag, Value};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;

/// Everything a resolver may look at for one file
pub struct ResolveContext<'a> {
    pub path: &'a Path,
    /// Parsed EXIF block, if the file has one
    pub exif: Option<&'a Exif>,
    /// Modification time recorded when the file was scanned
    pub scanned_modified: SystemTime,
}

/// One step of the capture-date fallback chain
pub trait DateResolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// `None` means "no opinion", and the next resolver is tried
    fn resolve(&self, ctx: &ResolveContext<'_>) -> Option<(NaiveDate, DateSource)>;
}

/// EXIF capture tags, most specific first
pub struct ExifDateResolver;

const EXIF_DATE_TAGS: [(Tag, DateSource); 3] = [
    (Tag::DateTimeOriginal, DateSource::ExifOriginal),
    (Tag::DateTimeDigitized, DateSource::ExifDigitized),
    (Tag::DateTime, DateSource::ExifModified),
];

impl DateResolver for ExifDateResolver {
    fn name(&self) -> &'static str {
        "exif"
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Option<(NaiveDate, DateSource)> {
        let exif = ctx.exif?;
        EXIF_DATE_TAGS.iter().find_map(|(tag, source)| {
            let field = exif.get_field(*tag, In::PRIMARY)?;
            parse_exif_datetime(&field.value).map(|dt| (dt.date(), *source))
        })
    }
}

/// Parse the EXIF `YYYY:MM:DD HH:MM:SS` form
pub fn parse_exif_datetime(value: &Value) -> Option<NaiveDateTime> {
    let Value::Ascii(ref parts) = value else {
        return None;
    };
    let text = std::str::from_utf8(parts.first()?).ok()?;
    NaiveDateTime::parse_from_str(text.trim_end_matches('\0').trim(), "%Y:%m:%d %H:%M:%S").ok()
}

/// Dates embedded in file names such as `2024-06-01 beach.jpg`,
/// `IMG_20240601_1200.jpg` or `20240601123045.png`
pub struct FilenameDateResolver;

struct FilenamePatterns {
    dashed: Regex,
    compact: Regex,
    timestamp: Regex,
}

fn patterns() -> &'static FilenamePatterns {
    static PATTERNS: OnceLock<FilenamePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FilenamePatterns {
        dashed: Regex::new(r"(\d{4})-(\d{2})-(\d{2})").expect("valid regex"),
        compact: Regex::new(r"(\d{4})(\d{2})(\d{2})").expect("valid regex"),
        timestamp: Regex::new(r"(\d{4})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})").expect("valid regex"),
    })
}

fn ymd(caps: &regex::Captures<'_>) -> Option<NaiveDate> {
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Date from a file name. Each pattern only looks at its first match; an
/// impossible calendar date falls through to the next pattern.
pub fn date_from_filename(name: &str) -> Option<NaiveDate> {
    let p = patterns();

    if let Some(date) = p.dashed.captures(name).and_then(|c| ymd(&c)) {
        return Some(date);
    }
    if let Some(date) = p.compact.captures(name).and_then(|c| ymd(&c)) {
        return Some(date);
    }

    let caps = p.timestamp.captures(name)?;
    let date = ymd(&caps)?;
    let hour = caps[4].parse().ok()?;
    let minute = caps[5].parse().ok()?;
    let second = caps[6].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)?;
    Some(date)
}

impl DateResolver for FilenameDateResolver {
    fn name(&self) -> &'static str {
        "filename"
    }

    fn resolve(&self, ctx: &ResolveContext<'_>) -> Option<(NaiveDate, DateSource)> {
        let name = ctx.path.file_name()?.to_str()?;
        date_from_filename(name).map(|d| (d, DateSource::Filename))
    }
}

/// Local calendar date of the file's modification time. Never fails: when the
/// file can no longer be stat'ed, the time captured during the scan is used.
pub fn modified_date(ctx: &ResolveContext<'_>) -> NaiveDate {
    let modified = std::fs::metadata(ctx.path)
        .and_then(|m| m.modified())
        .unwrap_or(ctx.scanned_modified);
    DateTime::<Local>::from(modified).date_naive()
}
