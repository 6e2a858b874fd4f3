//! Date normalization
//!
//! Turns the extended ISO / EDTF-like notation used in letter tables into
//! the attributes of a TEI `<date>` element:
//!
//! - `1850-03-12`, `1850-03`, `1850`, `--03-12`, `--03`, `---12` → `@when`
//! - `1850/1851`, `1850/`, `/1851` → `@from` / `@to`
//! - `[1850..1851]` ("one of") → `@notBefore` / `@notAfter`
//! - `{1850,1851}` ("all members") → `@from` / `@to`
//! - `18XX`, `1850-XX-XX` → masked digits widened to an interval or cut off
//! - `?`, `~`, `%` anywhere → parsed without them and marked `@cert="low"`

use chrono::NaiveDate;
use thiserror::Error;

const UNCERTAINTY_MARKERS: [char; 3] = ['?', '~', '%'];

/// Attribute set of a parsed date. At least one bound is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    When(String),
    Interval {
        from: Option<String>,
        to: Option<String>,
    },
    OneOf {
        not_before: Option<String>,
        not_after: Option<String>,
    },
}

impl DateValue {
    fn has_bound(&self) -> bool {
        match self {
            DateValue::When(_) => true,
            DateValue::Interval { from, to } => from.is_some() || to.is_some(),
            DateValue::OneOf {
                not_before,
                not_after,
            } => not_before.is_some() || not_after.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDate {
    pub value: DateValue,
    /// Input carried uncertainty markers
    pub uncertain: bool,
}

impl NormalizedDate {
    /// TEI attributes in output order.
    pub fn attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attributes = Vec::with_capacity(3);
        match &self.value {
            DateValue::When(when) => attributes.push(("when", when.as_str())),
            DateValue::Interval { from, to } => {
                if let Some(from) = from {
                    attributes.push(("from", from.as_str()));
                }
                if let Some(to) = to {
                    attributes.push(("to", to.as_str()));
                }
            }
            DateValue::OneOf {
                not_before,
                not_after,
            } => {
                if let Some(not_before) = not_before {
                    attributes.push(("notBefore", not_before.as_str()));
                }
                if let Some(not_after) = not_after {
                    attributes.push(("notAfter", not_after.as_str()));
                }
            }
        }
        if self.uncertain {
            attributes.push(("cert", "low"));
        }
        attributes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("unable to parse \"{0}\" as TEI date")]
    Unparseable(String),
}

/// Parse a raw date cell.
///
/// Returns `Ok(None)` when there is nothing to parse (empty cell, or only
/// uncertainty markers), and an error when the input is present but none
/// of its parts is a valid date.
pub fn normalize_date(raw: &str) -> Result<Option<NormalizedDate>, DateError> {
    let trimmed = raw.trim();
    let stripped: String = trimmed
        .chars()
        .filter(|c| !UNCERTAINTY_MARKERS.contains(c))
        .collect();
    if stripped.is_empty() {
        return Ok(None);
    }

    let value = classify(&unmask(&stripped))
        .ok_or_else(|| DateError::Unparseable(raw.to_string()))?;

    Ok(Some(NormalizedDate {
        value,
        uncertain: stripped != trimmed,
    }))
}

/// Resolve `X`-masked digits: a masked day or month is cut off together
/// with its separator, a masked year becomes the interval of all years it
/// can stand for.
fn unmask(date: &str) -> String {
    let mut date = date;
    for _ in 0..2 {
        if date.len() > 4
            && date.ends_with('X')
            && let Some((cut, _)) = date.char_indices().rev().nth(2)
        {
            date = &date[..cut];
        }
    }
    if date.ends_with('X') {
        format!("{}/{}", date.replace('X', "0"), date.replace('X', "9"))
    } else {
        date.to_string()
    }
}

fn classify(date: &str) -> Option<DateValue> {
    let value = if let Some(members) = enclosed(date, '[', ']') {
        let (first, last) = set_bounds(members);
        DateValue::OneOf {
            not_before: datable(first),
            not_after: datable(last),
        }
    } else if let Some(members) = enclosed(date, '{', '}') {
        let (first, last) = set_bounds(members);
        DateValue::Interval {
            from: datable(first),
            to: datable(last),
        }
    } else if date.matches('/').count() == 1 {
        let (first, last) = date.split_once('/')?;
        DateValue::Interval {
            from: datable(first),
            to: datable(last),
        }
    } else {
        DateValue::When(datable(date)?)
    };

    value.has_bound().then_some(value)
}

fn enclosed(date: &str, open: char, close: char) -> Option<&str> {
    date.strip_prefix(open)?.strip_suffix(close)
}

/// Earliest bound is the part of the first member before any `..`,
/// latest bound the part of the last member after it.
fn set_bounds(members: &str) -> (&str, &str) {
    let first = members.split(',').next().unwrap_or_default().trim();
    let last = members.rsplit(',').next().unwrap_or_default().trim();
    (
        first.split('.').next().unwrap_or_default(),
        last.rsplit('.').next().unwrap_or_default(),
    )
}

fn datable(date: &str) -> Option<String> {
    is_datable_w3c(date).then(|| date.to_string())
}

/// Check for `teidata.temporal.w3c`: ISO calendar dates, dates without a
/// year (`--MM-DD`, `--MM`, `---DD`), and negative years.
pub fn is_datable_w3c(date: &str) -> bool {
    let date = match date.strip_prefix('-') {
        Some(rest) if date.len() > 4 && rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => date,
    };
    is_datable_iso(date) || is_yearless(date)
}

/// Check for `teidata.temporal.iso` restricted to `YYYY-MM-DD`, `YYYY-MM`
/// and `YYYY`.
pub fn is_datable_iso(date: &str) -> bool {
    let parts: Vec<&str> = date.split('-').collect();
    match parts.as_slice() {
        [year] => number(year, 4).is_some(),
        [year, month] => number(year, 4).is_some() && month_of(month).is_some(),
        [year, month, day] => match (number(year, 4), month_of(month), number(day, 2)) {
            (Some(year), Some(month), Some(day)) => {
                NaiveDate::from_ymd_opt(year as i32, month, day).is_some()
            }
            _ => false,
        },
        _ => false,
    }
}

fn is_yearless(date: &str) -> bool {
    if let Some(day) = date.strip_prefix("---") {
        return number(day, 2).is_some_and(|day| (1..=31).contains(&day));
    }
    let Some(rest) = date.strip_prefix("--") else {
        return false;
    };
    match rest.split_once('-') {
        // leap year, so that --02-29 is accepted
        Some((month, day)) => match (month_of(month), number(day, 2)) {
            (Some(month), Some(day)) => NaiveDate::from_ymd_opt(2000, month, day).is_some(),
            _ => false,
        },
        None => month_of(rest).is_some(),
    }
}

fn number(digits: &str, width: usize) -> Option<u32> {
    if digits.len() == width && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    }
}

fn month_of(digits: &str) -> Option<u32> {
    number(digits, 2).filter(|month| (1..=12).contains(month))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> NormalizedDate {
        normalize_date(raw)
            .expect("date should parse")
            .expect("date should be present")
    }

    #[test]
    fn test_point_dates_round_trip() {
        for raw in ["2016-04-01", "1673-05", "1673", "--05-12", "--05", "---12"] {
            let date = parse(raw);
            assert_eq!(date.value, DateValue::When(raw.to_string()), "{raw}");
            assert!(!date.uncertain, "{raw}");
            assert_eq!(date.attributes(), vec![("when", raw)]);
        }
    }

    #[test]
    fn test_one_of_set() {
        assert_eq!(
            parse("[..1760-12-03]").value,
            DateValue::OneOf {
                not_before: None,
                not_after: Some("1760-12-03".to_string()),
            }
        );
        assert_eq!(
            parse("[1760-12..]").value,
            DateValue::OneOf {
                not_before: Some("1760-12".to_string()),
                not_after: None,
            }
        );
        assert_eq!(
            parse("[1667,1668,1670..1672]").value,
            DateValue::OneOf {
                not_before: Some("1667".to_string()),
                not_after: Some("1672".to_string()),
            }
        );
    }

    #[test]
    fn test_all_members_set() {
        assert_eq!(
            parse("{-0400,-0390,-0370}").value,
            DateValue::Interval {
                from: Some("-0400".to_string()),
                to: Some("-0370".to_string()),
            }
        );
    }

    #[test]
    fn test_open_intervals() {
        assert_eq!(
            parse("1979-10-12/").attributes(),
            vec![("from", "1979-10-12")]
        );
        assert_eq!(parse("/1985-04-12").attributes(), vec![("to", "1985-04-12")]);
        assert_eq!(
            parse("1850-01/1850-03").attributes(),
            vec![("from", "1850-01"), ("to", "1850-03")]
        );
    }

    #[test]
    fn test_interval_with_one_invalid_side() {
        assert_eq!(
            parse("1850/someday").attributes(),
            vec![("from", "1850")]
        );
    }

    #[test]
    fn test_masked_digits() {
        assert_eq!(
            parse("18XX").attributes(),
            vec![("from", "1800"), ("to", "1899")]
        );
        assert_eq!(parse("1850-XX-XX").attributes(), vec![("when", "1850")]);
        assert_eq!(parse("1850-05-XX").attributes(), vec![("when", "1850-05")]);
        assert_eq!(parse("1850-02-3X").attributes(), vec![("when", "1850-02")]);
        assert_eq!(parse("1850-12-1X").attributes(), vec![("when", "1850-12")]);
        assert_eq!(parse("1850-1X").attributes(), vec![("when", "1850")]);
        assert_eq!(
            parse("185X").attributes(),
            vec![("from", "1850"), ("to", "1859")]
        );
        assert_eq!(
            parse("18XX-XX-XX").attributes(),
            vec![("from", "1800"), ("to", "1899")]
        );
    }

    #[test]
    fn test_uncertainty_markers() {
        assert_eq!(
            parse("1800?").attributes(),
            vec![("when", "1800"), ("cert", "low")]
        );
        assert_eq!(
            parse("1800-05~").attributes(),
            vec![("when", "1800-05"), ("cert", "low")]
        );
        assert!(parse("%1800-05-01").uncertain);
    }

    #[test]
    fn test_unparseable_and_absent() {
        assert_eq!(
            normalize_date("not-a-date"),
            Err(DateError::Unparseable("not-a-date".to_string()))
        );
        assert_eq!(normalize_date(""), Ok(None));
        assert_eq!(normalize_date("   "), Ok(None));
        assert_eq!(normalize_date("?"), Ok(None));
        assert!(normalize_date("1850-13-01").is_err());
        assert!(normalize_date("1900-02-29").is_err());
        assert!(normalize_date("[a,b]").is_err());
    }

    #[test]
    fn test_w3c_layouts() {
        assert!(is_datable_w3c("-0400"));
        assert!(is_datable_w3c("--02-29"));
        assert!(!is_datable_w3c("--02-30"));
        assert!(!is_datable_w3c("---32"));
        assert!(!is_datable_w3c("85"));
        assert!(!is_datable_w3c("1850-1"));
        assert!(!is_datable_w3c(""));
    }
}
