//! Lenient reader for the pasted "Đầu / Đuôi" tables.
//!
//! Only two things are fatal: an empty input and a first line without both
//! header words. Every other malformed line or token is skipped so a messy
//! paste still yields whatever rows are readable.

use std::collections::{BTreeMap, BTreeSet};

use xoso_db::models::MAX_NUMBER;

use crate::error::{FormatError, TableKind};

pub const HEADER_HEAD: &str = "Đầu";
pub const HEADER_TAIL: &str = "Đuôi";

/// Head digit → tail values as written in the table, duplicates and
/// out-of-range values included.
pub type ParsedTable = BTreeMap<u8, Vec<i32>>;

/// How [`render_table`] writes a head with an empty tail list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuteHeads {
    Keep,
    Drop,
}

/// Reads an optional sign followed by the leading run of ASCII digits.
/// `"3abc"` gives 3, `"abc"` gives `None`.
pub fn leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let len = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }
    let value = rest[..len]
        .bytes()
        .fold(0i64, |acc, b| (acc * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX)));
    Some(sign * value as i32)
}

fn data_lines(raw: &str, kind: TableKind) -> Result<Vec<&str>, FormatError> {
    let lines: Vec<&str> = raw.split('\n').filter(|l| !l.trim().is_empty()).collect();
    let Some(header) = lines.first() else {
        return Err(FormatError::Empty { kind });
    };
    if !header.contains(HEADER_HEAD) || !header.contains(HEADER_TAIL) {
        return Err(FormatError::MissingHeader { kind });
    }
    Ok(lines[1..].iter().map(|l| l.trim()).collect())
}

/// Tab wins over space; a line with neither is all head.
fn split_line(line: &str) -> (&str, &str) {
    if let Some((head, tail)) = line.split_once('\t') {
        (head.trim(), tail.trim())
    } else if let Some((head, tail)) = line.split_once(' ') {
        (head.trim(), tail.trim())
    } else {
        (line, "")
    }
}

fn parse_head(token: &str) -> Option<u8> {
    match leading_int(token) {
        Some(h) if (0..=9).contains(&h) => Some(h as u8),
        _ => None,
    }
}

fn parse_tails(token: &str) -> Vec<i32> {
    if token.is_empty() {
        return Vec::new();
    }
    token.split(',').filter_map(|s| leading_int(s.trim())).collect()
}

fn rows(raw: &str, kind: TableKind) -> Result<Vec<(u8, Vec<i32>)>, FormatError> {
    let rows = data_lines(raw, kind)?
        .into_iter()
        .filter_map(|line| {
            let (head, tail) = split_line(line);
            parse_head(head).map(|h| (h, parse_tails(tail)))
        })
        .collect();
    Ok(rows)
}

/// Parses a draw table. A head listed twice keeps its last row.
pub fn parse_table(raw: &str) -> Result<ParsedTable, FormatError> {
    Ok(rows(raw, TableKind::Draw)?.into_iter().collect())
}

/// Parses a results table straight into its sorted, deduplicated numbers.
///
/// Every pair becomes `head * 10 + tail`; values outside 0..=99 are dropped.
pub fn parse_actual(raw: &str) -> Result<Vec<u8>, FormatError> {
    let mut numbers = BTreeSet::new();
    for (head, tails) in rows(raw, TableKind::Actual)? {
        for tail in tails {
            let value = i64::from(head) * 10 + i64::from(tail);
            if let Ok(number) = u8::try_from(value) {
                if number <= MAX_NUMBER {
                    numbers.insert(number);
                }
            }
        }
    }
    Ok(numbers.into_iter().collect())
}

pub fn render_table(table: &ParsedTable, mute: MuteHeads) -> String {
    let mut out = format!("{HEADER_HEAD}\t{HEADER_TAIL}\n");
    for (head, tails) in table {
        if tails.is_empty() && mute == MuteHeads::Drop {
            continue;
        }
        let joined = tails
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!("{head}\t{joined}\n"));
    }
    out
}
