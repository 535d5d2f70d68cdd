//! Rating merge
//!
//! Folds one sheet row's `{member}_rating` / `{member}_blurb` cells into a
//! film's existing rating entries.
//!
//! **Rules:**
//! - Members are visited in roster order
//! - A member whose rating and blurb cells are both blank is skipped, so an
//!   earlier entry survives untouched (blank never means "clear")
//! - An existing entry (matched case-insensitively) is rewritten only when
//!   its score or blurb actually differs
//! - Members outside the roster are never added or removed

use filmclub_common::{RatingEntry, Score};

use super::change_detector::FieldChange;
use crate::sheet::SheetRow;

/// One member's cells from a sheet row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberCells<'a> {
    pub member: &'a str,
    pub rating: Option<&'a str>,
    pub blurb: Option<&'a str>,
}

/// Collect the roster's cells from `row`, in roster order
pub fn member_cells<'a>(row: &'a SheetRow, roster: &'a [String]) -> Vec<MemberCells<'a>> {
    roster
        .iter()
        .map(|member| MemberCells {
            member: member.as_str(),
            rating: row.rating(member),
            blurb: row.blurb(member),
        })
        .collect()
}

/// Normalize a rating cell
///
/// `"8"` → `Integer(8)`, `"7.5"` → `Decimal(7.5)`, `"n/a"` → `Text("n/a")`,
/// blank → `None`.
pub fn normalize_score(cell: Option<&str>) -> Option<Score> {
    let text = cell?.trim();
    if text.is_empty() {
        return None;
    }

    match text.parse::<f64>() {
        Ok(value) if value.is_finite() => {
            if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Some(Score::Integer(value as i64))
            } else {
                Some(Score::Decimal(value))
            }
        }
        _ => Some(Score::Text(text.to_string())),
    }
}

/// Normalize a blurb cell: blank → `None`, anything else verbatim
pub fn normalize_blurb(cell: Option<&str>) -> Option<String> {
    cell.filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

fn is_blank(cell: Option<&str>) -> bool {
    cell.map_or(true, |text| text.trim().is_empty())
}

/// Numeric scores compare by value (`8` equals `8.0`)
fn same_score(a: &Option<Score>, b: &Option<Score>) -> bool {
    match (a, b) {
        (Some(Score::Integer(x)), Some(Score::Decimal(y)))
        | (Some(Score::Decimal(y)), Some(Score::Integer(x))) => (*x as f64) == *y,
        _ => a == b,
    }
}

/// Merge member cells into `entries`, returning what changed
pub fn merge_ratings<'a>(
    entries: &mut Vec<RatingEntry>,
    cells: impl IntoIterator<Item = MemberCells<'a>>,
) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for MemberCells {
        member,
        rating,
        blurb,
    } in cells
    {
        if is_blank(rating) && is_blank(blurb) {
            continue;
        }

        let score = normalize_score(rating);
        let blurb = normalize_blurb(blurb);
        let field = format!("clubRatings.{}", member);

        match entries
            .iter_mut()
            .find(|entry| entry.user.eq_ignore_ascii_case(member))
        {
            Some(entry) => {
                if !same_score(&entry.score, &score) || entry.blurb != blurb {
                    let before = entry.clone();
                    entry.score = score;
                    entry.blurb = blurb;
                    changes.push(FieldChange::new(field, &before, &*entry));
                }
            }
            None => {
                let entry = RatingEntry::new(member, score, blurb);
                changes.push(FieldChange::new(field, &Option::<RatingEntry>::None, &entry));
                entries.push(entry);
            }
        }
    }

    changes
}
