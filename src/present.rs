//! Line filtering and the per-vehicle table rows.

use serde::Serialize;

use crate::model::VehicleRecord;

/// One row of the vehicle table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub brigade: String,
    pub course_number: String,
    pub fleet_number: String,
    #[serde(skip)]
    pub trip: String,
}

impl DisplayRow {
    pub fn from_record(r: &VehicleRecord) -> Self {
        Self {
            brigade: brigade(&r.trip).to_string(),
            course_number: course_number(&r.trip).to_string(),
            fleet_number: fleet_number(&r.id),
            trip: r.trip.clone(),
        }
    }
}

/// The trip without its last two characters, or `""` for shorter trips.
pub fn brigade(trip: &str) -> &str {
    match trip.char_indices().rev().nth(1) {
        Some((idx, _)) => &trip[..idx],
        None => "",
    }
}

/// Everything after the first `/`, or `""` when there is none.
pub fn course_number(trip: &str) -> &str {
    trip.split_once('/').map(|(_, course)| course).unwrap_or("")
}

pub fn fleet_number(id: &str) -> String {
    id.replace('_', "/")
}

/// Parses a comma-separated list of line labels, e.g. `"6, 19, M1"`.
///
/// Returns `None` for empty text, meaning "all lines". Any other text is a
/// selection, even if some tokens trim down to `""`.
pub fn parse_line_filter(filter_text: &str) -> Option<Vec<&str>> {
    if filter_text.is_empty() {
        return None;
    }
    Some(filter_text.split(',').map(str::trim).collect())
}

/// Keeps the vehicles on the selected lines and turns them into table rows
/// ordered by trip.
pub fn filter_and_project(records: &[VehicleRecord], filter_text: &str) -> Vec<DisplayRow> {
    let selected = parse_line_filter(filter_text);

    let mut rows: Vec<DisplayRow> = records
        .iter()
        .filter(|r| match &selected {
            Some(lines) => lines.contains(&r.line()),
            None => true,
        })
        .map(DisplayRow::from_record)
        .collect();
    rows.sort_by(|a, b| a.trip.cmp(&b.trip));
    rows
}
