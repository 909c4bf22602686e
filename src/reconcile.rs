use crate::roll::Roll;
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

/// Present/absent partition of one submitted roll list against a roster.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Submitted rolls found on the roster, in submitted order, duplicates kept.
    pub present: Vec<Roll>,
    /// Roster rolls missing from `present`.
    pub absent: Vec<Roll>,
    /// Submitted rolls not on the roster. Reported, never persisted.
    pub excluded: Vec<Roll>,
}

impl Reconciliation {
    /// Nothing submitted matched the roster, so there is nothing to record.
    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

pub fn reconcile(roster: &[Roll], submitted: &[Roll]) -> Reconciliation {
    let roster_keys: HashSet<String> = roster.iter().map(Roll::key).collect();

    let (present, excluded): (Vec<Roll>, Vec<Roll>) = submitted
        .iter()
        .cloned()
        .partition(|r| roster_keys.contains(&r.key()));

    let present_keys: HashSet<String> = present.iter().map(Roll::key).collect();

    // Absent is the symmetric difference of `present` and the roster. The first
    // half is always empty because `present` was filtered against the roster
    // above; it stays so the derivation matches stored records exactly.
    let absent = present
        .iter()
        .filter(|r| !roster_keys.contains(&r.key()))
        .chain(roster.iter().filter(|r| !present_keys.contains(&r.key())))
        .cloned()
        .collect();

    Reconciliation {
        present,
        absent,
        excluded,
    }
}

/// Calendar day as stored on attendance records: `D-M-YYYY`, no padding.
pub fn posting_date(date: NaiveDate) -> String {
    format!("{}-{}-{}", date.day(), date.month(), date.year())
}

pub fn recorded_message(excluded: &[Roll]) -> String {
    if excluded.is_empty() {
        return "Attendance added successfully".to_string();
    }
    let list = excluded
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",");
    format!("Attendance added successfully, excluded rolls: {}", list)
}
