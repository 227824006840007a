//! Typed records and their fixed row layouts.

use crate::store::Row;
use serde::Serialize;

pub const DEFAULT_INITIAL_SCORE: i64 = 100;

/// Integer cell reader. Sheets may hold `"10"`, `"10.0"` or nothing.
pub fn cell_int(row: &[String], col: usize) -> i64 {
    let Some(raw) = row.get(col) else {
        return 0;
    };
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return v;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
        .unwrap_or(0)
}

pub fn cell_str(row: &[String], col: usize) -> String {
    row.get(col).map(|s| s.trim().to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorKind {
    Positive,
    Negative,
}

impl BehaviorKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(BehaviorKind::Positive),
            "negative" => Some(BehaviorKind::Negative),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorKind::Positive => "positive",
            BehaviorKind::Negative => "negative",
        }
    }

    /// Allowed score range for this kind.
    pub fn score_range(self) -> std::ops::RangeInclusive<i64> {
        match self {
            BehaviorKind::Positive => 0..=100,
            BehaviorKind::Negative => -100..=0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub username: String,
    pub password: String,
}

impl Teacher {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let username = cell_str(row, 2);
        if username.is_empty() {
            return None;
        }
        Some(Self {
            id: cell_str(row, 0),
            name: cell_str(row, 1),
            username,
            // Passwords are compared verbatim, so no trimming.
            password: row.get(3).cloned().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Behavior {
    pub id: String,
    pub name: String,
    pub score: i64,
    #[serde(rename = "type")]
    pub kind: BehaviorKind,
}

impl Behavior {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let id = cell_str(row, 0);
        let name = cell_str(row, 1);
        if id.is_empty() || name.is_empty() {
            return None;
        }
        let score = cell_int(row, 2);
        // Untyped legacy rows: infer from sign.
        let kind = BehaviorKind::parse(&cell_str(row, 3)).unwrap_or(if score < 0 {
            BehaviorKind::Negative
        } else {
            BehaviorKind::Positive
        });
        Some(Self {
            id,
            name,
            score,
            kind,
        })
    }

    pub fn to_row(&self) -> Row {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.score.to_string(),
            self.kind.as_str().to_string(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Class {
    pub id: String,
    pub name: String,
}

impl Class {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let id = cell_str(row, 0);
        let name = cell_str(row, 1);
        if id.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self { id, name })
    }

    pub fn to_row(&self) -> Row {
        vec![self.id.clone(), self.name.clone()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub student_code: String,
    pub name: String,
    pub class: String,
    pub initial_score: i64,
    pub deducted_score: i64,
    pub added_score: i64,
}

/// Column of `deductedScore`; `addedScore` follows it.
pub const STUDENT_SCORE_COL: usize = 5;

impl Student {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let id = cell_str(row, 0);
        let student_code = cell_str(row, 1);
        let name = cell_str(row, 2);
        if id.is_empty() || student_code.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self {
            id,
            student_code,
            name,
            class: cell_str(row, 3),
            initial_score: cell_int(row, 4),
            deducted_score: cell_int(row, 5),
            added_score: cell_int(row, 6),
        })
    }

    pub fn to_row(&self) -> Row {
        vec![
            self.id.clone(),
            self.student_code.clone(),
            self.name.clone(),
            self.class.clone(),
            self.initial_score.to_string(),
            self.deducted_score.to_string(),
            self.added_score.to_string(),
        ]
    }

    pub fn net_score(&self) -> i64 {
        crate::calc::net_score(self.initial_score, self.deducted_score, self.added_score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Infraction {
    pub id: String,
    #[serde(rename = "studentUUID")]
    pub student_uuid: String,
    pub student_name: String,
    pub student_class: String,
    pub date: String,
    pub behavior_id: String,
    pub comment: String,
    pub timestamp: String,
}

impl Infraction {
    pub fn from_row(row: &[String]) -> Option<Self> {
        let id = cell_str(row, 0);
        let student_uuid = cell_str(row, 1);
        if id.is_empty() || student_uuid.is_empty() {
            return None;
        }
        Some(Self {
            id,
            student_uuid,
            student_name: cell_str(row, 2),
            student_class: cell_str(row, 3),
            date: cell_str(row, 4),
            behavior_id: cell_str(row, 5),
            comment: row.get(6).cloned().unwrap_or_default(),
            timestamp: cell_str(row, 7),
        })
    }

    pub fn to_row(&self) -> Row {
        vec![
            self.id.clone(),
            self.student_uuid.clone(),
            self.student_name.clone(),
            self.student_class.clone(),
            self.date.clone(),
            self.behavior_id.clone(),
            self.comment.clone(),
            self.timestamp.clone(),
        ]
    }

    /// Calendar day of the infraction. Accepts `YYYY-MM-DD` and RFC 3339 prefixes.
    pub fn day(&self) -> Option<chrono::NaiveDate> {
        let head = self.date.get(..10).unwrap_or(&self.date);
        chrono::NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
    }
}
