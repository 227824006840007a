use super::{behaviors, new_id, students};
use crate::calc::{self, ScoreTotals};
use crate::error::{AppError, AppResult};
use crate::model::{Behavior, BehaviorKind, Infraction};
use crate::store::{Table, TableStore};
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct InfractionInput {
    pub student_id: String,
    pub behavior_id: String,
    pub date: Option<String>,
    pub comment: String,
}

/// Result of an insert. A failed recompute does not undo the insert.
#[derive(Debug)]
pub struct SavedInfraction {
    pub infraction: Infraction,
    pub scores: Option<ScoreTotals>,
    pub warning: Option<String>,
}

/// An infraction joined with its behavior.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfractionView {
    #[serde(flatten)]
    pub infraction: Infraction,
    pub behavior_name: String,
    pub score: i64,
    pub behavior_type: Option<BehaviorKind>,
}

pub fn list(store: &dyn TableStore) -> AppResult<Vec<Infraction>> {
    Ok(store
        .rows(Table::Infractions)?
        .iter()
        .filter_map(|r| Infraction::from_row(r))
        .collect())
}

pub fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("date '{}' must be YYYY-MM-DD", raw.trim())))
}

pub fn save(
    store: &mut dyn TableStore,
    input: InfractionInput,
    now: DateTime<Local>,
) -> AppResult<SavedInfraction> {
    let student = match students::get(store, &input.student_id) {
        Ok(s) => s,
        Err(AppError::NotFound { .. }) => {
            return Err(AppError::UnknownReference(format!(
                "student '{}' does not exist",
                input.student_id.trim()
            )))
        }
        Err(e) => return Err(e),
    };
    let behavior = match behaviors::get(store, &input.behavior_id) {
        Ok(b) => b,
        Err(AppError::NotFound { .. }) => {
            return Err(AppError::UnknownReference(format!(
                "behavior '{}' does not exist",
                input.behavior_id.trim()
            )))
        }
        Err(e) => return Err(e),
    };
    let date = match super::non_empty(input.date.as_deref()) {
        Some(raw) => parse_date(&raw)?,
        None => now.date_naive(),
    };

    let infraction = Infraction {
        id: new_id(),
        student_uuid: student.id.clone(),
        student_name: student.name.clone(),
        student_class: student.class.clone(),
        date: date.format("%Y-%m-%d").to_string(),
        behavior_id: behavior.id.clone(),
        comment: input.comment.trim().to_string(),
        timestamp: now.to_rfc3339(),
    };
    store.append(Table::Infractions, infraction.to_row())?;

    let (scores, warning) = match calc::recompute_student_scores(store, &student.id) {
        Ok(t) => (Some(t), None),
        Err(e) => {
            tracing::warn!(student_id = %student.id, error = %e, "score recompute failed after insert");
            (None, Some(format!("entry saved but score recompute failed: {e}")))
        }
    };

    Ok(SavedInfraction {
        infraction,
        scores,
        warning,
    })
}

/// A student's history, newest date first, then newest timestamp first.
pub fn list_by_student(store: &dyn TableStore, student_id: &str) -> AppResult<Vec<InfractionView>> {
    let behaviors: HashMap<String, Behavior> = behaviors::list(store)?
        .into_iter()
        .map(|b| (b.id.clone(), b))
        .collect();
    let mut out: Vec<InfractionView> = list(store)?
        .into_iter()
        .filter(|i| i.student_uuid == student_id.trim())
        .map(|infraction| {
            let behavior = behaviors.get(&infraction.behavior_id);
            InfractionView {
                behavior_name: behavior.map(|b| b.name.clone()).unwrap_or_default(),
                score: behavior.map(|b| b.score).unwrap_or(0),
                behavior_type: behavior.map(|b| b.kind),
                infraction,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.infraction
            .date
            .cmp(&a.infraction.date)
            .then_with(|| b.infraction.timestamp.cmp(&a.infraction.timestamp))
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::behaviors::BehaviorInput;
    use crate::records::classes::{self, ClassInput};
    use crate::records::students::StudentInput;
    use crate::store::{MemoryStore, Row};
    use chrono::TimeZone;

    struct Fixture {
        store: MemoryStore,
        student_id: String,
        late: String,
        help: String,
    }

    fn fixture() -> Fixture {
        let mut store = MemoryStore::new();
        classes::save(
            &mut store,
            ClassInput {
                id: None,
                name: "M.1/1".into(),
            },
        )
        .expect("class");
        let student = students::save(
            &mut store,
            StudentInput {
                id: None,
                student_code: "S1".into(),
                name: "Ann".into(),
                class: "M.1/1".into(),
                initial_score: Some(100),
            },
        )
        .expect("student");
        let late = behaviors::save(
            &mut store,
            BehaviorInput {
                id: None,
                name: "Late".into(),
                score: -5,
                kind: "negative".into(),
            },
        )
        .expect("late");
        let help = behaviors::save(
            &mut store,
            BehaviorInput {
                id: None,
                name: "Help".into(),
                score: 10,
                kind: "positive".into(),
            },
        )
        .expect("help");
        Fixture {
            store,
            student_id: student.id,
            late: late.id,
            help: help.id,
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 10, day, hour, 0, 0)
            .single()
            .expect("local time")
    }

    fn log(f: &mut Fixture, behavior: &str, date: Option<&str>, now: DateTime<Local>) -> SavedInfraction {
        save(
            &mut f.store,
            InfractionInput {
                student_id: f.student_id.clone(),
                behavior_id: behavior.to_string(),
                date: date.map(str::to_string),
                comment: " note ".into(),
            },
            now,
        )
        .expect("save infraction")
    }

    #[test]
    fn insert_snapshots_student_and_recomputes_scores() {
        let mut f = fixture();
        let late = f.late.clone();
        let help = f.help.clone();
        log(&mut f, &late, Some("2026-10-01"), at(1, 8));
        log(&mut f, &late, None, at(2, 8));
        let saved = log(&mut f, &help, Some("2026-10-02"), at(2, 9));

        assert_eq!(saved.infraction.student_name, "Ann");
        assert_eq!(saved.infraction.student_class, "M.1/1");
        assert_eq!(saved.infraction.comment, "note");
        assert!(saved.warning.is_none());
        assert_eq!(
            saved.scores,
            Some(ScoreTotals {
                deducted_score: 10,
                added_score: 10
            })
        );
        let student = students::get(&f.store, &f.student_id).expect("student");
        assert_eq!(student.net_score(), 100);
    }

    #[test]
    fn missing_date_defaults_to_today() {
        let mut f = fixture();
        let late = f.late.clone();
        let saved = log(&mut f, &late, None, at(15, 10));
        assert_eq!(saved.infraction.date, "2026-10-15");
    }

    #[test]
    fn unknown_references_and_bad_dates_are_rejected() {
        let mut f = fixture();
        let e = save(
            &mut f.store,
            InfractionInput {
                student_id: "ghost".into(),
                behavior_id: f.late.clone(),
                ..Default::default()
            },
            at(1, 8),
        )
        .expect_err("student");
        assert_eq!(e.code(), "unknown_reference");

        let e = save(
            &mut f.store,
            InfractionInput {
                student_id: f.student_id.clone(),
                behavior_id: f.late.clone(),
                date: Some("01/10/2026".into()),
                ..Default::default()
            },
            at(1, 8),
        )
        .expect_err("date");
        assert_eq!(e.code(), "validation_failed");
        assert!(list(&f.store).expect("list").is_empty());
    }

    #[test]
    fn history_is_newest_first_with_behavior_details() {
        let mut f = fixture();
        let late = f.late.clone();
        let help = f.help.clone();
        log(&mut f, &late, Some("2026-10-01"), at(1, 8));
        log(&mut f, &help, Some("2026-10-03"), at(3, 8));
        log(&mut f, &late, Some("2026-10-03"), at(3, 9));

        let history = list_by_student(&f.store, &f.student_id).expect("history");
        let seen: Vec<(&str, &str)> = history
            .iter()
            .map(|v| (v.infraction.date.as_str(), v.behavior_name.as_str()))
            .collect();
        assert_eq!(
            seen,
            vec![("2026-10-03", "Late"), ("2026-10-03", "Help"), ("2026-10-01", "Late")]
        );
        assert_eq!(history[0].score, -5);
        assert_eq!(history[0].behavior_type, Some(BehaviorKind::Negative));
    }
    /// Passes everything through but refuses writes to the students table.
    struct StudentWritesFail(MemoryStore);

    impl TableStore for StudentWritesFail {
        fn headers(&self, table: Table) -> anyhow::Result<Vec<String>> {
            self.0.headers(table)
        }
        fn rows(&self, table: Table) -> anyhow::Result<Vec<Row>> {
            self.0.rows(table)
        }
        fn append(&mut self, table: Table, row: Row) -> anyhow::Result<()> {
            self.0.append(table, row)
        }
        fn append_many(&mut self, table: Table, rows: Vec<Row>) -> anyhow::Result<()> {
            self.0.append_many(table, rows)
        }
        fn update_cells(
            &mut self,
            table: Table,
            index: usize,
            start_col: usize,
            cells: Row,
        ) -> anyhow::Result<()> {
            if table == Table::Students {
                anyhow::bail!("students sheet is read-only");
            }
            self.0.update_cells(table, index, start_col, cells)
        }
        fn delete_row(&mut self, table: Table, index: usize) -> anyhow::Result<()> {
            self.0.delete_row(table, index)
        }
    }

    #[test]
    fn failed_recompute_keeps_the_insert_and_warns() {
        let f = fixture();
        let mut store = StudentWritesFail(f.store);
        let saved = save(
            &mut store,
            InfractionInput {
                student_id: f.student_id.clone(),
                behavior_id: f.late.clone(),
                date: Some("2026-10-05".into()),
                comment: String::new(),
            },
            at(5, 8),
        )
        .expect("insert survives");

        assert!(saved.scores.is_none());
        let warning = saved.warning.expect("warning");
        assert!(warning.contains("read-only"), "{warning}");
        let stored = list(&store).expect("list");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, saved.infraction.id);
        let student = students::get(&store, &f.student_id).expect("student");
        assert_eq!(student.deducted_score, 0);
    }
}
