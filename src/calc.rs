use crate::error::{AppError, AppResult};
use crate::model::{Behavior, BehaviorKind, Infraction, STUDENT_SCORE_COL};
use crate::records;
use crate::store::{Table, TableStore};
use serde::Serialize;
use std::collections::HashMap;

pub fn net_score(initial: i64, deducted: i64, added: i64) -> i64 {
    initial - deducted + added
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTotals {
    pub deducted_score: i64,
    pub added_score: i64,
}

/// Sum |score| of each matching infraction's behavior, split by behavior kind.
///
/// Infractions whose behavior no longer exists contribute nothing.
pub fn tally_scores<'a, I>(
    student_id: &str,
    infractions: I,
    behaviors: &HashMap<String, Behavior>,
) -> ScoreTotals
where
    I: IntoIterator<Item = &'a Infraction>,
{
    let mut totals = ScoreTotals::default();
    for infraction in infractions {
        if infraction.student_uuid != student_id {
            continue;
        }
        let Some(behavior) = behaviors.get(&infraction.behavior_id) else {
            continue;
        };
        match behavior.kind {
            BehaviorKind::Negative => totals.deducted_score += behavior.score.abs(),
            BehaviorKind::Positive => totals.added_score += behavior.score.abs(),
        }
    }
    totals
}

/// Rebuild a student's cached deducted/added columns from the full
/// infraction history.
pub fn recompute_student_scores(
    store: &mut dyn TableStore,
    student_id: &str,
) -> AppResult<ScoreTotals> {
    let infractions = records::infractions::list(store)?;
    let behaviors: HashMap<String, Behavior> = records::behaviors::list(store)?
        .into_iter()
        .map(|b| (b.id.clone(), b))
        .collect();

    let totals = tally_scores(student_id, &infractions, &behaviors);

    let Some((index, _)) = records::find_row(store, Table::Students, student_id)? else {
        return Err(AppError::NotFound { entity: "student" });
    };
    store.update_cells(
        Table::Students,
        index,
        STUDENT_SCORE_COL,
        vec![
            totals.deducted_score.to_string(),
            totals.added_score.to_string(),
        ],
    )?;
    tracing::debug!(
        student_id,
        deducted = totals.deducted_score,
        added = totals.added_score,
        "recomputed student scores"
    );
    Ok(totals)
}
