use super::{classes, find_row, new_id, same_key};
use crate::error::{AppError, AppResult};
use crate::model::{Infraction, Student, DEFAULT_INITIAL_SCORE};
use crate::store::{Table, TableStore};

#[derive(Debug, Clone, Default)]
pub struct StudentInput {
    pub id: Option<String>,
    pub student_code: String,
    pub name: String,
    pub class: String,
    pub initial_score: Option<i64>,
}

pub fn list(store: &dyn TableStore) -> AppResult<Vec<Student>> {
    Ok(store
        .rows(Table::Students)?
        .iter()
        .filter_map(|r| Student::from_row(r))
        .collect())
}

pub fn get(store: &dyn TableStore, id: &str) -> AppResult<Student> {
    find_row(store, Table::Students, id)?
        .and_then(|(_, row)| Student::from_row(&row))
        .ok_or(AppError::NotFound { entity: "student" })
}

pub fn get_by_code(store: &dyn TableStore, code: &str) -> AppResult<Student> {
    if code.trim().is_empty() {
        return Err(AppError::validation("student code must not be empty"));
    }
    list(store)?
        .into_iter()
        .find(|s| same_key(&s.student_code, code))
        .ok_or(AppError::NotFound { entity: "student" })
}

pub fn save(store: &mut dyn TableStore, input: StudentInput) -> AppResult<Student> {
    let student_code = input.student_code.trim().to_string();
    let name = input.name.trim().to_string();
    let class = input.class.trim().to_string();
    if student_code.is_empty() || name.is_empty() || class.is_empty() {
        return Err(AppError::validation(
            "student code, name and class are required",
        ));
    }
    if let Some(initial) = input.initial_score {
        if initial < 0 {
            return Err(AppError::validation("initial score must not be negative"));
        }
    }

    let Some(class) = classes::resolve_name(&classes::list(store)?, &class) else {
        return Err(AppError::UnknownReference(format!(
            "class '{class}' does not exist"
        )));
    };

    let id = super::non_empty(input.id.as_deref());
    if list(store)?
        .iter()
        .any(|s| same_key(&s.student_code, &student_code) && Some(&s.id) != id.as_ref())
    {
        return Err(AppError::Duplicate(format!(
            "student code '{student_code}' is already in use"
        )));
    }

    match id {
        Some(id) => {
            let Some((index, row)) = find_row(store, Table::Students, &id)? else {
                return Err(AppError::NotFound { entity: "student" });
            };
            let current = Student::from_row(&row);
            let initial_score = input
                .initial_score
                .or(current.as_ref().map(|s| s.initial_score))
                .unwrap_or(DEFAULT_INITIAL_SCORE);
            let student = Student {
                id,
                student_code,
                name,
                class,
                initial_score,
                deducted_score: current.as_ref().map(|s| s.deducted_score).unwrap_or(0),
                added_score: current.as_ref().map(|s| s.added_score).unwrap_or(0),
            };
            // Cached score columns are owned by the recompute.
            store.update_cells(
                Table::Students,
                index,
                1,
                vec![
                    student.student_code.clone(),
                    student.name.clone(),
                    student.class.clone(),
                    student.initial_score.to_string(),
                ],
            )?;
            Ok(student)
        }
        None => {
            let student = Student {
                id: new_id(),
                student_code,
                name,
                class,
                initial_score: input.initial_score.unwrap_or(DEFAULT_INITIAL_SCORE),
                deducted_score: 0,
                added_score: 0,
            };
            store.append(Table::Students, student.to_row())?;
            Ok(student)
        }
    }
}

pub fn delete(store: &mut dyn TableStore, id: &str) -> AppResult<()> {
    let Some((index, _)) = find_row(store, Table::Students, id)? else {
        return Err(AppError::NotFound { entity: "student" });
    };
    let entries = store
        .rows(Table::Infractions)?
        .iter()
        .filter_map(|r| Infraction::from_row(r))
        .filter(|i| i.student_uuid == id.trim())
        .count();
    if entries > 0 {
        return Err(AppError::InUse(format!(
            "student has {entries} recorded entries and cannot be deleted"
        )));
    }
    store.delete_row(Table::Students, index)?;
    Ok(())
}
