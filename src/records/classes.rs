use super::{find_row, new_id, same_key};
use crate::error::{AppError, AppResult};
use crate::model::{Class, Student};
use crate::store::{Table, TableStore};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct ClassInput {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassWithCount {
    pub id: String,
    pub name: String,
    pub student_count: usize,
}

pub fn list(store: &dyn TableStore) -> AppResult<Vec<Class>> {
    Ok(store
        .rows(Table::Classes)?
        .iter()
        .filter_map(|r| Class::from_row(r))
        .collect())
}

pub fn list_with_counts(store: &dyn TableStore) -> AppResult<Vec<ClassWithCount>> {
    let students = super::students::list(store)?;
    Ok(list(store)?
        .into_iter()
        .map(|c| {
            let student_count = students
                .iter()
                .filter(|s| same_key(&s.class, &c.name))
                .count();
            ClassWithCount {
                id: c.id,
                name: c.name,
                student_count,
            }
        })
        .collect())
}

/// Canonical class name for a case-insensitive reference, if the class exists.
pub fn resolve_name(classes: &[Class], name: &str) -> Option<String> {
    classes
        .iter()
        .find(|c| same_key(&c.name, name))
        .map(|c| c.name.clone())
}

/// Create or rename a class. A rename is carried over to every student
/// that referenced the old name.
pub fn save(store: &mut dyn TableStore, input: ClassInput) -> AppResult<Class> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("class name must not be empty"));
    }
    let id = super::non_empty(input.id.as_deref());

    let existing = list(store)?;
    if existing
        .iter()
        .any(|c| same_key(&c.name, &name) && Some(&c.id) != id.as_ref())
    {
        return Err(AppError::Duplicate(format!("class '{name}' already exists")));
    }

    let Some(id) = id else {
        let class = Class { id: new_id(), name };
        store.append(Table::Classes, class.to_row())?;
        return Ok(class);
    };

    let Some((index, row)) = find_row(store, Table::Classes, &id)? else {
        return Err(AppError::NotFound { entity: "class" });
    };
    let old_name = Class::from_row(&row).map(|c| c.name).unwrap_or_default();
    store.update_cells(Table::Classes, index, 1, vec![name.clone()])?;

    if !old_name.is_empty() && old_name != name {
        let rows = store.rows(Table::Students)?;
        for (i, row) in rows.iter().enumerate() {
            let Some(student) = Student::from_row(row) else {
                continue;
            };
            if same_key(&student.class, &old_name) {
                store.update_cells(Table::Students, i, 3, vec![name.clone()])?;
            }
        }
    }

    Ok(Class { id, name })
}

pub fn delete(store: &mut dyn TableStore, id: &str) -> AppResult<()> {
    let Some((index, row)) = find_row(store, Table::Classes, id)? else {
        return Err(AppError::NotFound { entity: "class" });
    };
    let name = Class::from_row(&row).map(|c| c.name).unwrap_or_default();
    let members = super::students::list(store)?
        .iter()
        .filter(|s| !name.is_empty() && same_key(&s.class, &name))
        .count();
    if members > 0 {
        return Err(AppError::InUse(format!(
            "class '{name}' still has {members} students and cannot be deleted"
        )));
    }
    store.delete_row(Table::Classes, index)?;
    Ok(())
}
