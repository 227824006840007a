use super::{find_row, new_id, same_key};
use crate::error::{AppError, AppResult};
use crate::model::{Behavior, BehaviorKind, Infraction};
use crate::store::{Table, TableStore};

#[derive(Debug, Clone, Default)]
pub struct BehaviorInput {
    pub id: Option<String>,
    pub name: String,
    pub score: i64,
    pub kind: String,
}

pub fn list(store: &dyn TableStore) -> AppResult<Vec<Behavior>> {
    Ok(store
        .rows(Table::Behaviors)?
        .iter()
        .filter_map(|r| Behavior::from_row(r))
        .collect())
}

pub fn get(store: &dyn TableStore, id: &str) -> AppResult<Behavior> {
    find_row(store, Table::Behaviors, id)?
        .and_then(|(_, row)| Behavior::from_row(&row))
        .ok_or(AppError::NotFound { entity: "behavior" })
}

pub fn validate_score(kind: BehaviorKind, score: i64) -> AppResult<()> {
    let range = kind.score_range();
    if !range.contains(&score) {
        return Err(AppError::validation(format!(
            "score for a {} behavior must be between {} and {}",
            kind.as_str(),
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

pub fn save(store: &mut dyn TableStore, input: BehaviorInput) -> AppResult<Behavior> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::validation("behavior name must not be empty"));
    }
    let kind = BehaviorKind::parse(&input.kind)
        .ok_or_else(|| AppError::validation("type must be 'positive' or 'negative'"))?;
    validate_score(kind, input.score)?;

    let id = input
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let existing = list(store)?;
    if existing
        .iter()
        .any(|b| same_key(&b.name, &name) && Some(&b.id) != id.as_ref())
    {
        return Err(AppError::Duplicate(format!(
            "behavior '{name}' already exists"
        )));
    }

    match id {
        Some(id) => {
            let Some((index, _)) = find_row(store, Table::Behaviors, &id)? else {
                return Err(AppError::NotFound { entity: "behavior" });
            };
            let behavior = Behavior {
                id,
                name,
                score: input.score,
                kind,
            };
            let mut cells = behavior.to_row();
            cells.remove(0);
            store.update_cells(Table::Behaviors, index, 1, cells)?;
            Ok(behavior)
        }
        None => {
            let behavior = Behavior {
                id: new_id(),
                name,
                score: input.score,
                kind,
            };
            store.append(Table::Behaviors, behavior.to_row())?;
            Ok(behavior)
        }
    }
}

pub fn delete(store: &mut dyn TableStore, id: &str) -> AppResult<()> {
    let Some((index, _)) = find_row(store, Table::Behaviors, id)? else {
        return Err(AppError::NotFound { entity: "behavior" });
    };
    let uses = store
        .rows(Table::Infractions)?
        .iter()
        .filter_map(|r| Infraction::from_row(r))
        .filter(|i| i.behavior_id == id.trim())
        .count();
    if uses > 0 {
        return Err(AppError::InUse(format!(
            "behavior is referenced by {uses} recorded entries and cannot be deleted"
        )));
    }
    store.delete_row(Table::Behaviors, index)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn input(name: &str, score: i64, kind: &str) -> BehaviorInput {
        BehaviorInput {
            id: None,
            name: name.into(),
            score,
            kind: kind.into(),
        }
    }

    #[test]
    fn score_ranges_follow_type() {
        let mut store = MemoryStore::new();
        let e = save(&mut store, input("Volunteer", 150, "positive")).expect_err("150");
        assert_eq!(e.code(), "validation_failed");
        save(&mut store, input("Volunteer", 100, "positive")).expect("100");
        let e = save(&mut store, input("Late", 5, "negative")).expect_err("5");
        assert_eq!(e.code(), "validation_failed");
        save(&mut store, input("Late", -5, "negative")).expect("-5");
        assert_eq!(list(&store).expect("list").len(), 2);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let mut store = MemoryStore::new();
        let e = save(&mut store, input("Odd", 1, "neutral")).expect_err("type");
        assert!(e.to_string().contains("positive"));
    }

    #[test]
    fn duplicate_names_ignore_case_but_allow_self_update() {
        let mut store = MemoryStore::new();
        let late = save(&mut store, input("Late", -5, "negative")).expect("create");
        let e = save(&mut store, input("LATE", -3, "negative")).expect_err("dup");
        assert_eq!(e.code(), "duplicate");

        let updated = save(
            &mut store,
            BehaviorInput {
                id: Some(late.id.clone()),
                name: "late".into(),
                score: -10,
                kind: "negative".into(),
            },
        )
        .expect("self update");
        assert_eq!(updated.score, -10);
        assert_eq!(get(&store, &late.id).expect("get").name, "late");
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let mut store = MemoryStore::new();
        let e = save(
            &mut store,
            BehaviorInput {
                id: Some("missing".into()),
                ..input("Late", -5, "negative")
            },
        )
        .expect_err("missing");
        assert_eq!(e.code(), "not_found");
    }

    #[test]
    fn delete_is_blocked_while_referenced() {
        let mut store = MemoryStore::new();
        let late = save(&mut store, input("Late", -5, "negative")).expect("late");
        let help = save(&mut store, input("Help", 5, "positive")).expect("help");
        store
            .append(
                Table::Infractions,
                vec![
                    "i1".into(),
                    "s1".into(),
                    "Ann".into(),
                    "M.1/1".into(),
                    "2026-10-01".into(),
                    late.id.clone(),
                    String::new(),
                    String::new(),
                ],
            )
            .expect("infraction");

        let e = delete(&mut store, &late.id).expect_err("in use");
        assert_eq!(e.code(), "in_use");

        delete(&mut store, &help.id).expect("unreferenced");
        let names: Vec<String> = list(&store).expect("list").into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["Late".to_string()]);
    }
}
