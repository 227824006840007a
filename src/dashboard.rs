//! Read-side dashboard model: top behavior, lowest student, this month's
//! entry count and two chart-ready breakdowns.

use crate::error::AppResult;
use crate::model::{Behavior, Infraction, Student};
use crate::records;
use crate::store::TableStore;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Class chart colors, cycled in group order.
pub const CLASS_PALETTE: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub students: usize,
    pub classes: usize,
    pub behaviors: usize,
    pub infractions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopBehavior {
    pub id: String,
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowestStudent {
    pub id: String,
    pub student_code: String,
    pub name: String,
    pub class: String,
    pub net_score: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BehaviorChart {
    pub labels: Vec<String>,
    pub data: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClassChart {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardModel {
    pub totals: Totals,
    pub top_behavior: Option<TopBehavior>,
    pub lowest_student: Option<LowestStudent>,
    pub monthly_report_count: usize,
    pub behavior_chart: BehaviorChart,
    pub class_chart: ClassChart,
}

/// Infraction count per behavior id, in order of first occurrence.
fn behavior_counts(infractions: &[Infraction]) -> Vec<(String, usize)> {
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for i in infractions {
        match slot.get(i.behavior_id.as_str()) {
            Some(&idx) => order[idx].1 += 1,
            None => {
                slot.insert(i.behavior_id.as_str(), order.len());
                order.push((i.behavior_id.clone(), 1));
            }
        }
    }
    order
}

/// Most frequent behavior. Equal counts go to the behavior seen first.
pub fn top_behavior(infractions: &[Infraction], behaviors: &[Behavior]) -> Option<TopBehavior> {
    let mut best: Option<(String, usize)> = None;
    for (id, count) in behavior_counts(infractions) {
        if best.as_ref().map(|(_, c)| count > *c).unwrap_or(true) {
            best = Some((id, count));
        }
    }
    best.map(|(id, count)| {
        let name = behaviors
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| id.clone());
        TopBehavior { id, name, count }
    })
}

/// Lowest net score. Equal scores go to the first student in table order.
pub fn lowest_student(students: &[Student]) -> Option<LowestStudent> {
    let mut lowest: Option<&Student> = None;
    for s in students {
        if lowest.map(|l| s.net_score() < l.net_score()).unwrap_or(true) {
            lowest = Some(s);
        }
    }
    lowest.map(|s| LowestStudent {
        id: s.id.clone(),
        student_code: s.student_code.clone(),
        name: s.name.clone(),
        class: s.class.clone(),
        net_score: s.net_score(),
    })
}

pub fn monthly_report_count(infractions: &[Infraction], today: NaiveDate) -> usize {
    infractions
        .iter()
        .filter_map(|i| i.day())
        .filter(|d| d.year() == today.year() && d.month() == today.month())
        .count()
}

/// One bar per behavior with infractions. A missing behavior is labelled
/// by its id, as in [`top_behavior`].
pub fn behavior_chart(infractions: &[Infraction], behaviors: &[Behavior]) -> BehaviorChart {
    let names: HashMap<&str, &str> = behaviors
        .iter()
        .map(|b| (b.id.as_str(), b.name.as_str()))
        .collect();
    let mut chart = BehaviorChart::default();
    for (id, count) in behavior_counts(infractions) {
        let label = names.get(id.as_str()).map(|n| n.to_string()).unwrap_or(id);
        chart.labels.push(label);
        chart.data.push(count);
    }
    chart
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn class_chart(students: &[Student]) -> ClassChart {
    let mut groups: Vec<(String, i64, usize)> = Vec::new();
    for s in students {
        match groups.iter_mut().find(|(name, _, _)| *name == s.class) {
            Some(group) => {
                group.1 += s.net_score();
                group.2 += 1;
            }
            None => groups.push((s.class.clone(), s.net_score(), 1)),
        }
    }
    let mut chart = ClassChart::default();
    for (idx, (name, sum, n)) in groups.into_iter().enumerate() {
        chart.labels.push(name);
        chart.data.push(round2(sum as f64 / n as f64));
        chart
            .colors
            .push(CLASS_PALETTE[idx % CLASS_PALETTE.len()].to_string());
    }
    chart
}

pub fn build_dashboard(
    students: &[Student],
    class_count: usize,
    behaviors: &[Behavior],
    infractions: &[Infraction],
    today: NaiveDate,
) -> DashboardModel {
    DashboardModel {
        totals: Totals {
            students: students.len(),
            classes: class_count,
            behaviors: behaviors.len(),
            infractions: infractions.len(),
        },
        top_behavior: top_behavior(infractions, behaviors),
        lowest_student: lowest_student(students),
        monthly_report_count: monthly_report_count(infractions, today),
        behavior_chart: behavior_chart(infractions, behaviors),
        class_chart: class_chart(students),
    }
}

/// Full reload of every table the dashboard reads.
pub fn load_dashboard(store: &dyn TableStore, today: NaiveDate) -> AppResult<DashboardModel> {
    let students = records::students::list(store)?;
    let classes = records::classes::list(store)?;
    let behaviors = records::behaviors::list(store)?;
    let infractions = records::infractions::list(store)?;
    Ok(build_dashboard(
        &students,
        classes.len(),
        &behaviors,
        &infractions,
        today,
    ))
}
