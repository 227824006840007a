use crate::error::AppResult;
use crate::exchange::{data_records, BOM};
use crate::model::{Student, DEFAULT_INITIAL_SCORE};
use crate::records::{self, classes, new_id};
use crate::reports::{self, ExportSettings, ExportedFile};
use crate::store::{Table, TableStore};
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

pub const TEMPLATE_FILE_NAME: &str = "student-import-template.csv";
pub const TEMPLATE_HEADER: &str = "รหัสนักเรียน,ชื่อ-สกุล,ชั้น";
const MAX_REPORTED_ERRORS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub error_count: usize,
    /// First errors only; `more_errors` counts the rest.
    pub errors: Vec<RowError>,
    pub more_errors: usize,
    pub message: String,
}

impl ImportSummary {
    pub fn is_clean(&self) -> bool {
        self.error_count == 0 && self.imported > 0
    }
}

pub fn template_csv() -> String {
    format!("{BOM}{TEMPLATE_HEADER}\r\n12345,เด็กชายตัวอย่าง ใจดี,ม.1/1\r\n")
}

pub fn write_template(settings: &ExportSettings, workspace: Option<&Path>) -> AppResult<(String, ExportedFile)> {
    let content = template_csv();
    let file = reports::publish(settings, workspace, TEMPLATE_FILE_NAME, content.as_bytes(), "csv")?;
    Ok((content, file))
}

/// Validate every data row, then append the accepted ones in one write.
/// Bad rows are reported, not fatal.
pub fn import_students_csv(store: &mut dyn TableStore, content: &str) -> AppResult<ImportSummary> {
    let known_classes = classes::list(store)?;
    let mut seen_codes: HashSet<String> = records::students::list(store)?
        .into_iter()
        .map(|s| s.student_code.trim().to_lowercase())
        .collect();

    let mut accepted: Vec<Student> = Vec::new();
    let mut errors: Vec<RowError> = Vec::new();
    let rows = data_records(content);

    for (line, fields) in &rows {
        let fields: Vec<&str> = fields.iter().map(|f| f.trim()).collect();
        if fields.len() != 3 || fields.iter().any(|f| f.is_empty()) {
            errors.push(RowError {
                line: *line,
                message: "expected 3 non-empty columns: code, name, class".into(),
            });
            continue;
        }
        let (code, name, class) = (fields[0], fields[1], fields[2]);

        let key = code.to_lowercase();
        if seen_codes.contains(&key) {
            errors.push(RowError {
                line: *line,
                message: format!("student code '{code}' already exists"),
            });
            continue;
        }
        let Some(class) = classes::resolve_name(&known_classes, class) else {
            errors.push(RowError {
                line: *line,
                message: format!("class '{class}' does not exist"),
            });
            continue;
        };

        seen_codes.insert(key);
        accepted.push(Student {
            id: new_id(),
            student_code: code.to_string(),
            name: name.to_string(),
            class,
            initial_score: DEFAULT_INITIAL_SCORE,
            deducted_score: 0,
            added_score: 0,
        });
    }

    let imported = accepted.len();
    if imported > 0 {
        store.append_many(Table::Students, accepted.iter().map(Student::to_row).collect())?;
    }

    let error_count = errors.len();
    let message = if rows.is_empty() {
        "no data rows found".to_string()
    } else if error_count == 0 {
        format!("imported {imported} students")
    } else {
        format!(
            "imported {imported} students; {error_count} {} had errors",
            if error_count == 1 { "row" } else { "rows" }
        )
    };
    let more_errors = error_count.saturating_sub(MAX_REPORTED_ERRORS);
    errors.truncate(MAX_REPORTED_ERRORS);

    tracing::info!(imported, error_count, "student csv import finished");
    Ok(ImportSummary {
        imported,
        error_count,
        errors,
        more_errors,
        message,
    })
}
