use crate::error::{AppError, AppResult};
use crate::exchange::{csv_text, BOM};
use crate::model::Student;
use crate::records;
use crate::store::TableStore;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use url::Url;

pub const REPORT_CSV_HEADER: &str =
    "ลำดับ,รหัสนักเรียน,ชื่อ-สกุล,ชั้น,คะแนนเริ่มต้น,คะแนนที่เพิ่ม,คะแนนที่หัก,คะแนนคงเหลือ";
const REPORT_TITLE: &str = "รายงานคะแนนพฤติกรรมนักเรียน";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub no: usize,
    pub id: String,
    pub student_code: String,
    pub name: String,
    pub class: String,
    pub initial_score: i64,
    pub added_score: i64,
    pub deducted_score: i64,
    pub net_score: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }
}

/// Where exported files go and how they are addressed.
#[derive(Debug, Clone, Default)]
pub struct ExportSettings {
    pub exports_dir: Option<PathBuf>,
    pub public_base_url: Option<Url>,
    /// External HTML-to-PDF converter, e.g. `wkhtmltopdf {input} {output}`.
    pub pdf_command: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedFile {
    pub file_name: String,
    pub format: String,
    pub url: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub fn report_rows(students: &[Student]) -> Vec<ReportRow> {
    students
        .iter()
        .enumerate()
        .map(|(idx, s)| ReportRow {
            no: idx + 1,
            id: s.id.clone(),
            student_code: s.student_code.clone(),
            name: s.name.clone(),
            class: s.class.clone(),
            initial_score: s.initial_score,
            added_score: s.added_score,
            deducted_score: s.deducted_score,
            net_score: s.net_score(),
        })
        .collect()
}

pub fn load_report(store: &dyn TableStore) -> AppResult<Vec<ReportRow>> {
    Ok(report_rows(&records::students::list(store)?))
}

/// Case-insensitive substring match on code or name, exact match on class.
/// Blank criteria do not filter. Sequence numbers restart at 1.
pub fn filter_rows(rows: Vec<ReportRow>, search: Option<&str>, class_filter: Option<&str>) -> Vec<ReportRow> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let class_filter = class_filter.map(str::trim).filter(|s| !s.is_empty());
    rows.into_iter()
        .filter(|r| {
            needle.as_ref().map_or(true, |n| {
                r.student_code.to_lowercase().contains(n.as_str())
                    || r.name.to_lowercase().contains(n.as_str())
            })
        })
        .filter(|r| class_filter.map_or(true, |c| r.class == c))
        .enumerate()
        .map(|(idx, mut r)| {
            r.no = idx + 1;
            r
        })
        .collect()
}

pub fn render_csv(rows: &[ReportRow]) -> String {
    let mut csv = String::new();
    csv.push(BOM);
    csv.push_str(REPORT_CSV_HEADER);
    csv.push_str("\r\n");
    for r in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{}\r\n",
            r.no,
            csv_text(&r.student_code),
            csv_text(&r.name),
            csv_text(&r.class),
            r.initial_score,
            r.added_score,
            r.deducted_score,
            r.net_score
        ));
    }
    csv
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Print-ready fixed-layout table, A4 landscape.
pub fn render_html(rows: &[ReportRow], generated_at: DateTime<Local>) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"th\">\n<head>\n<meta charset=\"utf-8\">\n",
    );
    html.push_str(&format!("<title>{REPORT_TITLE}</title>\n"));
    html.push_str(
        "<style>\n\
         @page { size: A4 landscape; margin: 12mm; }\n\
         body { font-family: 'Sarabun', 'TH Sarabun New', sans-serif; font-size: 12pt; }\n\
         table { width: 100%; table-layout: fixed; border-collapse: collapse; }\n\
         th, td { border: 1px solid #444; padding: 4px 6px; overflow-wrap: anywhere; }\n\
         th { background: #e8e8e8; }\n\
         td.num { text-align: right; }\n\
         </style>\n</head>\n<body>\n",
    );
    html.push_str(&format!("<h1>{REPORT_TITLE}</h1>\n"));
    html.push_str(&format!(
        "<p>{}</p>\n",
        html_escape(&generated_at.format("%Y-%m-%d %H:%M").to_string())
    ));
    html.push_str("<table>\n<thead><tr>");
    for h in REPORT_CSV_HEADER.split(',') {
        html.push_str(&format!("<th>{}</th>", html_escape(h)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for r in rows {
        html.push_str(&format!(
            "<tr><td class=\"num\">{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>\n",
            r.no,
            html_escape(&r.student_code),
            html_escape(&r.name),
            html_escape(&r.class),
            r.initial_score,
            r.added_score,
            r.deducted_score,
            r.net_score
        ));
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

pub fn exports_dir(settings: &ExportSettings, workspace: Option<&Path>) -> AppResult<PathBuf> {
    match (&settings.exports_dir, workspace) {
        (Some(dir), _) => Ok(dir.clone()),
        (None, Some(ws)) => Ok(ws.join("exports")),
        (None, None) => Err(AppError::validation(
            "select a workspace or configure an exports directory first",
        )),
    }
}

/// Shareable link: under the public base URL when configured, else a file URL.
pub fn download_url(settings: &ExportSettings, path: &Path, file_name: &str) -> AppResult<String> {
    if let Some(base) = &settings.public_base_url {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        return base
            .join(file_name)
            .map(|u| u.to_string())
            .map_err(|e| AppError::validation(format!("bad download url: {e}")));
    }
    let abs = path.canonicalize()?;
    Url::from_file_path(&abs)
        .map(|u| u.to_string())
        .map_err(|_| AppError::validation(format!("no file url for {}", abs.to_string_lossy())))
}

/// Write `content` into the exports directory and build its link.
pub fn publish(
    settings: &ExportSettings,
    workspace: Option<&Path>,
    file_name: &str,
    content: &[u8],
    format: &str,
) -> AppResult<ExportedFile> {
    let dir = exports_dir(settings, workspace)?;
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, content)?;
    finish(settings, &path, format, None)
}

fn finish(
    settings: &ExportSettings,
    path: &Path,
    format: &str,
    warning: Option<String>,
) -> AppResult<ExportedFile> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let url = download_url(settings, path, &file_name)?;
    tracing::info!(path = %path.to_string_lossy(), format, "export written");
    Ok(ExportedFile {
        file_name,
        format: format.to_string(),
        url,
        path: path.to_string_lossy().to_string(),
        warning,
    })
}

fn run_pdf_command(template: &str, input: &Path, output: &Path) -> anyhow::Result<()> {
    let args: Vec<String> = template
        .split_whitespace()
        .map(|part| {
            part.replace("{input}", &input.to_string_lossy())
                .replace("{output}", &output.to_string_lossy())
        })
        .collect();
    let Some((program, rest)) = args.split_first() else {
        anyhow::bail!("empty pdf command");
    };
    // stdin/stdout belong to the request stream; capture the child's output.
    let out = Command::new(program)
        .args(rest)
        .stdin(Stdio::null())
        .output()?;
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    tracing::debug!(program = %program, stdout = %stdout.trim(), stderr = %stderr.trim(), "pdf command finished");
    if !out.status.success() {
        anyhow::bail!("pdf command exited with {}: {}", out.status, stderr.trim());
    }
    if !output.is_file() {
        anyhow::bail!("pdf command produced no output");
    }
    Ok(())
}

/// Export the full roster. PDF goes through the configured converter; without
/// one the print-ready HTML is the deliverable.
pub fn export_report(
    store: &dyn TableStore,
    settings: &ExportSettings,
    workspace: Option<&Path>,
    format: ExportFormat,
    now: DateTime<Local>,
) -> AppResult<ExportedFile> {
    let rows = load_report(store)?;
    let stem = format!("behavior-report-{}", now.format("%Y%m%d-%H%M%S"));

    match format {
        ExportFormat::Csv => publish(
            settings,
            workspace,
            &format!("{stem}.csv"),
            render_csv(&rows).as_bytes(),
            "csv",
        ),
        ExportFormat::Pdf => {
            let html = render_html(&rows, now);
            let dir = exports_dir(settings, workspace)?;
            std::fs::create_dir_all(&dir)?;
            let html_path = dir.join(format!("{stem}.html"));
            std::fs::write(&html_path, html)?;

            let Some(command) = settings.pdf_command.as_deref() else {
                return finish(
                    settings,
                    &html_path,
                    "html",
                    Some("no PDF converter configured; exported the printable HTML document".into()),
                );
            };
            let pdf_path = dir.join(format!("{stem}.pdf"));
            match run_pdf_command(command, &html_path, &pdf_path) {
                Ok(()) => {
                    let _ = std::fs::remove_file(&html_path);
                    finish(settings, &pdf_path, "pdf", None)
                }
                Err(e) => {
                    tracing::error!(error = ?e, "pdf conversion failed");
                    finish(
                        settings,
                        &html_path,
                        "html",
                        Some(format!("PDF conversion failed ({e}); exported the printable HTML document")),
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn student(code: &str, name: &str, class: &str, initial: i64, deducted: i64, added: i64) -> Student {
        Student {
            id: format!("id-{code}"),
            student_code: code.into(),
            name: name.into(),
            class: class.into(),
            initial_score: initial,
            deducted_score: deducted,
            added_score: added,
        }
    }

    fn rows() -> Vec<ReportRow> {
        report_rows(&[
            student("S1", "Ann \"A\" Lee", "M.1/1", 100, 5, 10),
            student("S2", "Ben", "M.1/2", 100, 20, 0),
            student("X3", "Annabel", "M.1/2", 90, 0, 0),
        ])
    }

    fn now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 10, 19, 9, 30, 0)
            .single()
            .expect("time")
    }

    #[test]
    fn csv_has_bom_fixed_header_and_quoted_text() {
        let csv = render_csv(&rows());
        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').split("\r\n").collect();
        assert_eq!(lines[0], REPORT_CSV_HEADER);
        assert_eq!(lines[1], "1,\"S1\",\"Ann \"\"A\"\" Lee\",\"M.1/1\",100,10,5,105");
        assert_eq!(lines[2], "2,\"S2\",\"Ben\",\"M.1/2\",100,0,20,80");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn filter_matches_code_or_name_and_exact_class() {
        let by_name = filter_rows(rows(), Some("ann"), None);
        assert_eq!(by_name.len(), 2);
        let by_code = filter_rows(rows(), Some("x3"), None);
        assert_eq!(by_code[0].name, "Annabel");
        assert_eq!(by_code[0].no, 1);

        let both = filter_rows(rows(), Some("ANN"), Some("M.1/2"));
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].student_code, "X3");

        assert!(filter_rows(rows(), None, Some("m.1/2")).is_empty());
        assert_eq!(filter_rows(rows(), Some("  "), Some("")).len(), 3);
    }

    #[test]
    fn html_escapes_cells() {
        let html = render_html(&rows(), now());
        assert!(html.contains("Ann &quot;A&quot; Lee"));
        assert!(html.contains("table-layout: fixed"));
        assert!(html.contains("<th>คะแนนคงเหลือ</th>"));
    }

    #[test]
    fn export_csv_writes_file_and_file_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = crate::store::MemoryStore::new();
        crate::store::TableStore::append(
            &mut store,
            crate::store::Table::Students,
            student("S1", "Ann", "M.1/1", 100, 0, 0).to_row(),
        )
        .expect("student");

        let out = export_report(
            &store,
            &ExportSettings::default(),
            Some(dir.path()),
            ExportFormat::Csv,
            now(),
        )
        .expect("export");
        assert_eq!(out.file_name, "behavior-report-20261019-093000.csv");
        assert!(out.url.starts_with("file://"));
        let written = std::fs::read_to_string(&out.path).expect("read");
        assert!(written.contains("\"Ann\""));
    }

    #[test]
    fn pdf_without_converter_falls_back_to_html_with_public_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = ExportSettings {
            exports_dir: Some(dir.path().join("out")),
            public_base_url: Some(Url::parse("https://files.example.org/reports").expect("url")),
            pdf_command: None,
        };
        let store = crate::store::MemoryStore::new();
        let out = export_report(&store, &settings, None, ExportFormat::Pdf, now()).expect("export");
        assert_eq!(out.format, "html");
        assert!(out.warning.is_some());
        assert_eq!(
            out.url,
            "https://files.example.org/reports/behavior-report-20261019-093000.html"
        );
    }

    fn pdf_settings(dir: &Path, command: &str) -> ExportSettings {
        ExportSettings {
            exports_dir: Some(dir.to_path_buf()),
            public_base_url: None,
            pdf_command: Some(command.into()),
        }
    }

    #[cfg(unix)]
    #[test]
    fn pdf_converter_output_replaces_the_html() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = crate::store::MemoryStore::new();
        let settings = pdf_settings(dir.path(), "cp {input} {output}");
        let out = export_report(&store, &settings, None, ExportFormat::Pdf, now()).expect("export");
        assert_eq!(out.format, "pdf");
        assert!(out.warning.is_none());
        assert!(out.path.ends_with(".pdf"));
        assert!(Path::new(&out.path).is_file());
        assert!(!dir.path().join("behavior-report-20261019-093000.html").exists());
    }

    #[cfg(unix)]
    #[test]
    fn failing_pdf_converter_falls_back_to_html() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = crate::store::MemoryStore::new();
        let settings = pdf_settings(dir.path(), "false {input} {output}");
        let out = export_report(&store, &settings, None, ExportFormat::Pdf, now()).expect("export");
        assert_eq!(out.format, "html");
        assert!(out.path.ends_with(".html"));
        assert!(Path::new(&out.path).is_file());
        let warning = out.warning.expect("warning");
        assert!(warning.contains("PDF conversion failed"), "{warning}");
    }

    #[cfg(unix)]
    #[test]
    fn converter_without_output_file_is_a_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = crate::store::MemoryStore::new();
        let settings = pdf_settings(dir.path(), "echo converting {input}");
        let out = export_report(&store, &settings, None, ExportFormat::Pdf, now()).expect("export");
        assert_eq!(out.format, "html");
        assert!(out.warning.expect("warning").contains("produced no output"));
    }

    #[test]
    fn exports_need_a_destination() {
        let e = exports_dir(&ExportSettings::default(), None).expect_err("none");
        assert_eq!(e.code(), "validation_failed");
    }
}
