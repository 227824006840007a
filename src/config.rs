use crate::reports::ExportSettings;
use clap::Parser;
use std::path::PathBuf;
use url::Url;

/// School behavior-tracking sidecar. Reads JSON requests from stdin, one per line.
#[derive(Parser, Debug, Clone)]
#[command(name = "conductd", version)]
pub struct Settings {
    /// Workspace directory to open at startup
    #[arg(long, env = "CONDUCTD_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    #[arg(long, env = "CONDUCTD_LOG", default_value = "info")]
    pub log_level: String,

    /// Directory for exported reports and templates (default: <workspace>/exports)
    #[arg(long, env = "CONDUCTD_EXPORTS_DIR")]
    pub exports_dir: Option<PathBuf>,

    /// Base URL under which the exports directory is published
    #[arg(long, env = "CONDUCTD_PUBLIC_BASE_URL", value_parser = parse_base_url)]
    pub public_base_url: Option<Url>,

    /// HTML-to-PDF converter command with {input} and {output} placeholders
    #[arg(long, env = "CONDUCTD_PDF_COMMAND")]
    pub pdf_command: Option<String>,
}

fn parse_base_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err(format!("{raw} cannot be used as a base URL"));
    }
    Ok(url)
}

impl Settings {
    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            exports_dir: self.exports_dir.clone(),
            public_base_url: self.public_base_url.clone(),
            pdf_command: self
                .pdf_command
                .as_ref()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }
}
