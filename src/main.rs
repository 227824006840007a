mod backup;
mod bootstrap;
mod calc;
mod config;
mod dashboard;
mod db;
mod error;
mod exchange;
mod import;
mod ipc;
mod model;
mod records;
mod reports;
mod store;

use clap::Parser;
use std::io::{self, BufRead, Write};

fn main() -> anyhow::Result<()> {
    let settings = config::Settings::parse();
    bootstrap::setup_logging(&settings.log_level)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "conductd starting");

    let mut state = ipc::AppState::new(settings.export_settings());
    if let Some(path) = settings.workspace.as_deref() {
        // A bad startup workspace leaves the sidecar up; the UI can select another.
        if let Err(e) = state.open_workspace(path) {
            tracing::error!(error = ?e, path = %path.to_string_lossy(), "startup workspace failed to open");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            Err(e) => {
                // Can't reply with an id.
                tracing::warn!(error = %e, "malformed request line");
                let mut v = ipc::err("", "bad_json", e.to_string(), None);
                if let Some(obj) = v.as_object_mut() {
                    obj.remove("id");
                }
                v
            }
        };

        let out = serde_json::to_string(&resp).unwrap_or_else(|_| {
            "{\"success\":false,\"code\":\"internal\",\"message\":\"unserializable response\"}"
                .to_string()
        });
        if writeln!(stdout, "{out}").and_then(|_| stdout.flush()).is_err() {
            break;
        }
    }

    tracing::info!("stdin closed; shutting down");
    Ok(())
}
