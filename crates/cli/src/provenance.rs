use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsStr;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What went into an output file: the subcommand, its parameters, and the
/// pipeline report.
pub struct Payload {
    pub command: &'static str,
    pub params: Value,
    pub report: Value,
}

impl Payload {
    pub fn new(command: &'static str, params: Value) -> Self {
        Self {
            command,
            params,
            report: Value::Null,
        }
    }

    pub fn with_report(mut self, report: Value) -> Self {
        self.report = report;
        self
    }
}

/// Write `<artifact>.provenance.json` with the code revision, callsite,
/// command, params, report and outputs.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let sidecar = provenance_path(artifact);
    if let Some(dir) = sidecar.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let callsite = Location::caller();
    let doc = json!({
        "code_rev": current_git_rev(),
        "version": mountform::VERSION,
        "callsite": {
            "file": callsite.file(),
            "line": callsite.line()
        },
        "command": payload.command,
        "params": payload.params,
        "report": payload.report,
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&sidecar, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", sidecar.display()))?;
    tracing::debug!(path = %sidecar.display(), "provenance written");
    Ok(sidecar)
}

/// `dir/part.stl` → `dir/part.provenance.json`.
fn provenance_path(artifact: &Path) -> PathBuf {
    let stem = artifact.file_stem().unwrap_or(OsStr::new("artifact"));
    artifact.with_file_name(format!("{}.provenance.json", stem.to_string_lossy()))
}

/// Commit hash: `GIT_COMMIT` baked in at build time, then `GIT_COMMIT` in the
/// environment, then `git rev-parse HEAD`, else `"unknown"`.
pub fn current_git_rev() -> String {
    let baked = option_env!("GIT_COMMIT").map(str::to_owned);
    let runtime = std::env::var("GIT_COMMIT").ok();
    baked
        .into_iter()
        .chain(runtime)
        .find(|rev| !rev.is_empty())
        .or_else(rev_parse_head)
        .unwrap_or_else(|| "unknown".to_owned())
}

fn rev_parse_head() -> Option<String> {
    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?;
    Some(rev.trim().to_owned())
}
