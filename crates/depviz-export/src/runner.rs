use std::ffi::OsStr;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use depviz_core::{DiagramError, ExportAttempt, ExportConfig, ExportFailure};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::strategy::ExportStrategy;

/// Write the renderer configuration `{"maxTextSize": N}` to a temp file.
///
/// The file is removed when the returned handle is dropped.
///
/// # Errors
///
/// Returns [`DiagramError::Io`] if the temp file cannot be written.
pub fn write_renderer_config(max_text_size: usize) -> Result<NamedTempFile, DiagramError> {
    let body = serde_json::json!({ "maxTextSize": max_text_size });
    let mut file = tempfile::Builder::new()
        .prefix("depviz-mermaid-")
        .suffix(".json")
        .tempfile()?;
    file.write_all(serde_json::to_string(&body)?.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Render `input` (raw Mermaid text) to `output` with the first strategy
/// that succeeds, returning its name.
///
/// Each strategy renders into a staging directory next to `output`, and
/// only a successful render is moved over `output`. A strategy fails if it
/// cannot be spawned, exits non-zero, or exits successfully without
/// creating its file. Later strategies run only after earlier ones fail,
/// and an existing `output` is left untouched when all of them do.
///
/// # Errors
///
/// Returns [`DiagramError::Export`] listing every attempt if all strategies
/// fail, or [`DiagramError::Io`] if the renderer configuration or staging
/// directory cannot be created.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use depviz_export::{default_strategies, export_svg};
/// use depviz_core::ExportConfig;
///
/// let strategies = default_strategies(Path::new("."), &ExportConfig::default());
/// let used = export_svg(&strategies, Path::new("diagram.mmd"), Path::new("diagram.svg"), 90_000)?;
/// println!("rendered with {used}");
/// # Ok::<(), depviz_core::DiagramError>(())
/// ```
pub fn export_svg(
    strategies: &[ExportStrategy],
    input: &Path,
    output: &Path,
    max_text_size: usize,
) -> Result<String, DiagramError> {
    let config = write_renderer_config(max_text_size)?;

    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let staging = tempfile::Builder::new()
        .prefix(".depviz-export-")
        .tempdir_in(parent)?;
    // the renderer picks its image type from the extension, so keep the name
    let staged = staging
        .path()
        .join(output.file_name().unwrap_or_else(|| OsStr::new("diagram.svg")));

    let mut failure = ExportFailure::default();
    for strategy in strategies {
        info!(strategy = %strategy, "running diagram renderer");
        match run_strategy(strategy, input, &staged, config.path()) {
            Ok(()) => {
                fs::rename(&staged, output)?;
                info!(strategy = %strategy.name, output = %output.display(), "diagram exported");
                return Ok(strategy.name.clone());
            }
            Err(reason) => {
                warn!(strategy = %strategy.name, reason = %reason, "renderer strategy failed");
                failure.attempts.push(ExportAttempt {
                    strategy: strategy.name.clone(),
                    reason,
                });
            }
        }
    }

    Err(DiagramError::Export(failure))
}

/// Write `diagram` to the `.mmd` file next to `output` and export it.
///
/// `diagram` must be raw Mermaid text, not a fenced block. Returns the
/// path of the `.mmd` file and the name of the strategy that succeeded.
///
/// # Errors
///
/// Returns [`DiagramError::Config`] if `output` itself ends in `.mmd`,
/// since the source would be written to the same path.
/// Returns [`DiagramError::Io`] if the intermediate file cannot be written,
/// or [`DiagramError::Export`] if every strategy fails.
pub fn export_diagram(
    diagram: &str,
    output: &Path,
    strategies: &[ExportStrategy],
    config: &ExportConfig,
) -> Result<(PathBuf, String), DiagramError> {
    let source = output.with_extension("mmd");
    if source == output {
        return Err(DiagramError::Config(format!(
            "export output {} collides with its .mmd source; use an .svg, .png or .pdf path",
            output.display()
        )));
    }
    if let Some(parent) = source.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&source, diagram)?;
    debug!(path = %source.display(), "wrote diagram source");

    let used = export_svg(strategies, &source, output, config.max_text_size)?;
    Ok((source, used))
}

fn run_strategy(
    strategy: &ExportStrategy,
    input: &Path,
    staged: &Path,
    config: &Path,
) -> Result<(), String> {
    // leftovers from a failed strategy must not count as success
    match fs::remove_file(staged) {
        Ok(()) => debug!(path = %staged.display(), "discarded partial render"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(format!("cannot clear {}: {e}", staged.display())),
    }

    let result = Command::new(&strategy.program)
        .args(strategy.args(input, staged, config))
        .stdin(Stdio::null())
        .output();

    let out = match result {
        Ok(out) => out,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(format!("`{}` not found", strategy.program.display()));
        }
        Err(e) => return Err(format!("failed to start `{}`: {e}", strategy.program.display())),
    };

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        let detail = stderr.lines().rev().find(|l| !l.trim().is_empty());
        return Err(match detail {
            Some(line) => format!("{} ({})", out.status, line.trim()),
            None => out.status.to_string(),
        });
    }

    if !staged.is_file() {
        return Err(format!("{} but no output file was written", out.status));
    }
    Ok(())
}
