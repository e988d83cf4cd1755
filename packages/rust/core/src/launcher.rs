//! Local component launcher.
//!
//! Each launchable component is a directory under a components root holding an
//! executable `start.sh`. Starting a component runs that script with the
//! component directory as working directory. This shares nothing with the
//! pipeline.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{info, instrument, warn};

use quickstart_shared::{QuickstartError, Result};

/// Script executed to start a component.
pub const START_SCRIPT: &str = "start.sh";

/// A component found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    /// The component's directory.
    pub home: PathBuf,
    /// Path to its start script.
    pub script: PathBuf,
}

/// Directory of the running binary, the default components root.
pub fn default_components_root() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| QuickstartError::io("<current exe>", e))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| QuickstartError::config("could not determine the binary's directory"))
}

/// Locate component `name` under `root`.
///
/// Fails with [`QuickstartError::ComponentNotFound`] if the name is not a plain
/// directory name, the directory does not exist, or it has no start script.
pub fn resolve_component(root: &Path, name: &str) -> Result<Component> {
    let not_found = || QuickstartError::ComponentNotFound {
        name: name.to_string(),
    };

    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if !plain {
        return Err(not_found());
    }

    let home = root.join(name);
    let script = home.join(START_SCRIPT);

    if home.is_dir() && script.is_file() {
        Ok(Component {
            name: name.to_string(),
            home,
            script,
        })
    } else {
        Err(not_found())
    }
}

/// Run component `name`'s start script and wait for it to finish.
#[instrument(skip(root), fields(components_root = %root.display()))]
pub fn start_component(root: &Path, name: &str) -> Result<Component> {
    let component = resolve_component(root, name)?;

    info!(home = %component.home.display(), "starting component");

    let status = Command::new(format!("./{START_SCRIPT}"))
        .current_dir(&component.home)
        .status()
        .map_err(|e| QuickstartError::Launch {
            name: name.to_string(),
            message: format!(
                "the script {} was not found or could not be executed in {}: {e}",
                component.script.display(),
                component.home.display()
            ),
        })?;

    if !status.success() {
        warn!(code = ?status.code(), "start script failed");
        return Err(QuickstartError::Launch {
            name: name.to_string(),
            message: match status.code() {
                Some(code) => format!("{START_SCRIPT} exited with status {code}"),
                None => format!("{START_SCRIPT} was terminated by a signal"),
            },
        });
    }

    info!("component started");
    Ok(component)
}
