//! Utility functions.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Directory holding `index.html`.
///
/// A non-empty explicit override wins. Otherwise `templates/` next to the running
/// executable is used, so the page is found regardless of the working
/// directory; during development that directory does not exist and the
/// crate's own `templates/` is used instead.
pub fn resolve_templates_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit.filter(|dir| !dir.as_os_str().is_empty()) {
        return dir.to_path_buf();
    }

    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("templates")));

    match beside_exe {
        Some(dir) if dir.is_dir() => dir,
        _ => {
            let fallback = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
            warn!(
                path = %fallback.display(),
                "No templates/ beside the executable, using the build-time source tree"
            );
            fallback
        }
    }
}
