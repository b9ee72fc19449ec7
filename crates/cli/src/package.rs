// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Package lifecycle: purge, start, run a scenario group, stop, purge.

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::control::ControlScripts;
use crate::error::HarnessError;

/// Package state directories purged around every run, relative to the root.
pub const STATE_DIRS: [&str; 2] = ["var/data", "var/log"];

/// Remove the package's data and log directories. Missing directories are
/// not an error, so purging twice is a no-op the second time.
pub fn purge_package_data(package_dir: &Path) -> Result<(), HarnessError> {
    for rel in STATE_DIRS {
        let dir = package_dir.join(rel);
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => info!(dir = %dir.display(), "purged package state"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(HarnessError::io(dir, e)),
        }
    }
    Ok(())
}

/// Start/stop/purge operations of a package under test.
pub trait PackageControl: Send + Sync {
    fn purge(&self) -> impl Future<Output = Result<(), HarnessError>> + Send;
    fn start(&self) -> impl Future<Output = Result<(), HarnessError>> + Send;
    fn stop(&self) -> impl Future<Output = Result<(), HarnessError>> + Send;
}

/// A package installed on disk, driven by its control scripts
#[derive(Clone, Debug)]
pub struct ScriptedPackage {
    package_dir: PathBuf,
    scripts: ControlScripts,
}

impl ScriptedPackage {
    pub fn new(package_dir: impl Into<PathBuf>, scripts: ControlScripts) -> Self {
        Self {
            package_dir: package_dir.into(),
            scripts,
        }
    }

    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    pub fn scripts(&self) -> &ControlScripts {
        &self.scripts
    }
}

impl PackageControl for ScriptedPackage {
    async fn purge(&self) -> Result<(), HarnessError> {
        purge_package_data(&self.package_dir)
    }

    async fn start(&self) -> Result<(), HarnessError> {
        info!(sbin = %self.scripts.sbin_dir().display(), "starting package");
        self.scripts.start().await
    }

    async fn stop(&self) -> Result<(), HarnessError> {
        info!("stopping package");
        self.scripts.stop().await
    }
}

/// Run `body` against a freshly started package.
///
/// State is purged before start. Stop and the second purge run exactly once
/// on every exit path: body success, body error, body panic, and start
/// failure (a partially started package is still stopped). The body never
/// runs when start fails.
///
/// The body runs on its own task so a panic inside it is caught and reported
/// as [`HarnessError::BodyPanicked`] after teardown.
pub async fn with_running_package<P, F, Fut, T>(package: &P, body: F) -> Result<T, HarnessError>
where
    P: PackageControl,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, HarnessError>> + Send + 'static,
    T: Send + 'static,
{
    package.purge().await?;

    let body_result = match package.start().await {
        Ok(()) => run_body(body()).await,
        Err(e) => {
            error!(error = %e, "package failed to start");
            Err(e)
        }
    };

    let teardown_result = teardown(package).await;

    match (body_result, teardown_result) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(e), Ok(())) => Err(e),
        (body_result, Err(teardown_error)) => {
            let body_error = body_result.err().map(Box::new);
            Err(HarnessError::Teardown {
                source: Box::new(teardown_error),
                body_error,
            })
        }
    }
}

async fn run_body<Fut, T>(body: Fut) -> Result<T, HarnessError>
where
    Fut: Future<Output = Result<T, HarnessError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(body).await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => {
            let payload = join_error.into_panic();
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            error!(%message, "scenario group panicked");
            Err(HarnessError::BodyPanicked(message))
        }
        Err(join_error) => Err(HarnessError::BodyPanicked(join_error.to_string())),
    }
}

/// Stop, then purge even when stop failed. The stop error wins.
async fn teardown<P: PackageControl>(package: &P) -> Result<(), HarnessError> {
    let stopped = package.stop().await;
    if let Err(ref e) = stopped {
        warn!(error = %e, "package stop failed; purging state anyway");
    }
    let purged = package.purge().await;
    stopped?;
    purged
}

#[cfg(test)]
#[path = "package_tests.rs"]
mod tests;
