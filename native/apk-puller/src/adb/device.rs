use std::{error::Error, path::Path};

use anyhow::{Context, Result, ensure};
use derive_more::Debug;
use forensic_adb::{Device, UnixFileStatus, UnixPath};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::{debug, instrument, trace, warn};

/// A connected device
#[derive(Debug)]
pub(super) struct AdbDevice {
    #[debug(skip)]
    inner: Device,
    pub serial: String,
}

impl AdbDevice {
    pub(super) fn new(inner: Device) -> Self {
        let serial = inner.serial.clone();
        Self { inner, serial }
    }

    /// Executes a shell command on the device
    #[instrument(
        level = "debug",
        skip(self),
        fields(serial = %self.serial),
        err(level = "debug")
    )]
    pub(super) async fn shell(&self, command: &str) -> Result<String> {
        self.inner
            .execute_host_shell_command(command)
            .await
            .context("Failed to execute shell command")
            .inspect(|v| trace!(output = ?v, "Shell command executed"))
    }

    /// Pulls a regular file from the device into `dest_file`.
    /// The local file is removed if the transfer fails.
    #[instrument(
        level = "debug",
        skip(self),
        fields(serial = %self.serial),
        err(level = "debug")
    )]
    pub(super) async fn pull(&self, source_file: &str, dest_file: &Path) -> Result<u64> {
        let source_file = UnixPath::new(source_file);
        let source_stat =
            self.inner.stat(source_file).await.context("Failed to stat source file")?;
        ensure!(
            source_stat.file_mode == UnixFileStatus::RegularFile,
            "Source path is not a regular file: {}",
            source_file.display()
        );
        if let Some(parent) = dest_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure!(parent.is_dir(), "Parent directory '{}' does not exist", parent.display());
        }

        let mut file = File::create(dest_file)
            .await
            .with_context(|| format!("Failed to create {}", dest_file.display()))?;
        let transfer = async {
            self.inner.pull(source_file, &mut file).await?;
            file.flush().await?;
            anyhow::Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = transfer {
            if let Err(remove_err) = fs::remove_file(dest_file).await {
                warn!(
                    error = &remove_err as &dyn Error,
                    path = %dest_file.display(),
                    "Failed to remove partially pulled file"
                );
            }
            return Err(e.context("Failed to pull file"));
        }

        let size = fs::metadata(dest_file).await?.len();
        debug!(size, path = %dest_file.display(), "Pulled file");
        Ok(size)
    }
}
