use std::{
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use humansize::{DECIMAL, format_size};
use tracing::{info, instrument, warn};

use crate::{
    adb::Bridge,
    models::{Device, PACKAGE_LIST_COMMAND, Package, parse_package_list},
    select::{Prompter, Selection},
};

#[derive(Debug, Clone)]
pub struct PullOptions {
    /// Directory the APK is written to, relative paths resolve against the working directory
    pub output_dir: PathBuf,
    pub package_command: String,
}

impl Default for PullOptions {
    fn default() -> Self {
        Self { output_dir: PathBuf::new(), package_command: PACKAGE_LIST_COMMAND.to_string() }
    }
}

/// Result of a successful pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    pub device: Device,
    pub package: Package,
    pub destination: PathBuf,
    pub bytes: u64,
}

/// Walks the user from device selection to a pulled APK
#[derive(Debug)]
pub struct Puller<B, R, W> {
    bridge: B,
    prompter: Prompter<R, W>,
    options: PullOptions,
}

impl<B: Bridge, R: BufRead, W: Write> Puller<B, R, W> {
    pub fn new(bridge: B, prompter: Prompter<R, W>, options: PullOptions) -> Self {
        Self { bridge, prompter, options }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn into_parts(self) -> (B, Prompter<R, W>) {
        (self.bridge, self.prompter)
    }

    /// Selects a device and a package, then pulls the package APK to `<package>.apk`.
    /// Any failure ends the run, nothing is retried.
    #[instrument(skip(self), err(level = "debug"))]
    pub async fn run(&mut self, selection: &Selection) -> Result<PullReport> {
        if let Some(name) = selection.package.as_deref()
            && !Package::is_valid_name(name)
        {
            warn!(package = name, "Requested package name does not look like a package identifier");
        }

        let devices = self.bridge.devices().await.context("Failed to get list of devices")?;
        let device = self.prompter.select_device(&devices, selection.device.as_deref())?.clone();
        info!(serial = %device.serial, state = %device.state, "Using device");

        let list_output = self
            .bridge
            .shell(&device.serial, &self.options.package_command)
            .await
            .context("Failed to retrieve packages")?;
        let packages = parse_package_list(&list_output)?;
        let package = self.prompter.select_package(&packages, selection.package.as_deref())?.clone();

        let file_name = package.apk_file_name();
        let destination = self.options.output_dir.join(&file_name);
        let out = self.prompter.output();
        write!(out, "Pulling {file_name} from device... ")?;
        out.flush()?;

        match self.bridge.pull(&device.serial, &package.path, &destination).await {
            Ok(bytes) => {
                writeln!(self.prompter.output(), "Success ({})", format_size(bytes, DECIMAL))?;
                info!(
                    package = %package.name,
                    destination = %destination.display(),
                    bytes,
                    "Pulled package"
                );
                Ok(PullReport { device, package, destination, bytes })
            }
            Err(e) => {
                writeln!(self.prompter.output(), "Failed")?;
                Err(e.context("Failed to pull package from device"))
            }
        }
    }
}
