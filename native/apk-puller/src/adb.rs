use std::{error::Error, path::Path, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use derive_more::Debug;
use device::AdbDevice;
use forensic_adb::DeviceInfo;
use tokio::{process::Command, sync::RwLock, time::timeout};
use tracing::{debug, info, instrument, trace};

use crate::{
    models::{Device, DeviceState, Settings},
    utils::resolve_binary_path,
};

mod device;

/// Operations the puller needs from the device bridge
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Lists devices known to the bridge
    async fn devices(&self) -> Result<Vec<Device>>;

    /// Runs a shell command on the device and returns its standard output
    async fn shell(&self, serial: &str, command: &str) -> Result<String>;

    /// Pulls `remote_path` from the device into the local file `local_path`.
    /// Returns the number of bytes written.
    async fn pull(&self, serial: &str, remote_path: &str, local_path: &Path) -> Result<u64>;
}

impl From<forensic_adb::DeviceState> for DeviceState {
    fn from(state: forensic_adb::DeviceState) -> Self {
        match state {
            forensic_adb::DeviceState::Device => Self::Device,
            forensic_adb::DeviceState::Offline => Self::Offline,
            forensic_adb::DeviceState::Bootloader => Self::Bootloader,
            forensic_adb::DeviceState::Host => Self::Host,
            forensic_adb::DeviceState::Recovery => Self::Recovery,
            forensic_adb::DeviceState::NoPermissions => Self::NoPermissions,
            forensic_adb::DeviceState::Sideload => Self::Sideload,
            forensic_adb::DeviceState::Unauthorized => Self::Unauthorized,
            forensic_adb::DeviceState::Authorizing => Self::Authorizing,
            forensic_adb::DeviceState::Unknown => Self::Unknown,
        }
    }
}

/// Device bridge backed by the ADB server
#[derive(Debug)]
pub struct AdbBridge {
    #[debug(skip)]
    adb_host: forensic_adb::Host,
    /// Configured ADB binary, used to start the server
    adb_path: Option<String>,
    /// Devices seen by the last enumeration
    #[debug(skip)]
    known_devices: RwLock<Vec<DeviceInfo>>,
}

impl AdbBridge {
    const SERVER_CHECK_TIMEOUT: Duration = Duration::from_millis(1000);
    const SERVER_START_TIMEOUT: Duration = Duration::from_millis(10000);

    pub fn new(settings: &Settings) -> Self {
        let adb_host = match (&settings.adb_host, settings.adb_port) {
            (None, None) if cfg!(target_os = "windows") => {
                // Connecting through the default host fails on Windows
                forensic_adb::Host { host: Some("127.0.0.1".to_string()), port: Some(5037) }
            }
            (host, port) => forensic_adb::Host { host: host.clone(), port },
        };
        let adb_path =
            if settings.adb_path.is_empty() { None } else { Some(settings.adb_path.clone()) };
        Self { adb_host, adb_path, known_devices: RwLock::new(Vec::new()) }
    }

    /// Ensures the ADB server is running, starting it if necessary
    #[instrument(level = "debug", skip(self), err(level = "debug"))]
    async fn ensure_server_running(&self) -> Result<()> {
        if self.is_server_running().await {
            return Ok(());
        }

        info!("ADB server not running, attempting to start it");
        let adb_path = resolve_binary_path(self.adb_path.as_deref(), "adb")
            .context("ADB binary not found")?;
        info!(path = %adb_path.display(), "Found ADB binary, starting server");

        let output = timeout(Self::SERVER_START_TIMEOUT, {
            let mut command = Command::new(&adb_path);
            command.arg("start-server");
            command.output()
        })
        .await
        .map_err(|_| anyhow!("Timed out while starting ADB server"))?
        .context("Failed to start ADB server")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("Failed to start ADB server: {}", stderr.trim());
        }
        info!("ADB server started successfully");
        Ok(())
    }

    /// Checks if the ADB server is running
    #[instrument(level = "debug", skip(self), ret)]
    async fn is_server_running(&self) -> bool {
        match timeout(Self::SERVER_CHECK_TIMEOUT, self.adb_host.check_host_running()).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(error = &e as &dyn Error, "ADB server check failed");
                false
            }
            Err(_) => {
                debug!("Timed out while checking ADB server status (likely not running)");
                false
            }
        }
    }

    #[instrument(level = "debug", skip(self), err(level = "debug"))]
    async fn device_infos(&self) -> Result<Vec<DeviceInfo>> {
        self.ensure_server_running().await?;
        let devices: Vec<DeviceInfo> =
            self.adb_host.devices::<Vec<_>>().await.context("Failed to query ADB devices")?;
        debug!(count = devices.len(), "Got ADB devices");
        *self.known_devices.write().await = devices.clone();
        Ok(devices)
    }

    /// Returns the device info for `serial`, enumerating again only if it was not seen before
    async fn device_info(&self, serial: &str) -> Result<DeviceInfo> {
        if let Some(info) = self.known_devices.read().await.iter().find(|d| d.serial == serial) {
            trace!(serial, "Using known device info");
            return Ok(info.clone());
        }
        self.device_infos()
            .await?
            .into_iter()
            .find(|d| d.serial == serial)
            .with_context(|| format!("Device {serial} not available"))
    }

    /// Opens a connection to the device with the given serial
    #[instrument(level = "debug", skip(self), err(level = "debug"))]
    async fn connect(&self, serial: &str) -> Result<AdbDevice> {
        let info = self.device_info(serial).await?;
        let inner = forensic_adb::Device::new(self.adb_host.clone(), info.serial, info.info)
            .await
            .inspect_err(|e| debug!(error = e as &dyn Error, serial, "Device connection failed"))
            .context("Failed to connect to device")?;
        Ok(AdbDevice::new(inner))
    }
}

#[async_trait]
impl Bridge for AdbBridge {
    #[instrument(skip(self), err(level = "debug"))]
    async fn devices(&self) -> Result<Vec<Device>> {
        Ok(self
            .device_infos()
            .await?
            .into_iter()
            .map(|d| Device::new(d.serial, d.state.into()))
            .collect())
    }

    #[instrument(skip(self), err(level = "debug"))]
    async fn shell(&self, serial: &str, command: &str) -> Result<String> {
        self.connect(serial).await?.shell(command).await
    }

    #[instrument(skip(self), err(level = "debug"))]
    async fn pull(&self, serial: &str, remote_path: &str, local_path: &Path) -> Result<u64> {
        self.connect(serial).await?.pull(remote_path, local_path).await
    }
}
