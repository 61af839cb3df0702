use std::fmt;

/// Connection state of a device as reported by the ADB server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Offline,
    Bootloader,
    Device,
    Host,
    Recovery,
    NoPermissions,
    Sideload,
    Unauthorized,
    Authorizing,
    Unknown,
}

impl DeviceState {
    /// State name as printed by `adb devices`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offline => "offline",
            Self::Bootloader => "bootloader",
            Self::Device => "device",
            Self::Host => "host",
            Self::Recovery => "recovery",
            Self::NoPermissions => "no permissions",
            Self::Sideload => "sideload",
            Self::Unauthorized => "unauthorized",
            Self::Authorizing => "authorizing",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device known to the ADB server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Serial reported by ADB (e.g. `1WMHH000M12345`, or `192.168.1.100:5555` for wireless devices)
    pub serial: String,
    pub state: DeviceState,
}

impl Device {
    pub fn new(serial: impl Into<String>, state: DeviceState) -> Self {
        Self { serial: serial.into(), state }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.serial, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_display_uses_adb_state_names() {
        let device = Device::new("emulator-5554", DeviceState::NoPermissions);
        assert_eq!(device.to_string(), "emulator-5554 no permissions");
        assert_eq!(Device::new("R58M", DeviceState::Device).to_string(), "R58M device");
    }
}
