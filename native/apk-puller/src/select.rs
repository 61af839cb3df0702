//! Interactive selection of a device and a package.
//!
//! Selection honors an optional requested key (serial or package name) and
//! otherwise asks the user to pick from a numbered list.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use derive_more::{Display, Error};
use tracing::{debug, instrument};

use crate::models::{Device, Package};

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum SelectError {
    #[display("Input cancelled")]
    Cancelled,
    #[display("Invalid input: {reason}")]
    InvalidInput { reason: String },
    #[display("Input out of range: {value}")]
    OutOfRange { value: i64 },
    #[display("No devices found")]
    NoDevices,
    #[display("Could not locate package: {name}")]
    PackageNotFound { name: String },
    #[display("Failed to write to terminal: {reason}")]
    Terminal { reason: String },
}

impl From<io::Error> for SelectError {
    fn from(e: io::Error) -> Self {
        Self::Terminal { reason: e.to_string() }
    }
}

/// What the user asked for up front. Empty values count as not requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub package: Option<String>,
    pub device: Option<String>,
}

impl Selection {
    pub fn new(package: Option<String>, device: Option<String>) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self { package: non_empty(package), device: non_empty(device) }
    }
}

/// Line-oriented prompt over an input and an output stream
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    /// Prompter over the process standard input and output
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Stream user-facing messages are written to
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Prints `<prompt> [<min>-<max>]: ` and reads a number in `min..=max`
    pub fn read_input_number(
        &mut self,
        prompt: &str,
        min: usize,
        max: usize,
    ) -> Result<usize, SelectError> {
        write!(self.output, "{prompt} [{min}-{max}]: ")?;
        self.output.flush()?;

        // A final line without a newline counts as an interrupted read
        let mut line = String::new();
        let input = match self.input.read_line(&mut line) {
            Ok(_) if line.ends_with('\n') => line.trim(),
            _ => return Err(SelectError::Cancelled),
        };
        if input.is_empty() {
            return Err(SelectError::Cancelled);
        }

        let value: i64 =
            input.parse().map_err(|e| SelectError::InvalidInput { reason: format!("{e}") })?;
        match usize::try_from(value) {
            Ok(index) if (min..=max).contains(&index) => Ok(index),
            _ => Err(SelectError::OutOfRange { value }),
        }
    }

    /// Resolves the device to pull from.
    ///
    /// A requested serial that matches no device is reported and ignored.
    #[instrument(level = "debug", skip(self, devices), fields(count = devices.len()))]
    pub fn select_device<'a>(
        &mut self,
        devices: &'a [Device],
        requested_serial: Option<&str>,
    ) -> Result<&'a Device, SelectError> {
        if let Some(serial) = requested_serial {
            if let Some(device) = devices.iter().find(|d| d.serial == serial) {
                return Ok(device);
            }
            debug!(serial, "Requested device not connected");
            writeln!(self.output, "Warning: Could not locate device.")?;
        }

        match devices {
            [] => Err(SelectError::NoDevices),
            [device] => {
                writeln!(self.output, "Device: {}", device.serial)?;
                Ok(device)
            }
            _ => {
                writeln!(self.output, "Devices:")?;
                for (i, device) in devices.iter().enumerate() {
                    writeln!(self.output, "\t{i}:\t{} {}", device.serial, device.state)?;
                }
                let index = self.read_input_number("Which device?", 0, devices.len() - 1)?;
                Ok(&devices[index])
            }
        }
    }

    /// Resolves the package to pull.
    ///
    /// Unlike devices, a requested package name must exist on the device.
    ///
    /// # Panics
    ///
    /// Panics if `packages` is empty. [`parse_package_list`](crate::models::parse_package_list)
    /// never returns an empty list.
    #[instrument(level = "debug", skip(self, packages), fields(count = packages.len()))]
    pub fn select_package<'a>(
        &mut self,
        packages: &'a [Package],
        requested_name: Option<&str>,
    ) -> Result<&'a Package, SelectError> {
        assert!(!packages.is_empty(), "package list must not be empty");
        if let Some(name) = requested_name {
            return packages
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| SelectError::PackageNotFound { name: name.to_string() });
        }

        match packages {
            [package] => {
                writeln!(self.output, "Package: {}", package.name)?;
                Ok(package)
            }
            _ => {
                writeln!(self.output, "Packages:")?;
                for (i, package) in packages.iter().enumerate() {
                    writeln!(self.output, "\t{i}:\t{} {}", package.name, package.path)?;
                }
                let index = self.read_input_number("Which package?", 0, packages.len() - 1)?;
                Ok(&packages[index])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::models::DeviceState;

    fn prompter(input: &str) -> Prompter<&[u8], Vec<u8>> {
        Prompter::new(input.as_bytes(), Vec::new())
    }

    fn printed(prompter: Prompter<&[u8], Vec<u8>>) -> String {
        String::from_utf8(prompter.into_output()).unwrap()
    }

    fn devices() -> Vec<Device> {
        vec![
            Device::new("1WMHH000M12345", DeviceState::Device),
            Device::new("192.168.1.100:5555", DeviceState::Unauthorized),
            Device::new("emulator-5554", DeviceState::Offline),
        ]
    }

    fn packages() -> Vec<Package> {
        vec![
            Package::new("com.foo", "/data/app/com.foo.apk"),
            Package::new("com.bar", "/data/app/com.bar.apk"),
        ]
    }

    #[test]
    fn test_read_input_number_in_range() {
        let mut p = prompter("2\n");
        assert_eq!(p.read_input_number("Which device?", 0, 4), Ok(2));
        assert_eq!(printed(p), "Which device? [0-4]: ");
    }

    #[test]
    fn test_read_input_number_bounds_inclusive() {
        assert_eq!(prompter("0\n").read_input_number("Which?", 0, 4), Ok(0));
        assert_eq!(prompter("  4 \r\n").read_input_number("Which?", 0, 4), Ok(4));
    }

    #[test]
    fn test_read_input_number_unterminated_line_is_cancelled() {
        assert_eq!(prompter("3").read_input_number("Which?", 0, 4), Err(SelectError::Cancelled));
        assert_eq!(prompter("0\n").read_input_number("Which?", 0, 4), Ok(0));
    }

    #[test]
    fn test_read_input_number_out_of_range() {
        assert_eq!(
            prompter("7\n").read_input_number("Which?", 0, 4),
            Err(SelectError::OutOfRange { value: 7 })
        );
        assert_eq!(
            prompter("-1\n").read_input_number("Which?", 0, 4),
            Err(SelectError::OutOfRange { value: -1 })
        );
        assert_eq!(SelectError::OutOfRange { value: 7 }.to_string(), "Input out of range: 7");
    }

    #[test]
    fn test_read_input_number_invalid() {
        let err = prompter("abc\n").read_input_number("Which?", 0, 4).unwrap_err();
        assert!(matches!(err, SelectError::InvalidInput { .. }));
        assert_eq!(err.to_string(), "Invalid input: invalid digit found in string");
        assert!(matches!(
            prompter("1.5\n").read_input_number("Which?", 0, 4),
            Err(SelectError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_read_input_number_cancelled() {
        assert_eq!(prompter("\n").read_input_number("Which?", 0, 4), Err(SelectError::Cancelled));
        assert_eq!(prompter("   \n").read_input_number("Which?", 0, 4), Err(SelectError::Cancelled));
        assert_eq!(prompter("").read_input_number("Which?", 0, 4), Err(SelectError::Cancelled));
    }

    #[test]
    fn test_select_device_requested_serial() {
        let devices = devices();
        let mut p = prompter("");
        let device = p.select_device(&devices, Some("emulator-5554")).unwrap();
        assert_eq!(device.serial, "emulator-5554");
        assert_eq!(printed(p), "");
    }

    #[test]
    fn test_select_device_unknown_serial_falls_back_to_prompt() {
        let devices = devices();
        let mut p = prompter("1\n");
        let device = p.select_device(&devices, Some("missing")).unwrap();
        assert_eq!(device.serial, "192.168.1.100:5555");
        assert_eq!(
            printed(p),
            "Warning: Could not locate device.\n\
             Devices:\n\
             \t0:\t1WMHH000M12345 device\n\
             \t1:\t192.168.1.100:5555 unauthorized\n\
             \t2:\temulator-5554 offline\n\
             Which device? [0-2]: "
        );
    }

    #[test]
    fn test_select_device_single_candidate() {
        let devices = vec![Device::new("R58M", DeviceState::Device)];

        let mut p = prompter("");
        assert_eq!(p.select_device(&devices, None).unwrap().serial, "R58M");
        assert_eq!(printed(p), "Device: R58M\n");

        let mut p = prompter("");
        assert_eq!(p.select_device(&devices, Some("other")).unwrap().serial, "R58M");
        assert_eq!(printed(p), "Warning: Could not locate device.\nDevice: R58M\n");
    }

    #[test]
    fn test_select_device_none_connected() {
        assert_eq!(prompter("0\n").select_device(&[], None), Err(SelectError::NoDevices));
        assert_eq!(prompter("0\n").select_device(&[], Some("R58M")), Err(SelectError::NoDevices));
    }

    #[test]
    fn test_select_device_invalid_choice() {
        let devices = devices();
        assert_eq!(
            prompter("3\n").select_device(&devices, None),
            Err(SelectError::OutOfRange { value: 3 })
        );
        assert_eq!(prompter("").select_device(&devices, None), Err(SelectError::Cancelled));
        assert_eq!(prompter("2\n").select_device(&devices, None).unwrap().serial, "emulator-5554");
    }

    #[test]
    fn test_select_package_requested_name() {
        let packages = packages();
        let mut p = prompter("");
        assert_eq!(p.select_package(&packages, Some("com.bar")).unwrap().name, "com.bar");
        assert_eq!(printed(p), "");
    }

    #[test]
    fn test_select_package_unknown_name_is_fatal() {
        let packages = packages();
        let err = prompter("0\n").select_package(&packages, Some("com.missing")).unwrap_err();
        assert_eq!(err, SelectError::PackageNotFound { name: "com.missing".to_string() });
        assert_eq!(err.to_string(), "Could not locate package: com.missing");

        let single = vec![Package::new("com.foo", "/data/app/com.foo.apk")];
        assert!(matches!(
            prompter("").select_package(&single, Some("com.missing")),
            Err(SelectError::PackageNotFound { .. })
        ));
    }

    #[test]
    fn test_select_package_prompt() {
        let packages = packages();
        let mut p = prompter("1\n");
        assert_eq!(p.select_package(&packages, None).unwrap().name, "com.bar");
        assert_eq!(
            printed(p),
            "Packages:\n\
             \t0:\tcom.foo /data/app/com.foo.apk\n\
             \t1:\tcom.bar /data/app/com.bar.apk\n\
             Which package? [0-1]: "
        );
    }

    #[test]
    fn test_select_package_out_of_range() {
        let packages = packages();
        assert_eq!(
            prompter("2\n").select_package(&packages, None),
            Err(SelectError::OutOfRange { value: 2 })
        );
        assert_eq!(prompter("1\n").select_package(&packages, None).unwrap().name, "com.bar");
    }

    #[test]
    #[should_panic(expected = "package list must not be empty")]
    fn test_select_package_empty_list_panics() {
        let _ = prompter("0\n").select_package(&[], None);
    }

    #[test]
    fn test_select_package_single_candidate() {
        let packages = vec![Package::new("com.foo", "/data/app/com.foo.apk")];
        let mut p = prompter("");
        assert_eq!(p.select_package(&packages, None).unwrap().path, "/data/app/com.foo.apk");
        assert_eq!(printed(p), "Package: com.foo\n");
    }

    #[test]
    fn test_selection_ignores_empty_values() {
        let selection = Selection::new(Some(String::new()), Some("R58M".to_string()));
        assert_eq!(selection.package, None);
        assert_eq!(selection.device.as_deref(), Some("R58M"));
    }
}
