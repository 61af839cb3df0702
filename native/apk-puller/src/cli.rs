use std::{ffi::OsString, path::PathBuf};

use clap::Parser;

use crate::select::Selection;

/// Long options that may also be spelled with a single dash (`-package=com.foo`)
const SINGLE_DASH_LONG_OPTIONS: &[&str] =
    &["package", "device", "adb-path", "output-dir", "config", "verbose", "help", "version"];

/// Android Package Puller - pull installed application packages from connected devices.
#[derive(Parser, Debug)]
#[command(name = "apk-puller", version, long_about = None)]
pub struct Cli {
    /// Application package name you'd like to pull from device.
    #[arg(value_name = "PACKAGE")]
    pub package_arg: Option<String>,

    /// Device serial number used to identify specific device.
    #[arg(value_name = "DEVICE")]
    pub device_arg: Option<String>,

    /// Application package name you'd like to pull from device (overrides PACKAGE).
    #[arg(short = 'p', long = "package", value_name = "PACKAGE", default_value = "")]
    pub package: String,

    /// Device serial number used to identify specific device (overrides DEVICE).
    #[arg(short = 's', long = "device", value_name = "SERIAL", default_value = "")]
    pub device: String,

    /// ADB binary used to start the ADB server.
    #[arg(long, value_name = "PATH")]
    pub adb_path: Option<String>,

    /// Directory the APK is written to.
    #[arg(short = 'o', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Settings file to use instead of the default location.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print debug logs.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses the process arguments, accepting single-dash long options
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Requested package and device. Flags take precedence over positionals.
    pub fn selection(&self) -> Selection {
        let pick = |flag: &str, positional: &Option<String>| {
            if flag.is_empty() { positional.clone() } else { Some(flag.to_string()) }
        };
        Selection::new(pick(&self.package, &self.package_arg), pick(&self.device, &self.device_arg))
    }
}

/// Rewrites `-name` / `-name=value` into `--name` / `--name=value` for known long options.
/// Arguments after `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut seen_terminator = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || seen_terminator {
                return arg;
            }
            let Some(s) = arg.to_str() else { return arg };
            if s == "--" {
                seen_terminator = true;
                return arg;
            }
            match s.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
                    if SINGLE_DASH_LONG_OPTIONS.contains(&name) {
                        OsString::from(format!("-{s}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}
