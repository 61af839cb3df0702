//! Interactive puller for APKs installed on connected Android devices.
//!
//! Lists devices through the ADB server, lets the user pick a device and a
//! package, then pulls the package APK to `<package>.apk`.

pub mod adb;
pub mod cli;
pub mod logging;
pub mod models;
pub mod puller;
pub mod select;
pub mod settings;
pub mod utils;

pub use adb::{AdbBridge, Bridge};
pub use puller::{PullOptions, PullReport, Puller};
pub use select::{Prompter, SelectError, Selection};
