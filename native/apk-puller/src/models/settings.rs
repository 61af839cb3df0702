use serde::{Deserialize, Serialize};

use super::PACKAGE_LIST_COMMAND;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// ADB binary used to start the server (name looked up in `PATH`, or a full path)
    pub adb_path: String,
    /// ADB server host, library default when unset
    pub adb_host: Option<String>,
    /// ADB server port, library default when unset
    pub adb_port: Option<u16>,
    /// Shell command that lists installed packages as `package:<path>=<name>` lines
    pub package_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            adb_path: "adb".to_string(),
            adb_host: None,
            adb_port: None,
            package_command: PACKAGE_LIST_COMMAND.to_string(),
        }
    }
}
