use derive_more::{Display, Error};
use lazy_regex::{Lazy, Regex, lazy_regex};
use tracing::{trace, warn};

/// Package manager query that lists installed packages along with their APK paths
pub const PACKAGE_LIST_COMMAND: &str = "pm list packages -f";

const PACKAGE_LINE_PREFIX: &str = "package:";

static PACKAGE_NAME_REGEX: Lazy<Regex> = lazy_regex!(r"^(?:[A-Za-z]{1}[\w]*\.)+[A-Za-z][\w]*$");

/// An installed package on the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package identifier, e.g. `com.example.app`
    pub name: String,
    /// Path of the installed APK on the device
    pub path: String,
}

impl Package {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { name: name.into(), path: path.into() }
    }

    /// Local file name the APK is saved under: `<name>.apk`
    pub fn apk_file_name(&self) -> String {
        format!("{}.apk", sanitize_filename::sanitize(&self.name))
    }

    /// Returns true if `name` looks like a reverse-domain package identifier
    pub fn is_valid_name(name: &str) -> bool {
        PACKAGE_NAME_REGEX.is_match(name)
    }
}

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum PackageListError {
    #[display("No packages found")]
    NoPackages,
}

/// Parses `pm list packages -f` output.
///
/// Each package line has the form `package:<path>=<name>`. Lines without the
/// `package:` prefix are skipped, malformed package lines are logged and skipped.
pub fn parse_package_list(output: &str) -> Result<Vec<Package>, PackageListError> {
    let packages: Vec<Package> = output
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            let rest = line.strip_prefix(PACKAGE_LINE_PREFIX)?;
            match rest.split_once('=') {
                Some((path, name)) => Some(Package::new(name, path)),
                None => {
                    warn!("Bad package manager response: '{line}'");
                    None
                }
            }
        })
        .collect();

    if packages.is_empty() {
        return Err(PackageListError::NoPackages);
    }
    trace!(count = packages.len(), "Parsed package list");
    Ok(packages)
}
