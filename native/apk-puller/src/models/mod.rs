mod device;
mod package;
mod settings;

pub use device::{Device, DeviceState};
pub use package::{PACKAGE_LIST_COMMAND, Package, PackageListError, parse_package_list};
pub use settings::Settings;
