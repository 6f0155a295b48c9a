//! Host environment utility functions

use std::path::PathBuf;

/// Name of the environment variable pointing at the root of the software
/// tree. Parameter files and session directories are resolved relative to
/// this root.
pub const SW_ROOT_ENV_VAR: &str = "AUTODRIVE_SW_ROOT";

/// Get the root directory of the software tree.
pub fn get_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(PathBuf::from)
}
