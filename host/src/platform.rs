//! Host platform primitives: directory discovery and media enumeration.

use std::path::Path;

pub fn dir_separator() -> &'static str {
    std::path::MAIN_SEPARATOR_STR
}

/// Directory containing the running binary, derived from its argv\[0\].
/// Falls back to the current working directory when argv\[0\] carries no
/// directory component.
pub fn base_dir(argv0: &str) -> String {
    let parent = Path::new(argv0).parent();
    if let Some(parent) = parent {
        if !parent.as_os_str().is_empty() {
            return parent.to_string_lossy().into_owned();
        }
    }
    std::env::current_dir()
        .map(|dir| dir.to_string_lossy().into_owned())
        .unwrap_or_else(|_| ".".to_owned())
}

/// The current user's home directory, if the platform knows one.
pub fn user_dir() -> Option<String> {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var(var).ok()
}

/// Mount points of detected optical media.
#[cfg(target_os = "linux")]
pub fn cd_rom_dirs() -> Vec<String> {
    let Ok(mounts) = std::fs::read_to_string("/proc/mounts") else {
        return Vec::new();
    };
    let mut dirs = Vec::new();
    for line in mounts.lines() {
        let mut fields = line.split_whitespace();
        let (Some(_device), Some(mount_point), Some(fstype)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        if matches!(fstype, "iso9660" | "udf") {
            dirs.push(mount_point.to_owned());
        }
    }
    dirs
}

/// Mount points of detected optical media.
#[cfg(not(target_os = "linux"))]
pub fn cd_rom_dirs() -> Vec<String> {
    Vec::new()
}
