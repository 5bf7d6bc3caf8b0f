//! Sane default configuration, composed entirely from the public API.

use tracing::debug;

use packfs_core::Result;

use crate::{
    add_to_search_path, base_dir, cd_rom_dirs, dir_separator, enumerate_files, mkdir, real_dir,
    set_write_dir, user_dir,
};

/// Set up sensible default paths for `app_name`.
///
/// The write dir becomes `<user dir>/.<app_name>` (created if missing, the
/// leading period keeps it out of sight on Unix) and the search path is
/// built, in order, from: the write dir, `<write dir>/<app_name>`, the base
/// dir, `<base dir>/<app_name>` if it exists, and each CD-ROM (plus its
/// `<app_name>` subdirectory) when `include_cd_roms` is set.
///
/// When `archive_ext` is given, every root-level entry carrying that
/// extension (compared case-insensitively) is then added as an archive in
/// alphabetical order: prepended to the search path when `archives_first`,
/// appended otherwise.
pub fn set_sane_config(
    app_name: &str,
    archive_ext: Option<&str>,
    include_cd_roms: bool,
    archives_first: bool,
) -> Result<()> {
    let sep = dir_separator();
    let user = user_dir()?;

    let write = format!("{user}{sep}.{app_name}");
    set_write_dir(Some(&write))?;

    add_to_search_path(&write, true)?;
    let _ = mkdir(app_name);
    let _ = add_to_search_path(&format!("{write}{sep}{app_name}"), true);

    let base = base_dir()?;
    let _ = add_to_search_path(&base, true);
    let _ = add_to_search_path(&format!("{base}{sep}{app_name}"), true);

    if include_cd_roms {
        for cd in cd_rom_dirs() {
            let _ = add_to_search_path(&cd, true);
            let _ = add_to_search_path(&format!("{cd}{sep}{app_name}"), true);
        }
    }

    if let Some(ext) = archive_ext {
        let mut archives = Vec::new();
        for name in enumerate_files("")? {
            if !has_extension(&name, ext) {
                continue;
            }
            let Ok(dir) = real_dir(&name) else { continue };
            archives.push(format!("{dir}{sep}{name}"));
        }
        archives.sort();
        debug!(count = archives.len(), "adding discovered archives");
        if archives_first {
            // Prepending one at a time reverses, so feed them backwards to
            // keep the front of the search path alphabetical.
            for archive in archives.iter().rev() {
                let _ = add_to_search_path(archive, false);
            }
        } else {
            for archive in &archives {
                let _ = add_to_search_path(archive, true);
            }
        }
    }

    Ok(())
}

fn has_extension(name: &str, ext: &str) -> bool {
    match name.rsplit_once('.') {
        Some((stem, found)) => !stem.is_empty() && found.eq_ignore_ascii_case(ext),
        None => false,
    }
}
