use std::{
    env,
    path::{Path, PathBuf},
};

use etcetera::BaseStrategy;

/// Configuration directory name
const CONFIG_DIR: &str = "modgraph";

/// Configuration file name
pub const CONFIG_FILE: &str = "modgraph.toml";

/// Path of the per-user configuration file, e.g. `~/.config/modgraph/modgraph.toml`
pub fn user_config_file() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join(CONFIG_DIR).join(CONFIG_FILE))
}

/// First existing `modgraph/modgraph.toml` in a colon separated `XDG_CONFIG_DIRS` value
#[cfg(not(windows))]
fn find_in_xdg_dirs(value: Option<&str>) -> Option<PathBuf> {
    let config_dirs = value.filter(|s| !s.is_empty()).unwrap_or("/etc/xdg");
    config_dirs
        .split(':')
        .take_while(|dir| !dir.is_empty())
        .map(|dir| Path::new(dir).join(CONFIG_DIR).join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

#[cfg(windows)]
fn find_in_program_data(system_drive: &Path) -> Option<PathBuf> {
    let candidate = system_drive
        .join("ProgramData")
        .join(CONFIG_DIR)
        .join(CONFIG_FILE);
    candidate.is_file().then_some(candidate)
}

/// Path of the system-wide configuration file, if one exists.
///
/// Unix-like systems search `XDG_CONFIG_DIRS` (default `/etc/xdg`) and then
/// `/etc/modgraph/modgraph.toml`. Windows uses `%SYSTEMDRIVE%\ProgramData\modgraph`.
pub fn system_config_file() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        let system_drive = env::var("SYSTEMDRIVE").ok()?;
        find_in_program_data(Path::new(&system_drive))
    }

    #[cfg(not(windows))]
    {
        let xdg_config_dirs = env::var("XDG_CONFIG_DIRS").ok();
        if let Some(path) = find_in_xdg_dirs(xdg_config_dirs.as_deref()) {
            return Some(path);
        }

        let candidate = Path::new("/etc").join(CONFIG_DIR).join(CONFIG_FILE);
        match candidate.try_exists() {
            Ok(true) => Some(candidate),
            Ok(false) => None,
            Err(err) => {
                log::warn!("Failed to query system configuration file: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    #[cfg(not(windows))]
    fn test_find_in_xdg_dirs() -> anyhow::Result<()> {
        let context = TempDir::new()?;
        let config_dir = context.path().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir)?;
        fs::write(config_dir.join(CONFIG_FILE), "package = \"pkg\"\n")?;

        assert_eq!(find_in_xdg_dirs(Some("")), find_in_xdg_dirs(None));
        assert_eq!(find_in_xdg_dirs(Some(":")), None);

        let missing = context.path().join("missing");
        let dirs = format!(
            "{}:{}",
            missing.display(),
            context.path().display()
        );
        assert_eq!(
            find_in_xdg_dirs(Some(&dirs)),
            Some(config_dir.join(CONFIG_FILE))
        );
        Ok(())
    }

    #[test]
    #[cfg(windows)]
    fn test_find_in_program_data() -> anyhow::Result<()> {
        let context = TempDir::new()?;
        let program_data = context.path().join("ProgramData").join(CONFIG_DIR);
        fs::create_dir_all(&program_data)?;
        fs::write(program_data.join(CONFIG_FILE), "package = \"pkg\"\n")?;

        assert_eq!(
            find_in_program_data(context.path()),
            Some(program_data.join(CONFIG_FILE))
        );
        let empty = TempDir::new()?;
        assert_eq!(find_in_program_data(empty.path()), None);
        Ok(())
    }

    #[test]
    fn test_user_config_file_name() {
        if let Some(path) = user_config_file() {
            assert!(path.ends_with(Path::new(CONFIG_DIR).join(CONFIG_FILE)));
        }
    }
}
