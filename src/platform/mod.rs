// Per-OS locations for the link tree settings file and database.
//
// Linux follows XDG, macOS uses Application Support, Windows uses %APPDATA%.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "linktree";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Returns the directory holding `settings.json`.
///
/// - **Linux**: `$XDG_CONFIG_HOME/linktree` or `~/.config/linktree`
/// - **macOS**: `~/Library/Application Support/linktree`
/// - **Windows**: `%APPDATA%/linktree`
pub fn get_config_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        return appdata_dir();
    }
    if cfg!(target_os = "macos") {
        return application_support_dir();
    }
    match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        _ => home_dir().join(".config").join(APP_DIR),
    }
}

/// Returns the directory holding the SQLite database.
///
/// - **Linux**: `$XDG_DATA_HOME/linktree` or `~/.local/share/linktree`
/// - **macOS**: same as the config dir
/// - **Windows**: same as the config dir
pub fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        return appdata_dir();
    }
    if cfg!(target_os = "macos") {
        return application_support_dir();
    }
    match env::var("XDG_DATA_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
        _ => home_dir().join(".local").join("share").join(APP_DIR),
    }
}

fn application_support_dir() -> PathBuf {
    home_dir()
        .join("Library")
        .join("Application Support")
        .join(APP_DIR)
}

fn appdata_dir() -> PathBuf {
    let appdata = env::var("APPDATA")
        .unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
    PathBuf::from(appdata).join(APP_DIR)
}
