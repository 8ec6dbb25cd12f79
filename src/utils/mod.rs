use std::path::Path;

/// The name of the deployd configuration file
pub const CONFIG_FILE: &str = "deployd.json";

/// Get the path to the configuration file inside a project directory
pub fn get_config_path(project_path: &Path) -> std::path::PathBuf {
    project_path.join(CONFIG_FILE)
}

/// Get current timestamp in ISO 8601 format
pub fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// First non-empty line of a block of text, trimmed.
///
/// Console tools print multi-line failures; reports want one line.
pub fn first_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("")
        .to_string()
}
