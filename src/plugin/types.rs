use serde::{Deserialize, Serialize};

/// A plugin as reported by the platform registry.
///
/// The registry owns these records; deployd reads them once per run and
/// never keeps a copy between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginRecord {
    pub name: String,

    /// Whether the plugin's source is tracked by composer, as opposed to a
    /// manual upload.
    #[serde(default)]
    pub managed_by_composer: bool,

    /// RFC3339 install timestamp; `None` for plugins that were never
    /// installed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<String>,

    /// Version an update would move to; `None` when the plugin is already
    /// at the latest known version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_version: Option<String>,

    #[serde(default)]
    pub active: bool,
}

impl PluginRecord {
    /// The pending upgrade version, with "present but empty" (as some
    /// registry listings emit) normalized to `None`.
    pub fn pending_upgrade(&self) -> Option<&str> {
        self.upgrade_version.as_deref().filter(|v| !v.is_empty())
    }

    pub fn is_installed(&self) -> bool {
        self.installed_at.as_deref().is_some_and(|t| !t.is_empty())
    }
}
