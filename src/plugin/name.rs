//! Plugin name validation.
//!
//! Names come straight out of the registry listing and are handed to the
//! platform console as process arguments, so anything that does not look
//! like a plugin identifier is rejected before a process is ever spawned.

use once_cell::sync::Lazy;
use regex::Regex;

/// Leading letter, then letters, digits, `_` or `-`.
static PLUGIN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").expect("plugin name pattern"));

/// Check if a string is a plugin name the platform accepts.
pub fn is_valid_plugin_name(name: &str) -> bool {
    name.len() <= 255 && PLUGIN_NAME.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_plugin_name("SwagPayPal"));
        assert!(is_valid_plugin_name("shop-analytics"));
        assert!(is_valid_plugin_name("Custom_Theme2"));
        assert!(is_valid_plugin_name("a"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_plugin_name(""));
        assert!(!is_valid_plugin_name("2fast")); // leading digit
        assert!(!is_valid_plugin_name("../escape"));
        assert!(!is_valid_plugin_name("has space"));
        assert!(!is_valid_plugin_name("--activate")); // would parse as a flag
        assert!(!is_valid_plugin_name(&"x".repeat(256)));
    }
}
