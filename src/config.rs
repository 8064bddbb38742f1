//! Static registry configuration.
//!
//! A [`FaviconConfig`] names the icon sets known up front and the default
//! colors used for digit badges. It serializes to camelCase JSON so it can be
//! shipped from a host page as-is:
//!
//! ```json
//! {
//!   "icons": {
//!     "promo": { "href": "promo.png", "rel": "icon", "sizes": "32x32" },
//!     "dark": [
//!       { "href": "dark-16.png", "sizes": "16x16" },
//!       { "href": "dark-32.png", "sizes": "32x32" }
//!     ]
//!   },
//!   "color": "#fff",
//!   "bgColor": "#d00"
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::icon::{Icon, IconEntry, IconSet};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaviconConfig {
    /// Pre-registered icon sets, by name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub icons: IndexMap<String, IconEntry>,

    /// Default digit color for generated badges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Default badge background color for generated badges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
}

impl FaviconConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_icon(mut self, name: impl Into<String>, icon: Icon) -> Self {
        self.icons.insert(name.into(), IconEntry::Single(icon));
        self
    }

    pub fn with_icon_set(mut self, name: impl Into<String>, icons: impl Into<IconSet>) -> Self {
        self.icons.insert(name.into(), IconEntry::Set(icons.into()));
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_bg_color(mut self, bg_color: impl Into<String>) -> Self {
        self.bg_color = Some(bg_color.into());
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_deserializes() {
        let config = FaviconConfig::from_json("{}").unwrap();
        assert!(config.icons.is_empty());
        assert!(config.color.is_none());
        assert!(config.bg_color.is_none());
        assert_eq!(config.to_json().unwrap(), "{}");
    }

    #[test]
    fn parses_single_and_list_entries() {
        let json = r##"{
            "icons": {
                "promo": { "href": "promo.png", "rel": "icon", "sizes": "32x32" },
                "dark": [
                    { "href": "dark-16.png", "sizes": "16x16" },
                    { "href": "dark-32.png", "sizes": "32x32" }
                ]
            },
            "bgColor": "#d00"
        }"##;
        let config = FaviconConfig::from_json(json).unwrap();

        assert!(matches!(config.icons["promo"], IconEntry::Single(_)));
        assert_eq!(config.icons["dark"].to_icon_set().len(), 2);
        assert_eq!(config.bg_color.as_deref(), Some("#d00"));
        let names: Vec<_> = config.icons.keys().map(String::as_str).collect();
        assert_eq!(names, ["promo", "dark"]);
    }

    #[test]
    fn json_uses_camel_case() {
        let config = FaviconConfig::new()
            .with_icon("promo", Icon::new("promo.png").with_type("image/png"))
            .with_bg_color("#00f");
        let json = config.to_json_pretty().unwrap();

        assert!(json.contains("\"bgColor\""));
        assert!(json.contains("\"type\": \"image/png\""));

        let restored = FaviconConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }
}
