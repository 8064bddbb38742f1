//! Icon types mirroring favicon `<link>` elements.
//!
//! An [`Icon`] is the attribute set of one `<link>` element. Several icons that
//! describe the same logical favicon (for example a 16x16 and a 32x32 PNG)
//! form an [`IconSet`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The `sizes` value renderers prefer when picking a base icon.
pub const PREFERRED_SIZES: &str = "32x32";

/// A single favicon link: its URL plus the optional `rel`, `type` and `sizes`
/// attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Icon {
    /// Icon URL or data URL.
    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,

    /// MIME type, e.g. `image/png`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Size descriptor, e.g. `32x32`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
}

impl Icon {
    /// Creates an icon with only an href set.
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    /// Sets the `rel` attribute.
    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    /// Sets the MIME type.
    pub fn with_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Sets the `sizes` attribute.
    pub fn with_sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    /// Returns a copy pointing at `href` that keeps this icon's attributes.
    ///
    /// Renderers use this to publish a drawn image in place of the base icon.
    pub fn with_href(&self, href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..self.clone()
        }
    }
}

/// All icons representing one logical favicon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconSet {
    pub icons: Vec<Icon>,
}

impl IconSet {
    /// Creates a new empty icon set.
    pub fn new() -> Self {
        Self { icons: Vec::new() }
    }

    /// Creates an icon set from a list of icons.
    pub fn from_icons(icons: Vec<Icon>) -> Self {
        Self { icons }
    }

    /// Appends an icon to the set.
    pub fn add_icon(&mut self, icon: Icon) {
        self.icons.push(icon);
    }

    /// Returns the number of icons in the set.
    pub fn len(&self) -> usize {
        self.icons.len()
    }

    /// Returns true if the set has no icons.
    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// Returns the first icon, if any.
    pub fn first(&self) -> Option<&Icon> {
        self.icons.first()
    }

    /// Returns an iterator over the icons in order.
    pub fn iter(&self) -> impl Iterator<Item = &Icon> {
        self.icons.iter()
    }
}

impl From<Icon> for IconSet {
    fn from(icon: Icon) -> Self {
        Self { icons: vec![icon] }
    }
}

impl From<Vec<Icon>> for IconSet {
    fn from(icons: Vec<Icon>) -> Self {
        Self { icons }
    }
}

impl FromIterator<Icon> for IconSet {
    fn from_iter<I: IntoIterator<Item = Icon>>(iter: I) -> Self {
        Self {
            icons: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for IconSet {
    type Item = Icon;
    type IntoIter = std::vec::IntoIter<Icon>;

    fn into_iter(self) -> Self::IntoIter {
        self.icons.into_iter()
    }
}

impl<'a> IntoIterator for &'a IconSet {
    type Item = &'a Icon;
    type IntoIter = std::slice::Iter<'a, Icon>;

    fn into_iter(self) -> Self::IntoIter {
        self.icons.iter()
    }
}

/// Either a single icon or a whole set, as accepted in configuration and in
/// the registry cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IconEntry {
    Single(Icon),
    Set(IconSet),
}

impl IconEntry {
    /// Normalizes the entry to a set.
    pub fn to_icon_set(&self) -> IconSet {
        match self {
            Self::Single(icon) => IconSet::from(icon.clone()),
            Self::Set(set) => set.clone(),
        }
    }
}

impl From<Icon> for IconEntry {
    fn from(icon: Icon) -> Self {
        Self::Single(icon)
    }
}

impl From<IconSet> for IconEntry {
    fn from(set: IconSet) -> Self {
        Self::Set(set)
    }
}

/// The page's original icons keyed by their `sizes` attribute.
///
/// Iteration follows the order in which each distinct `sizes` value was first
/// inserted; a later icon with the same `sizes` replaces the earlier one in
/// place. Icons without a `sizes` attribute share the empty key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SizedIconMap {
    icons: IndexMap<String, Icon>,
}

impl SizedIconMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, icon: Icon) {
        let key = icon.sizes.clone().unwrap_or_default();
        self.icons.insert(key, icon);
    }

    pub fn get(&self, sizes: &str) -> Option<&Icon> {
        self.icons.get(sizes)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }

    /// The icon a badge should be drawn on: the 32x32 entry when present,
    /// otherwise the first one encountered.
    pub fn preferred(&self) -> Option<&Icon> {
        self.get(PREFERRED_SIZES)
            .or_else(|| self.icons.values().next())
    }

    pub fn values(&self) -> impl Iterator<Item = &Icon> {
        self.icons.values()
    }

    /// Collects the values, in insertion order, into an icon set.
    pub fn to_icon_set(&self) -> IconSet {
        self.icons.values().cloned().collect()
    }
}

impl FromIterator<Icon> for SizedIconMap {
    fn from_iter<I: IntoIterator<Item = Icon>>(iter: I) -> Self {
        let mut map = Self::new();
        for icon in iter {
            map.insert(icon);
        }
        map
    }
}
