//! The favicon registry: named icon sets, default icon backup and the
//! decision of when the page's favicon links must be rewritten.

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::FaviconConfig;
use crate::error::Result;
use crate::head::{IconHead, favicon_links, replace_icons};
use crate::icon::{Icon, IconEntry, IconSet, SizedIconMap};
use crate::loader::{DataUrlLoader, ImageLoader};
use crate::render::{DigitBadgeRenderer, DigitOptions, DotOptions, DotRenderer, IconRenderer};

/// Reserved key naming the page's original icons.
pub const DEFAULT_ICON_KEY: &str = "__default";

/// Reserved key for one-off icon sets. Displaying under this key always
/// rewrites the page's links.
pub const TEMP_ICON_KEY: &str = "__temp";

/// Cache key used by [`FaviconRegistry::set_dot`].
pub const DOT_ICON_KEY: &str = "dot";

fn is_reserved(name: &str) -> bool {
    name == DEFAULT_ICON_KEY || name == TEMP_ICON_KEY
}

/// Keeps track of named icon sets and which one the page currently shows.
///
/// The registry owns the page head handle. The page's original favicons are
/// snapshotted the first time they are needed and the snapshot is never
/// refreshed afterwards.
///
/// Generating an icon set borrows the registry mutably for the whole
/// operation, so generated sets are applied in the order they were requested.
pub struct FaviconRegistry<H: IconHead> {
    head: H,
    loader: Rc<dyn ImageLoader>,
    config: FaviconConfig,
    cache: HashMap<String, IconEntry>,
    current: String,
    default_icons: Option<SizedIconMap>,
}

impl<H: IconHead> FaviconRegistry<H> {
    /// Creates a registry that can only load `data:` URL icons.
    pub fn new(head: H, config: FaviconConfig) -> Self {
        Self::with_loader(head, config, DataUrlLoader::new())
    }

    /// Creates a registry that loads base icons through `loader`.
    pub fn with_loader(head: H, config: FaviconConfig, loader: impl ImageLoader + 'static) -> Self {
        let mut registry = Self {
            head,
            loader: Rc::new(loader),
            config,
            cache: HashMap::new(),
            current: DEFAULT_ICON_KEY.to_string(),
            default_icons: None,
        };
        registry.reset_cache();
        registry
    }

    /// Name of the icon set currently shown.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Returns the configuration the cache is seeded from.
    pub fn config(&self) -> &FaviconConfig {
        &self.config
    }

    /// Returns the page head the registry writes to.
    pub fn head(&self) -> &H {
        &self.head
    }

    /// Returns the page head mutably.
    pub fn head_mut(&mut self) -> &mut H {
        &mut self.head
    }

    /// Consumes the registry, returning the page head.
    pub fn into_head(self) -> H {
        self.head
    }

    /// Drops runtime cache entries and re-seeds from the configuration.
    ///
    /// Neither the current name nor the default icon backup is affected.
    pub fn reset_cache(&mut self) {
        self.cache = self
            .config
            .icons
            .iter()
            .filter(|(name, _)| !is_reserved(name))
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect();
        log::debug!("icon cache reset to {} configured entries", self.cache.len());
    }

    /// Stores a single icon under `name`.
    pub fn cache_icon(&mut self, name: &str, icon: Icon) {
        self.cache_icon_set(name, IconSet::from(icon));
    }

    /// Stores `icons` under `name`, replacing any previous entry.
    ///
    /// Writes to the reserved default and temporary keys are ignored.
    pub fn cache_icon_set(&mut self, name: &str, icons: impl Into<IconSet>) {
        if is_reserved(name) {
            log::debug!("ignoring write to reserved icon key {name:?}");
            return;
        }
        self.store(name, icons.into());
    }

    /// The icon set cached under `name`, if any.
    ///
    /// Reserved keys are never cached; see [`icon_set`](Self::icon_set).
    pub fn cached(&self, name: &str) -> Option<IconSet> {
        self.cache.get(name).map(IconEntry::to_icon_set)
    }

    /// Resolves `name` to an icon set.
    ///
    /// The default key resolves to the backed-up original icons, any other
    /// name to its cache entry.
    pub fn icon_set(&mut self, name: &str) -> Option<IconSet> {
        if name == DEFAULT_ICON_KEY {
            return Some(self.default_icon_set());
        }
        self.cached(name)
    }

    /// The page's original icons, keyed by `sizes`.
    pub fn default_icons(&mut self) -> &SizedIconMap {
        let head = &self.head;
        self.default_icons.get_or_insert_with(|| {
            let icons: SizedIconMap = favicon_links(head)
                .into_iter()
                .map(|(_, icon)| icon)
                .collect();
            log::debug!("backed up {} default icon(s)", icons.len());
            icons
        })
    }

    /// The page's original icons as a set, in first-seen `sizes` order.
    pub fn default_icon_set(&mut self) -> IconSet {
        self.default_icons().to_icon_set()
    }

    /// Shows the icon set called `name`, or the original icons for `None`.
    ///
    /// An unknown name falls back to the original icons. Returns whether the
    /// page's links were rewritten.
    pub fn display(&mut self, name: Option<&str>) -> bool {
        let mut name = name.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_ICON_KEY);

        let icons = match self.icon_set(name) {
            Some(icons) => icons,
            None => {
                log::warn!("no icon set named {name:?}, restoring default icons");
                name = DEFAULT_ICON_KEY;
                self.default_icon_set()
            }
        };
        self.show(name, icons)
    }

    /// Restores the page's original icons.
    pub fn set_default(&mut self) -> bool {
        self.display(None)
    }

    /// Shows a single icon. See [`display_icon_set`](Self::display_icon_set).
    pub fn display_icon(&mut self, icon: Icon, cache_key: Option<&str>) -> bool {
        self.display_icon_set(IconSet::from(icon), cache_key)
    }

    /// Shows `icons`, caching them under `cache_key` when one is given.
    ///
    /// Without a key the set is shown as a one-off and is always applied.
    /// The default key is reserved for the original icons, so a set passed
    /// under it is shown as a one-off too. An empty set leaves the page
    /// untouched.
    pub fn display_icon_set(&mut self, icons: impl Into<IconSet>, cache_key: Option<&str>) -> bool {
        let name = match cache_key.filter(|n| !n.is_empty()) {
            Some(DEFAULT_ICON_KEY) => {
                log::warn!("{DEFAULT_ICON_KEY:?} is reserved, showing icons as a one-off");
                TEMP_ICON_KEY
            }
            Some(name) => name,
            None => TEMP_ICON_KEY,
        };
        self.show(name, icons.into())
    }

    /// Generates an icon set with `renderer` and shows it.
    ///
    /// Returns `Ok(None)` without rendering when `cache_key` is already shown.
    /// A key that is already cached is shown from the cache instead of being
    /// regenerated. Without a key the result is shown as a one-off.
    pub async fn display_generated<R>(
        &mut self,
        renderer: &R,
        options: &R::Options,
        cache_key: Option<&str>,
    ) -> Result<Option<IconSet>>
    where
        R: IconRenderer + ?Sized,
    {
        let name = cache_key
            .filter(|n| !n.is_empty())
            .unwrap_or(TEMP_ICON_KEY)
            .to_string();

        if !self.is_change_required(&name) {
            log::trace!("icon set {name:?} already shown, skipping render");
            return Ok(None);
        }
        if name == DEFAULT_ICON_KEY {
            self.set_default();
            return Ok(Some(self.default_icon_set()));
        }
        if name != TEMP_ICON_KEY {
            if let Some(icons) = self.cached(&name) {
                log::debug!("reusing cached icon set {name:?}");
                self.display(Some(&name));
                return Ok(Some(icons));
            }
        }

        let defaults = self.default_icons().clone();
        let icons = renderer.generate(options, &defaults).await?;
        self.show(&name, icons.clone());
        Ok(Some(icons))
    }

    /// Draws a dot in the top-right corner of the default icon.
    ///
    /// The result is cached under [`DOT_ICON_KEY`].
    pub async fn set_dot(&mut self, options: &DotOptions) -> Result<Option<IconSet>> {
        let renderer = DotRenderer::top_right(Rc::clone(&self.loader));
        self.display_generated(&renderer, options, Some(DOT_ICON_KEY))
            .await
    }

    /// Draws `number` as a badge on the default icon.
    ///
    /// Digits 1 to 9 are cached under their decimal name; anything else shows
    /// an empty badge as a one-off.
    pub async fn set_number(&mut self, number: u32, options: &DigitOptions) -> Result<Option<IconSet>> {
        let renderer = self.digit_renderer();
        let key = (1..=9).contains(&number).then(|| number.to_string());
        self.display_generated(&renderer.digit(number), options, key.as_deref())
            .await
    }

    /// A digit renderer seeded with the configured badge colors.
    pub fn digit_renderer(&self) -> DigitBadgeRenderer {
        let mut renderer = DigitBadgeRenderer::new(Rc::clone(&self.loader));
        if let Some(color) = &self.config.color {
            renderer = renderer.with_color(color.clone());
        }
        if let Some(bg_color) = &self.config.bg_color {
            renderer = renderer.with_bg_color(bg_color.clone());
        }
        renderer
    }

    fn show(&mut self, name: &str, icons: IconSet) -> bool {
        if !self.is_change_required(name) {
            log::trace!("icon set {name:?} already shown");
            return false;
        }
        self.change_icons(name, icons)
    }

    fn is_change_required(&self, name: &str) -> bool {
        name != self.current || name == TEMP_ICON_KEY
    }

    fn store(&mut self, name: &str, icons: IconSet) {
        if !is_reserved(name) {
            self.cache.insert(name.to_string(), IconEntry::Set(icons));
        }
    }

    fn change_icons(&mut self, name: &str, icons: IconSet) -> bool {
        self.default_icons();
        self.store(name, icons.clone());
        if icons.is_empty() {
            log::debug!("icon set {name:?} is empty, leaving favicons unchanged");
            return false;
        }
        replace_icons(&mut self.head, &icons);
        log::debug!("favicon changed from {:?} to {name:?}", self.current);
        self.current = name.to_string();
        true
    }
}
