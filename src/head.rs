//! The document head boundary.
//!
//! The registry never touches a DOM directly. It talks to an [`IconHead`],
//! which exposes the `<link>` elements of a page head. [`MemoryHead`] keeps
//! them in a vector and is what tests and non-browser hosts use; the `web`
//! feature provides a `web-sys` backed implementation.

use crate::icon::{Icon, IconSet};

/// `rel` used when an icon does not specify one.
pub const DEFAULT_REL: &str = "icon";

/// Link relations treated as favicons.
pub const ICON_RELS: [&str; 4] = [
    DEFAULT_REL,
    "apple-touch-icon",
    "apple-touch-icon-precomposed",
    "mask-icon",
];

/// Read/write access to the `<link>` elements of a document head.
pub trait IconHead {
    /// Handle to one link element.
    type Link;

    /// Every link element carrying a `rel` attribute, in document order,
    /// together with its attributes.
    fn links(&self) -> Vec<(Self::Link, Icon)>;

    /// Detaches a link element from the head.
    fn remove_link(&mut self, link: Self::Link);

    /// Creates a link element with the icon's attributes and appends it.
    ///
    /// `icon.rel` is always set when called through [`replace_icons`].
    fn append_link(&mut self, icon: &Icon);
}

/// Returns the favicon links of `head`, filtered by [`ICON_RELS`].
pub fn favicon_links<H: IconHead>(head: &H) -> Vec<(H::Link, Icon)> {
    head.links()
        .into_iter()
        .filter(|(_, icon)| {
            icon.rel
                .as_deref()
                .is_some_and(|rel| ICON_RELS.contains(&rel))
        })
        .collect()
}

/// Removes every favicon link from `head` and appends `icons` in order.
///
/// Icons without a `rel` are written with [`DEFAULT_REL`].
pub fn replace_icons<H: IconHead>(head: &mut H, icons: &IconSet) {
    let existing = favicon_links(head);
    log::trace!(
        "replacing {} favicon link(s) with {}",
        existing.len(),
        icons.len()
    );
    for (link, _) in existing {
        head.remove_link(link);
    }
    for icon in icons {
        let mut icon = icon.clone();
        icon.rel.get_or_insert_with(|| DEFAULT_REL.to_string());
        head.append_link(&icon);
    }
}

/// An [`IconHead`] holding its links in memory.
///
/// Links are identified by a monotonically increasing id, so a removed and
/// re-added icon is a different element. Every removal and append counts as a
/// mutation.
#[derive(Debug, Clone, Default)]
pub struct MemoryHead {
    links: Vec<(u64, Icon)>,
    next_id: u64,
    mutations: usize,
}

impl MemoryHead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a head already containing `icons`, without counting mutations.
    pub fn with_links(icons: impl IntoIterator<Item = Icon>) -> Self {
        let mut head = Self::new();
        for icon in icons {
            head.push(icon);
        }
        head
    }

    /// All links currently in the head, favicons or not.
    pub fn icons(&self) -> impl Iterator<Item = &Icon> {
        self.links.iter().map(|(_, icon)| icon)
    }

    /// Links whose `rel` is one of [`ICON_RELS`].
    pub fn favicons(&self) -> Vec<Icon> {
        favicon_links(self).into_iter().map(|(_, icon)| icon).collect()
    }

    /// Number of removals and appends performed so far.
    pub fn mutations(&self) -> usize {
        self.mutations
    }

    fn push(&mut self, icon: Icon) {
        self.links.push((self.next_id, icon));
        self.next_id += 1;
    }
}

impl IconHead for MemoryHead {
    type Link = u64;

    fn links(&self) -> Vec<(u64, Icon)> {
        self.links
            .iter()
            .filter(|(_, icon)| icon.rel.is_some())
            .cloned()
            .collect()
    }

    fn remove_link(&mut self, link: u64) {
        let before = self.links.len();
        self.links.retain(|(id, _)| *id != link);
        if self.links.len() != before {
            self.mutations += 1;
        }
    }

    fn append_link(&mut self, icon: &Icon) {
        self.push(icon.clone());
        self.mutations += 1;
    }
}
