//! Table-of-contents presentation. Both variants only read the section list
//! and the active section id; the mobile variant also owns a collapsible
//! panel that closes whenever an entry is followed.

use crate::section::Sections;

/// Classes for the highlighted entry.
pub const ACTIVE_CLASSES: &str = "text-indigo-600 font-medium";

/// Classes for every other entry.
pub const INACTIVE_CLASSES: &str = "text-slate-600";

/// One line of the table of contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub title: String,
    pub href: String,
    pub active: bool,
}

impl TocEntry {
    pub fn classes(&self) -> &'static str {
        match self.active {
            true => ACTIVE_CLASSES,
            false => INACTIVE_CLASSES,
        }
    }
}

/// Builds one entry per section, highlighting the entry whose id equals
/// `active`.
pub fn entries(sections: &Sections, active: &str) -> Vec<TocEntry> {
    sections
        .iter()
        .map(|s| TocEntry {
            id: s.id.clone(),
            title: s.title.clone(),
            href: s.anchor(),
            active: s.id == active,
        })
        .collect()
}

/// The result of clicking an entry: the browser follows `anchor`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub anchor: String,
}

/// The desktop sidebar. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopToc;

impl DesktopToc {
    pub fn entries(&self, sections: &Sections, active: &str) -> Vec<TocEntry> {
        entries(sections, active)
    }

    /// Returns the navigation for clicking `id`, or `None` for an unknown
    /// section.
    pub fn click(&self, sections: &Sections, id: &str) -> Option<Navigation> {
        navigation(sections, id)
    }
}

/// The collapsible mobile panel. Starts closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MobileToc {
    open: bool,
}

impl MobileToc {
    pub fn new() -> MobileToc {
        MobileToc::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Entries are only shown while the panel is open.
    pub fn entries(&self, sections: &Sections, active: &str) -> Vec<TocEntry> {
        match self.open {
            true => entries(sections, active),
            false => Vec::new(),
        }
    }

    /// Follows the entry for `id` and closes the panel.
    pub fn click(&mut self, sections: &Sections, id: &str) -> Option<Navigation> {
        let navigation = navigation(sections, id)?;
        self.open = false;
        Some(navigation)
    }
}

fn navigation(sections: &Sections, id: &str) -> Option<Navigation> {
    sections
        .position(id)
        .and_then(|i| sections.get(i))
        .map(|s| Navigation { anchor: s.anchor() })
}
