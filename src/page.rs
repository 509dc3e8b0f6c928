//! Wires the tracker, the per-section animators, both tables of contents,
//! and the contact action into one mounted article page.

use crate::contact::{ContactAction, MailLauncher, Notifier};
use crate::dom::Window;
use crate::reveal::{RevealAnimator, RevealOptions, Transition};
use crate::section::Sections;
use crate::toc::{DesktopToc, MobileToc, TocEntry};
use crate::tracker::{ActiveSectionTracker, MountedTracker, DEFAULT_HEADER_OFFSET};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info};

/// Behavioural knobs for an article page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSettings {
    /// Sticky-header compensation for the active-section tracker.
    pub header_offset: f64,
    pub reveal: RevealOptions,
    pub transition: Transition,
}

impl Default for PageSettings {
    fn default() -> Self {
        PageSettings {
            header_offset: DEFAULT_HEADER_OFFSET,
            reveal: RevealOptions::default(),
            transition: Transition::default(),
        }
    }
}

impl PageSettings {
    pub fn validate(&self) -> Result<(), InvalidSettingError> {
        if !self.header_offset.is_finite() || self.header_offset < 0.0 {
            return Err(InvalidSettingError::new(
                "header_offset",
                "must be a non-negative number of pixels",
            ));
        }
        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return Err(InvalidSettingError::new(
                "reveal.threshold",
                "must be between 0 and 1",
            ));
        }
        if !self.reveal.root_margin.is_finite() {
            return Err(InvalidSettingError::new(
                "reveal.root_margin",
                "must be a finite number of pixels",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct InvalidSettingError {
    pub setting: &'static str,
    pub reason: &'static str,
}

impl InvalidSettingError {
    fn new(setting: &'static str, reason: &'static str) -> InvalidSettingError {
        InvalidSettingError { setting, reason }
    }
}

impl fmt::Display for InvalidSettingError {
    /// Displays an [`InvalidSettingError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid setting `{}`: {}", self.setting, self.reason)
    }
}

impl std::error::Error for InvalidSettingError {}

/// A mounted article page. Every listener and observer it registers on the
/// window is released when the page is unmounted or dropped.
pub struct ArticlePage {
    sections: Sections,
    window: Rc<Window>,
    tracker: MountedTracker,
    animators: Vec<RevealAnimator>,
    desktop_toc: DesktopToc,
    mobile_toc: MobileToc,
    contact: Option<ContactAction>,
}

impl ArticlePage {
    pub fn mount(
        sections: Sections,
        window: &Rc<Window>,
        settings: &PageSettings,
        contact: Option<ContactAction>,
    ) -> ArticlePage {
        let tracker = ActiveSectionTracker::new(&sections, settings.header_offset).mount(window);
        let animators = sections
            .iter()
            .enumerate()
            .map(|(i, s)| RevealAnimator::mount(window, &s.id, i, settings.reveal))
            .collect();
        info!(sections = sections.len(), "mounted article page");

        ArticlePage {
            sections,
            window: window.clone(),
            tracker,
            animators,
            desktop_toc: DesktopToc,
            mobile_toc: MobileToc::new(),
            contact,
        }
    }

    pub fn sections(&self) -> &Sections {
        &self.sections
    }

    pub fn active_section(&self) -> String {
        self.tracker.active()
    }

    /// `None` if no section has id `id`.
    pub fn is_revealed(&self, id: &str) -> Option<bool> {
        self.animator(id).map(RevealAnimator::is_visible)
    }

    pub fn section_classes(&self, id: &str) -> Option<&'static str> {
        self.animator(id).map(RevealAnimator::classes)
    }

    fn animator(&self, id: &str) -> Option<&RevealAnimator> {
        self.animators.iter().find(|a| a.id() == id)
    }

    pub fn desktop_toc(&self) -> Vec<TocEntry> {
        self.desktop_toc
            .entries(&self.sections, &self.tracker.active())
    }

    pub fn mobile_toc(&self) -> Vec<TocEntry> {
        self.mobile_toc.entries(&self.sections, &self.tracker.active())
    }

    pub fn is_mobile_toc_open(&self) -> bool {
        self.mobile_toc.is_open()
    }

    pub fn toggle_mobile_toc(&mut self) {
        self.mobile_toc.toggle();
    }

    /// Follows the desktop entry for `id`. Returns `false` if there is no
    /// such section or it isn't laid out.
    pub fn click_desktop_entry(&mut self, id: &str) -> bool {
        match self.desktop_toc.click(&self.sections, id) {
            Some(navigation) => self.window.navigate(&navigation.anchor),
            None => false,
        }
    }

    /// Follows the mobile entry for `id`, closing the panel.
    pub fn click_mobile_entry(&mut self, id: &str) -> bool {
        match self.mobile_toc.click(&self.sections, id) {
            Some(navigation) => {
                debug!(anchor = %navigation.anchor, "following mobile toc entry");
                self.window.navigate(&navigation.anchor)
            }
            None => false,
        }
    }

    /// Returns `false` if the page has no contact action.
    pub fn activate_contact(
        &mut self,
        launcher: &mut dyn MailLauncher,
        notifier: &mut dyn Notifier,
    ) -> bool {
        match self.contact.as_mut() {
            Some(contact) => {
                contact.activate(launcher, notifier);
                true
            }
            None => false,
        }
    }

    /// Releases the scroll listener and every intersection observer.
    pub fn unmount(self) {
        let ArticlePage {
            tracker, animators, ..
        } = self;
        tracker.unmount();
        for animator in animators {
            animator.unmount();
        }
        info!("unmounted article page");
    }
}
