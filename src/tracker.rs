//! The active-section tracker. On every scroll event it decides which
//! section the reader is "in" so the table of contents can highlight it.
//!
//! The rule is "last section whose top has scrolled past the header line":
//! walking from the last section to the first, the first section whose top
//! offset is at or above `scroll_y + header_offset` wins. If nothing matches
//! (the reader is above every section) the previous choice is kept. This is
//! deliberately not a nearest-section heuristic.

use crate::dom::{Layout, Subscription, Window};
use crate::section::Sections;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::trace;

/// Pixels added to the scroll position to compensate for the sticky header.
pub const DEFAULT_HEADER_OFFSET: f64 = 200.0;

/// Returns the index of the last id in `ids` whose element top is at or
/// above `scroll_y + header_offset`. Ids whose element isn't laid out are
/// skipped.
pub fn select_active<'a, I>(
    ids: I,
    scroll_y: f64,
    header_offset: f64,
    layout: &dyn Layout,
) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
{
    let line = scroll_y + header_offset;
    ids.into_iter()
        .enumerate()
        .rev()
        .find(|(_, id)| matches!(layout.offset_top(id), Some(top) if top <= line))
        .map(|(i, _)| i)
}

/// Holds the active section for one page. The active section is stored as
/// an index into the page's section ids, so it is always a declared id.
#[derive(Clone, Debug)]
pub struct ActiveSectionTracker {
    ids: Vec<String>,
    header_offset: f64,
    active: usize,
}

impl ActiveSectionTracker {
    /// Creates a tracker whose active section is the first section.
    pub fn new(sections: &Sections, header_offset: f64) -> ActiveSectionTracker {
        ActiveSectionTracker {
            ids: sections.ids().map(str::to_owned).collect(),
            header_offset,
            active: 0,
        }
    }

    pub fn active(&self) -> &str {
        &self.ids[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn header_offset(&self) -> f64 {
        self.header_offset
    }

    /// Recomputes the active section for `scroll_y`. Returns `true` if the
    /// active section changed.
    pub fn update(&mut self, scroll_y: f64, layout: &dyn Layout) -> bool {
        match select_active(
            self.ids.iter().map(String::as_str),
            scroll_y,
            self.header_offset,
            layout,
        ) {
            Some(i) if i != self.active => {
                trace!(from = %self.ids[self.active], to = %self.ids[i], scroll_y, "active section changed");
                self.active = i;
                true
            }
            _ => false,
        }
    }

    /// Evaluates the current scroll position, then subscribes to the
    /// window's scroll events. The listener is removed when the returned
    /// [`MountedTracker`] is dropped or unmounted.
    pub fn mount(mut self, window: &Rc<Window>) -> MountedTracker {
        self.update(window.scroll_y(), &*window.document());
        let state = Rc::new(RefCell::new(self));

        let subscription = {
            let state = state.clone();
            let weak = Rc::downgrade(window);
            window.scroll_events().subscribe(move |event| {
                if let Some(window) = weak.upgrade() {
                    state
                        .borrow_mut()
                        .update(event.scroll_y, &*window.document());
                }
            })
        };

        MountedTracker {
            state,
            subscription,
        }
    }
}

/// An [`ActiveSectionTracker`] listening to a window's scroll events.
pub struct MountedTracker {
    state: Rc<RefCell<ActiveSectionTracker>>,
    subscription: Subscription,
}

impl MountedTracker {
    pub fn active(&self) -> String {
        self.state.borrow().active().to_owned()
    }

    pub fn active_index(&self) -> usize {
        self.state.borrow().active_index()
    }

    /// Removes the scroll listener and hands back the tracker's final state.
    pub fn unmount(self) -> ActiveSectionTracker {
        self.subscription.cancel();
        let tracker = self.state.borrow().clone();
        tracker
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::{Document, Rect};
    use crate::section::Section;
    use proptest::prelude::*;

    fn sections(ids: &[&str]) -> Sections {
        Sections::new(
            ids.iter()
                .map(|id| Section::new(id, &id.to_uppercase(), vec!["text"]))
                .collect(),
        )
        .unwrap()
    }

    // A at 300, B at 1300, C at 2300
    fn layout() -> Document {
        Document::stacked(vec!["A", "B", "C"], 300.0, 1000.0)
    }

    #[test]
    fn test_starts_on_first_section() {
        let tracker = ActiveSectionTracker::new(&sections(&["A", "B", "C"]), 200.0);
        assert_eq!("A", tracker.active());
    }

    #[test]
    fn test_last_match_wins() {
        let mut tracker = ActiveSectionTracker::new(&sections(&["A", "B", "C"]), 200.0);
        assert!(tracker.update(5000.0, &layout()));
        assert_eq!("C", tracker.active());
    }

    #[test]
    fn test_above_all_sections_keeps_previous() {
        let mut tracker = ActiveSectionTracker::new(&sections(&["A", "B", "C"]), 200.0);
        assert!(!tracker.update(0.0, &layout()));
        assert_eq!("A", tracker.active());

        tracker.update(1500.0, &layout());
        assert_eq!("B", tracker.active());

        // a layout where nothing matches leaves B in place
        assert!(!tracker.update(1500.0, &Document::new()));
        assert_eq!("B", tracker.active());
    }

    #[test]
    fn test_boundary() {
        let mut tracker = ActiveSectionTracker::new(&sections(&["A", "B", "C"]), 200.0);
        tracker.update(1100.0, &layout());
        assert_eq!("B", tracker.active());
        tracker.update(1099.0, &layout());
        assert_eq!("A", tracker.active());
    }

    #[test]
    fn test_missing_elements_are_skipped() {
        let mut document = layout();
        document.remove("C");
        let mut tracker = ActiveSectionTracker::new(&sections(&["A", "B", "C"]), 200.0);
        tracker.update(10_000.0, &document);
        assert_eq!("B", tracker.active());
    }

    #[test]
    fn test_out_of_order_layout_uses_backward_scan() {
        // C sits above B; the backward scan still prefers C whenever it has
        // been passed.
        let mut document = layout();
        document.insert("C", Rect::new(500.0, 100.0));
        let mut tracker = ActiveSectionTracker::new(&sections(&["A", "B", "C"]), 200.0);
        tracker.update(2000.0, &document);
        assert_eq!("C", tracker.active());
    }

    #[test]
    fn test_mount_tracks_scroll_until_unmounted() {
        let window = Window::new(layout(), 800.0);
        window.scroll_to(1500.0);

        let mounted = ActiveSectionTracker::new(&sections(&["A", "B", "C"]), 200.0).mount(&window);
        assert_eq!("B", mounted.active());
        assert_eq!(1, window.scroll_events().listener_count());

        window.scroll_to(2200.0);
        assert_eq!("C", mounted.active());

        let tracker = mounted.unmount();
        assert_eq!(0, window.scroll_events().listener_count());
        window.scroll_to(0.0);
        assert_eq!("C", tracker.active());
    }

    proptest! {
        #[test]
        fn prop_active_is_declared(
            offsets in proptest::collection::vec(0.0f64..10_000.0, 1..8),
            scrolls in proptest::collection::vec(-500.0f64..12_000.0, 1..20),
        ) {
            let ids: Vec<String> = (0..offsets.len()).map(|i| format!("s{}", i)).collect();
            let sections = Sections::new(
                ids.iter().map(|id| Section::new(id, id, vec!["p"])).collect(),
            ).unwrap();
            let mut document = Document::new();
            for (id, top) in ids.iter().zip(offsets.iter()) {
                document.insert(id, Rect::new(*top, 10.0));
            }

            let mut tracker = ActiveSectionTracker::new(&sections, DEFAULT_HEADER_OFFSET);
            for scroll in scrolls {
                tracker.update(scroll, &document);
                prop_assert!(sections.contains(tracker.active()));
            }
        }

        #[test]
        fn prop_threshold_selects_section(
            heights in proptest::collection::vec(1u32..2_000, 2..8),
            start in 0u32..1_000,
        ) {
            let ids: Vec<String> = (0..heights.len()).map(|i| format!("s{}", i)).collect();
            let sections = Sections::new(
                ids.iter().map(|id| Section::new(id, id, vec!["p"])).collect(),
            ).unwrap();
            let mut document = Document::new();
            let mut top = start as f64;
            for (id, height) in ids.iter().zip(heights.iter()) {
                document.insert(id, Rect::new(top, *height as f64));
                top += *height as f64;
            }

            for k in 1..ids.len() {
                let section_top = document.offset_top(&ids[k]).unwrap();
                let mut tracker = ActiveSectionTracker::new(&sections, DEFAULT_HEADER_OFFSET);

                tracker.update(section_top - DEFAULT_HEADER_OFFSET, &document);
                prop_assert_eq!(ids[k].as_str(), tracker.active());

                tracker.update(section_top - DEFAULT_HEADER_OFFSET - 1.0, &document);
                prop_assert_eq!(ids[k - 1].as_str(), tracker.active());
            }
        }
    }
}
