//! The visibility-triggered animator. Each article section gets a
//! [`RevealAnimator`] that watches the section's element and flips a
//! visible flag once enough of it enters the viewport. Templates gate a
//! fade/slide-in transition on that flag, delayed by the section's index
//! for a staggered cascade.

use crate::dom::{IntersectionObserver, IntersectionOptions, Observation, Window};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Default minimum visible fraction before a section is revealed.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Default delay added per section index.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);

/// Default length of the reveal transition.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(700);

/// Classes applied while a section is still hidden.
pub const HIDDEN_CLASSES: &str = "opacity-0 translate-y-10";

/// Classes applied once a section is revealed.
pub const VISIBLE_CLASSES: &str = "opacity-100 translate-y-0";

/// How a [`RevealAnimator`] observes its element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealOptions {
    pub threshold: f64,
    pub root_margin: f64,

    /// When set, the flag latches: the first reveal stops observation and
    /// the section never hides again. Otherwise the flag follows the
    /// element's intersecting state.
    pub once: bool,
}

impl Default for RevealOptions {
    fn default() -> Self {
        RevealOptions {
            threshold: DEFAULT_THRESHOLD,
            root_margin: 0.0,
            once: true,
        }
    }
}

impl From<RevealOptions> for IntersectionOptions {
    fn from(options: RevealOptions) -> IntersectionOptions {
        IntersectionOptions {
            threshold: options.threshold,
            root_margin: options.root_margin,
        }
    }
}

/// The transition parameters shared by every section on a page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub stagger: Duration,
    pub duration: Duration,
}

impl Default for Transition {
    fn default() -> Self {
        Transition {
            stagger: DEFAULT_STAGGER,
            duration: DEFAULT_DURATION,
        }
    }
}

impl Transition {
    /// The delay for the section at `index`: `index * stagger`.
    pub fn delay(&self, index: usize) -> Duration {
        self.stagger * index as u32
    }

    /// Inline style for the section at `index`.
    pub fn style(&self, index: usize) -> String {
        format!(
            "transition-duration: {}ms; transition-delay: {}ms",
            self.duration.as_millis(),
            self.delay(index).as_millis()
        )
    }
}

/// The classes for a section whose visible flag is `visible`.
pub fn classes(visible: bool) -> &'static str {
    match visible {
        true => VISIBLE_CLASSES,
        false => HIDDEN_CLASSES,
    }
}

/// Watches one section element and exposes its visible flag.
pub struct RevealAnimator {
    id: String,
    index: usize,
    visible: Rc<Cell<bool>>,
    observation: Rc<RefCell<Option<Observation>>>,
}

impl RevealAnimator {
    /// Begins observing the element `id` in `window`.
    pub fn mount(
        window: &Rc<Window>,
        id: &str,
        index: usize,
        options: RevealOptions,
    ) -> RevealAnimator {
        let visible = Rc::new(Cell::new(false));
        let observation: Rc<RefCell<Option<Observation>>> = Rc::new(RefCell::new(None));

        // Set when a once-mode reveal fires during the initial report, before
        // the observation has been stored.
        let latched_early = Rc::new(Cell::new(false));

        let mut new_observation = {
            let visible = visible.clone();
            let slot = Rc::downgrade(&observation);
            let latched_early = latched_early.clone();
            let section = id.to_owned();
            IntersectionObserver::observe(window, id, options.into(), move |entry| {
                if !options.once {
                    visible.set(entry.is_intersecting);
                    return;
                }
                if entry.is_intersecting && !visible.get() {
                    debug!(section = %section, ratio = entry.ratio, "revealing section");
                    visible.set(true);
                    match slot.upgrade().as_ref().map(|s| s.try_borrow_mut()) {
                        Some(Ok(mut stored)) => match stored.as_mut() {
                            Some(o) => o.disconnect(),
                            None => latched_early.set(true),
                        },
                        _ => latched_early.set(true),
                    }
                }
            })
        };

        if latched_early.get() {
            new_observation.disconnect();
        }
        *observation.borrow_mut() = Some(new_observation);

        RevealAnimator {
            id: id.to_owned(),
            index,
            visible,
            observation,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Whether the animator is still receiving intersection updates.
    pub fn is_observing(&self) -> bool {
        self.observation
            .borrow()
            .as_ref()
            .map_or(false, Observation::is_connected)
    }

    pub fn classes(&self) -> &'static str {
        classes(self.is_visible())
    }

    /// Tears down the observation whether or not the section was ever
    /// revealed.
    pub fn unmount(self) {
        if let Some(mut o) = self.observation.borrow_mut().take() {
            o.disconnect();
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dom::Document;
    use proptest::prelude::*;

    // a: 0..1000, b: 1000..2000, c: 2000..3000
    fn window() -> Rc<Window> {
        Window::new(Document::stacked(vec!["a", "b", "c"], 0.0, 1000.0), 500.0)
    }

    #[test]
    fn test_visible_on_mount_stops_observing() {
        let window = window();
        let animator = RevealAnimator::mount(&window, "a", 0, RevealOptions::default());
        assert!(animator.is_visible());
        assert!(!animator.is_observing());
        assert_eq!(0, window.observer_count());
    }

    #[test]
    fn test_reveal_latches_once() {
        let window = window();
        let animator = RevealAnimator::mount(&window, "b", 1, RevealOptions::default());
        assert!(!animator.is_visible());
        assert!(animator.is_observing());
        assert_eq!(HIDDEN_CLASSES, animator.classes());

        // 100px of b (10%) visible
        window.scroll_to(600.0);
        assert!(animator.is_visible());
        assert!(!animator.is_observing());
        assert_eq!(0, window.observer_count());

        window.scroll_to(0.0);
        assert!(animator.is_visible());
        assert_eq!(VISIBLE_CLASSES, animator.classes());
    }

    #[test]
    fn test_below_threshold_stays_hidden() {
        let window = window();
        let animator = RevealAnimator::mount(&window, "b", 1, RevealOptions::default());
        window.scroll_to(599.0);
        assert!(!animator.is_visible());
    }

    #[test]
    fn test_repeating_mode_follows_intersection() {
        let window = window();
        let animator = RevealAnimator::mount(
            &window,
            "c",
            2,
            RevealOptions {
                once: false,
                ..RevealOptions::default()
            },
        );
        window.scroll_to(2000.0);
        assert!(animator.is_visible());
        window.scroll_to(0.0);
        assert!(!animator.is_visible());
        assert!(animator.is_observing());
    }

    #[test]
    fn test_unmount_releases_unrevealed_observation() {
        let window = window();
        let animator = RevealAnimator::mount(&window, "c", 2, RevealOptions::default());
        assert_eq!(1, window.observer_count());
        animator.unmount();
        assert_eq!(0, window.observer_count());
    }

    #[test]
    fn test_drop_releases_observation() {
        let window = window();
        {
            let _animator = RevealAnimator::mount(&window, "c", 2, RevealOptions::default());
            assert_eq!(1, window.observer_count());
        }
        assert_eq!(0, window.observer_count());
    }

    #[test]
    fn test_transition_stagger() {
        let transition = Transition::default();
        assert_eq!(Duration::from_millis(0), transition.delay(0));
        assert_eq!(Duration::from_millis(300), transition.delay(3));
        assert_eq!(
            "transition-duration: 700ms; transition-delay: 200ms",
            transition.style(2)
        );
    }

    proptest! {
        #[test]
        fn prop_once_flag_is_monotonic(
            scrolls in proptest::collection::vec(0.0f64..4_000.0, 1..40),
        ) {
            let window = window();
            let animator = RevealAnimator::mount(&window, "c", 2, RevealOptions::default());
            let mut flips = 0;
            let mut previous = animator.is_visible();
            for y in scrolls {
                window.scroll_to(y);
                let now = animator.is_visible();
                prop_assert!(!(previous && !now));
                if now != previous {
                    flips += 1;
                }
                previous = now;
            }
            prop_assert!(flips <= 1);
        }
    }
}
