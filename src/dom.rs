//! A small, single-threaded model of the browser surfaces the article page
//! depends on: a [`Document`] of laid-out elements, a scrollable [`Window`],
//! event targets with RAII [`Subscription`]s, and an
//! [`IntersectionObserver`] equivalent.
//!
//! Everything here runs on one thread and every handler runs to completion
//! before the next one is invoked, so shared state is held in
//! [`Rc`]/[`RefCell`] rather than behind locks.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

type Handler<E> = Rc<RefCell<dyn FnMut(&E)>>;

struct Listeners<E> {
    next_id: u64,
    handlers: BTreeMap<u64, Handler<E>>,
}

/// A list of handlers for events of type `E`. Handlers are invoked in
/// subscription order.
pub struct EventTarget<E> {
    listeners: Rc<RefCell<Listeners<E>>>,
}

impl<E: 'static> EventTarget<E> {
    pub fn new() -> EventTarget<E> {
        EventTarget {
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                handlers: BTreeMap::new(),
            })),
        }
    }

    /// Registers `handler`. The handler stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription immediately unsubscribes the handler"]
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: FnMut(&E) + 'static,
    {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners
                .handlers
                .insert(id, Rc::new(RefCell::new(handler)));
            id
        };

        let weak: Weak<RefCell<Listeners<E>>> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().handlers.remove(&id);
            }
        })
    }

    /// Invokes every registered handler with `event`. The handler list is
    /// snapshotted first so handlers may drop subscriptions (including
    /// their own) while the dispatch is in progress.
    pub fn dispatch(&self, event: &E) {
        let snapshot: Vec<(u64, Handler<E>)> = self
            .listeners
            .borrow()
            .handlers
            .iter()
            .map(|(id, h)| (*id, h.clone()))
            .collect();

        for (id, handler) in snapshot {
            // skip handlers removed by an earlier handler in this dispatch
            if !self.listeners.borrow().handlers.contains_key(&id) {
                continue;
            }
            (&mut *handler.borrow_mut())(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().handlers.len()
    }
}

impl<E: 'static> Default for EventTarget<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps a handler registered. Dropping it (or calling
/// [`Subscription::cancel`]) deregisters the handler.
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new<F: FnOnce() + 'static>(release: F) -> Subscription {
        Subscription {
            release: Some(Box::new(release)),
        }
    }

    pub fn cancel(mut self) {
        self.release_now();
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

/// A vertical extent in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, height: f64) -> Rect {
        Rect { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Anything that can report the top offset of an element by id. Elements
/// that aren't laid out yet return `None`.
pub trait Layout {
    fn offset_top(&self, id: &str) -> Option<f64>;
}

/// The laid-out elements of a page, keyed by element id.
#[derive(Clone, Debug, Default)]
pub struct Document {
    elements: HashMap<String, Rect>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    pub fn insert(&mut self, id: &str, rect: Rect) {
        self.elements.insert(id.to_owned(), rect);
    }

    pub fn remove(&mut self, id: &str) -> Option<Rect> {
        self.elements.remove(id)
    }

    pub fn rect(&self, id: &str) -> Option<Rect> {
        self.elements.get(id).copied()
    }

    /// Stacks `ids` top to bottom starting at `start`, giving each element
    /// `height` pixels. Handy for building fixtures.
    pub fn stacked<'a, I>(ids: I, start: f64, height: f64) -> Document
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut document = Document::new();
        for (i, id) in ids.into_iter().enumerate() {
            document.insert(id, Rect::new(start + i as f64 * height, height));
        }
        document
    }
}

impl Layout for Document {
    fn offset_top(&self, id: &str) -> Option<f64> {
        self.rect(id).map(|r| r.top)
    }
}

/// Delivered to scroll listeners after the window's scroll position changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollEvent {
    pub scroll_y: f64,
}

/// The visible region of the window in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub top: f64,
    pub height: f64,
}

impl Viewport {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A scrollable browser window over a [`Document`].
pub struct Window {
    document: RefCell<Document>,
    viewport_height: f64,
    scroll_y: Cell<f64>,
    scroll: EventTarget<ScrollEvent>,
    frames: EventTarget<Viewport>,
}

impl Window {
    pub fn new(document: Document, viewport_height: f64) -> Rc<Window> {
        Rc::new(Window {
            document: RefCell::new(document),
            viewport_height,
            scroll_y: Cell::new(0.0),
            scroll: EventTarget::new(),
            frames: EventTarget::new(),
        })
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y.get()
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            top: self.scroll_y.get(),
            height: self.viewport_height,
        }
    }

    /// Read access to the document's layout.
    pub fn document(&self) -> std::cell::Ref<'_, Document> {
        self.document.borrow()
    }

    /// Mutates the document (e.g. to simulate an element mounting late) and
    /// delivers an intersection frame so observers see the new layout.
    pub fn update_document<F: FnOnce(&mut Document)>(&self, f: F) {
        f(&mut self.document.borrow_mut());
        self.frames.dispatch(&self.viewport());
    }

    pub fn scroll_events(&self) -> &EventTarget<ScrollEvent> {
        &self.scroll
    }

    /// Scrolls to `y` (clamped to zero), notifies scroll listeners, then
    /// delivers an intersection frame.
    pub fn scroll_to(&self, y: f64) {
        let y = if y.is_finite() { y.max(0.0) } else { 0.0 };
        self.scroll_y.set(y);
        self.scroll.dispatch(&ScrollEvent { scroll_y: y });
        self.frames.dispatch(&self.viewport());
    }

    /// Follows an in-page anchor (`#id`) by scrolling the element's top to
    /// the top of the viewport. Returns `false` and leaves the scroll
    /// position alone if the anchor is malformed or the element isn't laid
    /// out.
    pub fn navigate(&self, anchor: &str) -> bool {
        let top = match anchor.strip_prefix('#') {
            Some(id) if !id.is_empty() => self.document.borrow().offset_top(id),
            _ => None,
        };
        match top {
            Some(top) => {
                self.scroll_to(top);
                true
            }
            None => false,
        }
    }

    /// Number of live intersection observations against this window.
    pub fn observer_count(&self) -> usize {
        self.frames.listener_count()
    }

    /// Fraction of `id` currently inside the viewport expanded by
    /// `root_margin` pixels on each edge, and whether any of it overlaps.
    /// `None` if the element isn't laid out.
    fn intersection(&self, id: &str, root_margin: f64) -> Option<(f64, bool)> {
        let rect = self.document.borrow().rect(id)?;
        let viewport = self.viewport();
        let top = viewport.top - root_margin;
        let bottom = viewport.bottom() + root_margin;

        if rect.height <= 0.0 {
            let inside = rect.top >= top && rect.top <= bottom;
            return Some((if inside { 1.0 } else { 0.0 }, inside));
        }

        let overlap = (rect.bottom().min(bottom) - rect.top.max(top)).max(0.0);
        Some((overlap / rect.height, overlap > 0.0))
    }
}

/// Parameters for an [`IntersectionObserver`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionOptions {
    /// Minimum visible fraction of the element, in `[0, 1]`.
    pub threshold: f64,

    /// Pixels by which the viewport is grown (or shrunk, if negative) on each
    /// edge before intersecting.
    pub root_margin: f64,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        IntersectionOptions {
            threshold: 0.0,
            root_margin: 0.0,
        }
    }
}

/// Passed to an intersection callback whenever the observed element's
/// intersecting state is first reported or changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub ratio: f64,
}

/// Watches one element's intersection with a [`Window`]'s viewport.
pub struct IntersectionObserver;

impl IntersectionObserver {
    /// Starts observing `id`. `callback` is invoked immediately with the
    /// current state, then on every frame where the intersecting state flips.
    /// Elements that aren't laid out are reported only once they appear.
    #[must_use = "dropping the observation immediately disconnects it"]
    pub fn observe<F>(
        window: &Rc<Window>,
        id: &str,
        options: IntersectionOptions,
        mut callback: F,
    ) -> Observation
    where
        F: FnMut(IntersectionEntry) + 'static,
    {
        let weak = Rc::downgrade(window);
        let id = id.to_owned();
        let mut last: Option<bool> = None;
        let mut on_frame = move |_: &Viewport| {
            let window = match weak.upgrade() {
                Some(window) => window,
                None => return,
            };
            if let Some((ratio, overlaps)) = window.intersection(&id, options.root_margin)
            {
                let is_intersecting = overlaps && ratio >= options.threshold;
                if last != Some(is_intersecting) {
                    last = Some(is_intersecting);
                    callback(IntersectionEntry {
                        is_intersecting,
                        ratio,
                    });
                }
            }
        };

        // initial report, as browsers do on `observe()`
        on_frame(&window.viewport());
        Observation {
            subscription: Some(window.frames.subscribe(on_frame)),
        }
    }
}

/// A live intersection observation. Dropping it disconnects the observer.
pub struct Observation {
    subscription: Option<Subscription>,
}

impl Observation {
    pub fn disconnect(&mut self) {
        self.subscription = None;
    }

    pub fn is_connected(&self) -> bool {
        self.subscription.is_some()
    }
}
