//! The library code for the `scrollmark` article generator. The architecture
//! breaks down into two halves:
//!
//! 1. Building the page: parsing the article source ([`crate::article`]),
//!    templating it ([`crate::render`]), and writing it to disk along with
//!    the browser runtime and static assets ([`crate::build`]).
//! 2. The page's interactive behaviour, modeled in Rust so it can be tested
//!    and so the initial render agrees with it: the active-section tracker
//!    ([`crate::tracker`]), the one-shot reveal animators
//!    ([`crate::reveal`]), the tables of contents ([`crate::toc`]), and the
//!    contact action ([`crate::contact`]), all mounted together by
//!    [`crate::page::ArticlePage`] against the single-threaded window model
//!    in [`crate::dom`].
//!
//! The tracker's rule is the heart of the second half: the active section is
//! the *last* section whose top has scrolled above `scroll_y +
//! header_offset`, and scrolling above every section keeps whatever was
//! active before.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod assets;
pub mod build;
pub mod config;
pub mod contact;
pub mod dom;
pub mod logging;
pub mod markdown;
pub mod page;
pub mod render;
pub mod reveal;
pub mod section;
pub mod toc;
pub mod tracker;
