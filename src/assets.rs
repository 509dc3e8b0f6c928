//! The browser runtime for rendered pages. It mirrors the behaviour of
//! [`crate::page::ArticlePage`]: the active-section tracker, the one-shot
//! reveal animators, the mobile table-of-contents panel, and the contact
//! toast. Its parameters are read from `data-*` attributes the theme
//! template fills in from the page settings.
//!
//! The script is compiled into the binary so a build never depends on files
//! outside the project directory.

/// File name of the runtime script inside the output `assets/` directory.
pub const SCRIPT_FILE: &str = "scrollmark.js";

/// The runtime script.
pub const SCRIPT: &str = include_str!("assets/scrollmark.js");

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_script_reads_page_settings() {
        for attr in &[
            "data-header-offset",
            "data-threshold",
            "data-root-margin",
            "data-once",
            "data-toast-title",
        ] {
            assert!(SCRIPT.contains(attr), "script doesn't read {}", attr);
        }
    }

    #[test]
    fn test_reveal_requires_threshold_ratio() {
        assert!(SCRIPT.contains("entry.isIntersecting && entry.intersectionRatio >= threshold"));
    }

    #[test]
    fn test_scroll_listener_survives_page_cache() {
        assert!(SCRIPT.contains(r#"addEventListener("scroll", onScroll)"#));
        assert!(!SCRIPT.contains("pagehide"));
        assert!(!SCRIPT.contains("removeEventListener"));
    }
}
