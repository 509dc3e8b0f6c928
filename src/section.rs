//! Defines the [`Section`] descriptor, the validated [`Sections`] list, and
//! the [`ParagraphKind`] classification used by templates to pick markup for
//! each paragraph.

use std::collections::HashSet;
use std::fmt;

/// One titled block of article content. The `id` is the anchor target
/// (`#{id}`) and the key used by the active-section tracker, so it must be
/// stable and unique within an article.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub content: Vec<String>,
}

impl Section {
    pub fn new<I, S>(id: &str, title: &str, content: I) -> Section
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Section {
            id: id.to_owned(),
            title: title.to_owned(),
            content: content.into_iter().map(Into::into).collect(),
        }
    }

    /// The in-page anchor for this section, e.g. `#intro`.
    pub fn anchor(&self) -> String {
        format!("#{}", self.id)
    }
}

/// An ordered, non-empty list of [`Section`]s with unique, non-empty ids.
/// Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sections(Vec<Section>);

impl Sections {
    /// Validates and wraps `sections`.
    pub fn new(sections: Vec<Section>) -> Result<Sections> {
        if sections.is_empty() {
            return Err(Error::Empty);
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for section in sections.iter() {
            if section.id.is_empty() {
                return Err(Error::EmptyId(section.title.clone()));
            }
            if !seen.insert(&section.id) {
                return Err(Error::DuplicateId(section.id.clone()));
            }
        }

        Ok(Sections(sections))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.0.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&Section> {
        self.0.get(index)
    }

    /// The first section. Always present since [`Sections`] can't be empty.
    pub fn first(&self) -> &Section {
        &self.0[0]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.0.iter().position(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Total number of whitespace-separated words across all titles and
    /// paragraphs.
    pub fn word_count(&self) -> usize {
        self.0
            .iter()
            .map(|s| {
                s.title.split_whitespace().count()
                    + s.content
                        .iter()
                        .map(|p| p.split_whitespace().count())
                        .sum::<usize>()
            })
            .sum()
    }
}

impl AsRef<[Section]> for Sections {
    fn as_ref(&self) -> &[Section] {
        &self.0
    }
}

const BULLET: &str = "•";
const SUBHEADING_PREFIX: &str = "Choose";
const CALLOUT_PREFIXES: [&str; 2] = ["Example:", "Real-world example:"];

/// How a paragraph should be presented. Derived from the paragraph's
/// leading text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParagraphKind {
    /// A single bullet-list item (`• text`).
    Bullet,

    /// A minor heading inside a section (`Choose ...`).
    Subheading,

    /// A highlighted example block (`Example: ...`).
    Callout,

    /// Regular body text.
    Text,
}

impl ParagraphKind {
    /// Classifies `paragraph` and returns its kind along with the text that
    /// should be rendered. Bullets lose their marker and the space after it;
    /// every other kind keeps its text verbatim.
    pub fn classify(paragraph: &str) -> (ParagraphKind, &str) {
        if let Some(rest) = paragraph.strip_prefix(BULLET) {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            return (ParagraphKind::Bullet, rest);
        }
        if paragraph.starts_with(SUBHEADING_PREFIX) {
            return (ParagraphKind::Subheading, paragraph);
        }
        if CALLOUT_PREFIXES.iter().any(|p| paragraph.starts_with(p)) {
            return (ParagraphKind::Callout, paragraph);
        }
        (ParagraphKind::Text, paragraph)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParagraphKind::Bullet => "bullet",
            ParagraphKind::Subheading => "subheading",
            ParagraphKind::Callout => "callout",
            ParagraphKind::Text => "text",
        }
    }
}

/// The result of a fallible [`Sections`] operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an invalid section list.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Returned when an article has no sections.
    Empty,

    /// Returned when a section has an empty id. Holds the section title.
    EmptyId(String),

    /// Returned when two sections share an id.
    DuplicateId(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Empty => write!(f, "article must contain at least one section"),
            Error::EmptyId(title) => {
                write!(f, "section `{}` has an empty id", title)
            }
            Error::DuplicateId(id) => write!(f, "duplicate section id `{}`", id),
        }
    }
}

impl std::error::Error for Error {}
