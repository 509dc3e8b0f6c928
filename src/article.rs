//! Defines the [`Article`] type and the logic for parsing it from a source
//! file. An article source file is structured as follows:
//!
//! 1. Initial frontmatter fence (`---`)
//! 2. YAML frontmatter (see [`Frontmatter`])
//! 3. Terminal frontmatter fence (`---`)
//! 4. Sections, each introduced by a `## Title` line. An explicit id may be
//!    given as `## Title {#id}`; otherwise the slugified title is used.
//!    Paragraphs within a section are separated by blank lines.
//!
//! For example:
//!
//! ```md
//! ---
//! Title: Fine-tuning vs Training from Scratch
//! Summary: How to choose.
//! Category: AI & Machine Learning
//! Date: 2025-04-01
//! Author:
//!   Name: Jane Doe
//!   Email: jane@example.org
//! ---
//! ## Introduction {#intro}
//!
//! First paragraph.
//!
//! Second paragraph.
//! ```

use crate::contact::{Email, InvalidEmailError};
use crate::section::{self, Section, Sections};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::Path;

/// Reading speed used to estimate `read_minutes` when the frontmatter omits
/// `ReadTime`.
pub const WORDS_PER_MINUTE: usize = 225;

const FENCE: &str = "---";
const SECTION_PREFIX: &str = "## ";

/// The article's author, shown in the hero and the bio block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub url: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub email: Option<Email>,
    pub avatar: Option<String>,
}

/// A parsed article.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub category: Option<String>,
    pub date: NaiveDate,
    pub read_minutes: usize,
    pub author: Author,
    pub sections: Sections,
}

impl Article {
    /// Reads and parses the article at `path`. Errors are annotated with the
    /// path.
    pub fn from_file(path: &Path) -> Result<Article> {
        let parse = || -> Result<Article> {
            use std::io::Read;
            let mut contents = String::new();
            File::open(path)?.read_to_string(&mut contents)?;
            Article::parse(&contents)
        };
        parse().map_err(|e| {
            Error::Annotated(
                format!("parsing article `{}`", path.display()),
                Box::new(e),
            )
        })
    }

    /// Parses an article from its source text.
    pub fn parse(input: &str) -> Result<Article> {
        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;
        let sections = Sections::new(parse_sections(&input[body_start..])?)?;

        let date = NaiveDate::parse_from_str(frontmatter.date.trim(), "%Y-%m-%d")
            .map_err(|e| Error::InvalidDate(frontmatter.date.clone(), e))?;

        let read_minutes = match frontmatter.read_time {
            Some(minutes) => minutes,
            None => estimate_read_minutes(sections.word_count()),
        };

        let author = frontmatter.author;
        Ok(Article {
            title: frontmatter.title,
            summary: frontmatter.summary,
            category: frontmatter.category,
            date,
            read_minutes,
            author: Author {
                name: author.name,
                url: author.url,
                role: author.role,
                bio: author.bio,
                email: match author.email {
                    Some(email) => Some(Email::parse(&email)?),
                    None => None,
                },
                avatar: author.avatar,
            },
            sections,
        })
    }
}

/// `ceil(words / WORDS_PER_MINUTE)`, at least one minute.
pub fn estimate_read_minutes(words: usize) -> usize {
    ((words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE).max(1)
}

fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    // the closing fence must be a line of its own; `---` inside a value is
    // an em dash under smart punctuation
    let mut search = FENCE.len();
    while let Some(offset) = input[search..].find("\n---") {
        let yaml_stop = search + offset + 1;
        let body_start = yaml_stop + FENCE.len();
        let rest = &input[body_start..];
        if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") {
            return Ok((FENCE.len(), yaml_stop, body_start));
        }
        search = body_start;
    }
    Err(Error::FrontmatterMissingEndFence)
}

/// Splits `## Title {#id}` into the title and the explicit id, if any.
fn parse_heading(heading: &str) -> (String, Option<String>) {
    let heading = heading.trim();
    if heading.ends_with('}') {
        if let Some(start) = heading.rfind("{#") {
            let id = heading[start + 2..heading.len() - 1].trim();
            let title = heading[..start].trim();
            if !id.is_empty() && !title.is_empty() {
                return (title.to_owned(), Some(id.to_owned()));
            }
        }
    }
    (heading.to_owned(), None)
}

fn parse_sections(body: &str) -> Result<Vec<Section>> {
    let mut sections: Vec<Section> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    fn flush(sections: &mut Vec<Section>, paragraph: &mut Vec<&str>) {
        if paragraph.is_empty() {
            return;
        }
        // callers only collect lines once a section has started
        if let Some(section) = sections.last_mut() {
            section.content.push(paragraph.join(" "));
        }
        paragraph.clear();
    }

    for (i, line) in body.lines().enumerate() {
        if let Some(heading) = line.strip_prefix(SECTION_PREFIX) {
            flush(&mut sections, &mut paragraph);
            let (title, id) = parse_heading(heading);
            let id = id.unwrap_or_else(|| slug::slugify(&title));
            sections.push(Section {
                id,
                title,
                content: Vec::new(),
            });
            continue;
        }

        let line = line.trim();
        if line.is_empty() {
            flush(&mut sections, &mut paragraph);
            continue;
        }
        if sections.is_empty() {
            return Err(Error::ContentBeforeFirstSection(i + 1));
        }
        paragraph.push(line);
    }
    flush(&mut sections, &mut paragraph);

    Ok(sections)
}

#[derive(Deserialize)]
struct AuthorFrontmatter {
    #[serde(rename = "Name")]
    name: String,

    #[serde(default, rename = "Url")]
    url: Option<String>,

    #[serde(default, rename = "Role")]
    role: Option<String>,

    #[serde(default, rename = "Bio")]
    bio: Option<String>,

    #[serde(default, rename = "Email")]
    email: Option<String>,

    #[serde(default, rename = "Avatar")]
    avatar: Option<String>,
}

/// The YAML frontmatter of an article source file.
#[derive(Deserialize)]
struct Frontmatter {
    #[serde(rename = "Title")]
    title: String,

    #[serde(default, rename = "Summary")]
    summary: String,

    #[serde(default, rename = "Category")]
    category: Option<String>,

    /// `%Y-%m-%d`.
    #[serde(rename = "Date")]
    date: String,

    /// Minutes. Estimated from the word count when absent.
    #[serde(default, rename = "ReadTime")]
    read_time: Option<usize>,

    #[serde(rename = "Author")]
    author: AuthorFrontmatter,
}

/// Represents the result of an [`Article`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing an [`Article`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when the starting fence was found but the ending one was
    /// missing.
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the `Date` field isn't `%Y-%m-%d`.
    InvalidDate(String, chrono::ParseError),

    /// Returned when the author's email can't be used in a `mailto:` link.
    InvalidEmail(InvalidEmailError),

    /// Returned when non-blank text appears before the first `## ` heading.
    /// Holds the 1-based line number within the body.
    ContentBeforeFirstSection(usize),

    /// Returned when the sections are empty or have bad ids.
    Sections(section::Error),

    /// Returned for I/O errors reading the source file.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Article must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate(date, err) => {
                write!(f, "invalid date `{}`: {}", date, err)
            }
            Error::InvalidEmail(err) => err.fmt(f),
            Error::ContentBeforeFirstSection(line) => write!(
                f,
                "line {} of the body appears before the first `## ` section heading",
                line
            ),
            Error::Sections(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate(_, err) => Some(err),
            Error::InvalidEmail(err) => Some(err),
            Error::ContentBeforeFirstSection(_) => None,
            Error::Sections(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<InvalidEmailError> for Error {
    fn from(err: InvalidEmailError) -> Error {
        Error::InvalidEmail(err)
    }
}

impl From<section::Error> for Error {
    fn from(err: section::Error) -> Error {
        Error::Sections(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SOURCE: &str = "---
Title: The Art of AI Refinement
Summary: Fine-tuning vs training from scratch.
Category: AI & Machine Learning
Date: 2025-04-01
Author:
  Name: Jane Doe
  Role: Researcher
  Email: jane@example.org
---
## Introduction to the World of AI {#intro}

Artificial Intelligence has revolutionized
how we interact with technology.

The field has grown.

## What is Fine-tuning?

Fine-tuning adapts a pre-trained model.
";

    #[test]
    fn test_parse_article() -> Result<()> {
        let article = Article::parse(SOURCE)?;
        assert_eq!("The Art of AI Refinement", article.title);
        assert_eq!(Some(String::from("AI & Machine Learning")), article.category);
        assert_eq!(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(), article.date);
        assert_eq!(1, article.read_minutes);
        assert_eq!(
            Some("jane@example.org"),
            article.author.email.as_ref().map(Email::as_str)
        );
        assert_eq!(None, article.author.url);

        let sections: Vec<&Section> = article.sections.iter().collect();
        assert_eq!(2, sections.len());
        assert_eq!("intro", sections[0].id);
        assert_eq!("Introduction to the World of AI", sections[0].title);
        assert_eq!(
            vec![
                "Artificial Intelligence has revolutionized how we interact with technology.",
                "The field has grown.",
            ],
            sections[0].content
        );
        assert_eq!("what-is-fine-tuning", sections[1].id);
        Ok(())
    }

    #[test]
    fn test_explicit_read_time() -> Result<()> {
        let source = SOURCE.replace("Date: 2025-04-01", "Date: 2025-04-01\nReadTime: 12");
        assert_eq!(12, Article::parse(&source)?.read_minutes);
        Ok(())
    }

    #[test]
    fn test_missing_fences() {
        assert!(matches!(
            Article::parse("Title: x"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            Article::parse("---\nTitle: x\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_dashes_inside_frontmatter() -> Result<()> {
        let source = SOURCE
            .replace("Title: The Art of AI Refinement", "Title: Tuning---or Training")
            .replace("Summary: Fine-tuning", "Summary: |\n  ---\n  ----\n  Fine-tuning");
        let article = Article::parse(&source)?;
        assert_eq!("Tuning---or Training", article.title);
        assert_eq!("---\n----\nFine-tuning vs training from scratch.\n", article.summary);
        assert_eq!(2, article.sections.len());
        Ok(())
    }

    #[test]
    fn test_closing_fence_at_end_of_input() {
        assert!(matches!(
            Article::parse("---\nTitle: x\nDate: 2025-04-01\nAuthor:\n  Name: y\n---"),
            Err(Error::Sections(section::Error::Empty))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let source = SOURCE.replace("## What is Fine-tuning?", "## Again {#intro}");
        assert!(matches!(
            Article::parse(&source),
            Err(Error::Sections(section::Error::DuplicateId(_)))
        ));
    }

    #[test]
    fn test_no_sections_rejected() {
        let source = &SOURCE[..SOURCE.find("## Intro").unwrap()];
        assert!(matches!(
            Article::parse(source),
            Err(Error::Sections(section::Error::Empty))
        ));
    }

    #[test]
    fn test_content_before_first_section() {
        let source = SOURCE.replace("## Introduction", "stray text\n\n## Introduction");
        assert!(matches!(
            Article::parse(&source),
            Err(Error::ContentBeforeFirstSection(2))
        ));
    }

    #[test]
    fn test_invalid_date_and_email() {
        let source = SOURCE.replace("2025-04-01", "April 1");
        assert!(matches!(Article::parse(&source), Err(Error::InvalidDate(_, _))));

        let source = SOURCE.replace("jane@example.org", "jane");
        assert!(matches!(Article::parse(&source), Err(Error::InvalidEmail(_))));
    }

    #[test]
    fn test_parse_heading() {
        assert_eq!(
            (String::from("Use Cases"), Some(String::from("use-cases"))),
            parse_heading(" Use Cases {#use-cases} ")
        );
        assert_eq!((String::from("Plain"), None), parse_heading("Plain"));
        assert_eq!((String::from("{#only}"), None), parse_heading("{#only}"));
    }

    #[test]
    fn test_estimate_read_minutes() {
        assert_eq!(1, estimate_read_minutes(0));
        assert_eq!(1, estimate_read_minutes(225));
        assert_eq!(2, estimate_read_minutes(226));
    }

    #[test]
    fn test_from_file_annotates_errors() {
        let err = Article::from_file(Path::new("./testdata/does-not-exist.md")).unwrap_err();
        assert!(matches!(err, Error::Annotated(_, _)));
        assert!(err.to_string().contains("does-not-exist.md"));
    }
}
