//! Templates an [`Article`] into its HTML page. The template receives the
//! article together with the page's initial runtime state: the first
//! section active in both tables of contents, every section hidden and
//! waiting to be revealed, and the contact button not yet clicked.

use crate::article::{Article, Author};
use crate::contact::Toast;
use crate::markdown::{escape, inline_html};
use crate::page::PageSettings;
use crate::reveal;
use crate::section::{ParagraphKind, Section};
use crate::toc::{self, TocEntry};
use crate::tracker::ActiveSectionTracker;
use gtmpl::Template;
use gtmpl_value::Value;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use url::Url;

/// Responsible for templating an [`Article`] and writing the result to disk.
pub struct Renderer<'a> {
    /// The template for the article page.
    pub template: &'a Template,

    /// The site title, shown in the header and footer.
    pub site_title: &'a str,

    /// The URL for the site's home page, typically the destination for the
    /// site-header link.
    pub home_page: &'a Url,

    /// The URL for the static assets, typically for the theme's stylesheet.
    pub static_url: &'a Url,

    /// The URL of the page runtime script.
    pub script_url: &'a Url,

    pub settings: &'a PageSettings,
    pub toast: &'a Toast,
}

impl Renderer<'_> {
    /// Renders `article` and writes it to `file_path`.
    pub fn write_page(&self, article: &Article, file_path: &Path) -> Result<()> {
        let html = self.render(article)?;
        std::fs::write(file_path, html)?;
        Ok(())
    }

    /// Renders `article` to a string.
    pub fn render(&self, article: &Article) -> Result<String> {
        let value = self.to_value(article)?;
        let mut out: Vec<u8> = Vec::new();
        self.template
            .execute(&mut out, &gtmpl::Context::from(value)?)?;
        String::from_utf8(out).map_err(|e| Error::Template(e.to_string()))
    }

    /// Converts `article` and the initial page state into a [`Value`].
    pub fn to_value(&self, article: &Article) -> io::Result<Value> {
        let tracker = ActiveSectionTracker::new(&article.sections, self.settings.header_offset);
        let active = tracker.active();
        let sections: Vec<&Section> = article.sections.iter().collect();

        let mut section_values = Vec::with_capacity(sections.len());
        for (i, section) in sections.iter().enumerate() {
            section_values.push(section_value(
                section,
                i,
                i + 1 < sections.len(),
                self.settings,
            )?);
        }

        let toc_values = toc::entries(&article.sections, active)
            .iter()
            .map(toc_value)
            .collect::<io::Result<Vec<Value>>>()?;

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("site_title".to_owned(), text(self.site_title)?);
        m.insert("title".to_owned(), text(&article.title)?);
        m.insert("summary".to_owned(), text(&article.summary)?);
        m.insert("category".to_owned(), optional_text(&article.category)?);
        m.insert(
            "date".to_owned(),
            Value::String(article.date.format("%B %-d, %Y").to_string()),
        );
        m.insert(
            "datetime".to_owned(),
            Value::String(article.date.format("%Y-%m-%d").to_string()),
        );
        m.insert(
            "read_time".to_owned(),
            Value::String(format!("{} min read", article.read_minutes)),
        );
        m.insert("author".to_owned(), author_value(&article.author)?);
        m.insert("sections".to_owned(), Value::Array(section_values));
        m.insert("toc".to_owned(), Value::Array(toc_values));
        m.insert("active".to_owned(), Value::String(active.to_owned()));
        m.insert(
            "contact".to_owned(),
            contact_value(&article.author, self.toast)?,
        );
        m.insert("settings".to_owned(), settings_value(self.settings));
        m.insert(
            "home_page".to_owned(),
            Value::String(self.home_page.to_string()),
        );
        m.insert(
            "static_url".to_owned(),
            Value::String(self.static_url.to_string()),
        );
        m.insert(
            "script_url".to_owned(),
            Value::String(self.script_url.to_string()),
        );
        Ok(Value::Object(m))
    }
}

fn text(s: &str) -> io::Result<Value> {
    Ok(Value::String(escape(s)?))
}

fn optional_text(s: &Option<String>) -> io::Result<Value> {
    match s {
        Some(s) => text(s),
        None => Ok(Value::Nil),
    }
}

fn section_value(
    section: &Section,
    index: usize,
    divider: bool,
    settings: &PageSettings,
) -> io::Result<Value> {
    let paragraphs = section
        .content
        .iter()
        .map(|p| {
            let (kind, body) = ParagraphKind::classify(p);
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("kind".to_owned(), Value::String(kind.as_str().to_owned()));
            m.insert("bullet".to_owned(), Value::Bool(kind == ParagraphKind::Bullet));
            m.insert(
                "subheading".to_owned(),
                Value::Bool(kind == ParagraphKind::Subheading),
            );
            m.insert("callout".to_owned(), Value::Bool(kind == ParagraphKind::Callout));
            m.insert("text".to_owned(), Value::Bool(kind == ParagraphKind::Text));
            m.insert("html".to_owned(), Value::String(inline_html(body)));
            Value::Object(m)
        })
        .collect();

    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("id".to_owned(), text(&section.id)?);
    m.insert("title".to_owned(), text(&section.title)?);
    m.insert("anchor".to_owned(), text(&section.anchor())?);
    m.insert("index".to_owned(), Value::String(index.to_string()));
    m.insert("paragraphs".to_owned(), Value::Array(paragraphs));
    m.insert("divider".to_owned(), Value::Bool(divider));
    m.insert(
        "classes".to_owned(),
        Value::String(reveal::classes(false).to_owned()),
    );
    m.insert(
        "style".to_owned(),
        Value::String(settings.transition.style(index)),
    );
    Ok(Value::Object(m))
}

fn toc_value(entry: &TocEntry) -> io::Result<Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("id".to_owned(), text(&entry.id)?);
    m.insert("title".to_owned(), text(&entry.title)?);
    m.insert("href".to_owned(), text(&entry.href)?);
    m.insert("active".to_owned(), Value::Bool(entry.active));
    m.insert(
        "classes".to_owned(),
        Value::String(entry.classes().to_owned()),
    );
    Ok(Value::Object(m))
}

fn author_value(author: &Author) -> io::Result<Value> {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("name".to_owned(), text(&author.name)?);
    m.insert("url".to_owned(), optional_text(&author.url)?);
    m.insert("role".to_owned(), optional_text(&author.role)?);
    m.insert("bio".to_owned(), optional_text(&author.bio)?);
    m.insert("avatar".to_owned(), optional_text(&author.avatar)?);
    Ok(Value::Object(m))
}

/// `Nil` when the author has no email, so templates can `{{if .contact}}`.
fn contact_value(author: &Author, toast: &Toast) -> io::Result<Value> {
    let email = match &author.email {
        Some(email) => email,
        None => return Ok(Value::Nil),
    };
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("email".to_owned(), text(email.as_str())?);
    m.insert("href".to_owned(), text(&email.mailto())?);
    m.insert("toast_title".to_owned(), text(&toast.title)?);
    m.insert("toast_description".to_owned(), text(&toast.description)?);
    m.insert("toast_class".to_owned(), text(&toast.class)?);
    Ok(Value::Object(m))
}

/// Numbers are passed as strings; they only ever end up in attributes.
fn settings_value(settings: &PageSettings) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert(
        "header_offset".to_owned(),
        Value::String(settings.header_offset.to_string()),
    );
    m.insert(
        "threshold".to_owned(),
        Value::String(settings.reveal.threshold.to_string()),
    );
    m.insert(
        "root_margin".to_owned(),
        Value::String(format!("{}px", settings.reveal.root_margin)),
    );
    m.insert("once".to_owned(), Value::Bool(settings.reveal.once));
    m.insert(
        "once_attr".to_owned(),
        Value::String(settings.reveal.once.to_string()),
    );
    m.insert(
        "stagger_ms".to_owned(),
        Value::String(settings.transition.stagger.as_millis().to_string()),
    );
    m.insert(
        "duration_ms".to_owned(),
        Value::String(settings.transition.duration.as_millis().to_string()),
    );
    Value::Object(m)
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a rendering operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error writing the output file.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
