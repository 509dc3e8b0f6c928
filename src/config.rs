//! Loads a project's configuration from `scrollmark.yaml` and the theme's
//! `theme/theme.yaml`, resolving every path and URL the build needs.

use crate::contact::Toast;
use crate::page::{InvalidSettingError, PageSettings};
use crate::reveal::{RevealOptions, Transition, DEFAULT_DURATION, DEFAULT_STAGGER, DEFAULT_THRESHOLD};
use crate::tracker::DEFAULT_HEADER_OFFSET;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "scrollmark.yaml";

#[derive(Deserialize)]
struct HeaderOffset(f64);
impl Default for HeaderOffset {
    fn default() -> Self {
        HeaderOffset(DEFAULT_HEADER_OFFSET)
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Reveal {
    threshold: f64,
    root_margin: f64,
    once: bool,
    stagger_ms: u64,
    duration_ms: u64,
}

impl Default for Reveal {
    fn default() -> Self {
        Reveal {
            threshold: DEFAULT_THRESHOLD,
            root_margin: 0.0,
            once: true,
            stagger_ms: DEFAULT_STAGGER.as_millis() as u64,
            duration_ms: DEFAULT_DURATION.as_millis() as u64,
        }
    }
}

#[derive(Deserialize)]
#[serde(default)]
struct Contact {
    toast_title: String,
    toast_description: String,
    toast_class: String,
}

impl Default for Contact {
    fn default() -> Self {
        let toast = Toast::default();
        Contact {
            toast_title: toast.title,
            toast_description: toast.description,
            toast_class: toast.class,
        }
    }
}

fn default_article() -> PathBuf {
    PathBuf::from("article.md")
}

#[derive(Deserialize)]
struct Project {
    site_title: String,
    site_root: Url,

    #[serde(default)]
    home_page: Option<String>,

    #[serde(default = "default_article")]
    article: PathBuf,

    #[serde(default)]
    header_offset: HeaderOffset,

    #[serde(default)]
    reveal: Reveal,

    #[serde(default)]
    contact: Contact,
}

#[derive(Deserialize)]
struct Theme {
    article_template: Vec<PathBuf>,
}

/// Everything needed to build a site.
#[derive(Debug)]
pub struct Config {
    /// Shown in the header and footer.
    pub site_title: String,

    /// The site's base URL. Always ends in `/`.
    pub site_root: Url,

    /// The destination of the header's site-title link.
    pub home_page: Url,

    pub article_source: PathBuf,

    /// Template files, concatenated in order before parsing.
    pub article_template: Vec<PathBuf>,

    /// `{project}/static`, copied verbatim to `static_output_directory`.
    pub static_source_directory: PathBuf,

    pub root_output_directory: PathBuf,
    pub static_output_directory: PathBuf,
    pub assets_output_directory: PathBuf,

    /// `{site_root}static/`.
    pub static_url: Url,

    /// `{site_root}assets/scrollmark.js`.
    pub script_url: Url,

    pub page: PageSettings,
    pub toast: Toast,
}

impl Config {
    /// Searches `dir` and its ancestors for [`PROJECT_FILE`] and loads it.
    /// `output_directory` defaults to `{project}/_output`.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(Error::ProjectFileNotFound),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        debug!(path = %path.display(), "loading project file");
        let project: Project = load_yaml(path)?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::NoParentDirectory(path.to_owned()))?;

        let theme_dir = project_root.join("theme");
        let theme: Theme = load_yaml(&theme_dir.join("theme.yaml"))?;

        let page = PageSettings {
            header_offset: project.header_offset.0,
            reveal: RevealOptions {
                threshold: project.reveal.threshold,
                root_margin: project.reveal.root_margin,
                once: project.reveal.once,
            },
            transition: Transition {
                stagger: Duration::from_millis(project.reveal.stagger_ms),
                duration: Duration::from_millis(project.reveal.duration_ms),
            },
        };
        page.validate()?;

        let site_root = with_trailing_slash(project.site_root);
        let root_output_directory = match output_directory {
            Some(dir) => dir.to_owned(),
            None => project_root.join("_output"),
        };

        Ok(Config {
            site_title: project.site_title,
            home_page: match &project.home_page {
                Some(home_page) => site_root.join(home_page)?,
                None => site_root.clone(),
            },
            static_url: site_root.join("static/")?,
            script_url: site_root.join("assets/scrollmark.js")?,
            site_root,
            article_source: project_root.join(&project.article),
            article_template: theme
                .article_template
                .iter()
                .map(|relpath| theme_dir.join(relpath))
                .collect(),
            static_source_directory: project_root.join("static"),
            static_output_directory: root_output_directory.join("static"),
            assets_output_directory: root_output_directory.join("assets"),
            root_output_directory,
            page,
            toast: Toast {
                title: project.contact.toast_title,
                description: project.contact.toast_description,
                class: project.contact.toast_class,
            },
        })
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|err| Error::OpenFile {
        path: path.to_owned(),
        err,
    })?;
    serde_yaml::from_reader(file).map_err(|err| Error::DeserializeYaml {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible configuration operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no ancestor directory contains [`PROJECT_FILE`].
    ProjectFileNotFound,

    /// Returned when the project file path has no parent directory.
    NoParentDirectory(PathBuf),

    /// Returned for I/O problems opening a configuration file.
    OpenFile { path: PathBuf, err: std::io::Error },

    /// Returned when a configuration file isn't valid YAML for its schema.
    DeserializeYaml { path: PathBuf, err: serde_yaml::Error },

    /// Returned when a URL can't be derived from `site_root`.
    UrlParse(url::ParseError),

    /// Returned when a page setting is out of range.
    InvalidSetting(InvalidSettingError),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectFileNotFound => write!(
                f,
                "Could not find `{}` in any parent directory",
                PROJECT_FILE
            ),
            Error::NoParentDirectory(path) => write!(
                f,
                "Can't get parent directory for project file '{}'",
                path.display()
            ),
            Error::OpenFile { path, err } => {
                write!(f, "Opening '{}': {}", path.display(), err)
            }
            Error::DeserializeYaml { path, err } => {
                write!(f, "Loading '{}': {}", path.display(), err)
            }
            Error::UrlParse(err) => err.fmt(f),
            Error::InvalidSetting(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectFileNotFound => None,
            Error::NoParentDirectory(_) => None,
            Error::OpenFile { path: _, err } => Some(err),
            Error::DeserializeYaml { path: _, err } => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::InvalidSetting(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<InvalidSettingError> for Error {
    fn from(err: InvalidSettingError) -> Error {
        Error::InvalidSetting(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_project(dir: &Path, project: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(dir.join("theme"))?;
        std::fs::write(dir.join(PROJECT_FILE), project)?;
        std::fs::write(
            dir.join("theme").join("theme.yaml"),
            "article_template: [base.html, article.html]\n",
        )
    }

    #[test]
    fn test_defaults() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "site_title: AI Insights\nsite_root: https://example.org/blog\n",
        )?;

        let config = Config::from_directory(dir.path(), None)?;
        assert_eq!("https://example.org/blog/", config.site_root.as_str());
        assert_eq!("https://example.org/blog/", config.home_page.as_str());
        assert_eq!("https://example.org/blog/static/", config.static_url.as_str());
        assert_eq!(
            "https://example.org/blog/assets/scrollmark.js",
            config.script_url.as_str()
        );
        assert_eq!(dir.path().join("article.md"), config.article_source);
        assert_eq!(
            vec![
                dir.path().join("theme").join("base.html"),
                dir.path().join("theme").join("article.html"),
            ],
            config.article_template
        );
        assert_eq!(dir.path().join("_output"), config.root_output_directory);
        assert_eq!(PageSettings::default(), config.page);
        assert_eq!(Toast::default(), config.toast);
        Ok(())
    }

    #[test]
    fn test_overrides_and_parent_search() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "site_title: AI Insights
site_root: https://example.org/
home_page: articles/index.html
header_offset: 96
reveal:
  threshold: 0.25
  stagger_ms: 50
contact:
  toast_title: Sent!
",
        )?;
        let nested = dir.path().join("drafts").join("deep");
        std::fs::create_dir_all(&nested)?;

        let out = dir.path().join("out");
        let config = Config::from_directory(&nested, Some(&out))?;
        assert_eq!(
            "https://example.org/articles/index.html",
            config.home_page.as_str()
        );
        assert_eq!(96.0, config.page.header_offset);
        assert_eq!(0.25, config.page.reveal.threshold);
        assert!(config.page.reveal.once);
        assert_eq!(Duration::from_millis(50), config.page.transition.stagger);
        assert_eq!(DEFAULT_DURATION, config.page.transition.duration);
        assert_eq!("Sent!", config.toast.title);
        assert_eq!(Toast::default().description, config.toast.description);
        assert_eq!(out.join("static"), config.static_output_directory);
        Ok(())
    }

    #[test]
    fn test_invalid_threshold() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        write_project(
            dir.path(),
            "site_title: x\nsite_root: https://example.org/\nreveal:\n  threshold: 2\n",
        )?;
        assert!(matches!(
            Config::from_directory(dir.path(), None),
            Err(Error::InvalidSetting(_))
        ));
        Ok(())
    }

    #[test]
    fn test_missing_theme() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        std::fs::write(
            dir.path().join(PROJECT_FILE),
            "site_title: x\nsite_root: https://example.org/\n",
        )?;
        assert!(matches!(
            Config::from_directory(dir.path(), None),
            Err(Error::OpenFile { .. })
        ));
        Ok(())
    }
}
