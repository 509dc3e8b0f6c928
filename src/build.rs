//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: parsing the article
//! ([`crate::article`]), rendering the page ([`crate::render`]), writing the
//! page runtime script ([`crate::assets`]), and copying the static source
//! directory into the static output directory.

use crate::article::{Article, Error as ParseError};
use crate::assets;
use crate::config::Config;
use crate::render::{Error as RenderError, Renderer};
use gtmpl::Template;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// The name of the rendered article page within the output directory.
pub const PAGE_FILE: &str = "index.html";

/// Builds the site from a [`Config`] object. Returns the path of the
/// rendered page.
pub fn build_site(config: &Config) -> Result<PathBuf> {
    info!(article = %config.article_source.display(), "building site");
    let article = Article::from_file(&config.article_source)?;
    debug!(
        sections = article.sections.len(),
        read_minutes = article.read_minutes,
        "parsed article"
    );

    let template = parse_template(config.article_template.iter())?;

    // Only clean the directories we own; the root output directory may hold
    // other things.
    rmdir(&config.static_output_directory)?;
    rmdir(&config.assets_output_directory)?;
    std::fs::create_dir_all(&config.root_output_directory)?;

    let renderer = Renderer {
        template: &template,
        site_title: &config.site_title,
        home_page: &config.home_page,
        static_url: &config.static_url,
        script_url: &config.script_url,
        settings: &config.page,
        toast: &config.toast,
    };
    let page_path = config.root_output_directory.join(PAGE_FILE);
    renderer.write_page(&article, &page_path)?;
    debug!(path = %page_path.display(), "wrote page");

    std::fs::create_dir_all(&config.assets_output_directory)?;
    std::fs::write(
        config.assets_output_directory.join(assets::SCRIPT_FILE),
        assets::SCRIPT,
    )?;

    if config.static_source_directory.is_dir() {
        let copied = copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
        debug!(files = copied, "copied static files");
    } else {
        warn!(
            path = %config.static_source_directory.display(),
            "no static directory; skipping"
        );
    }

    info!(path = %page_path.display(), "built site");
    Ok(page_path)
}

/// Copies every file under `src` into `dst`, preserving the directory
/// structure. Returns the number of files copied.
fn copy_dir(src: &Path, dst: &Path) -> Result<usize> {
    let mut copied = 0;
    for result in WalkDir::new(src) {
        let entry = result?;
        // strip_prefix shouldn't fail since `src` is always an ancestor of
        // the entry
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// Loads the template files' contents, concatenates them, and parses the
// result into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(&template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing,
/// rendering, cleaning output directories, parsing template files, copying
/// static files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors parsing the article.
    Parse(ParseError),

    /// Returned for errors rendering the article page.
    Render(RenderError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<RenderError> for Error {
    /// Converts [`RenderError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build_testdata_project() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let out = tempfile::tempdir()?;
        // leftovers from a previous build are cleaned
        std::fs::create_dir_all(out.path().join("static"))?;
        std::fs::write(out.path().join("static").join("stale.css"), "")?;

        let config = Config::from_directory(Path::new("./testdata"), Some(out.path()))?;
        let page = build_site(&config)?;

        assert_eq!(out.path().join(PAGE_FILE), page);
        let html = std::fs::read_to_string(&page)?;
        assert!(html.contains(r#"id="intro""#));
        assert!(html.contains(r##"href="#choosing""##));
        assert!(html.contains("mailto:jane@example.org"));
        assert!(html.contains("https://example.org/assets/scrollmark.js"));

        assert_eq!(
            assets::SCRIPT,
            std::fs::read_to_string(out.path().join("assets").join(assets::SCRIPT_FILE))?
        );
        assert!(out.path().join("static").join("style.css").is_file());
        assert!(!out.path().join("static").join("stale.css").exists());
        Ok(())
    }

    #[test]
    fn test_missing_template_file() {
        let result = parse_template(vec![PathBuf::from("./testdata/theme/missing.html")].iter());
        assert!(matches!(result, Err(Error::OpenTemplateFile { .. })));
    }

    #[test]
    fn test_copy_dir_nested() -> std::io::Result<()> {
        let src = tempfile::tempdir()?;
        let dst = tempfile::tempdir()?;
        std::fs::create_dir_all(src.path().join("img"))?;
        std::fs::write(src.path().join("a.css"), "a")?;
        std::fs::write(src.path().join("img").join("b.svg"), "b")?;

        let target = dst.path().join("static");
        assert_eq!(2, copy_dir(src.path(), &target).unwrap());
        assert_eq!("b", std::fs::read_to_string(target.join("img").join("b.svg"))?);
        Ok(())
    }
}
