use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::info;
use url::Url;

mod parser;

pub mod error;
pub mod transform;
pub mod types;

pub use parser::{parse_reader, parse_str};

/// Resolves a location given on the command line or in a macro invocation.
///
/// Anything that does not parse as an absolute URL is treated as a path
/// relative to the current directory.
pub fn resolve<S: AsRef<str>>(location: S) -> Result<Url, error::Error> {
    match Url::parse(location.as_ref()) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::from_file_path(
            &Path::new(location.as_ref())
                .canonicalize()
                .map_err(|err| error::Error::PathConversionError(Some(err)))?,
        )
        .map_err(|()| error::Error::PathConversionError(None)),
        Err(err) => Err(err.into()),
    }
}

/// Fetches the raw bytes behind `url` as text.
pub fn load(url: &Url) -> Result<String, error::Error> {
    info!(%url, "loading document");

    let mut text = String::new();

    match url.scheme() {
        "file" => {
            let path = url
                .to_file_path()
                .map_err(|()| error::Error::PathConversionError(None))?;

            BufReader::new(File::open(path).map_err(error::Error::FileReadError)?)
                .read_to_string(&mut text)
                .map_err(error::Error::FileReadError)?;
        }

        "http" | "https" => text = reqwest::blocking::get(url.clone())?.error_for_status()?.text()?,

        other => return Err(error::Error::UnsupportedScheme(other.into())),
    }

    Ok(text)
}

/// Loads and parses an already normalized document.
pub fn parse<S: AsRef<str>>(location: S) -> Result<types::Document, error::Error> {
    let url = resolve(location)?;
    parse_str(&load(&url)?)
}
