use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to parse provided URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unable to convert provided path")]
    PathConversionError(Option<std::io::Error>),

    #[error("Unable to read file")]
    FileReadError(#[source] std::io::Error),

    #[error("Unable to get file from server")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("Error parsing XML input")]
    XmlParseError(#[from] quick_xml::Error),

    #[error("Malformed normalized document: {0}")]
    MalformedDocument(String),

    #[error("Unable to run transform {program}")]
    TransformSpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transform {program} exited with {status}: {stderr}")]
    TransformFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("Transform {program} produced output that is not UTF-8")]
    TransformOutputError {
        program: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
}
