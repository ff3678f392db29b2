use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error loading normalized document")]
    DocumentError(#[source] soapgen_wsdl::error::Error),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Class {identifier} already defined by {existing}, cannot redefine it for `{raw}`")]
    DuplicateIdentifier {
        identifier: String,
        raw: String,
        existing: String,
    },

    #[error("Error loading classes, inheritance cannot be resolved for: {}", .classes.join(", "))]
    CyclicOrUnresolvedInheritance { classes: Vec<String> },

    #[error("No services loaded")]
    NoServices,

    #[error("Error writing source files: {}", failed_paths(.failures))]
    WriteError {
        written: Vec<PathBuf>,
        failures: Vec<(PathBuf, std::io::Error)>,
    },

    #[error("Generated code for {name} could not be formatted")]
    RenderError {
        name: String,
        #[source]
        source: syn::Error,
    },
}

fn failed_paths(failures: &[(PathBuf, std::io::Error)]) -> String {
    failures
        .iter()
        .map(|(path, err)| format!("{} ({})", path.display(), err))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structural problems in the normalized tree are malformed input like any
/// other; loading and XML errors stay document errors.
impl From<soapgen_wsdl::error::Error> for Error {
    fn from(err: soapgen_wsdl::error::Error) -> Self {
        match err {
            soapgen_wsdl::error::Error::MalformedDocument(message) => Error::MalformedInput(message),
            other => Error::DocumentError(other),
        }
    }
}

impl Error {
    /// Prefixes a malformed-input message with the element it came from.
    pub(crate) fn within(self, context: &str) -> Self {
        match self {
            Error::MalformedInput(message) => {
                Error::MalformedInput(format!("{}: {}", context, message))
            }
            other => other,
        }
    }
}
