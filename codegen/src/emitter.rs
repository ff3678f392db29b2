use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

use super::{codegen, error::Error, Interpretation};

/// One rendered output file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub name: String,
    pub contents: String,
}

/// Renders one self-contained file per service: every class in dependency
/// order, then the service's class map.
pub fn render(interpretation: &Interpretation) -> Result<Vec<GeneratedFile>, Error> {
    if interpretation.services.is_empty() {
        return Err(Error::NoServices);
    }

    interpretation
        .services
        .iter()
        .map(|service| {
            let tokens = codegen::file(&interpretation.classes, service);

            Ok(GeneratedFile {
                name: format!("{}.{}", service.name, interpretation.extension),
                contents: codegen::format(&service.name, tokens)?,
            })
        })
        .collect()
}

/// Writes every file into `directory`, creating it if needed.
///
/// A failed write does not stop the others; the error lists the files that
/// were written alongside the ones that were not.
pub fn save(files: &[GeneratedFile], directory: &Path) -> Result<Vec<PathBuf>, Error> {
    if let Err(err) = fs::create_dir_all(directory) {
        warn!(directory = %directory.display(), %err, "unable to create output directory");
        return Err(Error::WriteError {
            written: Vec::new(),
            failures: vec![(directory.to_owned(), err)],
        });
    }

    let mut written = Vec::new();
    let mut failures = Vec::new();

    for file in files {
        let path = directory.join(&file.name);

        match fs::write(&path, &file.contents) {
            Ok(()) => {
                info!(path = %path.display(), "wrote service");
                written.push(path);
            }

            Err(err) => {
                warn!(path = %path.display(), %err, "unable to write service");
                failures.push((path, err));
            }
        }
    }

    if failures.is_empty() {
        Ok(written)
    } else {
        Err(Error::WriteError { written, failures })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Options;
    use soapgen_wsdl::types::Document;

    #[test]
    fn documents_without_services_are_rejected() {
        let interpretation = crate::interpret(&Document::default(), &Options::default()).unwrap();
        assert!(matches!(render(&interpretation), Err(Error::NoServices)));
    }

    #[test]
    fn reports_partial_writes() {
        let directory = tempfile::tempdir().unwrap();
        fs::create_dir(directory.path().join("Blocked.rs")).unwrap();

        let files = vec![
            GeneratedFile {
                name: "Open.rs".into(),
                contents: "// open\n".into(),
            },
            GeneratedFile {
                name: "Blocked.rs".into(),
                contents: "// blocked\n".into(),
            },
        ];

        match save(&files, directory.path()) {
            Err(Error::WriteError { written, failures }) => {
                assert_eq!(written, vec![directory.path().join("Open.rs")]);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].0, directory.path().join("Blocked.rs"));
            }
            other => panic!("unexpected result {:?}", other),
        }

        assert_eq!(
            fs::read_to_string(directory.path().join("Open.rs")).unwrap(),
            "// open\n"
        );
    }

    #[test]
    fn creates_missing_directories() {
        let directory = tempfile::tempdir().unwrap();
        let nested = directory.path().join("lib").join("soap");

        let written = save(
            &[GeneratedFile {
                name: "A.rs".into(),
                contents: String::new(),
            }],
            &nested,
        )
        .unwrap();

        assert_eq!(written, vec![nested.join("A.rs")]);
    }
}
