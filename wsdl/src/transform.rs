//! The rewrite step that flattens a WSDL and its imports into the normalized
//! `service`/`class` vocabulary lives outside this crate. This module only
//! defines how it is invoked.

use std::process::Command;
use tracing::{debug, info};

use super::{error, parse_str, types::Document};

pub trait Normalizer {
    /// Produces normalized document text for the WSDL at `wsdl`.
    fn normalize(&self, wsdl: &str) -> Result<String, error::Error>;
}

/// Runs an external program (typically an XSLT processor with the
/// normalizing stylesheet) and reads the normalized document from its stdout.
///
/// The WSDL location is passed as the last argument.
#[derive(Debug, Clone)]
pub struct CommandNormalizer {
    program: String,
    args: Vec<String>,
}

impl CommandNormalizer {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Splits a shell-like command line on whitespace.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let program = words.next()?;

        Some(words.fold(Self::new(program), CommandNormalizer::arg))
    }
}

impl Normalizer for CommandNormalizer {
    fn normalize(&self, wsdl: &str) -> Result<String, error::Error> {
        info!(program = %self.program, %wsdl, "running transform");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(wsdl)
            .output()
            .map_err(|source| error::Error::TransformSpawnError {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(error::Error::TransformFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        debug!(bytes = output.stdout.len(), "transform finished");
        decode_output(&self.program, output.stdout)
    }
}

fn decode_output(program: &str, stdout: Vec<u8>) -> Result<String, error::Error> {
    String::from_utf8(stdout).map_err(|source| error::Error::TransformOutputError {
        program: program.to_owned(),
        source,
    })
}

/// Normalizes `wsdl` and parses the result.
pub fn parse_with<N: Normalizer + ?Sized>(normalizer: &N, wsdl: &str) -> Result<Document, error::Error> {
    parse_str(&normalizer.normalize(wsdl)?)
}
