use std::path::PathBuf;

use structopt::StructOpt;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use soapgen_codegen::{self as codegen, types::Options};
use soapgen_wsdl::{self as wsdl, transform::CommandNormalizer};

#[derive(Debug, Error)]
enum Error {
    #[error("Error loading WSDL")]
    ParseError(#[from] wsdl::error::Error),

    #[error("Error generating classes")]
    CodegenError(#[from] codegen::error::Error),

    #[error("Transform command is empty")]
    EmptyTransform,

    #[error("Error")]
    IoError(#[from] std::io::Error),
}

#[derive(StructOpt)]
struct Args {
    /// Directory the generated files are written to
    #[structopt(short, long, default_value = ".", parse(from_os_str))]
    output: PathBuf,

    /// Command turning the WSDL into the normalized document, given the WSDL
    /// location as its last argument
    #[structopt(long)]
    transform: Option<String>,

    /// Extra class names the generated code must not define
    #[structopt(long = "reserve")]
    reserved: Vec<String>,

    input: String,
}

/// Directives from `RUST_LOG`, or `info` when unset or unparsable.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[paw::main]
fn main(args: Args) -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();

    let document = match &args.transform {
        Some(command) => {
            let normalizer = CommandNormalizer::from_command_line(command).ok_or(Error::EmptyTransform)?;
            wsdl::transform::parse_with(&normalizer, &args.input)?
        }

        None => wsdl::parse(&args.input)?,
    };

    let options = Options {
        reserved: args.reserved,
        ..Options::default()
    };

    let interpretation = codegen::interpret(&document, &options)?;
    info!(
        classes = interpretation.classes.len(),
        services = interpretation.services.len(),
        "interpreted document"
    );

    match interpretation.save(&args.output) {
        Ok(written) => {
            for path in &written {
                println!("{}", path.display());
            }

            for service in &interpretation.services {
                println!("Configure your datasource with the `{}` class map.", service.name);
            }

            Ok(())
        }

        Err(err) => {
            if let codegen::error::Error::WriteError { written, .. } = &err {
                for path in written {
                    println!("{}", path.display());
                }
            }

            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_follows_rust_log() {
        assert_eq!(log_filter(Some("debug".into())).to_string(), "debug");
        assert_eq!(log_filter(Some("warn".into())).to_string(), "warn");
    }

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).to_string(), "info");
        assert_eq!(log_filter(Some("soapgen=loudest".into())).to_string(), "info");
    }

    #[test]
    fn argument_io_errors_convert() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::Other, "stdin closed"));
        assert!(matches!(err, Error::IoError(_)));
    }

    #[test]
    fn parses_repeated_reservations() {
        let args = Args::from_iter(["soapgen", "-o", "out", "--reserve", "Client", "--reserve", "Fault", "weather.xml"]);

        assert_eq!(args.output, PathBuf::from("out"));
        assert_eq!(args.reserved, vec!["Client", "Fault"]);
        assert_eq!(args.input, "weather.xml");
        assert!(args.transform.is_none());
    }
}
