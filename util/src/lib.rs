//! Runtime pieces generated class maps plug into: the client contract a SOAP
//! transport implements, a registry of default constructors keyed by wire
//! name, and a datasource that times and logs calls.

mod client;
mod datasource;
mod registry;

pub use client::{Fault, SoapClient};
pub use datasource::{Datasource, QueryLog, QueryLogEntry, Response};
pub use registry::ClassRegistry;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not connected")]
    NotConnected,

    #[error("Method {0} does not exist in this API. Try rebuilding the classes from the WSDL.")]
    UnknownMethod(String),

    #[error("Fault {0}")]
    Fault(#[from] Fault),
}
