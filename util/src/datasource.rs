use std::{
    any::Any,
    fmt,
    time::{Duration, Instant},
};
use tracing::{debug, warn};

use super::{ClassRegistry, Error, SoapClient};

/// The result of a datasource query.
pub enum Response {
    /// The operations the service exposes, answered by `describe`.
    Operations(Vec<String>),
    Message(Box<dyn Any>),
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Operations(operations) => f.debug_tuple("Operations").field(operations).finish(),
            Response::Message(_) => f.write_str("Message(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLogEntry {
    pub query: String,
    pub error: Option<String>,
    pub rows: usize,
    pub took: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryLog {
    pub entries: Vec<QueryLogEntry>,
    pub count: usize,
    pub took: Duration,
}

/// Calls the operations of one service through a [`SoapClient`], building
/// default requests from the generated classes when none is given.
pub struct Datasource<C> {
    client: Option<C>,
    registry: ClassRegistry,
    logging: bool,
    log: Vec<QueryLogEntry>,
}

impl<C: SoapClient> Datasource<C> {
    pub fn new(client: C, registry: ClassRegistry) -> Self {
        Self {
            client: Some(client),
            registry,
            logging: false,
            log: Vec::new(),
        }
    }

    /// Records every query in the log returned by [`Datasource::log`].
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub fn describe(&self) -> Result<Vec<String>, Error> {
        self.client
            .as_ref()
            .map(SoapClient::functions)
            .ok_or(Error::NotConnected)
    }

    /// Invokes `method` with `request`, or with a default value of the class
    /// named after the method.
    pub fn query(&mut self, method: &str, request: Option<Box<dyn Any>>) -> Result<Response, Error> {
        if method == "describe" {
            return self.describe().map(Response::Operations);
        }

        let client = self.client.as_mut().ok_or(Error::NotConnected)?;

        if !self.registry.contains(method) {
            return Err(Error::UnknownMethod(method.to_owned()));
        }

        let request = match request.or_else(|| self.registry.instantiate(method)) {
            Some(request) => request,
            None => return Err(Error::UnknownMethod(method.to_owned())),
        };

        debug!(method, "querying");
        let start = Instant::now();
        let response = client.call(method, request);
        let took = start.elapsed();

        match response {
            Ok(response) => {
                debug!(method, ?took, "query succeeded");
                self.record(method, None, 1, took);
                Ok(Response::Message(response))
            }

            Err(fault) => {
                warn!(method, ?took, code = %fault.code, message = %fault.message, "query failed");
                self.record(method, Some(fault.message.clone()), 0, took);
                Err(fault.into())
            }
        }
    }

    fn record(&mut self, method: &str, error: Option<String>, rows: usize, took: Duration) {
        if self.logging {
            self.log.push(QueryLogEntry {
                query: method.to_owned(),
                error,
                rows,
                took,
            });
        }
    }

    pub fn log(&self) -> QueryLog {
        QueryLog {
            entries: self.log.clone(),
            count: self.log.len(),
            took: self.log.iter().map(|entry| entry.took).sum(),
        }
    }

    /// Drops the client. Later queries fail with [`Error::NotConnected`].
    pub fn close(&mut self) {
        self.client = None;
    }
}
