use std::any::Any;
use thiserror::Error;

/// A fault returned by the remote service instead of a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct Fault {
    pub code: String,
    pub message: String,
}

impl Fault {
    pub fn new<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A transport able to invoke the operations of one service.
///
/// Requests and responses are values of the generated classes, passed as
/// `Any` so one client can serve every operation of a class map.
pub trait SoapClient {
    /// Names of the operations the service exposes.
    fn functions(&self) -> Vec<String>;

    fn call(&mut self, operation: &str, request: Box<dyn Any>) -> Result<Box<dyn Any>, Fault>;
}

impl<C: SoapClient + ?Sized> SoapClient for Box<C> {
    fn functions(&self) -> Vec<String> {
        (**self).functions()
    }

    fn call(&mut self, operation: &str, request: Box<dyn Any>) -> Result<Box<dyn Any>, Fault> {
        (**self).call(operation, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_display_code_and_message() {
        let fault = Fault::new("soap:Server", "city not found");
        assert_eq!(fault.to_string(), "soap:Server: city not found");
    }
}
