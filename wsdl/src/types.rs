/// A property declared on a normalized `class` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub ty: String,
}

/// A normalized `class` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub entries: Vec<Entry>,
    pub extends: Option<String>,
}

/// A `function` exposed by a normalized `service` element.
///
/// `input` and `output` name the request and response message types when the
/// transform recorded them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub input: Option<String>,
    pub output: Option<String>,
}

/// A normalized `service` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub functions: Vec<Function>,
}

/// The import-flattened document the interpreter consumes.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub services: Vec<Service>,
    pub classes: Vec<Class>,
}

impl Function {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            input: None,
            output: None,
        }
    }

    /// Message type names this function refers to, in declaration order.
    ///
    /// Falls back to the function's own name when neither message is known,
    /// matching the document/literal wrapped convention where the request
    /// element shares the operation name.
    pub fn message_types(&self) -> Vec<&str> {
        let declared = self
            .input
            .iter()
            .chain(self.output.iter())
            .map(String::as_str)
            .collect::<Vec<_>>();

        if declared.is_empty() {
            vec![self.name.as_str()]
        } else {
            declared
        }
    }
}

impl Class {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            extends: None,
        }
    }

    pub fn with_entry<N: Into<String>, T: Into<String>>(mut self, name: N, ty: T) -> Self {
        self.entries.push(Entry {
            name: name.into(),
            ty: ty.into(),
        });
        self
    }

    pub fn with_extends<S: Into<String>>(mut self, parent: S) -> Self {
        self.extends = Some(parent.into());
        self
    }
}

impl Service {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.functions.push(function);
        self
    }
}
