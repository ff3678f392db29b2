use proc_macro2::TokenStream;
use std::fmt;

/// The scalar types every XSD primitive collapses into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Integer,
    Double,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedType {
    Scalar(Scalar),
    /// Anything outside the scalar table, usually a generated class.
    Class(String),
    Array(Box<NormalizedType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub raw_name: String,
    pub name: String,
    /// Struct field holding the property, unique within its class.
    pub field: String,
    pub ty: NormalizedType,
    /// Declared on the synthesized service base class instead of this class.
    pub inherited: bool,
}

/// A wire property name that had to be rewritten, and the field it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub raw_name: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ClassModel {
    pub name: String,
    /// `None` for synthesized service base classes.
    pub raw_name: Option<String>,
    pub properties: Vec<Property>,
    pub aliases: Vec<Alias>,
    pub parent: Option<String>,
    pub source: TokenStream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub raw_name: String,
    /// Generated class of the request message, when there is one.
    pub request: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServiceModel {
    pub name: String,
    pub raw_name: String,
    pub operations: Vec<Operation>,
    /// Wire class name to generated class name, shared by every service.
    pub classmap: Vec<(String, String)>,
    pub source: TokenStream,
}

#[derive(Debug, Clone)]
pub struct Options {
    /// Identifiers that already exist in the host and may not be generated.
    pub reserved: Vec<String>,
    /// Extension of the emitted files.
    pub extension: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reserved: Vec::new(),
            extension: "rs".to_owned(),
        }
    }
}

impl fmt::Display for NormalizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedType::Scalar(Scalar::Integer) => f.write_str("integer"),
            NormalizedType::Scalar(Scalar::Double) => f.write_str("double"),
            NormalizedType::Scalar(Scalar::String) => f.write_str("string"),
            NormalizedType::Class(name) => f.write_str(name),
            NormalizedType::Array(element) => write!(f, "{}[]", element),
        }
    }
}

impl ClassModel {
    pub fn has_aliases(&self) -> bool {
        !self.aliases.is_empty()
    }

    /// Properties declared on this class itself.
    pub fn declared(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter().filter(|property| !property.inherited)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.name == name)
    }
}
