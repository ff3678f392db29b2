use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use soapgen_wsdl::types::Entry;

use super::{
    error::Error,
    types::{Alias, NormalizedType, Property, Scalar},
};

/// Names the generated code cannot declare: keywords, primitive types and the
/// prelude types the generated code itself refers to.
const RESERVED: &[&str] = &[
    "_", "Self", "abstract", "as", "async", "await", "become", "box", "break", "const",
    "continue", "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for",
    "if", "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override",
    "priv", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
    "Box", "Default", "Err", "None", "Ok", "Option", "Result", "Some", "String", "Vec",
    "bool", "char", "f32", "f64", "i8", "i16", "i32", "i64", "i128", "isize", "str", "u8",
    "u16", "u32", "u64", "u128", "usize",
];

/// Property names that cannot be fields, even as raw identifiers.
const UNRAWABLE: &[&str] = &["_", "Self", "crate", "self", "super"];

/// XSD primitives and the scalar they collapse into, compared ignoring case.
/// `long` is listed twice and the later entry wins.
const SCALARS: &[(&str, Scalar)] = &[
    ("int", Scalar::Integer),
    ("integer", Scalar::Integer),
    ("long", Scalar::Integer),
    ("byte", Scalar::Integer),
    ("short", Scalar::Integer),
    ("negativeInteger", Scalar::Integer),
    ("nonNegativeInteger", Scalar::Integer),
    ("nonPositiveInteger", Scalar::Integer),
    ("positiveInteger", Scalar::Integer),
    ("unsignedByte", Scalar::Integer),
    ("unsignedInt", Scalar::Integer),
    ("unsignedLong", Scalar::Integer),
    ("unsignedShort", Scalar::Integer),
    ("float", Scalar::Double),
    ("long", Scalar::Double),
    ("double", Scalar::Double),
    ("decimal", Scalar::Double),
    ("string", Scalar::String),
    ("token", Scalar::String),
    ("normalizedString", Scalar::String),
    ("hexBinary", Scalar::String),
];

fn can_start_identifier(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Turns a wire name into an identifier matching `[A-Za-z_][A-Za-z0-9_]*`.
///
/// A namespace prefix is dropped, then the leading characters that cannot
/// start an identifier, then every remaining character that cannot appear in
/// one. Characters are deleted rather than replaced, so `Foo-Bar` and `FooBar`
/// both become `FooBar`.
pub fn normalize_name(raw: &str) -> Result<String, Error> {
    let name = match raw.find(':') {
        Some(position) => &raw[position..],
        None => raw,
    };

    let name = name
        .trim_start_matches(|c: char| !can_start_identifier(c))
        .chars()
        .filter(|c| is_identifier_char(*c))
        .collect::<String>();

    if name.is_empty() {
        Err(Error::MalformedInput(format!(
            "`{}` contains no identifier characters",
            raw
        )))
    } else {
        Ok(name)
    }
}

pub fn normalize_type(raw: &str) -> Result<NormalizedType, Error> {
    if let Some(element) = raw.strip_suffix("[]") {
        return Ok(NormalizedType::Array(Box::new(normalize_type(element)?)));
    }

    let name = normalize_name(raw)?;

    let scalar = SCALARS
        .iter()
        .rev()
        .find(|(primitive, _)| primitive.eq_ignore_ascii_case(&name))
        .map(|(_, scalar)| *scalar);

    Ok(match scalar {
        Some(scalar) => NormalizedType::Scalar(scalar),
        None => NormalizedType::Class(name),
    })
}

/// `my_service` becomes `MyService`; existing capitals are kept.
pub fn camelize(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Normalizes a class's entries into its properties and the aliases needed
/// for names that changed.
///
/// Entries that normalize to the same name collapse into one property at the
/// first entry's position, typed by the last entry.
pub(crate) fn normalize_properties(entries: &[Entry]) -> Result<(Vec<Property>, Vec<Alias>), Error> {
    let mut properties: IndexMap<String, Property> = IndexMap::with_capacity(entries.len());
    let mut aliases = Vec::new();

    for entry in entries {
        let name = normalize_name(&entry.name).map_err(|err| err.within("property"))?;
        let ty = normalize_type(&entry.ty)
            .map_err(|err| err.within(&format!("type of property `{}`", entry.name)))?;

        if name != entry.name {
            aliases.push(Alias {
                raw_name: entry.name.clone(),
                name: name.clone(),
            });
        }

        match properties.get_mut(&name) {
            Some(existing) => {
                debug!(property = %name, "property declared twice, keeping the last type");
                existing.ty = ty;
            }

            None => {
                properties.insert(
                    name.clone(),
                    Property {
                        raw_name: entry.name.clone(),
                        field: String::new(),
                        name,
                        ty,
                        inherited: false,
                    },
                );
            }
        }
    }

    let mut properties = properties.into_values().collect::<Vec<_>>();
    assign_fields(&mut properties);

    Ok((properties, aliases))
}

/// Chooses the struct field for every property.
///
/// Names that cannot be fields get trailing underscores until they clear every
/// other property name in the list.
pub(crate) fn assign_fields(properties: &mut [Property]) {
    let names = properties
        .iter()
        .map(|property| property.name.clone())
        .collect::<HashSet<_>>();
    let mut taken = HashSet::new();

    for property in properties.iter_mut() {
        let mut field = property.name.clone();

        if UNRAWABLE.contains(&field.as_str()) {
            field.push('_');
            while names.contains(&field) || taken.contains(&field) {
                field.push('_');
            }
        }

        taken.insert(field.clone());
        property.field = field;
    }
}

/// The identifiers claimed during one interpreter run, plus the wire name to
/// generated name classmap accumulated while claiming them.
#[derive(Debug, Clone)]
pub struct Namespace {
    reserved: HashSet<String>,
    registered: HashMap<String, String>,
    defined: HashSet<String>,
    classmap: IndexMap<String, String>,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::with_reserved(std::iter::empty::<String>())
    }
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A namespace that additionally rejects the given host identifiers.
    pub fn with_reserved<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reserved: RESERVED
                .iter()
                .map(|name| (*name).to_owned())
                .chain(reserved.into_iter().map(Into::into))
                .collect(),
            registered: HashMap::new(),
            defined: HashSet::new(),
            classmap: IndexMap::new(),
        }
    }

    /// Claims the identifier `raw` normalizes to.
    ///
    /// Registering the same raw name again returns the same identifier. A
    /// different raw name normalizing to a claimed or reserved identifier is a
    /// duplicate; the first registrant keeps it.
    pub fn register_class_name(&mut self, raw: &str, add_to_classmap: bool) -> Result<String, Error> {
        let identifier = normalize_name(raw).map_err(|err| err.within("class name"))?;

        if self.reserved.contains(&identifier) {
            return Err(Error::DuplicateIdentifier {
                identifier,
                raw: raw.to_owned(),
                existing: "the host environment".to_owned(),
            });
        }

        match self.registered.get(&identifier) {
            Some(existing) if existing != raw => {
                return Err(Error::DuplicateIdentifier {
                    identifier,
                    raw: raw.to_owned(),
                    existing: format!("`{}`", existing),
                })
            }

            Some(_) => (),

            None => {
                self.registered.insert(identifier.clone(), raw.to_owned());
            }
        }

        if add_to_classmap && !self.classmap.contains_key(raw) {
            self.classmap.insert(raw.to_owned(), identifier.clone());
        }

        Ok(identifier)
    }

    /// Resolves a reference to a class declared elsewhere, such as a parent
    /// named in `extends`, without claiming its identifier.
    pub fn reference_class_name(&mut self, raw: &str) -> Result<String, Error> {
        let identifier = normalize_name(raw).map_err(|err| err.within("class reference"))?;

        if !self.classmap.contains_key(raw) {
            self.classmap.insert(raw.to_owned(), identifier.clone());
        }

        Ok(identifier)
    }

    /// Records that a definition for `identifier` is being generated.
    pub fn define(&mut self, identifier: &str) -> Result<(), Error> {
        if self.defined.insert(identifier.to_owned()) {
            Ok(())
        } else {
            Err(Error::DuplicateIdentifier {
                identifier: identifier.to_owned(),
                raw: identifier.to_owned(),
                existing: "an earlier definition".to_owned(),
            })
        }
    }

    pub fn is_registered(&self, identifier: &str) -> bool {
        self.registered.contains_key(identifier)
    }

    /// Wire name to generated name, in registration order.
    pub fn classmap(&self) -> &IndexMap<String, String> {
        &self.classmap
    }

    pub fn into_classmap(self) -> Vec<(String, String)> {
        self.classmap.into_iter().collect()
    }
}
