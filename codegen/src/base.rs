use std::collections::{HashMap, HashSet};
use tracing::debug;

use soapgen_wsdl::types::{Class, Document};

use super::{
    codegen,
    error::Error,
    naming::{assign_fields, camelize, normalize_name, normalize_properties, Namespace},
    types::{ClassModel, Property},
};

/// The base classes synthesized for every service, and which message
/// classes each one applies to.
#[derive(Debug, Default)]
pub(crate) struct BaseClasses {
    classes: Vec<ClassModel>,
    membership: HashMap<String, usize>,
}

impl BaseClasses {
    /// The base class `class` belongs to unless it declares its own parent.
    pub fn for_class(&self, class: &str) -> Option<&ClassModel> {
        self.membership
            .get(class)
            .and_then(|index| self.classes.get(*index))
    }

    pub fn into_classes(self) -> Vec<ClassModel> {
        self.classes
    }
}

/// Classes the operations of one service refer to, in first-reference order.
fn referenced_classes<'a>(
    service: &soapgen_wsdl::types::Service,
    classes: &HashMap<String, &'a Class>,
) -> Result<Vec<(String, &'a Class)>, Error> {
    let mut referenced: Vec<(String, &Class)> = Vec::new();

    for function in &service.functions {
        for message in function.message_types() {
            let name = normalize_name(message)
                .map_err(|err| err.within(&format!("function `{}`", function.name)))?;

            if referenced.iter().any(|(existing, _)| *existing == name) {
                continue;
            }

            if let Some(class) = classes.get(&name) {
                referenced.push((name, *class));
            }
        }
    }

    Ok(referenced)
}

/// The properties, by name and type, that every class declares.
fn common_properties(classes: &[(String, &Class)]) -> Result<Vec<Property>, Error> {
    let mut sets = classes.iter().map(|(name, class)| {
        normalize_properties(&class.entries)
            .map(|(properties, _)| properties)
            .map_err(|err| err.within(&format!("class `{}`", name)))
    });

    let mut common = match sets.next() {
        Some(first) => first?,
        None => return Ok(Vec::new()),
    };

    for properties in sets {
        let properties = properties?;
        common.retain(|candidate| {
            properties
                .iter()
                .any(|property| property.name == candidate.name && property.ty == candidate.ty)
        });
    }

    let mut common = common
        .into_iter()
        .map(|property| Property {
            raw_name: property.name.clone(),
            ..property
        })
        .collect::<Vec<_>>();
    assign_fields(&mut common);

    Ok(common)
}

pub(crate) fn synthesize(
    document: &Document,
    namespace: &mut Namespace,
    known: &HashSet<String>,
) -> Result<BaseClasses, Error> {
    let mut by_name = HashMap::new();
    for class in &document.classes {
        if let Ok(name) = normalize_name(&class.name) {
            by_name.entry(name).or_insert(class);
        }
    }

    let mut bases = BaseClasses::default();

    for service in &document.services {
        let referenced = referenced_classes(service, &by_name)?;

        if referenced.is_empty() {
            debug!(service = %service.name, "no message classes, skipping base class");
            continue;
        }

        let properties = common_properties(&referenced)?;

        if properties.is_empty() {
            debug!(service = %service.name, "message classes share no properties, skipping base class");
            continue;
        }

        let service_name = normalize_name(&service.name)
            .map_err(|err| err.within(&format!("service `{}`", service.name)))?;
        let name = namespace.register_class_name(&camelize(&format!("{}BaseClass", service_name)), false)?;
        namespace.define(&name)?;

        debug!(
            service = %service.name,
            base = %name,
            properties = properties.len(),
            classes = referenced.len(),
            "synthesized base class"
        );

        let mut base = ClassModel {
            name,
            raw_name: None,
            properties,
            aliases: Vec::new(),
            parent: None,
            source: Default::default(),
        };
        base.source = codegen::class(&base, known);

        let index = bases.classes.len();
        bases.classes.push(base);

        for (class, _) in referenced {
            bases.membership.entry(class).or_insert(index);
        }
    }

    Ok(bases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NormalizedType, Scalar};
    use soapgen_wsdl::types::{Function, Service};

    fn synthesize_for(document: &Document) -> BaseClasses {
        synthesize(document, &mut Namespace::new(), &HashSet::new()).unwrap()
    }

    fn request(name: &str, input: &str) -> Function {
        Function {
            name: name.into(),
            input: Some(input.into()),
            output: None,
        }
    }

    #[test]
    fn intersects_shared_properties() {
        let document = Document {
            services: vec![Service::new("Shop")
                .with_function(request("Find", "tns:FindRequest"))
                .with_function(request("Flag", "tns:FlagRequest"))],
            classes: vec![
                Class::new("FindRequest")
                    .with_entry("id", "xsd:int")
                    .with_entry("name", "xsd:string"),
                Class::new("FlagRequest")
                    .with_entry("id", "xsd:int")
                    .with_entry("flag", "xsd:double"),
            ],
        };

        let bases = synthesize_for(&document);
        let base = bases.for_class("FindRequest").unwrap();

        assert_eq!(base.name, "ShopBaseClass");
        assert_eq!(base.raw_name, None);
        assert_eq!(
            base.properties
                .iter()
                .map(|property| (property.name.as_str(), &property.ty))
                .collect::<Vec<_>>(),
            vec![("id", &NormalizedType::Scalar(Scalar::Integer))]
        );
        assert_eq!(bases.for_class("FlagRequest").unwrap().name, "ShopBaseClass");
    }

    #[test]
    fn properties_must_share_their_type() {
        let document = Document {
            services: vec![Service::new("Shop")
                .with_function(request("A", "A"))
                .with_function(request("B", "B"))],
            classes: vec![
                Class::new("A").with_entry("id", "int").with_entry("at", "string"),
                Class::new("B").with_entry("id", "string").with_entry("at", "token"),
            ],
        };

        let bases = synthesize_for(&document);
        let base = bases.for_class("A").unwrap();

        assert_eq!(base.properties.len(), 1);
        assert_eq!(base.properties[0].name, "at");
    }

    #[test]
    fn wrapped_operations_reference_the_class_named_after_them() {
        let document = Document {
            services: vec![Service::new("Calculator")
                .with_function(Function::new("Add"))
                .with_function(Function::new("Subtract"))],
            classes: vec![
                Class::new("Add").with_entry("a", "int").with_entry("b", "int"),
                Class::new("Subtract").with_entry("a", "int").with_entry("c", "int"),
                Class::new("Unrelated").with_entry("a", "int"),
            ],
        };

        let bases = synthesize_for(&document);

        assert_eq!(bases.for_class("Add").unwrap().name, "CalculatorBaseClass");
        assert!(bases.for_class("Unrelated").is_none());
    }

    #[test]
    fn services_without_messages_get_no_base_class() {
        let document = Document {
            services: vec![Service::new("Empty").with_function(Function::new("Ping"))],
            classes: vec![Class::new("Other").with_entry("a", "int")],
        };

        let bases = synthesize_for(&document);

        assert!(bases.for_class("Other").is_none());
        assert!(bases.into_classes().is_empty());
    }

    #[test]
    fn disjoint_messages_get_no_base_class() {
        let document = Document {
            services: vec![Service::new("Weather").with_function(Function {
                name: "GetForecast".into(),
                input: Some("ForecastRequest".into()),
                output: Some("ForecastResult".into()),
            })],
            classes: vec![
                Class::new("ForecastRequest").with_entry("city", "string"),
                Class::new("ForecastResult").with_entry("tempC", "double"),
            ],
        };

        assert!(synthesize_for(&document).into_classes().is_empty());
    }

    #[test]
    fn first_service_keeps_a_shared_class() {
        let document = Document {
            services: vec![
                Service::new("First").with_function(request("a", "Shared")),
                Service::new("Second").with_function(request("b", "Shared")),
            ],
            classes: vec![Class::new("Shared").with_entry("id", "int")],
        };

        let bases = synthesize_for(&document);

        assert_eq!(bases.for_class("Shared").unwrap().name, "FirstBaseClass");
        assert_eq!(bases.into_classes().len(), 2);
    }

    #[test]
    fn services_with_the_same_name_collide() {
        let document = Document {
            services: vec![
                Service::new("Twin").with_function(request("a", "A")),
                Service::new("Twin").with_function(request("a", "A")),
            ],
            classes: vec![Class::new("A").with_entry("id", "int")],
        };

        let err = synthesize(&document, &mut Namespace::new(), &HashSet::new()).unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifier { identifier, .. } if identifier == "TwinBaseClass"));
    }
}
