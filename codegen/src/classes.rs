use std::collections::HashSet;
use tracing::debug;

use soapgen_wsdl::types::Document;

use super::{
    base::BaseClasses,
    codegen,
    error::Error,
    naming::{normalize_properties, Namespace},
    types::ClassModel,
};

/// Builds a model for every class in the document, in document order.
///
/// All class names are registered before any class is built so a name clash
/// is always reported against the class declared first.
pub(crate) fn build(
    document: &Document,
    namespace: &mut Namespace,
    bases: &BaseClasses,
    known: &HashSet<String>,
) -> Result<Vec<ClassModel>, Error> {
    let names = document
        .classes
        .iter()
        .map(|class| namespace.register_class_name(&class.name, true))
        .collect::<Result<Vec<_>, _>>()?;

    let mut models = Vec::with_capacity(names.len());

    for (class, name) in document.classes.iter().zip(names) {
        namespace.define(&name)?;

        let explicit = class
            .extends
            .as_deref()
            .map(|parent| namespace.reference_class_name(parent))
            .transpose()?;

        let base = match explicit {
            Some(_) => None,
            None => bases.for_class(&name),
        };

        let (mut properties, aliases) = normalize_properties(&class.entries)
            .map_err(|err| err.within(&format!("class `{}`", class.name)))?;

        if let Some(base) = base {
            for property in &mut properties {
                let inherited = base
                    .properties
                    .iter()
                    .find(|inherited| inherited.name == property.name && inherited.ty == property.ty);

                if let Some(inherited) = inherited {
                    property.inherited = true;
                    property.field = inherited.field.clone();
                }
            }
        }

        let mut model = ClassModel {
            name,
            raw_name: Some(class.name.clone()),
            properties,
            aliases,
            parent: explicit.or_else(|| base.map(|base| base.name.clone())),
            source: Default::default(),
        };
        model.source = codegen::class(&model, known);

        debug!(
            class = %model.name,
            parent = ?model.parent,
            aliases = model.aliases.len(),
            "built class"
        );

        models.push(model);
    }

    Ok(models)
}

/// Orders classes so that every parent precedes its children.
///
/// Base classes go first. Each pass then emits every pending class whose
/// parent has been emitted, including parents emitted earlier in the same
/// pass. A pass that emits nothing means the remaining classes extend each
/// other in a cycle or extend a class that does not exist.
pub(crate) fn order(bases: Vec<ClassModel>, classes: Vec<ClassModel>) -> Result<Vec<ClassModel>, Error> {
    let mut emitted = HashSet::new();
    let mut ordered = Vec::with_capacity(bases.len() + classes.len());

    for base in bases {
        emitted.insert(base.name.clone());
        ordered.push(base);
    }

    let mut pending = classes;
    let mut pass = 0;

    while !pending.is_empty() {
        pass += 1;

        let mut loaded = 0;
        let mut remaining = Vec::new();

        for class in pending {
            let ready = match &class.parent {
                Some(parent) => emitted.contains(parent),
                None => true,
            };

            if ready {
                emitted.insert(class.name.clone());
                ordered.push(class);
                loaded += 1;
            } else {
                remaining.push(class);
            }
        }

        debug!(pass, loaded, remaining = remaining.len(), "ordered classes");

        if loaded == 0 {
            return Err(Error::CyclicOrUnresolvedInheritance {
                classes: remaining.into_iter().map(|class| class.name).collect(),
            });
        }

        pending = remaining;
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base;
    use proptest::prelude::*;
    use soapgen_wsdl::types::{Class, Function, Service};

    fn interpret_classes(document: &Document) -> Result<Vec<ClassModel>, Error> {
        let mut namespace = Namespace::new();
        let known = HashSet::new();
        let bases = base::synthesize(document, &mut namespace, &known)?;
        let classes = build(document, &mut namespace, &bases, &known)?;
        order(bases.into_classes(), classes)
    }

    fn names(classes: &[ClassModel]) -> Vec<&str> {
        classes.iter().map(|class| class.name.as_str()).collect()
    }

    fn assert_parents_first(classes: &[ClassModel]) {
        for (index, class) in classes.iter().enumerate() {
            if let Some(parent) = &class.parent {
                let position = classes.iter().position(|other| &other.name == parent);
                assert!(
                    matches!(position, Some(position) if position < index),
                    "{} is ordered before its parent {}",
                    class.name,
                    parent
                );
            }
        }
    }

    #[test]
    fn parents_precede_children() {
        let document = Document {
            services: Vec::new(),
            classes: vec![
                Class::new("C").with_extends("B"),
                Class::new("B").with_extends("A"),
                Class::new("A"),
                Class::new("D").with_extends("tns:A"),
            ],
        };

        let classes = interpret_classes(&document).unwrap();

        assert_eq!(names(&classes), vec!["A", "D", "B", "C"]);
        assert_parents_first(&classes);
    }

    #[test]
    fn cycles_are_reported_by_name() {
        let document = Document {
            services: Vec::new(),
            classes: vec![
                Class::new("A").with_extends("B"),
                Class::new("B").with_extends("A"),
            ],
        };

        match interpret_classes(&document) {
            Err(Error::CyclicOrUnresolvedInheritance { classes }) => {
                assert_eq!(classes, vec!["A", "B"])
            }
            other => panic!("unexpected result {:?}", other.map(|classes| classes.len())),
        }
    }

    #[test]
    fn dangling_parents_are_reported() {
        let document = Document {
            services: Vec::new(),
            classes: vec![Class::new("Root"), Class::new("Orphan").with_extends("Missing")],
        };

        match interpret_classes(&document) {
            Err(Error::CyclicOrUnresolvedInheritance { classes }) => {
                assert_eq!(classes, vec!["Orphan"])
            }
            other => panic!("unexpected result {:?}", other.map(|classes| classes.len())),
        }
    }

    #[test]
    fn duplicate_class_names_fail() {
        let document = Document {
            services: Vec::new(),
            classes: vec![Class::new("Foo-1"), Class::new("Foo1")],
        };

        assert!(matches!(
            interpret_classes(&document),
            Err(Error::DuplicateIdentifier { identifier, .. }) if identifier == "Foo1"
        ));

        let document = Document {
            services: Vec::new(),
            classes: vec![Class::new("Foo"), Class::new("Foo")],
        };

        assert!(matches!(
            interpret_classes(&document),
            Err(Error::DuplicateIdentifier { .. })
        ));
    }

    #[test]
    fn message_classes_extend_the_service_base_class() {
        let document = Document {
            services: vec![Service::new("Shop")
                .with_function(Function::new("Find"))
                .with_function(Function::new("Flag"))],
            classes: vec![
                Class::new("Find").with_entry("id", "int").with_entry("name", "string"),
                Class::new("Flag").with_entry("id", "int").with_entry("flag", "double"),
                Class::new("Plain").with_entry("id", "int"),
            ],
        };

        let classes = interpret_classes(&document).unwrap();

        assert_eq!(names(&classes), vec!["ShopBaseClass", "Find", "Flag", "Plain"]);
        assert_parents_first(&classes);

        let find = &classes[1];
        assert_eq!(find.parent.as_deref(), Some("ShopBaseClass"));
        assert!(find.property("id").unwrap().inherited);
        assert_eq!(
            find.declared().map(|property| property.name.as_str()).collect::<Vec<_>>(),
            vec!["name"]
        );

        let plain = &classes[3];
        assert_eq!(plain.parent, None);
        assert!(!plain.property("id").unwrap().inherited);
    }

    #[test]
    fn explicit_parents_win_over_base_classes() {
        let document = Document {
            services: vec![Service::new("Shop")
                .with_function(Function::new("Find"))
                .with_function(Function::new("Flag"))],
            classes: vec![
                Class::new("Find").with_entry("id", "int"),
                Class::new("Flag").with_extends("Root").with_entry("id", "int"),
                Class::new("Root"),
            ],
        };

        let classes = interpret_classes(&document).unwrap();
        let flag = classes.iter().find(|class| class.name == "Flag").unwrap();

        assert_eq!(flag.parent.as_deref(), Some("Root"));
        assert!(!flag.property("id").unwrap().inherited);
        assert_parents_first(&classes);
    }

    #[test]
    fn renamed_properties_are_aliased() {
        let document = Document {
            services: Vec::new(),
            classes: vec![Class::new("Reading")
                .with_entry("temp-C", "double")
                .with_entry("city", "string")],
        };

        let classes = interpret_classes(&document).unwrap();

        assert!(classes[0].has_aliases());
        assert_eq!(classes[0].aliases[0].raw_name, "temp-C");
        assert_eq!(classes[0].aliases[0].name, "tempC");
    }

    #[test]
    fn parents_are_added_to_the_classmap() {
        let document = Document {
            services: Vec::new(),
            classes: vec![Class::new("tns:Child").with_extends("tns:Parent"), Class::new("tns:Parent")],
        };

        let mut namespace = Namespace::new();
        let known = HashSet::new();
        build(&document, &mut namespace, &BaseClasses::default(), &known).unwrap();

        assert_eq!(
            namespace.into_classmap(),
            vec![
                ("tns:Child".to_owned(), "Child".to_owned()),
                ("tns:Parent".to_owned(), "Parent".to_owned()),
            ]
        );
    }

    /// Parent links forming a forest over `C0..Cn` (a class may only extend a
    /// lower-numbered one) and a random declaration order.
    fn inheritance_forest() -> impl Strategy<Value = (Vec<Option<usize>>, Vec<usize>)> {
        prop::collection::vec(any::<Option<prop::sample::Index>>(), 1..16).prop_flat_map(|links| {
            let parents = links
                .into_iter()
                .enumerate()
                .map(|(index, link)| match link {
                    Some(link) if index > 0 => Some(link.index(index)),
                    _ => None,
                })
                .collect::<Vec<_>>();
            let order = (0..parents.len()).collect::<Vec<_>>();

            (Just(parents), Just(order).prop_shuffle())
        })
    }

    proptest! {
        #[test]
        fn any_acyclic_hierarchy_orders_parents_first((parents, order) in inheritance_forest()) {
            let document = Document {
                services: Vec::new(),
                classes: order
                    .iter()
                    .map(|&index| {
                        let class = Class::new(format!("C{}", index));
                        match parents[index] {
                            Some(parent) => class.with_extends(format!("tns:C{}", parent)),
                            None => class,
                        }
                    })
                    .collect(),
            };

            let classes = interpret_classes(&document).unwrap();

            prop_assert_eq!(classes.len(), parents.len());
            assert_parents_first(&classes);
        }
    }
}
