use std::collections::HashSet;
use tracing::debug;

use soapgen_wsdl::types::{Document, Function};

use super::{
    codegen,
    error::Error,
    naming::{camelize, normalize_name, Namespace},
    types::{Operation, ServiceModel},
};

/// The generated class of the message a function is called with.
fn request_class(function: &Function, known: &HashSet<String>) -> Result<Option<String>, Error> {
    let request = match (&function.input, &function.output) {
        (None, None) => Some(function.name.as_str()),
        (input, _) => input.as_deref(),
    };

    Ok(match request {
        Some(request) => Some(
            normalize_name(request)
                .map_err(|err| err.within(&format!("function `{}`", function.name)))?,
        )
        .filter(|name| known.contains(name)),
        None => None,
    })
}

pub(crate) fn build(
    document: &Document,
    namespace: &mut Namespace,
    known: &HashSet<String>,
) -> Result<Vec<ServiceModel>, Error> {
    let mut services = Vec::with_capacity(document.services.len());

    for service in &document.services {
        let service_name = normalize_name(&service.name)
            .map_err(|err| err.within(&format!("service `{}`", service.name)))?;
        let name = namespace.register_class_name(&camelize(&format!("{}ClassMap", service_name)), false)?;
        namespace.define(&name)?;

        let operations = service
            .functions
            .iter()
            .map(|function| {
                Ok(Operation {
                    raw_name: function.name.clone(),
                    request: request_class(function, known)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let mut model = ServiceModel {
            name,
            raw_name: service.name.clone(),
            operations,
            classmap: namespace
                .classmap()
                .iter()
                .map(|(wire, class)| (wire.clone(), class.clone()))
                .collect(),
            source: Default::default(),
        };
        model.source = codegen::service(&model);

        debug!(
            service = %model.name,
            operations = model.operations.len(),
            classmap = model.classmap.len(),
            "built service"
        );

        services.push(model);
    }

    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soapgen_wsdl::types::Service;

    fn known(names: &[&str]) -> HashSet<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn builds_class_map_services() {
        let document = Document {
            services: vec![Service::new("weather_service")
                .with_function(Function {
                    name: "GetForecast".into(),
                    input: Some("tns:ForecastRequest".into()),
                    output: Some("tns:ForecastResult".into()),
                })
                .with_function(Function::new("Ping"))],
            classes: Vec::new(),
        };

        let mut namespace = Namespace::new();
        namespace.register_class_name("tns:ForecastRequest", true).unwrap();

        let services = build(&document, &mut namespace, &known(&["ForecastRequest"])).unwrap();

        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "WeatherServiceClassMap");
        assert_eq!(
            services[0].operations,
            vec![
                Operation {
                    raw_name: "GetForecast".into(),
                    request: Some("ForecastRequest".into()),
                },
                Operation {
                    raw_name: "Ping".into(),
                    request: None,
                },
            ]
        );
        assert_eq!(
            services[0].classmap,
            vec![("tns:ForecastRequest".to_owned(), "ForecastRequest".to_owned())]
        );
    }

    #[test]
    fn classmap_is_shared_between_services() {
        let document = Document {
            services: vec![Service::new("A"), Service::new("B")],
            classes: Vec::new(),
        };

        let mut namespace = Namespace::new();
        namespace.register_class_name("X", true).unwrap();
        namespace.register_class_name("Y", true).unwrap();

        let services = build(&document, &mut namespace, &known(&[])).unwrap();

        assert_eq!(services[0].classmap, services[1].classmap);
        assert_eq!(services[0].classmap.len(), 2);
    }

    #[test]
    fn class_map_names_must_be_free() {
        let document = Document {
            services: vec![Service::new("Weather")],
            classes: Vec::new(),
        };

        let mut namespace = Namespace::new();
        namespace.register_class_name("Weather-ClassMap", true).unwrap();

        assert!(matches!(
            build(&document, &mut namespace, &known(&[])),
            Err(Error::DuplicateIdentifier { identifier, .. }) if identifier == "WeatherClassMap"
        ));
    }
}
