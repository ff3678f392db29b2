use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tracing::debug;

use soapgen_wsdl::{self as wsdl, types::Document};

mod base;
mod classes;
mod codegen;
mod naming;
mod services;

pub mod emitter;
pub mod error;
pub mod types;

pub use emitter::GeneratedFile;
pub use naming::{camelize, normalize_name, normalize_type, Namespace};

use error::Error;
use types::{ClassModel, Options, ServiceModel};

/// The class and service models built from one document.
#[derive(Debug, Clone)]
pub struct Interpretation {
    /// Every class, parents before children.
    pub classes: Vec<ClassModel>,
    pub services: Vec<ServiceModel>,
    /// Wire class name to generated class name.
    pub classmap: Vec<(String, String)>,
    extension: String,
}

impl Interpretation {
    pub fn render(&self) -> Result<Vec<GeneratedFile>, Error> {
        emitter::render(self)
    }

    /// Renders and writes one file per service into `directory`.
    pub fn save<P: AsRef<Path>>(&self, directory: P) -> Result<Vec<PathBuf>, Error> {
        emitter::save(&self.render()?, directory.as_ref())
    }

    /// Every service as an inline module, for macro expansion.
    pub fn tokens(&self) -> Result<TokenStream, Error> {
        if self.services.is_empty() {
            return Err(Error::NoServices);
        }

        let modules = self.services.iter().map(|service| {
            let name = format_ident!("{}", service.name);
            let body = codegen::file(&self.classes, service);

            quote! {
                #[allow(non_snake_case)]
                pub mod #name {
                    #body
                }
            }
        });

        Ok(quote! { #(#modules)* })
    }
}

/// Names of the classes the document declares, used to tell generated class
/// references apart from unmapped XSD types.
fn known_classes(document: &Document) -> HashSet<String> {
    document
        .classes
        .iter()
        .filter_map(|class| normalize_name(&class.name).ok())
        .collect()
}

pub fn interpret(document: &Document, options: &Options) -> Result<Interpretation, Error> {
    let mut namespace = Namespace::with_reserved(options.reserved.iter().cloned());
    let known = known_classes(document);

    let bases = base::synthesize(document, &mut namespace, &known)?;
    debug!("base classes synthesized");

    let classes = classes::build(document, &mut namespace, &bases, &known)?;
    let classes = classes::order(bases.into_classes(), classes)?;
    debug!(classes = classes.len(), "classes ordered");

    let services = services::build(document, &mut namespace, &known)?;
    debug!(services = services.len(), "services built");

    Ok(Interpretation {
        classes,
        services,
        classmap: namespace.into_classmap(),
        extension: options.extension.clone(),
    })
}

pub fn from_url<S: AsRef<str>>(url: S, options: &Options) -> Result<Interpretation, Error> {
    let document = wsdl::parse(url)?;
    interpret(&document, options)
}
