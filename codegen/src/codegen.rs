use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};
use std::collections::HashSet;

use super::{
    error::Error,
    types::{ClassModel, NormalizedType, Scalar, ServiceModel},
};

/// Keywords a field may still be named after using a raw identifier.
const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in", "let",
    "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return",
    "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use",
    "virtual", "where", "while", "yield",
];

fn field_ident(field: &str) -> Ident {
    if RAW_KEYWORDS.contains(&field) {
        Ident::new_raw(field, Span::call_site())
    } else {
        format_ident!("{}", field)
    }
}

fn element_type(ty: &NormalizedType, known: &HashSet<String>) -> TokenStream {
    match ty {
        NormalizedType::Scalar(Scalar::Integer) => quote! { i64 },
        NormalizedType::Scalar(Scalar::Double) => quote! { f64 },
        NormalizedType::Scalar(Scalar::String) => quote! { String },

        NormalizedType::Class(name) if known.contains(name) => {
            let ident = format_ident!("{}", name);
            quote! { #ident }
        }

        // XSD types outside the scalar table keep their wire text.
        NormalizedType::Class(_) => quote! { String },

        NormalizedType::Array(element) => {
            let element = element_type(element, known);
            quote! { Vec<#element> }
        }
    }
}

fn field_type(ty: &NormalizedType, known: &HashSet<String>) -> TokenStream {
    match ty {
        NormalizedType::Array(_) => element_type(ty, known),

        NormalizedType::Class(name) if known.contains(name) => {
            let ident = format_ident!("{}", name);
            quote! { Option<Box<#ident>> }
        }

        _ => {
            let inner = element_type(ty, known);
            quote! { Option<#inner> }
        }
    }
}

/// Name of the field embedding the parent, clear of the class's own fields.
fn base_field(class: &ClassModel) -> Ident {
    let mut name = "base".to_owned();

    while class.declared().any(|property| property.field == name) {
        name.push('_');
    }

    format_ident!("{}", name)
}

fn alias_accessors(class: &ClassModel, base: Option<&Ident>, known: &HashSet<String>) -> TokenStream {
    let name = format_ident!("{}", class.name);

    let aliases = class
        .aliases
        .iter()
        .filter_map(|alias| {
            let property = class.property(&alias.name)?;
            let field = field_ident(&property.field);

            let path = match base {
                Some(base) if property.inherited => quote! { self.#base.#field },
                _ => quote! { self.#field },
            };

            Some((&alias.raw_name, &property.field, path, field_type(&property.ty, known)))
        })
        .collect::<Vec<_>>();

    let entries = aliases
        .iter()
        .map(|(raw, name, _, _)| quote! { (#raw, #name), });

    let get_arms = aliases
        .iter()
        .map(|(raw, _, path, _)| quote! { #raw => Some(&#path), });

    let set_arms = aliases.iter().map(|(raw, _, path, ty)| {
        quote! {
            #raw => {
                #path = *value.downcast::<#ty>()?;
                Ok(())
            }
        }
    });

    quote! {
        impl #name {
            /// Wire names that are not valid identifiers, mapped to their fields.
            pub const PARAMETER_MAP: &'static [(&'static str, &'static str)] = &[#(#entries)*];

            /// Reads a field by its wire name.
            pub fn get(&self, name: &str) -> Option<&dyn ::std::any::Any> {
                match name {
                    #(#get_arms)*
                    _ => None,
                }
            }

            /// Writes a field by its wire name, handing `value` back if the
            /// name is unknown or the value has the wrong type.
            pub fn set(
                &mut self,
                name: &str,
                value: Box<dyn ::std::any::Any>,
            ) -> Result<(), Box<dyn ::std::any::Any>> {
                match name {
                    #(#set_arms)*
                    _ => Err(value),
                }
            }
        }
    }
}

pub(crate) fn class(class: &ClassModel, known: &HashSet<String>) -> TokenStream {
    let name = format_ident!("{}", class.name);

    let doc = match &class.raw_name {
        Some(raw_name) => format!(" Wire type `{}`.", raw_name),
        None => " Fields shared by every message of one service.".to_owned(),
    };

    let base = class.parent.as_ref().map(|_| base_field(class));

    let parent_field = class.parent.as_ref().zip(base.as_ref()).map(|(parent, base)| {
        let parent = format_ident!("{}", parent);
        quote! { pub #base: #parent, }
    });

    let fields = class.declared().map(|property| {
        let field = field_ident(&property.field);
        let ty = field_type(&property.ty, known);
        let doc = format!(" `{}`", property.ty);

        quote! {
            #[doc = #doc]
            pub #field: #ty,
        }
    });

    let deref = class.parent.as_ref().zip(base.as_ref()).map(|(parent, base)| {
        let parent = format_ident!("{}", parent);

        quote! {
            impl ::std::ops::Deref for #name {
                type Target = #parent;

                fn deref(&self) -> &Self::Target {
                    &self.#base
                }
            }

            impl ::std::ops::DerefMut for #name {
                fn deref_mut(&mut self) -> &mut Self::Target {
                    &mut self.#base
                }
            }
        }
    });

    let accessors = if class.has_aliases() {
        alias_accessors(class, base.as_ref(), known)
    } else {
        quote! {}
    };

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, Default)]
        pub struct #name {
            #parent_field
            #(#fields)*
        }

        #deref
        #accessors
    }
}

pub(crate) fn service(service: &ServiceModel) -> TokenStream {
    let name = format_ident!("{}", service.name);
    let doc = format!(" Class map for the `{}` service.", service.raw_name);

    let classmap = service
        .classmap
        .iter()
        .map(|(wire, class)| quote! { (#wire, #class), });

    let operations = service.operations.iter().map(|operation| {
        let wire = &operation.raw_name;
        let request = match &operation.request {
            Some(request) => quote! { Some(#request) },
            None => quote! { None },
        };

        quote! { (#wire, #request), }
    });

    let factories = service.classmap.iter().map(|(wire, class)| {
        let class = format_ident!("{}", class);
        quote! { #wire => Some(Box::new(#class::default())), }
    });

    quote! {
        #[doc = #doc]
        pub struct #name;

        impl #name {
            /// Wire type names mapped to the generated types.
            pub const CLASSMAP: &'static [(&'static str, &'static str)] = &[#(#classmap)*];

            /// Operations of the service and the type of their request message.
            pub const OPERATIONS: &'static [(&'static str, Option<&'static str>)] = &[#(#operations)*];

            pub fn class_name(wire_name: &str) -> Option<&'static str> {
                Self::CLASSMAP
                    .iter()
                    .find(|(wire, _)| *wire == wire_name)
                    .map(|(_, class)| *class)
            }

            /// Creates a default value of the type registered for `wire_name`.
            pub fn instantiate(wire_name: &str) -> Option<Box<dyn ::std::any::Any>> {
                match wire_name {
                    #(#factories)*
                    _ => None,
                }
            }
        }
    }
}

/// Every class followed by one service, as the contents of a module.
pub(crate) fn file(classes: &[ClassModel], service: &ServiceModel) -> TokenStream {
    let doc = format!(" Types generated for the `{}` service.", service.raw_name);
    let classes = classes.iter().map(|class| &class.source);
    let service = &service.source;

    quote! {
        #![doc = #doc]
        #![allow(non_camel_case_types, non_snake_case, dead_code)]

        #(#classes)*

        #service
    }
}

pub(crate) fn format(name: &str, tokens: TokenStream) -> Result<String, Error> {
    let file = syn::parse2::<syn::File>(tokens).map_err(|source| Error::RenderError {
        name: name.to_owned(),
        source,
    })?;

    Ok(prettyplease::unparse(&file))
}
