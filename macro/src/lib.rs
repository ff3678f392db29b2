extern crate proc_macro;

use proc_macro::TokenStream;
use soapgen_codegen::{self as codegen, types::Options};
use syn::{parse_macro_input, LitStr};

/// Expands every service of the normalized document at the given location
/// into an inline module named after its class map.
///
/// ```ignore
/// soapgen_macro::soapgen!("file:///path/to/weather.xml");
///
/// let request = WeatherClassMap::ForecastRequest::default();
/// ```
#[proc_macro]
pub fn soapgen(input: TokenStream) -> TokenStream {
    let location = parse_macro_input!(input as LitStr);

    match codegen::from_url(location.value(), &Options::default()).and_then(|interpretation| interpretation.tokens()) {
        Ok(tokens) => tokens.into(),
        Err(err) => syn::Error::new(location.span(), err.to_string())
            .to_compile_error()
            .into(),
    }
}
