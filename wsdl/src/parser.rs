use quick_xml::{
    events::{attributes::Attributes, BytesStart, BytesText, Event},
    Reader,
};
use std::io::BufRead;
use tracing::debug;

use super::{
    error,
    types::{Class, Document, Entry, Function, Service},
};

fn get_attributes<B: BufRead, const N: usize>(
    reader: &Reader<B>,
    attributes: Attributes<'_>,
    names: [&'static str; N],
) -> Result<[Option<String>; N], error::Error> {
    const INIT: Option<String> = None;
    let mut result = [INIT; N];

    for attribute in attributes {
        let attribute = attribute?;
        let (_, key) = split_namespaced_name(reader.decode(attribute.key)?);

        for (index, name) in names.iter().enumerate() {
            if key == *name {
                result[index] = Some(attribute.unescape_and_decode_value(reader)?);
                break;
            }
        }
    }

    Ok(result)
}

fn split_namespaced_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, prefixed_name),
    }
}

fn required(value: Option<String>, element: &str, attribute: &str) -> Result<String, error::Error> {
    value.ok_or_else(|| malformed(format!("`{}` element without a `{}` attribute", element, attribute)))
}

fn malformed(message: String) -> error::Error {
    error::Error::MalformedDocument(message)
}

#[derive(Debug)]
enum ParseState {
    Service(Service),
    Function(Function),
    Class(Class),
    Extends(String),
    Other(String),
}

impl ParseState {
    fn describe(&self) -> String {
        match self {
            ParseState::Service(service) => format!("service `{}`", service.name),
            ParseState::Function(function) => format!("function `{}`", function.name),
            ParseState::Class(class) => format!("class `{}`", class.name),
            ParseState::Extends(_) => "extends".to_owned(),
            ParseState::Other(name) => name.clone(),
        }
    }
}

/// The innermost service, function or class currently open.
fn enclosing(stack: &mut [ParseState]) -> Option<&mut ParseState> {
    stack.iter_mut().rev().find(|state| {
        matches!(
            state,
            ParseState::Service(_) | ParseState::Function(_) | ParseState::Class(_)
        )
    })
}

#[derive(Default)]
struct Parser {
    document: Document,
}

impl Parser {
    fn parse_xml<B: BufRead>(mut self, mut reader: Reader<B>) -> Result<Document, error::Error> {
        reader.trim_text(true);

        let mut stack = Vec::new();
        let mut buffer = Vec::new();

        loop {
            match reader.read_event(&mut buffer)? {
                Event::Start(start) => self.handle_start(&mut stack, &reader, &start)?,
                Event::End(..) => self.handle_end(&mut stack)?,

                Event::Empty(start) => {
                    self.handle_start(&mut stack, &reader, &start)?;
                    self.handle_end(&mut stack)?;
                }

                Event::Text(text) => self.handle_text(&mut stack, &reader, &text)?,

                Event::Eof => break,

                _ => (),
            }

            buffer.clear();
        }

        debug!(
            services = self.document.services.len(),
            classes = self.document.classes.len(),
            "parsed normalized document"
        );

        Ok(self.document)
    }

    fn handle_start<B: BufRead>(
        &mut self,
        stack: &mut Vec<ParseState>,
        reader: &Reader<B>,
        start: &BytesStart<'_>,
    ) -> Result<(), error::Error> {
        let (_, local_name) = split_namespaced_name(reader.decode(start.name())?);

        let new_state = match local_name {
            "service" | "class" => {
                if let Some(outer) = enclosing(stack) {
                    return Err(malformed(format!(
                        "`{}` nested inside {}",
                        local_name,
                        outer.describe()
                    )));
                }

                let [name] = get_attributes(reader, start.attributes(), ["name"])?;
                let name = required(name, local_name, "name")?;

                if local_name == "service" {
                    ParseState::Service(Service::new(name))
                } else {
                    ParseState::Class(Class::new(name))
                }
            }

            "function" => {
                let [name, input, output] =
                    get_attributes(reader, start.attributes(), ["name", "input", "output"])?;

                ParseState::Function(Function {
                    name: required(name, "function", "name")?,
                    input,
                    output,
                })
            }

            "entry" => {
                let [name, ty] = get_attributes(reader, start.attributes(), ["name", "type"])?;

                match enclosing(stack) {
                    Some(ParseState::Class(class)) => class.entries.push(Entry {
                        name: required(name, "entry", "name")?,
                        ty: required(ty, "entry", "type")?,
                    }),

                    Some(outer) => {
                        return Err(malformed(format!(
                            "`entry` outside of a class, inside {}",
                            outer.describe()
                        )))
                    }

                    None => return Err(malformed("`entry` outside of a class".to_owned())),
                }

                ParseState::Other(local_name.to_owned())
            }

            "extends" => ParseState::Extends(String::new()),

            _ => {
                if let Some(outer) = stack.last() {
                    debug!("FOUND {} INSIDE {}", local_name, outer.describe());
                }

                ParseState::Other(local_name.to_owned())
            }
        };

        stack.push(new_state);
        Ok(())
    }

    fn handle_end(&mut self, stack: &mut Vec<ParseState>) -> Result<(), error::Error> {
        match stack.pop() {
            Some(ParseState::Service(service)) => self.document.services.push(service),
            Some(ParseState::Class(class)) => self.document.classes.push(class),

            Some(ParseState::Function(function)) => match enclosing(stack) {
                Some(ParseState::Service(service)) => service.functions.push(function),

                _ => {
                    return Err(malformed(format!(
                        "function `{}` outside of a service",
                        function.name
                    )))
                }
            },

            Some(ParseState::Extends(parent)) => {
                let parent = parent.trim();

                match enclosing(stack) {
                    Some(ParseState::Class(class)) => {
                        if parent.is_empty() {
                            return Err(malformed(format!(
                                "class `{}` has an empty `extends`",
                                class.name
                            )));
                        }

                        if class.extends.is_some() {
                            return Err(malformed(format!(
                                "class `{}` declares more than one parent",
                                class.name
                            )));
                        }

                        class.extends = Some(parent.to_owned());
                    }

                    _ => return Err(malformed("`extends` outside of a class".to_owned())),
                }
            }

            Some(ParseState::Other(..)) | None => (),
        }

        Ok(())
    }

    fn handle_text<B: BufRead>(
        &mut self,
        stack: &mut [ParseState],
        reader: &Reader<B>,
        text: &BytesText<'_>,
    ) -> Result<(), error::Error> {
        if let Some(ParseState::Extends(parent)) = stack.last_mut() {
            let unescaped = text.unescaped()?;
            parent.push_str(reader.decode(unescaped.as_ref())?);
        }

        Ok(())
    }
}

pub fn parse_str(xml: &str) -> Result<Document, error::Error> {
    Parser::default().parse_xml(Reader::from_str(xml))
}

pub fn parse_reader<B: BufRead>(reader: B) -> Result<Document, error::Error> {
    Parser::default().parse_xml(Reader::from_reader(reader))
}
