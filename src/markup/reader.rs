//! Reading the forest view back into plain data
//!
//! Only the element tree matters: attributes other than the empty-list
//! marker are dropped, and every leaf comes back as a string. A
//! self-closing leaf reads as null, or as an empty list when it carries
//! `count="0"`. An element with only `value` children reads as a list of
//! strings, and one with only row children as a list of row objects.
//!
//! Elements may nest at most [`MAX_ELEMENT_DEPTH`] deep.

use serde_json::{Map, Value};

use crate::result::CHILDREN_KEY;

use super::config::MarkupConfig;
use super::errors::{MarkupError, MarkupResult};
use super::views::COUNT_ATTR;

/// Deepest element nesting the reader accepts, counting the root as 1
pub const MAX_ELEMENT_DEPTH: usize = 1024;

#[derive(Debug)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug)]
struct Element {
    name: String,
    position: usize,
    self_closing: bool,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

/// Parses forest-view markup into an array of row objects
pub fn parse_forest(xml: &str, config: &MarkupConfig) -> MarkupResult<Value> {
    let root = Parser::new(xml).parse_document()?;
    rows_of(&root, config)
}

fn rows_of(element: &Element, config: &MarkupConfig) -> MarkupResult<Value> {
    element
        .elements()
        .map(|child| {
            if child.name != config.row {
                return Err(MarkupError::malformed(
                    child.position,
                    format!("expected <{}>, found <{}>", config.row, child.name),
                ));
            }
            row_object(child, config)
        })
        .collect::<MarkupResult<Vec<_>>>()
        .map(Value::Array)
}

fn row_object(row: &Element, config: &MarkupConfig) -> MarkupResult<Value> {
    let mut object = Map::new();
    for field in row.elements() {
        let value = if field.name == CHILDREN_KEY {
            rows_of(field, config)?
        } else {
            field_value(field, config)?
        };
        object.insert(field.name.clone(), value);
    }
    Ok(Value::Object(object))
}

fn field_value(field: &Element, config: &MarkupConfig) -> MarkupResult<Value> {
    if field.self_closing {
        return Ok(match field.attribute(COUNT_ATTR) {
            Some("0") => Value::Array(Vec::new()),
            _ => Value::Null,
        });
    }

    let children: Vec<&Element> = field.elements().collect();
    if children.is_empty() {
        return Ok(Value::String(field.text()));
    }

    if children.iter().all(|c| c.name == config.value) {
        let values = children
            .iter()
            .map(|c| {
                if c.self_closing {
                    Value::Null
                } else {
                    Value::String(c.text())
                }
            })
            .collect();
        return Ok(Value::Array(values));
    }

    if children.iter().all(|c| c.name == config.row) {
        return rows_of(field, config);
    }

    Err(MarkupError::malformed(
        field.position,
        format!("<{}> mixes element kinds", field.name),
    ))
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn error(&self, reason: impl Into<String>) -> MarkupError {
        MarkupError::malformed(self.pos, reason)
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn expect(&mut self, token: &str) -> MarkupResult<()> {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", token)))
        }
    }

    fn skip_until(&mut self, end: &str) -> MarkupResult<()> {
        match self.rest().find(end) {
            Some(offset) => {
                self.pos += offset + end.len();
                Ok(())
            }
            None => Err(self.error(format!("unterminated construct, missing '{}'", end))),
        }
    }

    /// Skips whitespace, processing instructions and comments
    fn skip_misc(&mut self) -> MarkupResult<()> {
        loop {
            self.skip_whitespace();
            if self.rest().starts_with("<?") {
                self.skip_until("?>")?;
            } else if self.rest().starts_with("<!--") {
                self.skip_until("-->")?;
            } else {
                return Ok(());
            }
        }
    }

    fn parse_document(&mut self) -> MarkupResult<Element> {
        self.skip_misc()?;
        if !self.rest().starts_with('<') {
            return Err(self.error("expected root element"));
        }
        let root = self.parse_element()?;
        self.skip_misc()?;
        if !self.rest().is_empty() {
            return Err(self.error("content after root element"));
        }
        Ok(root)
    }

    fn parse_name(&mut self) -> MarkupResult<String> {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '>' | '/' | '=' | '<'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected name"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn parse_attribute(&mut self) -> MarkupResult<(String, String)> {
        let name = self.parse_name()?;
        self.skip_whitespace();
        self.expect("=")?;
        self.skip_whitespace();
        let quote = match self.rest().chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected quoted attribute value")),
        };
        self.pos += 1;
        match self.rest().find(quote) {
            Some(offset) => {
                let value = unescape(&self.rest()[..offset], self.pos)?;
                self.pos += offset + 1;
                Ok((name, value))
            }
            None => Err(self.error("unterminated attribute value")),
        }
    }

    fn parse_element(&mut self) -> MarkupResult<Element> {
        if self.depth >= MAX_ELEMENT_DEPTH {
            return Err(self.error(format!(
                "elements nested more than {} deep",
                MAX_ELEMENT_DEPTH
            )));
        }
        self.depth += 1;
        let element = self.parse_element_body();
        self.depth -= 1;
        element
    }

    fn parse_element_body(&mut self) -> MarkupResult<Element> {
        let position = self.pos;
        self.expect("<")?;
        let name = self.parse_name()?;
        let mut attributes = Vec::new();

        loop {
            self.skip_whitespace();
            if self.rest().starts_with("/>") {
                self.pos += 2;
                return Ok(Element {
                    name,
                    position,
                    self_closing: true,
                    attributes,
                    children: Vec::new(),
                });
            }
            if self.rest().starts_with('>') {
                self.pos += 1;
                break;
            }
            if self.rest().is_empty() {
                return Err(self.error(format!("unterminated tag <{}>", name)));
            }
            attributes.push(self.parse_attribute()?);
        }

        let mut children = Vec::new();
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(self.error(format!("missing </{}>", name)));
            }
            if rest.starts_with("</") {
                self.pos += 2;
                let closing = self.parse_name()?;
                if closing != name {
                    return Err(self.error(format!(
                        "mismatched closing tag </{}> for <{}>",
                        closing, name
                    )));
                }
                self.skip_whitespace();
                self.expect(">")?;
                break;
            }
            if rest.starts_with("<!--") {
                self.skip_until("-->")?;
                continue;
            }
            if rest.starts_with('<') {
                children.push(Node::Element(self.parse_element()?));
                continue;
            }

            let len = rest.find('<').unwrap_or(rest.len());
            let text = unescape(&rest[..len], self.pos)?;
            self.pos += len;
            children.push(Node::Text(text));
        }

        // Indentation between elements is not content.
        if children.iter().any(|n| matches!(n, Node::Element(_))) {
            children.retain(|n| match n {
                Node::Text(t) => !t.trim().is_empty(),
                Node::Element(_) => true,
            });
        }

        Ok(Element {
            name,
            position,
            self_closing: false,
            attributes,
            children,
        })
    }
}

/// Resolves the predefined entities and character references
fn unescape(text: &str, position: usize) -> MarkupResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| MarkupError::malformed(position, "unterminated entity"))?;
        let entity = &after[..semi];
        let resolved = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()
                } else if let Some(dec) = entity.strip_prefix('#') {
                    dec.parse().ok()
                } else {
                    None
                };
                code.and_then(char::from_u32).ok_or_else(|| {
                    MarkupError::malformed(position, format!("unknown entity '&{};'", entity))
                })?
            }
        };
        out.push(resolved);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
