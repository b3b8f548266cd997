//! Minimal XML writer
//!
//! Builds the document into a `String`. Text and attribute values are
//! escaped; element names are expected to be valid already (see
//! [`sanitize_name`]).

/// Escapes `& < > "` for use in text or a double-quoted attribute
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// True if `name` can be used as an element or attribute name as is
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start(first) => chars.all(is_name_char),
        _ => false,
    }
}

/// Turns an arbitrary label into a valid XML name.
///
/// Invalid characters become `_`; a label that cannot start a name gets a
/// leading `_`. Names beginning with `xml` (any case) are reserved and are
/// prefixed too.
pub fn sanitize_name(label: &str) -> String {
    let mut out: String = label
        .chars()
        .map(|c| if is_name_char(c) { c } else { '_' })
        .collect();

    let needs_prefix = match out.chars().next() {
        None => true,
        Some(first) => !is_name_start(first),
    } || out.to_ascii_lowercase().starts_with("xml");

    if needs_prefix {
        out.insert(0, '_');
    }
    out
}

/// Streaming element writer
#[derive(Debug)]
pub struct XmlWriter {
    out: String,
    depth: usize,
    indent: bool,
}

impl XmlWriter {
    /// Empty writer; with `indent`, one element per line, two spaces per level
    pub fn new(indent: bool) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            indent,
        }
    }

    /// XML declaration followed by a newline
    pub fn declaration(&mut self) {
        self.out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
        self.out.push('\n');
    }

    fn line_start(&mut self) {
        if self.indent {
            if !self.out.is_empty() && !self.out.ends_with('\n') {
                self.out.push('\n');
            }
            for _ in 0..self.depth {
                self.out.push_str("  ");
            }
        }
    }

    fn tag_with_attrs(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }
    }

    /// `<tag attrs>`; must be matched by [`XmlWriter::close`]
    pub fn open(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.line_start();
        self.tag_with_attrs(tag, attrs);
        self.out.push('>');
        self.depth += 1;
    }

    /// `</tag>`, closing the innermost [`XmlWriter::open`]
    pub fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line_start();
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    /// `<tag attrs/>`
    pub fn empty(&mut self, tag: &str, attrs: &[(&str, String)]) {
        self.line_start();
        self.tag_with_attrs(tag, attrs);
        self.out.push_str("/>");
    }

    /// `<tag attrs>text</tag>` on one line
    pub fn text_element(&mut self, tag: &str, attrs: &[(&str, String)], text: &str) {
        self.line_start();
        self.tag_with_attrs(tag, attrs);
        self.out.push('>');
        self.out.push_str(&escape(text));
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    /// The markup written so far; indented output ends with a newline
    pub fn finish(mut self) -> String {
        if self.indent && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out
    }
}
