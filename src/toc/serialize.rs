//! HTML serialization of a parsed fragment with heading ids injected.
//!
//! Follows the HTML fragment serialization rules: void elements have no end
//! tag, raw-text elements are written verbatim, everything else is escaped.
//! `h2` elements are matched to `heading_ids` by document order, the same
//! order the extractor's selector yields them in.

use scraper::{ElementRef, Html, Node};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

pub(super) fn fragment_with_heading_ids(doc: &Html, heading_ids: &[String]) -> String {
    let mut writer = Writer {
        out: String::new(),
        heading_ids,
        next_heading: 0,
    };
    writer.children(doc.root_element());
    writer.out
}

struct Writer<'a> {
    out: String,
    heading_ids: &'a [String],
    next_heading: usize,
}

impl Writer<'_> {
    fn children(&mut self, parent: ElementRef<'_>) {
        let raw = RAW_TEXT_ELEMENTS.contains(&parent.value().name());
        for child in parent.children() {
            match child.value() {
                Node::Text(text) => {
                    if raw {
                        self.out.push_str(text);
                    } else {
                        escape_into(&mut self.out, text, false);
                    }
                }
                Node::Comment(comment) => {
                    self.out.push_str("<!--");
                    self.out.push_str(comment);
                    self.out.push_str("-->");
                }
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.element(element);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, element: ElementRef<'_>) {
        let name = element.value().name();
        let heading_ids = self.heading_ids;
        let injected_id = if name == "h2" {
            let id = heading_ids.get(self.next_heading);
            self.next_heading += 1;
            id
        } else {
            None
        };

        self.out.push('<');
        self.out.push_str(name);
        if let Some(id) = injected_id {
            self.attribute("id", id);
        }
        // Namespaced attributes in SVG and MathML keep their prefix.
        for (name, value) in element.value().attrs.iter() {
            let local: &str = &name.local;
            match &name.prefix {
                Some(prefix) => self.attribute(&format!("{}:{}", &**prefix, local), value),
                None if injected_id.is_some() && local == "id" => {}
                None => self.attribute(local, value),
            }
        }
        self.out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }
        self.children(element);
        self.out.push_str("</");
        self.out.push_str(name);
        self.out.push('>');
    }

    fn attribute(&mut self, key: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(key);
        self.out.push_str("=\"");
        escape_into(&mut self.out, value, true);
        self.out.push('"');
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}
