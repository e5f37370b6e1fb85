//! HTML5 serialization for the owned DOM.
//!
//! Void elements get no end tag, `script`/`style` content is written raw,
//! `title`/`textarea` content escapes only `&` and `<`, and attribute values
//! are always double-quoted.

use crate::dom::{Element, Node};

/// Options for HTML serialization.
#[derive(Clone, Debug)]
pub struct SerializeOptions {
    /// Put every element on its own indented line (default: false)
    pub pretty: bool,
    /// One level of indentation when pretty-printing (default: two spaces)
    pub indent: String,
    /// Write attributes sorted by name instead of insertion order (default: false)
    pub sort_attributes: bool,
    /// Rewrite `</script` inside script content as `<\/script` (default: true)
    pub escape_script_end_tags: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
            sort_attributes: false,
            escape_script_end_tags: true,
        }
    }
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Pretty-print with a custom indentation string.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self.pretty = true;
        self
    }

    pub fn sort_attributes(mut self) -> Self {
        self.sort_attributes = true;
        self
    }

    pub fn no_escape_script_end_tags(mut self) -> Self {
        self.escape_script_end_tags = false;
        self
    }
}

/// Serialize one element, children included.
pub fn serialize_element(elem: &Element, opts: &SerializeOptions) -> String {
    let mut writer = HtmlWriter::new(opts);
    writer.element(elem);
    writer.out
}

/// Serialize a run of sibling nodes.
pub fn serialize_fragment(nodes: &[Node], opts: &SerializeOptions) -> String {
    let mut writer = HtmlWriter::new(opts);
    for node in nodes {
        writer.node(node);
    }
    writer.out
}

/// How an element's content is written.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ContentModel {
    Void,
    RawText,
    Rcdata,
    Normal,
}

impl ContentModel {
    fn of(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "param" | "source" | "track" | "wbr" => ContentModel::Void,
            "script" | "style" => ContentModel::RawText,
            "title" | "textarea" => ContentModel::Rcdata,
            _ => ContentModel::Normal,
        }
    }
}

/// Which characters need an entity in a given position.
#[derive(Clone, Copy)]
enum Escape {
    Text,
    Rcdata,
    Attribute,
}

fn push_escaped(out: &mut String, text: &str, mode: Escape) {
    for c in text.chars() {
        match (c, mode) {
            ('&', _) => out.push_str("&amp;"),
            ('<', _) => out.push_str("&lt;"),
            ('>', Escape::Text | Escape::Attribute) => out.push_str("&gt;"),
            ('"', Escape::Attribute) => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Case-insensitive `</script` rewrite; byte offsets stay aligned with `text`.
fn push_script(out: &mut String, text: &str) {
    const END: &[u8] = b"</script";
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i + END.len() <= bytes.len() {
        if bytes[i..i + END.len()].eq_ignore_ascii_case(END) {
            out.push_str(&text[start..i]);
            out.push_str("<\\/script");
            i += END.len();
            start = i;
        } else {
            i += 1;
        }
    }
    out.push_str(&text[start..]);
}

struct HtmlWriter<'o> {
    out: String,
    opts: &'o SerializeOptions,
    depth: usize,
}

impl<'o> HtmlWriter<'o> {
    fn new(opts: &'o SerializeOptions) -> Self {
        Self {
            out: String::new(),
            opts,
            depth: 0,
        }
    }

    fn indent(&mut self) {
        if self.opts.pretty {
            for _ in 0..self.depth {
                self.out.push_str(&self.opts.indent);
            }
        }
    }

    fn line_break(&mut self) {
        if self.opts.pretty {
            self.out.push('\n');
        }
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Element(elem) => self.element(elem),
            Node::Text(text) => {
                self.indent();
                push_escaped(&mut self.out, text, Escape::Text);
                if !text.is_empty() {
                    self.line_break();
                }
            }
        }
    }

    fn start_tag(&mut self, elem: &Element) {
        self.out.push('<');
        self.out.push_str(&elem.tag);

        let mut attrs: Vec<_> = elem.attrs.iter().collect();
        if self.opts.sort_attributes {
            attrs.sort_by_key(|(name, _)| *name);
        }
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            push_escaped(&mut self.out, value, Escape::Attribute);
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn end_tag(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
        self.line_break();
    }

    fn element(&mut self, elem: &Element) {
        let model = ContentModel::of(&elem.tag);

        self.indent();
        self.start_tag(elem);

        match model {
            ContentModel::Void => {
                self.line_break();
                return;
            }
            ContentModel::RawText | ContentModel::Rcdata => {
                for text in elem.children.iter().filter_map(Node::as_text) {
                    if model == ContentModel::Rcdata {
                        push_escaped(&mut self.out, text, Escape::Rcdata);
                    } else if self.opts.escape_script_end_tags
                        && elem.tag.eq_ignore_ascii_case("script")
                    {
                        push_script(&mut self.out, text);
                    } else {
                        self.out.push_str(text);
                    }
                }
            }
            // Text-only content stays on the start tag's line
            ContentModel::Normal if elem.children.iter().all(Node::is_text) => {
                for text in elem.children.iter().filter_map(Node::as_text) {
                    push_escaped(&mut self.out, text, Escape::Text);
                }
            }
            ContentModel::Normal => {
                self.line_break();
                self.depth += 1;
                for child in &elem.children {
                    self.node(child);
                }
                self.depth -= 1;
                self.indent();
            }
        }

        self.end_tag(&elem.tag);
    }
}

impl Element {
    /// Minified HTML for this element.
    pub fn to_html(&self) -> String {
        serialize_element(self, &SerializeOptions::default())
    }

    pub fn to_html_pretty(&self) -> String {
        serialize_element(self, &SerializeOptions::default().pretty())
    }

    pub fn to_html_with_options(&self, opts: &SerializeOptions) -> String {
        serialize_element(self, opts)
    }
}

impl Node {
    /// Minified HTML for this node; text is escaped.
    pub fn to_html(&self) -> String {
        serialize_fragment(std::slice::from_ref(self), &SerializeOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_void_and_empty_elements() {
        let mut div = Element::new("div");
        div.push_element(Element::new("br"));
        div.push_element(Element::new("record"));
        assert_eq!(div.to_html(), "<div><br><record></record></div>");
    }

    #[test]
    fn test_escaping_by_position() {
        let mut p = Element::new("p");
        p.set_attr("title", "a \"quoted\" <b> & c");
        p.push_text("1 < 2 > 0 & \"ok\"");
        assert_eq!(
            p.to_html(),
            "<p title=\"a &quot;quoted&quot; &lt;b&gt; &amp; c\">1 &lt; 2 &gt; 0 &amp; \"ok\"</p>"
        );

        let mut title = Element::new("title");
        title.push_text("Test & <Demo>");
        assert_eq!(title.to_html(), "<title>Test &amp; &lt;Demo></title>");
    }

    #[test]
    fn test_script_content() {
        let mut script = Element::new("script");
        script.push_text("if (a < b) { x = '</SCRIPT>'; }");

        assert_eq!(
            script.to_html(),
            "<script>if (a < b) { x = '<\\/script>'; }</script>"
        );
        let raw = script.to_html_with_options(&SerializeOptions::new().no_escape_script_end_tags());
        assert!(raw.contains("'</SCRIPT>'"));
    }

    #[test]
    fn test_fragment_keeps_order() {
        let mut b = Element::new("b");
        b.push_text("bold");
        let nodes = vec![Node::text("a "), Node::Element(b), Node::text(" c")];

        let html = serialize_fragment(&nodes, &SerializeOptions::default());
        assert_eq!(html, "a <b>bold</b> c");
    }

    #[test]
    fn test_pretty_print() {
        let mut array = Element::new("array");
        let mut s = Element::new("string");
        s.push_text("a");
        array.push_element(s);

        assert_eq!(array.to_html_pretty(), "<array>\n  <string>a</string>\n</array>\n");
        assert_eq!(
            array.to_html_with_options(&SerializeOptions::new().with_indent("\t")),
            "<array>\n\t<string>a</string>\n</array>\n"
        );
    }

    #[test]
    fn test_sorted_attributes() {
        let mut elem = Element::new("number");
        elem.set_attr("_name", "x");
        elem.set_attr("class", "n");
        elem.set_attr("data-unit", "px");

        let html = elem.to_html_with_options(&SerializeOptions::new().sort_attributes());
        assert_eq!(html, "<number _name=\"x\" class=\"n\" data-unit=\"px\"></number>");
    }
}
