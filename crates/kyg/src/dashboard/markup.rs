//! Owned output tree produced by component renders.

use std::fmt::Write as _;

use super::format::escape_html;

const VOID_ELEMENTS: [&str; 5] = ["br", "input", "meta", "link", "hr"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Private render scope of a nested component.
    ShadowRoot(Vec<Node>),
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        self.write_html(&mut html);
        html
    }

    fn write_html(&self, html: &mut String) {
        match self {
            Node::Text(text) => html.push_str(&escape_html(text)),
            Node::ShadowRoot(children) => {
                html.push_str("<template shadowrootmode=\"open\">");
                for child in children {
                    child.write_html(html);
                }
                html.push_str("</template>");
            }
            Node::Element(element) => element.write_html(html),
        }
    }

    /// Depth-first search over the light tree; shadow roots are not entered.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        match self {
            Node::Element(element) if element.attr("id") == Some(id) => Some(element),
            Node::Element(element) => element
                .children
                .iter()
                .find_map(|child| child.find_by_id(id)),
            _ => None,
        }
    }

    /// Light-tree elements carrying `tag`, excluding anything behind a shadow root.
    pub fn find_all_by_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if let Node::Element(element) = self {
            if element.tag == tag {
                out.push(element);
            }
            for child in &element.children {
                child.find_all_by_tag(tag, out);
            }
        }
    }

    /// Concatenated text content, shadow roots included.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            Node::ShadowRoot(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Self::Element(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|classes| classes.split_whitespace().any(|value| value == class))
            .unwrap_or(false)
    }

    /// Sets an attribute, replacing an existing value in place.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attr("class", class)
    }

    /// Boolean attribute such as `disabled`.
    pub fn with_flag(self, name: &str, enabled: bool) -> Self {
        if enabled {
            self.with_attr(name, "")
        } else {
            self
        }
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(Node::text(value))
    }

    pub fn shadow_root(&self) -> Option<&[Node]> {
        self.children.iter().find_map(|child| match child {
            Node::ShadowRoot(children) => Some(children.as_slice()),
            _ => None,
        })
    }

    fn write_html(&self, html: &mut String) {
        let _ = write!(html, "<{}", self.tag);
        for (name, value) in &self.attrs {
            if value.is_empty() && name != "value" && name != "data" {
                let _ = write!(html, " {name}");
            } else {
                let _ = write!(html, " {name}=\"{}\"", escape_html(value));
            }
        }
        html.push('>');

        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }

        for child in &self.children {
            child.write_html(html);
        }
        let _ = write!(html, "</{}>", self.tag);
    }
}

pub fn div(class: &str) -> Element {
    Element::new("div").with_class(class)
}

pub fn span(class: &str) -> Element {
    Element::new("span").with_class(class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_attributes_in_insertion_order() {
        let button = Element::new("button")
            .with_id("submit-btn")
            .with_class("btn")
            .with_flag("disabled", true)
            .text("Retrieving...");
        assert_eq!(
            Node::from(button).to_html(),
            "<button id=\"submit-btn\" class=\"btn\" disabled>Retrieving...</button>"
        );
    }

    #[test]
    fn escapes_text_and_attribute_values() {
        let node = Node::from(
            Element::new("kyg-reporting")
                .with_attr("data", "{\"message\":\"<b>\"}")
                .text("R&D"),
        );
        assert_eq!(
            node.to_html(),
            "<kyg-reporting data=\"{&quot;message&quot;:&quot;&lt;b&gt;&quot;}\">R&amp;D</kyg-reporting>"
        );
    }

    #[test]
    fn light_tree_queries_do_not_enter_shadow_roots() {
        let tree = Node::from(
            div("app").child(
                Element::new("kyg-reporting")
                    .child(Node::ShadowRoot(vec![div("inner").with_id("hidden").into()])),
            ),
        );
        assert!(tree.find_by_id("hidden").is_none());

        let mut mounts = Vec::new();
        tree.find_all_by_tag("kyg-reporting", &mut mounts);
        assert_eq!(mounts.len(), 1);
        assert!(mounts[0].shadow_root().is_some());
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let input = Element::new("input").with_attr("type", "text").with_attr("value", "");
        assert_eq!(
            Node::from(input).to_html(),
            "<input type=\"text\" value=\"\">"
        );
    }
}
