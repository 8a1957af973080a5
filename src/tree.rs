//! Tree wrappers
//!
//! Queries return new views over the same `Arc`-shared document. Wrapper
//! types implement `XmlTree` and get their own type back from every query.

use std::sync::Arc;

use crate::dom::{NodeId, XmlAttribute, XmlDocument, DOCUMENT_ID};
use crate::error::LookupError;
use crate::options::ParseOptions;
use crate::query::{resolve, Cursor, Outcome};
use crate::serialize::{self, ArrayValue};

/// XML declaration written by `create_xml`
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>";

/// Read-only view of a parsed document
#[derive(Debug, Clone)]
pub struct TreeView {
    doc: Arc<XmlDocument>,
    cursor: Cursor,
    options: ParseOptions,
}

impl TreeView {
    /// Parse raw text into a view of the whole document
    pub fn from_raw_text(input: &str, options: ParseOptions) -> Self {
        let doc = XmlDocument::parse(input, &options);
        Self::from_node(Arc::new(doc), DOCUMENT_ID, options)
    }

    /// View an already parsed node
    pub fn from_node(doc: Arc<XmlDocument>, node: NodeId, options: ParseOptions) -> Self {
        TreeView {
            doc,
            cursor: Cursor::Node(node),
            options,
        }
    }

    pub fn document(&self) -> &Arc<XmlDocument> {
        &self.doc
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    fn with_cursor(&self, cursor: Cursor) -> Self {
        TreeView {
            doc: Arc::clone(&self.doc),
            cursor,
            options: self.options,
        }
    }
}

/// What a path resolved to
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Tree(T),
    Attribute(String),
}

impl<T> Resolved<T> {
    pub fn into_tree(self) -> Option<T> {
        match self {
            Resolved::Tree(tree) => Some(tree),
            Resolved::Attribute(_) => None,
        }
    }

    pub fn as_attribute(&self) -> Option<&str> {
        match self {
            Resolved::Attribute(value) => Some(value),
            Resolved::Tree(_) => None,
        }
    }
}

/// Query and export operations shared by every tree wrapper
///
/// Lookup misses come back as `None` (or zero / empty) and, depending on
/// the diagnostic level, are reported as a `tracing` notice. Nothing here
/// panics on bad input or bad paths.
pub trait XmlTree: Sized {
    /// Wrap a view; used for every derived result
    fn from_view(view: TreeView) -> Self;

    fn view(&self) -> &TreeView;

    /// Element name, `""` for the anonymous root. Result-sets report their
    /// synthetic `name[]`.
    fn name(&self) -> &str {
        let view = self.view();
        match &view.cursor {
            Cursor::Node(id) => view.doc.node_name(*id),
            Cursor::Set { name, .. } => name.as_str(),
        }
    }

    /// Whether this tree is a synthetic result-set
    fn is_set(&self) -> bool {
        matches!(self.view().cursor, Cursor::Set { .. })
    }

    /// Attributes of the current element in source order
    fn attributes(&self) -> &[XmlAttribute] {
        let view = self.view();
        match &view.cursor {
            Cursor::Node(id) => view.doc.attributes(*id),
            Cursor::Set { .. } => &[],
        }
    }

    /// Resolve a path, keeping the reason on a miss
    fn try_path(&self, path: &str, force_set: bool) -> Result<Resolved<Self>, LookupError> {
        let view = self.view();
        match resolve(&view.doc, &view.cursor, path, force_set)? {
            Outcome::Cursor(cursor) => Ok(Resolved::Tree(Self::from_view(view.with_cursor(cursor)))),
            Outcome::Attribute(value) => Ok(Resolved::Attribute(value)),
        }
    }

    /// Sub-tree or attribute value at `path`
    fn path(&self, path: &str, force_set: bool) -> Option<Resolved<Self>> {
        self.try_path(path, force_set)
            .map_err(|error| self.view().options.report(&error))
            .ok()
    }

    /// Text at `path`; with `include_elements`, the inner markup instead
    fn fetch(&self, path: &str, include_elements: bool) -> Option<String> {
        let text = match self.path(path, false)? {
            Resolved::Attribute(value) => return Some(value),
            Resolved::Tree(tree) => {
                let view = tree.view();
                serialize::to_text(&view.doc, &view.cursor, include_elements)
            }
        };

        if self.view().options.auto_trim {
            Some(text.trim().to_string())
        } else {
            Some(text)
        }
    }

    /// Whether `path` resolves; never reports
    fn exists(&self, path: &str) -> bool {
        self.try_path(path, false).is_ok()
    }

    /// Number of matches at `path`
    fn count(&self, path: &str) -> usize {
        match self.path(path, true) {
            Some(Resolved::Tree(tree)) => match &tree.view().cursor {
                Cursor::Set { members, .. } => members.len(),
                Cursor::Node(_) => 1,
            },
            Some(Resolved::Attribute(_)) => 1,
            None => 0,
        }
    }

    /// One tree per match at `path`
    fn set(&self, path: &str) -> Vec<Self> {
        let Some(Resolved::Tree(tree)) = self.path(path, true) else {
            return Vec::new();
        };

        if let Cursor::Set { members, .. } = tree.view().cursor() {
            let view = tree.view();
            return members
                .iter()
                .map(|&id| Self::from_view(view.with_cursor(Cursor::Node(id))))
                .collect();
        }
        vec![tree]
    }

    /// XML document text rooted at `path`, or at this tree
    fn create_xml(&self, path: Option<&str>) -> Option<String> {
        let xml = match path {
            None => self.to_xml(None),
            Some(path) => self.path(path, false)?.into_tree()?.to_xml(None),
        };
        Some(format!("{XML_DECLARATION}{xml}"))
    }

    /// XML text of this tree, compact or tab-indented from `indent`
    fn to_xml(&self, indent: Option<usize>) -> String {
        let view = self.view();
        serialize::to_xml(&view.doc, &view.cursor, indent)
    }

    /// Generic-array export at `path`, or of this tree
    fn to_array(&self, path: Option<&str>) -> Option<ArrayValue> {
        let Some(path) = path else {
            let view = self.view();
            return Some(serialize::to_array(&view.doc, &view.cursor));
        };

        match self.path(path, false)? {
            Resolved::Attribute(value) => Some(ArrayValue::Text(value)),
            Resolved::Tree(tree) => tree.to_array(None),
        }
    }
}

/// The default tree wrapper
#[derive(Debug, Clone)]
pub struct XmlArray {
    view: TreeView,
}

impl XmlArray {
    /// Parse with default options
    pub fn parse(input: &str) -> Self {
        Self::from_raw_text(input, ParseOptions::default())
    }

    pub fn from_raw_text(input: &str, options: ParseOptions) -> Self {
        Self::from_view(TreeView::from_raw_text(input, options))
    }

    /// Parse a sequence of lines, concatenated exactly as given
    pub fn from_lines<I, S>(lines: I, options: ParseOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined: String = lines.into_iter().map(|line| line.as_ref().to_owned()).collect();
        Self::from_raw_text(&joined, options)
    }

    /// Parse bytes, replacing invalid UTF-8
    pub fn from_bytes(input: &[u8], options: ParseOptions) -> Self {
        Self::from_raw_text(&String::from_utf8_lossy(input), options)
    }

    pub fn from_node(doc: Arc<XmlDocument>, node: NodeId, options: ParseOptions) -> Self {
        Self::from_view(TreeView::from_node(doc, node, options))
    }
}

impl XmlTree for XmlArray {
    fn from_view(view: TreeView) -> Self {
        XmlArray { view }
    }

    fn view(&self) -> &TreeView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(tree: &XmlArray, path: &str) -> String {
        tree.fetch(path, false).unwrap()
    }

    /// Element names, attributes and text of a tree, for structural comparison
    fn shape(tree: &XmlArray) -> String {
        let mut out = String::new();
        describe(tree.view().document(), DOCUMENT_ID, &mut out);
        out
    }

    fn describe(doc: &XmlDocument, id: NodeId, out: &mut String) {
        for &child in doc.children(id) {
            let node = doc.get_node(child).unwrap();
            if node.is_text() {
                out.push_str(&format!("'{}'", node.value));
                continue;
            }
            out.push_str(&format!("({}", node.name));
            for attr in &node.attributes {
                out.push_str(&format!(" @{}={}", attr.name, attr.value));
            }
            describe(doc, child, out);
            out.push(')');
        }
    }

    #[test]
    fn test_order_preservation() {
        let tree = XmlArray::parse("<a><b>1</b><b>2</b><a2>x</a2></a>");
        assert_eq!(tree.count("a/b"), 2);

        let set = tree.set("a/b");
        assert_eq!(set.len(), 2);
        assert_eq!(text(&set[0], "."), "1");
        assert_eq!(text(&set[1], "."), "2");
        assert_eq!(set[0].name(), "b");

        let a2 = tree.path("a/a2", false).unwrap().into_tree().unwrap();
        assert_eq!(text(&a2, "."), "x");
    }

    #[test]
    fn test_nested_same_name() {
        let tree = XmlArray::parse("<a><a>inner</a>outer-tail</a>");
        let outer = tree.path("a", false).unwrap().into_tree().unwrap();
        let full = text(&outer, ".");
        assert!(full.contains("inner"));
        assert!(full.contains("outer-tail"));
        assert_eq!(text(&outer, "a"), "inner");
    }

    #[test]
    fn test_attribute_access() {
        let tree = XmlArray::parse("<item id=\"7\">x</item>");
        let id = tree.path("item/@id", false).unwrap();
        assert_eq!(id.as_attribute(), Some("7"));
        assert!(id.into_tree().is_none());
        assert!(tree.path("item/@missing", false).is_none());
        assert_eq!(tree.fetch("item/@id", false).as_deref(), Some("7"));

        let item = tree.path("item", false).unwrap().into_tree().unwrap();
        assert_eq!(item.attributes(), [XmlAttribute::new("id", "7")]);
    }

    #[test]
    fn test_cdata_and_comment() {
        let tree = XmlArray::parse("<x><!-- c --><![CDATA[<y>]]></x>");
        let x = tree.path("x", false).unwrap().into_tree().unwrap();
        let doc = x.view().document();
        let Cursor::Node(id) = x.view().cursor() else {
            panic!("expected a node");
        };
        let children = doc.children(*id);
        assert_eq!(children.len(), 1);
        let leaf = doc.get_node(children[0]).unwrap();
        assert!(leaf.is_text());
        assert_eq!(leaf.value, "<y>");
        assert!(!tree.exists("x/y"));
    }

    #[test]
    fn test_missing_path_is_none() {
        let tree = XmlArray::from_raw_text(
            "<a/>",
            ParseOptions::new().with_diagnostic_level(Some(0)),
        );
        assert!(tree.path("nonexistent/path", false).is_none());
        assert!(!tree.exists("nonexistent/path"));
        assert_eq!(tree.fetch("nonexistent/path", false), None);
        assert_eq!(tree.count("nonexistent/path"), 0);
        assert!(tree.set("nonexistent/path").is_empty());
        assert_eq!(tree.create_xml(Some("nonexistent/path")), None);
        assert_eq!(tree.to_array(Some("nonexistent/path")), None);
    }

    #[test]
    fn test_misuse_is_a_miss() {
        let tree = XmlArray::parse("<a><b/><b/></a>");
        assert!(tree.path("a/b[5]", false).is_none());
        assert!(tree.path("a//b", false).is_none());
        assert!(tree.path("a/b/@id", false).is_none());
        assert!(matches!(
            tree.try_path("a//b", false),
            Err(LookupError::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_name() {
        let tree = XmlArray::parse("<feed><entry/><entry/></feed>");
        assert_eq!(tree.name(), "");
        let feed = tree.path("feed", false).unwrap().into_tree().unwrap();
        assert_eq!(feed.name(), "feed");
        let entries = tree.path("feed/entry", false).unwrap().into_tree().unwrap();
        assert!(entries.is_set());
        assert_eq!(entries.name(), "entry[]");
    }

    #[test]
    fn test_chained_navigation() {
        let tree = XmlArray::parse(
            "<feed><entry><title>A</title></entry><entry><title>B</title></entry></feed>",
        );
        let titles: Vec<String> = tree
            .set("feed/entry")
            .iter()
            .map(|entry| text(entry, "title"))
            .collect();
        assert_eq!(titles, ["A", "B"]);
        assert_eq!(text(&tree, "feed/entry[1]/title"), "B");
    }

    #[test]
    fn test_count_and_set_single_match() {
        let tree = XmlArray::parse("<a><b>only</b></a>");
        assert_eq!(tree.count("a/b"), 1);
        let set = tree.set("a/b");
        assert_eq!(set.len(), 1);
        assert_eq!(text(&set[0], "."), "only");
        assert!(!set[0].is_set());

        let forced = tree.path("a/b", true).unwrap().into_tree().unwrap();
        assert!(forced.is_set());
    }

    #[test]
    fn test_fetch_include_elements() {
        let tree = XmlArray::parse("<a>x<b k=\"v\"><![CDATA[<y>]]></b></a>");
        assert_eq!(tree.fetch("a", false).as_deref(), Some("x<y>"));
        assert_eq!(tree.fetch("a", true).as_deref(), Some("x<b k=\"v\"><y></b>"));
    }

    #[test]
    fn test_auto_trim() {
        let input = "<a>  padded  <b>  inner  </b></a>";
        let trimmed = XmlArray::from_raw_text(input, ParseOptions::new().with_auto_trim(true));
        assert_eq!(text(&trimmed, "a/b"), "inner");
        assert_eq!(text(&trimmed, "a"), "paddedinner");

        let raw = XmlArray::parse(input);
        assert_eq!(text(&raw, "a/b"), "  inner  ");
    }

    #[test]
    fn test_create_xml() {
        let tree = XmlArray::parse("<?xml version=\"1.0\"?><a><b id=\"1\">t</b></a>");
        assert_eq!(
            tree.create_xml(None).unwrap(),
            "<?xml version=\"1.0\"?><a><b id=\"1\"><![CDATA[t]]></b></a>"
        );
        assert_eq!(
            tree.create_xml(Some("a/b")).unwrap(),
            "<?xml version=\"1.0\"?><b id=\"1\"><![CDATA[t]]></b>"
        );
        assert_eq!(tree.create_xml(Some("a/b/@id")), None);
    }

    #[test]
    fn test_round_trip() {
        let sources = [
            "<a><b>1</b><b>2</b><a2 x=\"y\">x</a2></a>",
            "<r><a><a>inner</a>tail</a><e k=\"&quot;q&quot; &amp; &lt;\"/></r>",
            "<m>text<i>mixed</i> more <![CDATA[<raw> & ]]]]><![CDATA[>]]></m>",
            "<one/><two>2</two>",
        ];

        for source in sources {
            let first = XmlArray::parse(source);
            let second = XmlArray::parse(&first.create_xml(None).unwrap());
            assert_eq!(shape(&first), shape(&second), "round trip of {source}");

            let third = XmlArray::parse(&second.create_xml(None).unwrap());
            assert_eq!(second.create_xml(None), third.create_xml(None));
        }
    }

    #[test]
    fn test_indented_round_trip_keeps_structure() {
        let first = XmlArray::parse("<a><b>1</b><c><d k=\"v\">2</d></c></a>");
        let indented = format!("{XML_DECLARATION}{}", first.to_xml(Some(0)));

        let trimmed = XmlArray::from_raw_text(&indented, ParseOptions::new().with_auto_trim(true));
        assert_eq!(shape(&first), shape(&trimmed));

        // untrimmed, the indentation is text between the elements
        let raw = XmlArray::parse(&indented);
        assert_ne!(shape(&first), shape(&raw));
        assert_eq!(raw.count("a/*"), 2);
        assert_eq!(text(&raw, "a/c/d"), "2");
        assert_eq!(text(&raw, "a/c"), "\n\t\t2\n\t");
    }

    #[test]
    fn test_mixed_content_keeps_spacing() {
        let tree = XmlArray::parse("<p><b>A</b> <i>B</i></p>");
        assert_eq!(text(&tree, "p"), "A B");
        assert_eq!(tree.fetch("p", true).as_deref(), Some("<b>A</b> <i>B</i>"));
    }

    #[test]
    fn test_bare_less_than_is_text() {
        let tree = XmlArray::parse("<r>5 < 6</r>");
        assert_eq!(text(&tree, "r"), "5 < 6");
    }

    #[test]
    fn test_html_entities_in_text() {
        let tree = XmlArray::parse("<p title=\"&eacute;t&eacute;\">caf&eacute;&nbsp;&copy;</p>");
        assert_eq!(text(&tree, "p"), "café\u{a0}©");
        assert_eq!(text(&tree, "p/@title"), "été");
    }

    #[test]
    fn test_to_array() {
        let tree = XmlArray::parse("<r><t>T</t><b>1</b><b>2</b></r>");
        let array = tree.to_array(None).unwrap();
        let r = array.get("r").unwrap();
        assert_eq!(r.get("t").and_then(ArrayValue::as_text), Some("T"));
        assert_eq!(r.get("b").and_then(ArrayValue::as_text), Some("2"));

        assert_eq!(
            tree.to_array(Some("r/t")),
            Some(ArrayValue::Text("T".to_string()))
        );
    }

    #[test]
    fn test_from_lines_and_bytes() {
        let lines = ["<a>", "<b>x</b>", "</a>"];
        let tree = XmlArray::from_lines(lines, ParseOptions::default());
        assert_eq!(text(&tree, "a/b"), "x");

        let tree = XmlArray::from_bytes(b"<a>\xFFok</a>", ParseOptions::default());
        assert_eq!(text(&tree, "a"), "\u{FFFD}ok");
    }

    #[test]
    fn test_from_node_shares_document() {
        let tree = XmlArray::parse("<a><b>x</b></a>");
        let doc = Arc::clone(tree.view().document());
        let a = doc.root_element_id().unwrap();
        let sub = XmlArray::from_node(Arc::clone(&doc), a, ParseOptions::default());
        assert_eq!(sub.name(), "a");
        assert_eq!(text(&sub, "b"), "x");
        assert!(Arc::ptr_eq(sub.view().document(), tree.view().document()));
    }

    /// A wrapper type gets its own type back from queries
    #[derive(Debug)]
    struct Feed {
        view: TreeView,
    }

    impl XmlTree for Feed {
        fn from_view(view: TreeView) -> Self {
            Feed { view }
        }

        fn view(&self) -> &TreeView {
            &self.view
        }
    }

    impl Feed {
        fn titles(&self) -> Vec<String> {
            self.set("feed/item")
                .iter()
                .filter_map(|item: &Feed| item.fetch("title", false))
                .collect()
        }
    }

    #[test]
    fn test_custom_wrapper_keeps_its_kind() {
        let feed = Feed::from_view(TreeView::from_raw_text(
            "<feed><item><title>a</title></item><item><title>b</title></item></feed>",
            ParseOptions::default(),
        ));
        assert_eq!(feed.titles(), ["a", "b"]);

        let sub: Feed = feed.path("feed", false).unwrap().into_tree().unwrap();
        assert_eq!(sub.count("item"), 2);
    }

    /// Formatted tracing output, shared with the subscriber's writer
    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Run `f` under a warn-level subscriber and return what it logged
    fn notices(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[test]
    fn test_misses_emit_notices() {
        let tree = XmlArray::parse("<a><b id=\"1\"/></a>");

        let out = notices(|| assert!(tree.path("a/missing", false).is_none()));
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("xmlarray"), "{out}");
        assert!(out.contains("undefined xml element 'missing' in path 'a/missing'"), "{out}");

        let out = notices(|| assert_eq!(tree.fetch("a/b/@nope", false), None));
        assert!(out.contains("undefined xml attribute 'nope'"), "{out}");

        let loud = XmlArray::from_raw_text("<a/>", ParseOptions::new().with_diagnostic_level(Some(3)));
        let out = notices(|| assert_eq!(loud.count("a/b"), 0));
        assert!(out.contains("xml lookup missed"), "{out}");
    }

    #[test]
    fn test_exists_and_masked_level_are_silent() {
        let tree = XmlArray::parse("<a/>");
        let out = notices(|| assert!(!tree.exists("a/missing")));
        assert!(out.is_empty(), "{out}");

        for mask in [0, 2] {
            let options = ParseOptions::new().with_diagnostic_level(Some(mask));
            let quiet = XmlArray::from_raw_text("<a/>", options);
            let out = notices(|| {
                assert!(quiet.path("a/missing", false).is_none());
                assert!(quiet.set("a/missing").is_empty());
            });
            assert!(out.is_empty(), "mask {mask}: {out}");
        }
    }

    #[test]
    fn test_views_are_shareable_across_threads() {
        let tree = XmlArray::parse("<a><b>1</b><b>2</b></a>");
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| tree.count("a/b")))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 2);
            }
        });
    }
}
