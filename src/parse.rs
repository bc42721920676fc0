//! Component source parsing.
//!
//! A component file mixes at most one style region, at most one script
//! region, and an implicit template formed by the remaining top-level
//! markup. Regions are identified structurally, not positionally: the
//! style and script blocks are lifted out by regex before the markup
//! goes through html5ever, so the template parse never sees CSS or
//! script text.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use lazy_static::lazy_static;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::compile::CompileError;

lazy_static! {
    /// Inline script block, case-insensitive, non-greedy across newlines.
    static ref SCRIPT_RE: Regex =
        Regex::new(r"(?is)<script[^>]*>([\s\S]*?)</script>").unwrap();

    /// Style block, same shape.
    static ref STYLE_RE: Regex =
        Regex::new(r"(?is)<style[^>]*>([\s\S]*?)</style>").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// TEMPLATE TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TemplateNode {
    Element(ElementNode),
    Text(TextNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub tag: String,
    /// Source-ordered attribute list. Order is an observable contract:
    /// listener registration follows it.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub value: String,
}

/// The three regions of one component file, parsed once per compile.
#[derive(Debug, Clone)]
pub struct ComponentSource {
    pub style: Option<String>,
    pub script: Option<String>,
    /// The component's single root: the first top-level element left
    /// after the script and style regions are removed. Absent when the
    /// file carries no template markup.
    pub root: Option<ElementNode>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGION EXTRACTION
// ═══════════════════════════════════════════════════════════════════════════════

fn extract_region(source: &str, re: &Regex) -> Option<String> {
    re.captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn strip_regions(source: &str) -> String {
    let stripped = SCRIPT_RE.replace_all(source, "");
    STYLE_RE.replace_all(&stripped, "").to_string()
}

/// Partition a script region's lines into hoisted import statements and
/// the remainder that becomes the component function body.
pub fn split_script(script: &str) -> (Vec<String>, String) {
    let mut imports = Vec::new();
    let mut remainder = Vec::new();
    for line in script.lines() {
        if line.trim_start().starts_with("import ") {
            imports.push(line.trim().to_string());
        } else {
            remainder.push(line);
        }
    }
    (imports, remainder.join("\n"))
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOM CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

fn convert_dom_node(handle: &Handle) -> Option<TemplateNode> {
    match &handle.data {
        NodeData::Text { contents } => {
            let value = contents.borrow().to_string();
            if value.trim().is_empty() {
                return None;
            }
            Some(TemplateNode::Text(TextNode { value }))
        }
        NodeData::Element { name, attrs, .. } => {
            let attributes = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.to_string(), a.value.to_string()))
                .collect();
            let children = handle
                .children
                .borrow()
                .iter()
                .filter_map(convert_dom_node)
                .collect();
            Some(TemplateNode::Element(ElementNode {
                tag: name.local.to_string(),
                attributes,
                children,
            }))
        }
        // Comments, doctypes and processing instructions carry nothing
        // the lowering can use.
        _ => None,
    }
}

/// Collect the meaningful top-level nodes, flattening the html/head/body
/// wrappers html5ever synthesizes around fragment-like input.
fn collect_top_level(handle: &Handle, out: &mut Vec<TemplateNode>) {
    match &handle.data {
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                collect_top_level(child, out);
            }
        }
        NodeData::Element { name, .. } => {
            let tag = name.local.to_string();
            if tag == "html" || tag == "head" || tag == "body" {
                for child in handle.children.borrow().iter() {
                    collect_top_level(child, out);
                }
            } else if let Some(node) = convert_dom_node(handle) {
                out.push(node);
            }
        }
        _ => {
            if let Some(node) = convert_dom_node(handle) {
                out.push(node);
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Parse one component file into its three regions.
pub fn parse_component(source: &str, file_path: &str) -> Result<ComponentSource, CompileError> {
    let style = extract_region(source, &STYLE_RE);
    let script = extract_region(source, &SCRIPT_RE);
    let markup = strip_regions(source);

    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut markup.as_bytes())
        .map_err(|e| {
            CompileError::new(
                "PARSE_ERROR",
                &format!("failed to parse component markup: {}", e),
                file_path,
            )
        })?;

    let mut top_level = Vec::new();
    collect_top_level(&dom.document, &mut top_level);

    let root = top_level.into_iter().find_map(|node| match node {
        TemplateNode::Element(el) => Some(el),
        TemplateNode::Text(_) => None,
    });

    Ok(ComponentSource {
        style,
        script,
        root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_all_three_regions() {
        let src = r#"
<script>
let count = $signal(0);
</script>
<style>
button { color: red; }
</style>
<button class="counter">{{count}}</button>
"#;
        let parsed = parse_component(src, "counter.sjs").unwrap();
        assert!(parsed.style.unwrap().contains("color: red"));
        assert!(parsed.script.unwrap().contains("$signal(0)"));
        let root = parsed.root.unwrap();
        assert_eq!(root.tag, "button");
        assert_eq!(root.attributes[0], ("class".into(), "counter".into()));
    }

    #[test]
    fn regions_are_optional_in_any_order() {
        let parsed = parse_component("<div>plain</div>", "plain.sjs").unwrap();
        assert!(parsed.style.is_none());
        assert!(parsed.script.is_none());
        assert_eq!(parsed.root.unwrap().tag, "div");

        let parsed = parse_component("<div>x</div><style>div{}</style>", "late.sjs").unwrap();
        assert!(parsed.style.is_some());
        assert_eq!(parsed.root.unwrap().tag, "div");
    }

    #[test]
    fn no_root_is_valid() {
        let parsed = parse_component("<script>let a = 1;</script>", "bare.sjs").unwrap();
        assert!(parsed.root.is_none());
        assert!(parsed.script.is_some());
    }

    #[test]
    fn whitespace_only_text_dropped() {
        let parsed = parse_component("<div>\n   <span>x</span>\n   </div>", "ws.sjs").unwrap();
        let root = parsed.root.unwrap();
        assert_eq!(root.children.len(), 1);
        match &root.children[0] {
            TemplateNode::Element(el) => assert_eq!(el.tag, "span"),
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn event_and_binding_attributes_survive_parsing() {
        let parsed = parse_component(
            r#"<div><button @click="go()">x</button><input s-model="name"></div>"#,
            "attrs.sjs",
        )
        .unwrap();
        let root = parsed.root.unwrap();
        let button = match &root.children[0] {
            TemplateNode::Element(el) => el,
            _ => panic!("expected button"),
        };
        assert_eq!(button.attributes[0], ("@click".into(), "go()".into()));
        let input = match &root.children[1] {
            TemplateNode::Element(el) => el,
            _ => panic!("expected input"),
        };
        assert_eq!(input.attributes[0], ("s-model".into(), "name".into()));
    }

    #[test]
    fn split_script_hoists_imports() {
        let (imports, body) = split_script(
            "import { x } from \"./x.js\";\nlet a = 1;\n  import y from \"y\";\nuse(a);",
        );
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0], "import { x } from \"./x.js\";");
        assert!(body.contains("let a = 1;"));
        assert!(body.contains("use(a);"));
        assert!(!body.contains("import"));
    }

    #[test]
    fn interpolation_text_kept_verbatim() {
        let parsed = parse_component("<p>count is {{ count }}!</p>", "interp.sjs").unwrap();
        let root = parsed.root.unwrap();
        match &root.children[0] {
            TemplateNode::Text(t) => assert_eq!(t.value, "count is {{ count }}!"),
            other => panic!("expected text, got {:?}", other),
        }
    }
}
