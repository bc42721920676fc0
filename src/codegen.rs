//! Template lowering: turns the parsed template tree into imperative
//! statements against the runtime's node API.
//!
//! One variable counter is shared across elements and text nodes, so the
//! template root is always `el0`; the assembled module relies on that
//! name for final insertion.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::compile::CompileError;
use crate::parse::{ElementNode, TemplateNode};

lazy_static! {
    /// Double-brace interpolation inside a text node.
    static ref INTERP_RE: Regex = Regex::new(r"\{\{([^}]+)\}\}").unwrap();

    /// Characters that would escape a template literal.
    static ref LITERAL_ESCAPE_RE: Regex = Regex::new(r"[`$\\]").unwrap();
}

fn escape_template_literal(text: &str) -> String {
    LITERAL_ESCAPE_RE
        .replace_all(text, |caps: &Captures| format!("\\{}", &caps[0]))
        .to_string()
}

/// Rewrite `{{expr}}` into a template-literal hole that calls `expr`
/// when it is a function and reads it directly otherwise, so plain
/// values and accessor-style reactive reads interpolate the same way.
fn interpolate(text: &str) -> String {
    INTERP_RE
        .replace_all(text, |caps: &Captures| {
            let expr = caps[1].trim().to_string();
            format!(
                "${{(typeof {expr} === 'function' ? {expr}() : {expr})}}",
                expr = expr
            )
        })
        .to_string()
}

/// Whether the template contains a `<slot>` element anywhere; controls
/// the generated component's parameter list.
pub fn contains_slot_tag(node: &ElementNode) -> bool {
    if node.tag == "slot" {
        return true;
    }
    node.children.iter().any(|child| match child {
        TemplateNode::Element(el) => contains_slot_tag(el),
        TemplateNode::Text(_) => false,
    })
}

pub struct Codegen<'a> {
    scope_id: &'a str,
    file_path: &'a str,
    allow_inline_handlers: bool,
    var_count: usize,
}

impl<'a> Codegen<'a> {
    pub fn new(scope_id: &'a str, file_path: &'a str, allow_inline_handlers: bool) -> Self {
        Codegen {
            scope_id,
            file_path,
            allow_inline_handlers,
            var_count: 0,
        }
    }

    fn next_var(&mut self, prefix: &str) -> String {
        let name = format!("{}{}", prefix, self.var_count);
        self.var_count += 1;
        name
    }

    /// Lower one template node into statements that create it, wire its
    /// reactivity, and append it to `parent`.
    pub fn gen_node(
        &mut self,
        node: &TemplateNode,
        parent: Option<&str>,
    ) -> Result<String, CompileError> {
        match node {
            TemplateNode::Text(t) => Ok(self.gen_text(&t.value, parent)),
            TemplateNode::Element(el) => self.gen_element(el, parent),
        }
    }

    fn gen_text(&mut self, value: &str, parent: Option<&str>) -> String {
        if value.trim().is_empty() {
            return String::new();
        }
        let parent = parent.unwrap_or("target");

        if value.contains("{{") {
            let name = self.next_var("t");
            let expr = interpolate(value);
            return format!(
                "\nconst {name} = document.createTextNode(\"\");\n\
                 {parent}.appendChild({name});\n\
                 $watch(() => {{ {name}.textContent = `{expr}`; }});\n",
                name = name,
                parent = parent,
                expr = expr,
            );
        }

        let name = self.next_var("t");
        format!(
            "\nconst {name} = document.createTextNode(`{text}`);\n\
             {parent}.appendChild({name});\n",
            name = name,
            parent = parent,
            text = escape_template_literal(value),
        )
    }

    pub fn gen_element(
        &mut self,
        el: &ElementNode,
        parent: Option<&str>,
    ) -> Result<String, CompileError> {
        let name = self.next_var("el");

        let mut code = format!(
            "\nconst {name} = document.createElement(\"{tag}\");\n\
             {name}.setAttribute(\"{scope}\", \"\");\n",
            name = name,
            tag = el.tag,
            scope = self.scope_id,
        );

        for (key, value) in &el.attributes {
            if let Some(event) = key.strip_prefix('@') {
                if !self.allow_inline_handlers {
                    return Err(CompileError::new(
                        "INLINE_HANDLER_FORBIDDEN",
                        &format!(
                            "inline event handler @{} rejected by compile options",
                            event
                        ),
                        self.file_path,
                    ));
                }
                code.push_str(&format!(
                    "{name}.addEventListener(\"{event}\", ($event) => {{ {body} }});\n",
                    name = name,
                    event = event,
                    body = value,
                ));
            } else if key == "s-model" {
                code.push_str(&format!(
                    "\n$watch(() => {{ {name}.value = {accessor}(); }});\n\
                     {name}.addEventListener(\"input\", e => {accessor}(e.target.value));\n",
                    name = name,
                    accessor = value,
                ));
            } else {
                code.push_str(&format!(
                    "{name}.setAttribute(\"{key}\", `{value}`);\n",
                    name = name,
                    key = key,
                    value = value,
                ));
            }
        }

        if let Some(parent) = parent {
            code.push_str(&format!("{}.appendChild({});\n", parent, name));
        }

        for child in &el.children {
            code.push_str(&self.gen_node(child, Some(&name))?);
        }

        Ok(code)
    }
}
