//! Compilation entry point: one component source file in, one JavaScript
//! module out.
//!
//! Assembly order inside the emitted module is fixed: the runtime import,
//! hoisted user imports, the scoped-style injection, then the exported
//! component function holding the user script followed by the lowered
//! template.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codegen::{contains_slot_tag, Codegen};
use crate::parse::{parse_component, split_script};
use crate::scope::{generate_scope_id, scope_css};

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR TYPE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileError {
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl CompileError {
    pub fn new(code: &str, message: &str, file: &str) -> Self {
        CompileError {
            code: code.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            line: 0,
            column: 0,
        }
    }

    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} ({}:{}:{})",
            self.code, self.message, self.file, self.line, self.column
        )
    }
}

impl std::error::Error for CompileError {}

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS AND RESULT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Whether `@event` attribute values may carry inline handler bodies.
    /// Template sources are trusted by default; integrations compiling
    /// third-party input can turn this off and get a compile error on
    /// the first inline handler instead of emitted code.
    pub allow_inline_handlers: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            allow_inline_handlers: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    /// The emitted JavaScript module.
    pub code: String,
    /// Source maps are not produced; the field exists so callers bind a
    /// stable result shape.
    pub map: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

/// Compile one component source. `id` is the source identifier (usually
/// the file path) used in diagnostics.
pub fn compile(source: &str, id: &str) -> Result<CompileResult, CompileError> {
    compile_with_options(source, id, &CompileOptions::default())
}

pub fn compile_with_options(
    source: &str,
    id: &str,
    options: &CompileOptions,
) -> Result<CompileResult, CompileError> {
    let parsed = parse_component(source, id)?;

    let scope_id = generate_scope_id();

    let scoped_css = parsed
        .style
        .as_deref()
        .map(|css| scope_css(css, &scope_id))
        .unwrap_or_default();

    let (import_lines, script_body) = parsed
        .script
        .as_deref()
        .map(split_script)
        .unwrap_or_else(|| (Vec::new(), String::new()));

    let has_slots = parsed
        .root
        .as_ref()
        .map(contains_slot_tag)
        .unwrap_or(false);

    let template_body = match &parsed.root {
        Some(root) => {
            let mut cg = Codegen::new(&scope_id, id, options.allow_inline_handlers);
            cg.gen_element(root, Some("target"))?
        }
        None => String::new(),
    };

    let style_injected = if scoped_css.is_empty() {
        String::new()
    } else {
        format!(
            "\nconst _s = document.createElement(\"style\");\n\
             _s.textContent = `{}`;\n\
             document.head.appendChild(_s);\n",
            scoped_css
        )
    };

    let user_imports = if import_lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", import_lines.join("\n"))
    };

    let component_params = if has_slots {
        "(target, _slots = {}, $props = {})"
    } else {
        "(target)"
    };

    let code = format!(
        "\nimport {{$signal, $watch, $onMount, $reconcile, $computed, $signals, $component}} from \"@sjs/core\";\n\
         {user_imports}\
         {style_injected}\n\
         export default function {component_params} {{\n\
         {script_body}\n\
         {template_body}\n\
         if(typeof el0 !== 'undefined') target.replaceChildren(el0);\n\
         }}\n",
        user_imports = user_imports,
        style_injected = style_injected,
        component_params = component_params,
        script_body = script_body,
        template_body = template_body,
    );

    Ok(CompileResult { code, map: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_runtime_import_and_default_export() {
        let result = compile("<div>hi</div>", "hi.sjs").unwrap();
        assert!(result.code.contains(
            "import {$signal, $watch, $onMount, $reconcile, $computed, $signals, $component} from \"@sjs/core\";"
        ));
        assert!(result.code.contains("export default function (target) {"));
        assert!(result
            .code
            .contains("if(typeof el0 !== 'undefined') target.replaceChildren(el0);"));
        assert!(result.map.is_none());
    }

    #[test]
    fn script_body_precedes_template_statements() {
        let result = compile(
            "<script>\nlet count = $signal(0);\n</script>\n<p>{{count}}</p>",
            "counter.sjs",
        )
        .unwrap();
        let script_pos = result.code.find("let count = $signal(0);").unwrap();
        let template_pos = result.code.find("createElement(\"p\")").unwrap();
        assert!(script_pos < template_pos);
    }

    #[test]
    fn user_imports_hoisted_above_the_component_function() {
        let result = compile(
            "<script>\nimport helper from \"./helper.js\";\nhelper();\n</script>\n<div></div>",
            "imp.sjs",
        )
        .unwrap();
        let import_pos = result.code.find("import helper from \"./helper.js\";").unwrap();
        let export_pos = result.code.find("export default function").unwrap();
        assert!(import_pos < export_pos);
        // not duplicated inside the body
        assert_eq!(result.code.matches("import helper").count(), 1);
    }

    #[test]
    fn style_region_injected_scoped_and_stamped() {
        let result = compile(
            "<style>button { color: red; }</style>\n<button>go</button>",
            "styled.sjs",
        )
        .unwrap();
        assert!(result.code.contains("document.head.appendChild(_s);"));
        assert!(result.code.contains("button[data-s-"));
        // the created element carries the same scope attribute
        let scoped_start = result.code.find("button[data-s-").unwrap();
        let scope_id = &result.code[scoped_start + 7..scoped_start + 7 + 13];
        assert!(result
            .code
            .contains(&format!("el0.setAttribute(\"{}\", \"\");", scope_id)));
    }

    #[test]
    fn no_style_region_means_no_injection() {
        let result = compile("<div></div>", "plain.sjs").unwrap();
        assert!(!result.code.contains("document.head.appendChild"));
    }

    #[test]
    fn slot_templates_get_the_extended_signature() {
        let result = compile("<div><slot></slot></div>", "slotted.sjs").unwrap();
        assert!(result
            .code
            .contains("export default function (target, _slots = {}, $props = {}) {"));
    }

    #[test]
    fn template_less_source_still_compiles() {
        let result = compile("<script>let x = 1;</script>", "bare.sjs").unwrap();
        assert!(result.code.contains("let x = 1;"));
        assert!(!result.code.contains("createElement"));
        // the guard keeps the module valid with no el0 in scope
        assert!(result.code.contains("typeof el0 !== 'undefined'"));
    }

    #[test]
    fn strict_options_propagate_handler_rejection() {
        let options = CompileOptions {
            allow_inline_handlers: false,
        };
        let err = compile_with_options(
            r#"<button @click="boom()">x</button>"#,
            "strict.sjs",
            &options,
        )
        .unwrap_err();
        assert_eq!(err.code, "INLINE_HANDLER_FORBIDDEN");
        assert_eq!(err.file, "strict.sjs");
        assert!(err.to_string().contains("INLINE_HANDLER_FORBIDDEN"));
    }

    #[test]
    fn each_compile_mints_a_fresh_scope() {
        let a = compile("<style>p { x: y; }</style><p>a</p>", "a.sjs").unwrap();
        let b = compile("<style>p { x: y; }</style><p>b</p>", "b.sjs").unwrap();
        let scope_of = |code: &str| {
            let start = code.find("p[data-s-").unwrap();
            code[start + 2..start + 2 + 13].to_string()
        };
        assert_ne!(scope_of(&a.code), scope_of(&b.code));
    }
}
