//! Style scoping.
//!
//! Each compilation mints a random scope identifier. The identifier is
//! stamped as a value-less attribute on every element the template
//! creates, and every selector in the component's style region gains an
//! attribute-selector suffix for it, so the styles can only ever match
//! the component's own elements.

use lazy_static::lazy_static;
use rand::Rng;
use regex::{Captures, Regex};

/// Alphabet of the random suffix: lowercase base-36.
const SCOPE_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Mint a fresh scope identifier, e.g. `data-s-k3x09a`.
pub fn generate_scope_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| SCOPE_CHARSET[rng.gen_range(0..SCOPE_CHARSET.len())] as char)
        .collect();
    format!("data-s-{}", suffix)
}

lazy_static! {
    /// One rule: selector text followed by a brace-delimited declaration
    /// block. Nested blocks are out of scope for this rewriter.
    static ref RULE_RE: Regex = Regex::new(r"([^{]+)(\{[^}]+\})").unwrap();
}

/// Rewrite every selector in `css` to carry `[scope_id]`. At-rules and
/// `:root` rules pass through untouched, as does anything with an empty
/// selector. Comma lists are suffixed per branch.
pub fn scope_css(css: &str, scope_id: &str) -> String {
    RULE_RE
        .replace_all(css, |caps: &Captures| {
            let selector = &caps[1];
            let content = &caps[2];
            let trimmed = selector.trim();
            if trimmed.is_empty() || trimmed.starts_with('@') || trimmed.starts_with(":root") {
                return caps[0].to_string();
            }
            let scoped = selector
                .split(',')
                .map(|part| {
                    let p = part.trim();
                    if p.is_empty() {
                        part.to_string()
                    } else {
                        format!("{}[{}]", p, scope_id)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} {}", scoped, content)
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_id_shape() {
        let id = generate_scope_id();
        assert!(id.starts_with("data-s-"));
        assert_eq!(id.len(), "data-s-".len() + 6);
        assert!(id["data-s-".len()..]
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn scope_ids_vary() {
        // 36^6 possibilities; two consecutive collisions would be a bug.
        let (a, b) = (generate_scope_id(), generate_scope_id());
        assert!(a != b || generate_scope_id() != a);
    }

    #[test]
    fn simple_selector_gains_attribute_suffix() {
        let out = scope_css("button { color: red; }", "data-s-abc123");
        assert_eq!(out, "button[data-s-abc123] { color: red; }");
    }

    #[test]
    fn comma_list_suffixed_per_branch() {
        let out = scope_css("h1, .title { margin: 0; }", "data-s-x");
        assert_eq!(out, "h1[data-s-x], .title[data-s-x] { margin: 0; }");
    }

    #[test]
    fn at_rules_and_root_pass_through() {
        let css = "@keyframes spin { from: 0; }";
        assert_eq!(scope_css(css, "data-s-x"), css);

        let css = ":root { --accent: blue; }";
        assert_eq!(scope_css(css, "data-s-x"), css);
    }

    #[test]
    fn rescoping_adds_exactly_one_suffix_per_pass() {
        let once = scope_css("button { color: red; }\n@media x { y }", "data-s-one");
        let twice = scope_css(&once, "data-s-two");
        assert_eq!(
            twice,
            "button[data-s-one][data-s-two] { color: red; }\n@media x { y }"
        );
    }

    #[test]
    fn multiple_rules_each_scoped() {
        let out = scope_css("a { color: blue; }\np { margin: 0; }", "data-s-y");
        assert!(out.contains("a[data-s-y] { color: blue; }"));
        assert!(out.contains("p[data-s-y] { margin: 0; }"));
    }
}
