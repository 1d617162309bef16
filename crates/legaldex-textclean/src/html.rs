// SPDX-License-Identifier: MIT OR Apache-2.0
//! Strips SGML tags, entities and loose attribute fragments (§4.1
//! `remove_html_content`).

use std::sync::OnceLock;

use regex::Regex;

static TAG_RE: OnceLock<Regex> = OnceLock::new();
static NUMERIC_ENTITY_RE: OnceLock<Regex> = OnceLock::new();
static HEX_ENTITY_RE: OnceLock<Regex> = OnceLock::new();
static ATTR_FRAGMENT_RE: OnceLock<Regex> = OnceLock::new();

/// Named entities recognised per §4.1.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&copy;", "(c)"),
    ("&reg;", "(r)"),
    ("&trade;", "(tm)"),
    ("&mdash;", "-"),
    ("&ndash;", "-"),
    ("&hellip;", "..."),
];

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"</?[a-zA-Z!][^>]*>").expect("valid tag regex"))
}

fn numeric_entity_re() -> &'static Regex {
    NUMERIC_ENTITY_RE.get_or_init(|| Regex::new(r"&#\d+;").expect("valid numeric entity regex"))
}

fn hex_entity_re() -> &'static Regex {
    HEX_ENTITY_RE.get_or_init(|| Regex::new(r"&#[xX][0-9a-fA-F]+;").expect("valid hex entity regex"))
}

/// Loose attribute fragments left over once their enclosing tag has been
/// stripped elsewhere in a mangled source (e.g. `bgcolor="#ffffff"`,
/// `style=color:red;`).
fn attr_fragment_re() -> &'static Regex {
    ATTR_FRAGMENT_RE.get_or_init(|| {
        Regex::new(r#"\b(?:bgcolor|style|align|valign|cellpadding|cellspacing)\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#)
            .expect("valid attribute fragment regex")
    })
}

/// Strip HTML/SGML tags, named/numeric/hex character entities, and loose
/// attribute fragments from `text`.
#[must_use]
pub fn strip_html(text: &str) -> String {
    let mut out = tag_re().replace_all(text, "").into_owned();
    out = attr_fragment_re().replace_all(&out, "").into_owned();
    for (entity, replacement) in NAMED_ENTITIES {
        out = out.replace(entity, replacement);
    }
    out = numeric_entity_re().replace_all(&out, "").into_owned();
    out = hex_entity_re().replace_all(&out, "").into_owned();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        let out = strip_html("<p>Order <b>granted</b></p>");
        assert_eq!(out, "Order granted");
    }

    #[test]
    fn replaces_named_entities() {
        let out = strip_html("Smith &amp; Jones&nbsp;LLP");
        assert_eq!(out, "Smith & Jones LLP");
    }

    #[test]
    fn strips_numeric_and_hex_entities() {
        let out = strip_html("copyright&#169;and&#x2122;mark");
        assert_eq!(out, "copyrightandmark");
    }

    #[test]
    fn strips_loose_attribute_fragments() {
        let out = strip_html(r#"bgcolor="#ffffff" the order was entered"#);
        assert_eq!(out.trim(), "the order was entered");
    }
}
