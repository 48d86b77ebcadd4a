//! Post-emission normalization of generated modules.
//!
//! [`reflow`] moves every overload signature (with its JSDoc) directly above
//! the implementation it belongs to and replaces incomplete markers with a
//! throwing stub. It works on text, so it can also repair files that were
//! generated earlier or edited by hand. It never fails: anything it does not
//! recognise is passed through untouched.

use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::LazyLock;

static RE_SIGNATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^  (static )?([A-Za-z_$][\w$]*)\(.*\)(?:: .+)?;$").unwrap());
static RE_IMPLEMENTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^  (static )?([A-Za-z_$][\w$]*)\(.*\)(?:: .+)? \{$").unwrap());
static RE_IMPLEMENTATION_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^  \}$").unwrap());
static RE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^  // @veneer-incomplete (static )?([A-Za-z_$][\w$]*)$").unwrap()
});
static RE_DOC_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^  /\*\*").unwrap());
static RE_DOC_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*/\s*$").unwrap());

/// `(is static, member name)`
type Key = (bool, String);

#[derive(Debug)]
enum Item<'s> {
    Line(&'s str),
    /// Doc lines followed by the signature line.
    Signature { key: Key, lines: Vec<&'s str> },
    /// Doc lines, the opening line, the body and the closing brace.
    Implementation { key: Key, lines: Vec<&'s str> },
    Marker { key: Key, doc: Vec<&'s str> },
}

/// Reflow one generated module. Idempotent.
pub fn reflow(source: &str) -> String {
    let items = split_items(source);

    let mut with_impl: FxHashMap<Key, Vec<&str>> = FxHashMap::default();
    for item in &items {
        if let Item::Implementation { key, .. } = item {
            with_impl.entry(key.clone()).or_default();
        }
    }
    for item in &items {
        if let Item::Signature { key, lines } = item {
            if let Some(moved) = with_impl.get_mut(key) {
                moved.extend(lines);
            }
        }
    }

    let mut out: Vec<String> = Vec::new();
    for item in items {
        match item {
            Item::Line(line) => out.push(line.to_string()),
            Item::Signature { key, lines } => {
                if !with_impl.contains_key(&key) {
                    out.extend(lines.iter().map(|l| l.to_string()));
                }
            }
            Item::Implementation { key, lines } => {
                if let Some(signatures) = with_impl.get_mut(&key) {
                    out.extend(signatures.drain(..).map(str::to_string));
                }
                out.extend(lines.iter().map(|l| l.to_string()));
            }
            Item::Marker { key: (is_static, name), doc } => {
                tracing::debug!(member = %name, "filling incomplete marker");
                out.extend(doc.iter().map(|l| l.to_string()));
                let prefix = if is_static { "static " } else { "" };
                out.push(format!("  {}{}(...args: unknown[]): unknown {{", prefix, name));
                out.push(format!(
                    "    throw new Error(\"{}: declaration could not be bound\");",
                    name
                ));
                out.push("  }".to_string());
            }
        }
    }

    let mut result = tidy_blank_lines(&out).join("\n");
    if source.ends_with('\n') {
        result.push('\n');
    }
    result
}

fn split_items(source: &str) -> Vec<Item<'_>> {
    let lines: Vec<&str> = source.lines().collect();
    let mut items = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let mut doc_end = i;
        if RE_DOC_START.is_match(lines[i]) {
            match (i..lines.len()).find(|&j| RE_DOC_END.is_match(lines[j])) {
                Some(end) => doc_end = end + 1,
                None => {
                    items.extend(lines[i..].iter().copied().map(Item::Line));
                    break;
                }
            }
        }

        let Some(&head) = lines.get(doc_end) else {
            items.extend(lines[i..].iter().copied().map(Item::Line));
            break;
        };
        let doc = &lines[i..doc_end];

        if let Some(caps) = RE_SIGNATURE.captures(head) {
            let mut member = doc.to_vec();
            member.push(head);
            items.push(Item::Signature { key: key(&caps), lines: member });
            i = doc_end + 1;
        } else if let Some(caps) = RE_MARKER.captures(head) {
            items.push(Item::Marker { key: key(&caps), doc: doc.to_vec() });
            i = doc_end + 1;
        } else if let Some(caps) = RE_IMPLEMENTATION.captures(head) {
            match (doc_end + 1..lines.len()).find(|&j| RE_IMPLEMENTATION_END.is_match(lines[j])) {
                Some(end) => {
                    items.push(Item::Implementation {
                        key: key(&caps),
                        lines: lines[i..=end].to_vec(),
                    });
                    i = end + 1;
                }
                None => {
                    // Unterminated body: leave the rest alone.
                    items.extend(lines[i..].iter().copied().map(Item::Line));
                    break;
                }
            }
        } else if doc_end > i {
            // A doc block that belongs to something else (a getter, the class).
            items.extend(doc.iter().copied().map(Item::Line));
            i = doc_end;
        } else {
            items.push(Item::Line(head));
            i += 1;
        }
    }

    items
}

fn key(caps: &regex::Captures<'_>) -> Key {
    (caps.get(1).is_some(), caps[2].to_string())
}

/// Collapse blank-line runs left behind by moved signatures, and drop blank
/// lines right after an opening brace or right before a closing one.
fn tidy_blank_lines(lines: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            let prev = out.last().map(|l| l.trim_end());
            let after_blank_or_brace = prev.is_some_and(|p| p.is_empty() || p.ends_with('{'));
            let before_close = lines.get(i + 1).is_some_and(|next| next.as_str() == "}");
            if after_blank_or_brace || before_close {
                continue;
            }
        }
        out.push(line.clone());
    }
    out
}
