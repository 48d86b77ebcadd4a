//! Documentation comment parsing.
//!
//! Handles `/** ... */`, `/*! ... */` and `///` blocks, with HeaderDoc-style
//! tags written either one per line or all on a single line:
//!
//! ```text
//! /** Adds two values. @param x the x value @param y the y value @return the sum */
//! ```

use veneer_model::DocComment;

/// Where untagged text is currently accumulating.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    Description,
    Param(String),
    Returns,
    Ignored,
}

/// Parse a documentation block. Missing tags produce empty fields; this
/// never fails.
pub fn parse_doc_comment(block: &str) -> DocComment {
    let mut doc = DocComment::default();
    let mut section = Section::Description;

    for line in block.lines().map(clean_line).filter(|l| !l.is_empty()) {
        let mut segments = split_tags(&line).into_iter();

        // Text before the first tag continues the current section.
        if let Some(prefix) = segments.next() {
            append(&mut doc, &section, prefix);
        }

        for segment in segments {
            let (tag, rest) = split_word(segment);
            section = match tag {
                "param" => {
                    let (name, text) = split_word(rest);
                    let name = name.trim_end_matches(':').to_string();
                    if name.is_empty() {
                        Section::Ignored
                    } else {
                        doc.params.entry(name.clone()).or_default();
                        let section = Section::Param(name);
                        append(&mut doc, &section, text);
                        section
                    }
                }
                "return" | "returns" | "result" => {
                    append(&mut doc, &Section::Returns, rest);
                    Section::Returns
                }
                "brief" | "abstract" | "discussion" => {
                    append(&mut doc, &Section::Description, rest);
                    Section::Description
                }
                _ => Section::Ignored,
            };
        }
    }

    doc
}

/// Strip comment delimiters and leading asterisks.
fn clean_line(line: &str) -> String {
    let mut line = line.trim();
    for prefix in ["/**", "/*!", "/*", "///", "//!", "//"] {
        if let Some(rest) = line.strip_prefix(prefix) {
            line = rest;
            break;
        }
    }
    let line = line.trim().strip_suffix("*/").unwrap_or(line.trim());
    line.trim().trim_start_matches('*').trim().to_string()
}

/// Doxygen block commands recognised after a backslash. Any other `\` is
/// prose, as are inline commands such as `\c`.
const BACKSLASH_TAGS: &[&str] = &[
    "param", "return", "returns", "result", "brief", "abstract", "discussion", "details",
    "see", "sa", "note", "warning", "deprecated", "since", "throws", "code", "endcode", "remark",
];

/// Split a line at every `@tag` (or known `\tag`) that starts a word. The
/// first element is the untagged prefix, which may be empty.
fn split_tags(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut prev_is_space = true;
    for (i, c) in line.char_indices() {
        let tag = c == '@' || (c == '\\' && is_backslash_tag(&line[i + 1..]));
        if tag && prev_is_space {
            segments.push(&line[start..i]);
            start = i + 1;
        }
        prev_is_space = c.is_whitespace();
    }
    segments.push(&line[start..]);
    segments
}

fn is_backslash_tag(text: &str) -> bool {
    let word = text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .next()
        .unwrap_or_default();
    BACKSLASH_TAGS.contains(&word)
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], text[end..].trim_start()),
        None => (text, ""),
    }
}

fn append(doc: &mut DocComment, section: &Section, text: &str) {
    let target = match section {
        Section::Description => &mut doc.description,
        Section::Returns => &mut doc.returns,
        Section::Param(name) => doc.params.entry(name.clone()).or_default(),
        Section::Ignored => return,
    };
    for word in text.split_whitespace() {
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_tags() {
        let doc = parse_doc_comment(
            "/**\n * Adds two values.\n *\n * @param x the x value\n * @return the sum\n */",
        );
        assert_eq!(doc.description, "Adds two values.");
        assert_eq!(doc.param("x"), Some("the x value"));
        assert_eq!(doc.returns, "the sum");
    }

    #[test]
    fn single_line_layout_matches_multi_line() {
        let inline = parse_doc_comment("/** Adds two values. @param x the x value @return the sum */");
        let multi = parse_doc_comment(
            "/**\n * Adds two values.\n * @param x the x value\n * @return the sum\n */",
        );
        assert_eq!(inline, multi);
        assert_eq!(inline.params.len(), 1);
    }

    #[test]
    fn parameter_text_continues_across_lines() {
        let doc = parse_doc_comment(
            "/**\n * @param frame The frame rectangle\n *   in superview coordinates.\n * @param flags Options.\n */",
        );
        assert_eq!(doc.param("frame"), Some("The frame rectangle in superview coordinates."));
        assert_eq!(doc.param("flags"), Some("Options."));
        assert_eq!(doc.description, "");
    }

    #[test]
    fn untagged_lines_before_tags_join_the_description() {
        let doc = parse_doc_comment("/// Draws the view.\n/// Call from the main thread.\n");
        assert_eq!(doc.description, "Draws the view. Call from the main thread.");
        assert!(doc.params.is_empty());
        assert!(doc.returns.is_empty());
    }

    #[test]
    fn headerdoc_tags() {
        let doc = parse_doc_comment(
            "/*!\n @abstract Returns the title.\n @discussion Empty when unset.\n @result The title.\n @see setTitle:\n    ignored text\n */",
        );
        assert_eq!(doc.description, "Returns the title. Empty when unset.");
        assert_eq!(doc.returns, "The title.");
    }

    #[test]
    fn no_tags_and_empty_blocks() {
        assert_eq!(parse_doc_comment("/** */"), DocComment::default());
        assert_eq!(parse_doc_comment(""), DocComment::default());
        assert!(parse_doc_comment("/** Contact me@example.com */").params.is_empty());
    }

    #[test]
    fn doxygen_commands_and_stray_backslashes() {
        let doc = parse_doc_comment(
            "/**\n * Joins a \\ b. Pass \\c nil to reset.\n * \\param sep The separator.\n * \\return The joined string.\n */",
        );
        assert_eq!(doc.description, "Joins a \\ b. Pass \\c nil to reset.");
        assert_eq!(doc.param("sep"), Some("The separator."));
        assert_eq!(doc.returns, "The joined string.");
    }

    #[test]
    fn param_name_with_colon() {
        let doc = parse_doc_comment("/** @param sender: the control */");
        assert_eq!(doc.param("sender"), Some("the control"));
    }
}
