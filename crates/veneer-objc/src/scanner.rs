//! Line-oriented header scanner.
//!
//! Headers are walked one physical line at a time by a small state machine.
//! Class header lines and member declarations are handed to the token-level
//! parsers once they are complete; everything else (imports, typedefs,
//! protocol bodies, implementation blocks) is skipped.

use crate::doc::parse_doc_comment;
use crate::interface::{macro_only_line, parse_class_header};
use crate::lexer::{lex, Token};
use crate::signature::{parse_method, try_parse_property, ParseContext};
use miette::Result;
use veneer_common::{Diagnostic, SourceUnit};
use veneer_model::{ClassModel, ClassSet, DocComment, Extractor};

/// The non-comment state a comment returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Neutral,
    InClass,
    SkipBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Neutral,
    DocComment { resume: Region },
    InClass,
    /// `@protocol` and `@implementation` bodies, and classes whose header
    /// could not be parsed. Left at the next `@end`.
    SkipBlock,
}

impl From<Region> for State {
    fn from(region: Region) -> Self {
        match region {
            Region::Neutral => State::Neutral,
            Region::InClass => State::InClass,
            Region::SkipBlock => State::SkipBlock,
        }
    }
}

/// Extractor that reads headers as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExtractor;

impl TextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for TextExtractor {
    fn extract(&self, unit: &SourceUnit, classes: ClassSet) -> Result<ClassSet> {
        let mut scanner = Scanner::new(unit, classes);
        for (idx, line) in unit.content.lines().enumerate() {
            scanner.line(idx as u32 + 1, line);
        }
        Ok(scanner.finish())
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

/// A comment block being collected.
#[derive(Debug, Default)]
struct CommentBuffer {
    text: String,
    /// `///` comments end at the first line without the prefix.
    line_style: bool,
    /// Plain `/* */` comments are skipped, not parsed.
    keep: bool,
}

/// A member declaration that may span several lines.
#[derive(Debug)]
struct PendingMember {
    text: String,
    line: u32,
    doc: Option<DocComment>,
}

struct Scanner<'u> {
    unit: &'u SourceUnit,
    classes: ClassSet,
    state: State,
    ctx: ParseContext,
    comment: CommentBuffer,
    pending_doc: Option<DocComment>,
    /// Availability from a macro-only line right before `@interface`.
    pending_availability: Option<String>,
    current: Option<ClassModel>,
    class_line: u32,
    /// The `@interface` line while a wrapped protocol list may follow.
    header: Option<String>,
    member: Option<PendingMember>,
    ivar_depth: i32,
}

impl<'u> Scanner<'u> {
    fn new(unit: &'u SourceUnit, classes: ClassSet) -> Self {
        Self {
            unit,
            classes,
            state: State::Neutral,
            ctx: ParseContext::default(),
            comment: CommentBuffer::default(),
            pending_doc: None,
            pending_availability: None,
            current: None,
            class_line: 0,
            header: None,
            member: None,
            ivar_depth: 0,
        }
    }

    fn line(&mut self, lineno: u32, raw: &str) {
        let line = raw.trim();

        if let State::DocComment { resume } = self.state {
            if self.comment.line_style {
                if let Some(rest) = line.strip_prefix("///") {
                    self.comment.text.push('\n');
                    self.comment.text.push_str(rest);
                    return;
                }
                // The `///` run is over; this line belongs to the outer state.
                self.end_comment(resume);
            } else {
                self.comment.text.push('\n');
                let Some(close) = line.find("*/") else {
                    self.comment.text.push_str(line);
                    return;
                };
                self.comment.text.push_str(&line[..close + 2]);
                self.end_comment(resume);
                let rest = line[close + 2..].trim();
                if !rest.is_empty() {
                    self.line(lineno, rest);
                }
                return;
            }
        }

        if line.is_empty() {
            return;
        }

        match line {
            "NS_ASSUME_NONNULL_BEGIN" => {
                self.ctx.assume_nonnull = true;
                return;
            }
            "NS_ASSUME_NONNULL_END" => {
                self.ctx.assume_nonnull = false;
                return;
            }
            _ => {}
        }

        if let Some(rest) = self.begin_comment(line) {
            if !rest.is_empty() {
                self.line(lineno, rest);
            }
            return;
        }

        match self.state {
            State::Neutral => self.neutral(lineno, line),
            State::InClass => self.in_class(lineno, line),
            State::SkipBlock => {
                if line.starts_with("@end") {
                    self.state = State::Neutral;
                }
            }
            State::DocComment { .. } => {}
        }
    }

    /// Start a comment block if `line` opens one. Returns the text after a
    /// comment closed on the same line, or `None` when `line` is not a
    /// comment at all.
    fn begin_comment<'l>(&mut self, line: &'l str) -> Option<&'l str> {
        let (keep, line_style, body) = if let Some(body) = line.strip_prefix("///") {
            (true, true, body)
        } else if line.starts_with("/**") || line.starts_with("/*!") {
            (true, false, line)
        } else if line.starts_with("/*") {
            (false, false, line)
        } else if line.starts_with("//") || line.starts_with('#') {
            // `//` comments and preprocessor lines are transparent.
            return Some("");
        } else {
            return None;
        };

        let resume = match self.state {
            State::InClass => Region::InClass,
            State::SkipBlock => Region::SkipBlock,
            _ => Region::Neutral,
        };
        let close = if line_style { None } else { line[2..].find("*/").map(|i| i + 4) };
        let (body, rest) = match close {
            Some(end) => (&line[..end], line[end..].trim()),
            None => (body, ""),
        };
        self.comment = CommentBuffer {
            text: body.to_string(),
            line_style,
            keep,
        };
        if close.is_some() {
            self.end_comment(resume);
        } else {
            self.state = State::DocComment { resume };
        }
        Some(rest)
    }

    fn end_comment(&mut self, resume: Region) {
        let comment = std::mem::take(&mut self.comment);
        if comment.keep {
            self.pending_doc = Some(parse_doc_comment(&comment.text));
        }
        self.state = resume.into();
    }

    fn neutral(&mut self, lineno: u32, line: &str) {
        match first_directive(line).as_deref() {
            Some("@interface") => self.open_class(lineno, line),
            Some("@protocol") if !line.trim_end().ends_with(';') => {
                tracing::debug!(line = lineno, "skipping protocol body");
                self.state = State::SkipBlock;
            }
            Some("@implementation") => self.state = State::SkipBlock,
            _ => {
                if let Some(availability) = macro_only_line(line) {
                    if availability.is_some() {
                        self.pending_availability = availability;
                    }
                } else {
                    self.pending_doc = None;
                    self.pending_availability = None;
                }
            }
        }
    }

    fn open_class(&mut self, lineno: u32, line: &str) {
        let doc = self.pending_doc.take();
        let availability = self.pending_availability.take();

        let header = match parse_class_header(line) {
            Ok(header) => header,
            Err(err) => {
                self.warn(lineno, err.to_string());
                self.state = State::SkipBlock;
                return;
            }
        };

        tracing::debug!(
            class = %header.name,
            category = header.category.as_deref().unwrap_or(""),
            line = lineno,
            "entering interface"
        );

        let mut class = ClassModel::new(header.name);
        class.superclass = header.superclass;
        class.protocols.extend(header.protocols);
        class.availability = header.availability.or(availability);
        if let Some(doc) = doc {
            class.doc = doc.description;
        }

        self.current = Some(class);
        self.class_line = lineno;
        self.header = Some(line.to_string());
        self.ivar_depth = brace_balance(line);
        self.state = State::InClass;
    }

    /// A protocol list wrapped onto the line after `@interface`.
    fn continue_header(&mut self, lineno: u32, line: &str) {
        let Some(mut header) = self.header.take() else {
            return;
        };
        header.push(' ');
        header.push_str(line);
        match parse_class_header(&header) {
            Ok(parsed) => {
                if let Some(class) = &mut self.current {
                    class.protocols.extend(parsed.protocols);
                    if class.availability.is_none() {
                        class.availability = parsed.availability;
                    }
                }
                self.header = Some(header);
            }
            Err(err) => self.warn(lineno, err.to_string()),
        }
        self.ivar_depth = brace_balance(line);
    }

    fn in_class(&mut self, lineno: u32, line: &str) {
        if self.ivar_depth > 0 {
            self.ivar_depth += brace_balance(line);
            return;
        }
        if line.starts_with('<') && self.header.is_some() {
            self.continue_header(lineno, line);
            return;
        }
        self.header = None;

        let starts_member = is_member_start(line);
        if self.member.is_some() {
            if starts_member || line.starts_with("@end") {
                // The previous declaration never saw its `;`.
                self.flush_member();
            } else {
                if let Some(member) = &mut self.member {
                    member.text.push(' ');
                    member.text.push_str(line);
                }
                if line.contains(';') {
                    self.flush_member();
                }
                return;
            }
        }

        if line.starts_with("@end") {
            self.close_class();
        } else if starts_member {
            self.member = Some(PendingMember {
                text: line.to_string(),
                line: lineno,
                doc: self.pending_doc.take(),
            });
            if line.contains(';') {
                self.flush_member();
            }
        } else if line.starts_with('{') {
            self.ivar_depth = brace_balance(line);
        } else if !matches!(line, "@optional" | "@required") && macro_only_line(line).is_none() {
            self.pending_doc = None;
        }
    }

    fn flush_member(&mut self) {
        let Some(PendingMember { text, line, doc }) = self.member.take() else {
            return;
        };
        let doc = doc.unwrap_or_default();

        if text.starts_with("@property") {
            match try_parse_property(&text, self.ctx) {
                Ok(mut property) => {
                    property.apply_doc(&doc);
                    if let Some(class) = &mut self.current {
                        class.properties.push(property);
                    }
                }
                Err(err) => self.warn(line, err.to_string()),
            }
        } else {
            match parse_method(&text) {
                Ok(mut method) => {
                    method.apply_doc(&doc);
                    if let Some(class) = &mut self.current {
                        class.methods.push(method);
                    }
                }
                Err(err) => self.warn(line, err.to_string()),
            }
        }
    }

    fn close_class(&mut self) {
        if let Some(class) = self.current.take() {
            tracing::debug!(
                class = %class.name,
                members = class.member_count(),
                "closing interface"
            );
            self.classes.insert(class);
        }
        self.pending_doc = None;
        self.state = State::Neutral;
    }

    fn warn(&mut self, line: u32, message: String) {
        let mut diagnostic = Diagnostic::warning(message).at(&self.unit.path, line);
        if let Some(source) = self.unit.line(line) {
            diagnostic = diagnostic.with_help(format!("in `{}`", source.trim()));
        }
        self.classes.warn(diagnostic);
    }

    fn finish(mut self) -> ClassSet {
        self.flush_member();
        if let Some(class) = self.current.take() {
            let message = format!("`@interface {}` is missing its `@end`", class.name);
            let line = self.class_line;
            self.classes.insert(class);
            self.warn(line, message);
        }
        self.classes
    }
}

fn first_directive(line: &str) -> Option<String> {
    lex(line).into_iter().find_map(|tok| match tok {
        Token::Directive(name) => Some(name.to_string()),
        _ => None,
    })
}

fn is_member_start(line: &str) -> bool {
    line.starts_with("@property") || line.starts_with('-') || line.starts_with('+')
}

fn brace_balance(line: &str) -> i32 {
    line.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}
