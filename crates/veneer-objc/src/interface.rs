//! `@interface` header lines.

use crate::cursor::{split_commas, TokenCursor};
use crate::error::{Result, SignatureError};
use crate::lexer::{lex, render, Token};
use crate::signature::{is_availability_macro, is_macro_name, normalize_availability};
use smol_str::SmolStr;

/// The parts of an `@interface` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub name: SmolStr,
    /// `Some("")` for a class extension `@interface Foo ()`.
    pub category: Option<SmolStr>,
    pub superclass: Option<SmolStr>,
    pub protocols: Vec<SmolStr>,
    pub availability: Option<String>,
}

/// Parse a line such as
/// `@interface NSArray<ObjectType> : NSObject <NSCopying> API_AVAILABLE(macos(10.0))`.
///
/// Macros may precede the directive. Parsing stops at an instance-variable
/// block's `{`.
pub fn parse_class_header(line: &str) -> Result<ClassHeader> {
    let tokens = lex(line);
    let mut cursor = TokenCursor::new(&tokens);

    let leading = macro_run(&mut cursor);
    if cursor.bump() != Some(Token::Directive("@interface")) {
        return Err(SignatureError::class_header(line, "expected `@interface`"));
    }
    let name = cursor
        .eat_identifier()
        .ok_or_else(|| SignatureError::class_header(line, "missing class name"))?;

    let mut protocols = Vec::new();
    let mut type_params: Vec<&str> = Vec::new();

    // `Name<...>` is a generic parameter list when a category or superclass
    // follows, otherwise it is the protocol list of a root class.
    if cursor.peek() == Some(Token::Less) {
        let inner = angle_group(line, &mut cursor)?;
        if matches!(cursor.peek(), Some(Token::LeftParen | Token::Colon)) {
            type_params = inner.iter().filter_map(Token::identifier).collect();
        } else {
            protocols = protocol_list(line, inner)?;
        }
    }

    let mut category = None;
    if cursor.peek() == Some(Token::LeftParen) {
        let inner = match cursor.paren_group() {
            Some((inner, true)) => inner,
            _ => return Err(SignatureError::class_header(line, "unterminated category")),
        };
        category = Some(match inner {
            [] => SmolStr::default(),
            [Token::Identifier(name)] => SmolStr::new(name),
            _ => return Err(SignatureError::class_header(line, "malformed category name")),
        });
    }

    let mut superclass = None;
    if cursor.eat(Token::Colon) {
        let parent = cursor
            .eat_identifier()
            .ok_or_else(|| SignatureError::class_header(line, "missing superclass name"))?;
        superclass = Some(SmolStr::new(parent));
        // Superclass type arguments (`: NSArray<ObjectType>`) mention the
        // class's own type parameters or a pointer; a protocol list does not.
        if cursor.peek() == Some(Token::Less) {
            let inner = angle_group(line, &mut cursor)?;
            let type_args = inner.iter().any(|t| {
                *t == Token::Star || t.identifier().is_some_and(|id| type_params.contains(&id))
            });
            if !type_args {
                protocols.extend(protocol_list(line, inner)?);
            }
        }
    }

    if cursor.peek() == Some(Token::Less) {
        let inner = angle_group(line, &mut cursor)?;
        protocols.extend(protocol_list(line, inner)?);
    }

    let trailing = macro_run(&mut cursor);

    match cursor.peek() {
        None | Some(Token::LeftBrace) => Ok(ClassHeader {
            name: SmolStr::new(name),
            category,
            superclass,
            protocols,
            availability: leading.or(trailing),
        }),
        Some(other) => Err(SignatureError::class_header(line, format!("unexpected `{}`", other))),
    }
}

/// If `line` holds nothing but macro invocations, return the availability
/// it carries (if any).
pub(crate) fn macro_only_line(line: &str) -> Option<Option<String>> {
    let tokens = lex(line);
    if tokens.is_empty() {
        return None;
    }
    let mut cursor = TokenCursor::new(&tokens);
    let availability = macro_run(&mut cursor);
    cursor.at_end().then_some(availability)
}

/// Consume `MACRO` and `MACRO(...)` tokens, returning the first availability
/// call.
fn macro_run(cursor: &mut TokenCursor<'_, '_>) -> Option<String> {
    let mut availability = None;
    while let Some(Token::Identifier(name)) = cursor.peek() {
        if !is_macro_name(name) {
            break;
        }
        cursor.bump();
        if cursor.peek() == Some(Token::LeftParen) {
            let (inner, _) = cursor.paren_group().unwrap_or_default();
            if availability.is_none() && is_availability_macro(name) {
                let call = format!("{}({})", name, render(inner));
                availability = Some(normalize_availability(&call));
            }
        }
    }
    availability
}

fn angle_group<'t, 's>(line: &str, cursor: &mut TokenCursor<'t, 's>) -> Result<&'t [Token<'s>]> {
    match cursor.group(Token::Less, Token::Greater) {
        Some((inner, true)) => Ok(inner),
        _ => Err(SignatureError::class_header(line, "unterminated `<`")),
    }
}

fn protocol_list(line: &str, tokens: &[Token<'_>]) -> Result<Vec<SmolStr>> {
    split_commas(tokens)
        .into_iter()
        .map(|part| match part {
            [Token::Identifier(name)] => Ok(SmolStr::new(name)),
            _ => Err(SignatureError::class_header(line, "malformed protocol list")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_subclass() {
        let header = parse_class_header("@interface NSButton : NSControl").unwrap();
        assert_eq!(header.name, "NSButton");
        assert_eq!(header.superclass.as_deref(), Some("NSControl"));
        assert!(header.category.is_none());
        assert!(header.protocols.is_empty());
    }

    #[test]
    fn generics_protocols_and_availability() {
        let header = parse_class_header(
            "@interface NSArray<__covariant ObjectType> : NSObject <NSCopying, NSSecureCoding> API_AVAILABLE(macos(10.0))",
        )
        .unwrap();
        assert_eq!(header.name, "NSArray");
        assert_eq!(header.superclass.as_deref(), Some("NSObject"));
        assert_eq!(header.protocols, vec![SmolStr::new("NSCopying"), SmolStr::new("NSSecureCoding")]);
        assert_eq!(header.availability.as_deref(), Some("API_AVAILABLE(macos(10.0))"));
    }

    #[test]
    fn superclass_type_arguments_are_not_protocols() {
        let header = parse_class_header(
            "@interface NSMutableArray<ObjectType> : NSArray<ObjectType> <NSSecureCoding>",
        )
        .unwrap();
        assert_eq!(header.superclass.as_deref(), Some("NSArray"));
        assert_eq!(header.protocols, vec![SmolStr::new("NSSecureCoding")]);
    }

    #[test]
    fn categories_and_extensions() {
        let header = parse_class_header("@interface NSView (NSDrawing)").unwrap();
        assert_eq!(header.category.as_deref(), Some("NSDrawing"));
        assert!(header.superclass.is_none());

        let header = parse_class_header("@interface NSMutableArray<ObjectType> (Sorting) <NSFastEnumeration>").unwrap();
        assert_eq!(header.name, "NSMutableArray");
        assert_eq!(header.category.as_deref(), Some("Sorting"));
        assert_eq!(header.protocols, vec![SmolStr::new("NSFastEnumeration")]);

        assert_eq!(parse_class_header("@interface Foo ()").unwrap().category.as_deref(), Some(""));
    }

    #[test]
    fn root_class_protocols_and_ivar_brace() {
        let header = parse_class_header("@interface NSObject <NSObject> {").unwrap();
        assert_eq!(header.protocols, vec![SmolStr::new("NSObject")]);
        assert!(header.superclass.is_none());
    }

    #[test]
    fn leading_macros() {
        let header =
            parse_class_header("NS_SWIFT_UI_ACTOR API_AVAILABLE(macos(11.0)) @interface NSFoo : NSBar").unwrap();
        assert_eq!(header.name, "NSFoo");
        assert_eq!(header.availability.as_deref(), Some("API_AVAILABLE(macos(11.0))"));
    }

    #[test]
    fn malformed_headers() {
        for line in [
            "@interface",
            "@interface : NSObject",
            "@interface Foo : ",
            "@interface Foo (A B)",
            "@interface Foo : Bar <P",
            "@interface Foo : Bar baz",
        ] {
            assert!(
                matches!(parse_class_header(line), Err(SignatureError::MalformedClassHeader { .. })),
                "{line}"
            );
        }
    }

    #[test]
    fn macro_only_lines() {
        assert_eq!(
            macro_only_line("API_AVAILABLE(macos(10.15)) NS_SWIFT_UI_ACTOR"),
            Some(Some("API_AVAILABLE(macos(10.15))".to_string()))
        );
        assert_eq!(macro_only_line("NS_REFINED_FOR_SWIFT"), Some(None));
        assert_eq!(macro_only_line("typedef NSInteger NSFoo;"), None);
        assert_eq!(macro_only_line(""), None);
    }
}
