//! Method and property declaration parsing.
//!
//! A declaration is lexed and then walked by a small recursive-descent
//! parser. Methods:
//!
//! ```text
//! (+|-) (ReturnType) base [: (Type) name { label: (Type) name }] [, ...] { MACRO[(...)] } [;]
//! ```
//!
//! Properties:
//!
//! ```text
//! @property [(attr, attr=value, ...)] Type name { MACRO[(...)] } [;]
//! ```

use crate::cursor::{split_commas, TokenCursor};
use crate::error::{Result, SignatureError};
use crate::lexer::{lex, render, Token};
use smol_str::SmolStr;
use veneer_model::{MethodModel, ParameterModel, PropertyModel};

/// Markers that make a type nullable.
const NULLABLE_MARKERS: &[&str] = &["nullable", "_Nullable", "__nullable", "null_resettable"];

/// Markers that explicitly rule out null.
const NONNULL_MARKERS: &[&str] = &["nonnull", "_Nonnull", "__nonnull"];

/// Tokens dropped from canonical type strings.
const TYPE_QUALIFIERS: &[&str] = &[
    "null_unspecified",
    "_Null_unspecified",
    "__null_unspecified",
    "_Nullable_result",
    "const",
    "volatile",
    "__kindof",
    "__strong",
    "__weak",
    "__autoreleasing",
    "__unsafe_unretained",
    "__covariant",
    "__contravariant",
    "in",
    "out",
    "inout",
    "oneway",
    "bycopy",
    "byref",
    "IBOutlet",
    "IBInspectable",
];

/// Macro families whose call records availability.
const AVAILABILITY_PREFIXES: &[&str] = &[
    "API_AVAILABLE",
    "API_UNAVAILABLE",
    "API_DEPRECATED",
    "NS_AVAILABLE",
    "NS_DEPRECATED",
    "NS_CLASS_AVAILABLE",
    "NS_CLASS_DEPRECATED",
    "AVAILABLE_MAC_OS_X_VERSION",
    "__API_AVAILABLE",
];

/// Context a declaration is parsed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseContext {
    /// Inside an `NS_ASSUME_NONNULL_BEGIN` / `NS_ASSUME_NONNULL_END` region.
    pub assume_nonnull: bool,
}

/// A type string with its nullability folded out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalType {
    pub name: String,
    pub nullable: bool,
    pub nonnull: bool,
    pub is_pointer: bool,
}

pub fn is_availability_macro(name: &str) -> bool {
    AVAILABILITY_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Balance the parentheses of an availability macro call. Missing closers are
/// appended, surplus trailing closers are dropped.
pub fn normalize_availability(text: &str) -> String {
    let mut text = text.trim().to_string();
    let opens = text.matches('(').count();
    let mut closes = text.matches(')').count();
    while closes > opens && text.ends_with(')') {
        text.pop();
        closes -= 1;
    }
    for _ in closes..opens {
        text.push(')');
    }
    text
}

/// Canonicalize a type given as text, e.g. `NSString * _Nullable`.
pub fn canonical_type_str(text: &str) -> CanonicalType {
    canonical_type(&lex(text))
}

/// Strip nullability markers, qualifiers and pointer decoration.
///
/// `char *` keeps its star so C strings stay distinguishable from `char`.
/// Markers inside generic arguments are dropped. Inside block types only
/// markers at the outer level (or right after the caret) count towards
/// nullability.
pub fn canonical_type(tokens: &[Token<'_>]) -> CanonicalType {
    let mut kept: Vec<Token<'_>> = Vec::with_capacity(tokens.len());
    let mut nullable = false;
    let mut nonnull = false;
    let mut is_pointer = false;
    let mut depth = 0i32;
    let mut angle = 0i32;
    let mut prev: Option<Token<'_>> = None;

    for &tok in tokens {
        match tok {
            Token::LeftParen => depth += 1,
            Token::RightParen => depth -= 1,
            Token::Less => angle += 1,
            Token::Greater => angle -= 1,
            _ => {}
        }
        let outer = (depth == 0 && angle == 0) || prev == Some(Token::Caret);
        match tok {
            Token::Identifier(name) if NULLABLE_MARKERS.contains(&name) => {
                nullable |= outer;
            }
            Token::Identifier(name) if NONNULL_MARKERS.contains(&name) => {
                nonnull |= outer;
            }
            Token::Identifier(name) if TYPE_QUALIFIERS.contains(&name) => {}
            Token::Star if depth == 0 => {
                is_pointer = true;
                if kept.last() == Some(&Token::Identifier("char")) {
                    kept.push(tok);
                }
            }
            _ => kept.push(tok),
        }
        prev = Some(tok);
    }

    let name = render(&kept);
    CanonicalType {
        name: if name.is_empty() { "id".to_string() } else { name },
        nullable,
        nonnull,
        is_pointer,
    }
}

/// Parse one method declaration such as `- (void)foo:(NSObject *)bar;`.
pub fn parse_method(decl: &str) -> Result<MethodModel> {
    let tokens = lex(decl);
    let tokens = until_semicolon(&tokens);
    let mut cursor = TokenCursor::new(tokens);

    let is_static = match cursor.bump() {
        Some(Token::Plus) => true,
        Some(Token::Minus) => false,
        _ => return Err(SignatureError::signature(decl, "expected `+` or `-`")),
    };

    let return_type = match cursor.paren_group() {
        Some((inner, true)) => canonical_type(inner),
        Some((_, false)) => return Err(SignatureError::signature(decl, "unterminated return type")),
        None => return Err(SignatureError::signature(decl, "missing return type")),
    };

    let base = cursor
        .eat_identifier()
        .ok_or_else(|| SignatureError::signature(decl, "missing selector name"))?;

    let mut selector = String::new();
    let mut params = Vec::new();

    if cursor.peek() == Some(Token::Colon) {
        let mut label = Some(base);
        loop {
            // Subsequent components: `label:` or a bare `:`.
            let component = match label.take() {
                Some(first) => first,
                None => match (cursor.peek(), cursor.peek_at(1)) {
                    (Some(Token::Identifier(name)), Some(Token::Colon)) => {
                        cursor.bump();
                        name
                    }
                    (Some(Token::Colon), _) => "",
                    _ => break,
                },
            };
            cursor.eat(Token::Colon);
            selector.push_str(component);
            selector.push(':');

            let ty = match cursor.paren_group() {
                Some((inner, true)) => canonical_type(inner),
                Some((_, false)) => {
                    return Err(SignatureError::signature(decl, "unterminated parameter type"))
                }
                None => canonical_type_str("id"),
            };

            // A name followed by a colon is the next label, not this
            // component's parameter.
            if let (Some(Token::Identifier(name)), next) = (cursor.peek(), cursor.peek_at(1)) {
                if next != Some(Token::Colon) {
                    cursor.bump();
                    params.push(ParameterModel::new(name, ty.name).nullable(ty.nullable));
                }
            }

            if cursor.peek() == Some(Token::Comma) && cursor.peek_at(1) == Some(Token::Ellipsis) {
                cursor.bump();
                cursor.bump();
                break;
            }
        }
    } else {
        selector.push_str(base);
    }

    let availability = trailing_macros(decl, &mut cursor)?;

    let mut method = MethodModel::new(selector, return_type.name, is_static);
    method.return_nullable = return_type.nullable;
    method.params = params;
    method.availability = availability;
    Ok(method)
}

/// Consume trailing macro annotations and return the first availability call.
fn trailing_macros(decl: &str, cursor: &mut TokenCursor<'_, '_>) -> Result<Option<String>> {
    let mut availability = None;
    while let Some(tok) = cursor.peek() {
        match tok {
            Token::Identifier(name) => {
                cursor.bump();
                if cursor.peek() == Some(Token::LeftParen) {
                    let (inner, _) = cursor.paren_group().unwrap_or_default();
                    if availability.is_none() && is_availability_macro(name) {
                        let call = format!("{}({})", name, render(inner));
                        availability = Some(normalize_availability(&call));
                    }
                }
            }
            // Stray closers left by a truncated macro call.
            Token::RightParen => {
                cursor.bump();
            }
            other => {
                return Err(SignatureError::signature(
                    decl,
                    format!("unexpected `{}` after selector", other),
                ))
            }
        }
    }
    Ok(availability)
}

fn until_semicolon<'t, 's>(tokens: &'t [Token<'s>]) -> &'t [Token<'s>] {
    match tokens.iter().position(|t| *t == Token::Semicolon) {
        Some(end) => &tokens[..end],
        None => tokens,
    }
}

/// Parse an `@property` declaration.
pub fn try_parse_property(decl: &str, ctx: ParseContext) -> Result<PropertyModel> {
    let tokens = lex(decl);
    let tokens = until_semicolon(&tokens);
    let mut cursor = TokenCursor::new(tokens);

    if cursor.bump() != Some(Token::Directive("@property")) {
        return Err(SignatureError::signature(decl, "expected `@property`"));
    }

    let mut attributes: Vec<SmolStr> = Vec::new();
    if cursor.peek() == Some(Token::LeftParen) {
        match cursor.paren_group() {
            Some((inner, true)) => {
                attributes = split_commas(inner).into_iter().map(|a| render(a).into()).collect();
            }
            _ => return Err(SignatureError::signature(decl, "unterminated attribute list")),
        }
    }

    let (rest, availability) = strip_trailing_macros(cursor.rest());
    let (name, type_tokens) = split_property_name(rest)
        .ok_or_else(|| SignatureError::signature(decl, "missing property name"))?;
    if type_tokens.is_empty() {
        return Err(SignatureError::signature(decl, "missing property type"));
    }

    let ty = canonical_type(&type_tokens);
    let has_attr = |attr: &str| attributes.iter().any(|a| a == attr);
    let attr_nullable = has_attr("nullable") || has_attr("null_resettable");
    let attr_nonnull = has_attr("nonnull");
    let object_pointer = ty.is_pointer || ty.name == "id" || ty.name.starts_with("id<");
    let unannotated_pointer = object_pointer && !ty.nonnull && !attr_nonnull && !ctx.assume_nonnull;

    let mut property = PropertyModel::new(name, ty.name.clone());
    property.readonly = has_attr("readonly");
    property.nullable = attr_nullable || ty.nullable || unannotated_pointer;
    property.is_class = has_attr("class");
    property.getter = attribute_value(&attributes, "getter");
    property.setter = attribute_value(&attributes, "setter");
    property.availability = availability;
    property.attributes = attributes;
    Ok(property)
}

/// Best-effort property parse: never fails, so a header with an odd entry
/// still makes progress. Failures are logged and produce a placeholder.
pub fn parse_property(decl: &str, ctx: ParseContext) -> PropertyModel {
    try_parse_property(decl, ctx).unwrap_or_else(|err| {
        tracing::warn!("{}", err);
        PropertyModel::placeholder()
    })
}

fn attribute_value(attributes: &[SmolStr], key: &str) -> Option<SmolStr> {
    attributes.iter().find_map(|attr| {
        let (k, v) = attr.split_once('=')?;
        (k.trim() == key).then(|| SmolStr::new(v.trim()))
    })
}

/// Drop trailing `MACRO(...)` calls and bare `ALL_CAPS_MACRO`s from a
/// property tail, returning the first availability call seen.
fn strip_trailing_macros<'t, 's>(mut tokens: &'t [Token<'s>]) -> (&'t [Token<'s>], Option<String>) {
    let mut availability = None;
    loop {
        match tokens.last() {
            Some(Token::RightParen) => {
                let Some(open) = matching_open(tokens) else { break };
                match open.checked_sub(1).map(|i| tokens[i]) {
                    Some(Token::Identifier(name)) if is_macro_name(name) => {
                        if is_availability_macro(name) {
                            let call = render(&tokens[open - 1..]);
                            availability = Some(normalize_availability(&call));
                        }
                        tokens = &tokens[..open - 1];
                    }
                    _ => break,
                }
            }
            Some(Token::Identifier(name)) if is_macro_name(name) && tokens.len() > 1 => {
                tokens = &tokens[..tokens.len() - 1];
            }
            _ => break,
        }
    }
    (tokens, availability)
}

/// Index of the `(` matching the final `)`.
fn matching_open(tokens: &[Token<'_>]) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().rev() {
        match tok {
            Token::RightParen => depth += 1,
            Token::LeftParen => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// `API_AVAILABLE`, `NS_REFINED_FOR_SWIFT`, `__attribute__`, ...
pub(crate) fn is_macro_name(name: &str) -> bool {
    name.starts_with("__")
        || (name.contains('_')
            && name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_'))
}

/// Split a property tail into its name and type tokens. The name is the last
/// identifier, except for block types where it sits in the `(^name)` group.
fn split_property_name<'s>(tokens: &[Token<'s>]) -> Option<(&'s str, Vec<Token<'s>>)> {
    if let Some(caret) = tokens.iter().position(|t| *t == Token::Caret) {
        if let Some(Token::Identifier(name)) = tokens.get(caret + 1) {
            let mut ty = tokens.to_vec();
            ty.remove(caret + 1);
            return Some((*name, ty));
        }
    }
    let idx = tokens.iter().rposition(|t| t.identifier().is_some())?;
    let name = tokens[idx].identifier()?;
    Some((name, tokens[..idx].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nonnull_ctx() -> ParseContext {
        ParseContext { assume_nonnull: true }
    }

    #[test]
    fn single_argument_instance_method() {
        let m = parse_method("- (void)foo:(NSObject *)bar;").unwrap();
        assert_eq!(m.selector, "foo:");
        assert!(!m.is_static);
        assert_eq!(m.return_type, "void");
        assert_eq!(m.params.len(), 1);
        assert_eq!(m.params[0].name, "bar");
        assert_eq!(m.params[0].native_type, "NSObject");
        assert!(!m.params[0].nullable);
    }

    #[test]
    fn zero_argument_class_method() {
        let m = parse_method("+ (instancetype)shared;").unwrap();
        assert_eq!(m.selector, "shared");
        assert!(m.is_static);
        assert!(m.params.is_empty());
        assert_eq!(m.return_type, "instancetype");
    }

    #[test]
    fn multi_part_selector_with_nullability() {
        let m = parse_method(
            "- (nullable NSString *)titleForState:(NSInteger)state inView:(nullable NSView *)view;",
        )
        .unwrap();
        assert_eq!(m.selector, "titleForState:inView:");
        assert!(m.return_nullable);
        assert_eq!(m.return_type, "NSString");
        assert_eq!(m.params[0].native_type, "NSInteger");
        assert!(!m.params[0].nullable);
        assert_eq!(m.params[1].name, "view");
        assert!(m.params[1].nullable);
        assert!(m.is_well_formed());
    }

    #[test]
    fn underscore_markers_and_generics() {
        let m = parse_method(
            "- (void)setItems:(NSArray<NSString *> * _Nullable)items animated:(BOOL)animated",
        )
        .unwrap();
        assert_eq!(m.selector, "setItems:animated:");
        assert_eq!(m.params[0].native_type, "NSArray<NSString>");
        assert!(m.params[0].nullable);
        assert_eq!(m.params[1].native_type, "BOOL");
    }

    #[test]
    fn availability_and_other_trailing_macros() {
        let m = parse_method(
            "- (void)layout NS_REQUIRES_SUPER API_AVAILABLE(macos(10.12), ios(10.0)) NS_SWIFT_NAME(layout());",
        )
        .unwrap();
        assert_eq!(m.selector, "layout");
        assert_eq!(m.availability.as_deref(), Some("API_AVAILABLE(macos(10.12), ios(10.0))"));
    }

    #[test]
    fn truncated_availability_is_balanced() {
        let m = parse_method("- (void)display API_AVAILABLE(macos(10.10)").unwrap();
        assert_eq!(m.availability.as_deref(), Some("API_AVAILABLE(macos(10.10))"));
        let m = parse_method("- (void)display API_AVAILABLE(macos(10.10)));").unwrap();
        assert_eq!(m.availability.as_deref(), Some("API_AVAILABLE(macos(10.10))"));
    }

    #[test]
    fn labels_without_parameters_still_join_the_selector() {
        let m = parse_method("- (void)move:(NSInteger)x by:;").unwrap();
        assert_eq!(m.selector, "move:by:");
        assert_eq!(m.params.len(), 1);
        assert!(!m.is_well_formed());
    }

    #[test]
    fn untyped_parameter_defaults_to_id() {
        let m = parse_method("- (void)perform:sender;").unwrap();
        assert_eq!(m.params[0].native_type, "id");
        assert_eq!(m.params[0].name, "sender");
    }

    #[test]
    fn variadic_tail_is_accepted() {
        let m = parse_method("+ (instancetype)arrayWithObjects:(id)first, ... NS_REQUIRES_NIL_TERMINATION;")
            .unwrap();
        assert_eq!(m.selector, "arrayWithObjects:");
        assert_eq!(m.params.len(), 1);
    }

    #[test]
    fn block_parameter_type_is_kept() {
        let m = parse_method(
            "- (void)runWithCompletion:(void (^ _Nullable)(NSError * _Nullable error))completion;",
        )
        .unwrap();
        assert_eq!(m.params[0].native_type, "void (^)(NSError * error)");
        assert!(m.params[0].nullable);
    }

    #[test]
    fn malformed_methods() {
        assert!(matches!(
            parse_method("(void)foo;"),
            Err(SignatureError::MalformedSignature { .. })
        ));
        assert!(parse_method("- foo;").is_err());
        assert!(parse_method("- (void);").is_err());
        assert!(parse_method("- (void)foo { return; }").is_err());
    }

    #[test]
    fn readonly_integer_property() {
        let p = try_parse_property("@property (nonatomic, readonly) NSInteger count;", ParseContext::default())
            .unwrap();
        assert_eq!(p.name, "count");
        assert_eq!(p.native_type, "NSInteger");
        assert!(p.readonly);
        assert!(!p.nullable);
        assert_eq!(p.attributes, vec![SmolStr::new("nonatomic"), SmolStr::new("readonly")]);
    }

    #[test]
    fn nullable_attribute_property() {
        let p = try_parse_property("@property (nullable) NSString *title;", nonnull_ctx()).unwrap();
        assert_eq!(p.name, "title");
        assert_eq!(p.native_type, "NSString");
        assert!(p.nullable);
        assert!(!p.readonly);
    }

    #[test]
    fn pointer_nullability_depends_on_region() {
        let decl = "@property (copy) NSString *name;";
        assert!(try_parse_property(decl, ParseContext::default()).unwrap().nullable);
        assert!(!try_parse_property(decl, nonnull_ctx()).unwrap().nullable);
        let explicit = "@property (copy, nonnull) NSString *name;";
        assert!(!try_parse_property(explicit, ParseContext::default()).unwrap().nullable);
    }

    #[test]
    fn getter_class_and_trailing_macros() {
        let p = try_parse_property(
            "@property (class, readonly, getter=isEnabled) BOOL enabled API_AVAILABLE(macos(10.14)) NS_REFINED_FOR_SWIFT;",
            nonnull_ctx(),
        )
        .unwrap();
        assert_eq!(p.name, "enabled");
        assert!(p.is_class);
        assert_eq!(p.getter.as_deref(), Some("isEnabled"));
        assert_eq!(p.getter_selector(), "isEnabled");
        assert_eq!(p.availability.as_deref(), Some("API_AVAILABLE(macos(10.14))"));
    }

    #[test]
    fn block_property_name() {
        let p = try_parse_property(
            "@property (nonatomic, copy, nullable) void (^handler)(BOOL finished);",
            nonnull_ctx(),
        )
        .unwrap();
        assert_eq!(p.name, "handler");
        assert_eq!(p.native_type, "void (^)(BOOL finished)");
        assert!(p.nullable);
    }

    #[test]
    fn generic_property_type() {
        let p = try_parse_property(
            "@property (nonatomic, copy) NSArray<__kindof NSView *> *subviews;",
            nonnull_ctx(),
        )
        .unwrap();
        assert_eq!(p.name, "subviews");
        assert_eq!(p.native_type, "NSArray<NSView>");
    }

    #[test]
    fn failed_property_parse_yields_placeholder() {
        let p = parse_property("@property (nonatomic) ;", ParseContext::default());
        assert_eq!(p, PropertyModel::placeholder());
        assert!(try_parse_property("@property (nonatomic", ParseContext::default()).is_err());
        assert!(try_parse_property("- (void)foo;", ParseContext::default()).is_err());
    }

    #[test]
    fn element_nullability_does_not_leak_out_of_generics() {
        let ty = canonical_type_str("NSArray<NSString * _Nullable> *");
        assert_eq!(ty.name, "NSArray<NSString>");
        assert!(!ty.nullable);
        assert!(ty.is_pointer);
    }

    #[test]
    fn canonical_c_string() {
        let ty = canonical_type_str("const char * _Nonnull");
        assert_eq!(ty.name, "char *");
        assert!(ty.nonnull);
        assert!(!ty.nullable);
    }
}
