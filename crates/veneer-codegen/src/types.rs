//! Native type to TypeScript type mapping.

use std::fmt;

/// TypeScript reserved words that cannot be used as identifiers.
const TS_RESERVED: &[&str] = &[
    "arguments", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false",
    "finally", "for", "function", "if", "implements", "import", "in", "instanceof",
    "interface", "let", "new", "null", "package", "private", "protected", "public",
    "return", "static", "super", "switch", "this", "throw", "true", "try", "typeof",
    "var", "void", "while", "with", "yield",
];

const BOOLEAN_TYPES: &[&str] = &["BOOL", "bool", "Boolean", "_Bool"];

const NUMBER_TYPES: &[&str] = &[
    "NSInteger", "NSUInteger", "CGFloat", "NSTimeInterval", "NSNumber", "CFIndex",
    "CFTimeInterval", "size_t", "ssize_t", "ptrdiff_t", "intptr_t", "uintptr_t",
    "int8_t", "int16_t", "int32_t", "int64_t", "uint8_t", "uint16_t", "uint32_t",
    "uint64_t", "unichar", "UInt8", "UInt16", "UInt32", "UInt64", "SInt8", "SInt16",
    "SInt32", "SInt64", "Float32", "Float64",
];

/// Words that make up the C integer and floating-point families
/// (`unsigned long long`, `double`, ...).
const C_NUMBER_WORDS: &[&str] =
    &["char", "short", "int", "long", "float", "double", "signed", "unsigned"];

const STRING_TYPES: &[&str] = &["NSString", "NSMutableString", "char *"];
const ARRAY_TYPES: &[&str] = &["NSArray", "NSMutableArray"];
const MAP_TYPES: &[&str] = &["NSDictionary", "NSMutableDictionary"];
const SET_TYPES: &[&str] = &["NSSet", "NSMutableSet", "NSOrderedSet", "NSMutableOrderedSet"];

/// A TypeScript type in generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TsType {
    Void,
    Boolean,
    Number,
    String,
    Array(Box<TsType>),
    Map(Box<TsType>, Box<TsType>),
    Set(Box<TsType>),
    Nullable(Box<TsType>),
    /// A native object with no structural mapping. Keeps the native name.
    Opaque(String),
}

impl TsType {
    /// Map a canonical native type string.
    pub fn from_native(native: &str) -> TsType {
        let native = native.trim();
        if native.is_empty() {
            return TsType::opaque_id();
        }
        if STRING_TYPES.contains(&native) {
            return TsType::String;
        }
        // Block types: `void (^)(BOOL finished)`.
        if native.contains('^') || native.contains('(') {
            return TsType::Opaque(native.to_string());
        }

        let (base, args) = split_generic(native);
        let mut args = args.iter().map(|arg| TsType::from_native(arg));
        let mut arg = || Box::new(args.next().unwrap_or_else(TsType::opaque_id));

        match base {
            "void" => TsType::Void,
            b if BOOLEAN_TYPES.contains(&b) => TsType::Boolean,
            b if NUMBER_TYPES.contains(&b) => TsType::Number,
            b if b.split_whitespace().all(|w| C_NUMBER_WORDS.contains(&w)) => TsType::Number,
            b if STRING_TYPES.contains(&b) => TsType::String,
            b if ARRAY_TYPES.contains(&b) => TsType::Array(arg()),
            b if MAP_TYPES.contains(&b) => {
                let key = arg();
                TsType::Map(key, arg())
            }
            b if SET_TYPES.contains(&b) => TsType::Set(arg()),
            _ => TsType::Opaque(native.to_string()),
        }
    }

    fn opaque_id() -> TsType {
        TsType::Opaque("id".to_string())
    }

    /// Wrap in `| null`. Idempotent; `void` is never nullable.
    #[must_use]
    pub fn nullable(self) -> TsType {
        match self {
            TsType::Void | TsType::Nullable(_) => self,
            other => TsType::Nullable(Box::new(other)),
        }
    }

    pub fn nullable_if(self, nullable: bool) -> TsType {
        if nullable {
            self.nullable()
        } else {
            self
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TsType::Void)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TsType::Nullable(_))
    }
}

impl fmt::Display for TsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TsType::Void => f.write_str("void"),
            TsType::Boolean => f.write_str("boolean"),
            TsType::Number => f.write_str("number"),
            TsType::String => f.write_str("string"),
            TsType::Array(elem) if elem.is_nullable() => write!(f, "({})[]", elem),
            TsType::Array(elem) => write!(f, "{}[]", elem),
            TsType::Map(key, value) => write!(f, "Map<{}, {}>", key, value),
            TsType::Set(elem) => write!(f, "Set<{}>", elem),
            TsType::Nullable(inner) => write!(f, "{} | null", inner),
            TsType::Opaque(_) => f.write_str("NativeObject"),
        }
    }
}

/// Map a native type, adding `| null` when `nullable`.
pub fn map_type(native: &str, nullable: bool) -> TsType {
    TsType::from_native(native).nullable_if(nullable)
}

/// Split `NSDictionary<NSString, id>` into `NSDictionary` and its arguments.
fn split_generic(native: &str) -> (&str, Vec<String>) {
    match (native.find('<'), native.ends_with('>')) {
        (Some(open), true) => {
            let args = parse_generic_args(&native[open + 1..native.len() - 1]);
            (native[..open].trim(), args)
        }
        _ => (native, Vec::new()),
    }
}

/// Split generic arguments on top-level commas.
pub fn parse_generic_args(args: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0;

    for ch in args.chars() {
        match ch {
            '<' | '(' => {
                depth += 1;
                current.push(ch);
            }
            '>' | ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    result.push(trimmed);
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        result.push(trimmed);
    }

    result
}

/// Append `_` to identifiers that collide with reserved words.
pub fn sanitize_identifier(name: &str) -> String {
    if TS_RESERVED.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(native: &str) -> String {
        TsType::from_native(native).to_string()
    }

    #[test]
    fn primitives() {
        assert_eq!(ts("void"), "void");
        assert_eq!(ts("BOOL"), "boolean");
        assert_eq!(ts("NSInteger"), "number");
        assert_eq!(ts("unsigned long long"), "number");
        assert_eq!(ts("uint8_t"), "number");
        assert_eq!(ts("NSString"), "string");
        assert_eq!(ts("char *"), "string");
    }

    #[test]
    fn collections() {
        assert_eq!(ts("NSArray<NSString>"), "string[]");
        assert_eq!(ts("NSMutableArray"), "NativeObject[]");
        assert_eq!(ts("NSDictionary<NSString, NSNumber>"), "Map<string, number>");
        assert_eq!(ts("NSDictionary<NSString, NSArray<NSView>>"), "Map<string, NativeObject[]>");
        assert_eq!(ts("NSSet<NSNumber>"), "Set<number>");
        assert_eq!(
            TsType::from_native("NSDictionary"),
            TsType::Map(Box::new(TsType::opaque_id()), Box::new(TsType::opaque_id()))
        );
    }

    #[test]
    fn opaque_keeps_native_name() {
        assert_eq!(TsType::from_native("NSObject"), TsType::Opaque("NSObject".into()));
        assert_eq!(TsType::from_native("id<NSCopying>"), TsType::Opaque("id<NSCopying>".into()));
        assert_eq!(
            TsType::from_native("void (^)(BOOL finished)"),
            TsType::Opaque("void (^)(BOOL finished)".into())
        );
        assert_eq!(ts("instancetype"), "NativeObject");
        assert_eq!(ts("SEL"), "NativeObject");
    }

    #[test]
    fn nullability_is_rendered_once() {
        let title = map_type("NSString", true);
        assert_eq!(title.to_string(), "string | null");
        assert_eq!(title.clone().nullable(), title);
        assert_eq!(map_type("void", true), TsType::Void);
    }

    #[test]
    fn nullable_array_elements_are_parenthesized() {
        let ty = TsType::Array(Box::new(TsType::String.nullable()));
        assert_eq!(ty.to_string(), "(string | null)[]");
        assert_eq!(ty.nullable().to_string(), "(string | null)[] | null");
    }

    #[test]
    fn reserved_identifiers() {
        assert_eq!(sanitize_identifier("delete"), "delete_");
        assert_eq!(sanitize_identifier("arguments"), "arguments_");
        assert_eq!(sanitize_identifier("frame"), "frame");
    }
}
