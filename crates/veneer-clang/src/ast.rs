//! Owned view of the parts of a libclang translation unit we read.
//!
//! Nodes are plain data so the extractor can be tested without libclang.

/// A parsed Objective-C translation unit.
#[derive(Debug, Clone)]
pub struct ObjcAst {
    /// Root translation unit
    pub translation_unit: ObjcNode,
}

/// A node in the AST.
#[derive(Debug, Clone)]
pub struct ObjcNode {
    pub kind: ObjcNodeKind,
    pub children: Vec<ObjcNode>,
    pub location: SourceLocation,
    /// Raw documentation comment attached to the declaration.
    pub comment: Option<String>,
}

impl ObjcNode {
    pub fn new(kind: ObjcNodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            location: SourceLocation::main_file(0),
            comment: None,
        }
    }

    pub fn with_children(mut self, children: Vec<ObjcNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }
}

/// Source location of a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
    /// Declared in the file being parsed rather than in an included header.
    pub in_main_file: bool,
}

impl SourceLocation {
    pub fn main_file(line: u32) -> Self {
        Self {
            file: None,
            line,
            column: 0,
            in_main_file: true,
        }
    }

    pub fn included(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line,
            column: 0,
            in_main_file: false,
        }
    }
}

/// Nullability reported for a type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Nullability {
    #[default]
    Unspecified,
    Nullable,
    NonNull,
}

/// A type as libclang spells it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub spelling: String,
    pub nullability: Nullability,
}

impl TypeRef {
    pub fn new(spelling: impl Into<String>) -> Self {
        Self {
            spelling: spelling.into(),
            nullability: Nullability::Unspecified,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullability = Nullability::Nullable;
        self
    }
}

/// `@property` attribute bits, as returned by
/// `clang_Cursor_getObjCPropertyAttributes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyAttributes(pub u32);

impl PropertyAttributes {
    pub const READONLY: u32 = 0x01;
    pub const GETTER: u32 = 0x02;
    pub const ASSIGN: u32 = 0x04;
    pub const READWRITE: u32 = 0x08;
    pub const RETAIN: u32 = 0x10;
    pub const COPY: u32 = 0x20;
    pub const NONATOMIC: u32 = 0x40;
    pub const SETTER: u32 = 0x80;
    pub const ATOMIC: u32 = 0x100;
    pub const WEAK: u32 = 0x200;
    pub const STRONG: u32 = 0x400;
    pub const UNSAFE_UNRETAINED: u32 = 0x800;
    pub const CLASS: u32 = 0x1000;

    const NAMES: &'static [(u32, &'static str)] = &[
        (Self::CLASS, "class"),
        (Self::NONATOMIC, "nonatomic"),
        (Self::ATOMIC, "atomic"),
        (Self::READONLY, "readonly"),
        (Self::READWRITE, "readwrite"),
        (Self::ASSIGN, "assign"),
        (Self::RETAIN, "retain"),
        (Self::STRONG, "strong"),
        (Self::WEAK, "weak"),
        (Self::COPY, "copy"),
        (Self::UNSAFE_UNRETAINED, "unsafe_unretained"),
    ];

    pub fn contains(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    /// Attribute keywords, without `getter=` / `setter=`.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .iter()
            .filter(move |(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
    }
}

/// An Objective-C method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub selector: String,
    pub return_type: TypeRef,
    pub params: Vec<(String, TypeRef)>,
}

/// An Objective-C property declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub ty: TypeRef,
    pub attributes: PropertyAttributes,
    /// Getter selector as libclang reports it (defaults to the name).
    pub getter: String,
    /// Setter selector as libclang reports it (defaults to `setName:`).
    pub setter: String,
}

/// Kinds of nodes we care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjcNodeKind {
    /// Translation unit (root)
    TranslationUnit,
    /// `@interface Name`
    InterfaceDecl { name: String },
    /// `@interface Class (Category)`
    CategoryDecl { class_name: String, category: String },
    /// Reference to a class, e.g. the class a category extends.
    ClassRef { name: String },
    InstanceMethodDecl(MethodDecl),
    ClassMethodDecl(MethodDecl),
    PropertyDecl(PropertyDecl),
    /// Anything else; kept so locations stay inspectable.
    Other,
}
