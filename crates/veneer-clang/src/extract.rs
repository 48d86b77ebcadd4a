//! Building the class model from a libclang AST.

use crate::ast::{
    MethodDecl, Nullability, ObjcAst, ObjcNode, ObjcNodeKind, PropertyAttributes, PropertyDecl,
    TypeRef,
};
use crate::parse::ClangParser;
use smol_str::SmolStr;
use veneer_common::{Diagnostic, SourceUnit};
use veneer_model::{ClassModel, ClassSet, Extractor, MethodModel, ParameterModel, PropertyModel};
use veneer_objc::{canonical_type_str, parse_doc_comment};

/// Extracts declarations through libclang.
///
/// Superclasses, adopted protocols and availability are not recovered by
/// this strategy.
pub struct AstExtractor {
    parser: ClangParser,
}

impl AstExtractor {
    pub fn new(parser: ClangParser) -> Self {
        Self { parser }
    }
}

impl Extractor for AstExtractor {
    fn extract(&self, unit: &SourceUnit, classes: ClassSet) -> miette::Result<ClassSet> {
        let ast = self
            .parser
            .parse_string(&unit.content, &unit.path.to_string_lossy())?;
        Ok(extract_ast(&ast, unit, classes))
    }

    fn name(&self) -> &'static str {
        "clang"
    }
}

/// Add the classes declared in `unit`'s own file to `classes`.
pub fn extract_ast(ast: &ObjcAst, unit: &SourceUnit, mut classes: ClassSet) -> ClassSet {
    for node in &ast.translation_unit.children {
        if !node.location.in_main_file {
            continue;
        }

        let name = match &node.kind {
            ObjcNodeKind::InterfaceDecl { name } => name,
            ObjcNodeKind::CategoryDecl { class_name, category } => {
                if class_name.is_empty() {
                    classes.warn(
                        Diagnostic::warning(format!("category `{}` has no class", category))
                            .at(&unit.path, node.location.line),
                    );
                    continue;
                }
                class_name
            }
            _ => continue,
        };

        let mut class = ClassModel::new(name.as_str());
        if let Some(comment) = &node.comment {
            class.doc = parse_doc_comment(comment).description;
        }
        for child in &node.children {
            if child.location.in_main_file {
                add_member(&mut class, child, unit, &mut classes);
            }
        }

        tracing::trace!(class = %class.name, members = class.member_count(), "extracted class");
        classes.insert(class);
    }
    classes
}

fn add_member(class: &mut ClassModel, node: &ObjcNode, unit: &SourceUnit, classes: &mut ClassSet) {
    let line = node.location.line;
    match &node.kind {
        ObjcNodeKind::InstanceMethodDecl(decl) | ObjcNodeKind::ClassMethodDecl(decl) => {
            if decl.selector.is_empty() {
                let warning = Diagnostic::warning("method with an empty selector");
                classes.warn(warning.at(&unit.path, line));
                return;
            }
            let is_static = matches!(node.kind, ObjcNodeKind::ClassMethodDecl(_));
            let mut method = method_model(decl, is_static);
            if let Some(comment) = &node.comment {
                method.apply_doc(&parse_doc_comment(comment));
            }
            class.methods.push(method);
        }
        ObjcNodeKind::PropertyDecl(decl) => {
            if decl.name.is_empty() {
                classes.warn(Diagnostic::warning("property without a name").at(&unit.path, line));
                return;
            }
            let mut property = property_model(decl);
            if let Some(comment) = &node.comment {
                property.apply_doc(&parse_doc_comment(comment));
            }
            class.properties.push(property);
        }
        _ => {}
    }
}

/// Canonical type name and nullability.
fn canonical(ty: &TypeRef) -> (String, bool) {
    let canonical = canonical_type_str(&ty.spelling);
    let nullable = match ty.nullability {
        Nullability::Nullable => true,
        Nullability::NonNull => false,
        Nullability::Unspecified => canonical.nullable,
    };
    (canonical.name, nullable)
}

/// An object pointer with no nullability from any source. libclang reports
/// pointers inside an assume-nonnull region as non-null, so these are
/// outside one and may be nil.
fn unannotated_object_pointer(ty: &TypeRef) -> bool {
    if ty.nullability != Nullability::Unspecified {
        return false;
    }
    let canonical = canonical_type_str(&ty.spelling);
    let object =
        canonical.is_pointer || canonical.name == "id" || canonical.name.starts_with("id<");
    object && !canonical.nonnull
}

fn method_model(decl: &MethodDecl, is_static: bool) -> MethodModel {
    let (return_type, return_nullable) = canonical(&decl.return_type);
    let mut method = MethodModel::new(decl.selector.as_str(), return_type, is_static);
    method.return_nullable = return_nullable;

    for (i, (name, ty)) in decl.params.iter().enumerate() {
        let (native, nullable) = canonical(ty);
        let name = if name.is_empty() { format!("arg{}", i) } else { name.clone() };
        method = method.with_param(ParameterModel::new(name, native).nullable(nullable));
    }
    method
}

fn property_model(decl: &PropertyDecl) -> PropertyModel {
    let (native, nullable) = canonical(&decl.ty);
    let attrs = decl.attributes;

    let mut property = PropertyModel::new(decl.name.as_str(), native);
    property.nullable = nullable || unannotated_object_pointer(&decl.ty);
    property.readonly = attrs.contains(PropertyAttributes::READONLY);
    property.is_class = attrs.contains(PropertyAttributes::CLASS);
    property.attributes = attrs.names().map(SmolStr::new).collect();
    if attrs.contains(PropertyAttributes::GETTER) {
        property.getter = Some(SmolStr::new(&decl.getter));
    }
    if attrs.contains(PropertyAttributes::SETTER) {
        property.setter = Some(SmolStr::new(&decl.setter));
    }
    property
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceLocation;
    use veneer_objc::TextExtractor;

    fn unit() -> SourceUnit {
        SourceUnit::new("NSView.h", String::new())
    }

    fn ast(children: Vec<ObjcNode>) -> ObjcAst {
        ObjcAst {
            translation_unit: ObjcNode::new(ObjcNodeKind::TranslationUnit).with_children(children),
        }
    }

    fn method(selector: &str, ret: TypeRef, params: &[(&str, TypeRef)]) -> MethodDecl {
        MethodDecl {
            selector: selector.to_string(),
            return_type: ret,
            params: params.iter().map(|(n, t)| (n.to_string(), t.clone())).collect(),
        }
    }

    fn property(name: &str, ty: TypeRef, attributes: u32) -> PropertyDecl {
        PropertyDecl {
            name: name.to_string(),
            ty,
            attributes: PropertyAttributes(attributes),
            getter: name.to_string(),
            setter: format!("set{}:", name),
        }
    }

    fn view_interface() -> ObjcNode {
        ObjcNode::new(ObjcNodeKind::InterfaceDecl { name: "NSView".into() })
            .with_comment("/** A rectangular region. */")
            .with_children(vec![
                ObjcNode::new(ObjcNodeKind::PropertyDecl(property(
                    "title",
                    TypeRef::new("NSString * _Nullable").nullable(),
                    PropertyAttributes::NONATOMIC | PropertyAttributes::COPY,
                ))),
                ObjcNode::new(ObjcNodeKind::PropertyDecl(PropertyDecl {
                    getter: "isHidden".into(),
                    ..property("hidden", TypeRef::new("BOOL"), PropertyAttributes::READONLY | PropertyAttributes::GETTER)
                })),
                ObjcNode::new(ObjcNodeKind::InstanceMethodDecl(method(
                    "initWithFrame:",
                    TypeRef::new("instancetype"),
                    &[("frame", TypeRef::new("NSRect"))],
                )))
                .with_comment("/**\n * Designated initializer.\n * @param frame The frame.\n */"),
                ObjcNode::new(ObjcNodeKind::ClassMethodDecl(method(
                    "viewWithSubviews:",
                    TypeRef::new("NSView *"),
                    &[("subviews", TypeRef::new("NSArray<NSView *> * _Nullable").nullable())],
                ))),
                ObjcNode::new(ObjcNodeKind::Other),
            ])
    }

    #[test]
    fn interfaces_become_classes() {
        let classes = extract_ast(&ast(vec![view_interface()]), &unit(), ClassSet::new());
        assert_eq!(classes.len(), 1);
        assert_eq!(classes.warning_count(), 0);

        let view = classes.get("NSView").unwrap();
        assert_eq!(view.doc, "A rectangular region.");
        assert_eq!(view.superclass, None);

        let title = view.property("title").unwrap();
        assert_eq!(title.native_type, "NSString");
        assert!(title.nullable);
        assert!(!title.readonly);
        assert!(title.attributes.contains(&SmolStr::new("copy")));

        let hidden = view.property("hidden").unwrap();
        assert!(hidden.readonly);
        assert_eq!(hidden.getter_selector(), "isHidden");
        assert_eq!(hidden.setter, None);

        let init = &view.methods[0];
        assert_eq!(init.selector, "initWithFrame:");
        assert_eq!(init.return_type, "instancetype");
        assert!(!init.is_static);
        assert_eq!(init.doc, "Designated initializer.");
        assert_eq!(init.params[0].doc, "The frame.");

        let factory = &view.methods[1];
        assert!(factory.is_static);
        assert!(factory.params[0].nullable);
        assert_eq!(factory.params[0].native_type, "NSArray<NSView>");
    }

    #[test]
    fn declarations_from_included_files_are_skipped() {
        let included = ObjcNode::new(ObjcNodeKind::InterfaceDecl { name: "NSObject".into() })
            .at(SourceLocation::included("/sdk/NSObject.h", 12));
        let classes = extract_ast(&ast(vec![included, view_interface()]), &unit(), ClassSet::new());
        assert!(!classes.contains("NSObject"));
        assert!(classes.contains("NSView"));
    }

    #[test]
    fn categories_merge_into_their_class() {
        let category = ObjcNode::new(ObjcNodeKind::CategoryDecl {
            class_name: "NSView".into(),
            category: "Layout".into(),
        })
        .with_children(vec![
            ObjcNode::new(ObjcNodeKind::ClassRef { name: "NSView".into() }),
            ObjcNode::new(ObjcNodeKind::InstanceMethodDecl(method("layout", TypeRef::new("void"), &[]))),
        ]);
        let classes = extract_ast(&ast(vec![view_interface(), category]), &unit(), ClassSet::new());
        let view = classes.get("NSView").unwrap();
        assert_eq!(view.methods.len(), 3);
        assert_eq!(view.methods[2].selector, "layout");
    }

    #[test]
    fn unusable_declarations_warn() {
        let orphan = ObjcNode::new(ObjcNodeKind::CategoryDecl {
            class_name: String::new(),
            category: "Orphan".into(),
        })
        .at(SourceLocation::main_file(4));
        let empty = ObjcNode::new(ObjcNodeKind::InterfaceDecl { name: "A".into() }).with_children(vec![
            ObjcNode::new(ObjcNodeKind::InstanceMethodDecl(method("", TypeRef::new("void"), &[])))
                .at(SourceLocation::main_file(9)),
        ]);
        let classes = extract_ast(&ast(vec![orphan, empty]), &unit(), ClassSet::new());
        assert_eq!(classes.warning_count(), 2);
        assert_eq!(classes.diagnostics()[0].line, Some(4));
        assert_eq!(classes.diagnostics()[1].line, Some(9));
        assert_eq!(classes.get("A").unwrap().methods.len(), 0);
    }

    #[test]
    fn unspecified_nullability_falls_back_to_the_spelling() {
        let (name, nullable) = canonical(&TypeRef::new("NSString * _Nullable"));
        assert_eq!(name, "NSString");
        assert!(nullable);

        let nonnull = TypeRef {
            spelling: "NSString *".into(),
            nullability: Nullability::NonNull,
        };
        assert_eq!(canonical(&nonnull), ("NSString".to_string(), false));
    }

    #[test]
    fn property_models_match_the_text_scanner() {
        let header = "@interface A : NSObject\n\
                      @property (copy) NSString *name;\n\
                      @property (nonatomic) NSInteger count;\n\
                      @property (nonnull) id<NSCopying> key;\n\
                      @property (nullable) NSDate *date;\n\
                      @end\n";
        let text = TextExtractor::new()
            .extract(&SourceUnit::new("A.h", header.to_string()), ClassSet::new())
            .unwrap();

        let interface = ObjcNode::new(ObjcNodeKind::InterfaceDecl { name: "A".into() }).with_children(
            vec![
                ObjcNode::new(ObjcNodeKind::PropertyDecl(property(
                    "name",
                    TypeRef::new("NSString *"),
                    PropertyAttributes::COPY,
                ))),
                ObjcNode::new(ObjcNodeKind::PropertyDecl(property(
                    "count",
                    TypeRef::new("NSInteger"),
                    PropertyAttributes::NONATOMIC,
                ))),
                ObjcNode::new(ObjcNodeKind::PropertyDecl(property(
                    "key",
                    TypeRef {
                        spelling: "id<NSCopying> _Nonnull".into(),
                        nullability: Nullability::NonNull,
                    },
                    0,
                ))),
                ObjcNode::new(ObjcNodeKind::PropertyDecl(property(
                    "date",
                    TypeRef::new("NSDate * _Nullable").nullable(),
                    0,
                ))),
            ],
        );
        let clang = extract_ast(&ast(vec![interface]), &unit(), ClassSet::new());

        let text = &text.get("A").unwrap().properties;
        let clang = &clang.get("A").unwrap().properties;
        assert_eq!(text.len(), clang.len());
        for (t, c) in text.iter().zip(clang) {
            assert_eq!((&t.name, &t.native_type, t.nullable), (&c.name, &c.native_type, c.nullable));
        }
        assert!(clang[0].nullable);
        assert!(!clang[1].nullable);
        assert!(!clang[2].nullable);
    }
}
