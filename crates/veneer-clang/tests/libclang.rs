//! Parses real headers through libclang. Ignored by default; run with
//! `--ignored` on a machine with libclang installed.

use veneer_clang::{AstExtractor, ClangParser, ObjcNodeKind};
use veneer_common::SourceUnit;
use veneer_model::{ClassSet, Extractor};

const HEADER: &str = r#"
@class NSString;

#pragma clang assume_nonnull begin
@interface Widget
/** The label shown on screen. */
@property (nonatomic, copy, nullable) NSString *label;
@property (nonatomic, readonly, getter=isEnabled) BOOL enabled;
- (instancetype)initWithLabel:(NSString *)label;
+ (Widget *)widgetWithCount:(long)count;
@end
#pragma clang assume_nonnull end

@interface Plain
@property (nonatomic, copy) NSString *name;
@end
"#;

fn parser() -> ClangParser {
    ClangParser::new(None).expect("libclang")
}

#[test]
#[ignore = "requires libclang"]
fn parses_interface_cursors() {
    let parser = parser();
    let ast = parser.parse_string(HEADER, "Widget.h").unwrap();

    let widget = ast
        .translation_unit
        .children
        .iter()
        .find(|n| matches!(&n.kind, ObjcNodeKind::InterfaceDecl { name } if name == "Widget"))
        .expect("Widget interface");
    assert!(widget.location.in_main_file);

    let selectors: Vec<_> = widget
        .children
        .iter()
        .filter_map(|c| match &c.kind {
            ObjcNodeKind::InstanceMethodDecl(m) | ObjcNodeKind::ClassMethodDecl(m) => {
                Some(m.selector.as_str())
            }
            _ => None,
        })
        .collect();
    assert!(selectors.contains(&"initWithLabel:"));
    assert!(selectors.contains(&"widgetWithCount:"));
}

#[test]
#[ignore = "requires libclang"]
fn extracts_the_class_model() {
    let parser = parser();
    let unit = SourceUnit::new("Widget.h", HEADER.to_string());
    let classes = AstExtractor::new(parser)
        .extract(&unit, ClassSet::new())
        .unwrap();

    let widget = classes.get("Widget").unwrap();
    let label = widget.property("label").unwrap();
    assert_eq!(label.native_type, "NSString");
    assert!(label.nullable);
    assert_eq!(label.doc, "The label shown on screen.");

    let enabled = widget.property("enabled").unwrap();
    assert!(enabled.readonly);
    assert_eq!(enabled.getter_selector(), "isEnabled");

    let init = widget
        .methods
        .iter()
        .find(|m| m.selector == "initWithLabel:")
        .unwrap();
    assert!(!init.params[0].nullable);

    // Outside the assume-nonnull region.
    assert!(classes.get("Plain").unwrap().property("name").unwrap().nullable);
}
