//! Grouping methods into setter accessors and overload groups.

use indexmap::IndexMap;
use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;
use veneer_model::{ClassModel, MethodModel};

/// No member of an overload group takes the given number of arguments.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
#[error("no overload of `{base}` takes {argc} argument(s)")]
#[diagnostic(code(veneer::unresolved_overload))]
pub struct UnresolvedOverload {
    pub base: SmolStr,
    pub argc: usize,
}

/// A `setX:` method emitted as `set x(value)`.
#[derive(Debug, Clone)]
pub struct SetterAccessor<'a> {
    pub name: String,
    pub method: &'a MethodModel,
}

/// Methods sharing `(is_static, base name)`.
#[derive(Debug, Clone)]
pub struct OverloadGroup<'a> {
    pub is_static: bool,
    pub base: SmolStr,
    /// Declaration order; dispatch tries members in this order.
    pub methods: Vec<&'a MethodModel>,
    /// Instance `init...` group, emitted as a static factory.
    pub is_constructor: bool,
}

impl<'a> OverloadGroup<'a> {
    fn new(method: &'a MethodModel) -> Self {
        Self {
            is_static: method.is_static,
            base: SmolStr::new(method.base_name()),
            methods: vec![method],
            is_constructor: method.is_initializer(),
        }
    }

    /// First member whose arity is `argc`.
    pub fn resolve(&self, argc: usize) -> Result<&'a MethodModel, UnresolvedOverload> {
        self.methods
            .iter()
            .copied()
            .find(|m| m.arity() == argc)
            .ok_or_else(|| UnresolvedOverload {
                base: self.base.clone(),
                argc,
            })
    }

    pub fn is_overloaded(&self) -> bool {
        self.methods.len() > 1
    }

    /// Whether the generated member is `static`.
    pub fn emits_static(&self) -> bool {
        self.is_static || self.is_constructor
    }
}

/// Why a method has no generated member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    PropertyGetter,
    PropertySetter,
    DuplicateSetter,
    DuplicateSelector,
    EmptySelector,
    MalformedOverload,
    DuplicateMalformed,
}

impl DropReason {
    /// Re-declared property accessors are routine; everything else loses a
    /// binding and is reported.
    pub fn is_warning(self) -> bool {
        !matches!(self, DropReason::PropertyGetter | DropReason::PropertySetter)
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DropReason::PropertyGetter => "duplicates a property getter",
            DropReason::PropertySetter => "duplicates a property setter",
            DropReason::DuplicateSetter => "duplicate setter",
            DropReason::DuplicateSelector => "selector declared twice",
            DropReason::EmptySelector => "empty selector",
            DropReason::MalformedOverload => "selector colons do not match its parameters",
            DropReason::DuplicateMalformed => "duplicate malformed declaration",
        })
    }
}

/// How a class's methods will be emitted.
#[derive(Debug, Default)]
pub struct MemberPlan<'a> {
    pub setters: Vec<SetterAccessor<'a>>,
    pub groups: Vec<OverloadGroup<'a>>,
    /// Malformed methods that get an incomplete marker.
    pub incomplete: Vec<&'a MethodModel>,
    /// Methods left out of the output.
    pub dropped: Vec<(&'a MethodModel, DropReason)>,
}

/// Split a class's methods into setter accessors, overload groups and
/// incomplete markers.
pub fn plan_members(class: &ClassModel) -> MemberPlan<'_> {
    let mut plan = MemberPlan::default();
    let mut groups: IndexMap<(bool, SmolStr), OverloadGroup<'_>> = IndexMap::new();
    let mut malformed = Vec::new();

    let instance_bases: Vec<&str> = class
        .methods
        .iter()
        .filter(|m| !m.is_static)
        .map(|m| m.base_name())
        .collect();

    for method in &class.methods {
        if !method.is_well_formed() {
            malformed.push(method);
            continue;
        }

        // Getters re-declared next to their property, on the same side
        // (instance or class) as the property.
        if method.arity() == 0
            && class
                .properties
                .iter()
                .any(|p| p.is_class == method.is_static && p.getter_selector() == method.selector)
        {
            plan.dropped.push((method, DropReason::PropertyGetter));
            continue;
        }

        if let Some(name) = setter_property_name(method) {
            match class.property(&name) {
                Some(property) if !property.readonly && !property.is_class => {
                    plan.dropped.push((method, DropReason::PropertySetter));
                    continue;
                }
                Some(_) => {}
                None if instance_bases.contains(&name.as_str()) => {}
                None => {
                    if plan.setters.iter().any(|s| s.name == name) {
                        plan.dropped.push((method, DropReason::DuplicateSetter));
                    } else {
                        plan.setters.push(SetterAccessor { name, method });
                    }
                    continue;
                }
            }
        }

        let key = (method.is_static, SmolStr::new(method.base_name()));
        match groups.get_mut(&key) {
            Some(group) => {
                if group.methods.iter().any(|m| m.selector == method.selector) {
                    plan.dropped.push((method, DropReason::DuplicateSelector));
                } else {
                    group.methods.push(method);
                }
            }
            None => {
                groups.insert(key, OverloadGroup::new(method));
            }
        }
    }

    for method in malformed {
        let key = (method.is_static, SmolStr::new(method.base_name()));
        if key.1.is_empty() {
            plan.dropped.push((method, DropReason::EmptySelector));
        } else if groups.contains_key(&key) {
            plan.dropped.push((method, DropReason::MalformedOverload));
        } else if plan
            .incomplete
            .iter()
            .any(|m| m.is_static == method.is_static && m.base_name() == method.base_name())
        {
            plan.dropped.push((method, DropReason::DuplicateMalformed));
        } else {
            plan.incomplete.push(method);
        }
    }

    plan.groups = groups.into_values().collect();
    plan
}

/// `setTitle:` gives `title`, `setURL:` gives `url`.
fn setter_property_name(method: &MethodModel) -> Option<String> {
    if method.is_static || method.arity() != 1 || method.colon_count() != 1 {
        return None;
    }
    let rest = method.base_name().strip_prefix("set")?;
    if !rest.starts_with(|c: char| c.is_ascii_uppercase()) {
        return None;
    }
    Some(lower_leading_capitals(rest))
}

/// Lower-case the leading run of capitals. In a run followed by a lowercase
/// letter the last capital starts the next word: `URLString` gives
/// `urlString`.
pub fn lower_leading_capitals(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let run = chars.iter().take_while(|c| c.is_ascii_uppercase()).count();
    let lower_count = if run > 1 && chars.get(run).is_some_and(|c| c.is_ascii_lowercase()) {
        run - 1
    } else {
        run
    };
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < lower_count { c.to_ascii_lowercase() } else { *c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_model::{ParameterModel, PropertyModel};

    fn method(selector: &str, params: &[&str]) -> MethodModel {
        params.iter().fold(MethodModel::new(selector, "void", false), |m, p| {
            m.with_param(ParameterModel::new(*p, "NSInteger"))
        })
    }

    fn init_class() -> ClassModel {
        let mut class = ClassModel::new("NSView");
        class.methods.push(method("initWithFrame:", &["frame"]));
        class.methods.push(method("initWithFrame:andFlags:", &["frame", "flags"]));
        class
    }

    #[test]
    fn resolve_by_arity() {
        let class = init_class();
        let plan = plan_members(&class);
        assert_eq!(plan.groups.len(), 1);
        let group = &plan.groups[0];
        assert!(group.is_constructor);
        assert!(group.is_overloaded());
        assert_eq!(group.resolve(1).unwrap().selector, "initWithFrame:");
        assert_eq!(group.resolve(2).unwrap().selector, "initWithFrame:andFlags:");
        assert_eq!(
            group.resolve(3),
            Err(UnresolvedOverload {
                base: "initWithFrame".into(),
                argc: 3
            })
        );
    }

    #[test]
    fn redeclared_getters_are_dropped_on_their_own_side() {
        let mut class = ClassModel::new("NSColor");
        let mut red = PropertyModel::new("redColor", "NSColor");
        red.is_class = true;
        class.properties.push(red);
        class.properties.push(PropertyModel::new("alpha", "CGFloat"));

        let mut class_getter = method("redColor", &[]);
        class_getter.is_static = true;
        class.methods.push(class_getter);
        class.methods.push(method("alpha", &[]));
        // An instance method does not collide with a class property.
        class.methods.push(method("redColor", &[]));

        let plan = plan_members(&class);
        let dropped: Vec<_> = plan
            .dropped
            .iter()
            .map(|(m, reason)| (m.selector.as_str(), m.is_static, *reason))
            .collect();
        assert_eq!(
            dropped,
            vec![
                ("redColor", true, DropReason::PropertyGetter),
                ("alpha", false, DropReason::PropertyGetter),
            ]
        );
        assert_eq!(plan.groups.len(), 1);
        assert!(!plan.groups[0].is_static);
    }

    #[test]
    fn static_and_instance_are_separate_groups() {
        let mut class = ClassModel::new("A");
        class.methods.push(method("reload", &[]));
        let mut stat = method("reload", &[]);
        stat.is_static = true;
        class.methods.push(stat);
        let plan = plan_members(&class);
        assert_eq!(plan.groups.len(), 2);
        assert!(!plan.groups[0].is_constructor);
    }

    #[test]
    fn setters_become_accessors_once() {
        let mut class = ClassModel::new("A");
        class.methods.push(method("setURL:", &["url"]));
        class.methods.push(method("setTitle:", &["title"]));
        class.methods.push(method("setTitle:", &["other"]));
        class.methods.push(method("setNeedsDisplay:animated:", &["a", "b"]));
        let plan = plan_members(&class);
        let names: Vec<_> = plan.setters.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["url", "title"]);
        assert_eq!(plan.dropped.len(), 1);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].base, "setNeedsDisplay");
    }

    #[test]
    fn setters_of_declared_properties() {
        let mut class = ClassModel::new("A");
        class.properties.push(PropertyModel::new("title", "NSString"));
        let mut count = PropertyModel::new("count", "NSInteger");
        count.readonly = true;
        class.properties.push(count);
        class.methods.push(method("setTitle:", &["title"]));
        class.methods.push(method("setCount:", &["count"]));
        class.methods.push(method("title", &[]));

        let plan = plan_members(&class);
        assert!(plan.setters.is_empty());
        // A readonly property keeps its setter as a plain method.
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].base, "setCount");
        assert_eq!(plan.dropped.len(), 2);
        assert!(plan.dropped.iter().all(|(_, reason)| !reason.is_warning()));
    }

    #[test]
    fn malformed_methods_become_markers_unless_bound() {
        let mut class = ClassModel::new("A");
        class.methods.push(method("move:by:", &["x"]));
        class.methods.push(method("scroll:", &["x"]));
        class.methods.push(method("scroll:to:", &["x"]));
        let plan = plan_members(&class);
        assert_eq!(plan.incomplete.len(), 1);
        assert_eq!(plan.incomplete[0].selector, "move:by:");
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.dropped, vec![(&class.methods[2], DropReason::MalformedOverload)]);
    }

    #[test]
    fn leading_capitals() {
        assert_eq!(lower_leading_capitals("Title"), "title");
        assert_eq!(lower_leading_capitals("URL"), "url");
        assert_eq!(lower_leading_capitals("URLString"), "urlString");
        assert_eq!(lower_leading_capitals("X"), "x");
    }
}
