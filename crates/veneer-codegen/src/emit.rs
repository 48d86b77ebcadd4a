//! TypeScript wrapper class generation.
//!
//! Each class becomes one module exporting one class. Every member forwards
//! to the runtime bridge:
//!
//! ```text
//! invoke(target, selector, ...args)   target: this.handle or "ClassName"
//! allocate(className)                 fresh, uninitialized instance handle
//! ```

use crate::overload::{plan_members, OverloadGroup, SetterAccessor};
use crate::types::{map_type, sanitize_identifier, TsType};
use smol_str::SmolStr;
use veneer_common::Diagnostic;
use veneer_model::{ClassModel, ClassSet, MethodModel, PropertyModel};

/// Default import path of the runtime bridge.
pub const DEFAULT_BRIDGE_MODULE: &str = "../bridge";

/// Marker written for declarations that cannot be bound.
pub const INCOMPLETE_MARKER: &str = "// @veneer-incomplete";

/// One emitted `.ts` module.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub class_name: SmolStr,
    /// `<Class>.ts`
    pub file_name: String,
    pub source: String,
    /// Methods that were left out.
    pub diagnostics: Vec<Diagnostic>,
}

/// Emits TypeScript wrapper classes.
#[derive(Debug, Clone)]
pub struct TsEmitter {
    bridge_module: String,
}

impl Default for TsEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_BRIDGE_MODULE)
    }
}

impl TsEmitter {
    pub fn new(bridge_module: impl Into<String>) -> Self {
        Self {
            bridge_module: bridge_module.into(),
        }
    }

    /// Emit the module for `class`. `classes` decides which superclasses are
    /// generated alongside it and can be extended.
    pub fn emit_class(&self, class: &ClassModel, classes: &ClassSet) -> GeneratedFile {
        let parent = class
            .parent()
            .filter(|parent| *parent != class.name && classes.contains(parent));

        let mut w = ClassWriter::new(class);
        w.writeln(&format!("// Generated by veneer from `{}`. Do not edit.", class.name));
        w.writeln(&format!(
            "import {{ NativeObject, allocate, invoke }} from \"{}\";",
            self.bridge_module
        ));
        if let Some(parent) = parent {
            w.writeln(&format!("import {{ {} }} from \"./{}\";", parent, parent));
        }
        w.writeln("");

        w.jsdoc(&DocLines {
            description: &class.doc,
            availability: class.availability.as_deref(),
            ..DocLines::default()
        });
        w.writeln(&format!(
            "export class {} extends {} {{",
            class.name,
            parent.unwrap_or("NativeObject")
        ));
        w.indent += 1;
        w.members();
        w.indent -= 1;
        w.writeln("}");

        GeneratedFile {
            class_name: class.name.clone(),
            file_name: format!("{}.ts", class.name),
            source: w.output,
            diagnostics: w.diagnostics,
        }
    }

    /// Emit just the class body members, without imports or the class
    /// wrapper.
    pub fn emit_members(&self, class: &ClassModel) -> String {
        let mut w = ClassWriter::new(class);
        w.indent = 1;
        w.members();
        w.output
    }
}

#[derive(Default)]
struct DocLines<'a> {
    description: &'a str,
    params: Vec<(String, &'a str)>,
    returns: &'a str,
    availability: Option<&'a str>,
}

/// Writer for one class.
struct ClassWriter<'c> {
    class: &'c ClassModel,
    output: String,
    indent: usize,
    /// Whether a member has been written, for blank-line separation.
    wrote_member: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'c> ClassWriter<'c> {
    fn new(class: &'c ClassModel) -> Self {
        Self {
            class,
            output: String::new(),
            indent: 0,
            wrote_member: false,
            diagnostics: Vec::new(),
        }
    }

    fn members(&mut self) {
        let class = self.class;
        for property in &class.properties {
            self.property(property);
        }

        let plan = plan_members(class);
        for (method, reason) in &plan.dropped {
            let message = format!(
                "{}: no binding for `{}{}`: {}",
                class.name,
                if method.is_static { "+" } else { "-" },
                method.selector,
                reason
            );
            if reason.is_warning() {
                tracing::warn!("{}", message);
                self.diagnostics.push(Diagnostic::warning(message));
            } else {
                tracing::debug!("{}", message);
            }
        }
        for setter in &plan.setters {
            self.setter_accessor(setter);
        }
        for group in &plan.groups {
            if group.is_overloaded() {
                self.overloaded(group);
            } else {
                self.single(group);
            }
        }
        for method in &plan.incomplete {
            self.begin_member();
            let prefix = if method.is_static { "static " } else { "" };
            self.writeln(&format!(
                "{} {}{}",
                INCOMPLETE_MARKER,
                prefix,
                sanitize_identifier(method.base_name())
            ));
        }
    }

    fn begin_member(&mut self) {
        if self.wrote_member {
            self.writeln("");
        }
        self.wrote_member = true;
    }

    fn target(&self, is_static: bool) -> String {
        if is_static {
            format!("\"{}\"", self.class.name)
        } else {
            "this.handle".to_string()
        }
    }

    fn property(&mut self, property: &PropertyModel) {
        if property.name.is_empty() {
            return;
        }
        let name = sanitize_identifier(&property.name);
        let ty = map_type(&property.native_type, property.nullable);
        let prefix = if property.is_class { "static " } else { "" };
        let target = self.target(property.is_class);

        self.begin_member();
        self.jsdoc(&DocLines {
            description: &property.doc,
            availability: property.availability.as_deref(),
            ..DocLines::default()
        });
        self.writeln(&format!("{}get {}(): {} {{", prefix, name, ty));
        self.indent += 1;
        self.writeln(&format!(
            "return invoke({}, \"{}\") as {};",
            target,
            property.getter_selector(),
            ty
        ));
        self.indent -= 1;
        self.writeln("}");

        if !property.readonly {
            self.writeln("");
            self.writeln(&format!("{}set {}(value: {}) {{", prefix, name, ty));
            self.indent += 1;
            self.writeln(&format!(
                "invoke({}, \"{}\", value);",
                target,
                property.setter_selector()
            ));
            self.indent -= 1;
            self.writeln("}");
        }
    }

    fn setter_accessor(&mut self, setter: &SetterAccessor<'_>) {
        let method = setter.method;
        let param = &method.params[0];
        let ty = map_type(&param.native_type, param.nullable);

        self.begin_member();
        self.method_doc(method);
        self.writeln(&format!("set {}(value: {}) {{", sanitize_identifier(&setter.name), ty));
        self.indent += 1;
        self.writeln(&format!("invoke(this.handle, \"{}\", value);", method.selector));
        self.indent -= 1;
        self.writeln("}");
    }

    /// Return type as written in the generated signature.
    fn return_type(&self, group: &OverloadGroup<'_>, method: &MethodModel) -> TsType {
        if group.is_constructor {
            TsType::Opaque(self.class.name.to_string())
        } else {
            map_type(&method.return_type, method.return_nullable)
        }
    }

    fn render_return(&self, group: &OverloadGroup<'_>, ty: &TsType) -> String {
        if group.is_constructor {
            self.class.name.to_string()
        } else {
            ty.to_string()
        }
    }

    /// The statement that performs the call for `method`, given its argument
    /// list text.
    fn call(&self, group: &OverloadGroup<'_>, method: &MethodModel, args: &str) -> String {
        if group.is_constructor {
            return format!(
                "return new {}(invoke(allocate(\"{}\"), \"{}\"{}));",
                self.class.name, self.class.name, method.selector, args
            );
        }
        let target = self.target(method.is_static);
        let ret = self.return_type(group, method);
        if ret.is_void() {
            format!("invoke({}, \"{}\"{});", target, method.selector, args)
        } else {
            format!("return invoke({}, \"{}\"{}) as {};", target, method.selector, args, ret)
        }
    }

    fn single(&mut self, group: &OverloadGroup<'_>) {
        let method = group.methods[0];
        let names = param_names(method);
        let params: Vec<String> = method
            .params
            .iter()
            .zip(&names)
            .map(|(p, name)| format!("{}: {}", name, map_type(&p.native_type, p.nullable)))
            .collect();
        let args: String = names.iter().map(|n| format!(", {}", n)).collect();
        let ret = self.render_return(group, &self.return_type(group, method));

        self.begin_member();
        self.method_doc(method);
        self.writeln(&format!(
            "{}{}({}): {} {{",
            static_prefix(group),
            sanitize_identifier(&group.base),
            params.join(", "),
            ret
        ));
        self.indent += 1;
        let call = self.call(group, method, &args);
        self.writeln(&call);
        self.indent -= 1;
        self.writeln("}");
    }

    fn overloaded(&mut self, group: &OverloadGroup<'_>) {
        let name = sanitize_identifier(&group.base);
        let prefix = static_prefix(group);

        self.begin_member();
        let mut return_types: Vec<String> = Vec::new();
        for method in &group.methods {
            let names = param_names(method);
            let params: Vec<String> = method
                .params
                .iter()
                .zip(&names)
                .map(|(p, name)| format!("{}: {}", name, map_type(&p.native_type, p.nullable)))
                .collect();
            let ret = self.render_return(group, &self.return_type(group, method));
            self.method_doc(method);
            self.writeln(&format!("{}{}({}): {};", prefix, name, params.join(", "), ret));
            if !return_types.contains(&ret) {
                return_types.push(ret);
            }
        }

        let positional = positional_params(group);
        let mut params: Vec<String> = positional
            .iter()
            .map(|(name, types)| format!("{}?: {}", name, types.join(" | ")))
            .collect();
        params.push("...rest: unknown[]".to_string());
        let mut collected: Vec<&str> = positional.iter().map(|(name, _)| name.as_str()).collect();
        collected.push("...rest");

        self.writeln(&format!(
            "{}{}({}): {} {{",
            prefix,
            name,
            params.join(", "),
            return_types.join(" | ")
        ));
        self.indent += 1;
        self.writeln(&format!(
            "const args = [{}].slice(0, arguments.length);",
            collected.join(", ")
        ));
        for method in &group.methods {
            self.writeln(&format!("if (args.length === {}) {{", method.arity()));
            self.indent += 1;
            let call = self.call(group, method, ", ...args");
            self.writeln(&call);
            if call.starts_with("invoke(") {
                self.writeln("return;");
            }
            self.indent -= 1;
            self.writeln("}");
        }
        self.writeln(&format!(
            "throw new Error(`UnresolvedOverload: no overload of {} takes ${{args.length}} argument(s)`);",
            group.base
        ));
        self.indent -= 1;
        self.writeln("}");
    }

    fn method_doc(&mut self, method: &MethodModel) {
        let names = param_names(method);
        self.jsdoc(&DocLines {
            description: &method.doc,
            params: names
                .into_iter()
                .zip(&method.params)
                .map(|(name, p)| (name, p.doc.as_str()))
                .collect(),
            returns: &method.return_doc,
            availability: method.availability.as_deref(),
        });
    }

    fn jsdoc(&mut self, doc: &DocLines<'_>) {
        let mut lines = Vec::new();
        if !doc.description.is_empty() {
            lines.push(doc.description.to_string());
        }
        for (name, text) in &doc.params {
            if !text.is_empty() {
                lines.push(format!("@param {} {}", name, text));
            }
        }
        if !doc.returns.is_empty() {
            lines.push(format!("@returns {}", doc.returns));
        }
        if let Some(availability) = doc.availability {
            lines.push(format!("@since {}", availability));
        }
        if lines.is_empty() {
            return;
        }

        self.writeln("/**");
        for line in lines {
            self.writeln(&format!(" * {}", line.replace("*/", "*\\/")));
        }
        self.writeln(" */");
    }

    fn writeln(&mut self, s: &str) {
        if !s.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str("  ");
            }
        }
        self.output.push_str(s);
        self.output.push('\n');
    }
}

fn static_prefix(group: &OverloadGroup<'_>) -> &'static str {
    if group.emits_static() {
        "static "
    } else {
        ""
    }
}

/// Sanitized, unique parameter names for one method.
fn param_names(method: &MethodModel) -> Vec<String> {
    let mut used = Vec::new();
    for (i, param) in method.params.iter().enumerate() {
        let base = if param.name.is_empty() {
            format!("arg{}", i)
        } else {
            sanitize_identifier(&param.name)
        };
        used.push(unique(base, &used));
    }
    used
}

/// Positional union of an overload group's parameters: a name from the first
/// member that has the position, and the distinct types seen there.
fn positional_params(group: &OverloadGroup<'_>) -> Vec<(String, Vec<String>)> {
    let width = group.methods.iter().map(|m| m.arity()).max().unwrap_or(0);
    // `args` and `rest` are taken by the dispatch body.
    let mut used = vec!["args".to_string(), "rest".to_string()];
    let mut result = Vec::with_capacity(width);

    for pos in 0..width {
        let mut name = None;
        let mut types: Vec<String> = Vec::new();
        for method in &group.methods {
            let Some(param) = method.params.get(pos) else { continue };
            if name.is_none() {
                name = Some(param_names(method).swap_remove(pos));
            }
            let ty = map_type(&param.native_type, param.nullable).to_string();
            if !types.contains(&ty) {
                types.push(ty);
            }
        }
        let name = unique(name.unwrap_or_else(|| format!("arg{}", pos)), &used);
        used.push(name.clone());
        result.push((name, types));
    }

    result
}

fn unique(base: String, used: &[String]) -> String {
    if !used.contains(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or(base)
}
