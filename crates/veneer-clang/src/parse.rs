//! Objective-C header parsing using libclang.

use crate::ast::{
    MethodDecl, Nullability, ObjcAst, ObjcNode, ObjcNodeKind, PropertyAttributes, PropertyDecl,
    SourceLocation, TypeRef,
};
use crate::error::{ClangError, Result};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_ulong};
use std::path::{Path, PathBuf};
use std::ptr;

/// Parser that uses libclang to parse Objective-C headers.
pub struct ClangParser {
    index: clang_sys::CXIndex,
    args: Vec<String>,
}

impl ClangParser {
    /// Load libclang and create an index.
    ///
    /// `libclang_dir` overrides the library search; otherwise `LIBCLANG_PATH`
    /// and the usual system locations are tried.
    pub fn new(libclang_dir: Option<&Path>) -> Result<Self> {
        if !clang_sys::is_loaded() {
            if let Some(dir) = libclang_dir {
                std::env::set_var("LIBCLANG_PATH", dir);
            }
            clang_sys::load().map_err(|reason| ClangError::LibraryNotFound { reason })?;
            tracing::debug!("loaded libclang");
        }

        unsafe {
            let index = clang_sys::clang_createIndex(0, 0);
            if index.is_null() {
                return Err(ClangError::IndexCreation);
            }
            Ok(Self {
                index,
                args: vec![
                    "-x".to_string(),
                    "objective-c".to_string(),
                    "-fobjc-arc".to_string(),
                ],
            })
        }
    }

    /// Resolve framework headers against an SDK.
    pub fn with_sdk_root(mut self, sdk_root: impl Into<PathBuf>) -> Self {
        self.args.push("-isysroot".to_string());
        self.args.push(sdk_root.into().to_string_lossy().into_owned());
        self
    }

    /// Extra arguments passed to clang verbatim.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Parse header text as if it were the file `filename`.
    pub fn parse_string(&self, source: &str, filename: &str) -> Result<ObjcAst> {
        let c_filename = c_string(filename)?;
        let c_source = c_string(source)?;

        let unsaved_file = clang_sys::CXUnsavedFile {
            Filename: c_filename.as_ptr(),
            Contents: c_source.as_ptr(),
            Length: source.len() as c_ulong,
        };
        self.parse(&c_filename, unsaved_file)
    }

    fn parse(&self, c_path: &CStr, mut unsaved: clang_sys::CXUnsavedFile) -> Result<ObjcAst> {
        let args = self
            .args
            .iter()
            .map(|a| c_string(a))
            .collect::<Result<Vec<_>>>()?;
        let c_args: Vec<*const c_char> = args.iter().map(|s| s.as_ptr()).collect();

        unsafe {
            let tu = clang_sys::clang_parseTranslationUnit(
                self.index,
                c_path.as_ptr(),
                c_args.as_ptr(),
                c_args.len() as c_int,
                &mut unsaved,
                1,
                clang_sys::CXTranslationUnit_SkipFunctionBodies,
            );

            if tu.is_null() {
                return Err(ClangError::ParseFailed {
                    path: c_path.to_string_lossy().into_owned(),
                });
            }

            // Missing SDK headers produce errors but still leave a usable AST.
            let num_diagnostics = clang_sys::clang_getNumDiagnostics(tu);
            for i in 0..num_diagnostics {
                let diag = clang_sys::clang_getDiagnostic(tu, i);
                let severity = clang_sys::clang_getDiagnosticSeverity(diag);
                if severity >= clang_sys::CXDiagnostic_Error {
                    let spelling = clang_sys::clang_getDiagnosticSpelling(diag);
                    let message = cx_string_to_string(spelling);
                    tracing::warn!(%message, "clang reported an error");
                }
                clang_sys::clang_disposeDiagnostic(diag);
            }

            let cursor = clang_sys::clang_getTranslationUnitCursor(tu);
            let root = convert_cursor(cursor);

            clang_sys::clang_disposeTranslationUnit(tu);

            Ok(ObjcAst {
                translation_unit: root,
            })
        }
    }
}

impl Drop for ClangParser {
    fn drop(&mut self) {
        unsafe { clang_sys::clang_disposeIndex(self.index) }
    }
}

/// Convert a cursor and, for containers in the main file, its children.
fn convert_cursor(cursor: clang_sys::CXCursor) -> ObjcNode {
    unsafe {
        let kind = clang_sys::clang_getCursorKind(cursor);
        let location = get_location(cursor);

        let node_kind = convert_cursor_kind(cursor, kind);
        let descend = match kind {
            clang_sys::CXCursor_TranslationUnit => true,
            clang_sys::CXCursor_ObjCInterfaceDecl | clang_sys::CXCursor_ObjCCategoryDecl => {
                location.in_main_file
            }
            _ => false,
        };

        let mut children = Vec::new();
        if descend {
            extern "C" fn visitor(
                child: clang_sys::CXCursor,
                _parent: clang_sys::CXCursor,
                data: clang_sys::CXClientData,
            ) -> clang_sys::CXChildVisitResult {
                unsafe {
                    let children = &mut *(data as *mut Vec<ObjcNode>);

                    if clang_sys::clang_Cursor_isNull(child) != 0 {
                        return clang_sys::CXChildVisit_Continue;
                    }

                    children.push(convert_cursor(child));
                    clang_sys::CXChildVisit_Continue
                }
            }

            let children_ptr: *mut Vec<ObjcNode> = &mut children;
            let data = children_ptr as clang_sys::CXClientData;
            clang_sys::clang_visitChildren(cursor, visitor, data);
        }

        let node_kind = match node_kind {
            // The extended class is only reachable through a class reference child.
            ObjcNodeKind::CategoryDecl { category, .. } => ObjcNodeKind::CategoryDecl {
                class_name: children
                    .iter()
                    .find_map(|c| match &c.kind {
                        ObjcNodeKind::ClassRef { name } => Some(name.clone()),
                        _ => None,
                    })
                    .unwrap_or_default(),
                category,
            },
            other => other,
        };

        let comment = match kind {
            clang_sys::CXCursor_TranslationUnit => None,
            _ => Some(cx_string_to_string(clang_sys::clang_Cursor_getRawCommentText(cursor)))
                .filter(|c| !c.is_empty()),
        };

        ObjcNode {
            kind: node_kind,
            children,
            location,
            comment,
        }
    }
}

unsafe fn convert_cursor_kind(
    cursor: clang_sys::CXCursor,
    kind: clang_sys::CXCursorKind,
) -> ObjcNodeKind {
    match kind {
        clang_sys::CXCursor_TranslationUnit => ObjcNodeKind::TranslationUnit,
        clang_sys::CXCursor_ObjCInterfaceDecl => ObjcNodeKind::InterfaceDecl {
            name: cursor_spelling(cursor),
        },
        clang_sys::CXCursor_ObjCCategoryDecl => ObjcNodeKind::CategoryDecl {
            class_name: String::new(),
            category: cursor_spelling(cursor),
        },
        clang_sys::CXCursor_ObjCClassRef => ObjcNodeKind::ClassRef {
            name: cursor_spelling(cursor),
        },
        clang_sys::CXCursor_ObjCInstanceMethodDecl => {
            ObjcNodeKind::InstanceMethodDecl(method_decl(cursor))
        }
        clang_sys::CXCursor_ObjCClassMethodDecl => {
            ObjcNodeKind::ClassMethodDecl(method_decl(cursor))
        }
        clang_sys::CXCursor_ObjCPropertyDecl => ObjcNodeKind::PropertyDecl(property_decl(cursor)),
        _ => ObjcNodeKind::Other,
    }
}

unsafe fn method_decl(cursor: clang_sys::CXCursor) -> MethodDecl {
    let return_type = type_ref(clang_sys::clang_getCursorResultType(cursor));

    let num_args = clang_sys::clang_Cursor_getNumArguments(cursor).max(0) as u32;
    let params = (0..num_args)
        .map(|i| {
            let arg = clang_sys::clang_Cursor_getArgument(cursor, i);
            (cursor_spelling(arg), type_ref(clang_sys::clang_getCursorType(arg)))
        })
        .collect();

    MethodDecl {
        selector: cursor_spelling(cursor),
        return_type,
        params,
    }
}

unsafe fn property_decl(cursor: clang_sys::CXCursor) -> PropertyDecl {
    let attributes = clang_sys::clang_Cursor_getObjCPropertyAttributes(cursor, 0);
    PropertyDecl {
        name: cursor_spelling(cursor),
        ty: type_ref(clang_sys::clang_getCursorType(cursor)),
        attributes: PropertyAttributes(attributes as u32),
        getter: cx_string_to_string(clang_sys::clang_Cursor_getObjCPropertyGetterName(cursor)),
        setter: cx_string_to_string(clang_sys::clang_Cursor_getObjCPropertySetterName(cursor)),
    }
}

unsafe fn type_ref(ty: clang_sys::CXType) -> TypeRef {
    let nullability = match clang_sys::clang_Type_getNullability(ty) {
        clang_sys::CXTypeNullability_Nullable => Nullability::Nullable,
        clang_sys::CXTypeNullability_NonNull => Nullability::NonNull,
        _ => Nullability::Unspecified,
    };
    TypeRef {
        spelling: cx_string_to_string(clang_sys::clang_getTypeSpelling(ty)),
        nullability,
    }
}

/// Get source location from a cursor.
fn get_location(cursor: clang_sys::CXCursor) -> SourceLocation {
    unsafe {
        let loc = clang_sys::clang_getCursorLocation(cursor);
        let mut file: clang_sys::CXFile = ptr::null_mut();
        let mut line: u32 = 0;
        let mut column: u32 = 0;

        let offset = ptr::null_mut();
        clang_sys::clang_getSpellingLocation(loc, &mut file, &mut line, &mut column, offset);

        let file_name = if !file.is_null() {
            let name = clang_sys::clang_getFileName(file);
            Some(cx_string_to_string(name))
        } else {
            None
        };

        SourceLocation {
            file: file_name,
            line,
            column,
            in_main_file: clang_sys::clang_Location_isFromMainFile(loc) != 0,
        }
    }
}

fn c_string(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| ClangError::InvalidArgument(s.chars().take(40).collect()))
}

/// Convert a CXString to a Rust String.
fn cx_string_to_string(cx_string: clang_sys::CXString) -> String {
    unsafe {
        let c_str = clang_sys::clang_getCString(cx_string);
        let result = if c_str.is_null() {
            String::new()
        } else {
            CStr::from_ptr(c_str).to_string_lossy().into_owned()
        };
        clang_sys::clang_disposeString(cx_string);
        result
    }
}

/// Get the spelling of a cursor.
fn cursor_spelling(cursor: clang_sys::CXCursor) -> String {
    unsafe {
        let spelling = clang_sys::clang_getCursorSpelling(cursor);
        cx_string_to_string(spelling)
    }
}
