//! Symbol names for emitted declarations.

use std::fmt::Write as _;

use cinder_ast::{
    AstContext, BuiltinKind, DeclId, DeclKind, LinkageLanguage, QualType, Qualifiers,
    SourceLanguage, TypeKind,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Produces the IR symbol of a declaration.
///
/// Called with canonical declarations; must return the same name every time
/// it is asked about the same declaration.
pub trait SymbolGenerator {
    fn symbol(&mut self, ast: &AstContext, decl: DeclId) -> String;
}

/// C names verbatim, Itanium mangling for C++ functions outside
/// `extern "C"`, and `anonymous[N]` for unnamed tags.
#[derive(Debug, Default)]
pub struct DefaultMangler {
    c_linkage: FxHashSet<DeclId>,
    anonymous: FxHashMap<DeclId, usize>,
}

impl DefaultMangler {
    pub fn new(ast: &AstContext) -> Self {
        let mut c_linkage = FxHashSet::default();
        if let Some(tu) = ast.translation_unit() {
            collect_c_linkage(ast, tu, false, &mut c_linkage);
        }
        Self {
            c_linkage,
            anonymous: FxHashMap::default(),
        }
    }

    fn anonymous_name(&mut self, decl: DeclId) -> String {
        let next = self.anonymous.len();
        let index = *self.anonymous.entry(decl).or_insert(next);
        format!("anonymous[{index}]")
    }

    fn has_c_linkage(&self, ast: &AstContext, decl: DeclId) -> bool {
        ast.redecls(decl)
            .iter()
            .chain(std::iter::once(&decl))
            .any(|d| self.c_linkage.contains(d))
    }
}

fn collect_c_linkage(ast: &AstContext, decl: DeclId, in_c: bool, out: &mut FxHashSet<DeclId>) {
    match &ast.decl(decl).kind {
        DeclKind::TranslationUnit { decls } | DeclKind::Namespace { decls } => {
            for &child in decls {
                collect_c_linkage(ast, child, in_c, out);
            }
        }
        DeclKind::LinkageSpec { language, decls } => {
            let in_c = *language == LinkageLanguage::C;
            for &child in decls {
                collect_c_linkage(ast, child, in_c, out);
            }
        }
        _ => {
            if in_c {
                out.insert(decl);
            }
        }
    }
}

impl SymbolGenerator for DefaultMangler {
    fn symbol(&mut self, ast: &AstContext, decl: DeclId) -> String {
        let Some(name) = ast.decl_name(decl) else {
            return self.anonymous_name(decl);
        };
        let DeclKind::Function(func) = &ast.decl(decl).kind else {
            return name.to_owned();
        };
        if ast.lang_options().language != SourceLanguage::Cxx
            || name == "main"
            || self.has_c_linkage(ast, decl)
        {
            return name.to_owned();
        }

        let mut out = format!("_Z{}{name}", name.len());
        match ast.ty(func.ty) {
            TypeKind::FunctionProto {
                params, variadic, ..
            } => {
                if params.is_empty() && !variadic {
                    out.push('v');
                }
                for &param in params {
                    mangle_type(ast, param, &mut out);
                }
                if *variadic {
                    out.push('z');
                }
            }
            _ => out.push('v'),
        }
        out
    }
}

fn builtin_code(kind: BuiltinKind) -> &'static str {
    match kind {
        BuiltinKind::Void => "v",
        BuiltinKind::Bool => "b",
        BuiltinKind::CharU | BuiltinKind::CharS => "c",
        BuiltinKind::SChar => "a",
        BuiltinKind::UChar => "h",
        BuiltinKind::Short => "s",
        BuiltinKind::UShort => "t",
        BuiltinKind::Int => "i",
        BuiltinKind::UInt => "j",
        BuiltinKind::Long => "l",
        BuiltinKind::ULong => "m",
        BuiltinKind::LongLong => "x",
        BuiltinKind::ULongLong => "y",
        BuiltinKind::Int128 => "n",
        BuiltinKind::UInt128 => "o",
        BuiltinKind::Half => "Dh",
        BuiltinKind::Float16 => "DF16_",
        BuiltinKind::BFloat16 => "DF16b",
        BuiltinKind::Float => "f",
        BuiltinKind::Double => "d",
        BuiltinKind::LongDouble => "e",
        BuiltinKind::Float128 => "g",
        BuiltinKind::WChar => "w",
        BuiltinKind::Char8 => "Du",
        BuiltinKind::Char16 => "Ds",
        BuiltinKind::Char32 => "Di",
        BuiltinKind::NullPtr => "Dn",
        BuiltinKind::Ibm128 => "u8__ibm128",
    }
}

fn push_cv(quals: Qualifiers, out: &mut String) {
    if quals.contains(Qualifiers::RESTRICT) {
        out.push('r');
    }
    if quals.contains(Qualifiers::VOLATILE) {
        out.push('V');
    }
    if quals.contains(Qualifiers::CONST) {
        out.push('K');
    }
}

/// Top-level qualifiers of a parameter are not part of the signature.
fn mangle_type(ast: &AstContext, qt: QualType, out: &mut String) {
    let qt = ast.desugar(qt);
    match ast.ty(qt.ty) {
        TypeKind::Builtin(kind) => out.push_str(builtin_code(*kind)),
        TypeKind::Pointer { pointee } => {
            out.push('P');
            mangle_pointee(ast, *pointee, out);
        }
        TypeKind::LValueReference { pointee } => {
            out.push('R');
            mangle_pointee(ast, *pointee, out);
        }
        TypeKind::Record(decl) | TypeKind::Enum(decl) => mangle_name(ast, *decl, out),
        TypeKind::ConstantArray { element, size } => {
            let _ = write!(out, "A{size}_");
            mangle_pointee(ast, *element, out);
        }
        TypeKind::IncompleteArray { element }
        | TypeKind::DependentSizedArray { element }
        | TypeKind::VariableArray { element, .. } => {
            out.push_str("A_");
            mangle_pointee(ast, *element, out);
        }
        TypeKind::FunctionProto {
            result,
            params,
            variadic,
        } => {
            out.push('F');
            mangle_type(ast, *result, out);
            if params.is_empty() && !variadic {
                out.push('v');
            }
            for &param in params {
                mangle_type(ast, param, out);
            }
            if *variadic {
                out.push('z');
            }
            out.push('E');
        }
        TypeKind::FunctionNoProto { result } => {
            out.push('F');
            mangle_type(ast, *result, out);
            out.push_str("vE");
        }
        TypeKind::Complex { element } => {
            out.push('C');
            mangle_type(ast, *element, out);
        }
        TypeKind::Vector { element, count } => {
            let _ = write!(out, "Dv{count}_");
            mangle_type(ast, *element, out);
        }
        TypeKind::Atomic { value } => {
            out.push_str("U7_Atomic");
            mangle_type(ast, *value, out);
        }
        TypeKind::MemberPointer { pointee, class } => {
            out.push('M');
            mangle_name(ast, *class, out);
            mangle_pointee(ast, *pointee, out);
        }
        TypeKind::Typedef(_) | TypeKind::Elaborated { .. } | TypeKind::Paren { .. } => {
            out.push('v');
        }
    }
}

fn mangle_pointee(ast: &AstContext, qt: QualType, out: &mut String) {
    let desugared = ast.desugar(qt);
    push_cv(desugared.quals, out);
    mangle_type(ast, desugared, out);
}

fn mangle_name(ast: &AstContext, decl: DeclId, out: &mut String) {
    match ast.decl_name(decl) {
        Some(name) => {
            let _ = write!(out, "{}{name}", name.len());
        }
        None => out.push_str("Ut_"),
    }
}
