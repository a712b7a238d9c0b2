//! Deterministic textual dump of a module.
//!
//! Values print as `%N`, where `N` is the arena index of the defining
//! operation, so two modules built by the same sequence of insertions print
//! identically.

use std::fmt::Write as _;

use crate::{ConstValue, LinkageLang, Module, OpId, OpKind, Region, Type};

/// Print `module` without operation locations.
pub fn print_module(module: &Module) -> String {
    Printer::new(module, false).print()
}

/// Print `module`, suffixing every operation with its location.
pub fn print_module_with_locations(module: &Module) -> String {
    Printer::new(module, true).print()
}

struct Printer<'m> {
    module: &'m Module,
    buf: String,
    indent: usize,
    locations: bool,
}

impl<'m> Printer<'m> {
    fn new(module: &'m Module, locations: bool) -> Self {
        Self {
            module,
            buf: String::new(),
            indent: 0,
            locations,
        }
    }

    fn print(mut self) -> String {
        let module = self.module;
        let attrs = module.attrs();
        let _ = write!(
            self.buf,
            "module @\"{}\" attributes {{source_language = \"{}\", target_triple = \"{}\"}}",
            module.name(),
            attrs.source_language,
            attrs.target_triple
        );
        if self.locations {
            let _ = write!(self.buf, " {}", module.loc());
        }
        self.buf.push_str(" {\n");
        self.region_body(module.body());
        self.buf.push_str("}\n");

        let layout = module.data_layout();
        if !layout.is_empty() {
            self.buf.push_str("data_layout {\n");
            for (ty, entry) in layout.iter() {
                let _ = writeln!(
                    self.buf,
                    "  {} = <size {}, align {}>",
                    self.ty(ty),
                    entry.size_bits,
                    entry.align_bits
                );
            }
            self.buf.push_str("}\n");
        }
        self.buf
    }

    fn ty(&self, ty: Type) -> String {
        self.module.types().format_type(ty)
    }

    fn region_body(&mut self, region: &'m Region) {
        self.indent += 1;
        for op in region.iter() {
            self.op(op);
        }
        self.indent -= 1;
    }

    fn line_start(&mut self) {
        for _ in 0..self.indent {
            self.buf.push_str("  ");
        }
    }

    fn op(&mut self, id: OpId) {
        let module = self.module;
        let op = module.op(id);
        self.line_start();
        if op.result.is_some() && !matches!(op.kind, OpKind::Func { .. } | OpKind::LlFunc { .. })
        {
            let _ = write!(self.buf, "{id} = ");
        }

        match &op.kind {
            OpKind::Func {
                sym,
                ty,
                linkage,
                flags,
            }
            | OpKind::LlFunc {
                sym,
                ty,
                linkage,
                flags,
            } => {
                let mnemonic = if matches!(op.kind, OpKind::Func { .. }) {
                    "hl.func"
                } else {
                    "ll.func"
                };
                let _ = write!(
                    self.buf,
                    "{mnemonic} @{sym} {} {}",
                    self.ty(*ty),
                    linkage.as_str()
                );
                if flags.contains(crate::FuncFlags::INLINE) {
                    self.buf.push_str(" inline");
                }
                if flags.contains(crate::FuncFlags::NORETURN) {
                    self.buf.push_str(" noreturn");
                }
            }
            OpKind::Param { name } => {
                let _ = write!(self.buf, "hl.param @{}", name.as_deref().unwrap_or("_"));
            }
            OpKind::Var {
                sym,
                storage,
                local,
            } => {
                let _ = write!(self.buf, "hl.var @{sym}");
                if *local {
                    self.buf.push_str(" local");
                }
                if *storage != crate::VarStorage::None {
                    let _ = write!(self.buf, " {}", storage.as_str());
                }
            }
            OpKind::Typedef { sym, ty } => {
                let _ = write!(self.buf, "hl.typedef @{sym} : {}", self.ty(*ty));
            }
            OpKind::TypeAlias { sym, ty } => {
                let _ = write!(self.buf, "hl.alias @{sym} : {}", self.ty(*ty));
            }
            OpKind::Record { sym, tag, complete } => {
                let _ = write!(self.buf, "{} @{sym}", tag.mnemonic());
                if !complete {
                    self.buf.push_str(" incomplete");
                }
            }
            OpKind::Field {
                name,
                ty,
                bit_width,
            } => {
                let _ = write!(self.buf, "hl.field @{name} : {}", self.ty(*ty));
                if let Some(bits) = bit_width {
                    let _ = write!(self.buf, " bits {bits}");
                }
            }
            OpKind::Enum { sym, underlying } => {
                let _ = write!(self.buf, "hl.enum @{sym}");
                if let Some(ty) = underlying {
                    let _ = write!(self.buf, " : {}", self.ty(*ty));
                }
            }
            OpKind::EnumConstant { name, value } => {
                let _ = write!(self.buf, "hl.enum.const @{name} = {value}");
            }
            OpKind::LinkageSpec { lang } => {
                let lang = match lang {
                    LinkageLang::C => "C",
                    LinkageLang::Cxx => "C++",
                };
                let _ = write!(self.buf, "hl.linkage_spec \"{lang}\"");
            }
            OpKind::Label { name } => {
                let _ = write!(self.buf, "hl.label @{name}");
            }
            OpKind::Empty => self.buf.push_str("hl.empty"),
            OpKind::AccessSpec { access } => {
                let _ = write!(self.buf, "hl.access {}", access.as_str());
            }
            OpKind::Scope => self.buf.push_str("hl.scope"),
            OpKind::Return { value } => {
                self.buf.push_str("hl.return");
                if let Some(value) = value {
                    let _ = write!(self.buf, " {value}");
                }
            }
            OpKind::Const { value } => match value {
                ConstValue::Int(v) => {
                    let _ = write!(self.buf, "hl.const {v}");
                }
                ConstValue::Float(bits) => {
                    let _ = write!(self.buf, "hl.const {:e}", f64::from_bits(*bits));
                }
            },
            OpKind::DeclRef { sym, target } => {
                let _ = write!(self.buf, "hl.ref @{sym} ({target})");
            }
            OpKind::Call { callee, args } => {
                let _ = write!(self.buf, "hl.call @{callee}(");
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.buf.push_str(", ");
                    }
                    let _ = write!(self.buf, "{arg}");
                }
                self.buf.push(')');
            }
            OpKind::Yield { value } => {
                self.buf.push_str("hl.value.yield");
                if let Some(value) = value {
                    let _ = write!(self.buf, " {value}");
                }
            }
            OpKind::Unreachable => self.buf.push_str("hl.unreachable"),
            OpKind::Unsupported { node } => {
                let _ = write!(self.buf, "unsup.op \"{node}\"");
            }
            OpKind::Cell { name } => {
                let _ = write!(self.buf, "ll.cell @{name}");
            }
            OpKind::InitCell { name, value } => {
                let _ = write!(self.buf, "ll.cell_init @{name} {value}");
            }
            OpKind::Alloca { name } => {
                let _ = write!(self.buf, "ll.alloca @{name}");
            }
            OpKind::Store { value, target } => {
                let _ = write!(self.buf, "ll.store {value}, {target}");
            }
        }

        if let Some(result) = op.result {
            if !matches!(op.kind, OpKind::Func { .. } | OpKind::LlFunc { .. }) {
                let _ = write!(self.buf, " : {}", self.ty(result));
            }
        }
        if self.locations {
            let _ = write!(self.buf, " {}", op.loc);
        }

        let has_body = op.regions.iter().any(|r| !r.is_empty());
        if has_body {
            self.buf.push_str(" {\n");
            for (index, region) in op.regions.iter().enumerate() {
                if index > 0 {
                    self.line_start();
                    self.buf.push_str("} {\n");
                }
                self.region_body(region);
            }
            self.line_start();
            self.buf.push('}');
        }
        self.buf.push('\n');
    }
}
