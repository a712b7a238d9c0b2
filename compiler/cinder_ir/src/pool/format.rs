//! Textual form of IR types, used by the printer and in diagnostics.

use crate::{Quals, Type, TypePool, TypeData};

fn push_params(buf: &mut String, leading: &[&'static str], quals: Quals) {
    let mut first = true;
    for word in leading.iter().copied().chain(quals.keywords()) {
        buf.push(if first { '<' } else { ',' });
        buf.push_str(word);
        first = false;
    }
    if !first {
        buf.push('>');
    }
}

impl TypePool {
    /// Format a type as a human-readable string.
    pub fn format_type(&self, ty: Type) -> String {
        let mut buf = String::new();
        self.format_type_into(ty, &mut buf);
        buf
    }

    /// Format a type into an existing string buffer.
    pub fn format_type_into(&self, ty: Type, buf: &mut String) {
        match self.get(ty) {
            TypeData::Void => buf.push_str("!hl.void"),
            TypeData::Bool { quals } => {
                buf.push_str("!hl.bool");
                push_params(buf, &[], *quals);
            }
            TypeData::Int {
                kind,
                unsigned,
                quals,
            } => {
                buf.push_str("!hl.");
                buf.push_str(kind.mnemonic());
                let leading: &[&'static str] = if *unsigned { &["unsigned"] } else { &[] };
                push_params(buf, leading, *quals);
            }
            TypeData::Float { kind, quals } => {
                buf.push_str("!hl.");
                buf.push_str(kind.mnemonic());
                push_params(buf, &[], *quals);
            }
            TypeData::Pointer { pointee, quals } => {
                buf.push_str("!hl.ptr<");
                self.format_type_into(*pointee, buf);
                for word in quals.keywords() {
                    buf.push(',');
                    buf.push_str(word);
                }
                buf.push('>');
            }
            TypeData::Array { element, size } => {
                buf.push_str("!hl.array<");
                match size {
                    Some(n) => buf.push_str(&n.to_string()),
                    None => buf.push('?'),
                }
                buf.push_str(", ");
                self.format_type_into(*element, buf);
                buf.push('>');
            }
            TypeData::Named { name, quals } => {
                buf.push_str("!hl.named<\"");
                buf.push_str(name);
                buf.push('"');
                for word in quals.keywords() {
                    buf.push(',');
                    buf.push_str(word);
                }
                buf.push('>');
            }
            TypeData::Function {
                params,
                result,
                variadic,
            } => {
                buf.push_str("!hl.fn<(");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    self.format_type_into(*param, buf);
                }
                if *variadic {
                    buf.push_str(if params.is_empty() { "..." } else { ", ..." });
                }
                buf.push_str(") -> ");
                self.format_type_into(*result, buf);
                buf.push('>');
            }
            TypeData::LValue { inner } => {
                buf.push_str("!hl.lvalue<");
                self.format_type_into(*inner, buf);
                buf.push('>');
            }
        }
    }
}
