//! Module construction driver.
//!
//! A [`Driver`] owns one module from creation to freeze: declarations are
//! emitted into it, [`Driver::finalize`] drains deferred work and checks the
//! result, and [`Driver::freeze`] hands the finished module to the caller.

use cinder_ast::{AstContext, DeclId};
use cinder_ir::{Location, Module, OpId};

use crate::context::CodegenContext;
use crate::meta::{DefaultMetaGen, IdMetaGen, MetaGenerator};
use crate::symbols::{DefaultMangler, SymbolGenerator};
use crate::visitor::Strategy;
use crate::{CodegenError, CodegenOptions, Result};

pub struct Driver<'ast> {
    cx: CodegenContext<'ast>,
}

impl<'ast> Driver<'ast> {
    /// A driver with the default symbol mangler and the location generator
    /// selected by `options.locs_as_meta_ids`.
    pub fn new(ast: &'ast AstContext, options: CodegenOptions) -> Self {
        let meta: Box<dyn MetaGenerator> = if options.locs_as_meta_ids {
            Box::new(IdMetaGen::default())
        } else {
            Box::new(DefaultMetaGen)
        };
        Self::with_generators(ast, options, Box::new(DefaultMangler::new(ast)), meta)
    }

    pub fn with_generators(
        ast: &'ast AstContext,
        options: CodegenOptions,
        symbols: Box<dyn SymbolGenerator>,
        meta: Box<dyn MetaGenerator>,
    ) -> Self {
        let chain = if options.disable_unsupported {
            Strategy::STRICT
        } else {
            Strategy::FULL
        };
        let mut module = Module::new(ast.main_file().unwrap_or("unknown"), Location::Unknown);
        let attrs = module.attrs_mut();
        attrs.target_triple = ast.target().triple.clone();
        attrs.source_language = options.lang.as_str().to_owned();
        tracing::debug!(
            module = module.name(),
            lang = %options.lang,
            triple = %ast.target().triple,
            "created module"
        );
        Self {
            cx: CodegenContext::new(ast, options, module, chain, symbols, meta),
        }
    }

    /// Lower one declaration into the module body.
    pub fn emit(&mut self, decl: DeclId) -> Result<Option<OpId>> {
        self.cx.at_module_scope(|cx| cx.emit_top_level(decl))
    }

    pub fn emit_group(&mut self, decls: &[DeclId]) -> Result<()> {
        for &decl in decls {
            self.emit(decl)?;
        }
        Ok(())
    }

    /// Lower the whole translation unit, if the AST has one.
    pub fn emit_translation_unit(&mut self) -> Result<()> {
        let Some(tu) = self.cx.ast.translation_unit() else {
            return Ok(());
        };
        self.cx.at_module_scope(|cx| cx.visit_decl(tu)).map(drop)
    }

    /// Emit deferred declarations, apply the module release checks and
    /// verify the result.
    pub fn finalize(&mut self) -> Result<()> {
        self.cx.drain()?;
        if let Some(replacement) = self.cx.replacements.first() {
            return Err(CodegenError::not_implemented(format!(
                "symbol replacement for @{}",
                replacement.symbol
            )));
        }
        self.check_release()?;
        tracing::debug!(
            ops = self.cx.module.op_count(),
            emitted = self.cx.worklist.emitted_count(),
            "module released"
        );
        if self.cx.options.disable_verifier {
            return Ok(());
        }
        match cinder_ir::verify(&self.cx.module) {
            Ok(()) => Ok(()),
            Err(errors) => {
                for error in &errors {
                    tracing::warn!(%error, "verification failed");
                }
                Err(CodegenError::Verification { errors })
            }
        }
    }

    /// Language and target features whose module-level emission is absent.
    fn check_release(&self) -> Result<()> {
        let ast = self.cx.ast;
        let lang = ast.lang_options();
        let target = ast.target();
        let unsupported = if lang.openmp && !lang.openmp_simd {
            Some("OpenMP runtime support")
        } else if lang.cuda {
            Some("CUDA runtime support")
        } else if target.is_wasm() && !target.is_emscripten() {
            Some("WebAssembly target without Emscripten")
        } else if lang.sanitize_address {
            Some("AddressSanitizer globals")
        } else if lang.sanitize_cfi_cross_dso {
            Some("CFI cross-DSO checks")
        } else if lang.coverage_mapping {
            Some("coverage mapping")
        } else {
            None
        };
        match unsupported {
            Some(feature) => Err(CodegenError::not_implemented(feature)),
            None => Ok(()),
        }
    }

    /// Whether the module currently passes verification.
    pub fn verify(&self) -> bool {
        cinder_ir::verify(&self.cx.module).is_ok()
    }

    pub fn module(&self) -> &Module {
        &self.cx.module
    }

    pub fn context(&self) -> &CodegenContext<'ast> {
        &self.cx
    }

    /// Stop construction and take the module.
    pub fn freeze(self) -> Module {
        self.cx.into_module()
    }
}
