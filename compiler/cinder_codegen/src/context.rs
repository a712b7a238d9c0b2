//! Shared state of one module's construction.
//!
//! Everything the strategies read or update lives here and is passed by
//! `&mut`: the AST, the module under construction, the entity cache, the
//! deferred worklist and the stack of insertion points.

use cinder_ast::{AstContext, DeclId, DeclKind, SourceLocation, StorageClass};
use cinder_ir::{InsertPoint, Location, Module, OpId, OpKind, Operation};

use crate::cache::EntityCache;
use crate::meta::MetaGenerator;
use crate::symbols::SymbolGenerator;
use crate::types::TypeConverter;
use crate::visitor::Strategy;
use crate::worklist::Worklist;
use crate::{CodegenError, CodegenOptions, Result};

/// A symbol that must be redirected to a different operation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Replacement {
    pub symbol: String,
    pub original: OpId,
    pub replacement: OpId,
}

pub struct CodegenContext<'ast> {
    pub(crate) ast: &'ast AstContext,
    pub(crate) options: CodegenOptions,
    pub(crate) module: Module,
    pub(crate) cache: EntityCache,
    pub(crate) worklist: Worklist,
    pub(crate) chain: &'static [Strategy],
    pub(crate) replacements: Vec<Replacement>,
    symbols: Box<dyn SymbolGenerator>,
    meta: Box<dyn MetaGenerator>,
    insertion: Vec<InsertPoint>,
}

impl<'ast> CodegenContext<'ast> {
    pub(crate) fn new(
        ast: &'ast AstContext,
        options: CodegenOptions,
        module: Module,
        chain: &'static [Strategy],
        symbols: Box<dyn SymbolGenerator>,
        meta: Box<dyn MetaGenerator>,
    ) -> Self {
        Self {
            ast,
            options,
            module,
            cache: EntityCache::new(),
            worklist: Worklist::new(),
            chain,
            replacements: Vec::new(),
            symbols,
            meta,
            insertion: Vec::new(),
        }
    }

    pub fn ast(&self) -> &'ast AstContext {
        self.ast
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    pub fn worklist(&self) -> &Worklist {
        &self.worklist
    }

    pub fn replacements(&self) -> &[Replacement] {
        &self.replacements
    }

    pub(crate) fn into_module(self) -> Module {
        self.module
    }

    // ── Insertion ───────────────────────────────────────────────

    /// Where new operations are appended; the module body when no scope is
    /// active.
    pub fn insertion_point(&self) -> InsertPoint {
        self.insertion
            .last()
            .copied()
            .unwrap_or(InsertPoint::ModuleBody)
    }

    /// Run `f` with `point` as the insertion point, restoring the previous
    /// one afterwards whether or not `f` succeeds.
    pub(crate) fn with_insertion<R>(
        &mut self,
        point: InsertPoint,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        self.insertion.push(point);
        let result = f(self);
        self.insertion.pop();
        result
    }

    pub(crate) fn at_module_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.with_insertion(InsertPoint::ModuleBody, f)
    }

    /// Like [`at_module_scope`](Self::at_module_scope), but a linkage
    /// specification body being emitted keeps receiving declarations.
    pub(crate) fn at_declaration_scope<R>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let point = match self.insertion_point() {
            InsertPoint::Region { op, index }
                if matches!(self.module.op(op).kind, OpKind::LinkageSpec { .. }) =>
            {
                InsertPoint::Region { op, index }
            }
            _ => InsertPoint::ModuleBody,
        };
        self.with_insertion(point, f)
    }

    pub(crate) fn append(&mut self, op: Operation) -> OpId {
        let point = self.insertion_point();
        self.module.append(point, op)
    }

    // ── Naming ──────────────────────────────────────────────────

    pub(crate) fn location(&mut self, loc: SourceLocation) -> Location {
        self.meta.location(self.ast, loc)
    }

    pub(crate) fn decl_location(&mut self, decl: DeclId) -> Location {
        let loc = self.ast.location(decl);
        self.location(loc)
    }

    /// Symbol of the entity `decl` declares.
    pub(crate) fn symbol(&mut self, decl: DeclId) -> String {
        let canonical = self.ast.canonical_decl(decl);
        self.symbols.symbol(self.ast, canonical)
    }

    pub fn types(&mut self) -> TypeConverter<'_, 'ast> {
        TypeConverter::new(self)
    }

    // ── Top-level emission ──────────────────────────────────────

    /// Emit a top-level declaration, unless it is a definition that is only
    /// emitted once something refers to it.
    pub(crate) fn emit_top_level(&mut self, decl: DeclId) -> Result<Option<OpId>> {
        if self.is_lazily_emittable(decl) {
            let canonical = self.ast.canonical_decl(decl);
            if !self.worklist.is_pending(canonical) && !self.worklist.is_emitted(canonical) {
                tracing::debug!(
                    name = self.ast.decl_name(decl).unwrap_or_default(),
                    "deferring unreferenced definition"
                );
                self.worklist.add_lazy_candidate(canonical);
                return Ok(None);
            }
        }
        self.visit_decl(decl)
    }

    /// `static` and `inline` function definitions other than `main`.
    pub(crate) fn is_lazily_emittable(&self, decl: DeclId) -> bool {
        let ast = self.ast;
        match &ast.decl(decl).kind {
            DeclKind::Function(func) => {
                func.body.is_some()
                    && (func.storage == StorageClass::Static || func.is_inline)
                    && ast.decl_name(decl) != Some("main")
            }
            _ => false,
        }
    }

    /// Emit pending declarations until a round schedules nothing new.
    pub(crate) fn drain(&mut self) -> Result<()> {
        let mut round = 0usize;
        loop {
            self.check_vtables()?;
            if !self.worklist.has_pending() {
                return Ok(());
            }
            round += 1;
            let pending = self.worklist.take_pending();
            tracing::debug!(round, pending = pending.len(), "draining deferred declarations");
            for canonical in pending {
                if self.worklist.is_emitted(canonical) {
                    continue;
                }
                let target = self.ast.definition(canonical).unwrap_or(canonical);
                self.at_module_scope(|cx| cx.visit_decl(target))?;
            }
        }
    }

    fn check_vtables(&self) -> Result<()> {
        match self.worklist.deferred_vtables().first() {
            Some(&record) => Err(CodegenError::not_implemented(format!(
                "virtual table of '{}'",
                self.ast.decl_name(record).unwrap_or("<anonymous>")
            ))),
            None => Ok(()),
        }
    }
}
