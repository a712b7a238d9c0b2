//! The top-level IR container.

use rustc_hash::FxHashMap;

use crate::{InsertPoint, Location, OpId, OpKind, Operation, Region, Type, TypePool};

/// Size and ABI alignment recorded for an IR type, in bits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct DataLayoutEntry {
    pub size_bits: u64,
    pub align_bits: u32,
}

/// Ordered registry of type layouts.
///
/// The first registration of a type wins; later ones are ignored.
#[derive(Clone, Debug, Default)]
pub struct DataLayoutBlueprint {
    entries: Vec<(Type, DataLayoutEntry)>,
    index: FxHashMap<Type, usize>,
}

impl DataLayoutBlueprint {
    /// Register `entry` for `ty` unless it already has one. Returns whether
    /// the entry was inserted.
    pub fn try_emplace(&mut self, ty: Type, entry: DataLayoutEntry) -> bool {
        if self.index.contains_key(&ty) {
            return false;
        }
        self.index.insert(ty, self.entries.len());
        self.entries.push((ty, entry));
        true
    }

    pub fn get(&self, ty: Type) -> Option<DataLayoutEntry> {
        self.index.get(&ty).map(|&i| self.entries[i].1)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (Type, DataLayoutEntry)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ModuleAttrs {
    pub target_triple: String,
    pub source_language: String,
}

/// One lowered translation unit.
#[derive(Clone, Debug)]
pub struct Module {
    name: String,
    loc: Location,
    attrs: ModuleAttrs,
    types: TypePool,
    ops: Vec<Operation>,
    body: Region,
    symbols: FxHashMap<String, OpId>,
    data_layout: DataLayoutBlueprint,
}

impl Module {
    pub fn new(name: impl Into<String>, loc: Location) -> Self {
        Self {
            name: name.into(),
            loc,
            attrs: ModuleAttrs::default(),
            types: TypePool::new(),
            ops: Vec::new(),
            body: Region::new(),
            symbols: FxHashMap::default(),
            data_layout: DataLayoutBlueprint::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn loc(&self) -> &Location {
        &self.loc
    }

    pub fn attrs(&self) -> &ModuleAttrs {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut ModuleAttrs {
        &mut self.attrs
    }

    pub fn types(&self) -> &TypePool {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypePool {
        &mut self.types
    }

    pub fn data_layout(&self) -> &DataLayoutBlueprint {
        &self.data_layout
    }

    pub fn data_layout_mut(&mut self) -> &mut DataLayoutBlueprint {
        &mut self.data_layout
    }

    // ── Operations ──────────────────────────────────────────────

    /// Add an operation to the arena without placing it in any region.
    pub fn insert(&mut self, op: Operation) -> OpId {
        let raw = u32::try_from(self.ops.len())
            .unwrap_or_else(|_| panic!("module exceeds u32::MAX operations"));
        self.ops.push(op);
        OpId::new(raw)
    }

    /// Add an operation and append it at `point`.
    pub fn append(&mut self, point: InsertPoint, op: Operation) -> OpId {
        let id = self.insert(op);
        self.region_mut(point).push(id);
        id
    }

    #[inline]
    pub fn op(&self, id: OpId) -> &Operation {
        &self.ops[id.index()]
    }

    #[inline]
    pub fn op_mut(&mut self, id: OpId) -> &mut Operation {
        &mut self.ops[id.index()]
    }

    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    pub fn contains(&self, id: OpId) -> bool {
        id.index() < self.ops.len()
    }

    pub fn body(&self) -> &Region {
        &self.body
    }

    /// Top-level operations in order.
    pub fn top_level(&self) -> impl Iterator<Item = OpId> + '_ {
        self.body.iter()
    }

    pub fn region(&self, point: InsertPoint) -> &Region {
        match point {
            InsertPoint::ModuleBody => &self.body,
            InsertPoint::Region { op, index } => &self.ops[op.index()].regions[index],
        }
    }

    pub fn region_mut(&mut self, point: InsertPoint) -> &mut Region {
        match point {
            InsertPoint::ModuleBody => &mut self.body,
            InsertPoint::Region { op, index } => &mut self.ops[op.index()].regions[index],
        }
    }

    /// Every region reachable from the module body, parents before children.
    pub fn regions(&self) -> Vec<InsertPoint> {
        let mut out = vec![InsertPoint::ModuleBody];
        let mut cursor = 0;
        while cursor < out.len() {
            let point = out[cursor];
            cursor += 1;
            for op in self.region(point).iter() {
                for index in 0..self.op(op).regions.len() {
                    out.push(InsertPoint::Region { op, index });
                }
            }
        }
        out
    }

    // ── Symbols ─────────────────────────────────────────────────

    /// Bind the function or global variable `sym` to `op`, returning the
    /// previous binding.
    pub fn register_symbol(&mut self, sym: impl Into<String>, op: OpId) -> Option<OpId> {
        self.symbols.insert(sym.into(), op)
    }

    pub fn lookup_symbol(&self, sym: &str) -> Option<OpId> {
        self.symbols.get(sym).copied()
    }

    /// Operations that define top-level symbols: the module body and the
    /// bodies of linkage specifications, in order.
    pub fn symbol_ops(&self) -> Vec<OpId> {
        let mut out = Vec::new();
        self.collect_symbol_ops(&self.body, &mut out);
        out
    }

    fn collect_symbol_ops(&self, region: &Region, out: &mut Vec<OpId>) {
        for id in region.iter() {
            let op = self.op(id);
            match &op.kind {
                OpKind::LinkageSpec { .. } => {
                    for inner in &op.regions {
                        self.collect_symbol_ops(inner, out);
                    }
                }
                kind if kind.symbol().is_some() => out.push(id),
                _ => {}
            }
        }
    }
}
