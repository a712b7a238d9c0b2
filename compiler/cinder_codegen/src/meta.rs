//! Location metadata attached to emitted operations.

use cinder_ast::{AstContext, SourceLocation};
use cinder_ir::Location;

pub trait MetaGenerator {
    fn location(&mut self, ast: &AstContext, loc: SourceLocation) -> Location;
}

/// File, line and column of the main source file.
#[derive(Debug, Default)]
pub struct DefaultMetaGen;

impl MetaGenerator for DefaultMetaGen {
    fn location(&mut self, ast: &AstContext, loc: SourceLocation) -> Location {
        if !loc.is_valid() {
            return Location::Unknown;
        }
        Location::File {
            file: ast.main_file().unwrap_or("unknown").to_owned(),
            line: loc.line,
            column: loc.column,
        }
    }
}

/// Opaque, monotonically increasing ids; one per request.
#[derive(Debug, Default)]
pub struct IdMetaGen {
    next: u64,
}

impl MetaGenerator for IdMetaGen {
    fn location(&mut self, _ast: &AstContext, _loc: SourceLocation) -> Location {
        let id = self.next;
        self.next += 1;
        Location::Id(id)
    }
}
