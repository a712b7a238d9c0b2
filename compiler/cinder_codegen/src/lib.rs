//! Cinder codegen - lowering of a Cinder AST into a Cinder IR module.
//!
//! The entry point is [`Driver`]: it owns the module under construction and
//! routes every declaration through the [`Strategy`] chain.
//! Types are converted by [`TypeConverter`], memoized in the
//! [`EntityCache`], and declarations referenced before they are emitted wait
//! on the [`Worklist`] until [`Driver::finalize`] drains it.
//!
//! # Debugging
//!
//! Set `RUST_LOG` and call [`init_tracing`] to see emission events:
//!
//! ```bash
//! RUST_LOG=cinder_codegen=debug cargo test -p cinder_codegen
//! ```

mod cache;
mod context;
mod driver;
mod error;
mod meta;
mod options;
mod stack;
mod symbols;
mod types;
mod visitor;
mod worklist;

use std::sync::Once;

use cinder_ast::AstContext;
use cinder_ir::Module;

pub use cache::{ConversionMode, EntityCache, TypeKey};
pub use context::{CodegenContext, Replacement};
pub use driver::Driver;
pub use error::{CodegenError, Result, ResultExt};
pub use meta::{DefaultMetaGen, IdMetaGen, MetaGenerator};
pub use options::{CodegenOptions, OptLevel};
pub use symbols::{DefaultMangler, SymbolGenerator};
pub use types::{floating_kind, integer_kind, SourceShape, TypeConverter};
pub use visitor::{Strategy, Visit};
pub use worklist::Worklist;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Only installs a subscriber when `RUST_LOG` is set; safe to call more than
/// once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Lower the translation unit of `ast` into a finalized, verified module.
pub fn lower_translation_unit(ast: &AstContext, options: CodegenOptions) -> Result<Module> {
    let mut driver = Driver::new(ast, options);
    driver.emit_translation_unit()?;
    driver.finalize()?;
    Ok(driver.freeze())
}
