//! Lowering configuration.

use cinder_ast::SourceLanguage;

/// Optimization level, `0..=3`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, PartialOrd, Ord)]
pub struct OptLevel(u8);

impl OptLevel {
    pub const O0: OptLevel = OptLevel(0);
    pub const O1: OptLevel = OptLevel(1);
    pub const O2: OptLevel = OptLevel(2);
    pub const O3: OptLevel = OptLevel(3);

    /// `None` for levels above 3.
    pub const fn new(level: u8) -> Option<Self> {
        if level <= 3 {
            Some(Self(level))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Switches read by the lowering engine; never modified by it.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CodegenOptions {
    pub lang: SourceLanguage,
    pub optimization_level: OptLevel,
    /// Falling off the end of a non-void function is undefined behavior.
    pub has_strict_return: bool,
    /// Omit the unsupported-node fallback from the visitor chain.
    pub disable_unsupported: bool,
    /// Skip module verification at finalize.
    pub disable_verifier: bool,
    /// Attach opaque metadata ids instead of file locations.
    pub locs_as_meta_ids: bool,
}

impl CodegenOptions {
    #[must_use]
    pub fn with_lang(mut self, lang: SourceLanguage) -> Self {
        self.lang = lang;
        self
    }

    #[must_use]
    pub fn with_optimization_level(mut self, level: OptLevel) -> Self {
        self.optimization_level = level;
        self
    }

    #[must_use]
    pub fn with_strict_return(mut self, strict: bool) -> Self {
        self.has_strict_return = strict;
        self
    }

    #[must_use]
    pub fn with_unsupported_disabled(mut self, disabled: bool) -> Self {
        self.disable_unsupported = disabled;
        self
    }

    #[must_use]
    pub fn with_verifier_disabled(mut self, disabled: bool) -> Self {
        self.disable_verifier = disabled;
        self
    }

    #[must_use]
    pub fn with_locs_as_meta_ids(mut self, enabled: bool) -> Self {
        self.locs_as_meta_ids = enabled;
        self
    }
}
