//! Language options and target description recorded by the front end.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum SourceLanguage {
    #[default]
    C,
    Cxx,
}

impl SourceLanguage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::C => "c",
            Self::Cxx => "cxx",
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Language dialect switches that influence module emission.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct LangOptions {
    pub language: SourceLanguage,
    pub cuda: bool,
    pub cuda_is_device: bool,
    pub openmp: bool,
    pub openmp_simd: bool,
    pub sanitize_address: bool,
    pub sanitize_cfi_cross_dso: bool,
    pub coverage_mapping: bool,
}

impl LangOptions {
    pub fn c() -> Self {
        Self::default()
    }

    pub fn cxx() -> Self {
        Self {
            language: SourceLanguage::Cxx,
            ..Self::default()
        }
    }
}

/// Sizes in bits of the target's scalar types.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TargetInfo {
    pub triple: String,
    pub pointer_width: u32,
    pub long_width: u32,
    pub long_double_width: u32,
}

impl TargetInfo {
    /// `x86_64-unknown-linux-gnu` (LP64).
    pub fn x86_64_linux() -> Self {
        Self {
            triple: "x86_64-unknown-linux-gnu".to_owned(),
            pointer_width: 64,
            long_width: 64,
            long_double_width: 128,
        }
    }

    /// `wasm32-unknown-unknown` (ILP32).
    pub fn wasm32() -> Self {
        Self {
            triple: "wasm32-unknown-unknown".to_owned(),
            pointer_width: 32,
            long_width: 32,
            long_double_width: 128,
        }
    }

    /// `wasm32-unknown-emscripten` (ILP32).
    pub fn wasm32_emscripten() -> Self {
        Self {
            triple: "wasm32-unknown-emscripten".to_owned(),
            ..Self::wasm32()
        }
    }

    pub fn is_wasm(&self) -> bool {
        self.triple.starts_with("wasm32") || self.triple.starts_with("wasm64")
    }

    pub fn is_emscripten(&self) -> bool {
        self.triple.ends_with("-emscripten")
    }
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self::x86_64_linux()
    }
}
