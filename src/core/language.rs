//! Source language detection.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source language of a translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// C language
    C,
    /// C++ language (the extension's own sources)
    #[default]
    #[serde(alias = "cpp", alias = "cxx", alias = "c++")]
    Cxx,
}

impl Language {
    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
        }
    }

    /// Infer the language from a source file extension.
    ///
    /// Anything that is not a plain `.c` file is compiled as C++.
    pub fn from_source(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("c") => Language::C,
            _ => Language::Cxx,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_source() {
        assert_eq!(Language::from_source(Path::new("pcapy.cc")), Language::Cxx);
        assert_eq!(Language::from_source(Path::new("win32/dllmain.cc")), Language::Cxx);
        assert_eq!(Language::from_source(Path::new("shim.cpp")), Language::Cxx);
        assert_eq!(Language::from_source(Path::new("compat.c")), Language::C);
    }
}
