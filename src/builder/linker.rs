//! Linker driver selection.
//!
//! The shared-module linker command (`LDSHARED`) usually starts with the C
//! compiler driver. The extension is C++, so it has to be linked through the
//! C++ driver to pull in the C++ standard library. [`fix_linker_driver`] does
//! that rewrite as a plain function; the build driver calls it explicitly.

use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// C compiler driver token recognized at the start of `LDSHARED`.
pub const C_DRIVER: &str = "gcc";

/// C++ driver substituted for [`C_DRIVER`].
pub const CXX_DRIVER: &str = "g++";

/// Rewrite a linker command that starts with `gcc` to start with `g++`.
///
/// Only the literal three-character prefix is replaced; everything after it
/// (including a version suffix such as `-12`) is kept. Commands that do not
/// start with `gcc` are returned unchanged.
pub fn fix_linker_driver(ldshared: &str) -> Cow<'_, str> {
    match ldshared.strip_prefix(C_DRIVER) {
        Some(rest) => {
            let fixed = format!("{}{}", CXX_DRIVER, rest);
            tracing::info!("changing LDSHARED = {:?} to {:?}", ldshared, fixed);
            Cow::Owned(fixed)
        }
        None => Cow::Borrowed(ldshared),
    }
}

/// Default `LDSHARED` for a C compiler on the host.
pub fn default_ldshared(cc: &str) -> String {
    if cfg!(target_os = "macos") {
        format!("{} -bundle -undefined dynamic_lookup", cc)
    } else {
        format!("{} -shared", cc)
    }
}

/// A linker command split into the program and its leading flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkerCommand {
    pub program: PathBuf,
    pub flags: Vec<String>,
}

impl LinkerCommand {
    /// Split a shell-style command on whitespace.
    ///
    /// Returns `None` for an empty command.
    pub fn parse(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace();
        let program = words.next()?;
        Some(LinkerCommand {
            program: PathBuf::from(program),
            flags: words.map(str::to_string).collect(),
        })
    }
}

impl fmt::Display for LinkerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for flag in &self.flags {
            write!(f, " {}", flag)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcc_becomes_gxx() {
        assert_eq!(
            fix_linker_driver("gcc -pthread -shared -Wl,-O1"),
            "g++ -pthread -shared -Wl,-O1"
        );
        assert_eq!(fix_linker_driver("gcc"), "g++");
    }

    #[test]
    fn test_prefix_is_literal() {
        // A versioned driver keeps its suffix
        assert_eq!(fix_linker_driver("gcc-12 -shared"), "g++-12 -shared");
        // Full paths and other drivers are left alone
        assert_eq!(fix_linker_driver("/usr/bin/gcc -shared"), "/usr/bin/gcc -shared");
        assert_eq!(fix_linker_driver("clang -shared"), "clang -shared");
        assert_eq!(fix_linker_driver("cc -shared"), "cc -shared");
        assert_eq!(fix_linker_driver(""), "");
    }

    #[test]
    fn test_unchanged_input_is_borrowed() {
        assert!(matches!(fix_linker_driver("ld -shared"), Cow::Borrowed(_)));
        assert!(matches!(fix_linker_driver("gcc -shared"), Cow::Owned(_)));
    }

    #[test]
    fn test_parse_linker_command() {
        let cmd = LinkerCommand::parse("  g++   -pthread -shared ").unwrap();
        assert_eq!(cmd.program, PathBuf::from("g++"));
        assert_eq!(cmd.flags, vec!["-pthread", "-shared"]);
        assert_eq!(cmd.to_string(), "g++ -pthread -shared");

        assert!(LinkerCommand::parse("   ").is_none());
    }
}
