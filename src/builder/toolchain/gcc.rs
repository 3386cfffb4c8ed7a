//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use crate::builder::linker::LinkerCommand;

use super::{CommandSpec, CompileInput, Language, LinkInput, Toolchain, ToolchainPlatform};

/// GCC/Clang toolchain (Unix-like systems).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler
    pub cc: PathBuf,
    /// Path to the C++ compiler
    pub cxx: PathBuf,
    /// Shared-module linker command, after driver selection
    pub ldshared: LinkerCommand,
    /// Compiler family (gcc, clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cc: PathBuf, cxx: PathBuf, ldshared: LinkerCommand) -> Self {
        let family = family_from_name(&cc);
        GccToolchain {
            cc,
            cxx,
            ldshared,
            family,
        }
    }

    /// Infer C++ compiler path from C compiler path.
    ///
    /// Handles common patterns:
    /// - gcc, x86_64-linux-gnu-gcc -> g++, x86_64-linux-gnu-g++
    /// - clang -> clang++
    /// - cc, /usr/bin/cc -> c++, /usr/bin/c++
    pub fn infer_cxx(cc: &Path) -> PathBuf {
        let cc_str = cc.to_string_lossy();

        // gcc or *-gcc -> g++ or *-g++
        if cc_str.ends_with("gcc") {
            return PathBuf::from(format!("{}++", &cc_str[..cc_str.len() - 2]));
        }

        // clang -> clang++
        if cc_str.ends_with("clang") {
            return PathBuf::from(format!("{}++", cc_str));
        }

        // Only match "cc" when it's a complete basename (not "mycc")
        let is_standalone_cc = cc_str == "cc"
            || cc_str.ends_with("/cc")
            || cc_str.ends_with("\\cc")
            || cc_str.ends_with("-cc");

        if is_standalone_cc {
            return PathBuf::from(format!("{}++", &cc_str[..cc_str.len() - 1]));
        }

        PathBuf::from(format!("{}++", cc_str))
    }
}

/// Guess the compiler family from the driver's file name.
fn family_from_name(cc: &Path) -> ToolchainPlatform {
    let name = cc
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name.contains("clang") {
        ToolchainPlatform::Clang
    } else {
        ToolchainPlatform::Gcc
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn cxx_compiler_path(&self) -> &Path {
        &self.cxx
    }

    fn compile_command(&self, input: &CompileInput, lang: Language) -> CommandSpec {
        let compiler = match lang {
            Language::C => &self.cc,
            Language::Cxx => &self.cxx,
        };

        let mut cmd = CommandSpec::new(compiler);

        // Compile only, position-independent for the shared module
        cmd = cmd.arg("-c").arg("-fPIC");

        for dir in &input.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir.display()));
        }

        for (name, value) in &input.defines {
            match value {
                Some(v) => cmd = cmd.arg(format!("-D{}={}", name, v)),
                None => cmd = cmd.arg(format!("-D{}", name)),
            }
        }

        cmd = cmd.args(input.cflags.iter().cloned());

        cmd = cmd.arg(input.source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn link_shared_command(&self, input: &LinkInput) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.ldshared.program);

        // LDSHARED flags come first, exactly as configured
        cmd = cmd.args(self.ldshared.flags.iter().cloned());

        for obj in &input.objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        for dir in &input.lib_dirs {
            cmd = cmd.arg(format!("-L{}", dir.display()));
        }

        for lib in &input.libs {
            cmd = cmd.arg(format!("-l{}", lib));
        }

        cmd = cmd.args(input.ldflags.iter().cloned());

        cmd = cmd.arg("-o");
        cmd = cmd.arg(input.output.display().to_string());

        cmd
    }

    fn object_extension(&self) -> &str {
        "o"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toolchain(ldshared: &str) -> GccToolchain {
        GccToolchain::new(
            PathBuf::from("gcc"),
            PathBuf::from("g++"),
            LinkerCommand::parse(ldshared).unwrap(),
        )
    }

    #[test]
    fn test_infer_cxx() {
        assert_eq!(GccToolchain::infer_cxx(Path::new("gcc")), PathBuf::from("g++"));
        assert_eq!(
            GccToolchain::infer_cxx(Path::new("x86_64-linux-gnu-gcc")),
            PathBuf::from("x86_64-linux-gnu-g++")
        );
        assert_eq!(GccToolchain::infer_cxx(Path::new("clang")), PathBuf::from("clang++"));
        assert_eq!(GccToolchain::infer_cxx(Path::new("/usr/bin/cc")), PathBuf::from("/usr/bin/c++"));
    }

    #[test]
    fn test_family_from_name() {
        assert_eq!(family_from_name(Path::new("/usr/bin/clang-17")), ToolchainPlatform::Clang);
        assert_eq!(family_from_name(Path::new("gcc")), ToolchainPlatform::Gcc);
        assert_eq!(family_from_name(Path::new("cc")), ToolchainPlatform::Gcc);
    }

    #[test]
    fn test_cxx_compile_command() {
        let input = CompileInput {
            source: PathBuf::from("pcapy.cc"),
            output: PathBuf::from("build/temp/pcapy.o"),
            include_dirs: vec![PathBuf::from("/usr/include/python2.7")],
            defines: vec![("WIN32".to_string(), Some("1".to_string()))],
            cflags: vec!["-O2".to_string()],
        };

        let cmd = toolchain("g++ -shared").compile_command(&input, Language::Cxx);
        assert_eq!(cmd.program, PathBuf::from("g++"));
        assert_eq!(
            cmd.args,
            vec![
                "-c",
                "-fPIC",
                "-I/usr/include/python2.7",
                "-DWIN32=1",
                "-O2",
                "pcapy.cc",
                "-o",
                "build/temp/pcapy.o"
            ]
        );
    }

    #[test]
    fn test_c_sources_use_cc() {
        let input = CompileInput {
            source: PathBuf::from("compat.c"),
            output: PathBuf::from("compat.o"),
            include_dirs: vec![],
            defines: vec![("NDEBUG".to_string(), None)],
            cflags: vec![],
        };

        let cmd = toolchain("g++ -shared").compile_command(&input, Language::C);
        assert_eq!(cmd.program, PathBuf::from("gcc"));
        assert!(cmd.args.contains(&"-DNDEBUG".to_string()));
    }

    #[test]
    fn test_link_uses_ldshared() {
        let input = LinkInput {
            objects: vec![PathBuf::from("a.o"), PathBuf::from("b.o")],
            output: PathBuf::from("build/pcapy.so"),
            lib_dirs: vec![PathBuf::from("/opt/pcap/lib")],
            libs: vec!["pcap".to_string()],
            ldflags: vec!["-Wl,--as-needed".to_string()],
        };

        let cmd = toolchain("g++ -pthread -shared").link_shared_command(&input);
        assert_eq!(cmd.program, PathBuf::from("g++"));
        assert_eq!(
            cmd.display(),
            "g++ -pthread -shared a.o b.o -L/opt/pcap/lib -lpcap -Wl,--as-needed -o build/pcapy.so"
        );
    }
}
