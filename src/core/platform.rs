//! Platform build configuration table.
//!
//! Maps a target platform to the include directories, library directories,
//! link libraries, preprocessor macros and extra sources needed to compile
//! against the system packet-capture library (libpcap on POSIX, the WinPcap
//! developer pack on Windows).
//!
//! This file is also compiled into `build.rs`, so it only depends on `std`.

use std::fmt;
use std::str::FromStr;

/// Default root of the WinPcap developer pack.
pub const DEFAULT_WPCAP_SDK: &str = r"c:\devel\wpdpack";

/// Target platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux, macOS, the BSDs and anything else that is not Windows.
    Posix,
    /// Windows (WinPcap / Npcap SDK).
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Map a cargo `target_os` value to a platform.
    pub fn from_target_os(os: &str) -> Self {
        if os == "windows" {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Posix => "posix",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a platform name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformParseError(pub String);

impl fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown platform `{}` (expected one of: posix, unix, linux, macos, windows, win32)",
            self.0
        )
    }
}

impl std::error::Error for PlatformParseError {}

impl FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "posix" | "unix" | "linux" | "macos" | "darwin" | "freebsd" => Ok(Platform::Posix),
            "windows" | "win32" | "win" => Ok(Platform::Windows),
            _ => Err(PlatformParseError(s.to_string())),
        }
    }
}

/// Resolved per-platform build inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub platform: Platform,
    /// Header search paths, in order
    pub include_dirs: Vec<String>,
    /// Library search paths, in order
    pub library_dirs: Vec<String>,
    /// Libraries to link (without `-l` / `.lib`)
    pub libraries: Vec<String>,
    /// Preprocessor macros as (name, value)
    pub macros: Vec<(String, String)>,
    /// Platform-only sources appended to the base source list
    pub extra_sources: Vec<String>,
}

impl PlatformConfig {
    /// Look up the configuration for a platform.
    ///
    /// Nothing is checked on disk: a missing SDK or missing libpcap headers
    /// show up later as compiler or linker errors.
    pub fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Windows => PlatformConfig {
                platform,
                include_dirs: vec![sdk_path(DEFAULT_WPCAP_SDK, "Include")],
                library_dirs: vec![sdk_path(DEFAULT_WPCAP_SDK, "Lib")],
                libraries: strings(&["wpcap", "packet", "ws2_32"]),
                macros: vec![("WIN32".to_string(), "1".to_string())],
                extra_sources: vec!["win32/dllmain.cc".to_string()],
            },
            Platform::Posix => PlatformConfig {
                platform,
                include_dirs: Vec::new(),
                library_dirs: Vec::new(),
                libraries: strings(&["pcap"]),
                macros: Vec::new(),
                extra_sources: Vec::new(),
            },
        }
    }

    /// Point the Windows search paths at a different developer pack root.
    /// Has no effect on POSIX, where libpcap is assumed to be installed
    /// system-wide.
    pub fn with_sdk_root(mut self, root: &str) -> Self {
        if self.platform == Platform::Windows {
            self.include_dirs = vec![sdk_path(root, "Include")];
            self.library_dirs = vec![sdk_path(root, "Lib")];
        }
        self
    }

    /// Whether a macro with this name is defined.
    pub fn defines(&self, name: &str) -> bool {
        self.macros.iter().any(|(n, _)| n == name)
    }
}

fn sdk_path(root: &str, sub: &str) -> String {
    let root = root.trim_end_matches(['\\', '/']);
    format!(r"{}\{}", root, sub)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_links_only_pcap() {
        let cfg = PlatformConfig::for_platform(Platform::Posix);
        assert_eq!(cfg.libraries, vec!["pcap".to_string()]);
        assert!(cfg.include_dirs.is_empty());
        assert!(cfg.library_dirs.is_empty());
        assert!(cfg.macros.is_empty());
        assert!(cfg.extra_sources.is_empty());
    }

    #[test]
    fn test_windows_links_winpcap() {
        let cfg = PlatformConfig::for_platform(Platform::Windows);
        assert_eq!(cfg.libraries, vec!["wpcap", "packet", "ws2_32"]);
        assert!(cfg
            .macros
            .contains(&("WIN32".to_string(), "1".to_string())));
        assert_eq!(cfg.include_dirs, vec![r"c:\devel\wpdpack\Include"]);
        assert_eq!(cfg.library_dirs, vec![r"c:\devel\wpdpack\Lib"]);
        assert_eq!(cfg.extra_sources, vec!["win32/dllmain.cc"]);
        assert!(cfg.defines("WIN32"));
    }

    #[test]
    fn test_sdk_root_override() {
        let cfg = PlatformConfig::for_platform(Platform::Windows).with_sdk_root(r"D:\npcap-sdk\");
        assert_eq!(cfg.include_dirs, vec![r"D:\npcap-sdk\Include"]);
        assert_eq!(cfg.library_dirs, vec![r"D:\npcap-sdk\Lib"]);

        let posix = PlatformConfig::for_platform(Platform::Posix).with_sdk_root("/opt/sdk");
        assert_eq!(posix, PlatformConfig::for_platform(Platform::Posix));
    }

    #[test]
    fn test_platform_parse() {
        assert_eq!("linux".parse::<Platform>().unwrap(), Platform::Posix);
        assert_eq!("Win32".parse::<Platform>().unwrap(), Platform::Windows);
        assert!("amiga".parse::<Platform>().is_err());
        assert_eq!(Platform::from_target_os("windows"), Platform::Windows);
        assert_eq!(Platform::from_target_os("macos"), Platform::Posix);
    }
}
