//! Extension and package descriptor.
//!
//! Purely declarative: which sources make up the extension module, how it is
//! compiled and linked, and which documentation files are installed next to
//! it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use semver::Version;
use serde::Serialize;
use url::Url;

use crate::core::platform::{Platform, PlatformConfig};

/// Package and extension module name.
pub const PACKAGE_NAME: &str = "pcapy";

/// Package version.
pub const PACKAGE_VERSION: &str = "0.10.5";

const PACKAGE_URL: &str = "http://oss.coresecurity.com/projects/pcapy.html";
const AUTHOR: &str = "Maximiliano Caceres";
const AUTHOR_EMAIL: &str = "max@coresecurity.com";

/// Native sources shared by every platform, in compile order.
pub const BASE_SOURCES: &[&str] = &[
    "pcapdumper.cc",
    "bpfobj.cc",
    "pcapy.cc",
    "pcapobj.cc",
    "pcap_pkthdr.cc",
];

/// Documentation installed alongside the module.
pub const DOC_FILES: &[&str] = &["README", "LICENSE", "pcapy.html"];

/// A native extension module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Extension {
    pub name: String,
    pub sources: Vec<PathBuf>,
    pub define_macros: Vec<(String, String)>,
    pub include_dirs: Vec<String>,
    pub library_dirs: Vec<String>,
    pub libraries: Vec<String>,
    #[serde(serialize_with = "serialize_platform")]
    pub platform: Platform,
}

fn serialize_platform<S: serde::Serializer>(platform: &Platform, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(platform.as_str())
}

impl Extension {
    /// Build the extension from the base sources and a platform table entry.
    pub fn from_platform(name: &str, config: &PlatformConfig) -> Self {
        let mut sources: Vec<PathBuf> = BASE_SOURCES.iter().map(PathBuf::from).collect();
        sources.extend(config.extra_sources.iter().map(PathBuf::from));

        Extension {
            name: name.to_string(),
            sources,
            define_macros: config.macros.clone(),
            include_dirs: config.include_dirs.clone(),
            library_dirs: config.library_dirs.clone(),
            libraries: config.libraries.clone(),
            platform: config.platform,
        }
    }

    /// File name of the built module (`pcapy.so`, `pcapy.pyd`).
    pub fn file_name(&self) -> String {
        match self.platform {
            Platform::Windows => format!("{}.pyd", self.name),
            Platform::Posix => format!("{}.so", self.name),
        }
    }
}

/// Files copied verbatim into an install-relative directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataFiles {
    /// Install-relative target directory
    pub dir: PathBuf,
    /// Source-relative files
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub name: String,
    pub email: String,
}

/// Package-level metadata plus the buildable extension.
#[derive(Debug, Clone, Serialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: Version,
    pub url: Url,
    pub author: Person,
    pub maintainer: Person,
    pub description: String,
    pub ext_module: Extension,
    pub data_files: Vec<DataFiles>,
}

impl PackageDescriptor {
    /// The pcapy package for a resolved platform configuration.
    pub fn pcapy(config: &PlatformConfig) -> Result<Self> {
        let version = Version::parse(PACKAGE_VERSION)
            .with_context(|| format!("invalid package version `{}`", PACKAGE_VERSION))?;
        let url = Url::parse(PACKAGE_URL)
            .with_context(|| format!("invalid package url `{}`", PACKAGE_URL))?;

        let person = Person {
            name: AUTHOR.to_string(),
            email: AUTHOR_EMAIL.to_string(),
        };

        Ok(PackageDescriptor {
            name: PACKAGE_NAME.to_string(),
            version,
            url,
            author: person.clone(),
            maintainer: person,
            description: "Python pcap extension".to_string(),
            ext_module: Extension::from_platform(PACKAGE_NAME, config),
            data_files: Vec::new(),
        }
        .with_docs())
    }

    /// Versioned documentation directory, relative to the install prefix.
    pub fn doc_dir(&self) -> PathBuf {
        PathBuf::from("share")
            .join("doc")
            .join(format!("{}-{}", self.name, self.version))
    }

    fn with_docs(mut self) -> Self {
        self.data_files = vec![DataFiles {
            dir: self.doc_dir(),
            files: DOC_FILES.iter().map(PathBuf::from).collect(),
        }];
        self
    }
}
