//! CLI integration tests for pcapy.
//!
//! These tests drive the `pcapy` binary against temporary source trees. None
//! of them needs a C++ compiler or libpcap except the ignored end-to-end
//! build at the bottom.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const DOCS: [&str; 3] = ["README", "LICENSE", "pcapy.html"];

/// Get the pcapy binary command, isolated from the caller's toolchain
/// environment, Python interpreter and home directory.
fn pcapy(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pcapy").unwrap();
    for key in [
        "CC",
        "CXX",
        "LDSHARED",
        "CFLAGS",
        "LDFLAGS",
        "PCAPY_WPCAP_SDK",
        "PCAPY_PYTHON_INCLUDE",
    ] {
        cmd.env_remove(key);
    }
    cmd.env("PYTHON", "pcapy-no-such-python");
    cmd.env("HOME", home);
    cmd
}

/// Create a temporary directory for test source trees.
fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// Source tree with the documentation files and a prebuilt module.
fn source_tree(tmp: &TempDir) -> std::path::PathBuf {
    let src = tmp.path().join("pcapy");
    fs::create_dir_all(src.join("build")).unwrap();
    fs::write(src.join("build/pcapy.so"), "module").unwrap();
    for doc in DOCS {
        fs::write(src.join(doc), doc).unwrap();
    }
    src
}

fn stdout_json(output: std::process::Output) -> serde_json::Value {
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// pcapy config
// ============================================================================

#[test]
fn test_config_posix() {
    let tmp = temp_dir();

    pcapy(tmp.path())
        .args(["config", "--platform", "posix"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Module:    pcapy.so"))
        .stdout(predicate::str::contains("Libraries: pcap"))
        .stdout(predicate::str::contains("Macros: (none)"))
        .stdout(predicate::str::contains("pcapdumper.cc"))
        .stdout(predicate::str::contains("share/doc/pcapy-0.10.5"));
}

#[test]
fn test_config_windows_json() {
    let tmp = temp_dir();

    let output = pcapy(tmp.path())
        .args(["config", "--platform", "windows", "--json"])
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let json = stdout_json(output);

    let ext = &json["package"]["ext_module"];
    assert_eq!(json["platform"], "windows");
    assert_eq!(ext["libraries"], serde_json::json!(["wpcap", "packet", "ws2_32"]));
    assert_eq!(ext["include_dirs"], serde_json::json!([r"c:\devel\wpdpack\Include"]));
    assert_eq!(ext["define_macros"], serde_json::json!([["WIN32", "1"]]));
    assert_eq!(ext["sources"].as_array().unwrap().len(), 6);
    assert!(json["ldshared"].is_null());
}

#[test]
fn test_config_sdk_root_from_env() {
    let tmp = temp_dir();

    let output = pcapy(tmp.path())
        .args(["config", "--platform", "windows", "--json"])
        .env("PCAPY_WPCAP_SDK", r"D:\npcap-sdk")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let json = stdout_json(output);

    assert_eq!(
        json["package"]["ext_module"]["library_dirs"],
        serde_json::json!([r"D:\npcap-sdk\Lib"])
    );
}

#[test]
fn test_config_rejects_unknown_platform() {
    let tmp = temp_dir();

    pcapy(tmp.path())
        .args(["config", "--platform", "amiga"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown platform `amiga`"));
}

#[test]
fn test_config_ldshared_override() {
    let tmp = temp_dir();

    let output = pcapy(tmp.path())
        .args(["config", "--platform", "posix", "--json"])
        .env("LDSHARED", "gcc -pthread -shared")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let json = stdout_json(output);
    assert_eq!(json["ldshared"]["detected"], "gcc -pthread -shared");
    assert_eq!(json["ldshared"]["effective"], "g++ -pthread -shared");

    let output = pcapy(tmp.path())
        .args(["config", "--platform", "posix", "--json"])
        .env("LDSHARED", "clang -shared")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let json = stdout_json(output);
    assert_eq!(json["ldshared"]["effective"], "clang -shared");
}

// ============================================================================
// pcapy build --plan
// ============================================================================

#[test]
fn test_build_plan_links_with_cxx_driver() {
    let tmp = temp_dir();

    let output = pcapy(tmp.path())
        .args(["build", "--plan", "--platform", "posix"])
        .env("LDSHARED", "gcc -pthread -shared")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let json = stdout_json(output);

    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 6);
    assert_eq!(
        steps.iter().filter(|s| s["type"] == "compile").count(),
        5
    );

    let link = &steps[5];
    assert_eq!(link["type"], "link");
    assert_eq!(link["command"]["program"], "g++");
    assert_eq!(link["command"]["args"][0], "-pthread");
    assert_eq!(link["command"]["args"][1], "-shared");
    assert!(link["command"]["args"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("-lpcap")));
}

#[test]
fn test_build_plan_includes_python_headers() {
    let tmp = temp_dir();

    let output = pcapy(tmp.path())
        .args(["build", "--plan", "--platform", "posix"])
        .env("PCAPY_PYTHON_INCLUDE", "/usr/include/python3.11")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let json = stdout_json(output);

    for step in json["steps"].as_array().unwrap().iter().take(5) {
        assert!(step["command"]["args"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("-I/usr/include/python3.11")));
    }
}

#[test]
fn test_build_plan_cli_ldshared_wins() {
    let tmp = temp_dir();

    let output = pcapy(tmp.path())
        .args(["build", "--plan", "--platform", "posix", "--ldshared", "cc -shared"])
        .env("LDSHARED", "gcc -shared")
        .current_dir(tmp.path())
        .output()
        .unwrap();
    let json = stdout_json(output);

    assert_eq!(json["steps"][5]["command"]["program"], "cc");
}

#[test]
fn test_build_plan_uses_project_config() {
    let tmp = temp_dir();
    let src = tmp.path().join("pcapy");
    fs::create_dir_all(src.join(".pcapy")).unwrap();
    fs::write(
        src.join(".pcapy/config.toml"),
        "[build]\nbuild_dir = \"out\"\ncflags = [\"-O2\"]\n",
    )
    .unwrap();

    let output = pcapy(tmp.path())
        .args(["build", "--plan", "--platform", "posix", "--source-dir"])
        .arg(&src)
        .output()
        .unwrap();
    let json = stdout_json(output);

    let link_output = json["steps"][5]["output"].as_str().unwrap();
    assert!(link_output.ends_with("pcapy.so"));
    assert!(Path::new(link_output).starts_with(src.join("out")));
    assert!(json["steps"][0]["command"]["args"]
        .as_array()
        .unwrap()
        .contains(&serde_json::json!("-O2")));
}

// ============================================================================
// pcapy install
// ============================================================================

#[cfg(unix)]
#[test]
fn test_install_skip_build() {
    let tmp = temp_dir();
    let src = source_tree(&tmp);
    let stage = tmp.path().join("stage");
    let record = tmp.path().join("installed.txt");

    // No interpreter, so the module falls back to <prefix>/lib
    pcapy(tmp.path())
        .args(["install", "--skip-build", "--platform", "posix", "--prefix", "/usr"])
        .arg("--source-dir")
        .arg(&src)
        .arg("--root")
        .arg(&stage)
        .arg("--record")
        .arg(&record)
        .assert()
        .success();

    assert!(stage.join("usr/lib/pcapy.so").exists());
    for doc in DOCS {
        assert!(stage.join("usr/share/doc/pcapy-0.10.5").join(doc).exists());
    }

    let recorded = fs::read_to_string(&record).unwrap();
    assert_eq!(recorded.lines().count(), 4);
    assert!(recorded.lines().next().unwrap().ends_with("usr/lib/pcapy.so"));
}

#[test]
fn test_install_missing_doc_fails() {
    let tmp = temp_dir();
    let src = source_tree(&tmp);
    fs::remove_file(src.join("README")).unwrap();

    pcapy(tmp.path())
        .args(["install", "--skip-build", "--platform", "posix"])
        .arg("--source-dir")
        .arg(&src)
        .arg("--root")
        .arg(tmp.path().join("stage"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("README"));
}

#[test]
fn test_install_skip_build_without_module() {
    let tmp = temp_dir();
    let src = source_tree(&tmp);
    fs::remove_file(src.join("build/pcapy.so")).unwrap();

    pcapy(tmp.path())
        .args(["install", "--skip-build", "--platform", "posix"])
        .arg("--source-dir")
        .arg(&src)
        .assert()
        .failure()
        .stderr(predicate::str::contains("has not been built"));
}

// ============================================================================
// pcapy clean
// ============================================================================

#[test]
fn test_clean_removes_objects() {
    let tmp = temp_dir();
    let src = source_tree(&tmp);
    fs::create_dir_all(src.join("build/temp")).unwrap();
    fs::write(src.join("build/temp/pcapy.o"), "").unwrap();

    pcapy(tmp.path())
        .arg("clean")
        .arg("--source-dir")
        .arg(&src)
        .assert()
        .success();

    assert!(!src.join("build/temp").exists());
    assert!(src.join("build/pcapy.so").exists());

    pcapy(tmp.path())
        .args(["clean", "--all"])
        .arg("--source-dir")
        .arg(&src)
        .assert()
        .success();

    assert!(!src.join("build").exists());
}

// ============================================================================
// misc
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = temp_dir();

    pcapy(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pcapy"));
}

#[test]
fn test_build_fails_with_missing_sources() {
    let tmp = temp_dir();

    pcapy(tmp.path())
        .args(["build", "--platform", "posix"])
        .arg("--source-dir")
        .arg(tmp.path())
        .env("CC", "pcapy-no-such-compiler")
        .assert()
        .failure()
        .stderr(predicate::str::contains("compilation failed"));
}

#[test]
#[ignore = "requires a C++ toolchain and libpcap headers"]
fn test_build_real_sources() {
    let src = std::env::var("PCAPY_SOURCE_DIR").expect("PCAPY_SOURCE_DIR not set");
    let tmp = temp_dir();

    Command::cargo_bin("pcapy")
        .unwrap()
        .args(["build", "--source-dir", &src, "--build-dir"])
        .arg(tmp.path())
        .assert()
        .success();

    assert!(tmp.path().join("pcapy.so").exists());
}
