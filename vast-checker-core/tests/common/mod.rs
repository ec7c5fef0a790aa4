use std::path::{Path, PathBuf};

use vast_checker_core::config::{CheckerConfig, VAST_NAMESPACE};

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn schema_path() -> PathBuf {
    fixtures_dir().join("schemas").join("vast_mini.xsd")
}

pub fn documents_dir(name: &str) -> PathBuf {
    fixtures_dir().join("documents").join(name)
}

#[allow(dead_code)]
pub fn config_for(dir: &str) -> CheckerConfig {
    CheckerConfig::new(schema_path(), documents_dir(dir)).with_namespace(VAST_NAMESPACE)
}

/// Fresh empty directory under the system temp dir.
#[allow(dead_code)]
pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    path.push(format!("{prefix}-{}-{nonce}", std::process::id()));
    std::fs::create_dir_all(&path).expect("create temp dir");
    path
}

#[allow(dead_code)]
pub fn output_lines(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .lines()
        .map(str::to_string)
        .collect()
}
