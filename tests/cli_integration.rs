use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_oxidiff").to_string()
}

fn write_pair(dir: &tempfile::TempDir, base: &[u8], version: &[u8]) -> (String, String) {
    let b = dir.path().join("base.bin");
    let v = dir.path().join("version.bin");
    std::fs::write(&b, base).unwrap();
    std::fs::write(&v, version).unwrap();
    (
        b.to_string_lossy().into_owned(),
        v.to_string_lossy().into_owned(),
    )
}

#[test]
fn cli_ops_prints_script() {
    let dir = tempdir().unwrap();
    let (base, version) = write_pair(&dir, b"ABCDEFGH", b"ABCDXYGH");

    let out = Command::new(bin())
        .args(["ops", "--footprint-length", "2", base.as_str(), version.as_str()])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8(out.stdout).unwrap(),
        "COPY 0 4\nADD 2 5859\nCOPY 6 2\n"
    );
}

#[test]
fn cli_ops_reads_version_from_stdin() {
    let dir = tempdir().unwrap();
    let (base, _) = write_pair(&dir, b"ABCDEFGH", b"");

    let mut child = Command::new(bin())
        .args(["ops", "--footprint-length", "2", base.as_str(), "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"ABCDEFGH")
        .unwrap();
    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "COPY 0 8\n");
}

#[test]
fn cli_hex_marks_changed_lines() {
    let dir = tempdir().unwrap();
    let (base, version) = write_pair(&dir, b"ABCDEFGH", b"ABCDXYGH");

    let out = Command::new(bin())
        .args(["hex", "--footprint-length", "2", base.as_str(), version.as_str()])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4, "{text}");
    assert!(lines[0].starts_with("  00000000    41 42 43 44 "));
    assert!(lines[0].ends_with("ABCD"));
    assert!(lines[1].starts_with("- 00000004    45 46 "));
    assert!(lines[1].ends_with("EF"));
    assert!(lines[2].starts_with("+ 00000004    58 59 "));
    assert!(lines[2].ends_with("XY"));
    assert!(lines[3].starts_with("  00000006    47 48 "));
    assert!(lines[3].ends_with("GH"));
}

#[test]
fn cli_hex_identical_files_are_shared() {
    let dir = tempdir().unwrap();
    let data: Vec<u8> = (0u8..40).collect();
    let (base, version) = write_pair(&dir, &data, &data);

    let out = Command::new(bin())
        .args(["hex", "--bytes-per-line", "8", "--no-offsets", base.as_str(), version.as_str()])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert_eq!(text.lines().count(), 5);
    for line in text.lines() {
        assert!(line.starts_with("  "), "{line}");
    }
    assert!(text.starts_with("  00 01 02 03 04 05 06 07    ........\n"));
}

#[test]
fn cli_hex_single_side() {
    let dir = tempdir().unwrap();
    let (base, version) = write_pair(&dir, b"ABCDEFGH", b"ABCDXYGH");

    let out = Command::new(bin())
        .args([
            "hex",
            "--footprint-length",
            "2",
            "--side",
            "base",
            base.as_str(),
            version.as_str(),
        ])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let markers: Vec<char> = text.lines().filter_map(|l| l.chars().next()).collect();
    assert_eq!(markers, [' ', '-', ' ']);
    assert!(!text.contains("XY"));
}

#[test]
fn cli_json_stats() {
    let dir = tempdir().unwrap();
    let (base, version) = write_pair(&dir, b"ABCDEFGH", b"ABCDXYGH");

    let out = Command::new(bin())
        .args(["--json", "ops", "--footprint-length", "2", base.as_str(), version.as_str()])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stats: serde_json::Value = serde_json::from_slice(&out.stderr).unwrap();
    assert_eq!(stats["command"], "ops");
    assert_eq!(stats["copies"], 2);
    assert_eq!(stats["adds"], 1);
    assert_eq!(stats["added_bytes"], 2);
    assert_eq!(stats["version_size"], 8);
}

#[test]
fn cli_missing_file_fails() {
    let dir = tempdir().unwrap();
    let (base, _) = write_pair(&dir, b"data", b"");
    let missing = dir.path().join("missing.bin");

    let out = Command::new(bin())
        .arg("ops")
        .arg(&base)
        .arg(&missing)
        .output()
        .unwrap();
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing.bin"));
}

#[test]
fn cli_config_works() {
    let out = Command::new(bin()).arg("config").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stderr);
    assert!(text.contains("DEFAULT_FOOTPRINT_LENGTH=8"));
    assert!(text.contains("DEFAULT_TABLE_SIZE=1009"));
}
