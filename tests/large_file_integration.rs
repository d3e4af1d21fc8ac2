use oxidiff::io::{diff_files, project_files};
use oxidiff::lines::parse_hex_column;
use oxidiff::{BinaryDiffer, CancelToken, DiffOptions, LineProjector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use tempfile::NamedTempFile;

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rng.fill(&mut buf[..]);
    buf
}

/// Apply a few random splices so the version shares most of its content
/// with the base, spread across several read windows.
fn splice_randomly(rng: &mut StdRng, base: &[u8], edits: usize) -> Vec<u8> {
    let mut out = base.to_vec();
    for _ in 0..edits {
        let at = rng.random_range(0..=out.len());
        let del = rng.random_range(0..=512usize).min(out.len() - at);
        let ins_len = rng.random_range(0..=256);
        let ins = random_bytes(rng, ins_len);
        out.splice(at..at + del, ins);
    }
    out
}

fn temp_with(data: &[u8]) -> NamedTempFile {
    let mut f = NamedTempFile::new().unwrap();
    f.write_all(data).unwrap();
    f.flush().unwrap();
    f
}

#[test]
fn multi_window_file_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0x0D1F);
    let base = random_bytes(&mut rng, 300 * 1024);
    let version = splice_randomly(&mut rng, &base, 12);
    let base_file = temp_with(&base);
    let version_file = temp_with(&version);

    let differ = BinaryDiffer::new(DiffOptions::default().with_table_size(65_521).unwrap());
    let (script, stats) = diff_files(
        base_file.path(),
        version_file.path(),
        &differ,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(stats.base_size, base.len() as u64);
    assert_eq!(stats.version_size, version.len() as u64);
    assert_eq!(script.total_len(), version.len() as u64);
    assert_eq!(script.apply(&base).unwrap(), version);

    let summary = script.summary();
    assert!(summary.copies > 0);
    assert!(summary.copied_bytes > summary.added_bytes);
}

#[test]
fn identical_files_copy_once() {
    let mut rng = StdRng::seed_from_u64(42);
    let data = random_bytes(&mut rng, 150 * 1024);
    let a = temp_with(&data);
    let b = temp_with(&data);

    let (script, stats) = diff_files(
        a.path(),
        b.path(),
        &BinaryDiffer::default(),
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(script.len(), 1);
    assert_eq!(script.summary().copied_bytes, data.len() as u64);
    #[cfg(feature = "file-io")]
    assert_eq!(stats.identical(), Some(true));
    #[cfg(not(feature = "file-io"))]
    assert_eq!(stats.identical(), None);
}

#[test]
fn projected_files_cover_both_inputs() {
    let mut rng = StdRng::seed_from_u64(7);
    let base = random_bytes(&mut rng, 20 * 1024);
    let version = splice_randomly(&mut rng, &base, 4);
    let base_file = temp_with(&base);
    let version_file = temp_with(&version);

    let projector = LineProjector::new(24).unwrap();
    let (lines, _) = project_files(
        base_file.path(),
        version_file.path(),
        &BinaryDiffer::default(),
        &projector,
        &CancelToken::new(),
    )
    .unwrap();

    let base_back: Vec<u8> = lines
        .base_lines
        .iter()
        .flat_map(|l| parse_hex_column(l, 24).unwrap())
        .collect();
    let version_back: Vec<u8> = lines
        .version_lines
        .iter()
        .flat_map(|l| parse_hex_column(l, 24).unwrap())
        .collect();
    assert_eq!(base_back, base);
    assert_eq!(version_back, version);
    assert_eq!(lines.base_kinds.len(), lines.base_lines.len());
    assert_eq!(lines.version_kinds.len(), lines.version_lines.len());
}

#[test]
#[ignore = "64 MiB inputs are opt-in due to runtime"]
fn large_file_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0xB16);
    let base = random_bytes(&mut rng, 64 * 1024 * 1024);
    let version = splice_randomly(&mut rng, &base, 200);
    let base_file = temp_with(&base);
    let version_file = temp_with(&version);

    let differ = BinaryDiffer::new(
        DiffOptions::default()
            .with_footprint_length(16)
            .unwrap()
            .with_table_size(1_000_003)
            .unwrap(),
    );
    let (script, _) = diff_files(
        base_file.path(),
        version_file.path(),
        &differ,
        &CancelToken::new(),
    )
    .unwrap();
    assert_eq!(script.apply(&base).unwrap(), version);
}

#[test]
fn edge_case_matrix() {
    let cases: Vec<(&[u8], &[u8])> = vec![
        (b"", b""),
        (b"", b"x"),
        (b"x", b""),
        (b"\0\0\0\0\0", b"\0\0\0\0\0"),
        (b"\0\0\0\0\0", b"\0\0\0\0\x01"),
        (b"\0\0\0\0\0\0\0\0\0\0", b"\0\0\0\0\0\0\0\0\0\x01"),
    ];

    for (base, version) in cases {
        let base_file = temp_with(base);
        let version_file = temp_with(version);
        let (script, _) = diff_files(
            base_file.path(),
            version_file.path(),
            &BinaryDiffer::default(),
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(script.apply(base).unwrap(), version);
    }
}
