#![no_main]
use libfuzzer_sys::fuzz_target;
use oxidiff::lines::{line_width, parse_hex_column};
use oxidiff::{BinaryDiffer, LineProjector, MemorySource};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let bpl = usize::from(data[0] % 64) + 1;
    let payload = &data[2..];
    let split = usize::from(data[1]) * payload.len() / 255;
    let (base, version) = payload.split_at(split.min(payload.len()));

    let script = BinaryDiffer::default().diff_slices(base, version).unwrap();
    let lines = LineProjector::new(bpl)
        .unwrap()
        .build(&mut MemorySource::new(base), script.ops())
        .unwrap();

    assert_eq!(lines.base_lines.len(), lines.base_kinds.len());
    assert_eq!(lines.version_lines.len(), lines.version_kinds.len());

    let mut rebuilt = Vec::with_capacity(version.len());
    for line in &lines.version_lines {
        assert!(line.len() <= line_width(bpl));
        rebuilt.extend(parse_hex_column(line, bpl).unwrap());
    }
    assert_eq!(rebuilt, version);
});
