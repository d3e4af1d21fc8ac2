#![no_main]
use libfuzzer_sys::fuzz_target;
use oxidiff::{BinaryDiffer, DiffOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    // First two bytes pick the tuning, the third the base/version split.
    let footprint = u32::from(data[0] % 31) + 1;
    let favor_last = data[1] & 0x80 != 0;
    let table_size = usize::from(data[1] & 0x7F) + 1;
    let payload = &data[3..];
    let split = usize::from(data[2]) * payload.len() / 255;
    let (base, version) = payload.split_at(split.min(payload.len()));

    let opts = DiffOptions::default()
        .with_footprint_length(footprint)
        .unwrap()
        .with_table_size(table_size)
        .unwrap()
        .with_favor_last_match(favor_last);
    let script = BinaryDiffer::new(opts).diff_slices(base, version).unwrap();

    assert_eq!(script.total_len(), version.len() as u64);
    assert_eq!(script.apply(base).unwrap(), version);
});
