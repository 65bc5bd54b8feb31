//! Comparator hot-loop benchmark: equal and almost-equal megabyte pairs.

use std::io::Write;

use criterion::{Criterion, criterion_group, criterion_main};
use probekit_core::compare::compare_files;

const PAYLOAD_LEN: usize = 1024 * 1024;

fn bench_compare(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let payload = vec![0xA5_u8; PAYLOAD_LEN];

    let equal_a = dir.path().join("equal_a.bin");
    let equal_b = dir.path().join("equal_b.bin");
    std::fs::File::create(&equal_a)
        .and_then(|mut f| f.write_all(&payload))
        .expect("write equal_a");
    std::fs::File::create(&equal_b)
        .and_then(|mut f| f.write_all(&payload))
        .expect("write equal_b");

    let mut tail_differs = payload.clone();
    *tail_differs.last_mut().expect("payload not empty") ^= 0xFF;
    let differ_b = dir.path().join("differ_b.bin");
    std::fs::File::create(&differ_b)
        .and_then(|mut f| f.write_all(&tail_differs))
        .expect("write differ_b");

    c.bench_function("compare_equal_1mib", |b| {
        b.iter(|| compare_files(&equal_a, &equal_b).expect("compare"));
    });
    c.bench_function("compare_last_byte_differs_1mib", |b| {
        b.iter(|| compare_files(&equal_a, &differ_b).expect("compare"));
    });
}

criterion_group!(benches, bench_compare);
criterion_main!(benches);
