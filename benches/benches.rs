use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use smarttrak::{decode_dive, DecoderConfig};

/// A tagged record with a profile run of `len` random instructions.
fn record(len: usize) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut block = vec![0xfa];
    while block.len() < len {
        let b: u8 = rng.gen();
        if b != 0xfb {
            block.push(b);
        }
    }

    let mut dat = vec![0u8; 195];
    dat[46..48].copy_from_slice(&50u16.to_le_bytes());
    dat[160..162].copy_from_slice(&200u16.to_le_bytes());
    dat[191..193].copy_from_slice(&(block.len() as u16).to_le_bytes());
    dat.extend(block);
    dat.extend([0u8; 8]);
    dat
}

fn bench_decode_dive(c: &mut Criterion) {
    let dat = record(16 * 1024);
    let config = DecoderConfig::builder().collect_events(false).build();

    let mut group = c.benchmark_group("dive");
    group.throughput(Throughput::Bytes(dat.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| {
            let _ = decode_dive(&dat, &config).unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_decode_dive);
criterion_main!(benches);
