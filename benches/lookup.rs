//! Lookup and build throughput.
//!
//! Run with: cargo bench --bench lookup

use country_pack::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::Rng;

fn definitions(count: u16) -> Vec<LocaleDefinition> {
    let mut rng = rand::thread_rng();
    let collate: Vec<u8> = (0..=255u8).collect();
    (0..count)
        .map(|i| {
            let mut info = CountryInfo::usa([437, 850, 852, 866][i as usize % 4]);
            info.country_id = i / 4 + 1;
            let mut def = LocaleDefinition::new(info);
            def.uppercase = UppercaseTable::cp437();
            // A handful of distinct collating tables, shared between entries
            let mut weights = collate.clone();
            weights.swap(b'a' as usize, rng.gen_range(0x80..0x84));
            def.collate = CollateTable::new(weights).unwrap();
            def
        })
        .collect()
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    for count in [16u16, 128, 1024] {
        let mut builder = DatabaseBuilder::default();
        builder.extend(definitions(count)).unwrap();
        let db = builder.build().unwrap();
        let sys = CountrySys::new(&db).unwrap();
        let active = ActiveLocale::default();
        let last = (count - 1) / 4 + 1;
        let codepage = [437, 850, 852, 866][(count as usize - 1) % 4];

        group.throughput(Throughput::Elements(1));
        group.bench_function(format!("last_of_{}", count), |b| {
            b.iter(|| {
                black_box(
                    sys.lookup(black_box(last), black_box(codepage), &active)
                        .unwrap()
                        .count(),
                )
            })
        });
        group.bench_function(format!("country_info_of_{}", count), |b| {
            b.iter(|| {
                black_box(
                    sys.lookup(black_box(WILDCARD_COUNTRY), WILDCARD_CODEPAGE, &active)
                        .and_then(|h| h.country_info())
                        .unwrap(),
                )
            })
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for count in [16u16, 256] {
        let defs = definitions(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("{}_entries", count), |b| {
            b.iter(|| {
                let mut builder = DatabaseBuilder::default();
                builder.extend(defs.iter().cloned()).unwrap();
                black_box(builder.build().unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lookup, bench_build);
criterion_main!(benches);
