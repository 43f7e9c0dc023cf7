//! # Lookup Benchmarks
//!
//! Performance benchmarks for catalog loading and lookups.
//!
//! Run with: `cargo bench -p tscat-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tscat_core::{
    Catalog, Context, LoadOptions, Message, Translator, catalog_from_str, catalog_to_string,
    compile, translator_from_bytes,
};

const FINNISH: &str = include_str!("../tests/fixtures/dustrac-game_fi.ts");

/// Create a catalog with `contexts` contexts of `per_context` messages each.
fn create_catalog(contexts: usize, per_context: usize) -> Catalog {
    let mut catalog = Catalog::new("fi_FI");
    for c in 0..contexts {
        let mut context = Context::new(format!("Menu{}", c));
        for m in 0..per_context {
            context.messages.push(
                Message::new(format!("Label {} of menu {}", m, c))
                    .with_translation(format!("Nimike {} valikossa {}", m, c))
                    .with_location(format!("../menu{}.cpp", c), m as u32 + 1),
            );
        }
        catalog.contexts.push(context);
    }
    catalog
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_fixture", |b| {
        b.iter(|| catalog_from_str(black_box(FINNISH)).expect("parse"))
    });

    let mut group = c.benchmark_group("parse_generated");
    for size in [10, 100, 1000] {
        let text = catalog_to_string(&create_catalog(10, size));
        group.bench_with_input(BenchmarkId::from_parameter(size * 10), &text, |b, text| {
            b.iter(|| catalog_from_str(black_box(text)).expect("parse"))
        });
    }
    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let fixture = catalog_from_str(FINNISH).expect("parse");
    let table = Translator::from_catalog(&fixture, &LoadOptions::default()).expect("build");

    c.bench_function("lookup_hit", |b| {
        b.iter(|| table.translate(black_box("QObject"), black_box("GO!!!")))
    });
    c.bench_function("lookup_fallback", |b| {
        b.iter(|| table.translate(black_box("QObject"), black_box("60 fps")))
    });

    let large = create_catalog(50, 1000);
    let large_table = Translator::from_catalog(&large, &LoadOptions::default()).expect("build");
    c.bench_function("lookup_hit_50k", |b| {
        b.iter(|| large_table.translate(black_box("Menu25"), black_box("Label 500 of menu 25")))
    });
}

fn bench_compiled(c: &mut Criterion) {
    let catalog = create_catalog(50, 1000);
    let bytes = compile(&catalog, &LoadOptions::default()).expect("compile");

    c.bench_function("decode_compiled_50k", |b| {
        b.iter(|| translator_from_bytes(black_box(&bytes)).expect("decode"))
    });
    c.bench_function("build_from_catalog_50k", |b| {
        b.iter(|| Translator::from_catalog(black_box(&catalog), &LoadOptions::default()).expect("build"))
    });
}

criterion_group!(benches, bench_parse, bench_lookup, bench_compiled);
criterion_main!(benches);
