//! Catalog scanning and descriptor parsing benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use skillpack_benchmarks::{criterion_config, write_skill_tree};
use skillpack_catalog::{parse_descriptor, scan_catalog};
use tempfile::TempDir;

fn bench_scan_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_catalog");
    group.sample_size(20);

    for count in [10usize, 100, 500] {
        let temp = TempDir::new().unwrap();
        write_skill_tree(temp.path(), count, 0, 0);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("skills", count), &temp, |b, temp| {
            b.iter(|| black_box(scan_catalog(temp.path()).unwrap()))
        });
    }

    group.finish();
}

fn bench_parse_descriptor(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_descriptor");

    let frontmatter = "---\nname: DevOps Flow\ndescription: Ship changes safely\n\
                       dependencies: [writing-plans, tdd, code-review]\n---\n# DevOps\n";
    group.bench_function("frontmatter", |b| b.iter(|| black_box(parse_descriptor(black_box(frontmatter)))));

    let mut prose = String::from("name: Long skill\ndescription: Lots of references\n");
    for i in 0..200 {
        prose.push_str(&format!("Step {i}: see <skill>helper-{}</skill> before continuing.\n", i % 25));
    }
    group.bench_function("skill_tags", |b| b.iter(|| black_box(parse_descriptor(black_box(&prose)))));

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_scan_catalog, bench_parse_descriptor
}

criterion_main!(benches);
