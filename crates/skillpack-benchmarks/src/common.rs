//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};
use skillpack_core::{Catalog, Package};
use std::fs;
use std::path::Path;

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Id of the `index`th synthetic skill
pub fn skill_id(index: usize) -> String {
    format!("skill-{:04}", index)
}

/// Layered catalog: each skill depends on up to `fan_out` skills with higher
/// indices, so `skill-0000` reaches most of the catalog through shared
/// subtrees. Every tenth skill also references one that does not exist.
pub fn layered_catalog(size: usize, fan_out: usize) -> Catalog {
    (0..size)
        .map(|i| {
            let deps = (1..=fan_out)
                .map(|step| i + step)
                .filter(|&j| j < size)
                .map(skill_id)
                .chain((i % 10 == 0).then(|| format!("missing-{}", i)));
            Package::new(skill_id(i), format!("/skills/{}", skill_id(i))).with_dependencies(deps)
        })
        .collect()
}

/// Layered catalog whose last skill points back at the first
pub fn cyclic_catalog(size: usize, fan_out: usize) -> Catalog {
    let mut packages: Vec<Package> = layered_catalog(size, fan_out).packages().cloned().collect();
    if let Some(last) = packages.last_mut() {
        last.dependencies.insert(skill_id(0));
    }
    packages.into_iter().collect()
}

/// Write `count` skill folders under `root`, each with a descriptor and
/// `files` extra files of `file_size` bytes
pub fn write_skill_tree(root: &Path, count: usize, files: usize, file_size: usize) {
    let payload = "x".repeat(file_size);
    for i in 0..count {
        let dir = root.join(skill_id(i));
        fs::create_dir_all(dir.join("docs")).expect("create skill dir");
        let deps = if i + 1 < count { skill_id(i + 1) } else { String::new() };
        fs::write(
            dir.join("skill.md"),
            format!("---\nname: Skill {i}\ndescription: Synthetic skill {i}\ndependencies: [{deps}]\n---\nBody\n"),
        )
        .expect("write descriptor");
        for f in 0..files {
            fs::write(dir.join("docs").join(format!("page-{f}.md")), &payload).expect("write file");
        }
    }
}
