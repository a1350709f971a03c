/// Benchmarks for export and parse throughput
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use tempfile::TempDir;
use treedoc::config::{PathStyle, Settings, SizeUnit};
use treedoc::export::DocumentExporter;
use treedoc::notifier::Notifier;
use treedoc::reverse::CodeBlockParser;
use treedoc::walker::TreeWalker;

/// Helper to create test files
fn create_test_files(dir: &TempDir, count: usize) -> anyhow::Result<()> {
    let src_dir = dir.path().join("src");
    std::fs::create_dir_all(&src_dir)?;

    for i in 0..count {
        let content = format!(
            r#"import os


class Service{i}:
    def __init__(self, name):
        self.name = name
        self.calls = 0

    def handle(self, request):
        self.calls += 1
        result = request * {}
        return result


def helper_{i}(x):
    total = x + {i}
    return total
"#,
            i + 1
        );
        std::fs::write(src_dir.join(format!("service_{}.py", i)), content)?;
    }

    Ok(())
}

fn bench_settings() -> Arc<Settings> {
    let mut settings = Settings::default();
    settings.paths.path_style = PathStyle::Unix;
    Arc::new(settings)
}

fn benchmark_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");

    for file_count in [10, 50, 100].iter() {
        let codebase_dir = TempDir::new().unwrap();
        create_test_files(&codebase_dir, *file_count).unwrap();
        let generated = chrono::Local::now().naive_local();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_files", file_count)),
            file_count,
            |b, _| {
                b.iter(|| {
                    let outcome = TreeWalker::new(codebase_dir.path(), bench_settings())
                        .unwrap()
                        .walk(&Notifier::new())
                        .unwrap();
                    DocumentExporter::new("bench", SizeUnit::KB)
                        .render(black_box(&outcome.records), generated)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for file_count in [10, 50, 100].iter() {
        let codebase_dir = TempDir::new().unwrap();
        create_test_files(&codebase_dir, *file_count).unwrap();
        let outcome = TreeWalker::new(codebase_dir.path(), bench_settings())
            .unwrap()
            .walk(&Notifier::new())
            .unwrap();
        let document = DocumentExporter::new("bench", SizeUnit::KB)
            .render(&outcome.records, chrono::Local::now().naive_local());

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_files", file_count)),
            &document,
            |b, document| {
                b.iter(|| CodeBlockParser::new(PathStyle::Unix).parse(black_box(document)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_export, benchmark_parse);
criterion_main!(benches);
