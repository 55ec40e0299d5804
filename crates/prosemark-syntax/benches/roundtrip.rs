use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use prosemark_engine::{EditCommand, RuntimeConfig, Selection};
use prosemark_syntax::runtime;

fn document(paragraphs: usize) -> String {
    let mut out = String::new();
    for i in 0..paragraphs {
        match i % 4 {
            0 => out.push_str("# heading with **bold** text\n"),
            1 => out.push_str("- item one\n- item two\n  - nested *em* child\n"),
            2 => out.push_str("> quoted line with [link](https://example.com)\n"),
            _ => out.push_str("plain paragraph mentioning @someone and `code`\n"),
        }
    }
    out
}

fn bench_create_state(c: &mut Criterion) {
    let rt = runtime(RuntimeConfig::default());
    let mut group = c.benchmark_group("create_state");
    for size in [8usize, 64, 512] {
        let source = document(size);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &source, |b, source| {
            b.iter(|| rt.create_state(black_box(source), None));
        });
    }
    group.finish();
}

fn bench_edit(c: &mut Criterion) {
    let rt = runtime(RuntimeConfig::default());
    let source = document(64);
    let state = rt.create_state(&source, Some(Selection::caret(20)));
    c.bench_function("insert_one_char", |b| {
        b.iter(|| rt.apply(black_box(&state), &EditCommand::Insert("x".into())));
    });
    c.bench_function("delete_backward", |b| {
        b.iter(|| rt.apply(black_box(&state), &EditCommand::DeleteBackward));
    });
}

criterion_group!(benches, bench_create_state, bench_edit);
criterion_main!(benches);
