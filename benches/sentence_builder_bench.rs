use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use textprep::builder::IndexMap;
use textprep::{Preprocessor, SentenceBuilder};

const SIMPLE_TEXT: &str = "Hello world. This is a test. How are you?";
const MARKED_UP_TEXT: &str =
    "<p>Fish&amp;chips cost &pound;5 at <a href=\"/x\">Joe's</a> &ndash; <i>cheap</i>!</p>  See   you &nbsp; there.";

fn bench_preprocessor(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocessor");
    let preprocessor = Preprocessor::default();

    group.throughput(Throughput::Bytes(SIMPLE_TEXT.len() as u64));
    group.bench_function("simple_text", |b| {
        b.iter(|| preprocessor.process(black_box(SIMPLE_TEXT)).unwrap())
    });

    group.throughput(Throughput::Bytes(MARKED_UP_TEXT.len() as u64));
    group.bench_function("marked_up_text", |b| {
        b.iter(|| preprocessor.process(black_box(MARKED_UP_TEXT)).unwrap())
    });

    let long_text = MARKED_UP_TEXT.repeat(50);
    group.throughput(Throughput::Bytes(long_text.len() as u64));
    group.bench_function("long_text", |b| {
        b.iter(|| preprocessor.process(black_box(&long_text)).unwrap())
    });

    group.finish();
}

fn bench_builder_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("builder_reuse");

    // Fresh builder per input vs one builder cleared between inputs
    group.bench_function("fresh_builder", |b| {
        b.iter(|| {
            let mut builder = SentenceBuilder::from_text(black_box(SIMPLE_TEXT));
            let mut editor = builder.edit().unwrap();
            editor.set_word(0, 5, None).unwrap();
            editor.set_word(6, 5, None).unwrap();
            black_box(editor.commit().build().unwrap());
        })
    });

    let mut builder = SentenceBuilder::with_language("en");
    group.bench_function("reused_builder", |b| {
        b.iter(|| {
            builder.initialize(black_box(SIMPLE_TEXT));
            let mut editor = builder.edit().unwrap();
            editor.set_word(0, 5, None).unwrap();
            editor.set_word(6, 5, None).unwrap();
            black_box(editor.commit().build().unwrap());
            builder.clear();
        })
    });

    group.finish();
}

fn bench_index_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_map");

    group.bench_function("splice_and_translate_1000", |b| {
        b.iter(|| {
            let mut map = IndexMap::new();
            map.initialize(10_000);
            // Shrink 1000 six-byte runs to one byte each, left to right
            let mut position = 0;
            for _ in 0..1000 {
                map.apply_edit(position, position + 6, 1);
                position += 5;
            }
            let mut sum = 0usize;
            for p in 0..map.working_len() {
                sum += map.translate(black_box(p));
            }
            black_box(sum)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_preprocessor, bench_builder_reuse, bench_index_map);
criterion_main!(benches);
