use criterion::{criterion_group, criterion_main, Criterion};
use spimi_core::tokenizer::tokenize;

const TEXT: &str = "The Runner ran quickly along the river, passing walkers, joggers and \
    cyclists who had gathered for the morning race.\tSpectators cheered\nas the leaders \
    crossed the finish line, exhausted but smiling.";

fn bench_tokenize(c: &mut Criterion) {
    let text = TEXT.repeat(200);
    c.bench_function("tokenize_paragraphs", |b| b.iter(|| tokenize(&text, 1)));
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
