use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::SeedableRng;

pub fn lexer_throughput_bench(c: &mut Criterion) {
    let mb = match std::env::var("LEXER_THROUGHPUT_MB") {
        Ok(val) => match val.parse::<usize>() {
            Ok(val) => val,
            Err(_) => panic!["Failed to parse env var LEXER_THROUGHPUT_MB={} as an integer", val],
        },
        Err(_) => 2,
    };
    let weights = Default::default();
    let mut rng = rand::prelude::StdRng::seed_from_u64(43);
    let latex_input =
        performance::generate_random_latex_document(&mut rng, mb * 1000 * 1000, (20, 200), &weights);

    let mut group = c.benchmark_group("lexer-throughput");
    group.sample_size(10);
    group.throughput(Throughput::Bytes(latex_input.len() as u64));

    group.bench_function("escape", |b| b.iter(|| texlex::escape::escape(&latex_input)));

    group.bench_function("read_to_end", |b| {
        b.iter(|| texlex::Lexer::new(&latex_input).read_to_end().unwrap())
    });

    group.bench_function("read_to_end_cached", |b| {
        let mut lexer = texlex::Lexer::with_cache(&latex_input, texlex::SimpleCache::new());
        lexer.read_to_end().unwrap();
        b.iter(|| lexer.read_to_end().unwrap())
    });
}

criterion_group!(benches, lexer_throughput_bench);
criterion_main!(benches);
