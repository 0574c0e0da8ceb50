use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use texlex::{Lexer, NoCache, SimpleCache};

pub fn incremental_edits_bench(c: &mut Criterion) {
    let weights = Default::default();
    let mut rng = rand::prelude::StdRng::seed_from_u64(7);
    let latex_input =
        performance::generate_random_latex_document(&mut rng, 100 * 1000, (20, 200), &weights);
    let boundaries = performance::token_boundaries(&mut Lexer::new(&latex_input)).unwrap();

    let mut group = c.benchmark_group("incremental-edits");
    group.sample_size(10);

    group.bench_function("no_cache", |b| {
        let mut lexer = Lexer::with_cache(&latex_input, NoCache);
        let mut rng = rand::prelude::StdRng::seed_from_u64(11);
        b.iter(|| {
            let num_tokens =
                performance::type_and_relex(&mut lexer, &boundaries, &mut rng, 100).unwrap();
            black_box(num_tokens)
        })
    });

    group.bench_function("simple_cache", |b| {
        let mut lexer = Lexer::with_cache(&latex_input, SimpleCache::new());
        lexer.read_to_end().unwrap();
        let mut rng = rand::prelude::StdRng::seed_from_u64(11);
        b.iter(|| {
            let num_tokens =
                performance::type_and_relex(&mut lexer, &boundaries, &mut rng, 100).unwrap();
            black_box(num_tokens)
        })
    });
}

criterion_group!(benches, incremental_edits_bench);
criterion_main!(benches);
