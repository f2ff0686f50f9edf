//! Benchmarks for the probability solver.
//!
//! # Benchmarks
//!
//! - **`binomial_generate`**: `C(k, n)` through the lookup table and through
//!   prime factorisation, for sizes on either side of the table limit.
//! - **`analyze`**: exact safeties only, no guess selection.
//! - **`solve`**: the full pipeline including guess selection, which is
//!   where speculative re-analysis dominates.
//!
//! # Test Data
//!
//! Fixed positions after the first opening on beginner, intermediate and
//! expert sized boards, so runs stay comparable.
//!
//! # Running
//!
//! ```sh
//! cargo bench --bench solver
//! ```

use std::hint;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use mineprobe_core::Board;
use mineprobe_solver::{Binomial, EffectiveOptions, Solver};

const POSITIONS: [(&str, &str, usize); 3] = [
    (
        "beginner",
        "
        .........
        .........
        ..2212...
        111001...
        000001...
        000011...
        00001....
        0000112..
        0000001..
        ",
        10,
    ),
    (
        "intermediate",
        "
        ................
        ................
        ................
        ................
        .....112........
        .....10112......
        ...2110001......
        ...2000002......
        ...1000001......
        ...2101111......
        ....101.........
        ....201.........
        ....211.........
        ................
        ................
        ................
        ",
        40,
    ),
    (
        "expert",
        "
        ........100001................
        ........321001222.............
        ..........1000001.............
        ..........1111002.............
        .............1002.............
        ..........1111003.............
        ..........1000013.............
        ..........100001..............
        ..........111102..............
        .............311..............
        ..............................
        ..............................
        ..............................
        ..............................
        ..............................
        ..............................
        ",
        99,
    ),
];

fn bench_binomial(c: &mut Criterion) {
    let binomial = Binomial::new(1000, 100);
    let cases = [("lookup", 20, 80), ("factorised", 99, 480)];

    for (param, k, n) in cases {
        c.bench_with_input(
            BenchmarkId::new("binomial_generate", param),
            &(k, n),
            |b, &(k, n)| {
                b.iter(|| binomial.generate(hint::black_box(k), hint::black_box(n)).unwrap());
            },
        );
    }
}

fn bench_analyze(c: &mut Criterion) {
    let solver = Solver::default();
    let options = EffectiveOptions::default();

    for (param, text, mines) in POSITIONS {
        let board = Board::from_ascii(text, mines).unwrap();
        c.bench_with_input(BenchmarkId::new("analyze", param), &board, |b, board| {
            b.iter(|| solver.analyze(hint::black_box(board), &options).unwrap());
        });
    }
}

fn bench_solve(c: &mut Criterion) {
    let solver = Solver::default();
    let options = EffectiveOptions::default();

    for (param, text, mines) in POSITIONS {
        let board = Board::from_ascii(text, mines).unwrap();
        c.bench_with_input(BenchmarkId::new("solve", param), &board, |b, board| {
            b.iter_batched_ref(
                || hint::black_box(board.clone()),
                |board| solver.solve(board, &options).unwrap(),
                BatchSize::SmallInput,
            );
        });
    }
}

criterion_group!(benches, bench_binomial, bench_analyze, bench_solve);
criterion_main!(benches);
