// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use ducker_parser::{Lexer, ParseOptions, Parser, tokenize};

macro_rules! bench_harness {
    ($($name:literal,)*) => {
        fn bench_lexing(c: &mut Criterion) {
            $(
                {
                    static SOURCE: &str =
                        include_str!(concat!("../ducker_parser/tests/sources/", $name));

                    c.bench_function(concat!($name, " (Lexing)"), move |b| {
                        b.iter(|| tokenize(black_box(SOURCE)))
                    });
                }
            )*
        }

        fn bench_parsing(c: &mut Criterion) {
            $(
                {
                    static SOURCE: &str =
                        include_str!(concat!("../ducker_parser/tests/sources/", $name));

                    c.bench_function(concat!($name, " (Parsing)"), move |b| {
                        b.iter_batched(
                            || Parser::with_options(Lexer::new(SOURCE), ParseOptions::default()),
                            |parser| parser.parse(),
                            BatchSize::SmallInput,
                        )
                    });
                }
            )*
        }
    };
}

bench_harness!("multi_stage.Dockerfile", "broken.Dockerfile",);

criterion_group!(benches, bench_lexing, bench_parsing);
criterion_main!(benches);
