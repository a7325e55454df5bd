use std::hint::black_box;

use codspeed_criterion_compat::{
    BenchmarkId, Criterion, Throughput, criterion_group, criterion_main,
};
use jscst_cst::{Schema, StrategyKind, build, project, reconstruct};
use jscst_parse::{Parse, parse};

const SOURCES: [(&str, &str); 2] = [
    (
        "Simple",
        "/*1*/ function /*2*/ foo /*3*/ ( /*4*/ ) /*5*/ { }",
    ),
    (
        "Medium",
        r#"
        // Adds two numbers.
        function add(a, /* second */ b) {
            return sum(a, b);
        }

        function log(message) {
            print( ( message ) , "\n" ) ;
            return
        }

        log(add(1, 0x2));
        ;
        "#,
    ),
];

fn inputs() -> Vec<(&'static str, &'static str, Parse)> {
    SOURCES
        .iter()
        .map(|&(name, text)| (name, text, parse(text).expect("benchmark sources parse")))
        .collect()
}

fn benchmark_build(c: &mut Criterion) {
    let inputs = inputs();
    let mut group = c.benchmark_group("CST Build");

    for kind in StrategyKind::ALL {
        let schema = Schema::es5(kind).unwrap();
        let strategy = schema.strategy().name();
        for (name, text, parse) in &inputs {
            group.throughput(Throughput::Bytes(text.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(strategy, name),
                parse,
                |b, parse| {
                    b.iter(|| {
                        let cst = build(&schema, &parse.ast, &parse.tokens).unwrap();
                        black_box(cst);
                    });
                },
            );
        }
    }

    group.finish();
}

fn benchmark_round_trip(c: &mut Criterion) {
    let inputs = inputs();
    let mut group = c.benchmark_group("CST Round Trip");

    for kind in StrategyKind::ALL {
        let schema = Schema::es5(kind).unwrap();
        let strategy = schema.strategy().name();
        for (name, text, parse) in &inputs {
            let cst = build(&schema, &parse.ast, &parse.tokens).unwrap();
            group.throughput(Throughput::Bytes(text.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("reconstruct/{strategy}"), name),
                &cst,
                |b, cst| b.iter(|| black_box(reconstruct(&schema, cst).unwrap())),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("project/{strategy}"), name),
                &cst,
                |b, cst| b.iter(|| black_box(project(cst).unwrap())),
            );
        }
    }

    group.finish();
}

fn benchmark_schema(c: &mut Criterion) {
    c.bench_function("Schema Validation", |b| {
        b.iter(|| {
            for kind in StrategyKind::ALL {
                black_box(Schema::es5(kind).unwrap());
            }
        });
    });
}

criterion_group!(benches, benchmark_build, benchmark_round_trip, benchmark_schema);
criterion_main!(benches);
