use codspeed_criterion_compat::{
    Criterion, Throughput, black_box, criterion_group, criterion_main,
};

static CODE: &str = "
function  foo ( a, b ) { return bar ( a , 'b' , \"c\" , 0x1F , 1.5e3 ) }
function  foo ( a, b ) { return bar ( a , 'b' , \"c\" , 0x1F , 1.5e3 ) }
function  foo ( a, b ) { return bar ( a , 'b' , \"c\" , 0x1F , 1.5e3 ) }
function  foo ( a, b ) { return bar ( a , 'b' , \"c\" , 0x1F , 1.5e3 ) }
function  foo ( a, b ) { return bar ( a , 'b' , \"c\" , 0x1F , 1.5e3 ) }
function  foo ( a, b ) { return bar ( a , 'b' , \"c\" , 0x1F , 1.5e3 ) }
function  foo ( a, b ) { return bar ( a , 'b' , \"c\" , 0x1F , 1.5e3 ) }
function  foo ( a, b ) { return bar ( a , 'b' , \"c\" , 0x1F , 1.5e3 ) }
";

static COMMENTS: &str = "
/* It was the year when they finally immanentized the Eschaton */
// It was the year when they finally immanentized the Eschaton
/** It was the year when they finally immanentized the Eschaton */
// It was the year when they finally immanentized the Eschaton
/* It was the year when they finally immanentized the Eschaton */
// It was the year when they finally immanentized the Eschaton
/** It was the year when they finally immanentized the Eschaton */
// It was the year when they finally immanentized the Eschaton
";

static CANDIDATES: [(&str, &str); 2] = [("code", CODE), ("comments", COMMENTS)];

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    for (name, source) in CANDIDATES {
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(name, &source, |b, &s| {
            b.iter(|| black_box(jscst_tokenizer::tokenize(s)));
        });
    }
}

criterion_group!(benches, bench_tokenize);
criterion_main!(benches);
