use criterion::{criterion_group, criterion_main, Criterion};
use pathowners::{parser, OwnerIndex};

const TEST_RULES: &str = "\
* @default-owner
*.go @go-reviewers
*.js @frontend
docs/ @docs
app/ @app-team
app/lib/ @lib-team
app/lib/network/ @net-team
app/vendor/hooli/middle_out.go @richard
";

const TEST_PATHS: &[&str] = &[
    "readme.md",
    "docs/guide.md",
    "app/main.go",
    "app/lib/util.go",
    "app/lib/network/socket.go",
    "app/vendor/hooli/middle_out.go",
    "app/vendor/hooli/deep/nested/dir/index.js",
];

fn build_index() -> OwnerIndex {
    parser::parse(TEST_RULES).into_index()
}

fn index_benchmark(c: &mut Criterion) {
    c.bench_function("building", |b| b.iter(build_index));

    let index = build_index();
    c.bench_function("lookup", |b| {
        b.iter(|| {
            for path in TEST_PATHS {
                index.find_owners(path);
            }
        })
    });
}

criterion_group!(benches, index_benchmark);
criterion_main!(benches);
