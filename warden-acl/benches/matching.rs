use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use warden_acl::matcher::{select_best_namespace, select_best_path};
use warden_acl::{Abilities, Operation, Resource, Target};
use warden_common::policy::PolicyDocument;
use warden_common::token::TokenSnapshot;

// Benchmark configuration
const SMALL_RULESET: usize = 5;
const MEDIUM_RULESET: usize = 25;
const LARGE_RULESET: usize = 100;

/// Benchmark namespace selection across candidate set sizes
fn bench_namespace_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("namespace_selection");

    for size in [SMALL_RULESET, MEDIUM_RULESET, LARGE_RULESET].iter() {
        let names: Vec<String> = (0..*size).map(|i| format!("team-{}-*", i)).collect();
        let candidates: Vec<&str> = names.iter().map(String::as_str).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(select_best_namespace(
                    black_box(&candidates),
                    black_box("team-7-staging"),
                ))
            });
        });
    }

    group.finish();
}

/// Benchmark path selection across candidate set sizes
fn bench_path_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_selection");

    for size in [SMALL_RULESET, MEDIUM_RULESET, LARGE_RULESET].iter() {
        let mut patterns: Vec<String> =
            (0..*size).map(|i| format!("project-{}/secrets/*", i)).collect();
        patterns.push("*".to_string());
        let candidates: Vec<&str> = patterns.iter().map(String::as_str).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(select_best_path(
                    black_box(&candidates),
                    black_box("project-7/secrets/db-password"),
                ))
            });
        });
    }

    group.finish();
}

/// Benchmark a full ability check through the evaluation layer
fn bench_ability_check(c: &mut Criterion) {
    let json = r#"{
        "id": "bench",
        "rules": {
            "Namespaces": [
                { "Name": "default", "Capabilities": ["list-jobs", "read-job"] },
                { "Name": "team-*", "Capabilities": ["submit-job", "list-jobs"] },
                {
                    "Name": "*",
                    "Variables": {
                        "Paths": [
                            { "PathSpec": "*", "Capabilities": ["list"] },
                            { "PathSpec": "shared/*", "Capabilities": ["read", "list"] }
                        ]
                    }
                }
            ]
        }
    }"#;
    let token = TokenSnapshot::client(vec![
        PolicyDocument::from_json(json).expect("bench policy must parse"),
    ]);
    let abilities = Abilities::new(&token);

    c.bench_function("can_run_job", |b| {
        b.iter(|| black_box(abilities.can_run_job(black_box("team-alpha"))));
    });

    c.bench_function("can_read_variable", |b| {
        b.iter(|| {
            black_box(abilities.can(
                Resource::Variable,
                Operation::Read,
                Target::path(black_box("team-alpha"), black_box("shared/db-creds")),
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_namespace_selection,
    bench_path_selection,
    bench_ability_check
);
criterion_main!(benches);
