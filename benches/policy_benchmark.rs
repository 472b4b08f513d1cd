use criterion::{criterion_group, criterion_main, Criterion};
use energy_estimator::models::Bids;
use energy_estimator::services::{AccessPolicy, ServiceCatalog};
use std::hint::black_box;

fn benchmark_access_policy(c: &mut Criterion) {
    let emails: Vec<String> = (0..500).map(|i| format!("crew{i}@partner.com")).collect();
    let policy = AccessPolicy::new(&emails, ["longhornsolar.com", "rbvital.com"]);

    let mut group = c.benchmark_group("access_policy");

    group.bench_function("exact_email_match", |b| {
        b.iter(|| policy.is_authorized(black_box("Crew250@Partner.com")))
    });

    group.bench_function("domain_match", |b| {
        b.iter(|| policy.is_authorized(black_box("someone@longhornsolar.com")))
    });

    group.bench_function("rejected", |b| {
        b.iter(|| policy.is_authorized(black_box("stranger@random.com")))
    });

    group.finish();
}

fn benchmark_bid_ordering(c: &mut Criterion) {
    let catalog = ServiceCatalog::default();
    // Reverse catalog order, as a store without key ordering might return it
    let reversed: Vec<&str> = catalog.names().collect::<Vec<_>>().into_iter().rev().collect();

    c.bench_function("sort_bids_by_catalog_rank", |b| {
        b.iter(|| {
            let mut bids = Bids::for_services(reversed.iter().copied());
            bids.sort_by_rank(|name| catalog.rank(name));
            black_box(bids)
        })
    });
}

criterion_group!(benches, benchmark_access_policy, benchmark_bid_ordering);
criterion_main!(benches);
