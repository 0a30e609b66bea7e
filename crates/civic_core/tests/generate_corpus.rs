use std::collections::BTreeSet;

use pretty_assertions::assert_eq;
use time::macros::date;

use civic_core::catalog::Catalog;
use civic_core::domain::{Category, Department, Status};
use civic_core::generate::{
    default_distribution, generate_corpus, generate_uniform_corpus, CityCount, CorpusPlan,
    GeneratorOptions,
};
use civic_core::stats::category_stats;

fn options(seed: u64) -> GeneratorOptions {
    GeneratorOptions {
        seed: Some(seed),
        anchor_date: date!(2026 - 04 - 30),
        window_days: 30,
    }
}

#[test]
fn default_distribution_generates_full_corpus_with_unique_ids() {
    let catalog = Catalog::maharashtra();
    let corpus = generate_uniform_corpus(&catalog, &default_distribution(), &options(1), 1);

    // 7 categories x (100 + 15 + 10)
    assert_eq!(corpus.issues.len(), 7 * 125);
    assert_eq!(corpus.next_id, 7 * 125 + 1);
    assert!(corpus.fallback_cities.is_empty());

    let ids: BTreeSet<i64> = corpus.issues.iter().map(|i| i.id).collect();
    assert_eq!(ids.len(), corpus.issues.len(), "ids must be unique");

    for issue in &corpus.issues {
        assert_eq!(issue.department, issue.category.department());
        assert_eq!(
            issue.status == Status::Resolved,
            issue.proof_photo.is_some(),
            "proof iff resolved for issue {}",
            issue.id
        );
        assert!(
            catalog.bounds_for(&issue.city).contains(issue.location),
            "issue {} outside {} bounds",
            issue.id,
            issue.city
        );
        assert!(issue.address.ends_with(&format!(", {}", issue.city)));
        assert!(!issue.photo.is_empty());
    }
}

#[test]
fn per_city_counts_hold_for_every_category() {
    let corpus = generate_uniform_corpus(
        &Catalog::maharashtra(),
        &[CityCount::new("Mumbai", 4), CityCount::new("Nagpur", 2)],
        &options(2),
        1,
    );
    for category in Category::ALL {
        let mumbai = corpus
            .issues
            .iter()
            .filter(|i| i.category == category && i.city == "Mumbai")
            .count();
        let nagpur = corpus
            .issues
            .iter()
            .filter(|i| i.category == category && i.city == "Nagpur")
            .count();
        assert_eq!((mumbai, nagpur), (4, 2), "category {category}");
    }
}

#[test]
fn five_pune_potholes_and_nothing_else() {
    let catalog = Catalog::maharashtra();
    let plan = CorpusPlan::default()
        .with(Category::Pothole, "Pune", 5)
        .with(Category::Garbage, "Mumbai", 0);
    let mut rng = options(3).rng();
    let corpus = generate_corpus(&catalog, &plan, &options(3), 1, &mut rng);

    assert_eq!(corpus.issues.len(), 5);
    assert!(corpus.issues.iter().all(|i| i.category == Category::Pothole
        && i.department == Department::Roads
        && i.city == "Pune"));

    let stats = category_stats(&corpus.issues);
    assert_eq!(stats[&Category::Pothole].total, 5);
    for category in Category::ALL.into_iter().filter(|c| *c != Category::Pothole) {
        assert_eq!(stats[&category].total, 0, "category {category}");
    }
}

#[test]
fn ids_are_assigned_category_major_from_first_id() {
    let corpus = generate_uniform_corpus(
        &Catalog::maharashtra(),
        &[CityCount::new("Pune", 2), CityCount::new("Nagpur", 1)],
        &options(4),
        100,
    );
    let ids: Vec<i64> = corpus.issues.iter().map(|i| i.id).collect();
    assert_eq!(ids, (100..121).collect::<Vec<_>>());

    let first_three: Vec<(Category, &str)> = corpus.issues[..3]
        .iter()
        .map(|i| (i.category, i.city.as_str()))
        .collect();
    assert_eq!(
        first_three,
        vec![
            (Category::Pothole, "Pune"),
            (Category::Pothole, "Pune"),
            (Category::Pothole, "Nagpur"),
        ]
    );
}

#[test]
fn threading_next_id_keeps_batches_disjoint() {
    let catalog = Catalog::maharashtra();
    let dist = [CityCount::new("Pune", 3)];
    let first = generate_uniform_corpus(&catalog, &dist, &options(5), 1);
    let second = generate_uniform_corpus(&catalog, &dist, &options(6), first.next_id);

    let a: BTreeSet<i64> = first.issues.iter().map(|i| i.id).collect();
    let b: BTreeSet<i64> = second.issues.iter().map(|i| i.id).collect();
    assert!(a.is_disjoint(&b));
    assert_eq!(second.issues[0].id, first.next_id);
}

#[test]
fn same_seed_and_anchor_reproduce_the_corpus() {
    let catalog = Catalog::maharashtra();
    let dist = default_distribution();
    let a = generate_uniform_corpus(&catalog, &dist, &options(42), 1);
    let b = generate_uniform_corpus(&catalog, &dist, &options(42), 1);
    let c = generate_uniform_corpus(&catalog, &dist, &options(43), 1);

    assert_eq!(a, b);
    assert_ne!(a.issues, c.issues);
}

/// Unknown cities are a documented leniency, not an error: they borrow the default city's
/// bounds and areas, keep their own name, and are reported back to the caller.
#[test]
fn unknown_city_falls_back_to_default_city() {
    let catalog = Catalog::maharashtra();
    let corpus = generate_uniform_corpus(
        &catalog,
        &[CityCount::new("Atlantis", 2), CityCount::new("Nashik", 1)],
        &options(7),
        1,
    );

    assert_eq!(corpus.issues.len(), 7 * 3);
    assert_eq!(corpus.fallback_cities, vec!["Atlantis", "Nashik"]);

    let pune_bounds = catalog.bounds_for("Pune");
    let pune_areas = catalog.areas_for("Pune");
    for issue in corpus.issues.iter().filter(|i| i.city == "Atlantis") {
        assert!(pune_bounds.contains(issue.location));
        let area = issue
            .address
            .strip_suffix(", Atlantis")
            .expect("address keeps requested city");
        assert!(pune_areas.contains(&area), "area {area} not a Pune area");
    }
}
