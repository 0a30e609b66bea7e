use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::catalog::Catalog;
use crate::domain::{Category, GeoPoint, Issue, IssueId, NewIssue, Priority, Status};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Requested number of issues for one city.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CityCount {
    pub city: String,
    pub count: u32,
}

impl CityCount {
    pub fn new(city: impl Into<String>, count: u32) -> Self {
        Self {
            city: city.into(),
            count,
        }
    }
}

/// Ordered per-city distribution. Order decides ID assignment, nothing else.
pub type CityDistribution = Vec<CityCount>;

/// The distribution the dashboards were designed around: mostly Pune, some Mumbai and Nagpur.
pub fn default_distribution() -> CityDistribution {
    vec![
        CityCount::new("Pune", 100),
        CityCount::new("Mumbai", 15),
        CityCount::new("Nagpur", 10),
    ]
}

/// Per-category distributions, generated category-major in `Category::ALL` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusPlan {
    entries: Vec<(Category, CityDistribution)>,
}

impl CorpusPlan {
    /// Same per-city distribution for every category.
    pub fn uniform(distribution: &[CityCount]) -> Self {
        Self {
            entries: Category::ALL
                .into_iter()
                .map(|c| (c, distribution.to_vec()))
                .collect(),
        }
    }

    /// Adds (or extends) the distribution for one category.
    pub fn with(mut self, category: Category, city: impl Into<String>, count: u32) -> Self {
        let city = CityCount::new(city, count);
        match self.entries.iter_mut().find(|(c, _)| *c == category) {
            Some((_, dist)) => dist.push(city),
            None => self.entries.push((category, vec![city])),
        }
        self
    }

    pub fn distribution(&self, category: Category) -> &[CityCount] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, d)| d.as_slice())
            .unwrap_or(&[])
    }

    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .flat_map(|(_, d)| d.iter())
            .map(|c| u64::from(c.count))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Fixed seed for a reproducible corpus; `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Most recent possible reported date.
    pub anchor_date: Date,
    /// Reported dates fall in `anchor - (window_days - 1) ..= anchor`.
    pub window_days: u32,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            seed: None,
            anchor_date: OffsetDateTime::now_utc().date(),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl GeneratorOptions {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCorpus {
    pub issues: Vec<Issue>,
    /// First ID not used by this run; pass it to the next run to keep IDs unique.
    pub next_id: IssueId,
    /// Requested cities that had no bounds/areas of their own and used the default city's.
    pub fallback_cities: Vec<String>,
}

/// Build a synthetic corpus from `plan`.
///
/// IDs are assigned from `first_id` upward in generation order (category, then city, then
/// sequence within the city). Unknown cities are not an error: they borrow the default city's
/// bounds and areas and are listed in `fallback_cities`.
pub fn generate_corpus<R: Rng + ?Sized>(
    catalog: &Catalog,
    plan: &CorpusPlan,
    options: &GeneratorOptions,
    first_id: IssueId,
    rng: &mut R,
) -> GeneratedCorpus {
    let mut next_id = first_id;
    let mut issues = Vec::with_capacity(plan.total() as usize);
    let mut fallback_cities = BTreeSet::new();

    for category in Category::ALL {
        let photos = catalog.photo_pool(category);
        for CityCount { city, count } in plan.distribution(category) {
            if *count > 0
                && !catalog.is_generation_city(city)
                && fallback_cities.insert(city.clone())
            {
                tracing::warn!(
                    city = %city,
                    fallback = catalog.default_city().name,
                    "unknown city in distribution; using default city bounds and areas"
                );
            }

            for _ in 0..*count {
                let fields = draw_issue(catalog, category, city, &photos, options, rng);
                issues.push(Issue::new(next_id, fields));
                next_id += 1;
            }
        }
    }

    tracing::debug!(
        issues = issues.len(),
        first_id,
        next_id,
        "generated synthetic corpus"
    );

    GeneratedCorpus {
        issues,
        next_id,
        fallback_cities: fallback_cities.into_iter().collect(),
    }
}

/// Generate the same per-city distribution for every category with a fresh RNG from `options`.
pub fn generate_uniform_corpus(
    catalog: &Catalog,
    distribution: &[CityCount],
    options: &GeneratorOptions,
    first_id: IssueId,
) -> GeneratedCorpus {
    let mut rng = options.rng();
    generate_corpus(
        catalog,
        &CorpusPlan::uniform(distribution),
        options,
        first_id,
        &mut rng,
    )
}

fn draw_issue<R: Rng + ?Sized>(
    catalog: &Catalog,
    category: Category,
    city: &str,
    photos: &[String],
    options: &GeneratorOptions,
    rng: &mut R,
) -> NewIssue {
    let area = catalog
        .areas_for(city)
        .choose(rng)
        .copied()
        .unwrap_or(city);
    let priority = *Priority::ALL.choose(rng).unwrap_or(&Priority::Medium);
    let status = *Status::ALL.choose(rng).unwrap_or(&Status::Pending);

    let bounds = catalog.bounds_for(city);
    let location = GeoPoint::new(
        uniform_in(rng, bounds.lat),
        uniform_in(rng, bounds.lng),
    );

    let days_ago = rng.random_range(0..options.window_days.max(1));
    let reported_date = options
        .anchor_date
        .checked_sub(Duration::days(i64::from(days_ago)))
        .unwrap_or(options.anchor_date);

    let photo = photos.choose(rng).cloned().unwrap_or_default();
    let proof_photo = match status {
        Status::Resolved => catalog.proof_pool().choose(rng).map(|p| p.to_string()),
        _ => None,
    };

    NewIssue {
        city: city.to_string(),
        area: area.to_string(),
        category,
        photo,
        priority,
        status,
        location,
        reported_date,
        proof_photo,
    }
}

fn uniform_in<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn options(seed: u64) -> GeneratorOptions {
        GeneratorOptions {
            seed: Some(seed),
            anchor_date: date!(2026 - 05 - 31),
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }

    #[test]
    fn plan_builder_merges_cities_per_category() {
        let plan = CorpusPlan::default()
            .with(Category::Pothole, "Pune", 2)
            .with(Category::Pothole, "Mumbai", 3)
            .with(Category::Garbage, "Nagpur", 1);
        assert_eq!(plan.total(), 6);
        assert_eq!(plan.distribution(Category::Pothole).len(), 2);
        assert!(plan.distribution(Category::BurningWaste).is_empty());
    }

    #[test]
    fn reported_dates_stay_inside_window() {
        let opts = options(11);
        let corpus = generate_uniform_corpus(
            &Catalog::maharashtra(),
            &[CityCount::new("Pune", 40)],
            &opts,
            1,
        );
        let earliest = date!(2026 - 05 - 02);
        assert!(corpus
            .issues
            .iter()
            .all(|i| i.reported_date >= earliest && i.reported_date <= opts.anchor_date));
    }

    #[test]
    fn zero_counts_generate_nothing_and_do_not_flag_fallback() {
        let corpus = generate_uniform_corpus(
            &Catalog::maharashtra(),
            &[CityCount::new("Atlantis", 0)],
            &options(3),
            10,
        );
        assert!(corpus.issues.is_empty());
        assert_eq!(corpus.next_id, 10);
        assert!(corpus.fallback_cities.is_empty());
    }
}
