use serde::{Deserialize, Serialize};

use crate::domain::{Category, GeoPoint};

/// Latitude/longitude box a city's synthetic issues are placed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bounds {
    pub lat: (f64, f64),
    pub lng: (f64, f64),
}

impl Bounds {
    /// Inclusive on both ends.
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.lat.0..=self.lat.1).contains(&point.lat)
            && (self.lng.0..=self.lng.1).contains(&point.lng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CityProfile {
    pub name: &'static str,
    pub reference: GeoPoint,
    /// `None` for reference-only cities, which are reported on but never generated for.
    pub bounds: Option<Bounds>,
    pub areas: &'static [&'static str],
}

/// Name and reference coordinate of a city, as shown on the state-level map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityReference {
    pub city: String,
    pub location: GeoPoint,
}

/// Static reference data the engine reads but never mutates.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    cities: Vec<CityProfile>,
    default_city: &'static str,
}

const PUNE_AREAS: &[&str] = &[
    "FC Road",
    "JM Road",
    "Karve Road",
    "Baner Road",
    "Aundh",
    "Kothrud",
    "Viman Nagar",
    "Koregaon Park",
    "Hinjewadi",
    "Wakad",
    "Pimple Saudagar",
    "Bavdhan",
    "Katraj",
    "Kondhwa",
    "Hadapsar",
    "Magarpatta",
    "Kharadi",
    "Vadgaon Sheri",
    "Dhanori",
    "Lohegaon",
    "Chinchwad",
    "Pimpri",
    "Bhosari",
    "Nigdi",
    "Akurdi",
    "Ravet",
    "Tathawade",
    "Thergaon",
    "Sangvi",
    "Dighi",
    "Alandi",
    "Talegaon",
    "Dehu Road",
    "Shivajinagar",
    "Swargate",
    "Pune Station",
    "Deccan",
    "Shaniwar Wada",
    "Kasba Peth",
    "Budhwar Peth",
    "Tilak Road",
    "Laxmi Road",
    "Tulsi Baug",
    "Appa Balwant Chowk",
    "Senapati Bapat Road",
    "University Road",
    "Ganeshkhind Road",
    "Sinhagad Road",
    "Paud Road",
    "Katraj-Kondhwa Bypass",
    "Mumbai-Pune Expressway",
    "Hinjewadi IT Park",
];

const MUMBAI_AREAS: &[&str] = &[
    "Andheri",
    "Bandra",
    "Dadar",
    "Kurla",
    "Powai",
    "Goregaon",
    "Malad",
    "Borivali",
    "Thane",
    "Navi Mumbai",
    "Vashi",
    "Chembur",
    "Ghatkopar",
    "Mulund",
    "Bhandup",
];

const NAGPUR_AREAS: &[&str] = &[
    "Dharampeth",
    "Sitabuldi",
    "Civil Lines",
    "Ramdaspeth",
    "Shankar Nagar",
    "Wardha Road",
    "Amravati Road",
    "Kamptee Road",
    "Hingna",
    "Koradi",
    "Butibori",
    "Mihan",
];

const PHOTO_BASE: &str = "https://media.civic-issues.example/reports";

/// Shared pool of "after" images used as proof for synthetic resolved issues.
const PROOF_POOL: &[&str] = &[
    "https://media.civic-issues.example/proof/road-patched.webp",
    "https://media.civic-issues.example/proof/area-cleared.avif",
    "https://media.civic-issues.example/proof/pole-repaired.webp",
    "https://media.civic-issues.example/proof/debris-removed.avif",
    "https://media.civic-issues.example/proof/drain-cleared.jpg",
];

impl Catalog {
    /// The Maharashtra catalog: three generation cities plus two reference-only cities.
    pub fn maharashtra() -> Self {
        Self {
            cities: vec![
                CityProfile {
                    name: "Mumbai",
                    reference: GeoPoint::new(19.0760, 72.8777),
                    bounds: Some(Bounds {
                        lat: (19.0, 19.3),
                        lng: (72.7, 73.0),
                    }),
                    areas: MUMBAI_AREAS,
                },
                CityProfile {
                    name: "Pune",
                    reference: GeoPoint::new(18.5204, 73.8567),
                    bounds: Some(Bounds {
                        lat: (18.4, 18.7),
                        lng: (73.7, 74.0),
                    }),
                    areas: PUNE_AREAS,
                },
                CityProfile {
                    name: "Nagpur",
                    reference: GeoPoint::new(21.1458, 79.0882),
                    bounds: Some(Bounds {
                        lat: (21.0, 21.3),
                        lng: (78.9, 79.2),
                    }),
                    areas: NAGPUR_AREAS,
                },
                CityProfile {
                    name: "Nashik",
                    reference: GeoPoint::new(19.9975, 73.7898),
                    bounds: None,
                    areas: &[],
                },
                CityProfile {
                    name: "Aurangabad",
                    reference: GeoPoint::new(19.8762, 75.3433),
                    bounds: None,
                    areas: &[],
                },
            ],
            default_city: "Pune",
        }
    }

    pub fn cities(&self) -> &[CityProfile] {
        &self.cities
    }

    pub fn city(&self, name: &str) -> Option<&CityProfile> {
        self.cities.iter().find(|c| c.name == name)
    }

    pub fn default_city(&self) -> &CityProfile {
        // Constructors only name a default that is in `cities`.
        self.city(self.default_city).unwrap_or(&self.cities[0])
    }

    /// True when `name` has its own bounds and areas. Other names generate via the fallback.
    pub fn is_generation_city(&self, name: &str) -> bool {
        self.city(name)
            .is_some_and(|c| c.bounds.is_some() && !c.areas.is_empty())
    }

    /// Profile used to place issues for `name`: the city itself, or the default city.
    pub fn generation_profile(&self, name: &str) -> &CityProfile {
        match self.city(name) {
            Some(c) if c.bounds.is_some() && !c.areas.is_empty() => c,
            _ => self.default_city(),
        }
    }

    pub fn bounds_for(&self, name: &str) -> Bounds {
        let profile = self.generation_profile(name);
        profile.bounds.unwrap_or(Bounds {
            lat: (profile.reference.lat, profile.reference.lat),
            lng: (profile.reference.lng, profile.reference.lng),
        })
    }

    pub fn areas_for(&self, name: &str) -> &'static [&'static str] {
        self.generation_profile(name).areas
    }

    /// Every known city with its reference coordinate, in catalog order.
    pub fn reference_cities(&self) -> Vec<CityReference> {
        self.cities
            .iter()
            .map(|c| CityReference {
                city: c.name.to_string(),
                location: c.reference,
            })
            .collect()
    }

    pub fn photo_pool(&self, category: Category) -> Vec<String> {
        let slug = match category {
            Category::Pothole => "pothole.webp",
            Category::Garbage => "garbage.avif",
            Category::ElectricHazard => "electric-hazard.webp",
            Category::StrayCattle => "stray-cattle.avif",
            Category::ConstructionDebris => "construction-debris.avif",
            Category::StagnantWater => "stagnant-water.jpg",
            Category::BurningWaste => "burning-waste.webp",
        };
        (1..=3).map(|n| format!("{PHOTO_BASE}/{n}/{slug}")).collect()
    }

    pub fn proof_pool(&self) -> &'static [&'static str] {
        PROOF_POOL
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::maharashtra()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_and_reference_only_cities_fall_back_to_default() {
        let catalog = Catalog::maharashtra();
        assert_eq!(catalog.default_city().name, "Pune");
        assert!(catalog.is_generation_city("Mumbai"));
        assert!(!catalog.is_generation_city("Nashik"));
        assert!(!catalog.is_generation_city("Atlantis"));
        assert_eq!(catalog.bounds_for("Atlantis"), catalog.bounds_for("Pune"));
        assert_eq!(catalog.areas_for("Nashik"), catalog.areas_for("Pune"));
    }

    #[test]
    fn reference_cities_cover_all_known_cities() {
        let names: Vec<String> = Catalog::maharashtra()
            .reference_cities()
            .into_iter()
            .map(|c| c.city)
            .collect();
        assert_eq!(names, ["Mumbai", "Pune", "Nagpur", "Nashik", "Aurangabad"]);
    }

    #[test]
    fn every_category_has_photos() {
        let catalog = Catalog::maharashtra();
        for category in Category::ALL {
            assert!(!catalog.photo_pool(category).is_empty());
        }
        assert!(!catalog.proof_pool().is_empty());
    }
}
