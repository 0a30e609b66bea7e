use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Date;

pub type IssueId = i64;

/// Kind of civic problem a citizen reported.
///
/// Declaration order is the catalog order used by every rollup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Pothole,
    Garbage,
    #[serde(rename = "Electric Hazard")]
    ElectricHazard,
    #[serde(rename = "Stray cattle")]
    StrayCattle,
    #[serde(rename = "Construction Debris")]
    ConstructionDebris,
    #[serde(rename = "Stagnant water")]
    StagnantWater,
    #[serde(rename = "Burning waste")]
    BurningWaste,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Pothole,
        Category::Garbage,
        Category::ElectricHazard,
        Category::StrayCattle,
        Category::ConstructionDebris,
        Category::StagnantWater,
        Category::BurningWaste,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Pothole => "Pothole",
            Category::Garbage => "Garbage",
            Category::ElectricHazard => "Electric Hazard",
            Category::StrayCattle => "Stray cattle",
            Category::ConstructionDebris => "Construction Debris",
            Category::StagnantWater => "Stagnant water",
            Category::BurningWaste => "Burning waste",
        }
    }

    /// Department responsible for this category. Many categories share a department.
    pub fn department(self) -> Department {
        match self {
            Category::Pothole | Category::ConstructionDebris => Department::Roads,
            Category::Garbage | Category::StrayCattle | Category::BurningWaste => {
                Department::Garbage
            }
            Category::ElectricHazard => Department::Electricity,
            Category::StagnantWater => Department::WaterSupply,
        }
    }

    /// Citizen-facing description for an issue of this category at `area`.
    pub fn describe(self, area: &str) -> String {
        match self {
            Category::Pothole => {
                format!("Large pothole on {area} causing traffic issues and vehicle damage")
            }
            Category::Garbage => {
                format!("Garbage accumulation near {area} creating unhygienic conditions")
            }
            Category::ElectricHazard => {
                format!("Exposed electrical wires or damaged electric pole near {area}")
            }
            Category::StrayCattle => {
                format!("Stray cattle roaming on {area} causing traffic obstruction")
            }
            Category::ConstructionDebris => {
                format!("Construction debris dumped on {area} blocking pedestrian path")
            }
            Category::StagnantWater => {
                format!("Stagnant water accumulation near {area} breeding mosquitoes")
            }
            Category::BurningWaste => {
                format!("Waste burning near {area} causing air pollution and health hazards")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Department {
    Roads,
    Garbage,
    #[serde(rename = "Water Supply")]
    WaterSupply,
    Electricity,
    Streetlights,
}

impl Department {
    pub const ALL: [Department; 5] = [
        Department::Roads,
        Department::Garbage,
        Department::WaterSupply,
        Department::Electricity,
        Department::Streetlights,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Department::Roads => "Roads",
            Department::Garbage => "Garbage",
            Department::WaterSupply => "Water Supply",
            Department::Electricity => "Electricity",
            Department::Streetlights => "Streetlights",
        }
    }
}

/// Urgency of an issue. Derived `Ord` follows rank: `VeryHigh < High < Medium < Low`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::VeryHigh,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// 0 is most urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::VeryHigh => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::VeryHigh => "Very High",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn is_high_urgency(self) -> bool {
        matches!(self, Priority::VeryHigh | Priority::High)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Pending, Status::InProgress, Status::Resolved];

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::InProgress => "In Progress",
            Status::Resolved => "Resolved",
        }
    }
}

macro_rules! label_enum_text {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        /// Case-insensitive parse of the human label; `-`/`_` are accepted in place of spaces.
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_label(s);
                $ty::ALL
                    .into_iter()
                    .find(|v| normalize_label(v.label()) == wanted)
                    .ok_or_else(|| format!("unknown {}: {s}", $what))
            }
        }
    };
}

fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

label_enum_text!(Category, "category");
label_enum_text!(Department, "department");
label_enum_text!(Priority, "priority");
label_enum_text!(Status, "status");

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A single civic issue report.
///
/// Notes:
/// - `department` is always `category.department()`; build issues through [`Issue::new`] or
///   the generator rather than setting it by hand.
/// - `proof_photo` should be present iff `status == Resolved`. [`Issue::new`] drops proof from
///   non-Resolved issues but cannot invent one for a Resolved issue built without it;
///   `validate::validate_issue` reports that case. The lifecycle module is the only sanctioned
///   way to change `status` after creation and always keeps the pairing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    pub city: String,
    pub category: Category,
    pub department: Department,
    pub description: String,
    pub photo: String,
    pub priority: Priority,
    pub status: Status,
    pub location: GeoPoint,
    pub address: String,
    #[serde(with = "calendar_date")]
    pub reported_date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_photo: Option<String>,
}

/// Creation-time fields of an [`Issue`]; the derived ones are filled in by [`Issue::new`].
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub city: String,
    pub area: String,
    pub category: Category,
    pub photo: String,
    pub priority: Priority,
    pub status: Status,
    pub location: GeoPoint,
    pub reported_date: Date,
    pub proof_photo: Option<String>,
}

impl Issue {
    /// Fills in address, description and department. Proof is kept only for Resolved issues;
    /// a Resolved issue without proof is built as given.
    pub fn new(id: IssueId, fields: NewIssue) -> Self {
        let NewIssue {
            city,
            area,
            category,
            photo,
            priority,
            status,
            location,
            reported_date,
            proof_photo,
        } = fields;

        // Proof only travels with a Resolved status.
        let proof_photo = match status {
            Status::Resolved => proof_photo,
            _ => None,
        };

        Self {
            id,
            address: format!("{area}, {city}"),
            description: category.describe(&area),
            department: category.department(),
            city,
            category,
            photo,
            priority,
            status,
            location,
            reported_date,
            proof_photo,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ValidationWarning {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// `YYYY-MM-DD` (de)serialization for calendar dates.
pub mod calendar_date {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::BorrowedFormatItem;
    use time::macros::format_description;
    use time::Date;

    pub const FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn format(date: Date) -> String {
        // The description only uses components every Date has.
        date.format(FORMAT).unwrap_or_default()
    }

    pub fn parse(s: &str) -> Result<Date, time::error::Parse> {
        Date::parse(s.trim(), FORMAT)
    }

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date.format(FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse(&text).map_err(serde::de::Error::custom)
    }
}
