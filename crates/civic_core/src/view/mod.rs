use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Issue};

/// Hard upper bound on rows returned by [`sort_and_filter`]. Not a page size.
pub const DISPLAY_CAP: usize = 200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    City,
    Category,
    Department,
    Description,
    Photo,
    Priority,
    Status,
    Address,
    ReportedDate,
}

impl SortField {
    pub const ALL: [SortField; 10] = [
        SortField::Id,
        SortField::City,
        SortField::Category,
        SortField::Department,
        SortField::Description,
        SortField::Photo,
        SortField::Priority,
        SortField::Status,
        SortField::Address,
        SortField::ReportedDate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::City => "city",
            SortField::Category => "category",
            SortField::Department => "department",
            SortField::Description => "description",
            SortField::Photo => "photo",
            SortField::Priority => "priority",
            SortField::Status => "status",
            SortField::Address => "address",
            SortField::ReportedDate => "reportedDate",
        }
    }

    /// Type-aware ascending comparison of `a` and `b` on this field.
    pub fn compare(self, a: &Issue, b: &Issue) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::ReportedDate => a.reported_date.cmp(&b.reported_date),
            SortField::City => cmp_ignore_case(&a.city, &b.city),
            SortField::Category => cmp_ignore_case(a.category.label(), b.category.label()),
            SortField::Department => {
                cmp_ignore_case(a.department.label(), b.department.label())
            }
            SortField::Description => cmp_ignore_case(&a.description, &b.description),
            SortField::Photo => cmp_ignore_case(&a.photo, &b.photo),
            SortField::Status => cmp_ignore_case(a.status.label(), b.status.label()),
            SortField::Address => cmp_ignore_case(&a.address, &b.address),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        SortField::ALL
            .into_iter()
            .find(|f| f.name().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown sort field: {s}"))
    }
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Column-header sort state: selecting the active field again flips direction, selecting a
/// different field starts ascending.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortState {
    pub field: Option<SortField>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn toggle(self, field: SortField) -> Self {
        if self.field == Some(field) {
            Self {
                field: Some(field),
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                field: Some(field),
                direction: SortDirection::Asc,
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IssueFilter {
    pub city: Option<String>,
    pub category: Option<Category>,
}

impl IssueFilter {
    pub fn matches(&self, issue: &Issue) -> bool {
        self.city.as_deref().map_or(true, |c| issue.city == c)
            && self.category.map_or(true, |c| issue.category == c)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ViewOptions {
    pub field: Option<SortField>,
    pub direction: Option<SortDirection>,
    pub filter_city: Option<String>,
    pub filter_category: Option<Category>,
}

impl ViewOptions {
    pub fn filter(&self) -> IssueFilter {
        IssueFilter {
            city: self.filter_city.clone(),
            category: self.filter_category,
        }
    }

    pub fn with_sort(mut self, state: SortState) -> Self {
        self.field = state.field;
        self.direction = Some(state.direction);
        self
    }
}

/// Ordered, capped slice of the corpus plus the size it was cut from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueView {
    pub issues: Vec<Issue>,
    /// Issues matching the filter before the display cap.
    pub total: usize,
}

impl IssueView {
    pub fn shown(&self) -> usize {
        self.issues.len()
    }

    pub fn is_truncated(&self) -> bool {
        self.total > self.issues.len()
    }
}

/// Default ordering: most urgent first, then most recently reported.
pub fn default_order(a: &Issue, b: &Issue) -> Ordering {
    a.priority
        .rank()
        .cmp(&b.priority.rank())
        .then_with(|| b.reported_date.cmp(&a.reported_date))
}

/// Filter, sort and cap `issues` without touching the input.
///
/// Sorting is stable, so equal keys keep their input order in both directions.
pub fn sort_and_filter(issues: &[Issue], options: &ViewOptions) -> IssueView {
    let filter = options.filter();
    let mut rows: Vec<&Issue> = issues.iter().filter(|i| filter.matches(i)).collect();
    let total = rows.len();

    match options.field {
        Some(field) => {
            let direction = options.direction.unwrap_or_default();
            rows.sort_by(|a, b| match direction {
                SortDirection::Asc => field.compare(a, b),
                SortDirection::Desc => field.compare(b, a),
            });
        }
        None => rows.sort_by(|a, b| default_order(a, b)),
    }

    IssueView {
        issues: rows.into_iter().take(DISPLAY_CAP).cloned().collect(),
        total,
    }
}

/// Whose issues a viewer sees. Identity comes from the caller's session layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "camelCase")]
pub enum ViewerScope {
    /// State-level officials see every city.
    Government,
    /// Municipal staff see their own city only.
    Municipal { city: String },
}

impl ViewerScope {
    pub fn filter_city(&self) -> Option<&str> {
        match self {
            ViewerScope::Government => None,
            ViewerScope::Municipal { city } => Some(city.as_str()),
        }
    }

    /// View options for this viewer, optionally narrowed to one category.
    pub fn view_options(&self, category: Option<Category>, sort: SortState) -> ViewOptions {
        ViewOptions {
            filter_city: self.filter_city().map(str::to_string),
            filter_category: category,
            ..ViewOptions::default()
        }
        .with_sort(sort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_same_field_and_resets_on_new_field() {
        let s = SortState::default().toggle(SortField::Priority);
        assert_eq!(s.direction, SortDirection::Asc);
        let s = s.toggle(SortField::Priority);
        assert_eq!(s.direction, SortDirection::Desc);
        let s = s.toggle(SortField::Id);
        assert_eq!(
            s,
            SortState {
                field: Some(SortField::Id),
                direction: SortDirection::Asc
            }
        );
    }

    #[test]
    fn sort_field_parses_loosely() {
        assert_eq!("reported_date".parse::<SortField>(), Ok(SortField::ReportedDate));
        assert_eq!("ReportedDate".parse::<SortField>(), Ok(SortField::ReportedDate));
        assert_eq!("ID".parse::<SortField>(), Ok(SortField::Id));
        assert!("severity".parse::<SortField>().is_err());
    }

    #[test]
    fn case_insensitive_compare_ignores_ascii_case() {
        assert_eq!(cmp_ignore_case("aundh", "Baner"), Ordering::Less);
        assert_eq!(cmp_ignore_case("PUNE", "pune"), Ordering::Equal);
    }

    #[test]
    fn viewer_scope_selects_city_filter() {
        let municipal = ViewerScope::Municipal {
            city: "Pune".to_string(),
        };
        assert_eq!(municipal.filter_city(), Some("Pune"));
        assert_eq!(ViewerScope::Government.filter_city(), None);

        let opts = municipal.view_options(Some(Category::Garbage), SortState::default());
        assert_eq!(opts.filter_city.as_deref(), Some("Pune"));
        assert_eq!(opts.filter_category, Some(Category::Garbage));
        assert_eq!(opts.field, None);
    }
}
