use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::domain::{Issue, IssueId, Status, ValidationWarning};

/// Check one issue against the record invariants:
/// department derived from category, proof present iff Resolved, location inside the city's
/// bounds (the default city's for fallback cities).
pub fn validate_issue(issue: &Issue, catalog: &Catalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let expected = issue.category.department();
    if issue.department != expected {
        warnings.push(
            ValidationWarning::new(
                "VALIDATION_DEPARTMENT_MISMATCH",
                "Department does not match the category's department",
            )
            .with_details(format!(
                "category={}; department={}; expected={}",
                issue.category, issue.department, expected
            )),
        );
    }

    let has_proof = issue
        .proof_photo
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());
    match (issue.status, has_proof) {
        (Status::Resolved, false) => warnings.push(ValidationWarning::new(
            "VALIDATION_RESOLVED_WITHOUT_PROOF",
            "Resolved issue has no proof photo reference",
        )),
        (status, true) if status != Status::Resolved => warnings.push(
            ValidationWarning::new(
                "VALIDATION_PROOF_ON_UNRESOLVED",
                "Proof photo reference present on an issue that is not Resolved",
            )
            .with_details(format!("status={status}")),
        ),
        _ => {}
    }

    let bounds = catalog.bounds_for(&issue.city);
    if !bounds.contains(issue.location) {
        warnings.push(
            ValidationWarning::new(
                "VALIDATION_LOCATION_OUT_OF_BOUNDS",
                format!("Location is outside the bounds registered for {}", issue.city),
            )
            .with_details(format!(
                "lat={}; lng={}; lat_bounds={:?}; lng_bounds={:?}",
                issue.location.lat, issue.location.lng, bounds.lat, bounds.lng
            )),
        );
    }

    warnings
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IssueValidationReportItem {
    pub id: IssueId,
    pub warnings: Vec<ValidationWarning>,
}

/// Validate every issue plus the corpus-wide ID uniqueness rule.
///
/// Only issues with at least one warning are listed, ordered by ID.
pub fn validate_corpus(issues: &[Issue], catalog: &Catalog) -> Vec<IssueValidationReportItem> {
    let mut by_id: BTreeMap<IssueId, Vec<ValidationWarning>> = BTreeMap::new();
    let mut seen: BTreeMap<IssueId, usize> = BTreeMap::new();

    for issue in issues {
        *seen.entry(issue.id).or_insert(0) += 1;
        let warnings = validate_issue(issue, catalog);
        if !warnings.is_empty() {
            by_id.entry(issue.id).or_default().extend(warnings);
        }
    }

    for (id, count) in seen {
        if count > 1 {
            by_id.entry(id).or_default().push(
                ValidationWarning::new("VALIDATION_DUPLICATE_ID", "Issue ID is not unique")
                    .with_details(format!("id={id}; occurrences={count}")),
            );
        }
    }

    by_id
        .into_iter()
        .map(|(id, mut warnings)| {
            warnings.sort_by(|a, b| a.code.cmp(&b.code));
            IssueValidationReportItem { id, warnings }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, GeoPoint, NewIssue, Priority};
    use time::macros::date;

    fn fields(status: Status, proof_photo: Option<&str>) -> NewIssue {
        NewIssue {
            city: "Pune".to_string(),
            area: "Aundh".to_string(),
            category: Category::Garbage,
            photo: "photo".to_string(),
            priority: Priority::Medium,
            status,
            location: GeoPoint::new(18.55, 73.8),
            reported_date: date!(2026 - 01 - 09),
            proof_photo: proof_photo.map(str::to_string),
        }
    }

    #[test]
    fn constructor_leaves_missing_proof_for_the_validator() {
        let catalog = Catalog::maharashtra();

        let unproven = Issue::new(1, fields(Status::Resolved, None));
        assert_eq!(unproven.status, Status::Resolved);
        assert_eq!(unproven.proof_photo, None);
        let codes: Vec<String> = validate_issue(&unproven, &catalog)
            .into_iter()
            .map(|w| w.code)
            .collect();
        assert_eq!(codes, vec!["VALIDATION_RESOLVED_WITHOUT_PROOF".to_string()]);

        let stripped = Issue::new(2, fields(Status::Pending, Some("proof://early")));
        assert_eq!(stripped.proof_photo, None);
        assert!(validate_issue(&stripped, &catalog).is_empty());
    }
}
