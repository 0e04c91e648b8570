//! Unmapped classifier and the manual-curation report.
//!
//! "Unmapped" is a data-quality signal: a college-looking name we could not
//! place on the map. Employer/military/trade entries are legitimate
//! non-mappable outcomes and never show up here.

use std::collections::HashMap;

use crate::models::{Alumnus, UnmappedGroup, UnmappedStudent};
use crate::resolve::context::ResolutionContext;
use crate::resolve::resolver::resolve_to_location;
use crate::utils::{is_non_college, normalize_institution};

/// Whether a record belongs in the manual-curation queue. Archived records
/// never count. Otherwise a record counts when it has no resolved location
/// and its cleaned name is either the literal "unknown" or a college-looking
/// name.
pub fn should_count_as_unmapped(alumnus: &Alumnus, ctx: &ResolutionContext) -> bool {
    if alumnus.is_archived {
        return false;
    }

    let raw = alumnus.institution_name.as_deref().unwrap_or("");
    if resolve_to_location(raw, ctx).is_some() {
        return false;
    }

    let cleaned = normalize_institution(raw);
    cleaned == "unknown" || !is_non_college(raw)
}

/// Group unmapped alumni by cleaned institution name, largest groups first.
/// The display name is the first raw spelling seen for the group.
pub fn build_unmapped_groups(alumni: &[Alumnus], ctx: &ResolutionContext) -> Vec<UnmappedGroup> {
    let mut groups: HashMap<String, UnmappedGroup> = HashMap::new();

    for alumnus in alumni {
        if !should_count_as_unmapped(alumnus, ctx) {
            continue;
        }
        let raw = alumnus.institution_name.as_deref().unwrap_or("");
        let key = normalize_institution(raw);

        let group = groups.entry(key).or_insert_with(|| UnmappedGroup {
            college_name: raw.trim().to_string(),
            student_count: 0,
            students: Vec::new(),
        });
        group.student_count += 1;
        group.students.push(UnmappedStudent {
            first_name: alumnus.first_name.clone(),
            last_name: alumnus.last_name.clone(),
            cohort_year: alumnus.cohort_year,
        });
    }

    let mut result: Vec<UnmappedGroup> = groups.into_values().collect();
    result.sort_by(|a, b| {
        b.student_count
            .cmp(&a.student_count)
            .then_with(|| a.college_name.cmp(&b.college_name))
    });
    result
}
