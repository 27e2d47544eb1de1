use serde::Serialize;

use crate::profile::Profile;

/// Categorical fields that support exact-match filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Gender,
    ResidentStatus,
    MaritalStatus,
    Subsect,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Gender,
        Category::ResidentStatus,
        Category::MaritalStatus,
        Category::Subsect,
    ];

    pub fn value_of(self, profile: &Profile) -> &str {
        match self {
            Category::Gender => &profile.gender,
            Category::ResidentStatus => &profile.resident_status,
            Category::MaritalStatus => &profile.marital_status,
            Category::Subsect => &profile.subsect,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Gender => "gender",
            Category::ResidentStatus => "resident",
            Category::MaritalStatus => "marital",
            Category::Subsect => "subsect",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gender" => Some(Category::Gender),
            "resident" | "resident-status" | "resident_status" => Some(Category::ResidentStatus),
            "marital" | "marital-status" | "marital_status" => Some(Category::MaritalStatus),
            "subsect" | "sakha" => Some(Category::Subsect),
            _ => None,
        }
    }
}

/// The user-chosen predicate set. Every predicate is optional; set ones are
/// combined with AND.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterPredicates {
    pub search: String,
    pub gender: Option<String>,
    pub resident_status: Option<String>,
    pub marital_status: Option<String>,
    pub subsect: Option<String>,
    pub favorites_only: bool,
}

impl FilterPredicates {
    pub fn category(&self, category: Category) -> Option<&str> {
        match category {
            Category::Gender => self.gender.as_deref(),
            Category::ResidentStatus => self.resident_status.as_deref(),
            Category::MaritalStatus => self.marital_status.as_deref(),
            Category::Subsect => self.subsect.as_deref(),
        }
    }

    /// Empty values unset the constraint.
    pub fn set_category(&mut self, category: Category, value: Option<String>) {
        let value = value.filter(|v| !v.is_empty());
        match category {
            Category::Gender => self.gender = value,
            Category::ResidentStatus => self.resident_status = value,
            Category::MaritalStatus => self.marital_status = value,
            Category::Subsect => self.subsect = value,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.search.is_empty()
            && Category::ALL.iter().all(|c| self.category(*c).is_none())
            && !self.favorites_only
    }
}

/// Fields searched by free text, in a fixed order.
pub fn search_fields(p: &Profile) -> [&str; 34] {
    [
        &p.full_name,
        &p.name,
        &p.surname,
        &p.subsect,
        &p.gothra,
        &p.education,
        &p.occupation,
        &p.company,
        &p.job_location,
        &p.native_place,
        &p.marital_status,
        &p.resident_status,
        &p.birth_star,
        &p.college,
        &p.complexion,
        &p.height,
        &p.date_of_birth,
        &p.place_of_birth,
        &p.time_of_birth,
        &p.padam,
        &p.father_name,
        &p.father_occupation,
        &p.mother_name,
        &p.mother_occupation,
        &p.profile_created_by,
        &p.salary,
        &p.passout_year,
        &p.primary_contact,
        &p.secondary_contact,
        &p.max_age_gap,
        &p.subsect_preference,
        &p.location_preference,
        &p.education_preference,
        &p.other_info,
    ]
}

pub fn search_haystack(p: &Profile) -> String {
    search_fields(p).join(" ").to_lowercase()
}

fn matches(p: &Profile, predicates: &FilterPredicates, needle: &str) -> bool {
    if !needle.is_empty() && !search_haystack(p).contains(needle) {
        return false;
    }
    for category in Category::ALL {
        if let Some(wanted) = predicates.category(category) {
            if category.value_of(p) != wanted {
                return false;
            }
        }
    }
    if predicates.favorites_only && !p.favorite {
        return false;
    }
    true
}

/// Load positions of every profile satisfying `predicates`, in load order.
pub fn filter_profiles(profiles: &[Profile], predicates: &FilterPredicates) -> Vec<usize> {
    let needle = predicates.search.to_lowercase();
    profiles
        .iter()
        .enumerate()
        .filter(|(_, p)| matches(p, predicates, &needle))
        .map(|(i, _)| i)
        .collect()
}

/// Distinct non-empty values of `category`, in first-seen order.
pub fn category_options(profiles: &[Profile], category: Category) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for p in profiles {
        let value = category.value_of(p);
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}
