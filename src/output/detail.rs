use colored::Colorize;
use serde::Serialize;

use crate::normalize::{format_salary, title_case};
use crate::profile::Profile;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DetailSection {
    pub title: &'static str,
    pub rows: Vec<DetailRow>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetail {
    pub number: usize,
    pub full_name: String,
    pub gender: String,
    pub tags: Vec<String>,
    pub favorite: bool,
    pub sections: Vec<DetailSection>,
}

fn row(label: &'static str, value: impl Into<String>) -> DetailRow {
    DetailRow {
        label,
        value: value.into(),
    }
}

fn with_unit(value: &str, unit: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("{value} {unit}")
    }
}

pub fn detail_sections(p: &Profile) -> Vec<DetailSection> {
    let gender = title_case(&p.gender);
    vec![
        DetailSection {
            title: "Personal Details",
            rows: vec![
                row("Name", title_case(&p.name)),
                row("Surname", title_case(&p.surname)),
                row("Gender", gender),
                row("Date Of Birth", p.date_of_birth.clone()),
                row("Age", format!("{} years", p.age)),
                row("Height", p.height.clone()),
                row("Complexion", title_case(&p.complexion)),
                row("Marital Status", title_case(&p.marital_status)),
                row("Resident Status", title_case(&p.resident_status)),
                row("Profile Created By", title_case(&p.profile_created_by)),
            ],
        },
        DetailSection {
            title: "Community & Horoscope",
            rows: vec![
                row("Subsect / Sakha", p.subsect.clone()),
                row("Gothra", title_case(&p.gothra)),
                row("Birth Star", title_case(&p.birth_star)),
                row("Padam", p.padam.clone()),
                row("Date Of Birth", p.date_of_birth.clone()),
                row("Place Of Birth", title_case(&p.place_of_birth)),
                row("Time Of Birth", p.time_of_birth.clone()),
            ],
        },
        DetailSection {
            title: "Family Details",
            rows: vec![
                row("Father's Name", title_case(&p.father_name)),
                row("Father's Occupation", title_case(&p.father_occupation)),
                row("Mother's Name", title_case(&p.mother_name)),
                row("Mother's Occupation", title_case(&p.mother_occupation)),
                row("Native Place", title_case(&p.native_place)),
            ],
        },
        DetailSection {
            title: "Education & Career",
            rows: vec![
                row("Highest Qualification", title_case(&p.education)),
                row("College / University", title_case(&p.college)),
                row("Passout Year", p.passout_year.clone()),
                row("Designation", title_case(&p.occupation)),
                row("Company", title_case(&p.company)),
                row("Job Location", title_case(&p.job_location)),
                row("Annual Salary", format_salary(&p.salary)),
            ],
        },
        DetailSection {
            title: "Contact Details",
            rows: vec![
                row("Primary Contact", p.primary_contact.clone()),
                row("Secondary Contact", p.secondary_contact.clone()),
            ],
        },
        DetailSection {
            title: "Partner Preferences",
            rows: vec![
                row("Max Age Gap", with_unit(&p.max_age_gap, "years")),
                row("Subsect Preference", title_case(&p.subsect_preference)),
                row("Min Height", p.min_height_pref.clone()),
                row("Max Height", p.max_height_pref.clone()),
                row("Location Preference", title_case(&p.location_preference)),
                row("Education Preference", title_case(&p.education_preference)),
                row("Other Info / Comments", title_case(&p.other_info)),
            ],
        },
    ]
}

pub fn build_detail(position: usize, p: &Profile) -> ProfileDetail {
    let tags = [
        title_case(&p.resident_status),
        title_case(&p.marital_status),
        p.subsect.clone(),
    ]
    .into_iter()
    .filter(|t| !t.is_empty())
    .collect();
    ProfileDetail {
        number: position + 1,
        full_name: title_case(&p.full_name),
        gender: title_case(&p.gender),
        tags,
        favorite: p.favorite,
        sections: detail_sections(p),
    }
}

pub fn render_detail_text(detail: &ProfileDetail) -> String {
    let mut out = String::new();
    let star = if detail.favorite {
        "★".yellow().to_string()
    } else {
        "☆".dimmed().to_string()
    };
    out.push_str(&format!(
        "{} #{} {} ({})\n",
        star,
        detail.number,
        detail.full_name.bold(),
        detail.gender
    ));
    if !detail.tags.is_empty() {
        out.push_str(&format!("   {}\n", detail.tags.join(" · ").cyan()));
    }
    let width = detail
        .sections
        .iter()
        .flat_map(|s| s.rows.iter())
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);
    for section in &detail.sections {
        out.push('\n');
        out.push_str(&format!(":: {}\n", section.title.bold()));
        for r in &section.rows {
            let value = if r.value.is_empty() { "-" } else { r.value.as_str() };
            out.push_str(&format!("   {:<width$}  {}\n", r.label, value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Profile {
        Profile {
            name: "SRAVYA".to_string(),
            surname: "kanduri".to_string(),
            full_name: "SRAVYA kanduri".to_string(),
            gender: "female".to_string(),
            resident_status: "INDIAN CITIZEN".to_string(),
            subsect: "Vaidiki".to_string(),
            salary: "1250000".to_string(),
            max_age_gap: "3".to_string(),
            age: 24,
            ..Profile::default()
        }
    }

    fn value<'a>(detail: &'a ProfileDetail, label: &str) -> &'a str {
        detail
            .sections
            .iter()
            .flat_map(|s| s.rows.iter())
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
            .unwrap()
    }

    #[test]
    fn detail_applies_display_formatting() {
        let detail = build_detail(4, &sample());
        assert_eq!(detail.number, 5);
        assert_eq!(detail.full_name, "Sravya Kanduri");
        assert_eq!(detail.tags, vec!["Indian Citizen", "Vaidiki"]);
        assert_eq!(value(&detail, "Annual Salary"), "₹12.5 LPA");
        assert_eq!(value(&detail, "Age"), "24 years");
        assert_eq!(value(&detail, "Max Age Gap"), "3 years");
        assert_eq!(value(&detail, "Min Height"), "");
    }

    #[test]
    fn detail_text_lists_every_section() {
        colored::control::set_override(false);
        let text = render_detail_text(&build_detail(0, &sample()));
        for title in [
            "Personal Details",
            "Community & Horoscope",
            "Family Details",
            "Education & Career",
            "Contact Details",
            "Partner Preferences",
        ] {
            assert!(text.contains(title), "missing {title}");
        }
        assert!(text.starts_with("☆ #1 Sravya Kanduri (Female)"));
    }
}
