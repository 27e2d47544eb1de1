use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize;

pub const MARRIAGE_FIXED_FIELD: &str = "Is your marriage fixed ?";

/// One dataset value, translated from JSON exactly once at ingestion.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum RawValue {
    #[default]
    Missing,
    Text(String),
    Number(f64),
    Flag(bool),
    Other(String),
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Missing,
            Value::String(s) => RawValue::Text(s),
            Value::Bool(b) => RawValue::Flag(b),
            Value::Number(n) => match n.as_f64() {
                Some(f) => RawValue::Number(f),
                None => RawValue::Other(n.to_string()),
            },
            other => RawValue::Other(other.to_string()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl RawValue {
    /// Null, empty text, zero and `false` count as absent.
    pub fn is_falsy(&self) -> bool {
        match self {
            RawValue::Missing => true,
            RawValue::Text(s) => s.is_empty(),
            RawValue::Number(n) => *n == 0.0 || n.is_nan(),
            RawValue::Flag(b) => !b,
            RawValue::Other(_) => false,
        }
    }

    pub fn to_text(&self) -> String {
        if self.is_falsy() {
            return String::new();
        }
        match self {
            RawValue::Text(s) | RawValue::Other(s) => s.clone(),
            RawValue::Number(n) => format_number(*n),
            RawValue::Flag(b) => b.to_string(),
            RawValue::Missing => String::new(),
        }
    }
}

/// The source schema. Every key is optional; unknown keys are ignored.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(rename = "Name")]
    pub name: RawValue,
    #[serde(rename = "Surname")]
    pub surname: RawValue,
    #[serde(rename = "Gender")]
    pub gender: RawValue,
    #[serde(rename = "Date Of Birth")]
    pub date_of_birth: RawValue,
    #[serde(rename = "Time Of Birth")]
    pub time_of_birth: RawValue,
    #[serde(rename = "Place Of Birth")]
    pub place_of_birth: RawValue,
    #[serde(rename = "Birth Star")]
    pub birth_star: RawValue,
    #[serde(rename = "Padam")]
    pub padam: RawValue,
    #[serde(rename = "Resident Status")]
    pub resident_status: RawValue,
    #[serde(rename = "Profile Created By")]
    pub profile_created_by: RawValue,
    #[serde(rename = "Marital Status")]
    pub marital_status: RawValue,
    #[serde(rename = "SubSect / Sakha")]
    pub subsect: RawValue,
    #[serde(rename = "Gothra")]
    pub gothra: RawValue,
    #[serde(rename = "Fathers Name")]
    pub father_name: RawValue,
    #[serde(rename = "Fathers Occupation")]
    pub father_occupation: RawValue,
    #[serde(rename = "Mothers Name")]
    pub mother_name: RawValue,
    #[serde(rename = "Mothers Occupation")]
    pub mother_occupation: RawValue,
    #[serde(rename = "Highest Qualification")]
    pub education: RawValue,
    #[serde(rename = "College/University Name")]
    pub college: RawValue,
    #[serde(rename = "Passout Year")]
    pub passout_year: RawValue,
    #[serde(rename = "Current Job - Designation")]
    pub occupation: RawValue,
    #[serde(rename = "Company Name")]
    pub company: RawValue,
    #[serde(rename = "Current Job - Location")]
    pub job_location: RawValue,
    #[serde(rename = "Annual Salary in INR")]
    pub salary: RawValue,
    #[serde(rename = "Complexion")]
    pub complexion: RawValue,
    #[serde(rename = "Height")]
    pub height: RawValue,
    #[serde(rename = "Native Place")]
    pub native_place: RawValue,
    #[serde(rename = "Primary Contact Number")]
    pub primary_contact: RawValue,
    #[serde(rename = "Secondary Contact Number")]
    pub secondary_contact: RawValue,
    #[serde(rename = "Max Age - Gap")]
    pub max_age_gap: RawValue,
    #[serde(rename = "Subsect - Preference")]
    pub subsect_preference: RawValue,
    #[serde(rename = "Min Height Requirement")]
    pub min_height_pref: RawValue,
    #[serde(rename = "Max Height Requirement")]
    pub max_height_pref: RawValue,
    #[serde(rename = "Location Preference")]
    pub location_preference: RawValue,
    #[serde(rename = "Education Preference")]
    pub education_preference: RawValue,
    #[serde(rename = "Other Information / Comments")]
    pub other_info: RawValue,
    #[serde(rename = "Is your marriage fixed ?")]
    pub marriage_fixed: RawValue,
}

impl RawRecord {
    /// Only JSON objects are records; anything else in the dataset array is
    /// rejected here.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    pub fn is_marriage_fixed(&self) -> bool {
        self.marriage_fixed.to_text().trim().to_lowercase() == "yes"
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub surname: String,
    pub full_name: String,
    pub gender: String,
    pub date_of_birth: String,
    pub time_of_birth: String,
    pub place_of_birth: String,
    pub birth_star: String,
    pub padam: String,
    pub age: u32,
    pub resident_status: String,
    pub profile_created_by: String,
    pub marital_status: String,
    pub subsect: String,
    pub gothra: String,
    pub father_name: String,
    pub father_occupation: String,
    pub mother_name: String,
    pub mother_occupation: String,
    pub education: String,
    pub college: String,
    pub passout_year: String,
    pub occupation: String,
    pub company: String,
    pub job_location: String,
    pub salary: String,
    pub complexion: String,
    pub height: String,
    pub native_place: String,
    pub primary_contact: String,
    pub secondary_contact: String,
    pub max_age_gap: String,
    pub subsect_preference: String,
    pub min_height_pref: String,
    pub max_height_pref: String,
    pub location_preference: String,
    pub education_preference: String,
    pub other_info: String,
    pub favorite: bool,
}

pub fn map_profile(raw: &RawRecord, today: NaiveDate) -> Profile {
    map_profile_in(raw, today, &Local)
}

/// Builds the display model for one record. Never fails: absent or malformed
/// fields fall back per normalizer.
pub fn map_profile_in<Tz: TimeZone>(raw: &RawRecord, today: NaiveDate, tz: &Tz) -> Profile {
    let name = raw.name.to_text();
    let surname = raw.surname.to_text();
    let full_name = format!("{name} {surname}").trim().to_string();
    let dob = raw.date_of_birth.to_text();

    Profile {
        full_name,
        gender: raw.gender.to_text().to_lowercase(),
        date_of_birth: normalize::format_date_in(&dob, tz),
        time_of_birth: normalize::format_time(&raw.time_of_birth.to_text()),
        place_of_birth: raw.place_of_birth.to_text(),
        birth_star: raw.birth_star.to_text(),
        padam: raw.padam.to_text(),
        age: normalize::age_from_birth_date_in(&dob, today, tz),
        resident_status: raw.resident_status.to_text(),
        profile_created_by: raw.profile_created_by.to_text(),
        marital_status: raw.marital_status.to_text(),
        subsect: raw.subsect.to_text(),
        gothra: raw.gothra.to_text(),
        father_name: raw.father_name.to_text(),
        father_occupation: raw.father_occupation.to_text(),
        mother_name: raw.mother_name.to_text(),
        mother_occupation: raw.mother_occupation.to_text(),
        education: raw.education.to_text(),
        college: raw.college.to_text(),
        passout_year: raw.passout_year.to_text(),
        occupation: raw.occupation.to_text(),
        company: raw.company.to_text(),
        job_location: raw.job_location.to_text(),
        salary: raw.salary.to_text(),
        complexion: raw.complexion.to_text(),
        height: raw.height.to_text(),
        native_place: raw.native_place.to_text(),
        primary_contact: normalize::format_contact(&raw.primary_contact.to_text()),
        secondary_contact: normalize::format_contact(&raw.secondary_contact.to_text()),
        max_age_gap: raw.max_age_gap.to_text(),
        subsect_preference: raw.subsect_preference.to_text(),
        min_height_pref: raw.min_height_pref.to_text(),
        max_height_pref: raw.max_height_pref.to_text(),
        location_preference: raw.location_preference.to_text(),
        education_preference: raw.education_preference.to_text(),
        other_info: raw.other_info.to_text(),
        favorite: false,
        name,
        surname,
    }
}
