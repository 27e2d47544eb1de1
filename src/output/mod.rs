pub mod detail;

use colored::Colorize;
use serde::Serialize;

use crate::browser::BrowserPage;
use crate::filter::FilterPredicates;
use crate::normalize::{format_salary, title_case};
use crate::pagination::{PageControl, PageWindow};

pub use detail::{build_detail, render_detail_text, ProfileDetail};

pub const EMPTY_STATE: &str = "No profiles match your criteria";
pub const LOAD_ERROR: &str = "Error loading profiles. Please try again later.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// What a profile card shows, formatted for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileCard {
    /// 1-based load position, used by `star`/`show`.
    pub number: usize,
    pub full_name: String,
    pub gender: String,
    pub age: u32,
    pub date_of_birth: String,
    pub place_of_birth: String,
    pub time_of_birth: String,
    pub birth_star: String,
    pub height: String,
    pub education: String,
    pub occupation: String,
    pub salary: String,
    pub favorite: bool,
}

pub fn build_cards(page: &BrowserPage<'_>) -> Vec<ProfileCard> {
    page.entries
        .iter()
        .map(|e| {
            let p = e.profile;
            ProfileCard {
                number: e.position + 1,
                full_name: title_case(&p.full_name),
                gender: title_case(&p.gender),
                age: p.age,
                date_of_birth: p.date_of_birth.clone(),
                place_of_birth: title_case(&p.place_of_birth),
                time_of_birth: p.time_of_birth.clone(),
                birth_star: title_case(&p.birth_star),
                height: p.height.clone(),
                education: title_case(&p.education),
                occupation: title_case(&p.occupation),
                salary: format_salary(&p.salary),
                favorite: p.favorite,
            }
        })
        .collect()
}

pub fn showing_line(window: &PageWindow) -> String {
    format!(
        "(Showing {}-{})  |  Page {} of {}",
        window.range_start, window.range_end, window.page, window.total_pages
    )
}

pub fn controls_line(controls: &[PageControl]) -> String {
    let parts: Vec<String> = controls
        .iter()
        .map(|c| match *c {
            PageControl::Previous { enabled, .. } => {
                if enabled {
                    "‹".to_string()
                } else {
                    "‹".dimmed().to_string()
                }
            }
            PageControl::Next { enabled, .. } => {
                if enabled {
                    "›".to_string()
                } else {
                    "›".dimmed().to_string()
                }
            }
            PageControl::Number { page, current: true } => format!("[{page}]").bold().to_string(),
            PageControl::Number { page, current: false } => page.to_string(),
            PageControl::Ellipsis => "...".to_string(),
        })
        .collect();
    parts.join(" ")
}

fn info(label: &str, value: &str) -> String {
    let value = if value.is_empty() { "-" } else { value };
    format!("{}: {}", label.dimmed(), value)
}

pub fn render_card_text(card: &ProfileCard) -> String {
    let star = if card.favorite {
        "★".yellow().to_string()
    } else {
        "☆".dimmed().to_string()
    };
    let mut out = format!(
        "{} #{:<4} {}  ({}, {})\n",
        star,
        card.number,
        card.full_name.bold(),
        card.gender,
        card.age
    );
    out.push_str(&format!(
        "        {} | {} | {} | {}\n",
        info("DOB", &card.date_of_birth),
        info("Place of Birth", &card.place_of_birth),
        info("Time of Birth", &card.time_of_birth),
        info("Star", &card.birth_star)
    ));
    out.push_str(&format!(
        "        {} | {} | {} | {}\n",
        info("Height", &card.height),
        info("Education", &card.education),
        info("Job", &card.occupation),
        info("Salary", &card.salary)
    ));
    out
}

pub fn render_page_text(page: &BrowserPage<'_>) -> String {
    if page.window.is_empty() {
        return format!("{}\n{}\n", "Profiles: 0".bold(), EMPTY_STATE.yellow());
    }
    let mut out = String::new();
    out.push_str(&format!(
        "{}  {}\n\n",
        format!("Profiles: {}", page.window.total_items).bold(),
        showing_line(&page.window)
    ));
    for card in build_cards(page) {
        out.push_str(&render_card_text(&card));
        out.push('\n');
    }
    if !page.controls.is_empty() {
        out.push_str(&controls_line(&page.controls));
        out.push('\n');
    }
    out
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageReport<'a> {
    pub filters: &'a FilterPredicates,
    #[serde(flatten)]
    pub window: PageWindow,
    pub controls: &'a [PageControl],
    pub profiles: Vec<ProfileCard>,
}

pub fn render_page_json(page: &BrowserPage<'_>, filters: &FilterPredicates) -> Vec<u8> {
    let report = PageReport {
        filters,
        window: page.window,
        controls: &page.controls,
        profiles: build_cards(page),
    };
    serde_json::to_vec_pretty(&report).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_detail_json(detail: &ProfileDetail) -> Vec<u8> {
    serde_json::to_vec_pretty(detail).unwrap_or_else(|_| b"{}\n".to_vec())
}
