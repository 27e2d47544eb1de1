use chrono::{FixedOffset, NaiveDate};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::browser::Browser;
use crate::favorites::{self, FileKeyValueStore, KeyValueStore, FAVORITES_STORAGE_KEY};
use crate::filter::{Category, FilterPredicates};
use crate::output;
use crate::pagination::PageError;
use crate::store::{DatasetSource, ProfileStore, StoreError};

fn ist() -> FixedOffset {
    FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 16).unwrap()
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// 47 records, two of them already married off.
fn dataset() -> Value {
    let records: Vec<Value> = (0..47)
        .map(|i| {
            json!({
                "Name": format!("person{i}"),
                "Surname": "sharma",
                "Gender": if i % 2 == 0 { "Male" } else { "FEMALE" },
                "Resident Status": if i % 3 == 0 { "NRI" } else { "Indian Citizen" },
                "Current Job - Location": if i == 11 { "Hyderabad" } else { "Pune" },
                "Annual Salary in INR": 600000 + i,
                "Is your marriage fixed ?": if i == 5 || i == 6 { "Yes" } else { "No" },
            })
        })
        .collect();
    Value::Array(records)
}

async fn serve_once(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = vec![0u8; 8192];
        let _ = socket.read(&mut request).await;
        let response = format!(
            "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
    });
    format!("http://{addr}/matrimony.json")
}

#[tokio::test]
async fn fetched_dataset_pages_through_active_profiles() {
    let url = serve_once("200 OK", dataset().to_string()).await;
    let mut store = ProfileStore::default();
    let count = store
        .load_all(&client(), &DatasetSource::Url(url))
        .await
        .unwrap();
    assert_eq!(count, 45);
    assert!(store.profiles().iter().all(|p| p.name != "person5"));

    let mut browser = Browser::new(store);
    assert_eq!(browser.total_pages(), 3);
    browser.go_to_page(3).unwrap();
    let page = browser.page();
    assert_eq!(page.entries.len(), 5);
    assert_eq!((page.window.range_start, page.window.range_end), (41, 45));
    assert_eq!(
        browser.go_to_page(4),
        Err(PageError::OutOfRange {
            page: 4,
            total_pages: 3
        })
    );
    assert_eq!(browser.current_page(), 3);
}

#[tokio::test]
async fn server_error_leaves_store_empty() {
    let url = serve_once("500 Internal Server Error", "oops".to_string()).await;
    let mut store = ProfileStore::default();
    store
        .load_from_json(&dataset().to_string(), today(), &ist())
        .unwrap();
    let err = store
        .load_all(&client(), &DatasetSource::Url(url))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 500, .. }));
    assert!(store.is_empty());
}

#[tokio::test]
async fn non_json_body_is_a_parse_failure() {
    let url = serve_once("200 OK", "<html>maintenance</html>".to_string()).await;
    let mut store = ProfileStore::default();
    let err = store
        .load_all(&client(), &DatasetSource::Url(url))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }));
    assert!(store.is_empty());
}

#[tokio::test]
async fn dataset_file_loads_through_the_same_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("profiles.json");
    std::fs::write(&path, dataset().to_string()).unwrap();

    let mut store = ProfileStore::default();
    let count = store
        .load_all(&client(), &DatasetSource::File(path))
        .await
        .unwrap();
    assert_eq!(count, 45);

    let missing = DatasetSource::File(dir.path().join("missing.json"));
    let err = store.load_all(&client(), &missing).await.unwrap_err();
    assert!(matches!(err, StoreError::Read { .. }));
    assert!(store.is_empty());
}

#[test]
fn favorites_survive_a_reload_and_toggle_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    let body = dataset().to_string();

    let mut first = ProfileStore::new(Box::new(FileKeyValueStore::new(&path)));
    first.load_from_json(&body, today(), &ist()).unwrap();
    assert_eq!(first.toggle_favorite(3), Some(true));
    assert_eq!(first.toggle_favorite(40), Some(true));

    let mut second = ProfileStore::new(Box::new(FileKeyValueStore::new(&path)));
    second.load_from_json(&body, today(), &ist()).unwrap();
    assert_eq!(second.favorite_positions(), vec![3, 40]);

    assert_eq!(second.toggle_favorite(3), Some(false));
    assert_eq!(second.toggle_favorite(40), Some(false));
    let reread = FileKeyValueStore::new(&path);
    assert_eq!(reread.get(FAVORITES_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    assert!(favorites::load_favorites(&reread).is_empty());
}

#[test]
fn corrupt_favorites_file_does_not_block_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("favorites.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut store = ProfileStore::new(Box::new(FileKeyValueStore::new(&path)));
    assert_eq!(
        store
            .load_from_json(&dataset().to_string(), today(), &ist())
            .unwrap(),
        45
    );
    assert!(store.favorite_positions().is_empty());
    assert_eq!(store.toggle_favorite(0), Some(true));
}

#[test]
fn combined_filters_narrow_the_view() {
    let mut store = ProfileStore::default();
    store
        .load_from_json(&dataset().to_string(), today(), &ist())
        .unwrap();
    let mut browser = Browser::new(store);

    browser.apply_predicates(FilterPredicates {
        gender: Some("female".to_string()),
        resident_status: Some("NRI".to_string()),
        ..FilterPredicates::default()
    });
    let names: Vec<_> = browser
        .view()
        .iter()
        .map(|&i| browser.profile(i).unwrap().name.clone())
        .collect();
    assert!(names.iter().all(|n| {
        let i: usize = n.trim_start_matches("person").parse().unwrap();
        i % 2 == 1 && i % 3 == 0
    }));
    assert_eq!(names.first().map(String::as_str), Some("person3"));

    browser.set_search("HYDERABAD");
    assert!(browser.view().is_empty());
    browser.set_category(Category::ResidentStatus, None);
    assert_eq!(browser.view().len(), 1);
    assert_eq!(browser.profile(browser.view()[0]).unwrap().name, "person11");

    browser.reset_filters();
    assert_eq!(browser.view().len(), 45);
}

#[test]
fn spreadsheet_timestamps_render_as_source_local_values() {
    let body = json!([{
        "Name": "SRAVYA",
        "Date Of Birth": "2000-06-15T18:30:00.000Z",
        "Time Of Birth": "1899-12-30T04:41:50.000Z",
        "Primary Contact Number": 9876543210u64,
    }])
    .to_string();
    let mut store = ProfileStore::default();
    store.load_from_json(&body, today(), &ist()).unwrap();
    let p = store.get(0).unwrap();
    assert_eq!(p.date_of_birth, "06/16/2000");
    assert_eq!(p.time_of_birth, "10:11:50 AM");
    assert_eq!(p.age, 24);
    assert_eq!(p.primary_contact, "+91 9876543210");
}

#[test]
fn empty_view_renders_the_empty_state() {
    colored::control::set_override(false);
    let mut store = ProfileStore::default();
    store
        .load_from_json(&dataset().to_string(), today(), &ist())
        .unwrap();
    let mut browser = Browser::new(store);
    browser.toggle_favorites_only();

    let page = browser.page();
    assert_eq!(page.window.total_pages, 1);
    let text = output::render_page_text(&page);
    assert!(text.contains(output::EMPTY_STATE));
}
