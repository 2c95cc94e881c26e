use std::io::Write;

use super::*;

fn store(id: &str, area_code: Option<&str>) -> StoreTarget {
    StoreTarget {
        id: id.to_string(),
        name: format!("Shop {id}"),
        area: "Nagoya".to_string(),
        url: format!("https://example.com/{id}"),
        selector: Selector {
            kind: SelectorKind::Class,
            value: "waiting-view__number".to_string(),
        },
        weather_area_code: area_code.map(str::to_string),
        kind: "barber".to_string(),
    }
}

fn write_yaml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write yaml");
    file
}

#[test]
fn load_stores_parses_yaml() {
    let file = write_yaml(
        r#"
stores:
  - id: store_001
    name: Barber Kaze
    area: Nagoya
    url: https://example.com/shop/1
    selector:
      kind: xpath
      value: //*[@id="app"]/div/span
    weather_area_code: "230000"
    type: barber
  - id: cafe_001
    name: Corner Cafe
    area: Toyota
    url: https://example.com/cafe
    selector:
      kind: css
      value: span.queue
    type: cafe
"#,
    );

    let loaded = load_stores(file.path()).expect("valid stores file");
    assert_eq!(loaded.stores.len(), 2);
    let first = &loaded.stores[0];
    assert_eq!(first.selector.kind, SelectorKind::Xpath);
    assert_eq!(first.weather_area_code.as_deref(), Some("230000"));
    assert!(first.is_barber());
    assert!(!loaded.stores[1].is_barber());
}

#[test]
fn store_type_defaults_to_barber() {
    let file = write_yaml(
        r"
stores:
  - id: store_001
    name: Barber Kaze
    area: Nagoya
    url: https://example.com/shop/1
    selector:
      kind: class
      value: waiting-view__number
",
    );
    let loaded = load_stores(file.path()).unwrap();
    assert!(loaded.stores[0].is_barber());
    assert!(loaded.stores[0].weather_area_code.is_none());
}

#[test]
fn load_stores_missing_file_is_io_error() {
    let err = load_stores(Path::new("/nonexistent/stores.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileIo { .. }), "got: {err:?}");
}

#[test]
fn load_stores_rejects_unknown_selector_kind() {
    let file = write_yaml(
        r"
stores:
  - id: store_001
    name: Barber Kaze
    area: Nagoya
    url: https://example.com/shop/1
    selector:
      kind: regex
      value: \d+
",
    );
    let err = load_stores(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err:?}");
}

#[test]
fn validate_rejects_duplicate_ids() {
    let file = StoresFile {
        stores: vec![store("a", None), store("a", None)],
    };
    let err = validate_stores(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
}

#[test]
fn validate_rejects_non_http_url() {
    let mut bad = store("a", None);
    bad.url = "ftp://example.com".to_string();
    let err = validate_stores(&StoresFile { stores: vec![bad] }).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("invalid url")));
}

#[test]
fn validate_rejects_empty_selector() {
    let mut bad = store("a", None);
    bad.selector.value = "  ".to_string();
    let err = validate_stores(&StoresFile { stores: vec![bad] }).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("empty selector")));
}

#[test]
fn validate_rejects_non_numeric_area_code() {
    let err = validate_stores(&StoresFile {
        stores: vec![store("a", Some("tokyo"))],
    })
    .unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("weather_area_code")));
}

#[test]
fn unique_area_codes_dedups_and_sorts() {
    let stores = vec![
        store("a", Some("230000")),
        store("b", None),
        store("c", Some("130000")),
        store("d", Some("230000")),
    ];
    assert_eq!(unique_area_codes(&stores), vec!["130000", "230000"]);
}
