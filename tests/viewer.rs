mod common;

use axum::http::StatusCode;
use gprofview::config::ViewerConfig;
use gprofview::request::{View, ViewRequest};
use gprofview::storage::SchemaVariant;
use gprofview::viewer::{handle, load_view};

fn request(query: &str) -> ViewRequest {
    ViewRequest::from_query(query)
}

#[test]
fn missing_database_renders_error_page() {
    let (_guard, dir) = common::install_dir();
    let config = ViewerConfig::new(&dir);
    let missing = dir.join("nope.sqlite");

    let page = handle(&config, &request(&format!("db={}", missing.display())));

    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page
        .html
        .contains(&format!("Database file not found: {}", missing.display())));
    assert!(page.html.contains("Total Rows: 0"));
    assert!(page.html.contains("Showing: 0"));
}

#[test]
fn directory_selector_is_not_a_file() {
    let (_guard, dir) = common::install_dir();
    std::fs::create_dir(dir.join("nested.sqlite")).unwrap();
    let config = ViewerConfig::new(&dir);

    let page = handle(&config, &request("db=nested.sqlite"));
    assert_eq!(page.status, StatusCode::NOT_FOUND);
    assert!(page.html.contains("Database path is not a file"));
}

#[test]
fn parents_view_only_returns_parent_rows() {
    let (_guard, dir) = common::install_dir();

    for (file, variant) in [
        ("parent.sqlite", SchemaVariant::WithParentIndex),
        ("pairs.db", SchemaVariant::IndexPairs),
    ] {
        let req = ViewRequest {
            view: View::Parents,
            ..ViewRequest::default()
        };
        let data = load_view(&dir.join(file), &req).unwrap();

        assert_eq!(data.variant, variant);
        assert_eq!(data.total_rows, 3, "{file}");
        assert!(data.rows.iter().all(|row| variant.is_parent(row)), "{file}");
        // ordered by total CPU share, largest first
        let totals: Vec<_> = data.rows.iter().map(|r| r.cpu_time_total).collect();
        assert_eq!(totals, vec![Some(100.0), Some(70.0), Some(40.0)]);
    }
}

#[test]
fn children_view_puts_selected_entry_first() {
    let (_guard, dir) = common::install_dir();

    for file in ["parent.sqlite", "pairs.db"] {
        let data = load_view(&dir.join(file), &request("view=children&index=2")).unwrap();
        assert_eq!(data.total_rows, 2, "{file}");
        assert_eq!(data.rows[0].cpu_time_total, Some(70.0), "{file}");
        assert_eq!(data.rows[1].name.as_deref(), Some("alloc_buffer [17]"));
    }
}

#[test]
fn caller_comes_from_most_expensive_edge() {
    let (_guard, dir) = common::install_dir();

    for file in ["parent.sqlite", "pairs.db"] {
        let data = load_view(&dir.join(file), &request("index=17")).unwrap();
        let caller = data.caller.as_ref().expect("caller row");
        assert_eq!(caller.caller_index, 2, "{file}");
        assert_eq!(caller.caller_name.as_deref(), Some("parse_args [2]"));
        assert_eq!(data.showing(), data.rows.len() + 1);
    }
}

#[test]
fn root_entry_has_no_caller_row() {
    let (_guard, dir) = common::install_dir();
    let config = ViewerConfig::new(&dir);

    let page = handle(&config, &request("db=parent.sqlite&index=1&view=children"));
    assert_eq!(page.status, StatusCode::OK);
    assert!(!page.html.contains("class=\"caller-row\""));
}

#[test]
fn index_suffix_becomes_children_link() {
    let (_guard, dir) = common::install_dir();
    let config = ViewerConfig::new(&dir);

    let page = handle(&config, &request("view=all&db=parent.sqlite"));
    assert!(page.html.contains(
        "alloc_buffer <a class=\"index-link\" href=\"?index=17&amp;view=children&amp;db=parent.sqlite\">[17]</a>"
    ));
}

#[test]
fn search_is_literal_substring() {
    let (_guard, dir) = common::install_dir();

    let data = load_view(&dir.join("pairs.db"), &request("view=all&search=alloc_")).unwrap();
    assert_eq!(data.total_rows, 3);

    let data = load_view(&dir.join("pairs.db"), &request("view=all&search=%25")).unwrap();
    assert_eq!(data.total_rows, 0);
    assert!(data.rows.is_empty());
}

#[test]
fn default_database_is_used_without_selector() {
    let (_guard, dir) = common::install_dir();
    let config = ViewerConfig::new(&dir).with_default_db(Some(dir.join("pairs.db")));

    // no view means parents only
    let page = handle(&config, &ViewRequest::default());
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.html.contains("Total Rows: 3"));

    let page = handle(&config, &request("view=all"));
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.html.contains("Total Rows: 6"));
}
