//! HTML rendering of a view.
//!
//! Every page is one self-contained document. Navigation is done with plain
//! links that re-enter the viewer with new query parameters, so the page
//! carries no state of its own.

use crate::request::{DEFAULT_LIMIT, DatabaseEntry, MAX_LIMIT, MIN_LIMIT, View, ViewRequest};
use crate::storage::{CallerRow, ProfileRow, SchemaVariant};
use crate::viewer::ViewData;
use url::form_urlencoded;

const PAGE_TITLE: &str = "Gprof Database Viewer";

const STYLE: &str = r#"
body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 20px; background: #f5f5f5; }
h1 { color: #333; border-bottom: 2px solid #4caf50; padding-bottom: 10px; }
h2 { color: #555; margin-top: 30px; }
.panel { background: white; padding: 12px 15px; border-radius: 5px; margin-bottom: 20px; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
.panel label { margin-right: 10px; font-weight: bold; }
.panel input, .panel select { padding: 5px; margin-right: 15px; }
.panel button { padding: 6px 15px; background: #4caf50; color: white; border: none; border-radius: 3px; cursor: pointer; }
.stats span { margin-right: 20px; font-weight: bold; }
.breadcrumb a, .index-link { color: #1976d2; text-decoration: none; }
.index-link { font-weight: bold; }
.index-link:hover, .breadcrumb a:hover { text-decoration: underline; }
table { border-collapse: collapse; width: 100%; background: white; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
th { background: #4caf50; color: white; padding: 12px; text-align: left; position: sticky; top: 0; }
td { padding: 8px 10px; border-bottom: 1px solid #ddd; }
.num { text-align: right; font-variant-numeric: tabular-nums; }
.parent-row { background: #e8f5e9; font-weight: bold; }
.child-row { background: #fff3e0; }
.caller-row { background: #e3f2fd; font-style: italic; }
.tag { font-size: 0.8em; color: #777; margin-left: 6px; }
.no-data, .error { padding: 20px; text-align: center; background: white; border-radius: 5px; }
.error { color: #b71c1c; border: 1px solid #ef9a9a; }
"#;

/// What the body of the page shows
pub enum Content<'a> {
    View(&'a ViewData),
    Error(&'a str),
}

pub struct PageContext<'a> {
    pub request: &'a ViewRequest,
    /// Databases offered in the selector; empty hides it
    pub databases: &'a [DatabaseEntry],
    pub content: Content<'a>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Parent,
    Child,
    Caller,
}

impl RowKind {
    fn class(self) -> &'static str {
        match self {
            RowKind::Parent => "parent-row",
            RowKind::Child => "child-row",
            RowKind::Caller => "caller-row",
        }
    }
}

pub fn render_page(ctx: &PageContext<'_>) -> String {
    let request = ctx.request;
    let mut html = String::with_capacity(16 * 1024);

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{PAGE_TITLE}</title>\n<style>{STYLE}</style>\n"));
    html.push_str(&format!("</head>\n<body>\n<h1>{PAGE_TITLE}</h1>\n"));

    html.push_str(&database_form(request, ctx.databases));
    if let Some(index) = request.view.selected_index() {
        html.push_str(&breadcrumb(request, index));
    }
    html.push_str(&controls_form(request));

    match ctx.content {
        Content::View(data) => {
            html.push_str(&stats(data.total_rows, data.showing(), Some(data)));
            html.push_str(&format!("<h2>{}</h2>\n", escape(&title(request))));
            html.push_str(&results(request, data));
        }
        Content::Error(message) => {
            html.push_str(&stats(0, 0, None));
            html.push_str(&format!("<div class=\"error\">{}</div>\n", escape(message)));
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Heading describing the active view and filter
pub fn title(request: &ViewRequest) -> String {
    let base = match request.view {
        View::Children { index } => format!("Index [{index}] and its children"),
        View::Parents => "Parent Rows Only".to_string(),
        View::TopCpu => format!("Top {} by CPU Time", request.limit),
        View::All => "All Rows".to_string(),
    };
    match request.search() {
        Some(search) => format!("{base} (filtered by '{search}')"),
        None => base,
    }
}

/// Query string selecting `index`'s children, keeping the database and limit
pub fn children_href(request: &ViewRequest, index: i64) -> String {
    let mut query = form_urlencoded::Serializer::for_suffix(String::from("?"), 1);
    query.append_pair("index", &index.to_string());
    query.append_pair("view", "children");
    if let Some(db) = &request.db {
        query.append_pair("db", db);
    }
    if request.limit != DEFAULT_LIMIT {
        query.append_pair("limit", &request.limit.to_string());
    }
    query.finish()
}

fn home_href(request: &ViewRequest) -> String {
    let mut query = form_urlencoded::Serializer::for_suffix(String::from("?"), 1);
    if let Some(db) = &request.db {
        query.append_pair("db", db);
    }
    query.finish()
}

fn index_link(request: &ViewRequest, index: i64) -> String {
    format!(
        "<a class=\"index-link\" href=\"{}\">[{index}]</a>",
        escape(&children_href(request, index))
    )
}

/// Split a trailing `[N]` reference off a gprof name. The prefix keeps any
/// whitespace that preceded the bracket.
pub fn split_index_suffix(name: &str) -> Option<(&str, i64)> {
    let body = name.trim_end().strip_suffix(']')?;
    let open = body.rfind('[')?;
    let digits = &body[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = digits.parse().ok()?;
    Some((&body[..open], index))
}

/// Escaped name with its `[N]` suffix turned into a link
pub fn name_html(request: &ViewRequest, name: &str) -> String {
    match split_index_suffix(name) {
        Some((prefix, index)) => format!("{}{}", escape(prefix), index_link(request, index)),
        None => escape(name),
    }
}

fn database_form(request: &ViewRequest, databases: &[DatabaseEntry]) -> String {
    if databases.is_empty() {
        return String::new();
    }

    let selected = request.db.as_deref().unwrap_or("");
    let mut html = String::from(
        "<div class=\"panel\">\n<form method=\"get\">\n<label>Database:</label>\n\
         <select name=\"db\" onchange=\"this.form.submit()\">\n",
    );
    if request.db.is_none() {
        html.push_str("<option value=\"\" selected>Choose a database...</option>\n");
    }
    for db in databases {
        let is_selected = db.name == selected || db.path.to_str() == Some(selected);
        html.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            escape(&db.name),
            if is_selected { " selected" } else { "" },
            escape(&db.name)
        ));
    }
    html.push_str(&format!(
        "</select>\n<input type=\"hidden\" name=\"limit\" value=\"{}\">\n\
         <button type=\"submit\">Open</button>\n</form>\n</div>\n",
        request.limit
    ));
    html
}

fn breadcrumb(request: &ViewRequest, index: i64) -> String {
    format!(
        "<div class=\"panel breadcrumb\"><a href=\"{}\">Home</a> / Index {}</div>\n",
        escape(&home_href(request)),
        index_link(request, index)
    )
}

fn controls_form(request: &ViewRequest) -> String {
    let option = |value: &str, label: &str| {
        let selected = if request.view.name() == value { " selected" } else { "" };
        format!("<option value=\"{value}\"{selected}>{label}</option>\n")
    };

    let mut html = String::from(
        "<div class=\"panel controls\">\n<form method=\"get\">\n<label>View:</label>\n\
         <select name=\"view\" onchange=\"this.form.submit()\">\n",
    );
    html.push_str(&option("all", "All Rows"));
    html.push_str(&option("parents", "Parents Only"));
    html.push_str(&option("top_cpu", "Top CPU Time"));
    html.push_str("</select>\n");

    html.push_str(&format!(
        "<label>Limit:</label>\n<input type=\"number\" name=\"limit\" value=\"{}\" \
         min=\"{MIN_LIMIT}\" max=\"{MAX_LIMIT}\" style=\"width: 80px;\">\n",
        request.limit
    ));
    html.push_str(&format!(
        "<label>Search Name:</label>\n<input type=\"text\" name=\"search\" value=\"{}\" \
         placeholder=\"Function name...\">\n",
        escape(request.search().unwrap_or(""))
    ));
    html.push_str(&format!(
        "<input type=\"hidden\" name=\"index\" value=\"{}\">\n",
        request
            .view
            .selected_index()
            .map(|i| i.to_string())
            .unwrap_or_default()
    ));
    if let Some(db) = &request.db {
        html.push_str(&format!(
            "<input type=\"hidden\" name=\"db\" value=\"{}\">\n",
            escape(db)
        ));
    }
    html.push_str("<button type=\"submit\">Apply</button>\n</form>\n</div>\n");
    html
}

fn stats(total: i64, showing: usize, data: Option<&ViewData>) -> String {
    let mut html = format!(
        "<div class=\"panel stats\">\n<span>Total Rows: {total}</span>\n<span>Showing: {showing}</span>\n"
    );
    if let Some(data) = data {
        html.push_str(&format!(
            "<span>Schema: {}</span>\n<span>Database: {}</span>\n",
            data.variant.label(),
            escape(&data.path.display().to_string())
        ));
    }
    html.push_str("</div>\n");
    html
}

fn results(request: &ViewRequest, data: &ViewData) -> String {
    if data.rows.is_empty() && data.caller.is_none() {
        return "<div class=\"no-data\">No data found.</div>\n".to_string();
    }

    let mut html = String::from(
        "<table>\n<thead>\n<tr><th>Index</th><th class=\"num\">% CPU Time</th>\
         <th class=\"num\">CPU Self</th><th class=\"num\">CPU Children</th>\
         <th class=\"num\">CPU Total</th><th>Name</th><th>Parent</th></tr>\n</thead>\n<tbody>\n",
    );

    if let Some(caller) = &data.caller {
        html.push_str(&caller_row(request, caller));
    }
    for row in &data.rows {
        let kind = if data.variant.is_parent(row) {
            RowKind::Parent
        } else {
            RowKind::Child
        };
        html.push_str(&table_row(request, data.variant, row, kind));
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

fn caller_row(request: &ViewRequest, caller: &CallerRow) -> String {
    let name = match &caller.caller_name {
        Some(name) => name_html(request, name),
        None => String::new(),
    };
    format!(
        "<tr class=\"{}\">\n<td>{}<span class=\"tag\">caller</span></td>\n{}<td>{}</td>\n<td></td>\n</tr>\n",
        RowKind::Caller.class(),
        index_link(request, caller.caller_index),
        number_cells(&caller.row),
        name
    )
}

fn table_row(request: &ViewRequest, variant: SchemaVariant, row: &ProfileRow, kind: RowKind) -> String {
    let clickable = kind == RowKind::Parent || request.view.selected_index().is_some();
    let index = match row.display_index(variant) {
        Some(index) if clickable => index_link(request, index),
        Some(index) => format!("[{index}]"),
        None => String::new(),
    };
    let name = row
        .name
        .as_deref()
        .map(|name| name_html(request, name))
        .unwrap_or_default();
    let parent = row
        .parent_ref(variant)
        .map(|parent| index_link(request, parent))
        .unwrap_or_default();

    format!(
        "<tr class=\"{}\">\n<td>{index}</td>\n{}<td>{name}</td>\n<td>{parent}</td>\n</tr>\n",
        kind.class(),
        number_cells(row)
    )
}

fn number_cells(row: &ProfileRow) -> String {
    format!(
        "<td class=\"num\">{}</td>\n<td class=\"num\">{}</td>\n<td class=\"num\">{}</td>\n<td class=\"num\">{}</td>\n",
        format_number(row.cpu_time_total, 2),
        format_number(row.cpu_time_self, 6),
        format_number(row.cpu_time_children, 6),
        format_number(row.cpu_sum(), 6)
    )
}

fn format_number(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{v:.precision$}"))
        .unwrap_or_default()
}

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
