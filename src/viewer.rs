use crate::config::ViewerConfig;
use crate::error::{Error, Result};
use crate::render::{self, Content, PageContext};
use crate::request::{DatabaseEntry, ViewRequest, discover_databases, resolve_database};
use crate::storage::{
    CallerRow, ProfileRow, SchemaVariant, count_rows, fetch_caller, fetch_rows,
    lookup_parent_name, open_read_only, plan_view,
};
use axum::http::StatusCode;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything the renderer needs for a successful request
#[derive(Debug, Clone)]
pub struct ViewData {
    pub path: PathBuf,
    pub variant: SchemaVariant,
    /// Rows matching the filter, before the limit
    pub total_rows: i64,
    pub rows: Vec<ProfileRow>,
    pub caller: Option<CallerRow>,
}

impl ViewData {
    /// Rows on the page, the caller row included
    pub fn showing(&self) -> usize {
        self.rows.len() + usize::from(self.caller.is_some())
    }
}

/// A rendered response
#[derive(Debug, Clone)]
pub struct Page {
    pub status: StatusCode,
    pub html: String,
}

/// Serve one request. Failures become an error page, never an `Err`.
pub fn handle(config: &ViewerConfig, request: &ViewRequest) -> Page {
    debug!(
        view = request.view.name(),
        limit = request.limit,
        search = request.search(),
        db = request.db.as_deref(),
        "handling view request"
    );

    let databases = discover_databases(config, &config.install_dir);
    let outcome = resolve_database(config, request).and_then(|path| load_view(&path, request));

    match outcome {
        Ok(data) => {
            debug!(total = data.total_rows, showing = data.showing(), "view loaded");
            let html = render::render_page(&PageContext {
                request,
                databases: &databases,
                content: Content::View(&data),
            });
            Page {
                status: StatusCode::OK,
                html,
            }
        }
        Err(e) => {
            match &e {
                Error::MissingParameter => debug!("no database selected"),
                other => warn!(error = %other, "view request failed"),
            }
            error_page(request, &databases, &e)
        }
    }
}

fn error_page(request: &ViewRequest, databases: &[DatabaseEntry], err: &Error) -> Page {
    let message = err.to_string();
    let html = render::render_page(&PageContext {
        request,
        databases,
        content: Content::Error(&message),
    });
    Page {
        status: status_for(err),
        html,
    }
}

/// HTTP status reported alongside an error page
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::MissingParameter => StatusCode::OK,
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        Error::ConnectionFailure { .. }
        | Error::MissingTable(_)
        | Error::QueryFailure(_)
        | Error::Encode(_)
        | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Run the planned query for `request` against the database at `path`
pub fn load_view(path: &Path, request: &ViewRequest) -> Result<ViewData> {
    let (variant, total_rows, rows, caller) = {
        let conn = open_read_only(path)?;
        let variant = SchemaVariant::detect(&conn)?;
        let plan = plan_view(request.view, request.search(), variant);
        let total_rows = count_rows(&conn, &plan)?;
        let rows = fetch_rows(&conn, &plan, variant, request.limit)?;
        let caller = match request.view.selected_index() {
            Some(index) => fetch_caller(&conn, variant, index)?,
            None => None,
        };
        (variant, total_rows, rows, caller)
    };

    let caller = caller.and_then(|caller| name_caller(path, variant, caller));

    Ok(ViewData {
        path: path.to_path_buf(),
        variant,
        total_rows,
        rows,
        caller,
    })
}

/// Look the caller's name up on its own connection. A failed lookup drops
/// the caller rather than the page.
fn name_caller(path: &Path, variant: SchemaVariant, mut caller: CallerRow) -> Option<CallerRow> {
    let lookup = open_read_only(path)
        .and_then(|conn| lookup_parent_name(&conn, variant, caller.caller_index));

    match lookup {
        Ok(name) => {
            caller.caller_name = name;
            Some(caller)
        }
        Err(e) => {
            debug!(caller = caller.caller_index, error = %e, "caller name lookup failed");
            None
        }
    }
}
