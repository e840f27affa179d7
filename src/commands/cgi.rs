use crate::config::ViewerConfig;
use crate::error::Result;
use crate::request::ViewRequest;
use crate::viewer::{self, Page};
use std::io::Write;

/// Set by the web server for every CGI invocation
pub const GATEWAY_ENV: &str = "GATEWAY_INTERFACE";
const QUERY_ENV: &str = "QUERY_STRING";

/// True when the process was started by a web server as a CGI script
pub fn is_cgi_request() -> bool {
    std::env::var_os(GATEWAY_ENV).is_some()
}

/// Answer the single request described by the CGI environment
pub fn run(config: &ViewerConfig) -> Result<()> {
    let query = std::env::var(QUERY_ENV).unwrap_or_default();
    let request = ViewRequest::from_query(&query);
    let page = viewer::handle(config, &request);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_response(&mut out, &page)?;
    out.flush()?;
    Ok(())
}

pub fn write_response<W: Write>(out: &mut W, page: &Page) -> std::io::Result<()> {
    write!(
        out,
        "Status: {} {}\r\nContent-Type: text/html; charset=utf-8\r\n\r\n",
        page.status.as_u16(),
        page.status.canonical_reason().unwrap_or("Unknown"),
    )?;
    out.write_all(page.html.as_bytes())
}
