pub mod cgi;
pub mod list;
pub mod report;
pub mod serve;
