/*!
 * Network transports for file downloads
 */

pub mod http;

pub use http::{build_client, parse_http_date, HttpFetcher};
