//! Fixed response headers
//!
//! Every response gets the same cross-origin and no-cache triple, appended
//! after the standard headers are built. Handler responses get it through
//! [`apply_cors_headers`]; heads hyper writes by itself get the raw lines from
//! [`fixed_header_lines`].

use hyper::header::{self, HeaderMap, HeaderValue};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET";
pub const CACHE_CONTROL: &str = "no-store, no-cache, must-revalidate";

/// Apply the CORS allow-all and no-cache headers
///
/// Existing values for the same names are replaced, so each header appears once.
pub fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL));
}

/// The fixed headers as raw HTTP/1 header lines, each ending in CRLF
pub fn fixed_header_lines() -> String {
    format!(
        "{}: {ALLOW_ORIGIN}\r\n{}: {ALLOW_METHODS}\r\n{}: {CACHE_CONTROL}\r\n",
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        header::ACCESS_CONTROL_ALLOW_METHODS,
        header::CACHE_CONTROL,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_on_empty_map() {
        let mut headers = HeaderMap::new();
        apply_cors_headers(&mut headers);
        assert_eq!(headers.len(), 3);
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(headers["access-control-allow-methods"], "GET");
        assert_eq!(
            headers["cache-control"],
            "no-store, no-cache, must-revalidate"
        );
    }

    #[test]
    fn test_fixed_header_lines() {
        assert_eq!(
            fixed_header_lines(),
            "access-control-allow-origin: *\r\n\
             access-control-allow-methods: GET\r\n\
             cache-control: no-store, no-cache, must-revalidate\r\n"
        );
    }

    #[test]
    fn test_replaces_existing_cache_control() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        );
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        apply_cors_headers(&mut headers);

        let values: Vec<_> = headers.get_all(header::CACHE_CONTROL).iter().collect();
        assert_eq!(values, vec!["no-store, no-cache, must-revalidate"]);
        assert_eq!(headers[header::CONTENT_TYPE], "text/csv");
    }
}
