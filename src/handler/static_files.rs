//! Static file serving module
//!
//! Maps request paths onto the served root, resolves index files and
//! directory listings, and loads file contents.

use crate::config::AppState;
use crate::handler::listing;
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime, HttpResponse};
use crate::logger;
use hyper::body::Bytes;
use hyper::StatusCode;
use percent_encoding::percent_decode_str;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Percent-decode a request path
pub fn decode_path(raw_path: &str) -> String {
    percent_decode_str(raw_path).decode_utf8_lossy().into_owned()
}

/// Translate a decoded URL path into a filesystem path under `root`
///
/// Empty, `.` and `..` segments are dropped, as are segments carrying a
/// platform separator, so the result never climbs above `root`.
pub fn translate_path(root: &Path, url_path: &str) -> PathBuf {
    url_path
        .split('/')
        .filter(|word| !word.is_empty() && *word != "." && *word != "..")
        .filter(|word| !word.contains(std::path::MAIN_SEPARATOR) && !word.contains('\\'))
        .fold(root.to_path_buf(), |path, word| path.join(word))
}

/// Serve the request path from the state's root directory
pub async fn serve_path(ctx: &RequestContext<'_>, state: &AppState) -> HttpResponse {
    let decoded = decode_path(ctx.path);
    let has_trailing_slash = decoded.ends_with('/');
    let mut file_path = translate_path(&state.root, &decoded);

    let metadata = match fs::metadata(&file_path).await {
        Ok(m) => m,
        Err(e) => return error_for_io(&e, &file_path, ctx.is_head),
    };

    if !is_within_root(&state.root, &file_path).await {
        logger::log_warning(&format!(
            "Path escapes served root, blocked: {} -> {}",
            ctx.path,
            file_path.display()
        ));
        return http::build_403_response(ctx.is_head);
    }

    if metadata.is_dir() {
        if !has_trailing_slash {
            let location = match ctx.query {
                Some(q) => format!("{}/?{q}", ctx.path),
                None => format!("{}/", ctx.path),
            };
            return http::build_redirect_response(&location);
        }

        match find_index_file(&file_path, &state.config.http.index_files).await {
            Some(index) => file_path = index,
            None if state.config.http.directory_listing => {
                return serve_listing(&file_path, &decoded, ctx.is_head).await;
            }
            None => return http::build_403_response(ctx.is_head),
        }
    } else if has_trailing_slash {
        return http::build_404_response(ctx.is_head);
    }

    serve_file(ctx, &file_path).await
}

/// First configured index file that exists as a regular file
async fn find_index_file(dir: &Path, index_files: &[String]) -> Option<PathBuf> {
    for name in index_files {
        let candidate = dir.join(name);
        if fs::metadata(&candidate).await.is_ok_and(|m| m.is_file()) {
            return Some(candidate);
        }
    }
    None
}

async fn serve_listing(dir: &Path, display_path: &str, is_head: bool) -> HttpResponse {
    match listing::list_directory(dir, display_path).await {
        Ok(html) => http::build_html_response(html, is_head),
        Err(e) => {
            logger::log_warning(&format!("Cannot list '{}': {e}", dir.display()));
            http::build_error_response(
                StatusCode::NOT_FOUND,
                "No permission to list directory",
                is_head,
            )
        }
    }
}

async fn serve_file(ctx: &RequestContext<'_>, file_path: &Path) -> HttpResponse {
    let content = match fs::read(file_path).await {
        Ok(c) => c,
        Err(e) => return error_for_io(&e, file_path, ctx.is_head),
    };

    let modified = fs::metadata(file_path)
        .await
        .and_then(|m| m.modified())
        .ok();

    if let Some(modified) = modified {
        if cache::is_not_modified(ctx.if_modified_since, modified) {
            return http::build_304_response(modified);
        }
    }

    http::build_file_response(
        Bytes::from(content),
        mime::content_type_for(file_path),
        modified,
        ctx.is_head,
    )
}

/// Symlinks may point outside the root even after segment filtering
async fn is_within_root(root: &Path, path: &Path) -> bool {
    fs::canonicalize(path)
        .await
        .is_ok_and(|canonical| canonical.starts_with(root))
}

fn error_for_io(error: &io::Error, path: &Path, is_head: bool) -> HttpResponse {
    match error.kind() {
        io::ErrorKind::NotFound => http::build_404_response(is_head),
        io::ErrorKind::PermissionDenied => http::build_403_response(is_head),
        _ => {
            logger::log_error(&format!("Failed to read '{}': {error}", path.display()));
            http::build_404_response(is_head)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_path_basic() {
        let root = Path::new("/srv/www");
        assert_eq!(translate_path(root, "/"), PathBuf::from("/srv/www"));
        assert_eq!(
            translate_path(root, "/data/African.csv"),
            PathBuf::from("/srv/www/data/African.csv")
        );
    }

    #[test]
    fn test_translate_path_drops_dot_segments() {
        let root = Path::new("/srv/www");
        assert_eq!(
            translate_path(root, "/../../etc/passwd"),
            PathBuf::from("/srv/www/etc/passwd")
        );
        assert_eq!(
            translate_path(root, "/a/./b//c/.."),
            PathBuf::from("/srv/www/a/b/c")
        );
    }

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/my%20data/Asian.csv"), "/my data/Asian.csv");
        assert_eq!(decode_path("/%2e%2e/secret"), "/../secret");
        assert_eq!(
            translate_path(Path::new("/srv"), &decode_path("/%2e%2e/secret")),
            PathBuf::from("/srv/secret")
        );
    }
}
