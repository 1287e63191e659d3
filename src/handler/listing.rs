//! Directory listing module
//!
//! Renders an HTML index for directories that have no index file.

use crate::http::escape_html;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io;
use std::path::Path;
use tokio::fs;

/// Characters left as-is in listing links: unreserved set plus `/`
const LINK_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

/// One directory entry as shown in the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    /// Target is a directory (symlinks followed)
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    fn link(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    fn display_name(&self) -> String {
        if self.is_dir {
            format!("{}/", self.name)
        } else if self.is_symlink {
            format!("{}@", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Read a directory and render its listing
///
/// `display_path` is the decoded request path, shown in the title.
pub async fn list_directory(dir: &Path, display_path: &str) -> io::Result<String> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_symlink = entry.file_type().await?.is_symlink();
        // Broken symlinks still list, as plain entries
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|m| m.is_dir());
        entries.push(ListingEntry {
            name,
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by_key(|e| e.name.to_lowercase());
    Ok(render_listing(display_path, &entries))
}

/// Render listing HTML for already sorted entries
pub fn render_listing(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(display_path));
    let mut html = format!(
        "<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<hr>\n<ul>\n"
    );

    for entry in entries {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            utf8_percent_encode(&entry.link(), LINK_ENCODE_SET),
            escape_html(&entry.display_name()),
        ));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool, is_symlink: bool) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir,
            is_symlink,
        }
    }

    #[test]
    fn test_render_marks_dirs_and_links() {
        let html = render_listing(
            "/data/",
            &[
                entry("African.csv", false, false),
                entry("js", true, false),
                entry("latest.csv", false, true),
            ],
        );
        assert!(html.contains("<title>Directory listing for /data/</title>"));
        assert!(html.contains("<li><a href=\"African.csv\">African.csv</a></li>"));
        assert!(html.contains("<li><a href=\"js/\">js/</a></li>"));
        assert!(html.contains("<li><a href=\"latest.csv\">latest.csv@</a></li>"));
    }

    #[test]
    fn test_render_encodes_links_and_escapes_text() {
        let html = render_listing("/<x>/", &[entry("a b&c.csv", false, false)]);
        assert!(html.contains("Directory listing for /&lt;x&gt;/"));
        assert!(html.contains("href=\"a%20b%26c.csv\">a b&amp;c.csv</a>"));
    }

    #[tokio::test]
    async fn test_list_directory_sorts_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("beta.csv"), "x").unwrap();
        std::fs::write(dir.path().join("Alpha.csv"), "x").unwrap();
        std::fs::create_dir(dir.path().join("charts")).unwrap();

        let html = list_directory(dir.path(), "/").await.unwrap();
        let alpha = html.find("Alpha.csv").unwrap();
        let beta = html.find("beta.csv").unwrap();
        let charts = html.find("charts/").unwrap();
        assert!(alpha < beta && beta < charts);
    }
}
