//! Page/download classification
//!
//! Decides whether a URL is a crawlable page or a file to save. The cheap
//! extension check runs first so most downloads never cost a page request;
//! the content-type check catches extension-less links such as redirect
//! served binaries.

use std::collections::HashSet;
use url::Url;

/// Extensions treated as downloadable artifacts
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    // Documents
    ".pdf", ".txt", ".rtf", ".odt", ".ods", ".odp", ".epub", ".csv",
    // Office formats
    ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // Images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp", ".svg", ".tif", ".tiff",
    // Audio
    ".mp3", ".wav", ".ogg", ".flac", ".m4a",
    // Video
    ".mp4", ".avi", ".mov", ".mkv", ".webm", ".wmv",
    // Archives
    ".zip", ".rar", ".7z", ".tar", ".gz", ".tgz", ".bz2", ".xz",
    // Executables
    ".exe", ".msi", ".dmg", ".bin",
    // Packages
    ".apk", ".deb", ".rpm", ".pkg", ".jar",
];

/// Content-type prefixes treated as downloadable artifacts
pub const DOWNLOADABLE_MIME_PREFIXES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/rtf",
    "application/epub+zip",
    "application/vnd.ms-",
    "application/vnd.openxmlformats-officedocument",
    "application/vnd.oasis.opendocument",
    "application/vnd.android.package-archive",
    "application/zip",
    "application/x-zip",
    "application/x-rar",
    "application/vnd.rar",
    "application/x-7z-compressed",
    "application/x-tar",
    "application/gzip",
    "application/x-gzip",
    "application/x-bzip2",
    "application/x-xz",
    "application/x-msdownload",
    "application/x-msi",
    "application/x-apple-diskimage",
    "application/x-debian-package",
    "application/x-rpm",
    "application/java-archive",
    "application/octet-stream",
    "image/",
    "audio/",
    "video/",
];

const HTML_MIME_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Outcome of classifying a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// Save the body to the download folder
    Download,
    /// Parse the body for links
    Page,
    /// Neither a page nor a known file type
    Skip,
}

/// Classifies URLs by path extension and declared content type
#[derive(Debug, Clone)]
pub struct Classifier {
    extensions: HashSet<String>,
}

impl Classifier {
    /// Creates a classifier with the default extension set plus `extra`
    ///
    /// Extra extensions are matched case-insensitively and may be given with
    /// or without the leading dot.
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extensions: HashSet<String> =
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();

        for ext in extra {
            let ext = ext.as_ref().trim().to_ascii_lowercase();
            if ext.is_empty() {
                continue;
            }
            if ext.starts_with('.') {
                extensions.insert(ext);
            } else {
                extensions.insert(format!(".{}", ext));
            }
        }

        Self { extensions }
    }

    /// Extension-only check; needs no network round trip
    pub fn is_downloadable_url(&self, url: &Url) -> bool {
        path_extension(url).map_or(false, |ext| self.extensions.contains(&ext))
    }

    /// Classifies a URL given the content type of its response, if known
    ///
    /// # Decision Order
    ///
    /// 1. Known downloadable path extension → Download
    /// 2. Downloadable content-type prefix → Download
    /// 3. HTML content type, or no content type at all → Page
    /// 4. Anything else → Skip
    pub fn classify(&self, url: &Url, content_type: Option<&str>) -> Classification {
        if self.is_downloadable_url(url) {
            return Classification::Download;
        }

        let Some(content_type) = content_type else {
            return Classification::Page;
        };

        let mime = essence(content_type);
        if mime.is_empty() {
            Classification::Page
        } else if DOWNLOADABLE_MIME_PREFIXES
            .iter()
            .any(|prefix| mime.starts_with(prefix))
        {
            Classification::Download
        } else if HTML_MIME_TYPES.contains(&mime.as_str()) {
            Classification::Page
        } else {
            Classification::Skip
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}

/// Lowercase extension (with dot) of the URL's last path segment
fn path_extension(url: &Url) -> Option<String> {
    let name = crate::url::path_basename(url)?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(format!(".{}", ext.to_ascii_lowercase()))
}

/// Media type without parameters, lowercased: "Text/HTML; charset=utf-8" → "text/html"
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_extension_classifies_download() {
        let classifier = Classifier::default();
        for path in ["doc.pdf", "a.DOCX", "pic.jpeg", "song.mp3", "x.tar", "app.apk"] {
            let u = url(&format!("http://example.com/files/{}", path));
            assert!(classifier.is_downloadable_url(&u), "{}", path);
            assert_eq!(classifier.classify(&u, None), Classification::Download);
        }
    }

    #[test]
    fn test_extension_wins_over_html_content_type() {
        let classifier = Classifier::default();
        let u = url("http://example.com/report.pdf");
        assert_eq!(
            classifier.classify(&u, Some("text/html")),
            Classification::Download
        );
    }

    #[test]
    fn test_query_does_not_count_as_extension() {
        let classifier = Classifier::default();
        let u = url("http://example.com/get?file=report.pdf");
        assert!(!classifier.is_downloadable_url(&u));
    }

    #[test]
    fn test_dotfile_is_not_extension() {
        let classifier = Classifier::default();
        assert!(!classifier.is_downloadable_url(&url("http://example.com/.zip")));
    }

    #[test]
    fn test_pdf_content_type_without_extension() {
        let classifier = Classifier::default();
        let u = url("http://example.com/download/1234");
        assert_eq!(
            classifier.classify(&u, Some("application/pdf")),
            Classification::Download
        );
    }

    #[test]
    fn test_mime_categories() {
        let classifier = Classifier::default();
        let u = url("http://example.com/blob");
        for mime in [
            "image/png",
            "audio/mpeg",
            "video/mp4",
            "application/zip",
            "application/vnd.ms-excel",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/octet-stream",
        ] {
            assert_eq!(
                classifier.classify(&u, Some(mime)),
                Classification::Download,
                "{}",
                mime
            );
        }
    }

    #[test]
    fn test_html_is_page() {
        let classifier = Classifier::default();
        let u = url("http://example.com/about");
        assert_eq!(
            classifier.classify(&u, Some("Text/HTML; charset=UTF-8")),
            Classification::Page
        );
        assert_eq!(
            classifier.classify(&u, Some("application/xhtml+xml")),
            Classification::Page
        );
    }

    #[test]
    fn test_missing_content_type_is_page() {
        let classifier = Classifier::default();
        let u = url("http://example.com/about");
        assert_eq!(classifier.classify(&u, None), Classification::Page);
        assert_eq!(classifier.classify(&u, Some("")), Classification::Page);
    }

    #[test]
    fn test_other_content_types_skip() {
        let classifier = Classifier::default();
        let u = url("http://example.com/feed");
        assert_eq!(
            classifier.classify(&u, Some("application/json")),
            Classification::Skip
        );
        assert_eq!(
            classifier.classify(&u, Some("text/css")),
            Classification::Skip
        );
    }

    #[test]
    fn test_extra_extensions() {
        let classifier = Classifier::new([".ISO", "img"]);
        assert!(classifier.is_downloadable_url(&url("http://example.com/disk.iso")));
        assert!(classifier.is_downloadable_url(&url("http://example.com/disk.img")));
        assert!(!Classifier::default().is_downloadable_url(&url("http://example.com/disk.iso")));
    }
}
