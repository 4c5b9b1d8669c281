use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_RE: Regex = Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap();
    static ref STYLE_RE: Regex = Regex::new(r"(?is)<style\b[^>]*>.*?</style>").unwrap();
    static ref COMMENT_RE: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref NUMERIC_ENTITY_RE: Regex = Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Media type of a fetched payload, derived from the response Content-Type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Html,
    Pdf,
    Text,
    Other,
}

impl MediaType {
    /// Map a raw Content-Type header value (e.g. "text/html; charset=utf-8")
    /// to a media type. Missing or unrecognized headers are treated as Other.
    pub fn from_content_type(header: Option<&str>) -> Self {
        let value = match header {
            Some(v) => v.to_ascii_lowercase(),
            None => return MediaType::Other,
        };

        if value.contains("text/html") || value.contains("application/xhtml") {
            MediaType::Html
        } else if value.contains("application/pdf") {
            MediaType::Pdf
        } else if value.starts_with("text/") || value.contains("application/json") {
            MediaType::Text
        } else {
            MediaType::Other
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("PDF extraction failed: {0}")]
    PdfExtraction(String),
}

/// Convert a raw fetched payload into canonical plain text.
///
/// Pure function of (bytes, media type): HTML is stripped down to its text
/// content, PDFs go through text extraction, everything else is decoded as
/// text. All variants end with whitespace runs collapsed to single spaces
/// and the ends trimmed, so fingerprints are stable across markup-only and
/// formatting-only differences.
pub fn normalize(bytes: &[u8], media_type: MediaType) -> Result<String, NormalizeError> {
    match media_type {
        MediaType::Html => {
            let html = String::from_utf8_lossy(bytes);
            Ok(html_to_text(&html))
        }
        MediaType::Pdf => {
            let text = pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| NormalizeError::PdfExtraction(e.to_string()))?;
            let without_nulls = text.replace('\0', "");
            Ok(collapse_whitespace(&without_nulls))
        }
        MediaType::Text | MediaType::Other => {
            let text = String::from_utf8_lossy(bytes);
            Ok(collapse_whitespace(&text))
        }
    }
}

/// Strip an HTML document down to its visible text: script and style blocks
/// go first (including their content), then comments and remaining tags,
/// then character entities are decoded.
fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_RE.replace_all(html, " ");
    let without_styles = STYLE_RE.replace_all(&without_scripts, " ");
    let without_comments = COMMENT_RE.replace_all(&without_styles, " ");
    let without_tags = TAG_RE.replace_all(&without_comments, " ");
    let decoded = decode_entities(&without_tags);
    collapse_whitespace(&decoded)
}

/// Decode the named entities that show up in ordinary page text, plus
/// numeric character references. Unknown named entities are left as-is.
fn decode_entities(text: &str) -> String {
    let decoded = NUMERIC_ENTITY_RE.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let parsed = if let Some(hex_digits) = code.strip_prefix('x') {
            u32::from_str_radix(hex_digits, 16).ok()
        } else {
            code.parse::<u32>().ok()
        };
        parsed
            .and_then(char::from_u32)
            .map(|c| c.to_string())
            .unwrap_or_default()
    });

    decoded
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_content_type() {
        assert_eq!(
            MediaType::from_content_type(Some("text/html; charset=utf-8")),
            MediaType::Html
        );
        assert_eq!(
            MediaType::from_content_type(Some("application/pdf")),
            MediaType::Pdf
        );
        assert_eq!(
            MediaType::from_content_type(Some("text/plain")),
            MediaType::Text
        );
        assert_eq!(
            MediaType::from_content_type(Some("image/png")),
            MediaType::Other
        );
        assert_eq!(MediaType::from_content_type(None), MediaType::Other);
    }

    #[test]
    fn test_html_scripts_and_tags_stripped() {
        let html = b"<script>x</script><p>Hello &nbsp; World</p>";
        let text = normalize(html, MediaType::Html).unwrap();
        assert_eq!(text, "Hello World");
    }

    #[test]
    fn test_html_style_blocks_and_comments_stripped() {
        let html = b"<style>body { color: red; }</style><!-- note --><div>Price: <b>42</b> EUR</div>";
        let text = normalize(html, MediaType::Html).unwrap();
        assert_eq!(text, "Price: 42 EUR");
    }

    #[test]
    fn test_html_entities_decoded() {
        let html = b"<p>Fish &amp; Chips &#8211; &#x20AC;5</p>";
        let text = normalize(html, MediaType::Html).unwrap();
        assert_eq!(text, "Fish & Chips \u{2013} \u{20AC}5");
    }

    #[test]
    fn test_html_adjacent_cells_stay_separated() {
        let html = b"<table><tr><td>left</td><td>right</td></tr></table>";
        let text = normalize(html, MediaType::Html).unwrap();
        assert_eq!(text, "left right");
    }

    #[test]
    fn test_plain_text_whitespace_collapsed() {
        let text = normalize(b"  line one\n\n\tline   two  ", MediaType::Text).unwrap();
        assert_eq!(text, "line one line two");
    }

    #[test]
    fn test_other_treated_as_text() {
        let text = normalize(b"raw   bytes", MediaType::Other).unwrap();
        assert_eq!(text, "raw bytes");
    }

    #[test]
    fn test_invalid_pdf_reports_extraction_error() {
        let result = normalize(b"not a pdf at all", MediaType::Pdf);
        assert!(matches!(result, Err(NormalizeError::PdfExtraction(_))));
    }
}
