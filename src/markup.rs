//! Markup post-processing: fit generated HTML to the reference canvas.
//!
//! Generated documents are written against a fixed pixel canvas (see
//! [`AspectRatio::reference_size`]). Before display they are rewritten so the
//! embedded surface can scale them: absolute `px` measurements become
//! viewport-relative units, a viewport meta tag pins the scale, and an
//! override style block keeps every element inside the canvas.
//!
//! The conversion is a textual scan. In the default [`UnitMode::WidthRelative`]
//! mode every `px` value is converted against the reference width and emitted
//! as `vw`, vertical measurements included. [`UnitMode::PerAxis`] looks at the
//! CSS property a value belongs to and converts vertical ones against the
//! reference height instead.
//!
//! The rewrite is not idempotent: feed each raw document through [`normalize`]
//! exactly once.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::widget::{AspectRatio, ReferenceSize};

/// Viewport declaration injected into every normalized document.
pub const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0, user-scalable=no">"#;

/// Prefix of the URIs produced by [`to_embeddable_uri`].
pub const DATA_URI_PREFIX: &str = "data:text/html;charset=utf-8,";

/// Sandbox flags for the embedding surface. Widgets run their own scripts.
pub const SANDBOX_POLICY: &str = "allow-scripts allow-same-origin";

// Characters left alone by JavaScript's encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const VERTICAL_PROPERTIES: &[&str] = &[
    "height",
    "min-height",
    "max-height",
    "top",
    "bottom",
    "margin-top",
    "margin-bottom",
    "padding-top",
    "padding-bottom",
    "line-height",
    "row-gap",
];

/// How `px` measurements are turned into viewport units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitMode {
    /// Every value is converted against the reference width (`vw`)
    #[default]
    WidthRelative,
    /// Vertical CSS properties use the reference height (`vh`)
    PerAxis,
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap_or_else(|e| panic!("invalid pattern {pattern}: {e}")))
}

fn px_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(\d+(?:\.\d+)?)px")
}

fn declaration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?i)([a-z-]+)(\s*:\s*)([^;{}<>"]*)"#)
}

fn viewport_meta_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r#"(?i)<meta\b[^>]*\bname\s*=\s*["']?viewport\b[^>]*>"#)
}

fn head_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<head(?:\s[^>]*)?>")
}

fn head_close_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)</head\s*>")
}

fn html_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<html(?:\s[^>]*)?>")
}

fn doctype_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<!doctype\s[^>]*>")
}

fn style_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)<style[\s>]")
}

/// Whether `markup` is a whole document rather than a fragment.
pub fn is_complete_document(markup: &str) -> bool {
    let lower = markup.to_ascii_lowercase();
    lower.contains("<!doctype html") || lower.contains("<html")
}

/// Fit `markup` to the canvas of `aspect_ratio` using width-relative units.
pub fn normalize(markup: &str, aspect_ratio: AspectRatio) -> String {
    normalize_with(markup, aspect_ratio, UnitMode::default())
}

/// Fit `markup` to the canvas of `aspect_ratio` with an explicit unit mode.
pub fn normalize_with(markup: &str, aspect_ratio: AspectRatio, mode: UnitMode) -> String {
    let size = aspect_ratio.reference_size();
    if is_complete_document(markup) {
        fit_document(markup, size, mode)
    } else {
        fit_fragment(markup, size, mode)
    }
}

/// Rewrite every `px` measurement in `text` into viewport units.
pub fn convert_px_units(text: &str, size: ReferenceSize, mode: UnitMode) -> String {
    match mode {
        UnitMode::WidthRelative => px_to_units(text, size.width, "vw"),
        UnitMode::PerAxis => {
            let by_property = declaration_re().replace_all(text, |caps: &Captures| {
                let property = caps[1].to_ascii_lowercase();
                let (reference, unit) = if VERTICAL_PROPERTIES.contains(&property.as_str()) {
                    (size.height, "vh")
                } else {
                    (size.width, "vw")
                };
                format!("{}{}{}", &caps[1], &caps[2], px_to_units(&caps[3], reference, unit))
            });
            // Leftovers outside declarations (attributes, scripts) fall back to width.
            px_to_units(&by_property, size.width, "vw")
        }
    }
}

fn px_to_units(text: &str, reference: u32, unit: &str) -> String {
    px_re()
        .replace_all(text, |caps: &Captures| {
            // The pattern only matches digits with an optional fraction.
            let px: f64 = caps[1].parse().unwrap_or(0.0);
            format!("{}{}", px / f64::from(reference) * 100.0, unit)
        })
        .into_owned()
}

fn fit_document(markup: &str, size: ReferenceSize, mode: UnitMode) -> String {
    let mut html = markup.to_string();

    // Viewport: replace an existing declaration, or add one to the head.
    let mut has_viewport = true;
    if viewport_meta_re().is_match(&html) {
        html = viewport_meta_re().replace(&html, VIEWPORT_META).into_owned();
    } else if let Some(head) = head_open_re().find(&html) {
        let end = head.end();
        html.insert_str(end, &format!("\n  {}", VIEWPORT_META));
    } else {
        has_viewport = false;
    }

    html = convert_px_units(&html, size, mode);

    let block = if has_viewport {
        override_style(false)
    } else {
        format!("{}\n  {}", VIEWPORT_META, override_style(false))
    };
    let head_open = head_open_re().find(&html).map(|m| m.end());
    let head_close = head_close_re().find(&html).map(|m| m.start());

    match (head_open, head_close) {
        (Some(open), Some(_)) if style_open_re().is_match(&html) => {
            html.insert_str(open, &format!("\n  {}", block));
        }
        (_, Some(close)) => {
            html.insert_str(close, &format!("  {}\n", block));
        }
        (Some(open), None) => {
            html.insert_str(open, &format!("\n  {}", block));
        }
        (None, None) => {
            let head = format!("<head>\n  {}\n</head>\n", block);

            let anchor = html_open_re()
                .find(&html)
                .or_else(|| doctype_re().find(&html))
                .map(|m| m.end());
            match anchor {
                Some(at) => html.insert_str(at, &format!("\n{}", head)),
                None => html.insert_str(0, &head),
            }
        }
    }

    html
}

fn fit_fragment(fragment: &str, size: ReferenceSize, mode: UnitMode) -> String {
    let content = convert_px_units(fragment, size, mode);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"UTF-8\">\n  {}\n  {}\n</head>\n<body>\n{}\n</body>\n</html>",
        VIEWPORT_META,
        override_style(true),
        content
    )
}

/// Constraint rules keeping every element inside the canvas.
///
/// `reset_spacing` additionally zeroes margin and padding on every element,
/// which is only safe for fragments we wrap ourselves.
fn override_style(reset_spacing: bool) -> String {
    let spacing = if reset_spacing {
        "\n      margin: 0;\n      padding: 0;"
    } else {
        ""
    };
    format!(
        r#"<style>
    /* fit the canvas: everything scales with the embedding surface */
    html, body {{
      width: 100vw !important;
      height: 100vh !important;
      max-width: 100vw !important;
      max-height: 100vh !important;
      margin: 0 !important;
      padding: 0 !important;
      overflow: hidden !important;
      box-sizing: border-box !important;
      position: relative !important;
    }}

    * {{{spacing}
      box-sizing: border-box !important;
      max-width: 100vw !important;
      max-height: 100vh !important;
    }}

    body > * {{
      max-width: 100vw !important;
      max-height: 100vh !important;
    }}

    img, video, canvas, svg {{
      max-width: 100vw !important;
      max-height: 100vh !important;
      width: auto !important;
      height: auto !important;
    }}

    [style*="position: absolute"], [style*="position:fixed"] {{
      max-width: 100vw !important;
      max-height: 100vh !important;
    }}
  </style>"#
    )
}

/// Wrap a finished document in a self-contained `data:` URI.
pub fn to_embeddable_uri(document: &str) -> String {
    format!("{}{}", DATA_URI_PREFIX, utf8_percent_encode(document, URI_COMPONENT))
}

/// Recover the document carried by a URI from [`to_embeddable_uri`].
pub fn from_embeddable_uri(uri: &str) -> Option<String> {
    let encoded = uri.strip_prefix(DATA_URI_PREFIX)?;
    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|s| s.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> ReferenceSize {
        AspectRatio::Square.reference_size()
    }

    #[test]
    fn pixel_values_become_vw() {
        let out = convert_px_units("width: 200px;", square(), UnitMode::WidthRelative);
        assert_eq!(out, "width: 50vw;");
    }

    #[test]
    fn fractional_pixels_are_converted() {
        let out = convert_px_units("margin: 13px 0.5px", square(), UnitMode::WidthRelative);
        assert_eq!(out, "margin: 3.25vw 0.125vw");
    }

    #[test]
    fn wide_canvas_uses_its_width() {
        let size = AspectRatio::Wide.reference_size();
        assert_eq!(convert_px_units("height: 400px", size, UnitMode::WidthRelative), "height: 50vw");
    }

    #[test]
    fn per_axis_uses_height_for_vertical_properties() {
        let size = AspectRatio::Wide.reference_size();
        let out = convert_px_units("div { width: 400px; height: 200px; top: 40px }", size, UnitMode::PerAxis);
        assert_eq!(out, "div { width: 50vw; height: 50vh; top: 10vh }");
    }

    #[test]
    fn per_axis_falls_back_to_width_outside_declarations() {
        let size = AspectRatio::Wide.reference_size();
        let out = convert_px_units(r#"<canvas data-w="80px"></canvas>"#, size, UnitMode::PerAxis);
        assert_eq!(out, r#"<canvas data-w="10vw"></canvas>"#);
    }

    #[test]
    fn fragment_is_wrapped_once() {
        let out = normalize("<div style=\"width: 200px\">hi</div>", AspectRatio::Square);
        assert_eq!(out.matches("<!DOCTYPE html>").count(), 1);
        assert_eq!(out.matches(VIEWPORT_META).count(), 1);
        assert!(out.contains("<div style=\"width: 50vw\">hi</div>"));
        assert!(out.contains("margin: 0;\n      padding: 0;"));
    }

    #[test]
    fn detects_documents_case_insensitively() {
        assert!(is_complete_document("<!doctype html><p>x</p>"));
        assert!(is_complete_document("<HTML><body></body></HTML>"));
        assert!(!is_complete_document("<div>x</div>"));
    }

    #[test]
    fn existing_viewport_is_replaced() {
        let doc = r#"<!DOCTYPE html><html><head><meta name="viewport" content="width=400"></head><body></body></html>"#;
        let out = normalize(doc, AspectRatio::Square);
        assert_eq!(out.matches("name=\"viewport\"").count(), 1);
        assert!(out.contains(VIEWPORT_META));
        assert!(!out.contains("width=400"));
    }

    #[test]
    fn missing_viewport_is_added_to_head() {
        let doc = "<!DOCTYPE html><html><head><title>t</title></head><body></body></html>";
        let out = normalize(doc, AspectRatio::Square);
        assert_eq!(out.matches(VIEWPORT_META).count(), 1);
        let meta = out.find(VIEWPORT_META).unwrap();
        assert!(meta < out.find("<title>").unwrap());
    }

    #[test]
    fn override_goes_before_first_style_block() {
        let doc = "<html><head><title>t</title><style>p { font-size: 40px }</style></head><body></body></html>";
        let out = normalize(doc, AspectRatio::Square);
        let ours = out.find("fit the canvas").unwrap();
        let theirs = out.find("p { font-size: 10vw }").unwrap();
        assert!(ours < theirs);
    }

    #[test]
    fn override_goes_before_head_close_without_styles() {
        let doc = "<html><head><title>t</title></head><body></body></html>";
        let out = normalize(doc, AspectRatio::Square);
        let ours = out.find("fit the canvas").unwrap();
        assert!(ours > out.find("<title>").unwrap());
        assert!(ours < out.find("</head>").unwrap());
    }

    #[test]
    fn header_element_is_not_mistaken_for_head() {
        let doc = "<html><body><header>x</header></body></html>";
        let out = normalize(doc, AspectRatio::Square);
        let head = out.find("<head>").unwrap();
        assert!(head < out.find("<header>").unwrap());
        assert!(head > out.find("<html>").unwrap());
        assert_eq!(out.matches(VIEWPORT_META).count(), 1);
    }

    #[test]
    fn headless_document_gets_synthesized_head_after_doctype() {
        let doc = "<!DOCTYPE html>\n<body><p>x</p></body>";
        let out = normalize(doc, AspectRatio::Large);
        assert!(out.starts_with("<!DOCTYPE html>\n<head>"));
        assert!(out.contains("fit the canvas"));
    }

    #[test]
    fn injected_rules_contain_no_pixels() {
        assert!(!override_style(true).contains("px"));
        assert!(!override_style(false).contains("px"));
    }

    #[test]
    fn uri_round_trips() {
        let doc = "<!DOCTYPE html><p class='a'>50% & \"more\" — ünïcode</p>";
        let uri = to_embeddable_uri(doc);
        assert!(uri.starts_with(DATA_URI_PREFIX));
        assert!(!uri[DATA_URI_PREFIX.len()..].contains(' '));
        assert_eq!(from_embeddable_uri(&uri).as_deref(), Some(doc));
    }

    #[test]
    fn uri_matches_encode_uri_component() {
        assert_eq!(
            to_embeddable_uri("<a b='c'>(x)!~*-_.</a>"),
            "data:text/html;charset=utf-8,%3Ca%20b%3D'c'%3E(x)!~*-_.%3C%2Fa%3E"
        );
    }

    #[test]
    fn foreign_uri_is_rejected() {
        assert!(from_embeddable_uri("https://example.com").is_none());
    }
}
