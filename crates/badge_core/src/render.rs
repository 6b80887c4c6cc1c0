//! Flat two-segment SVG badge rendering.
//!
//! The layout follows the common "flat" badge shape: a grey label segment on
//! the left, a colored value segment on the right, rounded corners and a
//! subtle gradient. Text widths come from approximate Verdana 11px advance
//! widths so the segments fit their labels without a font engine.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::color::BadgeColor;
use crate::contract::format_coverage;

pub const DEFAULT_LEFT_COLOR: &str = "#555";
pub const COVERAGE_LABEL: &str = "coverage";

const BADGE_HEIGHT: u32 = 20;
const HORIZONTAL_PADDING: u32 = 5;
const LOGO_SIZE: u32 = 14;
const LOGO_PADDING: u32 = 3;

/// Fixed logo embedded into every coverage badge.
pub const COVERAGE_LOGO_SVG: &str = concat!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="150" height="150" viewBox="0 0 150 150">"##,
    r##"<circle cx="75" cy="75" r="72" fill="#306998"/>"##,
    r##"<path d="M40 95c0-22 18-30 35-30s35-8 35-26" fill="none" stroke="#ffd43b" stroke-width="14" stroke-linecap="round"/>"##,
    r##"<circle cx="104" cy="39" r="6" fill="#fff"/>"##,
    r##"<path d="M30 110h60" stroke="#fff" stroke-width="8" stroke-linecap="round" opacity=".6"/>"##,
    r##"</svg>"##,
);

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeSpec {
    pub left_text: String,
    pub right_text: String,
    pub left_color: String,
    pub right_color: String,
    /// Image reference for the logo, usually a `data:` URI.
    pub logo: Option<String>,
}

impl BadgeSpec {
    pub fn new(
        left_text: impl Into<String>,
        right_text: impl Into<String>,
        color: BadgeColor,
    ) -> Self {
        Self {
            left_text: left_text.into(),
            right_text: right_text.into(),
            left_color: DEFAULT_LEFT_COLOR.to_string(),
            right_color: color.hex().to_string(),
            logo: None,
        }
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }
}

/// Renders the coverage badge for a percentage: label `coverage`, value
/// `"{total_coverage}%"`, threshold color and the embedded logo.
pub fn coverage_badge(total_coverage: f64) -> String {
    let spec = BadgeSpec::new(
        COVERAGE_LABEL,
        format_coverage(total_coverage),
        BadgeColor::for_coverage(total_coverage),
    )
    .with_logo(embedded_logo_uri());
    render_badge(&spec)
}

pub fn embedded_logo_uri() -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(COVERAGE_LOGO_SVG)
    )
}

pub fn render_badge(spec: &BadgeSpec) -> String {
    let logo_width = if spec.logo.is_some() {
        LOGO_SIZE + LOGO_PADDING
    } else {
        0
    };
    let left_text_width = text_width(&spec.left_text);
    let right_text_width = text_width(&spec.right_text);
    let left_width = left_text_width + 2 * HORIZONTAL_PADDING + logo_width;
    let right_width = right_text_width + 2 * HORIZONTAL_PADDING;
    let total_width = left_width + right_width;

    // Text is drawn at 10x scale and shrunk back, which keeps sub-pixel
    // centering without fractional attributes.
    let left_center = (logo_width + left_width) * 5;
    let right_center = left_width * 10 + right_width * 5;

    let left_text = escape_xml(&spec.left_text);
    let right_text = escape_xml(&spec.right_text);
    let left_color = escape_xml(&spec.left_color);
    let right_color = escape_xml(&spec.right_color);

    let logo = match &spec.logo {
        Some(href) => format!(
            r#"<image x="{HORIZONTAL_PADDING}" y="{LOGO_PADDING}" width="{LOGO_SIZE}" height="{LOGO_SIZE}" xlink:href="{}"/>"#,
            escape_xml(href)
        ),
        None => String::new(),
    };

    let mut svg = String::with_capacity(1024 + spec.logo.as_ref().map_or(0, String::len));
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{total_width}" height="{BADGE_HEIGHT}" role="img" aria-label="{left_text}: {right_text}">"#
    ));
    svg.push_str(&format!("<title>{left_text}: {right_text}</title>"));
    svg.push_str(
        r##"<linearGradient id="smooth" x2="0" y2="100%"><stop offset="0" stop-color="#bbb" stop-opacity=".1"/><stop offset="1" stop-opacity=".1"/></linearGradient>"##,
    );
    svg.push_str(&format!(
        r##"<clipPath id="round"><rect width="{total_width}" height="{BADGE_HEIGHT}" rx="3" fill="#fff"/></clipPath>"##
    ));
    svg.push_str(&format!(
        r#"<g clip-path="url(#round)"><rect width="{left_width}" height="{BADGE_HEIGHT}" fill="{left_color}"/><rect x="{left_width}" width="{right_width}" height="{BADGE_HEIGHT}" fill="{right_color}"/><rect width="{total_width}" height="{BADGE_HEIGHT}" fill="url(#smooth)"/></g>"#
    ));
    svg.push_str(
        r##"<g fill="#fff" text-anchor="middle" font-family="DejaVu Sans,Verdana,Geneva,sans-serif" text-rendering="geometricPrecision" font-size="110">"##,
    );
    svg.push_str(&logo);
    svg.push_str(&text_pair(left_center, left_text_width, &left_text));
    svg.push_str(&text_pair(right_center, right_text_width, &right_text));
    svg.push_str("</g></svg>");
    svg
}

/// Shadow plus foreground text, both at 10x scale.
fn text_pair(center: u32, width: u32, text: &str) -> String {
    let length = width * 10;
    format!(
        concat!(
            r##"<text aria-hidden="true" x="{center}" y="150" fill="#010101" fill-opacity=".3" transform="scale(.1)" textLength="{length}">{text}</text>"##,
            r##"<text x="{center}" y="140" transform="scale(.1)" fill="#fff" textLength="{length}">{text}</text>"##,
        ),
        center = center,
        length = length,
        text = text,
    )
}

/// Estimated rendered width of `text` in pixels at 11px Verdana.
pub fn text_width(text: &str) -> u32 {
    let width: f64 = text.chars().map(char_width).sum();
    width.ceil() as u32
}

fn char_width(c: char) -> f64 {
    match c {
        'i' | 'l' | 'j' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' => 3.1,
        ' ' => 3.9,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '/' | '-' => 4.6,
        '0'..='9' => 7.0,
        'm' => 10.7,
        'w' => 9.0,
        'M' | 'W' => 9.9,
        '%' => 11.9,
        'A'..='Z' => 7.5,
        'a'..='z' => 6.6,
        _ => 7.0,
    }
}

pub fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coverage_badge_carries_labels_and_color() {
        let svg = coverage_badge(95.0);
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(">coverage</text>"));
        assert!(svg.contains(">95%</text>"));
        assert!(svg.contains(BadgeColor::Green.hex()));
    }

    #[test]
    fn coverage_badge_embeds_logo_as_data_uri() {
        let svg = coverage_badge(12.0);
        assert!(svg.contains("xlink:href=\"data:image/svg+xml;base64,"));
        assert!(svg.contains(BadgeColor::Red.hex()));
    }

    #[test]
    fn logo_widens_the_left_segment() {
        let plain = BadgeSpec::new("coverage", "50%", BadgeColor::Orange);
        let with_logo = plain.clone().with_logo("data:image/png;base64,AAAA");

        let plain_svg = render_badge(&plain);
        let logo_svg = render_badge(&with_logo);

        let expected_plain = text_width("coverage") + text_width("50%") + 4 * HORIZONTAL_PADDING;
        assert!(plain_svg.contains(&format!("width=\"{expected_plain}\" height=\"20\" role")));
        let expected_logo = expected_plain + LOGO_SIZE + LOGO_PADDING;
        assert!(logo_svg.contains(&format!("width=\"{expected_logo}\" height=\"20\" role")));
        assert!(!plain_svg.contains("<image"));
    }

    #[test]
    fn escapes_markup_in_labels() {
        let spec = BadgeSpec::new("a<b", "\"x\" & y", BadgeColor::Yellow);
        let svg = render_badge(&spec);
        assert!(svg.contains("a&lt;b"));
        assert!(svg.contains("&quot;x&quot; &amp; y"));
        assert!(!svg.contains("a<b"));
    }

    #[test]
    fn wider_text_measures_wider() {
        assert!(text_width("100%") > text_width("1%"));
        assert_eq!(text_width(""), 0);
    }
}
