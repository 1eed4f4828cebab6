// image_prompt.rs
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    static ref LINE_ART_PATTERN: Regex = Regex::new(r"svg").unwrap();
    static ref CARTOON_PATTERN: Regex = Regex::new(r"animovaný|kreslený|cartoon").unwrap();
}

/// Which prompt template an input falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    LineArt,
    Cartoon,
    Plain,
}

/// Matches the keywords against the lowercased text, so only characters whose
/// lowercase form is a keyword letter count ("ſvg" is not "svg").
pub fn detect_style(text: &str) -> PromptStyle {
    let lower = text.to_lowercase();
    if LINE_ART_PATTERN.is_match(&lower) {
        PromptStyle::LineArt
    } else if CARTOON_PATTERN.is_match(&lower) {
        PromptStyle::Cartoon
    } else {
        PromptStyle::Plain
    }
}

/// Rewrites user text into an image-generation prompt. The first matching
/// keyword group wins; text without any keyword is passed through as is.
pub fn classify(text: &str) -> String {
    let style = detect_style(text);
    debug!("Image prompt style: {:?}", style);

    match style {
        PromptStyle::LineArt => format!(
            "Minimalistic SVG-style line art: {}. Vector look, black lines on white background.",
            text
        ),
        PromptStyle::Cartoon => format!(
            "Cartoon-style colorful illustration: {}, white background, centered.",
            text
        ),
        PromptStyle::Plain => text.to_string(),
    }
}
