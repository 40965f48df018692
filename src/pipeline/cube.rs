//! Cube-action classification of free-text decision labels.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::enums::CubeAction;

/// A compiled keyword pattern for one language family.
struct CubePattern {
    regex: Regex,
    language: &'static str,
}

fn pattern(regex_str: &str, language: &'static str) -> CubePattern {
    CubePattern {
        regex: Regex::new(regex_str).expect("Invalid cube keyword pattern"),
        language,
    }
}

static NO_DOUBLE_PATTERNS: LazyLock<Vec<CubePattern>> = LazyLock::new(|| {
    vec![
        pattern(r"(?i)\bno\s*(?:re)?double\b|^\s*nd\s*$", "en"),
        pattern(r"(?i)\bpas\s+de\s+(?:re)?double\b|\bne\s+double\s+pas\b", "fr"),
        pattern(r"(?i)\bkein(?:e|en)?\s+(?:re)?doppel|\bnicht\s+doppeln\b", "de"),
        pattern(r"(?i)\b(?:no|sin)\s+doblar\b|\bno\s+dobla\b", "es"),
        pattern(r"(?i)\bnon\s+raddoppi|\bno\s+raddoppio\b", "it"),
        pattern(r"(?i)\bdaburu\s*nashi\b|\bno\s*daburu\b", "ja"),
    ]
});

static TAKE_PATTERNS: LazyLock<Vec<CubePattern>> = LazyLock::new(|| {
    vec![
        pattern(r"(?i)\btakes?n?\b|\baccept(?:s|ed)?\b|\bbeaver\b", "en"),
        pattern(r"(?i)\bprend(?:s|re)?\b|\baccepte\b", "fr"),
        pattern(r"(?i)\bannehm|\bangenommen\b", "de"),
        pattern(r"(?i)\bacept|\btomar?\b", "es"),
        pattern(r"(?i)\baccett|\bprende\b", "it"),
        pattern(r"(?i)\bteiku\b", "ja"),
    ]
});

static PASS_PATTERNS: LazyLock<Vec<CubePattern>> = LazyLock::new(|| {
    vec![
        pattern(r"(?i)\bpass(?:es|ed)?\b|\bdrop(?:s|ped)?\b|\breject|\bdecline", "en"),
        pattern(r"(?i)\bpasse\b|\brefuse|\babandonne", "fr"),
        pattern(r"(?i)\baufgeb|\bablehn|\babgelehnt\b|\bpassen\b", "de"),
        pattern(r"(?i)\brechaz|\bpas[ao]\b", "es"),
        pattern(r"(?i)\brifiut|\bpassa\b", "it"),
        pattern(r"(?i)\bpasu\b", "ja"),
    ]
});

const SEPARATORS: [char; 4] = ['/', ',', ';', '|'];

fn find_match(patterns: &[CubePattern], text: &str) -> Option<&'static str> {
    patterns
        .iter()
        .find(|p| p.regex.is_match(text))
        .map(|p| p.language)
}

/// Classify by keywords only, checked NoDouble, then Take, then Pass.
pub fn classify_explicit(text: &str) -> Option<CubeAction> {
    let candidates = [
        (&*NO_DOUBLE_PATTERNS, CubeAction::NoDouble),
        (&*TAKE_PATTERNS, CubeAction::Take),
        (&*PASS_PATTERNS, CubeAction::Pass),
    ];
    candidates.into_iter().find_map(|(patterns, action)| {
        find_match(patterns, text).map(|language| {
            tracing::trace!(text, language, action = action.as_str(), "Cube keyword matched");
            action
        })
    })
}

/// Classify a cube decision label. Without a keyword, a separator means
/// a double whose answer is unknown; no separator means no double.
pub fn classify_cube_action(text: &str) -> CubeAction {
    if let Some(action) = classify_explicit(text) {
        return action;
    }
    if text.contains(SEPARATORS) {
        CubeAction::Unknown
    } else {
        CubeAction::NoDouble
    }
}
