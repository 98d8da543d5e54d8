// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Fallback author extraction from repository documentation.
///
/// When the platform API yields no usable author data, the assembler runs a
/// list of scan strategies over the README text. Each strategy produces zero
/// or more candidate author records; the first strategy with output wins.
use std::sync::OnceLock;

use regex::Regex;

use crate::orcid::extract_orcid_links;

/// A candidate author record produced by a documentation scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorCandidate {
    /// Display name extracted from the document, when present.
    pub name:        Option<String>,
    /// ORCID link extracted from the document, when present.
    pub orcid:       Option<String>,
    /// Affiliation text extracted from the document, when present.
    pub affiliation: Option<String>
}

/// Strategy capable of producing candidate author records from free-form
/// document text.
pub trait AuthorScan {
    /// Scans the document and returns any candidates found.
    fn scan(&self, text: &str) -> Vec<AuthorCandidate>;
}

/// Returns the default strategy list in evaluation order: structured-section
/// detection first, bare identifier-link extraction as the last resort.
pub fn default_scans() -> Vec<Box<dyn AuthorScan>> {
    vec![Box::new(SectionScan), Box::new(PidLinkScan)]
}

/// Detects author/contributor sections in Markdown documents and extracts
/// their list items as candidates.
pub struct SectionScan;

fn section_heading_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^#{1,6}\s*(authors?|contributors?|maintainers?|credits)\b")
            .expect("valid heading pattern")
    })
}

fn list_item_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(?:[-*+]|\d+\.)\s+(.+)$").expect("valid list item pattern")
    })
}

fn markdown_link_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid link pattern"))
}

impl AuthorScan for SectionScan {
    fn scan(&self, text: &str) -> Vec<AuthorCandidate> {
        let mut candidates = Vec::new();
        let mut in_section = false;

        for line in text.lines() {
            if line.trim_start().starts_with('#') {
                in_section = section_heading_regex().is_match(line.trim_start());
                continue;
            }

            if !in_section {
                continue;
            }

            let Some(item) = list_item_regex().captures(line) else {
                continue;
            };
            let item_text = &item[1];

            let orcid = extract_orcid_links(item_text).into_iter().next();
            let name = candidate_name(item_text);

            if name.is_none() && orcid.is_none() {
                continue;
            }

            candidates.push(AuthorCandidate {
                name,
                orcid,
                affiliation: None
            });
        }

        candidates
    }
}

/// Reduces a list item to a plausible author name.
///
/// Markdown links keep their label, bare URLs and parenthesized remainders
/// are dropped. Returns `None` when nothing name-like survives.
fn candidate_name(item_text: &str) -> Option<String> {
    let without_links = markdown_link_regex().replace_all(item_text, "$1");

    // Keep only the part before any annotation such as "(maintainer)" or a
    // trailing bare URL.
    let head = without_links
        .split(['(', '<', '|'])
        .next()
        .unwrap_or_default();
    let cleaned = head
        .trim()
        .trim_matches(|c: char| matches!(c, '-' | ',' | ':' | ';' | '.'))
        .trim();

    if cleaned.is_empty() || cleaned.starts_with("http") {
        return None;
    }

    Some(cleaned.to_string())
}

/// Extracts persistent-identifier links from anywhere in the document,
/// yielding name-less candidates to be resolved against the registry.
pub struct PidLinkScan;

impl AuthorScan for PidLinkScan {
    fn scan(&self, text: &str) -> Vec<AuthorCandidate> {
        let mut seen = Vec::new();
        let mut candidates = Vec::new();

        for link in extract_orcid_links(text) {
            if seen.contains(&link) {
                continue;
            }
            seen.push(link.clone());
            candidates.push(AuthorCandidate {
                name:        None,
                orcid:       Some(link),
                affiliation: None
            });
        }

        candidates
    }
}
