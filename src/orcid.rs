// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Public ORCID registry client and identifier pattern helpers.
///
/// Hosts the search and record endpoints of the registry, the link pattern
/// used to spot ORCID iDs in arbitrary payloads, and the acronym derivation
/// heuristic used by the broad-search affiliation fallback.
use std::{sync::OnceLock, time::Duration};

use masterror::AppError;
use regex::Regex;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;

/// Default public registry endpoint.
const DEFAULT_BASE_URL: &str = "https://pub.orcid.org";

/// Per-request timeout applied to registry calls.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// ORCID link pattern. The final group ends in a digit or the literal
/// checksum letter `X`.
const ORCID_LINK_PATTERN: &str = r"\bhttps?://orcid\.org/\d{4}-\d{4}-\d{4}-\d{3}[0-9X]\b";

fn orcid_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(ORCID_LINK_PATTERN).expect("valid ORCID pattern"))
}

/// Extracts every ORCID link found in the given text, in match order.
///
/// # Example
///
/// ```
/// use cffgen::extract_orcid_links;
///
/// let links = extract_orcid_links("see https://orcid.org/0000-0002-4321-2180 for details");
/// assert_eq!(links, vec!["https://orcid.org/0000-0002-4321-2180".to_string()]);
/// ```
pub fn extract_orcid_links(text: &str) -> Vec<String> {
    orcid_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Scans the decoded string values of a JSON payload for ORCID links.
///
/// Only string leaves are inspected, so structural characters of the
/// serialized document can never collide with the link pattern.
pub fn scan_value_for_orcid(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_orcid_links(value, &mut found);
    found
}

fn collect_orcid_links(value: &Value, found: &mut Vec<String>) {
    match value {
        Value::String(text) => found.extend(extract_orcid_links(text)),
        Value::Array(items) => {
            for item in items {
                collect_orcid_links(item, found);
            }
        }
        Value::Object(fields) => {
            for field in fields.values() {
                collect_orcid_links(field, found);
            }
        }
        _ => {}
    }
}

/// Derives the uppercase-only acronym of an organization name.
///
/// # Example
///
/// ```
/// use cffgen::derive_acronym;
///
/// assert_eq!(derive_acronym("Massachusetts Institute of Technology"), "MIT");
/// ```
pub fn derive_acronym(name: &str) -> String {
    name.chars().filter(|c| c.is_uppercase()).collect()
}

/// Search results returned by the registry search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrySearchResults {
    /// Total number of matching records, which may exceed the number of
    /// returned rows.
    #[serde(rename = "num-found", default)]
    pub num_found: u64,
    /// Returned result rows. The registry emits `null` instead of an empty
    /// list when nothing matches.
    #[serde(rename = "result", default, deserialize_with = "nullable_results")]
    pub results:   Vec<RegistrySearchResult>
}

fn nullable_results<'de, D>(deserializer: D) -> Result<Vec<RegistrySearchResult>, D::Error>
where
    D: serde::Deserializer<'de>
{
    let maybe: Option<Vec<RegistrySearchResult>> = Option::deserialize(deserializer)?;
    Ok(maybe.unwrap_or_default())
}

/// A single row from the registry search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySearchResult {
    /// Identifier block carrying both the bare path and the full URI.
    #[serde(rename = "orcid-identifier")]
    pub identifier: OrcidIdentifier
}

/// ORCID identifier in both path and URI form.
#[derive(Debug, Clone, Deserialize)]
pub struct OrcidIdentifier {
    /// Bare identifier, e.g. `0000-0002-4321-2180`.
    pub path: String,
    /// Full link form, e.g. `https://orcid.org/0000-0002-4321-2180`.
    pub uri:  String
}

/// A registry record reduced to the fields the resolver needs.
///
/// Used transiently during resolution and never cached across runs.
#[derive(Debug, Clone)]
pub struct IdentityCandidate {
    /// Bare identifier of the record.
    pub path:         String,
    /// Full link form of the identifier.
    pub uri:          String,
    /// Given name declared on the record.
    pub given_name:   Option<String>,
    /// Family name declared on the record.
    pub family_name:  Option<String>,
    /// Display names of the record's employment affiliations.
    pub affiliations: Vec<String>
}

/// Read access to the identity registry consumed by the resolver.
///
/// Both operations are enrichment lookups: any upstream failure degrades to
/// an empty result rather than surfacing an error.
#[allow(async_fn_in_trait)]
pub trait IdentityRegistry {
    /// Runs a search query, returning at most `rows` rows.
    async fn search(&self, query: &str, rows: u32) -> Result<RegistrySearchResults, Error>;

    /// Fetches the full record behind a bare identifier, or `None` when the
    /// lookup fails.
    async fn fetch_record(&self, path: &str) -> Result<Option<IdentityCandidate>, Error>;
}

/// Public-ORCID-backed implementation of [`IdentityRegistry`].
pub struct OrcidRegistry {
    client:   reqwest::Client,
    base_url: String
}

impl OrcidRegistry {
    /// Creates a registry client against the public ORCID endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self, AppError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a registry client against a custom endpoint.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Registry base URL without a trailing slash.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the underlying HTTP client cannot be built.
    pub fn with_base_url<U>(base_url: U) -> Result<Self, AppError>
    where
        U: Into<String>
    {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::service(format!("failed to initialize registry client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into()
        })
    }
}

impl IdentityRegistry for OrcidRegistry {
    async fn search(&self, query: &str, rows: u32) -> Result<RegistrySearchResults, Error> {
        debug!("Searching registry for '{}'", query);
        let rows = rows.to_string();
        let response = self
            .client
            .get(format!("{}/v3.0/search", self.base_url))
            .header(ACCEPT, "application/json")
            .query(&[("q", query), ("rows", rows.as_str())])
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<RegistrySearchResults>().await {
                    Ok(results) => Ok(results),
                    Err(error) => {
                        debug!("registry search payload decode failed: {}", error);
                        Ok(RegistrySearchResults::default())
                    }
                }
            }
            Ok(response) => {
                debug!("registry search returned status {}", response.status());
                Ok(RegistrySearchResults::default())
            }
            Err(error) => {
                debug!("registry search request failed: {}", error);
                Ok(RegistrySearchResults::default())
            }
        }
    }

    async fn fetch_record(&self, path: &str) -> Result<Option<IdentityCandidate>, Error> {
        debug!("Fetching registry record {}", path);
        let response = self
            .client
            .get(format!("{}/v3.0/{}", self.base_url, path))
            .header(ACCEPT, "application/json")
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                match response.json::<RecordResponse>().await {
                    Ok(record) => Ok(Some(candidate_from_record(path, record))),
                    Err(error) => {
                        debug!("registry record payload decode failed: {}", error);
                        Ok(None)
                    }
                }
            }
            Ok(response) => {
                debug!("registry record {} returned status {}", path, response.status());
                Ok(None)
            }
            Err(error) => {
                debug!("registry record request for {} failed: {}", path, error);
                Ok(None)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    #[serde(default)]
    person: Option<RecordPerson>,
    #[serde(rename = "activities-summary", default)]
    activities: Option<RecordActivities>
}

#[derive(Debug, Deserialize)]
struct RecordPerson {
    #[serde(default)]
    name: Option<RecordName>
}

#[derive(Debug, Deserialize)]
struct RecordName {
    #[serde(rename = "given-names", default)]
    given:  Option<RecordValue>,
    #[serde(rename = "family-name", default)]
    family: Option<RecordValue>
}

#[derive(Debug, Deserialize)]
struct RecordValue {
    value: String
}

#[derive(Debug, Deserialize)]
struct RecordActivities {
    #[serde(default)]
    employments: Option<RecordEmployments>
}

#[derive(Debug, Deserialize)]
struct RecordEmployments {
    #[serde(rename = "employment-summary", default)]
    summaries: Vec<RecordEmploymentSummary>
}

#[derive(Debug, Deserialize)]
struct RecordEmploymentSummary {
    #[serde(default)]
    organization: Option<RecordOrganization>
}

#[derive(Debug, Deserialize)]
struct RecordOrganization {
    name: String
}

fn candidate_from_record(path: &str, record: RecordResponse) -> IdentityCandidate {
    let name = record.person.and_then(|person| person.name);
    let (given_name, family_name) = match name {
        Some(name) => (
            name.given.map(|value| value.value),
            name.family.map(|value| value.value)
        ),
        None => (None, None)
    };

    let affiliations = record
        .activities
        .and_then(|activities| activities.employments)
        .map(|employments| {
            employments
                .summaries
                .into_iter()
                .filter_map(|summary| summary.organization.map(|org| org.name))
                .collect()
        })
        .unwrap_or_default();

    IdentityCandidate {
        path: path.to_string(),
        uri: format!("https://orcid.org/{path}"),
        given_name,
        family_name,
        affiliations
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn extract_orcid_links_finds_plain_link() {
        let links = extract_orcid_links("my id is https://orcid.org/0000-0002-4321-2180 thanks");
        assert_eq!(links, vec!["https://orcid.org/0000-0002-4321-2180".to_string()]);
    }

    #[test]
    fn extract_orcid_links_accepts_checksum_letter() {
        let links = extract_orcid_links("https://orcid.org/0000-0002-1825-009X");
        assert_eq!(links.len(), 1);
        assert!(links[0].ends_with("009X"));
    }

    #[test]
    fn extract_orcid_links_accepts_http_scheme() {
        let links = extract_orcid_links("http://orcid.org/0000-0001-2345-6789");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn extract_orcid_links_rejects_short_identifier() {
        let links = extract_orcid_links("https://orcid.org/0000-0002-4321");
        assert!(links.is_empty());
    }

    #[test]
    fn extract_orcid_links_rejects_unrelated_urls() {
        let links = extract_orcid_links("https://example.org/0000-0002-4321-2180 is not ORCID");
        assert!(links.is_empty());
    }

    #[test]
    fn scan_value_walks_nested_payloads() {
        let payload = json!({
            "login": "researcher",
            "bio": null,
            "links": [
                {"provider": "generic", "url": "https://orcid.org/0000-0002-4321-2180"}
            ]
        });

        let links = scan_value_for_orcid(&payload);
        assert_eq!(links, vec!["https://orcid.org/0000-0002-4321-2180".to_string()]);
    }

    #[test]
    fn scan_value_ignores_structural_characters() {
        // A key/value split across fields must not assemble into a match.
        let payload = json!({
            "a": "https://orcid.org/0000-0002",
            "b": "-4321-2180"
        });

        assert!(scan_value_for_orcid(&payload).is_empty());
    }

    #[test]
    fn derive_acronym_keeps_uppercase_letters_only() {
        assert_eq!(derive_acronym("Massachusetts Institute of Technology"), "MIT");
        assert_eq!(derive_acronym("University of California, Los Angeles"), "UCLA");
        assert_eq!(derive_acronym("lowercase only"), "");
    }

    #[test]
    fn search_results_deserialize_with_renamed_fields() {
        let payload = json!({
            "num-found": 1,
            "result": [{
                "orcid-identifier": {
                    "path": "0000-0002-4321-2180",
                    "uri": "https://orcid.org/0000-0002-4321-2180",
                    "host": "orcid.org"
                }
            }]
        });

        let results: RegistrySearchResults =
            serde_json::from_value(payload).expect("deserialization failed");
        assert_eq!(results.num_found, 1);
        assert_eq!(results.results[0].identifier.path, "0000-0002-4321-2180");
    }

    #[test]
    fn search_results_tolerate_null_result_list() {
        let payload = json!({"num-found": 0, "result": null});

        let results: RegistrySearchResults =
            serde_json::from_value(payload).expect("deserialization failed");
        assert_eq!(results.num_found, 0);
        assert!(results.results.is_empty());
    }

    #[test]
    fn candidate_from_record_extracts_names_and_affiliations() {
        let payload = json!({
            "person": {
                "name": {
                    "given-names": {"value": "Franco"},
                    "family-name": {"value": "Pestilli"}
                }
            },
            "activities-summary": {
                "employments": {
                    "employment-summary": [
                        {"organization": {"name": "Indiana University"}},
                        {"organization": {"name": "The University of Texas at Austin"}}
                    ]
                }
            }
        });

        let record: RecordResponse = serde_json::from_value(payload).expect("valid record");
        let candidate = candidate_from_record("0000-0002-2469-0494", record);
        assert_eq!(candidate.uri, "https://orcid.org/0000-0002-2469-0494");
        assert_eq!(candidate.given_name.as_deref(), Some("Franco"));
        assert_eq!(candidate.family_name.as_deref(), Some("Pestilli"));
        assert_eq!(candidate.affiliations.len(), 2);
    }

    #[test]
    fn candidate_from_record_tolerates_sparse_records() {
        let record: RecordResponse = serde_json::from_value(json!({})).expect("valid record");
        let candidate = candidate_from_record("0000-0001-2345-6789", record);
        assert!(candidate.given_name.is_none());
        assert!(candidate.affiliations.is_empty());
    }

    proptest! {
        #[test]
        fn any_wellformed_link_is_extracted(
            prefix in "([a-z]{0,15} )?",
            g1 in "[0-9]{4}",
            g2 in "[0-9]{4}",
            g3 in "[0-9]{4}",
            g4 in "[0-9]{3}[0-9X]"
        ) {
            let link = format!("https://orcid.org/{g1}-{g2}-{g3}-{g4}");
            let text = format!("{prefix}{link} trailing");
            let links = extract_orcid_links(&text);
            prop_assert_eq!(links, vec![link]);
        }

        #[test]
        fn text_without_registry_domain_never_matches(text in "[A-Za-z0-9 ./:-]{0,64}") {
            prop_assume!(!text.contains("orcid.org"));
            prop_assert!(extract_orcid_links(&text).is_empty());
        }
    }
}
