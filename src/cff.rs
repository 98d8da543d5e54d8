// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Citation document assembly and CFF 1.2.0 output.
///
/// Combines repository details, aggregated contributors enriched with
/// resolved ORCID iDs, and documentation-sourced fallback authors into a
/// CITATION.cff document written as YAML.
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    aggregator::{Contributor, aggregate_contributors},
    docscan::{AuthorCandidate, default_scans},
    error::{Error, io_error},
    github::{PlatformClient, RepositoryDetails, UserProfile},
    orcid::IdentityRegistry,
    resolver::{ResolverConfig, resolve_orcid, split_name}
};

/// Schema version of the emitted document.
pub const CFF_VERSION: &str = "1.2.0";

const CITATION_MESSAGE: &str = "If you use this software, please cite it as below.";

/// An author entry in the citation document.
///
/// Invariant: the `orcid` field either carries a complete resolved link or
/// is omitted from the serialized output entirely; a null or partial
/// identifier is never emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CffAuthor {
    /// Given name, when a display name could be split.
    #[serde(rename = "given-names", skip_serializing_if = "Option::is_none")]
    pub given_names:  Option<String>,
    /// Family name, when a display name could be split.
    #[serde(rename = "family-names", skip_serializing_if = "Option::is_none")]
    pub family_names: Option<String>,
    /// Entity-style name used when no given/family split is available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name:         Option<String>,
    /// Platform login of the author.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias:        Option<String>,
    /// Declared affiliation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation:  Option<String>,
    /// Resolved ORCID link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orcid:        Option<String>
}

/// The assembled citation metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CffDocument {
    /// Schema version, always [`CFF_VERSION`].
    #[serde(rename = "cff-version")]
    pub cff_version:     String,
    /// Citation request message.
    pub message:         String,
    /// Work title, the repository name.
    pub title:           String,
    /// Work type, always `software`.
    #[serde(rename = "type")]
    pub work_type:       String,
    /// Author list in contributor order.
    pub authors:         Vec<CffAuthor>,
    /// Browser URL of the repository.
    #[serde(rename = "repository-code")]
    pub repository_code: String,
    /// SPDX license identifier, when the platform reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license:         Option<String>,
    /// Release date in `YYYY-MM-DD` form, derived from the last update.
    #[serde(rename = "date-released", skip_serializing_if = "Option::is_none")]
    pub date_released:   Option<String>,
    /// Repository description.
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub summary:         Option<String>
}

/// Assembles the citation document for a repository.
///
/// Repository details and the contributor list come from the platform; each
/// contributor is enriched with a resolved ORCID. When the platform yields
/// no usable contributors the README is scanned with the fallback strategy
/// list, and candidates carrying only an identifier are completed from the
/// registry record.
///
/// A contributor whose profile disappears between listing and resolution
/// degrades to an author entry without an identifier; it does not abort the
/// run.
///
/// # Arguments
///
/// * `platform` - Hosting platform client
/// * `registry` - Identity registry client
/// * `owner` - Repository owner
/// * `repo` - Repository name
/// * `config` - Resolver configuration
///
/// # Errors
///
/// Returns [`Error::Validation`] when the repository itself cannot be
/// fetched, and propagates platform client failures.
///
/// # Example
///
/// ```no_run
/// use cffgen::{GithubPlatform, OrcidRegistry, ResolverConfig, assemble_citation};
///
/// # async fn example() -> Result<(), cffgen::Error> {
/// let platform = GithubPlatform::new(None)?;
/// let registry = OrcidRegistry::new()?;
/// let document =
///     assemble_citation(&platform, &registry, "octocat", "hello-world", &ResolverConfig::default())
///         .await?;
/// println!("{}", document.title);
/// # Ok(())
/// # }
/// ```
pub async fn assemble_citation<P, R>(
    platform: &P,
    registry: &R,
    owner: &str,
    repo: &str,
    config: &ResolverConfig
) -> Result<CffDocument, Error>
where
    P: PlatformClient,
    R: IdentityRegistry
{
    let details = platform
        .repository(owner, repo)
        .await?
        .ok_or_else(|| Error::validation(format!("repository {owner}/{repo} was not found")))?;

    let mut contributors = aggregate_contributors(platform, owner, repo).await?;

    let authors = if contributors.is_empty() {
        warn!("no usable contributors for {}/{}, falling back to documentation scan", owner, repo);
        fallback_authors(platform, registry, owner, repo).await?
    } else {
        let mut authors = Vec::with_capacity(contributors.len());
        for contributor in &mut contributors {
            let profile = match platform.user_profile(&contributor.login).await {
                Ok(profile) => Some(profile),
                Err(Error::UserNotFound {
                    ..
                }) => {
                    warn!("contributor {} has no resolvable profile", contributor.login);
                    None
                }
                Err(other) => return Err(other)
            };

            if profile.is_some() {
                match resolve_orcid(platform, registry, &contributor.login, config).await {
                    Ok(resolved) => contributor.orcid = resolved,
                    Err(Error::UserNotFound {
                        ..
                    }) => {
                        warn!("profile for {} vanished during resolution", contributor.login);
                    }
                    Err(other) => return Err(other)
                }
            }

            authors.push(author_from_contributor(contributor, profile.as_ref()));
        }
        authors
    };

    Ok(CffDocument {
        cff_version:     CFF_VERSION.to_string(),
        message:         CITATION_MESSAGE.to_string(),
        title:           details.name.clone(),
        work_type:       "software".to_string(),
        authors,
        repository_code: details.html_url.clone(),
        license:         license_identifier(&details),
        date_released:   release_date(&details),
        summary:         details.description.clone()
    })
}

fn license_identifier(details: &RepositoryDetails) -> Option<String> {
    let license = details.license.as_ref()?;
    license.spdx_id.clone().or_else(|| license.name.clone())
}

fn release_date(details: &RepositoryDetails) -> Option<String> {
    let timestamp = details.updated_at.as_deref().or(details.created_at.as_deref())?;
    timestamp.split('T').next().map(str::to_string)
}

fn author_from_contributor(contributor: &Contributor, profile: Option<&UserProfile>) -> CffAuthor {
    let mut author = CffAuthor {
        alias: Some(contributor.login.clone()),
        orcid: contributor.orcid.clone(),
        ..CffAuthor::default()
    };

    if let Some(profile) = profile {
        author.affiliation = profile.company.clone();
        if let Some(display_name) = profile.name.as_deref() {
            apply_display_name(&mut author, display_name);
        }
    }

    if author.given_names.is_none() && author.name.is_none() {
        author.name = Some(contributor.login.clone());
    }

    author
}

fn apply_display_name(author: &mut CffAuthor, display_name: &str) {
    match split_name(display_name) {
        Some((given, family)) if given != family => {
            author.given_names = Some(given);
            author.family_names = Some(family);
        }
        Some(_) | None => {
            let trimmed = display_name.trim();
            if !trimmed.is_empty() {
                author.name = Some(trimmed.to_string());
            }
        }
    }
}

async fn fallback_authors<P, R>(
    platform: &P,
    registry: &R,
    owner: &str,
    repo: &str
) -> Result<Vec<CffAuthor>, Error>
where
    P: PlatformClient,
    R: IdentityRegistry
{
    let Some(readme) = platform.readme(owner, repo).await? else {
        warn!("no README available for {}/{}, citation will have no authors", owner, repo);
        return Ok(Vec::new());
    };

    let mut candidates = Vec::new();
    for scan in default_scans() {
        candidates = scan.scan(&readme);
        if !candidates.is_empty() {
            break;
        }
    }

    let mut authors = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        authors.push(author_from_candidate(registry, candidate).await?);
    }

    Ok(authors)
}

async fn author_from_candidate<R>(
    registry: &R,
    candidate: AuthorCandidate
) -> Result<CffAuthor, Error>
where
    R: IdentityRegistry
{
    let mut author = CffAuthor {
        affiliation: candidate.affiliation.clone(),
        orcid: candidate.orcid.clone(),
        ..CffAuthor::default()
    };

    match candidate.name.as_deref() {
        Some(name) => apply_display_name(&mut author, name),
        None => {
            // Name-less candidates carry an identifier link; complete them
            // from the registry record.
            if let Some(orcid) = candidate.orcid.as_deref() {
                let path = orcid.rsplit('/').next().unwrap_or(orcid);
                if let Some(record) = registry.fetch_record(path).await? {
                    author.given_names = record.given_name;
                    author.family_names = record.family_name;
                    if author.affiliation.is_none() {
                        author.affiliation = record.affiliations.first().cloned();
                    }
                }
            }
        }
    }

    Ok(author)
}

/// Writes the citation document as YAML to the given path.
///
/// # Arguments
///
/// * `path` - Destination file, conventionally `CITATION.cff`
/// * `document` - Assembled citation document
///
/// # Errors
///
/// Returns [`Error::Serialize`] when YAML encoding fails and [`Error::Io`]
/// when the file cannot be written.
pub fn write_citation(path: &Path, document: &CffDocument) -> Result<(), Error> {
    let yaml = serde_yaml::to_string(document)?;
    fs::write(path, yaml).map_err(|source| io_error(path, source))?;
    info!("Wrote citation metadata to {}", path.display());
    Ok(())
}
