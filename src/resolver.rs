// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Researcher identifier resolution for platform usernames.
///
/// Runs an ordered chain of strategies against the user's profile, declared
/// social links and the public identity registry, short-circuiting on the
/// first strategy that produces an ORCID link.
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    error::Error,
    github::{PlatformClient, UserProfile},
    orcid::{IdentityCandidate, IdentityRegistry, derive_acronym, scan_value_for_orcid}
};

/// Tuning knobs for registry-backed resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum rows requested from registry searches (default: 10).
    pub search_rows:       u32,
    /// Broad-search result count above which resolution is abandoned as too
    /// ambiguous (default: 10).
    pub max_broad_results: u64,
    /// Pacing delay in milliseconds before each registry detail fetch
    /// (default: 500). A cooperative throttle, not a lock.
    pub registry_delay_ms: u64
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            search_rows:       10,
            max_broad_results: 10,
            registry_delay_ms: 500
        }
    }
}

/// Resolution strategies in strict priority order.
///
/// New strategies (e.g. personal-website scraping) slot into this list and
/// the dispatch match below without touching the surrounding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolveStrategy {
    ProfileScan,
    SocialLinks,
    RegistryExact,
    RegistryBroad
}

const STRATEGY_ORDER: [ResolveStrategy; 4] = [
    ResolveStrategy::ProfileScan,
    ResolveStrategy::SocialLinks,
    ResolveStrategy::RegistryExact,
    ResolveStrategy::RegistryBroad
];

/// Attempts to resolve the ORCID link for a platform username.
///
/// Strategies are evaluated in priority order with short-circuit on first
/// success: profile scan, social-links scan, registry exact search, registry
/// broad search with affiliation-acronym fallback. Exhausting the chain is
/// not an error and yields `Ok(None)`.
///
/// # Arguments
///
/// * `platform` - Hosting platform client
/// * `registry` - Identity registry client
/// * `username` - Platform login to resolve
/// * `config` - Registry search and pacing configuration
///
/// # Errors
///
/// Returns [`Error::UserNotFound`] when the initial profile existence check
/// fails; callers must distinguish this from a user that exists but has no
/// discoverable identifier.
///
/// # Example
///
/// ```no_run
/// use cffgen::{GithubPlatform, OrcidRegistry, ResolverConfig, resolve_orcid};
///
/// # async fn example() -> Result<(), cffgen::Error> {
/// let platform = GithubPlatform::new(None)?;
/// let registry = OrcidRegistry::new()?;
/// let config = ResolverConfig::default();
/// if let Some(orcid) = resolve_orcid(&platform, &registry, "francopestilli", &config).await? {
///     println!("resolved {orcid}");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn resolve_orcid<P, R>(
    platform: &P,
    registry: &R,
    username: &str,
    config: &ResolverConfig
) -> Result<Option<String>, Error>
where
    P: PlatformClient,
    R: IdentityRegistry
{
    // Existence check is fail-fast; everything after degrades gracefully.
    let profile = platform.user_profile(username).await?;

    for strategy in STRATEGY_ORDER {
        let resolved = match strategy {
            ResolveStrategy::ProfileScan => scan_profile(&profile),
            ResolveStrategy::SocialLinks => scan_social_links(platform, username).await?,
            ResolveStrategy::RegistryExact => exact_search(registry, &profile, config).await?,
            ResolveStrategy::RegistryBroad => broad_search(registry, &profile, config).await?
        };

        if let Some(orcid) = resolved {
            debug!("resolved ORCID for {} via {:?}", username, strategy);
            return Ok(Some(orcid));
        }
    }

    debug!("no ORCID found for {}", username);
    Ok(None)
}

fn scan_profile(profile: &UserProfile) -> Option<String> {
    scan_value_for_orcid(&profile.raw).into_iter().next()
}

async fn scan_social_links<P>(platform: &P, username: &str) -> Result<Option<String>, Error>
where
    P: PlatformClient
{
    let accounts = platform.social_accounts(username).await?;
    Ok(scan_value_for_orcid(&accounts).into_iter().next())
}

/// Splits a display name into (given, family) tokens.
///
/// Middle tokens are dropped: the first whitespace token becomes the given
/// name and the last one the family name. A single-token name is used for
/// both. Compound surnames lose their leading particles, an accepted
/// approximation of the heuristic.
pub(crate) fn split_name(name: &str) -> Option<(String, String)> {
    let mut tokens = name.split_whitespace();
    let first = tokens.next()?;
    let last = tokens.last().unwrap_or(first);
    Some((first.to_string(), last.to_string()))
}

fn exact_query(given: &str, family: &str, organization: &str) -> String {
    format!(
        "given-names:{given} AND family-name:{family} AND affiliation-org-name:{organization}"
    )
}

fn broad_query(given: &str, family: &str) -> String {
    format!("given-names:{given} AND family-name:{family}")
}

async fn exact_search<R>(
    registry: &R,
    profile: &UserProfile,
    config: &ResolverConfig
) -> Result<Option<String>, Error>
where
    R: IdentityRegistry
{
    let Some(name) = profile.name.as_deref() else {
        return Ok(None);
    };
    let Some((given, family)) = split_name(name) else {
        return Ok(None);
    };
    let Some(organization) = profile.company.as_deref() else {
        return Ok(None);
    };

    let results = registry
        .search(&exact_query(&given, &family, organization), config.search_rows)
        .await?;

    // Anything other than exactly one hit is not a confident match.
    if results.num_found == 1 {
        if let Some(hit) = results.results.first() {
            return Ok(Some(hit.identifier.uri.clone()));
        }
    }

    Ok(None)
}

async fn broad_search<R>(
    registry: &R,
    profile: &UserProfile,
    config: &ResolverConfig
) -> Result<Option<String>, Error>
where
    R: IdentityRegistry
{
    let Some(name) = profile.name.as_deref() else {
        return Ok(None);
    };
    let Some((given, family)) = split_name(name) else {
        return Ok(None);
    };
    let Some(organization) = profile.company.as_deref() else {
        return Ok(None);
    };

    let results = registry
        .search(&broad_query(&given, &family), config.search_rows)
        .await?;

    if results.num_found > config.max_broad_results {
        warn!(
            "{} results found for {} {} without affiliation filter, too ambiguous to resolve",
            results.num_found, given, family
        );
        return Ok(None);
    }

    for hit in &results.results {
        // Pace detail fetches to respect the registry rate limit.
        sleep(Duration::from_millis(config.registry_delay_ms)).await;

        let Some(candidate) = registry.fetch_record(&hit.identifier.path).await? else {
            continue;
        };

        if affiliation_matches(&candidate, organization) {
            return Ok(Some(candidate.uri.clone()));
        }
    }

    Ok(None)
}

fn affiliation_matches(candidate: &IdentityCandidate, organization: &str) -> bool {
    candidate.affiliations.iter().any(|affiliation| {
        derive_acronym(affiliation) == organization || affiliation.as_str() == organization
    })
}
