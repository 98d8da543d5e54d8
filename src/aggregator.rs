// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Contributor activity aggregation for a repository.
///
/// Joins the contributor listing with the repository-wide statistics payload
/// to annotate each contributor with total code volume and activity weeks.
use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::Error,
    github::{ContributorStats, PlatformClient}
};

/// A contributor annotated with aggregate activity.
///
/// Built per aggregation run and enriched in place with a resolved ORCID by
/// the assembler; never persisted independently.
#[derive(Debug, Clone, Serialize)]
pub struct Contributor {
    /// Account login.
    pub login:             String,
    /// Contribution count from the listing endpoint.
    pub contributions:     u64,
    /// Total additions plus deletions across all recorded weeks, absent when
    /// no statistics entry matched the login.
    pub volume:            Option<u64>,
    /// Week-start timestamps of weeks with nonzero additions or deletions.
    pub contributed_weeks: Vec<i64>,
    /// Resolved ORCID link, filled in by the assembler.
    pub orcid:             Option<String>
}

impl std::fmt::Display for Contributor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.volume {
            Some(volume) => write!(f, "{} ({} contributions, {} lines)", self.login, self.contributions, volume),
            None => write!(f, "{} ({} contributions)", self.login, self.contributions)
        }
    }
}

/// Aggregates contributors for a repository in native listing order.
///
/// The statistics payload covers every author, so it is fetched once and
/// indexed by login instead of being re-fetched per contributor. A
/// contributor without a matching statistics entry keeps an absent volume
/// and empty week list; one unmatched login never fails the batch.
///
/// # Arguments
///
/// * `platform` - Hosting platform client
/// * `owner` - Repository owner
/// * `repo` - Repository name
///
/// # Errors
///
/// Returns [`Error`] only when the platform client itself fails; empty
/// upstream responses produce an empty aggregation.
///
/// # Example
///
/// ```no_run
/// use cffgen::{GithubPlatform, aggregate_contributors};
///
/// # async fn example() -> Result<(), cffgen::Error> {
/// let platform = GithubPlatform::new(None)?;
/// let contributors = aggregate_contributors(&platform, "octocat", "hello-world").await?;
/// for contributor in &contributors {
///     println!("{}", contributor);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn aggregate_contributors<P>(
    platform: &P,
    owner: &str,
    repo: &str
) -> Result<Vec<Contributor>, Error>
where
    P: PlatformClient
{
    debug!("Aggregating contributors for {}/{}", owner, repo);

    let entries = platform.contributors(owner, repo).await?;
    let stats = platform.contributor_stats(owner, repo).await?;

    let by_login: HashMap<&str, &ContributorStats> =
        stats.iter().map(|stat| (stat.author.login.as_str(), stat)).collect();

    let mut contributors = Vec::with_capacity(entries.len());

    for entry in &entries {
        if entry.login.is_empty() {
            debug!("skipping anonymous contributor entry for {}/{}", owner, repo);
            continue;
        }

        let mut contributor = Contributor {
            login:             entry.login.clone(),
            contributions:     entry.contributions,
            volume:            None,
            contributed_weeks: Vec::new(),
            orcid:             None
        };

        match by_login.get(entry.login.as_str()) {
            Some(stat) => {
                let additions: u64 = stat.weeks.iter().map(|week| week.a).sum();
                let deletions: u64 = stat.weeks.iter().map(|week| week.d).sum();
                contributor.volume = Some(additions + deletions);
                contributor.contributed_weeks = stat
                    .weeks
                    .iter()
                    .filter(|week| week.a > 0 || week.d > 0)
                    .map(|week| week.w)
                    .collect();
            }
            None => {
                debug!("no statistics entry for contributor {}", entry.login);
            }
        }

        contributors.push(contributor);
    }

    info!("Aggregated {} contributors for {}/{}", contributors.len(), owner, repo);

    Ok(contributors)
}
