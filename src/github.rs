// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GitHub REST API client for repository and user metadata.
///
/// Wraps the endpoints consumed by the citation assembler: repository
/// details, contributor listing, per-contributor weekly statistics, user
/// profiles, declared social accounts and the repository README.
use masterror::AppError;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;

/// Read access to the hosting platform consumed by the assembler.
///
/// Implementations issue one HTTP GET per operation. The error contract is
/// deliberately asymmetric: [`PlatformClient::user_profile`] is an existence
/// check and fails fast with [`Error::UserNotFound`] on any non-success
/// status, while every other operation is a data-enrichment lookup that
/// degrades to an empty or absent result instead of failing.
#[allow(async_fn_in_trait)]
pub trait PlatformClient {
    /// Fetches repository details, or `None` when the lookup fails.
    async fn repository(&self, owner: &str, repo: &str)
    -> Result<Option<RepositoryDetails>, Error>;

    /// Lists contributors in the platform's native ordering.
    async fn contributors(&self, owner: &str, repo: &str) -> Result<Vec<ContributorEntry>, Error>;

    /// Fetches repository-wide per-author weekly statistics.
    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str
    ) -> Result<Vec<ContributorStats>, Error>;

    /// Fetches a user profile, failing with [`Error::UserNotFound`] when the
    /// user does not exist.
    async fn user_profile(&self, username: &str) -> Result<UserProfile, Error>;

    /// Fetches a user's declared social accounts as a raw JSON payload.
    async fn social_accounts(&self, username: &str) -> Result<Value, Error>;

    /// Fetches the repository README as decoded text, or `None` when absent.
    async fn readme(&self, owner: &str, repo: &str) -> Result<Option<String>, Error>;
}

/// Repository details sourced verbatim from the GitHub API.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryDetails {
    /// Repository name without the owner prefix.
    pub name:        String,
    /// Owner account information.
    pub owner:       RepositoryOwner,
    /// Free-form repository description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared license, when one is detected by the platform.
    #[serde(default)]
    pub license:     Option<RepositoryLicense>,
    /// Browser URL of the repository.
    pub html_url:    String,
    /// Creation timestamp as reported by the API.
    #[serde(default)]
    pub created_at:  Option<String>,
    /// Last update timestamp as reported by the API.
    #[serde(default)]
    pub updated_at:  Option<String>
}

/// Owner information embedded in repository details.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryOwner {
    /// Account login of the owner.
    pub login: String
}

/// License information embedded in repository details.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryLicense {
    /// SPDX identifier, e.g. `MIT`.
    #[serde(default)]
    pub spdx_id: Option<String>,
    /// Human readable license name.
    #[serde(default)]
    pub name:    Option<String>
}

/// A single entry from the contributor-listing endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorEntry {
    /// Account login. Anonymous entries deserialize to an empty login and
    /// are skipped during aggregation.
    #[serde(default)]
    pub login:         String,
    /// Total contribution count reported by the listing endpoint.
    #[serde(default)]
    pub contributions: u64
}

/// Per-author statistics entry from the statistics endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorStats {
    /// Author the weekly samples belong to.
    pub author: StatsAuthor,
    /// Weekly activity samples covering the repository history.
    #[serde(default)]
    pub weeks:  Vec<WeeklyStats>
}

/// Author information embedded in a statistics entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsAuthor {
    /// Account login of the author.
    pub login: String
}

/// One week of contribution activity.
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyStats {
    /// Week start as a Unix timestamp.
    pub w: i64,
    /// Lines added during the week.
    #[serde(default)]
    pub a: u64,
    /// Lines deleted during the week.
    #[serde(default)]
    pub d: u64,
    /// Commits authored during the week.
    #[serde(default)]
    pub c: u64
}

/// User profile with typed fields plus the raw payload.
///
/// The raw payload is retained because identifier resolution scans the
/// decoded string values of the whole profile, not just the typed fields.
#[derive(Debug, Clone)]
pub struct UserProfile {
    /// Account login.
    pub login:   String,
    /// Display name declared by the user.
    pub name:    Option<String>,
    /// Organization declared by the user, often an acronym.
    pub company: Option<String>,
    /// Full profile payload as returned by the API.
    pub raw:     Value
}

impl UserProfile {
    /// Builds a profile from the raw API payload.
    ///
    /// # Parameters
    ///
    /// * `username` - Login used for the lookup, kept as a fallback when the
    ///   payload omits it.
    /// * `raw` - Profile payload as returned by the API.
    pub fn from_payload(username: &str, raw: Value) -> Self {
        let login = raw
            .get("login")
            .and_then(Value::as_str)
            .unwrap_or(username)
            .to_string();
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);
        let company = raw
            .get("company")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            login,
            name,
            company,
            raw
        }
    }
}

/// GitHub-backed implementation of [`PlatformClient`].
pub struct GithubPlatform {
    octocrab: Octocrab
}

impl GithubPlatform {
    /// Creates a client, optionally authenticated with a personal token.
    ///
    /// # Arguments
    ///
    /// * `token` - GitHub personal access token; anonymous access is used
    ///   when absent, at the cost of a much smaller rate-limit budget.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the underlying client cannot be built.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cffgen::GithubPlatform;
    ///
    /// # fn example() -> Result<(), masterror::AppError> {
    /// let platform = GithubPlatform::new(Some("ghp_token"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(token: Option<&str>) -> Result<Self, AppError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token);
        }
        let octocrab = builder
            .build()
            .map_err(|e| AppError::unauthorized(format!("failed to initialize GitHub client: {e}")))?;

        Ok(Self {
            octocrab
        })
    }
}

impl PlatformClient for GithubPlatform {
    async fn repository(
        &self,
        owner: &str,
        repo: &str
    ) -> Result<Option<RepositoryDetails>, Error> {
        debug!("Fetching repository details for {}/{}", owner, repo);
        let fetched: Result<RepositoryDetails, octocrab::Error> = self
            .octocrab
            .get(format!("/repos/{owner}/{repo}"), None::<&()>)
            .await;

        match fetched {
            Ok(details) => Ok(Some(details)),
            Err(error) => {
                debug!("repository lookup for {}/{} failed: {}", owner, repo, error);
                Ok(None)
            }
        }
    }

    async fn contributors(&self, owner: &str, repo: &str) -> Result<Vec<ContributorEntry>, Error> {
        debug!("Fetching contributor list for {}/{}", owner, repo);
        let fetched: Result<Vec<ContributorEntry>, octocrab::Error> = self
            .octocrab
            .get(format!("/repos/{owner}/{repo}/contributors"), None::<&()>)
            .await;

        match fetched {
            Ok(entries) => Ok(entries),
            Err(error) => {
                debug!("contributor listing for {}/{} failed: {}", owner, repo, error);
                Ok(Vec::new())
            }
        }
    }

    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str
    ) -> Result<Vec<ContributorStats>, Error> {
        debug!("Fetching contributor stats for {}/{}", owner, repo);
        // The statistics endpoint responds 202 with an empty body while
        // GitHub computes the payload; that surfaces as a decode error and
        // degrades to an empty result like any other non-200.
        let fetched: Result<Vec<ContributorStats>, octocrab::Error> = self
            .octocrab
            .get(format!("/repos/{owner}/{repo}/stats/contributors"), None::<&()>)
            .await;

        match fetched {
            Ok(stats) => Ok(stats),
            Err(error) => {
                debug!("contributor stats for {}/{} failed: {}", owner, repo, error);
                Ok(Vec::new())
            }
        }
    }

    async fn user_profile(&self, username: &str) -> Result<UserProfile, Error> {
        debug!("Fetching profile for {}", username);
        let fetched: Result<Value, octocrab::Error> = self
            .octocrab
            .get(format!("/users/{username}"), None::<&()>)
            .await;

        match fetched {
            Ok(raw) => Ok(UserProfile::from_payload(username, raw)),
            Err(error) => {
                debug!("profile lookup for {} failed: {}", username, error);
                Err(Error::user_not_found(username))
            }
        }
    }

    async fn social_accounts(&self, username: &str) -> Result<Value, Error> {
        debug!("Fetching social accounts for {}", username);
        let fetched: Result<Value, octocrab::Error> = self
            .octocrab
            .get(format!("/users/{username}/social_accounts"), None::<&()>)
            .await;

        match fetched {
            Ok(payload) => Ok(payload),
            Err(error) => {
                debug!("social accounts lookup for {} failed: {}", username, error);
                Ok(Value::Null)
            }
        }
    }

    async fn readme(&self, owner: &str, repo: &str) -> Result<Option<String>, Error> {
        debug!("Fetching README for {}/{}", owner, repo);
        let fetched: Result<octocrab::models::repos::Content, octocrab::Error> = self
            .octocrab
            .get(format!("/repos/{owner}/{repo}/readme"), None::<&()>)
            .await;

        match fetched {
            Ok(content) => Ok(content.decoded_content()),
            Err(error) => {
                debug!("README lookup for {}/{} failed: {}", owner, repo, error);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn repository_details_deserialize_from_api_payload() {
        let payload = json!({
            "name": "hello-world",
            "full_name": "octocat/hello-world",
            "owner": {"login": "octocat"},
            "description": "My first repository",
            "license": {"spdx_id": "MIT", "name": "MIT License"},
            "html_url": "https://github.com/octocat/hello-world",
            "created_at": "2011-01-26T19:01:12Z",
            "updated_at": "2023-05-18T10:00:00Z"
        });

        let details: RepositoryDetails =
            serde_json::from_value(payload).expect("deserialization failed");
        assert_eq!(details.name, "hello-world");
        assert_eq!(details.owner.login, "octocat");
        assert_eq!(details.license.expect("license").spdx_id.as_deref(), Some("MIT"));
        assert_eq!(details.updated_at.as_deref(), Some("2023-05-18T10:00:00Z"));
    }

    #[test]
    fn repository_details_tolerate_missing_optionals() {
        let payload = json!({
            "name": "bare",
            "owner": {"login": "someone"},
            "html_url": "https://github.com/someone/bare"
        });

        let details: RepositoryDetails =
            serde_json::from_value(payload).expect("deserialization failed");
        assert!(details.description.is_none());
        assert!(details.license.is_none());
        assert!(details.created_at.is_none());
    }

    #[test]
    fn contributor_stats_deserialize_weekly_samples() {
        let payload = json!([{
            "author": {"login": "alice"},
            "total": 20,
            "weeks": [
                {"w": 1367712000, "a": 100, "d": 30, "c": 5},
                {"w": 1368316800, "a": 0, "d": 0, "c": 0}
            ]
        }]);

        let stats: Vec<ContributorStats> =
            serde_json::from_value(payload).expect("deserialization failed");
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].author.login, "alice");
        assert_eq!(stats[0].weeks.len(), 2);
        assert_eq!(stats[0].weeks[0].a, 100);
        assert_eq!(stats[0].weeks[1].w, 1368316800);
    }

    #[test]
    fn contributor_entry_defaults_anonymous_login_to_empty() {
        let payload = json!([{"type": "Anonymous", "contributions": 3}]);

        let entries: Vec<ContributorEntry> =
            serde_json::from_value(payload).expect("deserialization failed");
        assert_eq!(entries[0].login, "");
        assert_eq!(entries[0].contributions, 3);
    }

    #[test]
    fn user_profile_extracts_typed_fields() {
        let raw = json!({
            "login": "researcher",
            "name": "Jane Q Doe",
            "company": "MIT",
            "bio": "works on things"
        });

        let profile = UserProfile::from_payload("researcher", raw);
        assert_eq!(profile.login, "researcher");
        assert_eq!(profile.name.as_deref(), Some("Jane Q Doe"));
        assert_eq!(profile.company.as_deref(), Some("MIT"));
    }

    #[test]
    fn user_profile_falls_back_to_lookup_login() {
        let profile = UserProfile::from_payload("fallback", json!({"name": null}));
        assert_eq!(profile.login, "fallback");
        assert!(profile.name.is_none());
        assert!(profile.company.is_none());
    }
}
