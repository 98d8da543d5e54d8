//! Utilities for assembling CITATION.cff metadata for GitHub repositories.
//!
//! The library layers heuristics: authoritative metadata from the GitHub
//! REST API, contributor aggregation with per-author activity, researcher
//! identifier resolution against the public ORCID registry, and
//! documentation-scan fallbacks when the platform yields no usable author
//! data. All public APIs are documented with error semantics and minimal
//! examples to facilitate integration in automation tooling.

mod aggregator;
mod cff;
mod docscan;
mod error;
mod github;
mod orcid;
mod resolver;

pub use aggregator::{Contributor, aggregate_contributors};
pub use cff::{CFF_VERSION, CffAuthor, CffDocument, assemble_citation, write_citation};
pub use docscan::{AuthorCandidate, AuthorScan, PidLinkScan, SectionScan, default_scans};
pub use error::{Error, io_error};
pub use github::{
    ContributorEntry, ContributorStats, GithubPlatform, PlatformClient, RepositoryDetails,
    RepositoryLicense, RepositoryOwner, StatsAuthor, UserProfile, WeeklyStats,
};
pub use orcid::{
    IdentityCandidate, IdentityRegistry, OrcidIdentifier, OrcidRegistry, RegistrySearchResult,
    RegistrySearchResults, derive_acronym, extract_orcid_links, scan_value_for_orcid,
};
pub use resolver::{ResolverConfig, resolve_orcid};
