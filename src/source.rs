//! Configuration source selection and validation.
//!
//! The flake holding the user configuration comes from exactly one of two
//! places: a direct URL or a GitHub `owner/repo` reference. `ConfigSource`
//! can only be built through [`ConfigSource::select`], so a value
//! representing "both" or "neither" cannot exist.

use url::Url;

use crate::errors::SetupError;

/// Where the user-configuration flake lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Direct HTTP(S) URL to a repository.
    Url(String),
    /// GitHub repository reference.
    GithubRepo { owner: String, repo: String },
}

impl ConfigSource {
    /// Build the source from the two mutually exclusive CLI candidates.
    ///
    /// Validation happens before any remote side effect: malformed candidates
    /// fail with `InvalidFormat`, both-present with `ConflictingSources`,
    /// neither with `MissingSource`.
    pub fn select(
        url_candidate: Option<&str>,
        github_candidate: Option<&str>,
    ) -> Result<Self, SetupError> {
        // An empty candidate counts as absent.
        let url_candidate = url_candidate.map(str::trim).filter(|s| !s.is_empty());
        let github_candidate = github_candidate.map(str::trim).filter(|s| !s.is_empty());
        match (url_candidate, github_candidate) {
            (Some(_), Some(_)) => Err(SetupError::ConflictingSources),
            (None, None) => Err(SetupError::MissingSource),
            (Some(raw), None) => {
                if is_valid_http_url(raw) {
                    Ok(ConfigSource::Url(raw.to_string()))
                } else {
                    Err(SetupError::InvalidFormat(format!("invalid URL: {raw}")))
                }
            }
            (None, Some(raw)) => match raw.split_once('/') {
                Some((owner, repo))
                    if is_valid_repo_segment(owner) && is_valid_repo_segment(repo) =>
                {
                    Ok(ConfigSource::GithubRepo {
                        owner: owner.to_string(),
                        repo: repo.to_string(),
                    })
                }
                _ => Err(SetupError::InvalidFormat(format!(
                    "invalid GitHub repo format: {raw} (use owner/repo)"
                ))),
            },
        }
    }

    /// Render the Nix flake input reference used by the final apply step.
    pub fn flake_ref(&self) -> String {
        match self {
            ConfigSource::Url(url) => url.clone(),
            ConfigSource::GithubRepo { owner, repo } => format!("github:{owner}/{repo}"),
        }
    }
}

/// Accept `http(s)://host/...` where the host has at least one dot and ends
/// in an alphabetic label of two or more letters.
fn is_valid_http_url(raw: &str) -> bool {
    let parsed = match Url::parse(raw) {
        Ok(u) => u,
        Err(_) => return false,
    };
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }
    let host = match parsed.host_str() {
        Some(h) => h,
        None => return false,
    };
    match host.rsplit_once('.') {
        Some((name, tld)) => {
            !name.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

fn is_valid_repo_segment(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
