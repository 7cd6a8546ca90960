//! Blocking GitHub REST client.
//!
//! Endpoints used:
//!
//! | Operation              | Endpoint                                      |
//! |------------------------|-----------------------------------------------|
//! | `list_open_proposals`  | `GET /repos/{owner}/{repo}/pulls?state=open`  |
//! | `get_proposal`         | `GET /repos/{owner}/{repo}/pulls/{number}`    |
//! | `get_file_content`     | `GET /repos/{owner}/{repo}/contents/{path}`   |
//! | `list_changed_files`   | `GET /repos/{owner}/{repo}/pulls/{number}/files` |
//! | `create_status`        | `POST /repos/{owner}/{repo}/statuses/{sha}`   |

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use haltgate_core::{ChangedFile, Proposal, ProposalNumber, RepoSlug, Settings, StatusUpdate};

use crate::error::GitHubError;
use crate::host::CodeHost;

const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("haltgate/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: usize = 100;
const MAX_PAGES: u32 = 100;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PullRequestWire {
    number: u64,
    head: HeadWire,
    base: BaseWire,
}

#[derive(Debug, Deserialize)]
struct HeadWire {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BaseWire {
    #[serde(rename = "ref")]
    git_ref: String,
}

impl From<PullRequestWire> for Proposal {
    fn from(pr: PullRequestWire) -> Self {
        Proposal {
            number: ProposalNumber(pr.number),
            head_sha: pr.head.sha,
            base_ref: pr.base.git_ref,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// [`CodeHost`] implementation for one GitHub repository.
pub struct GitHubClient {
    agent: ureq::Agent,
    api_base_url: String,
    repo: RepoSlug,
    token: String,
}

impl GitHubClient {
    pub fn new(
        api_base_url: impl Into<String>,
        repo: RepoSlug,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            repo,
            token: token.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.api_base_url.clone(),
            settings.repository.clone(),
            settings.auth_token.clone(),
            settings.request_timeout,
        )
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base_url,
            encode_segment(&self.repo.owner),
            encode_segment(&self.repo.name),
            suffix
        )
    }

    fn request(&self, method: &'static str, url: &str, accept: &str) -> ureq::Request {
        self.agent
            .request(method, url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", accept)
            .set("X-GitHub-Api-Version", API_VERSION)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GitHubError> {
        debug!(url, "GET");
        let mut request = self.request("GET", url, ACCEPT_JSON);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request
            .call()
            .map_err(|err| GitHubError::from_ureq("GET", url, err))?;
        response.into_json().map_err(|source| GitHubError::Decode {
            url: url.to_string(),
            source,
        })
    }

    /// Follows `page=N` until a short page comes back.
    fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, GitHubError> {
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();
        for page in 1..=MAX_PAGES {
            let page = page.to_string();
            let mut params = query.to_vec();
            params.push(("per_page", per_page.as_str()));
            params.push(("page", page.as_str()));
            let batch: Vec<T> = self.get_json(url, &params)?;
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                break;
            }
        }
        Ok(items)
    }
}

impl CodeHost for GitHubClient {
    fn list_open_proposals(&self) -> Result<Vec<Proposal>, GitHubError> {
        let url = self.repo_url("pulls");
        let pulls: Vec<PullRequestWire> = self.get_paginated(&url, &[("state", "open")])?;
        Ok(pulls.into_iter().map(Proposal::from).collect())
    }

    fn get_proposal(&self, number: ProposalNumber) -> Result<Proposal, GitHubError> {
        let url = self.repo_url(&format!("pulls/{}", number.0));
        let pull: PullRequestWire = self.get_json(&url, &[])?;
        Ok(pull.into())
    }

    fn get_file_content(&self, path: &str, git_ref: &str) -> Result<Option<String>, GitHubError> {
        let url = self.repo_url(&format!("contents/{}", encode_path(path)));
        debug!(url = %url, git_ref, "GET raw content");
        let result = self
            .request("GET", &url, ACCEPT_RAW)
            .query("ref", git_ref)
            .call()
            .map_err(|err| GitHubError::from_ureq("GET", &url, err));
        match result {
            Ok(response) => response
                .into_string()
                .map(Some)
                .map_err(|source| GitHubError::Decode { url, source }),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn list_changed_files(&self, number: ProposalNumber) -> Result<Vec<ChangedFile>, GitHubError> {
        let url = self.repo_url(&format!("pulls/{}/files", number.0));
        self.get_paginated(&url, &[])
    }

    fn create_status(&self, update: &StatusUpdate) -> Result<(), GitHubError> {
        let url = self.repo_url(&format!("statuses/{}", encode_segment(&update.commit_sha)));
        let mut body = json!({
            "state": update.state.as_str(),
            "context": update.check_name,
            "description": update.description,
        });
        if let Some(target_url) = &update.target_url {
            body["target_url"] = json!(target_url);
        }
        debug!(url = %url, proposal = update.proposal.0, state = %update.state, "POST status");
        self.request("POST", &url, ACCEPT_JSON)
            .send_json(body)
            .map_err(|err| GitHubError::from_ureq("POST", &url, err))?;
        Ok(())
    }
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("api_base_url", &self.api_base_url)
            .field("repo", &self.repo)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// URL helpers
// ---------------------------------------------------------------------------

/// Percent-encodes one path segment (RFC 3986 unreserved characters pass).
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Encodes a repository file path, keeping `/` separators.
fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}
