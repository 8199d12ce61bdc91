use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use quiz_core::model::QuizId;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::repository::{ProgressRepository, QuizSourceRepository, StorageError};

const USER_AGENT: &str = concat!("quiz-app/", env!("CARGO_PKG_VERSION"));

/// Where quiz files live in a GitHub repository and how to authenticate.
#[derive(Clone)]
pub struct GithubConfig {
    pub api_base_url: String,
    /// `owner/name`
    pub repo: String,
    pub branch: String,
    pub token: String,
    /// Directory inside the repository holding sources and progress files.
    pub data_dir: String,
}

impl GithubConfig {
    #[must_use]
    pub fn new(repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base_url: "https://api.github.com".into(),
            repo: repo.into(),
            branch: "main".into(),
            token: token.into(),
            data_dir: "data".into(),
        }
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_base_url", &self.api_base_url)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

/// Quiz files stored through the GitHub contents API.
///
/// Every progress write is a commit on `branch`.
#[derive(Clone)]
pub struct GithubRepository {
    client: Client,
    config: GithubConfig,
}

#[derive(Debug, Deserialize)]
struct FileContent {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct DirEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct PutContent<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

impl GithubRepository {
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the HTTP client cannot be built.
    pub fn new(config: GithubConfig) -> Result<Self, StorageError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn contents_url(&self, file_name: Option<&str>) -> Result<Url, StorageError> {
        contents_url(&self.config, file_name)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response, StorageError> {
        let response = self
            .client
            .get(url)
            .query(&[("ref", self.config.branch.as_str())])
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        check_status(response.status())?;
        Ok(response)
    }

    async fn fetch_file(&self, file_name: &str) -> Result<FileContent, StorageError> {
        let url = self.contents_url(Some(file_name))?;
        self.get(url)
            .await?
            .json::<FileContent>()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn get_file(&self, file_name: &str) -> Result<Option<FileContent>, StorageError> {
        existing_file(self.fetch_file(file_name).await)
    }
}

#[async_trait]
impl QuizSourceRepository for GithubRepository {
    async fn list_sources(&self) -> Result<Vec<QuizId>, StorageError> {
        let url = self.contents_url(None)?;
        let entries = self
            .get(url)
            .await?
            .json::<Vec<DirEntry>>()
            .await
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let mut ids: Vec<QuizId> = entries
            .iter()
            .filter(|entry| entry.kind == "file")
            .filter_map(|entry| QuizId::from_source_file_name(&entry.name))
            .collect();
        ids.sort();
        Ok(ids)
    }

    async fn read_source(&self, quiz_id: &QuizId) -> Result<String, StorageError> {
        let file = self
            .get_file(&quiz_id.source_file_name())
            .await?
            .ok_or(StorageError::NotFound)?;
        let bytes = decode_content(&file.content)?;
        String::from_utf8(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl ProgressRepository for GithubRepository {
    async fn read_snapshot(&self, quiz_id: &QuizId) -> Result<Option<Vec<u8>>, StorageError> {
        match self.get_file(&quiz_id.progress_file_name()).await? {
            Some(file) => Ok(Some(decode_content(&file.content)?)),
            None => Ok(None),
        }
    }

    async fn write_snapshot(&self, quiz_id: &QuizId, content: &[u8]) -> Result<(), StorageError> {
        let file_name = quiz_id.progress_file_name();
        let lookup = self.fetch_file(&file_name).await;
        let body = snapshot_put(&file_name, content, &self.config.branch, lookup)?;

        let response = self
            .client
            .put(self.contents_url(Some(&file_name))?)
            .bearer_auth(&self.config.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        check_status(response.status())?;

        debug!(quiz = %quiz_id, repo = %self.config.repo, message = %body.message, "progress committed");
        Ok(())
    }
}

fn contents_url(config: &GithubConfig, file_name: Option<&str>) -> Result<Url, StorageError> {
    let mut url = Url::parse(&config.api_base_url)
        .map_err(|e| StorageError::Connection(format!("invalid api url: {e}")))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| StorageError::Connection("api url cannot be a base".into()))?;
        segments.pop_if_empty().push("repos");
        segments.extend(config.repo.split('/').filter(|part| !part.is_empty()));
        segments.push("contents");
        segments.extend(config.data_dir.split('/').filter(|part| !part.is_empty()));
        if let Some(name) = file_name {
            segments.push(name);
        }
    }
    Ok(url)
}

fn check_status(status: StatusCode) -> Result<(), StorageError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND => Err(StorageError::NotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StorageError::Unauthorized),
        other => Err(StorageError::Connection(format!("unexpected status {other}"))),
    }
}

/// The contents API wraps base64 at 60 columns.
fn decode_content(encoded: &str) -> Result<Vec<u8>, StorageError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}

/// A missing file is an absent one, not a failure.
fn existing_file(
    lookup: Result<FileContent, StorageError>,
) -> Result<Option<FileContent>, StorageError> {
    match lookup {
        Ok(file) => Ok(Some(file)),
        Err(StorageError::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

/// PUT body replacing `file_name`, given the lookup of its current version.
/// An existing file is updated against its `sha`; a missing one is created.
fn snapshot_put<'a>(
    file_name: &str,
    content: &[u8],
    branch: &'a str,
    lookup: Result<FileContent, StorageError>,
) -> Result<PutContent<'a>, StorageError> {
    let sha = existing_file(lookup)?.map(|file| file.sha);
    Ok(put_body(file_name, content, branch, sha))
}

fn put_body<'a>(
    file_name: &str,
    content: &[u8],
    branch: &'a str,
    sha: Option<String>,
) -> PutContent<'a> {
    let verb = if sha.is_some() { "Update" } else { "Create" };
    PutContent {
        message: format!("{verb} {file_name}"),
        content: STANDARD.encode(content),
        branch,
        sha,
    }
}
