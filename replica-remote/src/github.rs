//! GitHub REST realization of [`PlatformAdapter`].
//!
//! Creation and import are two calls: the empty repository is created under
//! the owner, then the source importer is started with the origin's plain
//! clone URL and credentials.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

use replica_core::{
    ConfigError, ImportStatus, Platform, ProjectConfig, ProjectName, RemoteProject, Secret,
    Visibility,
};

use crate::adapter::{FileWrite, PlatformAdapter, RemoteFile};
use crate::auth::ImportSource;
use crate::error::{RemoteError, TransportError};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};

const PER_PAGE: usize = 100;
const API_VERSION: &str = "2022-11-28";

/// Importer states that end the import unsuccessfully.
const FAILED_STATES: &[&str] = &[
    "error",
    "auth_failed",
    "detection_found_nothing",
    "detection_needs_auth",
];

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubSettings {
    /// REST root, `https://api.github.com` unless overridden.
    pub api_url: String,
    /// Organization or user owning both origin and destination.
    pub owner: String,
    pub visibility: Visibility,
}

impl GitHubSettings {
    pub fn from_config(project: &ProjectConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: project.github_api_url.trim().to_string(),
            owner: project.github_owner()?.to_string(),
            visibility: project.github_visibility,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GhRepo {
    id: u64,
    name: String,
    full_name: String,
    clone_url: String,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
}

impl From<GhRepo> for RemoteProject {
    fn from(r: GhRepo) -> Self {
        RemoteProject {
            id: r.id,
            name: ProjectName::from(r.name),
            full_path: r.full_name,
            clone_url: r.clone_url,
            web_url: r.html_url,
            default_branch: r.default_branch,
            import_status: ImportStatus::None,
            import_error: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct GhImport {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    status_text: Option<String>,
    #[serde(default)]
    failed_step: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl GhImport {
    fn error_detail(&self) -> Option<String> {
        if import_status(self.status.as_deref()) != ImportStatus::Failed {
            return None;
        }
        let status = self.status.as_deref().unwrap_or_default();
        let reason = self
            .status_text
            .as_deref()
            .or(self.message.as_deref())
            .or(self.failed_step.as_deref())
            .filter(|s| !s.trim().is_empty());
        Some(match reason {
            Some(reason) => format!("{status}: {reason}"),
            None => status.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GhContent {
    sha: String,
    #[serde(default)]
    content: Option<String>,
}

/// Map the importer's `status` onto [`ImportStatus`].
pub fn import_status(raw: Option<&str>) -> ImportStatus {
    match raw.map(str::trim) {
        None | Some("") => ImportStatus::None,
        Some("complete") | Some("imported") => ImportStatus::Finished,
        Some(s) if FAILED_STATES.contains(&s) => ImportStatus::Failed,
        Some(_) => ImportStatus::InProgress,
    }
}

/// Percent-encode each segment of a repository path, keeping `/`.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct GitHubAdapter<T: Transport = UreqTransport> {
    transport: T,
    settings: GitHubSettings,
    token: Secret,
}

impl GitHubAdapter<UreqTransport> {
    pub fn new(settings: GitHubSettings, token: Secret) -> Self {
        Self::with_transport(settings, token, UreqTransport::new())
    }
}

impl<T: Transport> GitHubAdapter<T> {
    pub fn with_transport(settings: GitHubSettings, token: Secret, transport: T) -> Self {
        Self {
            transport,
            settings,
            token,
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}{path}", self.settings.api_url.trim_end_matches('/'))
    }

    fn owner(&self) -> String {
        urlencoding::encode(&self.settings.owner).into_owned()
    }

    fn repo_url(&self, repo: &str) -> String {
        self.api(&format!("/repos/{}/{}", self.owner(), urlencoding::encode(repo)))
    }

    fn contents_url(&self, project: &RemoteProject, path: &str) -> String {
        format!("{}/contents/{}", self.repo_url(project.name.as_str()), encode_path(path))
    }

    fn request(&self, method: Method, url: String) -> ApiRequest {
        ApiRequest::new(method, url)
            .header("Authorization", format!("Bearer {}", self.token.expose()))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.transport.send(&request)
    }

    /// Page through `/orgs/:owner/repos` or `/users/:owner/repos`.
    fn list_under(&self, kind: &str) -> Result<Option<Vec<RemoteProject>>, RemoteError> {
        let list_err = |detail: String| RemoteError::List {
            scope: self.scope(),
            detail,
        };
        let mut repos = Vec::new();
        let mut page = 1;
        loop {
            let url = self.api(&format!(
                "/{kind}/{}/repos?per_page={PER_PAGE}&page={page}",
                self.owner()
            ));
            let response = self
                .send(self.request(Method::Get, url))
                .map_err(|e| list_err(e.to_string()))?;
            if page == 1 && response.is_not_found() {
                return Ok(None);
            }
            if !response.is_success() {
                return Err(list_err(response.describe()));
            }
            let batch: Vec<GhRepo> = response.json()?;
            let full_page = batch.len() >= PER_PAGE;
            repos.extend(batch.into_iter().map(RemoteProject::from));
            if !full_page {
                break;
            }
            page += 1;
        }
        Ok(Some(repos))
    }

    /// `POST /orgs/:owner/repos`, falling back to `/user/repos` when the
    /// owner is not an organization.
    fn create_repo(&self, new_name: &str) -> Result<RemoteProject, RemoteError> {
        let create_err = |detail: String| RemoteError::Create {
            name: new_name.to_string(),
            detail,
        };
        let body = json!({
            "name": new_name,
            "private": self.settings.visibility != Visibility::Public,
            "auto_init": false,
        });

        let org_url = self.api(&format!("/orgs/{}/repos", self.owner()));
        let mut response = self
            .send(self.request(Method::Post, org_url).json(body.clone()))
            .map_err(|e| create_err(e.to_string()))?;
        if response.is_not_found() {
            tracing::debug!(owner = %self.settings.owner, "owner is not an organization");
            response = self
                .send(self.request(Method::Post, self.api("/user/repos")).json(body))
                .map_err(|e| create_err(e.to_string()))?;
        }
        if !response.is_success() {
            return Err(create_err(response.describe()));
        }
        Ok(response.json::<GhRepo>()?.into())
    }

    fn write_contents(
        &self,
        project: &RemoteProject,
        write: FileWrite<'_>,
        sha: Option<&str>,
    ) -> Result<(), RemoteError> {
        let write_err = |detail: String| RemoteError::Write {
            path: write.path.to_string(),
            detail,
        };
        let mut body = json!({
            "message": write.message,
            "content": STANDARD.encode(write.content.as_bytes()),
            "branch": write.branch,
        });
        if let (Some(sha), Value::Object(map)) = (sha, &mut body) {
            map.insert("sha".to_string(), Value::String(sha.to_string()));
        }
        let url = self.contents_url(project, write.path);
        let response = self
            .send(self.request(Method::Put, url).json(body))
            .map_err(|e| write_err(e.to_string()))?;
        if !response.is_success() {
            return Err(write_err(response.describe()));
        }
        Ok(())
    }
}

impl<T: Transport> PlatformAdapter for GitHubAdapter<T> {
    fn platform(&self) -> Platform {
        Platform::GitHub
    }

    fn scope(&self) -> String {
        format!("GitHub owner {}", self.settings.owner)
    }

    fn list_projects(&self) -> Result<Vec<RemoteProject>, RemoteError> {
        let repos = match self.list_under("orgs")? {
            Some(repos) => repos,
            None => self.list_under("users")?.ok_or_else(|| RemoteError::List {
                scope: self.scope(),
                detail: "owner not found".to_string(),
            })?,
        };
        tracing::debug!(count = repos.len(), scope = %self.scope(), "listed repositories");
        Ok(repos)
    }

    /// `GET /repos/:owner/:name`. Owner listings of personal accounts omit
    /// private repositories, so the origin is looked up directly.
    fn resolve_project_by_name(&self, name: &str) -> Result<RemoteProject, RemoteError> {
        let wanted = name.trim();
        let response = self
            .send(self.request(Method::Get, self.repo_url(wanted)))
            .map_err(|e| RemoteError::List {
                scope: self.scope(),
                detail: e.to_string(),
            })?;
        if response.is_not_found() {
            return Err(RemoteError::OriginNotFound {
                name: wanted.to_string(),
                scope: self.scope(),
            });
        }
        if !response.is_success() {
            return Err(RemoteError::List {
                scope: self.scope(),
                detail: response.describe(),
            });
        }
        Ok(response.json::<GhRepo>()?.into())
    }

    fn create_and_import(
        &self,
        new_name: &str,
        source: &ImportSource,
        _default_branch: &str,
    ) -> Result<RemoteProject, RemoteError> {
        let mut project = self.create_repo(new_name)?;
        tracing::info!(project = %project.full_path, "created GitHub repository");

        let create_err = |detail: String| RemoteError::Create {
            name: new_name.to_string(),
            detail: format!("starting import: {detail}"),
        };
        let body = json!({
            "vcs": "git",
            "vcs_url": source.clone_url,
            "vcs_username": source.username,
            "vcs_password": source.token.expose(),
        });
        let url = format!("{}/import", self.repo_url(new_name));
        let response = self
            .send(self.request(Method::Put, url).json(body))
            .map_err(|e| create_err(e.to_string()))?;
        if !matches!(response.status, 201 | 202) {
            return Err(create_err(response.describe()));
        }
        let started: GhImport = response.json()?;
        project.import_status = match import_status(started.status.as_deref()) {
            ImportStatus::None => ImportStatus::InProgress,
            status => status,
        };
        project.import_error = started.error_detail();
        Ok(project)
    }

    fn import_status(&self, project: &RemoteProject) -> Result<RemoteProject, RemoteError> {
        let url = format!("{}/import", self.repo_url(project.name.as_str()));
        let response = self.send(self.request(Method::Get, url))?;
        if !response.is_success() {
            return Err(RemoteError::Status {
                project: project.name.to_string(),
                detail: response.describe(),
            });
        }
        let import: GhImport = if response.body.trim().is_empty() {
            GhImport::default()
        } else {
            response.json()?
        };
        let mut current = project.clone();
        current.import_status = import_status(import.status.as_deref());
        current.import_error = import.error_detail();
        Ok(current)
    }

    fn set_default_branch(&self, project: &RemoteProject, branch: &str) -> Result<(), RemoteError> {
        let branch_err = |detail: String| RemoteError::DefaultBranch {
            project: project.name.to_string(),
            branch: branch.to_string(),
            detail,
        };
        let url = self.repo_url(project.name.as_str());
        let response = self
            .send(self.request(Method::Patch, url).json(json!({ "default_branch": branch })))
            .map_err(|e| branch_err(e.to_string()))?;
        if !response.is_success() {
            return Err(branch_err(response.describe()));
        }
        Ok(())
    }

    fn get_file(
        &self,
        project: &RemoteProject,
        branch: &str,
        path: &str,
    ) -> Result<Option<RemoteFile>, RemoteError> {
        let write_err = |detail: String| RemoteError::Write {
            path: path.to_string(),
            detail,
        };
        let url = format!(
            "{}?ref={}",
            self.contents_url(project, path),
            urlencoding::encode(branch)
        );
        let response = self
            .send(self.request(Method::Get, url))
            .map_err(|e| write_err(e.to_string()))?;
        if response.is_not_found() {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(write_err(response.describe()));
        }
        let file: GhContent = response.json()?;
        // GitHub wraps base64 payloads at 60 columns.
        let packed: String = file
            .content
            .unwrap_or_default()
            .split_whitespace()
            .collect();
        let content = STANDARD
            .decode(packed)
            .map_err(|e| write_err(format!("invalid base64 content: {e}")))?;
        Ok(Some(RemoteFile {
            token: file.sha,
            content,
        }))
    }

    fn create_file(&self, project: &RemoteProject, write: FileWrite<'_>) -> Result<(), RemoteError> {
        self.write_contents(project, write, None)
    }

    fn update_file(
        &self,
        project: &RemoteProject,
        write: FileWrite<'_>,
        existing: &RemoteFile,
    ) -> Result<(), RemoteError> {
        self.write_contents(project, write, Some(&existing.token))
    }
}
