//! GitLab REST v4 realization of [`PlatformAdapter`].
//!
//! | Operation          | Call                                                  |
//! |--------------------|-------------------------------------------------------|
//! | list               | `GET  /groups/:group/projects?per_page=100&page=N`    |
//! | create + import    | `POST /projects` with `import_url`                    |
//! | import status      | `GET  /projects/:id`                                  |
//! | default branch     | `PUT  /projects/:id`                                  |
//! | file read / write  | `GET / POST / PUT /projects/:id/repository/files/:path` |

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::json;

use replica_core::{
    ConfigError, GroupRef, ImportStatus, Platform, ProjectConfig, ProjectName, RemoteProject,
    Secret, Visibility,
};

use crate::adapter::{FileWrite, PlatformAdapter, RemoteFile};
use crate::auth::ImportSource;
use crate::error::RemoteError;
use crate::transport::{ApiRequest, ApiResponse, Method, Transport, UreqTransport};

const PER_PAGE: usize = 100;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Addressing for one GitLab instance and group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitLabSettings {
    /// Instance root, e.g. `https://gitlab.example.com`.
    pub base_url: String,
    pub group: GroupRef,
    pub visibility: Visibility,
}

impl GitLabSettings {
    pub fn from_config(project: &ProjectConfig) -> Result<Self, ConfigError> {
        project.require_for(Platform::GitLab)?;
        Ok(Self {
            base_url: project.gitlab_url.as_deref().unwrap_or_default().trim().to_string(),
            group: project.gitlab_group()?.clone(),
            visibility: project.gitlab_visibility,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GlProject {
    id: u64,
    name: String,
    path_with_namespace: String,
    http_url_to_repo: String,
    #[serde(default)]
    web_url: Option<String>,
    #[serde(default)]
    default_branch: Option<String>,
    #[serde(default)]
    import_status: Option<String>,
    #[serde(default)]
    import_error: Option<String>,
}

impl From<GlProject> for RemoteProject {
    fn from(p: GlProject) -> Self {
        RemoteProject {
            id: p.id,
            name: ProjectName::from(p.name),
            full_path: p.path_with_namespace,
            clone_url: p.http_url_to_repo,
            web_url: p.web_url,
            default_branch: p.default_branch,
            import_status: import_status(p.import_status.as_deref()),
            import_error: p.import_error,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GlGroup {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct GlFile {
    content: String,
    #[serde(default)]
    encoding: Option<String>,
    last_commit_id: String,
}

/// Map GitLab's `import_status` onto [`ImportStatus`].
///
/// `scheduled`, `started`, and any status GitLab adds later count as in
/// progress.
pub fn import_status(raw: Option<&str>) -> ImportStatus {
    match raw.map(str::trim) {
        None | Some("") | Some("none") => ImportStatus::None,
        Some("finished") => ImportStatus::Finished,
        Some("failed") => ImportStatus::Failed,
        Some(_) => ImportStatus::InProgress,
    }
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct GitLabAdapter<T: Transport = UreqTransport> {
    transport: T,
    settings: GitLabSettings,
    token: Secret,
}

impl GitLabAdapter<UreqTransport> {
    pub fn new(settings: GitLabSettings, token: Secret) -> Self {
        Self::with_transport(settings, token, UreqTransport::new())
    }
}

impl<T: Transport> GitLabAdapter<T> {
    pub fn with_transport(settings: GitLabSettings, token: Secret, transport: T) -> Self {
        Self {
            transport,
            settings,
            token,
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/v4{path}", self.settings.base_url.trim_end_matches('/'))
    }

    fn group_ref(&self) -> String {
        match &self.settings.group {
            GroupRef::Id(id) => id.to_string(),
            GroupRef::Path(path) => urlencoding::encode(path.trim()).into_owned(),
        }
    }

    fn file_url(&self, project: &RemoteProject, path: &str) -> String {
        self.api(&format!(
            "/projects/{}/repository/files/{}",
            project.id,
            urlencoding::encode(path)
        ))
    }

    fn request(&self, method: Method, url: String) -> ApiRequest {
        ApiRequest::new(method, url).header("PRIVATE-TOKEN", self.token.expose())
    }

    fn send(&self, request: ApiRequest) -> Result<ApiResponse, crate::error::TransportError> {
        self.transport.send(&request)
    }

    fn namespace_id(&self, new_name: &str) -> Result<u64, RemoteError> {
        if let GroupRef::Id(id) = self.settings.group {
            return Ok(id);
        }
        let create_err = |detail: String| RemoteError::Create {
            name: new_name.to_string(),
            detail: format!("resolving group {}: {detail}", self.settings.group),
        };
        let url = self.api(&format!("/groups/{}", self.group_ref()));
        let response = self
            .send(self.request(Method::Get, url))
            .map_err(|e| create_err(e.to_string()))?;
        if !response.is_success() {
            return Err(create_err(response.describe()));
        }
        Ok(response.json::<GlGroup>()?.id)
    }
}

impl<T: Transport> PlatformAdapter for GitLabAdapter<T> {
    fn platform(&self) -> Platform {
        Platform::GitLab
    }

    fn scope(&self) -> String {
        format!("GitLab group {}", self.settings.group)
    }

    fn list_projects(&self) -> Result<Vec<RemoteProject>, RemoteError> {
        let list_err = |detail: String| RemoteError::List {
            scope: self.scope(),
            detail,
        };
        let mut projects = Vec::new();
        let mut page = 1;
        loop {
            let url = self.api(&format!(
                "/groups/{}/projects?per_page={PER_PAGE}&page={page}",
                self.group_ref()
            ));
            let response = self
                .send(self.request(Method::Get, url))
                .map_err(|e| list_err(e.to_string()))?;
            if !response.is_success() {
                return Err(list_err(response.describe()));
            }
            let batch: Vec<GlProject> = response.json()?;
            let full_page = batch.len() >= PER_PAGE;
            projects.extend(batch.into_iter().map(RemoteProject::from));
            if !full_page {
                break;
            }
            page += 1;
        }
        tracing::debug!(count = projects.len(), scope = %self.scope(), "listed projects");
        Ok(projects)
    }

    fn create_and_import(
        &self,
        new_name: &str,
        source: &ImportSource,
        default_branch: &str,
    ) -> Result<RemoteProject, RemoteError> {
        let namespace_id = self.namespace_id(new_name)?;
        let create_err = |detail: String| RemoteError::Create {
            name: new_name.to_string(),
            detail,
        };
        let body = json!({
            "name": new_name,
            "namespace_id": namespace_id,
            "visibility": self.settings.visibility.to_string(),
            "default_branch": default_branch,
            "import_url": source.authenticated_url(),
        });
        let response = self
            .send(self.request(Method::Post, self.api("/projects")).json(body))
            .map_err(|e| create_err(e.to_string()))?;
        if !response.is_success() {
            return Err(create_err(response.describe()));
        }
        let project: RemoteProject = response.json::<GlProject>()?.into();
        tracing::info!(project = %project.full_path, "created GitLab project");
        Ok(project)
    }

    fn import_status(&self, project: &RemoteProject) -> Result<RemoteProject, RemoteError> {
        let url = self.api(&format!("/projects/{}", project.id));
        let response = self.send(self.request(Method::Get, url))?;
        if !response.is_success() {
            return Err(RemoteError::Status {
                project: project.name.to_string(),
                detail: response.describe(),
            });
        }
        Ok(response.json::<GlProject>()?.into())
    }

    fn set_default_branch(&self, project: &RemoteProject, branch: &str) -> Result<(), RemoteError> {
        let branch_err = |detail: String| RemoteError::DefaultBranch {
            project: project.name.to_string(),
            branch: branch.to_string(),
            detail,
        };
        let url = self.api(&format!("/projects/{}", project.id));
        let response = self
            .send(self.request(Method::Put, url).json(json!({ "default_branch": branch })))
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
            self.file_url(project, path),
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
        let file: GlFile = response.json()?;
        let content = match file.encoding.as_deref() {
            Some("base64") => STANDARD
                .decode(file.content.trim())
                .map_err(|e| write_err(format!("invalid base64 content: {e}")))?,
            _ => file.content.into_bytes(),
        };
        Ok(Some(RemoteFile {
            token: file.last_commit_id,
            content,
        }))
    }

    fn create_file(&self, project: &RemoteProject, write: FileWrite<'_>) -> Result<(), RemoteError> {
        let body = json!({
            "branch": write.branch,
            "content": write.content,
            "commit_message": write.message,
        });
        self.write_file(Method::Post, project, write, body)
    }

    fn update_file(
        &self,
        project: &RemoteProject,
        write: FileWrite<'_>,
        existing: &RemoteFile,
    ) -> Result<(), RemoteError> {
        let body = json!({
            "branch": write.branch,
            "content": write.content,
            "commit_message": write.message,
            "last_commit_id": existing.token,
        });
        self.write_file(Method::Put, project, write, body)
    }
}

impl<T: Transport> GitLabAdapter<T> {
    fn write_file(
        &self,
        method: Method,
        project: &RemoteProject,
        write: FileWrite<'_>,
        body: serde_json::Value,
    ) -> Result<(), RemoteError> {
        let write_err = |detail: String| RemoteError::Write {
            path: write.path.to_string(),
            detail,
        };
        let url = self.file_url(project, write.path);
        let response = self
            .send(self.request(method, url).json(body))
            .map_err(|e| write_err(e.to_string()))?;
        if !response.is_success() {
            return Err(write_err(response.describe()));
        }
        Ok(())
    }
}
