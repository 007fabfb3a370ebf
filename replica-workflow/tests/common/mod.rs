//! In-memory `PlatformAdapter` for workflow tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

use replica_core::config::load_config_str;
use replica_core::{ImportStatus, Platform, ProjectName, RemoteProject, ReplicaConfig};
use replica_remote::{FileWrite, ImportSource, PlatformAdapter, RemoteError, RemoteFile};

pub const BASE_CONFIG: &str = r#"
agency_config:
  short_name_template: "ZZ-99"
  category_id: 7
  agency_ipa_code: "c_h501"

project_config:
  gitlab_group_id: 42
  gitlab_url: "https://gitlab.example.com"
  gitlab_username: "deployer"
  gitlab_origin_remote_name: "agency-xy"
  github_owner: "agency-org"
  import_timeout_secs: 5
  import_poll_secs: 0

users:
  number: 2
  user1:
    name: alice
  user2:
    name: bob

register_config:
  default_privacy_template:
    profileName: "Studio Rossi"

protocol_config:
  AOO:
    number: 1
    AOO1:
      aoo1_name: "Protocollo generale"
  UO:
    number: 0
"#;

pub fn config() -> ReplicaConfig {
    config_from(BASE_CONFIG)
}

pub fn config_from(doc: &str) -> ReplicaConfig {
    load_config_str(doc, Path::new("config.yml")).expect("fixture config parses")
}

pub fn remote(id: u64, name: &str) -> RemoteProject {
    RemoteProject {
        id,
        name: ProjectName::from(name),
        full_path: format!("agencies/{name}"),
        clone_url: format!("https://gitlab.example.com/agencies/{name}.git"),
        web_url: Some(format!("https://gitlab.example.com/agencies/{name}")),
        default_branch: Some("main".to_string()),
        import_status: ImportStatus::None,
        import_error: None,
    }
}

/// A stored file: content plus the commit message of its last write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: String,
    pub message: String,
    pub branch: String,
}

pub struct FakeAdapter {
    pub platform: Platform,
    pub projects: Vec<RemoteProject>,
    pub statuses: RefCell<VecDeque<ImportStatus>>,
    pub files: RefCell<BTreeMap<String, StoredFile>>,
    pub calls: RefCell<Vec<String>>,
    pub import_urls: RefCell<Vec<String>>,
    pub reject_default_branch: bool,
    pub reject_write: Option<String>,
}

impl FakeAdapter {
    pub fn new(platform: Platform, projects: Vec<RemoteProject>) -> Self {
        Self {
            platform,
            projects,
            statuses: RefCell::new(VecDeque::new()),
            files: RefCell::new(BTreeMap::new()),
            calls: RefCell::new(Vec::new()),
            import_urls: RefCell::new(Vec::new()),
            reject_default_branch: false,
            reject_write: None,
        }
    }

    pub fn with_statuses(self, statuses: &[ImportStatus]) -> Self {
        self.statuses.borrow_mut().extend(statuses.iter().copied());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Calls that change remote state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("list") && !c.starts_with("get ") && !c.starts_with("status"))
            .collect()
    }

    fn log(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl PlatformAdapter for FakeAdapter {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn scope(&self) -> String {
        "fake scope".to_string()
    }

    fn list_projects(&self) -> Result<Vec<RemoteProject>, RemoteError> {
        self.log("list".to_string());
        Ok(self.projects.clone())
    }

    fn create_and_import(
        &self,
        new_name: &str,
        source: &ImportSource,
        _default_branch: &str,
    ) -> Result<RemoteProject, RemoteError> {
        self.log(format!("create {new_name}"));
        self.import_urls.borrow_mut().push(source.authenticated_url());
        let mut created = remote(100, new_name);
        created.import_status = ImportStatus::InProgress;
        Ok(created)
    }

    fn import_status(&self, project: &RemoteProject) -> Result<RemoteProject, RemoteError> {
        self.log("status".to_string());
        let mut current = project.clone();
        current.import_status = self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(ImportStatus::Finished);
        if current.import_status == ImportStatus::Failed {
            current.import_error = Some("could not clone origin".to_string());
        }
        Ok(current)
    }

    fn set_default_branch(&self, project: &RemoteProject, branch: &str) -> Result<(), RemoteError> {
        self.log(format!("default-branch {branch}"));
        if self.reject_default_branch {
            return Err(RemoteError::DefaultBranch {
                project: project.name.to_string(),
                branch: branch.to_string(),
                detail: "HTTP 422: branch not found".to_string(),
            });
        }
        Ok(())
    }

    fn get_file(
        &self,
        _project: &RemoteProject,
        _branch: &str,
        path: &str,
    ) -> Result<Option<RemoteFile>, RemoteError> {
        self.log(format!("get {path}"));
        Ok(self.files.borrow().get(path).map(|f| RemoteFile {
            token: format!("v-{}", f.content.len()),
            content: f.content.clone().into_bytes(),
        }))
    }

    fn create_file(&self, _project: &RemoteProject, write: FileWrite<'_>) -> Result<(), RemoteError> {
        self.store("create", write)
    }

    fn update_file(
        &self,
        _project: &RemoteProject,
        write: FileWrite<'_>,
        _existing: &RemoteFile,
    ) -> Result<(), RemoteError> {
        self.store("update", write)
    }
}

impl FakeAdapter {
    fn store(&self, verb: &str, write: FileWrite<'_>) -> Result<(), RemoteError> {
        self.log(format!("{verb} {}", write.path));
        if self.reject_write.as_deref() == Some(write.path) {
            return Err(RemoteError::Write {
                path: write.path.to_string(),
                detail: "HTTP 403".to_string(),
            });
        }
        self.files.borrow_mut().insert(
            write.path.to_string(),
            StoredFile {
                content: write.content.to_string(),
                message: write.message.to_string(),
                branch: write.branch.to_string(),
            },
        );
        Ok(())
    }
}
