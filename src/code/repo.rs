//! Repository references and the shallow-clone cache
//!
//! A cache entry is a directory named `owner__name` under the cache root. Its
//! presence means "already resolved": entries are never refreshed, and two
//! requests for the same new repository may both clone it.

use crate::error::RepoError;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

/// Separator replacing `/` in cache directory names
pub const CACHE_SEPARATOR: &str = "__";

/// A remote repository: `owner/name` plus an https clone URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReference {
    pub full_name: String,
    pub clone_url: String,
}

/// Parse a remote repository identifier
///
/// Accepts bare `owner/name` (GitHub), `https://host/owner/name[.git]` and
/// `git@host:owner/name.git`. Local paths are rejected.
pub fn resolve(input: &str) -> Result<RepoReference, RepoError> {
    let repo = input.trim();
    if repo.is_empty() {
        return Err(RepoError::invalid(input, "repository must not be empty"));
    }
    if ["/", "./", "../", "~"].iter().any(|p| repo.starts_with(p)) {
        return Err(RepoError::invalid(input, "repo must be a git URL or owner/repo"));
    }

    let (host, path) = if let Some(rest) = repo.strip_prefix("git@") {
        let (host, path) = rest
            .split_once(':')
            .ok_or_else(|| RepoError::invalid(input, "expected git@host:owner/repo"))?;
        (host.to_string(), path.to_string())
    } else if repo.starts_with("http://") || repo.starts_with("https://") {
        let url = url::Url::parse(repo).map_err(|e| RepoError::invalid(input, e.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| RepoError::invalid(input, "URL has no host"))?;
        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        (host, url.path().to_string())
    } else if repo.contains("://") {
        return Err(RepoError::invalid(input, "only http(s) and git@ remotes are supported"));
    } else {
        ("github.com".to_string(), repo.to_string())
    };

    let mut segments = path.trim_matches('/').split('/');
    let owner = segments.next().unwrap_or_default();
    let name = segments
        .next()
        .map(|n| n.strip_suffix(".git").unwrap_or(n))
        .unwrap_or_default();

    if owner.is_empty() || name.is_empty() {
        return Err(RepoError::invalid(input, "repo must be in owner/repo format"));
    }
    if [owner, name].iter().any(|s| *s == "." || *s == "..") {
        return Err(RepoError::invalid(input, "owner and name must not be relative path segments"));
    }
    if host.is_empty() {
        return Err(RepoError::invalid(input, "missing host"));
    }

    Ok(RepoReference {
        full_name: format!("{}/{}", owner, name),
        clone_url: format!("https://{}/{}/{}.git", host, owner, name),
    })
}

/// Performs the actual clone into a not-yet-existing directory
pub trait Cloner: Send + Sync {
    fn clone_repo(&self, repo: &RepoReference, target: &Path) -> Result<(), RepoError>;
}

/// `git clone --depth 1` through the system git
#[derive(Debug, Default, Clone)]
pub struct GitCloner;

impl Cloner for GitCloner {
    fn clone_repo(&self, repo: &RepoReference, target: &Path) -> Result<(), RepoError> {
        info!("Cloning {} into {}", repo.clone_url, target.display());
        let output = Command::new("git")
            .args(["clone", "--depth", "1"])
            .arg(&repo.clone_url)
            .arg(target)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RepoError::CloneFailed {
                repo: repo.full_name.clone(),
                output: if stderr.is_empty() {
                    format!("git exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        info!("Clone complete: {}", target.display());
        Ok(())
    }
}

/// On-disk cache of shallow clones
#[derive(Clone)]
pub struct RepoCache {
    root: PathBuf,
    cloner: Arc<dyn Cloner>,
}

impl RepoCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_cloner(root, Arc::new(GitCloner))
    }

    pub fn with_cloner(root: impl Into<PathBuf>, cloner: Arc<dyn Cloner>) -> Self {
        Self {
            root: root.into(),
            cloner,
        }
    }

    pub fn cache_path_for(&self, full_name: &str) -> PathBuf {
        self.root.join(full_name.replace('/', CACHE_SEPARATOR))
    }

    /// Local working copy of `repo`, cloning on first use
    ///
    /// The clone runs on the blocking pool.
    pub async fn materialize(&self, repo: &RepoReference) -> Result<PathBuf, RepoError> {
        let path = self.cache_path_for(&repo.full_name);
        if path.exists() {
            debug!("Using cached clone {}", path.display());
            return Ok(path);
        }

        let cloner = self.cloner.clone();
        let repo = repo.clone();
        tokio::task::spawn_blocking(move || {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            cloner.clone_repo(&repo, &path)?;
            Ok::<_, RepoError>(path)
        })
        .await
        .map_err(|e| RepoError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
    }
}
