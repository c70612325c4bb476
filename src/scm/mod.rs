use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod matchers;

pub use matchers::{resolve_str, MATCHERS};

/// Repository kind after normalization. Unknown kinds collapse to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmType {
    Git,
    Svn,
    Gist,
    Npm,
    Other,
}

impl ScmType {
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "git" => ScmType::Git,
            "svn" => ScmType::Svn,
            "gist" => ScmType::Gist,
            "npm" => ScmType::Npm,
            _ => ScmType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScmType::Git => "git",
            ScmType::Svn => "svn",
            ScmType::Gist => "gist",
            ScmType::Npm => "npm",
            ScmType::Other => "other",
        }
    }
}

/// Canonical repository reference of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmInfo {
    #[serde(rename = "type")]
    pub scm_type: ScmType,
    pub url: String,
    #[serde(default)]
    pub directory: String,
}

impl ScmInfo {
    pub(crate) fn new(scm_type: ScmType, url: impl Into<String>) -> Self {
        Self {
            scm_type,
            url: url.into(),
            directory: String::new(),
        }
    }

    /// Browsable root of the repository, if the url is http(s).
    pub fn base_url(&self) -> Option<String> {
        if !self.url.starts_with("http") {
            return None;
        }

        let url = self.url.trim();
        let url = if let Some(stripped) = url.strip_suffix(".git") {
            stripped
        } else if let Some(stripped) = url.strip_suffix('/') {
            stripped
        } else {
            url
        };

        if url.is_empty() {
            return None;
        }
        Some(url.to_string())
    }

    /// Browsable url of a file inside the package, relative to the package root.
    ///
    /// The package's `directory` (monorepo sub-path) is prepended. GitHub,
    /// Bitbucket and GitLab get their file-view path on the `master` branch;
    /// other hosts get the path appended as is.
    pub fn file_url(&self, subpath: &str) -> Option<String> {
        if matches!(self.scm_type, ScmType::Gist | ScmType::Npm) {
            return None;
        }

        let subpath = subpath.trim().trim_start_matches('/');
        if subpath.is_empty() {
            return None;
        }

        let base = self.base_url()?;
        let directory = self.directory.trim().trim_matches('/');
        let path = if directory.is_empty() {
            subpath.to_string()
        } else {
            format!("{}/{}", directory, subpath)
        };

        let host = matchers::host_of(&base).to_lowercase();
        let view = if host == "github.com" || host == "www.github.com" {
            "/blob/master/"
        } else if host.ends_with("bitbucket.org") || host.ends_with("bitbucket.com") {
            "/src/master/"
        } else if host == "gitlab.com" || host == "www.gitlab.com" {
            "/-/blob/master/"
        } else {
            "/"
        };

        Some(format!("{}{}{}", base, view, path))
    }
}

/// Raw `repository` value of a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoReference {
    Text(String),
    Structured {
        kind: Option<String>,
        url: Option<String>,
        directory: Option<String>,
    },
}

impl RepoReference {
    /// Builds a reference from a manifest value. `null`, numbers, booleans and
    /// arrays are not references.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RepoReference::Text(s.clone())),
            Value::Object(map) => {
                let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
                Some(RepoReference::Structured {
                    kind: field("type"),
                    url: field("url"),
                    directory: field("directory"),
                })
            }
            _ => None,
        }
    }
}

/// Normalizes a repository reference into `ScmInfo`. `None` means the
/// reference could not be understood.
pub fn resolve(reference: &RepoReference) -> Option<ScmInfo> {
    match reference {
        RepoReference::Text(text) => resolve_str(text),
        RepoReference::Structured {
            kind: Some(kind),
            url: Some(url),
            directory,
        } => {
            let directory = directory.as_deref().unwrap_or("");
            match resolve_str(url) {
                Some(parsed) => {
                    let directory = if directory.is_empty() {
                        parsed.directory.clone()
                    } else {
                        directory.to_string()
                    };
                    Some(ScmInfo { directory, ..parsed })
                }
                None => {
                    // Keep what the manifest declared even if no matcher knows the url.
                    let url = matchers::strip_git_plus(url.trim());
                    if url.is_empty() {
                        return None;
                    }
                    Some(ScmInfo {
                        scm_type: ScmType::from_raw(kind),
                        url: url.to_string(),
                        directory: directory.to_string(),
                    })
                }
            }
        }
        RepoReference::Structured { url: Some(url), .. } => resolve_str(url),
        RepoReference::Structured { .. } => None,
    }
}

/// Convenience over a manifest's optional `repository` value.
pub fn resolve_value(value: Option<&Value>) -> Option<ScmInfo> {
    value
        .and_then(RepoReference::from_value)
        .and_then(|reference| resolve(&reference))
}
