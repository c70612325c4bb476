use super::{ScmInfo, ScmType};

/// One entry of the repository string cascade.
pub struct Matcher {
    pub name: &'static str,
    pub applies: fn(&str) -> bool,
    pub apply: fn(&str) -> Option<ScmInfo>,
}

/// Ordered cascade; the first matcher that applies and yields a result wins.
pub const MATCHERS: &[Matcher] = &[
    Matcher {
        name: "github-shorthand",
        applies: |s| has_prefix_ignore_case(s, "github:"),
        apply: |s| provider_shorthand(&s[7..], "https://github.com", false),
    },
    Matcher {
        name: "bitbucket-shorthand",
        applies: |s| has_prefix_ignore_case(s, "bitbucket:"),
        apply: |s| provider_shorthand(&s[10..], "https://bitbucket.org", true),
    },
    Matcher {
        name: "gitlab-shorthand",
        applies: |s| has_prefix_ignore_case(s, "gitlab:"),
        apply: |s| provider_shorthand(&s[7..], "https://gitlab.com", false),
    },
    Matcher {
        name: "gist",
        applies: |s| has_prefix_ignore_case(s, "gist:"),
        apply: |s| {
            let id = &s[5..];
            if id.is_empty() {
                return None;
            }
            Some(ScmInfo::new(ScmType::Gist, format!("https://gist.github.com/{}", id)))
        },
    },
    Matcher {
        name: "npm-package",
        applies: |s| s.starts_with("npm/"),
        apply: |s| {
            let package = &s[4..];
            if package.is_empty() {
                return None;
            }
            Some(ScmInfo::new(
                ScmType::Npm,
                format!("https://www.npmjs.com/package/{}", package),
            ))
        },
    },
    Matcher {
        name: "git-protocol",
        applies: |s| s.starts_with("git://") || s.starts_with("git+ssh://"),
        apply: |s| {
            let rest = s
                .strip_prefix("git+ssh")
                .or_else(|| s.strip_prefix("git"))?;
            let scheme = if s.contains("github.com") { "https" } else { "http" };
            let url = strip_authority_user(&format!("{}{}", scheme, rest));
            Some(ScmInfo::new(ScmType::Git, url))
        },
    },
    Matcher {
        name: "http-git-url",
        applies: |s| {
            (s.starts_with("http://") || s.starts_with("https://"))
                && (s.contains("github.com") || s.ends_with(".git"))
        },
        apply: |s| Some(ScmInfo::new(ScmType::Git, strip_authority_user(s))),
    },
    Matcher {
        name: "ssh-shorthand",
        applies: |s| split_ssh_shorthand(s).is_some(),
        apply: |s| {
            let (_user, host, org, repo) = split_ssh_shorthand(s)?;
            if host.contains("github.com") {
                Some(ScmInfo::new(
                    ScmType::Git,
                    format!("https://github.com/{}/{}", org, repo),
                ))
            } else {
                Some(ScmInfo::new(
                    ScmType::Other,
                    format!("http://{}/{}/{}", host, org, repo),
                ))
            }
        },
    },
    Matcher {
        // Any "word/word" string is taken as a GitHub repository.
        name: "github-owner-repo",
        applies: |s| match s.split_once('/') {
            Some((owner, repo)) => !owner.is_empty() && !repo.is_empty() && !repo.contains('/'),
            None => false,
        },
        apply: |s| Some(ScmInfo::new(ScmType::Git, format!("https://github.com/{}", s))),
    },
    Matcher {
        name: "bare-host",
        applies: |s| !s.starts_with("http") && is_bare_host_path(s),
        apply: |s| {
            let scheme = if ["github.com", "gitlab.com", "bitbucket.org", "bitbucket.com"]
                .iter()
                .any(|host| s.contains(host))
            {
                "https"
            } else {
                "http"
            };
            let scm_type = if s.to_lowercase().contains("git") {
                ScmType::Git
            } else {
                ScmType::Other
            };
            Some(ScmInfo::new(scm_type, format!("{}://{}", scheme, s)))
        },
    },
];

/// Normalizes a repository string. `None` if no matcher understands it.
pub fn resolve_str(raw: &str) -> Option<ScmInfo> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned = strip_git_plus(trimmed);
    for matcher in MATCHERS {
        if !(matcher.applies)(cleaned) {
            continue;
        }
        if let Some(info) = (matcher.apply)(cleaned) {
            tracing::debug!(matcher = matcher.name, input = raw, url = %info.url, "repository resolved");
            return Some(ScmInfo {
                url: strip_git_plus(&info.url).to_string(),
                ..info
            });
        }
    }

    tracing::debug!(input = raw, "repository reference not recognized");
    None
}

/// `git+https://…` → `https://…`; anything else is returned unchanged.
pub(crate) fn strip_git_plus(url: &str) -> &str {
    if url.starts_with("git+http") {
        &url[4..]
    } else {
        url
    }
}

/// Drops a `user@` embedded in the authority of `scheme://user@host/...`.
pub(crate) fn strip_authority_user(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let authority_start = scheme_end + 3;
    let rest = &url[authority_start..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let authority = &rest[..authority_end];

    match authority.rfind('@') {
        Some(at) => format!(
            "{}{}{}",
            &url[..authority_start],
            &authority[at + 1..],
            &rest[authority_end..]
        ),
        None => url.to_string(),
    }
}

/// Host part of an absolute url, without user and port.
pub(crate) fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or(authority);
    host.split(':').next().unwrap_or(host)
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

fn provider_shorthand(path: &str, base: &str, trailing_slash: bool) -> Option<ScmInfo> {
    let (user, repo) = path.split_once('/')?;
    let mut repo = repo.to_string();
    if trailing_slash && !repo.ends_with('/') {
        repo.push('/');
    }
    Some(ScmInfo::new(ScmType::Git, format!("{}/{}/{}", base, user, repo)))
}

/// `user@host:org/repo`
fn split_ssh_shorthand(s: &str) -> Option<(&str, &str, &str, &str)> {
    let (user, rest) = s.split_once('@')?;
    let (host, path) = rest.split_once(':')?;
    let (org, repo) = path.split_once('/')?;
    if user.contains('/') || host.is_empty() || host.contains('/') {
        return None;
    }
    Some((user, host, org, repo))
}

/// `host[:port][/path]` with a syntactically valid host name.
fn is_bare_host_path(s: &str) -> bool {
    let authority = s.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit('@').next().unwrap_or(authority);
    let (host, port) = match host_port.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (host_port, None),
    };

    if let Some(port) = port {
        if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    !host.is_empty()
        && !host.starts_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}
