//! Repository detection from remote URLs

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use url::Url;

const GITHUB_HOST: &str = "github.com";

/// Parse owner and repository name from a remote URL.
///
/// Accepts scp-like (`git@github.com:owner/repo.git`), `https://` and
/// `ssh://` forms. Hosts other than github.com are accepted only when
/// `allow_custom_host` is set (a GitHub Enterprise API host was configured);
/// the host is then carried in [`PlatformConfig::host`].
pub fn parse_repo_info(url: &str, allow_custom_host: bool) -> Result<PlatformConfig> {
    let (host, path) = split_remote_url(url.trim())
        .ok_or_else(|| Error::RepositoryInfoUnresolvable(url.to_string()))?;

    let host = host.to_ascii_lowercase();
    let is_github = host == GITHUB_HOST || host == format!("www.{GITHUB_HOST}");
    if !is_github && !allow_custom_host {
        return Err(Error::NoSupportedRemotes);
    }

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.split('/').filter(|s| !s.is_empty());

    let (Some(owner), Some(repo), None) = (segments.next(), segments.next(), segments.next())
    else {
        return Err(Error::RepositoryInfoUnresolvable(url.to_string()));
    };

    Ok(PlatformConfig {
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (!is_github).then_some(host),
    })
}

/// Split a remote URL into `(host, path)`
fn split_remote_url(url: &str) -> Option<(String, String)> {
    if url.contains("://") {
        let parsed = Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_string();
        return Some((host, parsed.path().to_string()));
    }

    // scp-like: [user@]host:path
    let (authority, path) = url.split_once(':')?;
    let host = authority.rsplit('@').next()?;
    if host.is_empty() || path.is_empty() {
        return None;
    }
    Some((host.to_string(), path.to_string()))
}
