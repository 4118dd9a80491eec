//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped in a URL path; `/` is kept as a separator
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Normalise a route to a `/`-delimited path
///
/// # Examples
/// ```ignore
/// url_for("my-post") // -> "/my-post/"
/// ```
pub fn url_for(path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", path)
    }
}

/// Absolute URL of a route on the configured site
///
/// # Examples
/// ```ignore
/// full_url_for(&config, "/my post/") // -> "https://example.com/my%20post/"
/// ```
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    format!("{}{}", config.base_url(), encode_path(&url_for(path)))
}

/// Percent-encode a URL path
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            url: "https://example.com/".to_string(),
            ..SiteConfig::default()
        }
    }

    #[test]
    fn test_url_for() {
        assert_eq!(url_for("my-post"), "/my-post/");
        assert_eq!(url_for("/a/b/"), "/a/b/");
        assert_eq!(url_for(""), "/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about/"),
            "https://example.com/about/"
        );
        assert_eq!(
            full_url_for(&config, "/my post/"),
            "https://example.com/my%20post/"
        );
    }

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("/a/b?c/"), "/a/b%3Fc/");
        assert_eq!(encode_path("/café/"), "/caf%C3%A9/");
    }
}
