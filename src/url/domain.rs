use crate::{UrlError, UrlResult};
use url::Url;

/// Extracts the lowercase hostname from a domain root URL
///
/// # Examples
///
/// ```
/// use product_scout::url::extract_host;
///
/// assert_eq!(extract_host("https://www.example.com/").unwrap(), "www.example.com");
/// assert!(extract_host("not a url").is_err());
/// ```
pub fn extract_host(domain_root: &str) -> UrlResult<String> {
    let url = Url::parse(domain_root).map_err(|e| UrlError::Parse(format!("{}: {}", domain_root, e)))?;
    url.host_str()
        .map(|h| h.to_lowercase())
        .ok_or_else(|| UrlError::MissingHost(domain_root.to_string()))
}

/// Returns true if `candidate` shares scheme, host and port with `root`
pub fn same_origin(candidate: &Url, root: &Url) -> bool {
    candidate.origin() == root.origin()
}

/// Derives the artifact file stem for a domain: the host with dots replaced
///
/// `https://www.example.com/` becomes `www_example_com`. Unparseable roots
/// fall back to the raw string with every non-alphanumeric character replaced.
pub fn domain_file_stem(domain_root: &str) -> String {
    match extract_host(domain_root) {
        Ok(host) => host.replace('.', "_"),
        Err(_) => domain_root
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect(),
    }
}
