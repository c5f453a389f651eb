use anyhow::{Context, anyhow};

/// Origin (plus optional path prefix) of a backend deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoint {
    base_url: String,
}

impl ApiEndpoint {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        let parsed = url::Url::parse(base_url.trim())
            .with_context(|| format!("invalid backend URL: {base_url}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("unsupported backend URL scheme: {}", parsed.scheme()));
        }
        Ok(Self {
            base_url: base_url.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_trailing_slash() {
        assert_eq!(
            join_url("http://localhost:5000/", "/api/query/text"),
            "http://localhost:5000/api/query/text"
        );
        assert_eq!(
            join_url("http://localhost:5000", "api/query/text"),
            "http://localhost:5000/api/query/text"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(ApiEndpoint::new("ftp://example.com").is_err());
        assert!(ApiEndpoint::new("not a url").is_err());
        let ep = ApiEndpoint::new(" https://tutor.example.com/edu ").unwrap();
        assert_eq!(ep.url_for("/ask"), "https://tutor.example.com/edu/ask");
    }
}
