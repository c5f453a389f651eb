use crate::request::{Body, HttpRequest};
use anyhow::{Context, anyhow};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// No timeout unless configured: a request runs to completion or transport failure.
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    pub timeout: Option<Duration>,
}

pub async fn execute(req: &HttpRequest, opts: &ExecuteOptions) -> anyhow::Result<HttpResponse> {
    let mut client = reqwest::Client::builder();
    if let Some(timeout) = opts.timeout {
        client = client.timeout(timeout);
    }
    let client = client.build().context("build http client")?;

    let mut headers = HeaderMap::new();
    for (k, v) in &req.headers {
        let name = HeaderName::from_bytes(k.as_bytes())
            .with_context(|| format!("invalid header name: {k}"))?;
        let value =
            HeaderValue::from_str(v).with_context(|| format!("invalid header value for {k}"))?;
        headers.insert(name, value);
    }

    let builder = match req.method.as_str() {
        "GET" => client.get(&req.url),
        "POST" => client.post(&req.url),
        other => return Err(anyhow!("unsupported method: {other}")),
    }
    .headers(headers);

    let builder = match &req.body {
        Body::Empty => builder,
        Body::Json(s) => builder.body(s.clone()),
        Body::MultipartFormData { bytes, .. } => builder.body(bytes.clone()),
    };

    log::debug!("sending {req:?}");
    let resp = builder.send().await.context("http request failed")?;
    let status = resp.status().as_u16();
    let body = resp
        .bytes()
        .await
        .context("failed reading response body")?
        .to_vec();
    log::debug!("{} {} -> {status} ({} bytes)", req.method, req.url, body.len());

    Ok(HttpResponse { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_json_and_returns_body_regardless_of_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/query/text"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"session_id": "s1", "query": "hi"})))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_raw(r#"{"success":false,"error":"bad"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let req = HttpRequest::post_json(
            format!("{}/api/query/text", server.uri()),
            &json!({"session_id": "s1", "query": "hi"}),
        );
        let resp = execute(&req, &ExecuteOptions::default()).await.unwrap();
        assert_eq!(resp.status, 400);
        assert!(!resp.is_success());
        assert_eq!(resp.body, br#"{"success":false,"error":"bad"}"#.to_vec());
    }

    #[tokio::test]
    async fn unreachable_host_is_an_error() {
        // Port 9 (discard) on localhost is closed in practice.
        let req = HttpRequest::post_json("http://127.0.0.1:9/ask".into(), &json!({}));
        assert!(execute(&req, &ExecuteOptions::default()).await.is_err());
    }
}
