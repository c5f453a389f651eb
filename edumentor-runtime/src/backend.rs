use std::sync::Arc;

use async_trait::async_trait;
use edumentor_core::config::{ClientConfig, IntegrationProfile};
use edumentor_core::types::{DataUrl, DataUrlError, ImageSource, extension_for_mime};
use edumentor_engine::traits::{QueryBackend, QueryResponse, RegisterResponse, RequestContext};
use edumentor_providers::endpoint::ApiEndpoint;
use edumentor_providers::form_api::{
    UploadFile, build_ask_request, build_upload_image_request, build_voice_upload_request,
};
use edumentor_providers::parse::{
    parse_ask_response, parse_query_response, parse_register_response,
    parse_upload_image_response, parse_voice_upload_response,
};
use edumentor_providers::request::HttpRequest;
use edumentor_providers::runtime::{ExecuteOptions, HttpResponse, execute};
use edumentor_providers::session_api::{
    build_image_query_request, build_register_request, build_text_query_request,
    build_voice_query_request,
};

pub const IMAGE_PROCESSED_FALLBACK: &str = "✅ Image processed.";
pub const CAPTURED_IMAGE_FALLBACK: &str = "Captured image processed.";
pub const UNREADABLE_IMAGE_MESSAGE: &str = "Could not read the image. Please try again.";
pub const UNREADABLE_RECORDING_MESSAGE: &str = "Could not read the recording. Please try again.";

/// Builds the backend for the configured integration profile.
pub fn backend_from_config(cfg: &ClientConfig) -> anyhow::Result<Arc<dyn QueryBackend>> {
    let endpoint = ApiEndpoint::new(cfg.active_base_url())?;
    let opts = ExecuteOptions {
        timeout: cfg.request_timeout(),
    };
    log::info!(
        "using {:?} backend at {}",
        cfg.integration,
        endpoint.base_url()
    );
    let backend: Arc<dyn QueryBackend> = match cfg.integration {
        IntegrationProfile::SessionJson => Arc::new(SessionApiBackend::new(endpoint, opts)),
        IntegrationProfile::Form => Arc::new(FormApiBackend::new(endpoint, opts)),
    };
    Ok(backend)
}

async fn send(req: &HttpRequest, opts: &ExecuteOptions) -> anyhow::Result<HttpResponse> {
    let resp = execute(req, opts).await?;
    if !resp.is_success() {
        // The body still decides; the status is only worth a log line.
        log::warn!("{} {} answered HTTP {}", req.method, req.url, resp.status);
    }
    Ok(resp)
}

/// JSON endpoints keyed by session id.
#[derive(Debug, Clone)]
pub struct SessionApiBackend {
    endpoint: ApiEndpoint,
    opts: ExecuteOptions,
}

impl SessionApiBackend {
    pub fn new(endpoint: ApiEndpoint, opts: ExecuteOptions) -> Self {
        Self { endpoint, opts }
    }
}

#[async_trait]
impl QueryBackend for SessionApiBackend {
    async fn register_student(&self, ctx: RequestContext<'_>) -> anyhow::Result<RegisterResponse> {
        let req = build_register_request(&self.endpoint, ctx.session, ctx.profile);
        let resp = send(&req, &self.opts).await?;
        parse_register_response(&resp.body)
    }

    async fn submit_text(
        &self,
        ctx: RequestContext<'_>,
        text: &str,
    ) -> anyhow::Result<QueryResponse> {
        let req = build_text_query_request(&self.endpoint, ctx.session, text);
        let resp = send(&req, &self.opts).await?;
        parse_query_response(&resp.body)
    }

    async fn submit_image(
        &self,
        ctx: RequestContext<'_>,
        image: &DataUrl,
        _source: ImageSource,
    ) -> anyhow::Result<QueryResponse> {
        let req = build_image_query_request(&self.endpoint, ctx.session, image);
        let resp = send(&req, &self.opts).await?;
        parse_query_response(&resp.body)
    }

    async fn submit_voice(
        &self,
        ctx: RequestContext<'_>,
        audio: &DataUrl,
    ) -> anyhow::Result<QueryResponse> {
        let req = build_voice_query_request(&self.endpoint, ctx.session, audio);
        let resp = send(&req, &self.opts).await?;
        parse_query_response(&resp.body)
    }
}

/// Multipart `/ask` + `/upload-image` + `/voice`. There is no registration
/// endpoint and no session id; the profile rides along with each question.
#[derive(Debug, Clone)]
pub struct FormApiBackend {
    endpoint: ApiEndpoint,
    opts: ExecuteOptions,
}

impl FormApiBackend {
    pub fn new(endpoint: ApiEndpoint, opts: ExecuteOptions) -> Self {
        Self { endpoint, opts }
    }

    async fn ask(&self, ctx: RequestContext<'_>, question: &str) -> anyhow::Result<String> {
        let req = build_ask_request(&self.endpoint, question, ctx.profile);
        let resp = send(&req, &self.opts).await?;
        parse_ask_response(&resp.body)
    }
}

fn upload_file(stem: &str, data: &DataUrl) -> Result<UploadFile, DataUrlError> {
    Ok(UploadFile {
        filename: format!("{stem}.{}", extension_for_mime(data.mime_type())),
        mime_type: data.mime_type().to_string(),
        bytes: data.decode()?,
    })
}

/// A payload that does not decode never leaves the client, so it is reported
/// as a failed answer rather than a connectivity problem.
fn local_upload(stem: &str, data: &DataUrl, unreadable: &str) -> Result<UploadFile, QueryResponse> {
    upload_file(stem, data).map_err(|e| {
        log::warn!("{stem} payload ({}) does not decode: {e}", data.mime_type());
        QueryResponse::failed(unreadable)
    })
}

fn image_fallback(source: ImageSource) -> &'static str {
    match source {
        ImageSource::File => IMAGE_PROCESSED_FALLBACK,
        ImageSource::Camera => CAPTURED_IMAGE_FALLBACK,
    }
}

#[async_trait]
impl QueryBackend for FormApiBackend {
    async fn register_student(&self, ctx: RequestContext<'_>) -> anyhow::Result<RegisterResponse> {
        log::info!(
            "form API has no registration endpoint; keeping session {} local",
            ctx.session
        );
        Ok(RegisterResponse {
            success: true,
            error: None,
        })
    }

    async fn submit_text(
        &self,
        ctx: RequestContext<'_>,
        text: &str,
    ) -> anyhow::Result<QueryResponse> {
        Ok(QueryResponse::answered(self.ask(ctx, text).await?))
    }

    async fn submit_image(
        &self,
        _ctx: RequestContext<'_>,
        image: &DataUrl,
        source: ImageSource,
    ) -> anyhow::Result<QueryResponse> {
        let file = match local_upload("capture", image, UNREADABLE_IMAGE_MESSAGE) {
            Ok(file) => file,
            Err(failed) => return Ok(failed),
        };
        let req = build_upload_image_request(&self.endpoint, &file);
        let resp = send(&req, &self.opts).await?;
        let parsed = parse_upload_image_response(&resp.body)?;

        Ok(QueryResponse {
            extracted_text: parsed.extracted_text,
            ..QueryResponse::answered(
                parsed
                    .response
                    .unwrap_or_else(|| image_fallback(source).to_string()),
            )
        })
    }

    /// Transcribes through `/voice`, then asks the transcription.
    async fn submit_voice(
        &self,
        ctx: RequestContext<'_>,
        audio: &DataUrl,
    ) -> anyhow::Result<QueryResponse> {
        let file = match local_upload("recording", audio, UNREADABLE_RECORDING_MESSAGE) {
            Ok(file) => file,
            Err(failed) => return Ok(failed),
        };
        let req = build_voice_upload_request(&self.endpoint, &file);
        let resp = send(&req, &self.opts).await?;
        let transcription = parse_voice_upload_response(&resp.body)?;

        if transcription.trim().is_empty() {
            return Ok(QueryResponse {
                transcribed_text: Some(transcription),
                ..QueryResponse::failed("Could not understand the recording. Please try again.")
            });
        }

        let answer = self.ask(ctx, &transcription).await?;
        Ok(QueryResponse {
            transcribed_text: Some(transcription),
            ..QueryResponse::answered(answer)
        })
    }
}
