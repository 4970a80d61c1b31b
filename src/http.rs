use actix_web::{
    dev::Payload, error::ResponseError, error::UrlencodedError, http::StatusCode, web::Bytes,
    FromRequest, HttpRequest,
};
use futures::future::{FutureExt, LocalBoxFuture};

/// Largest webhook body we accept.
pub const MAX_PAYLOAD: usize = 1 << 20;

/// A raw GitHub webhook delivery: the event type and the unparsed body.
#[derive(Debug, Clone)]
pub struct Webhook {
    pub event: Option<String>,
    body: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("failed reading request data: {0}")]
    ActixError(#[from] actix_web::Error),
    #[error("malformed JSON payload: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("malformed form payload: {0}")]
    FormError(String),
}

impl From<UrlencodedError> for WebhookError {
    fn from(err: UrlencodedError) -> Self {
        Self::FormError(err.to_string())
    }
}

impl ResponseError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::ActixError(err) => err.as_response_error().status_code(),
            WebhookError::JsonError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebhookError::FormError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Webhook {
    pub fn new(event: Option<String>, body: Bytes) -> Self {
        Self { event, body }
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn payload<T>(&self) -> Result<T, WebhookError>
    where
        T: serde::de::DeserializeOwned,
    {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl FromRequest for Webhook {
    type Error = WebhookError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;
    type Config = ();

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let event = req
            .headers()
            .get("X-GitHub-Event")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Box::pin(
            Bytes::from_request(req, payload)
                .map(move |bytes| -> Result<Self, Self::Error> { Ok(Self::new(event, bytes?)) }),
        )
    }
}
