use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, Request, State};
use axum::http::{StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sdm_mac::sv2::UID_LEN;
use sdm_mac::{ErrorKind, Verification, VerifierConfig, verify_params};
use serde::{Deserialize, Serialize};

use crate::keys::KeyProvider;
use crate::metric::{Metrics, Outcome};

pub const VALIDATE_PATH: &str = "/api/validate";
pub const MISSING_UID: &str = "<missing>";
pub const INVALID_UID: &str = "<invalid>";
pub const TIMED_OUT: &str = "<timeout>";

const MISSING_PARAMETERS: &str = "Missing parameters (uid, ctr, cmac)";

/// Shared by every request; holds no per-request state.
#[derive(Clone)]
pub struct AppState {
    key_provider: Arc<dyn KeyProvider + Send + Sync>,
    metrics: Arc<Metrics>,
    expose_trace: bool,
    request_timeout: Duration,
}

/// Body of `POST /api/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// The query parameters a tag mirrors into its URL.
#[derive(Debug, Default, Deserialize)]
pub struct SdmParams {
    pub uid: Option<String>,
    pub ctr: Option<String>,
    pub cmac: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub success: bool,
    pub valid: bool,
    pub message: String,
    pub calculated_sdmmac: String,
    pub provided_cmac: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Details {
    pub sv2: String,
    pub full_cmac: String,
    pub steps: Steps,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Steps {
    pub cmac_calculation: Vec<String>,
    pub sdmmac_calculation: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    fn client(message: &str) -> Self {
        ErrorResponse {
            success: false,
            message: Some(message.to_string()),
            error: None,
        }
    }

    fn internal() -> Self {
        ErrorResponse {
            success: false,
            message: None,
            error: Some("Internal server error".to_string()),
        }
    }
}

impl ValidateResponse {
    fn from_verification(verification: &Verification) -> Self {
        let valid = verification.matched();
        let message = if valid {
            "CMAC validation succeeded"
        } else {
            "CMAC validation failed"
        };

        // Intermediate values are only attached when the trace was requested.
        let details = verification.trace().map(|trace| Details {
            sv2: verification.sv2().to_string(),
            full_cmac: verification.full_cmac().to_string(),
            steps: Steps {
                cmac_calculation: trace.cmac_calculation.clone(),
                sdmmac_calculation: trace.sdmmac_calculation.clone(),
            },
        });

        ValidateResponse {
            success: valid,
            valid,
            message: message.to_string(),
            calculated_sdmmac: verification.sdmmac().to_string(),
            provided_cmac: verification.provided_mac().to_string(),
            details,
        }
    }
}

/// Key under which a request is counted in [`Metrics`].
///
/// Only well-formed UIDs become keys of their own, so request input cannot
/// grow the store with arbitrary strings.
fn metrics_label(uid: Option<&str>) -> &str {
    match uid {
        None | Some("") => MISSING_UID,
        Some(uid) if is_well_formed_uid(uid) => uid,
        Some(_) => INVALID_UID,
    }
}

fn is_well_formed_uid(uid: &str) -> bool {
    uid.len() == UID_LEN * 2 && uid.bytes().all(|b| b.is_ascii_hexdigit())
}

impl AppState {
    pub fn new(
        key_provider: Arc<dyn KeyProvider + Send + Sync>,
        metrics: Arc<Metrics>,
        expose_trace: bool,
        request_timeout: Duration,
    ) -> Self {
        Self {
            key_provider,
            metrics,
            expose_trace,
            request_timeout,
        }
    }

    fn validate(&self, params: &SdmParams) -> Response {
        let label = metrics_label(params.uid.as_deref());

        let master_key = match self.key_provider.master_key() {
            Ok(key) => key,
            Err(e) => {
                log::error!("master key unavailable: {e}");
                return self.fail(label);
            }
        };
        let config = VerifierConfig::new(master_key).with_trace(self.expose_trace);

        let result = verify_params(
            params.uid.as_deref(),
            params.ctr.as_deref(),
            params.cmac.as_deref(),
            &config,
        );
        match result {
            Ok(verification) => self.respond(label, &verification),
            Err(e) => match e.kind() {
                ErrorKind::Input => self.reject(label, MISSING_PARAMETERS),
                ErrorKind::Format => self.reject(label, &e.to_string()),
                ErrorKind::Internal => {
                    log::error!("verification of uid {label} failed: {e}");
                    self.fail(label)
                }
            },
        }
    }

    fn respond(&self, uid: &str, verification: &Verification) -> Response {
        let valid = verification.matched();
        log::info!(
            "uid {uid}: computed {} provided {} match={valid}",
            verification.sdmmac(),
            verification.provided_mac()
        );
        if let Some(trace) = verification.trace() {
            for step in trace
                .cmac_calculation
                .iter()
                .chain(&trace.sdmmac_calculation)
            {
                log::debug!("{step}");
            }
        }

        let outcome = if valid {
            Outcome::Valid
        } else {
            Outcome::Invalid
        };
        self.metrics.record(uid, outcome);

        (
            StatusCode::OK,
            Json(ValidateResponse::from_verification(verification)),
        )
            .into_response()
    }

    fn reject(&self, uid: &str, message: &str) -> Response {
        log::info!("rejected request for {uid}: {message}");
        self.metrics.record(uid, Outcome::Rejected);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::client(message))).into_response()
    }

    fn fail(&self, uid: &str) -> Response {
        self.metrics.record(uid, Outcome::Failed);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal()),
        )
            .into_response()
    }
}

/// `POST /api/validate` with `{"url": "..."}`.
pub async fn validate_url(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Response {
    let url = match payload {
        Ok(Json(request)) => request.url.unwrap_or_default(),
        Err(rejection) => {
            return state.reject(MISSING_UID, &rejection.body_text());
        }
    };

    let url = url.trim();
    if url.is_empty() {
        return state.reject(MISSING_UID, "URL must not be empty");
    }

    let uri: Uri = match url.parse() {
        Ok(uri) => uri,
        Err(e) => return state.reject(MISSING_UID, &format!("Invalid URL: {e}")),
    };

    match Query::<SdmParams>::try_from_uri(&uri) {
        Ok(Query(params)) => state.validate(&params),
        Err(rejection) => state.reject(MISSING_UID, &rejection.body_text()),
    }
}

/// `GET /api/validate?uid=..&ctr=..&cmac=..`, the URL a tag emits.
pub async fn validate_query(
    State(state): State<AppState>,
    params: Result<Query<SdmParams>, QueryRejection>,
) -> Response {
    match params {
        Ok(Query(params)) => state.validate(&params),
        Err(rejection) => state.reject(MISSING_UID, &rejection.body_text()),
    }
}

/// Bound the whole request, body extraction included.
pub async fn enforce_timeout(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(state.request_timeout, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            log::warn!("request exceeded {:?}", state.request_timeout);
            state.metrics.record(TIMED_OUT, Outcome::Failed);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::client("Request timed out")),
            )
                .into_response()
        }
    }
}
