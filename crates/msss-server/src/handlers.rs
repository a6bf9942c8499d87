//! HTTP Handlers

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use msss_payments::{
    contacts::QUIZ_TAG, parse_credential, AssetKind, CheckoutRequest as PaymentCheckoutRequest,
    ContactUpsert, PurchaseError, Verification,
};

use crate::pages;
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
    pub marketing_configured: bool,
    pub downloads_signed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPurchaseRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub add_templates: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub url: String,
    pub session_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub rank: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
}

// ============================================================================
// Helpers
// ============================================================================

fn api_error(error: &PurchaseError) -> ApiError {
    api_error_with(error, error.user_message())
}

fn api_error_with(error: &PurchaseError, message: &str) -> ApiError {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message.to_string(),
            code: error.code().to_string(),
        }),
    )
}

/// Decode a JSON body regardless of `Content-Type`. An empty body is the
/// default request, so every rejection stays inside the JSON error contract.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes, invalid: &str) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected request body");
        api_error(&PurchaseError::InvalidRequest(invalid.to_string()))
    })
}

fn payments_not_configured() -> PurchaseError {
    PurchaseError::NotConfigured("STRIPE_SECRET_KEY not set".into())
}

/// All `Cookie` headers joined into one
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let joined = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");
    (!joined.is_empty()).then_some(joined)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.gateway.is_some(),
        marketing_configured: state.contacts.is_some(),
        downloads_signed: state.downloads_signed,
    })
}

/// Create a hosted checkout session
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let payload: CheckoutRequest = parse_body(&body, "Invalid checkout request")?;

    let gateway = state
        .gateway
        .as_ref()
        .ok_or_else(|| api_error(&payments_not_configured()))?;

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(|o| o.trim_end_matches('/').to_string())
        .unwrap_or_else(|| state.site_url.to_string());

    let request = PaymentCheckoutRequest {
        add_templates: payload.add_templates,
        success_url: format!("{origin}/success?session_id={{CHECKOUT_SESSION_ID}}"),
        cancel_url: format!("{origin}/#book"),
    };

    let session = gateway.create_session(&request).await.map_err(|e| {
        tracing::error!(error = %e, "Checkout error");
        api_error_with(&e, "Failed to create checkout session")
    })?;

    Ok(Json(CheckoutResponse {
        url: session.url,
        session_id: session.id,
    }))
}

/// Verify a completed checkout and issue the access cookie
pub async fn verify_purchase(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload: VerifyPurchaseRequest = parse_body(&body, "Session ID required")?;
    let session_id = payload.session_id.as_deref();

    // Input validation does not depend on configuration
    if session_id.is_none_or(|id| id.trim().is_empty()) {
        return Err(api_error(&PurchaseError::InvalidRequest(
            "Session ID required".into(),
        )));
    }

    let verifier = state
        .verifier
        .as_ref()
        .ok_or_else(|| api_error(&payments_not_configured()))?;

    match verifier.verify(session_id).await {
        Ok(Verification::Verified { purchase, credential }) => Ok((
            StatusCode::OK,
            [(header::SET_COOKIE, credential.to_header())],
            Json(purchase),
        )
            .into_response()),
        Ok(Verification::PaymentNotCompleted) => {
            Err(api_error(&PurchaseError::PaymentNotCompleted))
        }
        Err(e) => Err(api_error(&e)),
    }
}

/// Download the book
pub async fn download_book(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_download(&state, &headers, AssetKind::Book).await
}

/// Download the templates pack add-on
pub async fn download_templates(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve_download(&state, &headers, AssetKind::TemplatesAddon).await
}

async fn serve_download(state: &AppState, headers: &HeaderMap, kind: AssetKind) -> Response {
    let credential = parse_credential(cookie_header(headers).as_deref());

    let result = match (&state.gate, credential.as_deref()) {
        (Some(gate), credential) => gate.authorize(credential, kind).await,
        (None, None) => Err(PurchaseError::Unauthenticated),
        (None, Some(_)) => Err(payments_not_configured()),
    };

    match result {
        Ok(grant) => (
            StatusCode::FOUND,
            [
                (header::LOCATION, grant.location),
                (header::CACHE_CONTROL, "no-store".to_string()),
            ],
        )
            .into_response(),
        Err(e) => {
            if e.is_denial() {
                tracing::info!(asset = %kind, reason = %e, "Download refused");
            } else {
                tracing::error!(asset = %kind, error = %e, "Download failed");
            }
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let page = pages::error_page(&e, state.support_email.as_deref());
            (status, Html(page)).into_response()
        }
    }
}

/// Quiz sign-up: add the visitor to the marketing list
pub async fn subscribe(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubscribeResponse>, ApiError> {
    let payload: SubscribeRequest = parse_body(&body, "Email required")?;
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| api_error(&PurchaseError::InvalidRequest("Email required".into())))?;

    let contacts = state.contacts.as_ref().ok_or_else(|| {
        api_error(&PurchaseError::NotConfigured("OMNISEND_API_KEY not set".into()))
    })?;

    let contact = ContactUpsert::subscribed(email)
        .with_first_name(payload.first_name.unwrap_or_default())
        .with_tag(QUIZ_TAG)
        .with_property("morningPowerScore", payload.score.unwrap_or_else(|| Value::from("")))
        .with_property("morningRank", payload.rank.unwrap_or_else(|| Value::from("")));

    contacts.upsert_contact(&contact).await.map_err(|e| {
        tracing::error!(error = %e, "Subscribe error");
        api_error_with(&e, "Failed to subscribe")
    })?;

    Ok(Json(SubscribeResponse { success: true }))
}
