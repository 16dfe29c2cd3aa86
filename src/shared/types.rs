use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload shared by every non-2xx response.
///
/// `request_id` is only present on generic 500s; it correlates the response
/// with the server-side log stream without leaking internal detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
