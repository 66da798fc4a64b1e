use serde::{Deserialize, Serialize};

use crate::contract::{CoreRequest, CoreResponse};
use crate::core_service::{CoreService, ServiceError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    ItemNotFound,
    Catalog,
    Config,
    Shortcut,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

const SERIALIZE_FAILURE: &str =
    r#"{"status":"err","error":{"code":"invalid_request","message":"response serialization failed"}}"#;

pub fn handle_request(service: &mut CoreService, request: CoreRequest) -> TransportResponse {
    match service.handle_command(request) {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => {
            log::warn!("event=transport_request status=error error={error}");
            TransportResponse::Err {
                error: map_service_error(error),
            }
        }
    }
}

/// Decodes one JSON request and always answers with a JSON response.
pub fn handle_json(service: &mut CoreService, payload: &str) -> String {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => handle_request(service, request),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    encode(&response)
}

pub fn encode(response: &TransportResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|error| {
        log::error!("event=transport_encode status=error error={error}");
        SERIALIZE_FAILURE.to_string()
    })
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    let message = error.to_string();
    let code = match error {
        ServiceError::InvalidRequest(_) => ErrorCode::InvalidRequest,
        ServiceError::ItemNotFound(_) => ErrorCode::ItemNotFound,
        ServiceError::Catalog(_) => ErrorCode::Catalog,
        ServiceError::Config(_) => ErrorCode::Config,
        ServiceError::Shortcut(_) => ErrorCode::Shortcut,
    };
    ErrorResponse { code, message }
}
