use oauth_token::{ErrorCode, Provider};
use serde_json::Value;

use crate::protocol::{
    error, provider_error, success, JsonRpcRequest, JsonRpcResponse, ReadRequest, SchemaResponse,
    METHOD_READ, METHOD_SCHEMA,
};

/// Schemas of every registered data source, keyed by type name.
pub fn schema_response(provider: &Provider) -> SchemaResponse {
    SchemaResponse {
        data_sources: provider
            .schema()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    }
}

pub async fn handle_request(provider: &Provider, request: JsonRpcRequest) -> JsonRpcResponse {
    let id = request.id.unwrap_or(Value::Null);

    match request.method.as_str() {
        METHOD_SCHEMA => match serde_json::to_value(schema_response(provider)) {
            Ok(result) => success(id, result),
            Err(e) => error(id, ErrorCode::InternalError.code(), e.to_string(), None),
        },
        METHOD_READ => {
            let read: ReadRequest = match serde_json::from_value(request.params) {
                Ok(read) => read,
                Err(e) => {
                    return error(
                        id,
                        ErrorCode::InvalidParams.code(),
                        format!("invalid {} params: {}", METHOD_READ, e),
                        None,
                    )
                }
            };

            match provider.read(&read.type_name, read.config).await {
                Ok(state) => match serde_json::to_value(state) {
                    Ok(result) => success(id, result),
                    Err(e) => error(id, ErrorCode::InternalError.code(), e.to_string(), None),
                },
                Err(e) => {
                    tracing::warn!(data_source = %read.type_name, "Read failed: {}", e);
                    provider_error(id, &e)
                }
            }
        }
        _ => error(
            id,
            ErrorCode::MethodNotFound.code(),
            format!("method not found: {}", request.method),
            None,
        ),
    }
}
