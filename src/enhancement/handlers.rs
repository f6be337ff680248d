//! # Handlers HTTP del Servicio de Mejora
//! src/enhancement/handlers.rs
//!
//! Adaptadores finos entre HTTP y el manager: extraen parámetros del
//! request, delegan en `EnhancementManager` y traducen el resultado a un
//! status code con body JSON. Acá no vive ninguna regla de negocio.

use crate::enhancement::error::SubmitError;
use crate::enhancement::manager::EnhancementManager;
use crate::enhancement::types::{MediaType, Priority};
use crate::http::multipart::parse_multipart;
use crate::http::{Request, Response, StatusCode};

/// POST /api/enhancement - Envía un archivo a mejorar
///
/// Body multipart/form-data con campos `userId`, `mediaType`, `priority`
/// (opcional, default medium) y la parte de archivo `file`.
///
/// Retorna 202 Accepted con el ID asignado; el procesamiento es asíncrono.
pub fn submit_handler(request: &Request, manager: &EnhancementManager) -> Response {
    let content_type = match request.header("Content-Type") {
        Some(value) => value,
        None => {
            return Response::error(StatusCode::BadRequest, "Missing Content-Type header");
        }
    };

    let form = match parse_multipart(content_type, request.body()) {
        Ok(form) => form,
        Err(error) => {
            return Response::error(StatusCode::BadRequest, &error.to_string());
        }
    };

    let user_id = form.field("userId").unwrap_or("");

    let media_type = match form.field("mediaType") {
        Some(value) => match MediaType::from_str(value) {
            Some(media_type) => media_type,
            None => {
                return Response::error(StatusCode::BadRequest, "Invalid media type");
            }
        },
        None => {
            return Response::error(StatusCode::BadRequest, "Media type is required");
        }
    };

    let priority = match form.field("priority") {
        Some(value) => match Priority::from_str(value) {
            Some(priority) => priority,
            None => {
                return Response::error(StatusCode::BadRequest, "Invalid priority");
            }
        },
        None => Priority::default(),
    };

    let file = match form.file("file") {
        Some(file) => file,
        None => {
            return Response::error(StatusCode::BadRequest, "File is required");
        }
    };

    match manager.submit(
        user_id,
        &file.file_name,
        file.data.clone(),
        media_type,
        priority,
    ) {
        Ok(request_id) => {
            let body = serde_json::json!({
                "requestId": request_id,
                "status": "queued",
                "message": "Enhancement request accepted",
            });
            Response::json_with_status(StatusCode::Accepted, &body.to_string())
        }
        Err(error) => {
            let status = match error {
                SubmitError::QueueClosed => StatusCode::ServiceUnavailable,
                _ => StatusCode::BadRequest,
            };
            Response::error(status, &error.to_string())
        }
    }
}

/// GET /api/enhancement/result?id={requestId} - Consulta el resultado
///
/// - Terminal: 200 con el resultado completo
/// - Vivo: 200 con la vista transitoria ("Request is queued/processing")
/// - Desconocido: 404
pub fn result_handler(request: &Request, manager: &EnhancementManager) -> Response {
    let request_id = match request.query_param("id") {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Response::error(StatusCode::BadRequest, "Missing parameter: id");
        }
    };

    match manager.get_result(request_id) {
        Some(result) => match serde_json::to_string(&result) {
            Ok(body) => Response::json(&body),
            Err(_) => Response::error(StatusCode::InternalServerError, "Serialization error"),
        },
        None => Response::error(StatusCode::NotFound, "Request not found"),
    }
}

/// GET /api/enhancement/user?id={userId} - Lista los requests del usuario
///
/// El historial completo con el estado actual de cada uno, incluidos los
/// terminados; el resultado con los bytes se consulta por ID en el
/// endpoint de resultado.
pub fn list_handler(request: &Request, manager: &EnhancementManager) -> Response {
    let user_id = match request.query_param("id") {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Response::error(StatusCode::BadRequest, "Missing parameter: id");
        }
    };

    let summaries = manager.list_requests(user_id);
    match serde_json::to_string(&summaries) {
        Ok(body) => Response::json(&body),
        Err(_) => Response::error(StatusCode::InternalServerError, "Serialization error"),
    }
}

/// DELETE /api/enhancement/cancel?id={requestId} - Cancela un request
///
/// Retorna 204 siempre que el parámetro venga, haya tomado efecto o no:
/// la cancelación es best-effort y el estado real se ve en el resultado.
pub fn cancel_handler(request: &Request, manager: &EnhancementManager) -> Response {
    let request_id = match request.query_param("id") {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Response::error(StatusCode::BadRequest, "Missing parameter: id");
        }
    };

    manager.cancel(request_id);
    Response::new(StatusCode::NoContent)
}
