//! # Tipos y Estructuras del Servicio de Mejora
//! src/enhancement/types.rs
//!
//! Define los tipos fundamentales: tipo de medio, prioridad, estado de
//! procesamiento, el request encolado y el resultado final.

use serde::{Serialize, Deserialize};

/// Tipo de medio que se va a mejorar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "image" => Some(MediaType::Image),
            "video" => Some(MediaType::Video),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }
}

/// Prioridad de un request
///
/// El valor numérico define el orden: mayor valor sale primero de la cola.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// Estado de procesamiento de un request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingStatus {
    /// En la cola esperando al worker
    Queued,

    /// Siendo procesado por el worker
    Processing,

    /// Procesado exitosamente
    Completed,

    /// Falló (error de procesamiento o cancelación)
    Failed,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Queued => "queued",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    /// Verifica si el estado es terminal (ya no cambia)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }
}

/// Timestamp actual en microsegundos desde epoch
///
/// Microsegundos para que dos submits consecutivos casi nunca empaten:
/// el orden entre prioridades iguales se decide por este valor.
pub fn now_micros() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_micros() as u64
}

/// Request de mejora de un archivo de medios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementRequest {
    /// ID único del request
    pub id: String,

    /// Usuario dueño del request
    pub user_id: String,

    /// Nombre original del archivo
    pub file_name: String,

    /// Bytes del archivo original
    #[serde(skip_serializing)]
    #[serde(default)]
    pub file_data: Vec<u8>,

    /// Tipo de medio
    pub media_type: MediaType,

    /// Prioridad
    pub priority: Priority,

    /// Timestamp de envío (microsegundos desde epoch)
    pub submitted_at: u64,

    /// Estado actual
    pub status: ProcessingStatus,
}

impl EnhancementRequest {
    /// Crea un nuevo request en estado Queued con timestamp actual
    pub fn new(
        id: String,
        user_id: String,
        file_name: String,
        file_data: Vec<u8>,
        media_type: MediaType,
        priority: Priority,
    ) -> Self {
        Self {
            id,
            user_id,
            file_name,
            file_data,
            media_type,
            priority,
            submitted_at: now_micros(),
            status: ProcessingStatus::Queued,
        }
    }

    /// Verifica si el request todavía puede cancelarse
    pub fn is_cancelable(&self) -> bool {
        self.status == ProcessingStatus::Queued
    }
}

/// Resumen de un request para el listado por usuario (sin los bytes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSummary {
    pub id: String,
    pub user_id: String,
    pub file_name: String,
    pub media_type: MediaType,
    pub priority: Priority,
    pub submitted_at: u64,
    pub status: ProcessingStatus,
}

impl From<&EnhancementRequest> for RequestSummary {
    fn from(request: &EnhancementRequest) -> Self {
        Self {
            id: request.id.clone(),
            user_id: request.user_id.clone(),
            file_name: request.file_name.clone(),
            media_type: request.media_type,
            priority: request.priority,
            submitted_at: request.submitted_at,
            status: request.status,
        }
    }
}

/// Resultado final de un request
///
/// Se crea exactamente una vez (por el worker o por una cancelación) y es
/// inmutable a partir de ahí.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancementResponse {
    /// ID del request que originó este resultado
    pub request_id: String,

    pub user_id: String,

    pub file_name: String,

    /// Bytes mejorados (solo presente si el procesamiento fue exitoso)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub enhanced_data: Option<Vec<u8>>,

    pub media_type: MediaType,

    /// Estado final (o transitorio en la vista de estado)
    pub status: ProcessingStatus,

    /// Timestamp de finalización (microsegundos desde epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub completed_at: Option<u64>,

    /// Mensaje legible para el cliente
    pub message: String,
}

impl EnhancementResponse {
    /// Resultado exitoso con los bytes mejorados
    pub fn completed(request: &EnhancementRequest, enhanced_data: Vec<u8>) -> Self {
        Self {
            request_id: request.id.clone(),
            user_id: request.user_id.clone(),
            file_name: request.file_name.clone(),
            enhanced_data: Some(enhanced_data),
            media_type: request.media_type,
            status: ProcessingStatus::Completed,
            completed_at: Some(now_micros()),
            message: "Enhancement completed successfully".to_string(),
        }
    }

    /// Resultado fallido con la causa
    pub fn failed(request: &EnhancementRequest, message: String) -> Self {
        Self {
            request_id: request.id.clone(),
            user_id: request.user_id.clone(),
            file_name: request.file_name.clone(),
            enhanced_data: None,
            media_type: request.media_type,
            status: ProcessingStatus::Failed,
            completed_at: Some(now_micros()),
            message,
        }
    }

    /// Vista transitoria del estado de un request aún no terminado
    ///
    /// No lleva bytes mejorados ni timestamp de finalización.
    pub fn in_progress(request: &EnhancementRequest) -> Self {
        Self {
            request_id: request.id.clone(),
            user_id: request.user_id.clone(),
            file_name: request.file_name.clone(),
            enhanced_data: None,
            media_type: request.media_type,
            status: request.status,
            completed_at: None,
            message: format!("Request is {}", request.status.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request(priority: Priority) -> EnhancementRequest {
        EnhancementRequest::new(
            "req-test".to_string(),
            "user-1".to_string(),
            "photo.jpg".to_string(),
            vec![1, 2, 3],
            MediaType::Image,
            priority,
        )
    }

    #[test]
    fn test_status_serialization() {
        let status = ProcessingStatus::Processing;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"processing\"");
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn test_priority_default_is_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_media_type_parsing() {
        assert_eq!(MediaType::from_str("IMAGE"), Some(MediaType::Image));
        assert_eq!(MediaType::from_str("video"), Some(MediaType::Video));
        assert_eq!(MediaType::from_str("audio"), None);
    }

    #[test]
    fn test_request_starts_queued() {
        let request = sample_request(Priority::Medium);
        assert_eq!(request.status, ProcessingStatus::Queued);
        assert!(request.is_cancelable());
        assert!(request.submitted_at > 0);
    }

    #[test]
    fn test_response_completed() {
        let request = sample_request(Priority::High);
        let response = EnhancementResponse::completed(&request, vec![9, 9]);

        assert_eq!(response.status, ProcessingStatus::Completed);
        assert_eq!(response.enhanced_data, Some(vec![9, 9]));
        assert!(response.completed_at.is_some());
        assert_eq!(response.message, "Enhancement completed successfully");
    }

    #[test]
    fn test_response_in_progress_has_no_payload() {
        let request = sample_request(Priority::Low);
        let response = EnhancementResponse::in_progress(&request);

        assert_eq!(response.status, ProcessingStatus::Queued);
        assert!(response.enhanced_data.is_none());
        assert!(response.completed_at.is_none());
        assert_eq!(response.message, "Request is queued");
    }

    #[test]
    fn test_summary_drops_file_data() {
        let request = sample_request(Priority::Medium);
        let summary = RequestSummary::from(&request);
        let json = serde_json::to_string(&summary).unwrap();

        assert!(json.contains("photo.jpg"));
        assert!(!json.contains("file_data"));
    }
}
