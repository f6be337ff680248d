//! # Errores del Servicio de Mejora
//! src/enhancement/error.rs
//!
//! Taxonomía de errores del núcleo:
//! - `SubmitError`: entrada inválida, rechazada antes de encolar
//! - `StoreError`: violaciones del store (ID duplicado)
//! - `ProcessingError`: el paso de procesamiento falló; se absorbe en un
//!   resultado Failed, nunca se propaga como crash
//!
//! "No encontrado" NO es un error: las búsquedas retornan `Option`.

/// Errores de validación al enviar un request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// El ID de usuario está vacío
    EmptyUserId,

    /// El nombre de archivo está vacío
    EmptyFileName,

    /// El archivo no tiene bytes
    EmptyPayload,

    /// Ya existe un request con este ID (en la práctica inalcanzable,
    /// los IDs se generan frescos)
    DuplicateId(String),

    /// El servicio está en shutdown y la cola no acepta más requests
    QueueClosed,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitError::EmptyUserId => write!(f, "User ID is required"),
            SubmitError::EmptyFileName => write!(f, "File name is required"),
            SubmitError::EmptyPayload => write!(f, "File is required"),
            SubmitError::DuplicateId(id) => write!(f, "Duplicate request ID: {}", id),
            SubmitError::QueueClosed => write!(f, "Service is shutting down"),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Errores del RequestStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Se intentó insertar un request con un ID ya existente
    DuplicateId(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::DuplicateId(id) => write!(f, "Request ID already exists: {}", id),
        }
    }
}

impl std::error::Error for StoreError {}

/// Falla del paso opaco de procesamiento de medios
///
/// El worker la convierte en un resultado Failed; el cliente solo la ve
/// a través del mensaje del resultado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingError {
    reason: String,
}

impl ProcessingError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl std::fmt::Display for ProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Processing failed: {}", self.reason)
    }
}

impl std::error::Error for ProcessingError {}
