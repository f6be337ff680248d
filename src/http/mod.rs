//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.0 desde cero, sin librerías de alto
//! nivel. Incluye:
//!
//! - Parsing de requests HTTP/1.0 (con bodies binarios)
//! - Decodificación de multipart/form-data para uploads
//! - Construcción de responses HTTP
//! - Manejo de status codes
//! - Extracción de query parameters
//!
//! ## Especificación HTTP/1.0
//!
//! El protocolo HTTP/1.0 (RFC 1945) es más simple que HTTP/1.1:
//! - No requiere el header `Host`
//! - No tiene chunked transfer encoding
//! - No mantiene conexiones persistentes por defecto
//!
//! ### Formato de Request
//!
//! ```text
//! POST /api/enhancement HTTP/1.0\r\n
//! Content-Type: multipart/form-data; boundary=XYZ\r\n
//! Content-Length: 1234\r\n
//! \r\n
//! <body>
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 202 Accepted\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 24\r\n
//! \r\n
//! {"requestId": "req-abc"}
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP
pub mod multipart; // Decodificación de multipart/form-data

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
