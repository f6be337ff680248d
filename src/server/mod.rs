//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes (un thread por conexión)
//! 3. Lee y parsea requests HTTP (head + body según Content-Length)
//! 4. Rutea al handler y envía la response

pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::Server;
