//! # Media Enhancement Server
//! src/lib.rs
//!
//! Servicio HTTP/1.0 concurrente de mejora de medios: acepta archivos
//! (imagen o video) con una prioridad, los ordena en una cola de prioridad
//! en memoria y los procesa uno a uno con un único worker de larga vida.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing y manejo del protocolo HTTP/1.0 (incluye multipart)
//! - `server`: Lógica del servidor TCP y manejo de conexiones
//! - `router`: Enrutamiento de peticiones a handlers
//! - `enhancement`: El núcleo del servicio (cola, store, worker, manager)
//! - `metrics`: Recolección de métricas y observabilidad
//!
//! ## Ejemplo de uso
//!
//! ```ignore
//! use enhancement_server::server::Server;
//! use enhancement_server::config::Config;
//!
//! let config = Config::default();
//! let mut server = Server::new(config);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod http;
pub mod config;
pub mod server;
pub mod router;
pub mod enhancement;
pub mod metrics;
