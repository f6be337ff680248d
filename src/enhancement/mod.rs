//! # Núcleo del Servicio de Mejora
//! src/enhancement/mod.rs
//!
//! Todo el ciclo de vida de un request de mejora vive acá:
//!
//! - `types`: request, resultado, prioridad, estados
//! - `error`: taxonomía de errores del núcleo
//! - `queue`: cola de prioridad bloqueante (el único punto de espera)
//! - `store`: historial de requests y resultados terminales en memoria
//! - `processor`: el paso opaco de mejora, detrás de un trait
//! - `worker`: loop del único consumidor de la cola
//! - `manager`: fachada que usan los handlers
//! - `handlers`: adaptadores HTTP

pub mod types;
pub mod error;
pub mod queue;
pub mod store;
pub mod processor;
pub mod worker;
pub mod manager;
pub mod handlers;

pub use manager::EnhancementManager;
pub use processor::{MediaProcessor, SimulatedEnhancer};
pub use types::{EnhancementRequest, EnhancementResponse, MediaType, Priority, ProcessingStatus};
