//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Recolección y agregación de métricas del servidor:
//! - Contadores de requests HTTP y latencias (p50, p95, p99)
//! - Ciclo de vida de los requests de mejora (enviados, completados,
//!   fallidos, cancelados)
//! - Conexiones activas

pub mod collector;

pub use collector::MetricsCollector;
