//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Recolecta y agrega métricas del servidor en tiempo real: tráfico HTTP
//! (latencias, códigos de estado, rutas) y el ciclo de vida de los
//! requests de mejora (enviados, completados, fallidos, cancelados).

use crate::enhancement::types::ProcessingStatus;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
struct MetricsData {
    /// Contador total de requests HTTP
    total_requests: u64,

    /// Requests por código de estado
    status_codes: HashMap<u16, u64>,

    /// Latencias HTTP registradas (en microsegundos)
    latencies: Vec<u64>,

    /// Máximo de latencias a guardar (para calcular percentiles)
    max_latencies: usize,

    /// Requests HTTP por ruta
    requests_per_path: HashMap<String, u64>,

    /// Conexiones siendo atendidas actualmente
    active_connections: u64,

    /// Requests de mejora enviados
    submitted: u64,

    /// Requests de mejora completados por el worker
    completed: u64,

    /// Requests de mejora fallidos en el worker
    failed: u64,

    /// Requests de mejora cancelados por el usuario
    cancelled: u64,

    /// Latencias de procesamiento del worker (en microsegundos)
    processing_latencies: Vec<u64>,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData {
                total_requests: 0,
                status_codes: HashMap::new(),
                latencies: Vec::with_capacity(10000),
                max_latencies: 10000, // Guardar últimas 10k latencias
                requests_per_path: HashMap::new(),
                active_connections: 0,
                submitted: 0,
                completed: 0,
                failed: 0,
                cancelled: 0,
                processing_latencies: Vec::with_capacity(1000),
            })),
            start_time: Instant::now(),
        }
    }

    /// Registra un request HTTP atendido
    pub fn record_request(&self, path: &str, status_code: u16, latency: Duration) {
        let mut data = self.inner.lock().unwrap();

        data.total_requests += 1;
        *data.status_codes.entry(status_code).or_insert(0) += 1;

        let latency_us = latency.as_micros() as u64;

        // Si tenemos demasiadas latencias, eliminar las más antiguas
        if data.latencies.len() >= data.max_latencies {
            data.latencies.remove(0);
        }
        data.latencies.push(latency_us);

        *data.requests_per_path.entry(path.to_string()).or_insert(0) += 1;
    }

    /// Registra un request de mejora recién encolado
    pub fn record_submitted(&self) {
        let mut data = self.inner.lock().unwrap();
        data.submitted += 1;
    }

    /// Registra una cancelación aplicada
    pub fn record_cancelled(&self) {
        let mut data = self.inner.lock().unwrap();
        data.cancelled += 1;
    }

    /// Registra un request procesado por el worker con su latencia
    pub fn record_processed(&self, status: ProcessingStatus, latency: Duration) {
        let mut data = self.inner.lock().unwrap();

        match status {
            ProcessingStatus::Completed => data.completed += 1,
            ProcessingStatus::Failed => data.failed += 1,
            _ => {}
        }

        let latency_us = latency.as_micros() as u64;
        if data.processing_latencies.len() >= data.max_latencies {
            data.processing_latencies.remove(0);
        }
        data.processing_latencies.push(latency_us);
    }

    /// Incrementa el contador de conexiones activas
    pub fn increment_active_connections(&self) {
        let mut data = self.inner.lock().unwrap();
        data.active_connections += 1;
    }

    /// Decrementa el contador de conexiones activas
    pub fn decrement_active_connections(&self) {
        let mut data = self.inner.lock().unwrap();
        if data.active_connections > 0 {
            data.active_connections -= 1;
        }
    }

    /// Obtiene el número de conexiones activas
    pub fn active_connections(&self) -> u64 {
        let data = self.inner.lock().unwrap();
        data.active_connections
    }

    /// Obtiene las métricas actuales como JSON
    pub fn get_metrics_json(&self) -> serde_json::Value {
        let data = self.inner.lock().unwrap();

        let uptime_secs = self.start_time.elapsed().as_secs();

        let (http_p50, http_p95, http_p99, http_avg) = percentiles(&data.latencies);
        let (proc_p50, proc_p95, proc_p99, proc_avg) = percentiles(&data.processing_latencies);

        let status_codes: HashMap<String, u64> = data
            .status_codes
            .iter()
            .map(|(code, count)| (code.to_string(), *count))
            .collect();

        // Top 10 rutas más accedidas
        let mut paths: Vec<_> = data.requests_per_path.iter().collect();
        paths.sort_by(|a, b| b.1.cmp(a.1));
        let top_paths: Vec<serde_json::Value> = paths
            .iter()
            .take(10)
            .map(|(path, count)| json!({"path": path, "count": count}))
            .collect();

        json!({
            "server": {
                "uptime_seconds": uptime_secs,
            },
            "http": {
                "total_requests": data.total_requests,
                "active_connections": data.active_connections,
                "status_codes": status_codes,
                "top_paths": top_paths,
                "latency_us": {
                    "p50": http_p50,
                    "p95": http_p95,
                    "p99": http_p99,
                    "avg": http_avg,
                    "samples": data.latencies.len(),
                },
            },
            "enhancement": {
                "submitted": data.submitted,
                "completed": data.completed,
                "failed": data.failed,
                "cancelled": data.cancelled,
                "processing_latency_us": {
                    "p50": proc_p50,
                    "p95": proc_p95,
                    "p99": proc_p99,
                    "avg": proc_avg,
                    "samples": data.processing_latencies.len(),
                },
            },
        })
    }

    /// Obtiene un snapshot de las métricas
    pub fn get_snapshot(&self) -> MetricsSnapshot {
        let data = self.inner.lock().unwrap();
        let (p50, p95, p99, avg) = percentiles(&data.latencies);

        MetricsSnapshot {
            total_requests: data.total_requests,
            active_connections: data.active_connections,
            uptime_secs: self.start_time.elapsed().as_secs(),
            submitted: data.submitted,
            completed: data.completed,
            failed: data.failed,
            cancelled: data.cancelled,
            latency_p50_us: p50,
            latency_p95_us: p95,
            latency_p99_us: p99,
            latency_avg_us: avg,
        }
    }
}

/// Calcula percentiles (p50, p95, p99) y promedio de latencias
fn percentiles(latencies: &[u64]) -> (u64, u64, u64, u64) {
    if latencies.is_empty() {
        return (0, 0, 0, 0);
    }

    let mut sorted = latencies.to_vec();
    sorted.sort_unstable();

    let len = sorted.len();
    let p50 = sorted[len * 50 / 100];
    let p95 = sorted[len * 95 / 100];
    let p99 = sorted[len * 99 / 100];

    let sum: u64 = sorted.iter().sum();
    let avg = sum / len as u64;

    (p50, p95, p99, avg)
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot de métricas (para uso externo)
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub active_connections: u64,
    pub uptime_secs: u64,
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
    pub cancelled: u64,
    pub latency_p50_us: u64,
    pub latency_p95_us: u64,
    pub latency_p99_us: u64,
    pub latency_avg_us: u64,
}
