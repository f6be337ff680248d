//! # Worker de Procesamiento
//! src/enhancement/worker.rs
//!
//! El único consumidor de la cola. Corre en un thread de larga vida:
//! desencola el request de mayor prioridad, lo marca Processing, invoca al
//! procesador y registra el resultado terminal en el store.
//!
//! El loop absorbe las fallas del procesador como resultados Failed; lo
//! único que lo termina es el cierre de la cola.

use crate::enhancement::processor::MediaProcessor;
use crate::enhancement::queue::PriorityQueue;
use crate::enhancement::store::RequestStore;
use crate::enhancement::types::EnhancementResponse;
use crate::metrics::MetricsCollector;
use std::sync::Arc;
use std::time::Instant;

/// Loop principal del worker
///
/// Retorna cuando `take_next` devuelve `None` (cola cerrada).
pub fn worker_loop(
    queue: PriorityQueue,
    store: RequestStore,
    processor: Arc<dyn MediaProcessor>,
    metrics: MetricsCollector,
) {
    println!("🔧 Enhancement worker started");

    while let Some(request) = queue.take_next() {
        // Marcar Processing. Si la transición falla es que una cancelación
        // dejó el request terminal entre el dequeue y este punto: se salta.
        let request = match store.mark_processing(&request.id) {
            Some(request) => request,
            None => {
                println!("⏭️  Worker skipped request {} (cancelled before pickup)", request.id);
                continue;
            }
        };

        println!(
            "🔨 Worker picked up request {} ({} {}, priority {})",
            request.id,
            request.media_type.as_str(),
            request.file_name,
            request.priority.as_str()
        );

        let started = Instant::now();

        // La falla del procesador se absorbe como resultado Failed:
        // el loop nunca muere por un request malo
        let response = match processor.process(&request) {
            Ok(enhanced_data) => {
                println!("✅ Worker completed request {}", request.id);
                EnhancementResponse::completed(&request, enhanced_data)
            }
            Err(error) => {
                println!("❌ Worker failed request {}: {}", request.id, error);
                EnhancementResponse::failed(&request, error.to_string())
            }
        };

        metrics.record_processed(response.status, started.elapsed());

        // Último write gana: si una cancelación ya escribió un resultado
        // para este ID, esta escritura lo sobrescribe
        store.finish(&request.id, response);
    }

    println!("🛑 Enhancement worker stopped");
}
