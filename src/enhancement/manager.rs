//! # Gestor Central de Mejora
//! src/enhancement/manager.rs
//!
//! Fachada del servicio: encolado, consulta de resultados, listado por
//! usuario y cancelación. Es el único punto de entrada de los handlers
//! HTTP al núcleo; ellos no tocan la cola ni el store directamente.

use crate::enhancement::error::{StoreError, SubmitError};
use crate::enhancement::processor::MediaProcessor;
use crate::enhancement::queue::PriorityQueue;
use crate::enhancement::store::RequestStore;
use crate::enhancement::types::{
    EnhancementRequest, EnhancementResponse, MediaType, Priority, RequestSummary,
};
use crate::enhancement::worker;
use crate::metrics::MetricsCollector;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Contador global para desempatar IDs generados en el mismo instante
static SUBMIT_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Gestor central del servicio de mejora
pub struct EnhancementManager {
    queue: PriorityQueue,
    store: RequestStore,
    metrics: MetricsCollector,

    /// Handle del thread del worker, consumido por `shutdown`
    worker_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl EnhancementManager {
    /// Crea el gestor y arranca el worker
    pub fn new(processor: Arc<dyn MediaProcessor>, metrics: MetricsCollector) -> Self {
        let queue = PriorityQueue::new();
        let store = RequestStore::new();

        let worker_queue = queue.clone();
        let worker_store = store.clone();
        let worker_metrics = metrics.clone();

        let handle = thread::spawn(move || {
            worker::worker_loop(worker_queue, worker_store, processor, worker_metrics)
        });

        Self {
            queue,
            store,
            metrics,
            worker_handle: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Envía un nuevo request de mejora
    ///
    /// Valida la entrada, lo registra como Queued y lo encola. Retorna el
    /// ID asignado; el resultado se consulta después con `get_result`.
    pub fn submit(
        &self,
        user_id: &str,
        file_name: &str,
        file_data: Vec<u8>,
        media_type: MediaType,
        priority: Priority,
    ) -> Result<String, SubmitError> {
        if user_id.trim().is_empty() {
            return Err(SubmitError::EmptyUserId);
        }
        if file_name.trim().is_empty() {
            return Err(SubmitError::EmptyFileName);
        }
        if file_data.is_empty() {
            return Err(SubmitError::EmptyPayload);
        }

        let request_id = Self::generate_request_id();

        let request = EnhancementRequest::new(
            request_id.clone(),
            user_id.to_string(),
            file_name.to_string(),
            file_data,
            media_type,
            priority,
        );

        self.store.insert(request.clone()).map_err(|error| match error {
            StoreError::DuplicateId(id) => SubmitError::DuplicateId(id),
        })?;

        // La cola solo rechaza durante el shutdown. No dejar en el store
        // un registro Queued que ningún worker va a resolver.
        if !self.queue.insert(request) {
            self.store.remove(&request_id);
            return Err(SubmitError::QueueClosed);
        }

        self.metrics.record_submitted();

        println!(
            "📥 Request {} submitted by {} (priority {})",
            request_id,
            user_id,
            priority.as_str()
        );

        Ok(request_id)
    }

    /// Consulta el resultado de un request
    ///
    /// - Terminal: retorna el resultado almacenado (lectura repetible)
    /// - Vivo: retorna una vista transitoria con el estado actual
    /// - Desconocido: `None`
    pub fn get_result(&self, request_id: &str) -> Option<EnhancementResponse> {
        if let Some(result) = self.store.get_result(request_id) {
            return Some(result);
        }

        self.store
            .get_request(request_id)
            .map(|request| EnhancementResponse::in_progress(&request))
    }

    /// Lista todos los requests de un usuario con su estado actual
    ///
    /// El historial completo: también los terminados siguen apareciendo.
    pub fn list_requests(&self, user_id: &str) -> Vec<RequestSummary> {
        self.store.list_by_user(user_id)
    }

    /// Cancela un request si todavía está en cola
    ///
    /// Retorna `true` si la cancelación tomó efecto. Un request que ya
    /// está Processing, terminó o no existe no se toca y retorna `false`.
    ///
    /// Carrera conocida con el worker: si el dequeue ocurre entre el
    /// chequeo de estado y la escritura del resultado, ambos lados
    /// escriben y el último gana. Se acepta: no hay cancelación real del
    /// procesamiento en curso a esta escala.
    pub fn cancel(&self, request_id: &str) -> bool {
        let request = match self.store.get_request(request_id) {
            Some(request) => request,
            None => return false,
        };

        if !request.is_cancelable() {
            return false;
        }

        // Sacarlo de la cola si el worker no lo tomó todavía. Si ya no
        // está, seguimos igual: el resultado cancelado queda escrito y
        // el que escriba último gana.
        self.queue.remove(request_id);

        let cancelled =
            EnhancementResponse::failed(&request, "Request cancelled by user".to_string());
        self.store.finish(request_id, cancelled);
        self.metrics.record_cancelled();

        println!("🚫 Request {} cancelled by user {}", request_id, request.user_id);

        true
    }

    /// Estadísticas de cola y store para /metrics
    pub fn get_stats(&self) -> serde_json::Value {
        let queue_stats = self.queue.stats();
        let store_stats = self.store.stats();

        serde_json::json!({
            "queue": {
                "pending": queue_stats.pending,
                "low": queue_stats.low_priority,
                "medium": queue_stats.medium_priority,
                "high": queue_stats.high_priority,
            },
            "requests": {
                "queued": store_stats.queued,
                "processing": store_stats.processing,
                "completed": store_stats.completed,
                "failed": store_stats.failed,
            },
        })
    }

    /// Cierra la cola y espera a que el worker termine
    ///
    /// Los requests que quedaron pendientes no se procesan.
    pub fn shutdown(&self) {
        println!("🛑 Shutting down enhancement manager");
        self.queue.close();

        let handle = {
            let mut guard = self.worker_handle.lock().unwrap();
            guard.take()
        };

        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    /// Genera un ID único para el request
    fn generate_request_id() -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();

        let mut hasher = DefaultHasher::new();
        now.hash(&mut hasher);
        thread::current().id().hash(&mut hasher);
        SUBMIT_COUNTER.fetch_add(1, Ordering::Relaxed).hash(&mut hasher);

        format!("req-{:016x}", hasher.finish())
    }
}

impl Clone for EnhancementManager {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            store: self.store.clone(),
            metrics: self.metrics.clone(),
            worker_handle: Arc::clone(&self.worker_handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancement::error::ProcessingError;
    use crate::enhancement::processor::test_support::InstantProcessor;
    use crate::enhancement::types::ProcessingStatus;
    use std::time::Duration;

    /// Registra el orden en que procesa y deja pasar los bytes
    struct RecordingProcessor {
        processed: Arc<Mutex<Vec<String>>>,
        delay: Duration,
    }

    impl MediaProcessor for RecordingProcessor {
        fn process(&self, request: &EnhancementRequest) -> Result<Vec<u8>, ProcessingError> {
            thread::sleep(self.delay);
            self.processed.lock().unwrap().push(request.file_name.clone());
            Ok(request.file_data.clone())
        }
    }

    fn instant_manager() -> EnhancementManager {
        EnhancementManager::new(Arc::new(InstantProcessor), MetricsCollector::new())
    }

    fn wait_for_terminal(manager: &EnhancementManager, id: &str) -> EnhancementResponse {
        for _ in 0..200 {
            if let Some(result) = manager.get_result(id) {
                if result.status.is_terminal() {
                    return result;
                }
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("request {} did not reach a terminal state", id);
    }

    #[test]
    fn test_submit_and_complete() {
        let manager = instant_manager();

        let id = manager
            .submit("user-1", "photo.jpg", vec![1, 2, 3], MediaType::Image, Priority::Medium)
            .unwrap();

        let result = wait_for_terminal(&manager, &id);
        assert_eq!(result.status, ProcessingStatus::Completed);
        assert_eq!(result.enhanced_data, Some(vec![1, 2, 3]));
        assert_eq!(result.message, "Enhancement completed successfully");

        manager.shutdown();
    }

    #[test]
    fn test_submit_validates_input() {
        let manager = instant_manager();

        assert_eq!(
            manager.submit("", "f.jpg", vec![1], MediaType::Image, Priority::Low),
            Err(SubmitError::EmptyUserId)
        );
        assert_eq!(
            manager.submit("user-1", "", vec![1], MediaType::Image, Priority::Low),
            Err(SubmitError::EmptyFileName)
        );
        assert_eq!(
            manager.submit("user-1", "f.jpg", vec![], MediaType::Image, Priority::Low),
            Err(SubmitError::EmptyPayload)
        );

        manager.shutdown();
    }

    #[test]
    fn test_requests_processed_in_priority_order() {
        let processed = Arc::new(Mutex::new(Vec::new()));
        let processor = RecordingProcessor {
            processed: Arc::clone(&processed),
            delay: Duration::from_millis(80),
        };
        let manager = EnhancementManager::new(Arc::new(processor), MetricsCollector::new());

        // El primero ocupa al worker mientras encolamos los demás
        let blocker = manager
            .submit("user-1", "blocker.jpg", vec![0], MediaType::Image, Priority::High)
            .unwrap();

        thread::sleep(Duration::from_millis(10));
        let a = manager
            .submit("user-1", "a.jpg", vec![0], MediaType::Image, Priority::High)
            .unwrap();
        thread::sleep(Duration::from_millis(2));
        let b = manager
            .submit("user-1", "b.jpg", vec![0], MediaType::Image, Priority::Low)
            .unwrap();
        thread::sleep(Duration::from_millis(2));
        let c = manager
            .submit("user-1", "c.jpg", vec![0], MediaType::Image, Priority::High)
            .unwrap();

        for id in [&blocker, &a, &b, &c] {
            wait_for_terminal(&manager, id);
        }

        // High sale antes que Low; a igual prioridad gana el más antiguo
        let order = processed.lock().unwrap().clone();
        assert_eq!(order, vec!["blocker.jpg", "a.jpg", "c.jpg", "b.jpg"]);

        manager.shutdown();
    }

    #[test]
    fn test_cancel_queued_request() {
        let processed = Arc::new(Mutex::new(Vec::new()));
        let processor = RecordingProcessor {
            processed: Arc::clone(&processed),
            delay: Duration::from_millis(100),
        };
        let manager = EnhancementManager::new(Arc::new(processor), MetricsCollector::new());

        let blocker = manager
            .submit("user-1", "blocker.jpg", vec![0], MediaType::Image, Priority::High)
            .unwrap();
        thread::sleep(Duration::from_millis(10));

        let victim = manager
            .submit("user-1", "victim.jpg", vec![0], MediaType::Image, Priority::Low)
            .unwrap();

        assert!(manager.cancel(&victim));

        let result = manager.get_result(&victim).unwrap();
        assert_eq!(result.status, ProcessingStatus::Failed);
        assert_eq!(result.message, "Request cancelled by user");

        // El cancelado nunca llega al procesador
        wait_for_terminal(&manager, &blocker);
        thread::sleep(Duration::from_millis(50));
        assert!(!processed.lock().unwrap().contains(&"victim.jpg".to_string()));

        manager.shutdown();
    }

    #[test]
    fn test_cancel_is_rejected_for_terminal_request() {
        let manager = instant_manager();

        let id = manager
            .submit("user-1", "photo.jpg", vec![1], MediaType::Image, Priority::High)
            .unwrap();
        wait_for_terminal(&manager, &id);

        assert!(!manager.cancel(&id));

        // El resultado original queda intacto
        let result = manager.get_result(&id).unwrap();
        assert_eq!(result.status, ProcessingStatus::Completed);

        manager.shutdown();
    }

    #[test]
    fn test_cancel_unknown_id() {
        let manager = instant_manager();
        assert!(!manager.cancel("req-ghost"));
        manager.shutdown();
    }

    #[test]
    fn test_get_result_transient_view_while_queued() {
        let processed = Arc::new(Mutex::new(Vec::new()));
        let processor = RecordingProcessor {
            processed: Arc::clone(&processed),
            delay: Duration::from_millis(150),
        };
        let manager = EnhancementManager::new(Arc::new(processor), MetricsCollector::new());

        let blocker = manager
            .submit("user-1", "blocker.jpg", vec![0], MediaType::Image, Priority::High)
            .unwrap();
        thread::sleep(Duration::from_millis(10));

        let waiting = manager
            .submit("user-1", "waiting.jpg", vec![0], MediaType::Image, Priority::Low)
            .unwrap();

        let view = manager.get_result(&waiting).unwrap();
        assert_eq!(view.status, ProcessingStatus::Queued);
        assert_eq!(view.message, "Request is queued");
        assert!(view.enhanced_data.is_none());

        wait_for_terminal(&manager, &blocker);
        wait_for_terminal(&manager, &waiting);
        manager.shutdown();
    }

    #[test]
    fn test_get_result_unknown_id_is_none() {
        let manager = instant_manager();
        assert!(manager.get_result("req-nope").is_none());
        manager.shutdown();
    }

    #[test]
    fn test_get_result_is_idempotent() {
        let manager = instant_manager();

        let id = manager
            .submit("user-1", "photo.jpg", vec![5], MediaType::Image, Priority::Medium)
            .unwrap();
        let first = wait_for_terminal(&manager, &id);
        let second = manager.get_result(&id).unwrap();

        assert_eq!(first, second);
        manager.shutdown();
    }

    #[test]
    fn test_list_requests_by_user() {
        let processed = Arc::new(Mutex::new(Vec::new()));
        let processor = RecordingProcessor {
            processed: Arc::clone(&processed),
            delay: Duration::from_millis(200),
        };
        let manager = EnhancementManager::new(Arc::new(processor), MetricsCollector::new());

        manager
            .submit("user-1", "one.jpg", vec![0], MediaType::Image, Priority::High)
            .unwrap();
        thread::sleep(Duration::from_millis(10));
        manager
            .submit("user-1", "two.mp4", vec![0], MediaType::Video, Priority::Low)
            .unwrap();
        manager
            .submit("user-2", "other.jpg", vec![0], MediaType::Image, Priority::Low)
            .unwrap();

        let listed = manager.list_requests("user-1");
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|summary| summary.user_id == "user-1"));

        assert!(manager.list_requests("user-none").is_empty());

        manager.shutdown();
    }

    #[test]
    fn test_list_requests_keeps_finished_requests() {
        let manager = instant_manager();

        let id = manager
            .submit("user-1", "photo.jpg", vec![1], MediaType::Image, Priority::Medium)
            .unwrap();
        wait_for_terminal(&manager, &id);

        // El request terminado sigue en el historial con su estado final
        let listed = manager.list_requests("user-1");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].status, ProcessingStatus::Completed);

        manager.shutdown();
    }

    #[test]
    fn test_submit_after_shutdown_is_rejected() {
        let manager = instant_manager();
        manager.shutdown();

        let result =
            manager.submit("user-1", "late.jpg", vec![1], MediaType::Image, Priority::High);
        assert_eq!(result, Err(SubmitError::QueueClosed));

        // No queda ningún registro huérfano en Queued
        assert!(manager.list_requests("user-1").is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let manager = instant_manager();

        let first = manager
            .submit("user-1", "a.jpg", vec![1], MediaType::Image, Priority::Low)
            .unwrap();
        let second = manager
            .submit("user-1", "b.jpg", vec![1], MediaType::Image, Priority::Low)
            .unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("req-"));

        manager.shutdown();
    }

    #[test]
    fn test_shutdown_stops_worker() {
        let manager = instant_manager();
        manager.shutdown();
        // Doble shutdown no debe entrar en pánico
        manager.shutdown();
    }
}
