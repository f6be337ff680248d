//! # Store de Requests y Resultados
//! src/enhancement/store.rs
//!
//! Almacenamiento en memoria compartido entre handlers y el worker.
//! Mantiene dos mapas bajo locks independientes:
//! - `requests`: todo request alguna vez enviado, con su estado actual
//! - `results`: resultados terminales (Completed o Failed), indexados por ID
//!
//! Un request nunca sale de `requests`: al terminar, su estado se
//! actualiza al del resultado y el registro queda como historial para el
//! listado por usuario. En la carrera de cancelación ambos lados escriben
//! un resultado y el último write gana (ver `finish`).

use crate::enhancement::error::StoreError;
use crate::enhancement::types::{EnhancementRequest, EnhancementResponse, ProcessingStatus, RequestSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Store thread-safe de requests en vuelo y resultados terminales
pub struct RequestStore {
    requests: Arc<Mutex<HashMap<String, EnhancementRequest>>>,
    results: Arc<Mutex<HashMap<String, EnhancementResponse>>>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(HashMap::new())),
            results: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registra un request recién enviado
    ///
    /// Falla si el ID ya está en uso (request vivo o resultado existente).
    pub fn insert(&self, request: EnhancementRequest) -> Result<(), StoreError> {
        let mut requests = self.requests.lock().unwrap();

        if requests.contains_key(&request.id) {
            return Err(StoreError::DuplicateId(request.id));
        }

        {
            let results = self.results.lock().unwrap();
            if results.contains_key(&request.id) {
                return Err(StoreError::DuplicateId(request.id));
            }
        }

        requests.insert(request.id.clone(), request);
        Ok(())
    }

    /// Obtiene una copia del request con su estado actual
    pub fn get_request(&self, request_id: &str) -> Option<EnhancementRequest> {
        let requests = self.requests.lock().unwrap();
        requests.get(request_id).cloned()
    }

    /// Marca un request como Processing y retorna la copia actualizada
    ///
    /// Solo transiciona requests en Queued. Retorna `None` si el request
    /// no existe o ya dejó ese estado (p.ej. una cancelación ganó la
    /// carrera entre el dequeue y este paso).
    pub fn mark_processing(&self, request_id: &str) -> Option<EnhancementRequest> {
        let mut requests = self.requests.lock().unwrap();

        let request = requests.get_mut(request_id)?;
        if request.status != ProcessingStatus::Queued {
            return None;
        }
        request.status = ProcessingStatus::Processing;
        Some(request.clone())
    }

    /// Registra el resultado terminal de un request
    ///
    /// El request queda en el mapa con su estado actualizado al del
    /// resultado, como historial para el listado por usuario.
    /// Sobrescribe sin chequear: en la carrera cancelación/worker ambos
    /// lados escriben un resultado para el mismo ID y el último gana.
    pub fn finish(&self, request_id: &str, response: EnhancementResponse) {
        let mut requests = self.requests.lock().unwrap();
        let mut results = self.results.lock().unwrap();

        if let Some(request) = requests.get_mut(request_id) {
            request.status = response.status;
        }
        results.insert(request_id.to_string(), response);
    }

    /// Descarta un request que nunca va a procesarse
    ///
    /// Lo usa `submit` cuando la cola rechaza el insert durante el
    /// shutdown: el registro no debe quedar como Queued eterno.
    pub fn remove(&self, request_id: &str) {
        let mut requests = self.requests.lock().unwrap();
        requests.remove(request_id);
    }

    /// Obtiene una copia del resultado terminal de un request
    ///
    /// La lectura no consume: se puede pedir el mismo resultado N veces.
    pub fn get_result(&self, request_id: &str) -> Option<EnhancementResponse> {
        let results = self.results.lock().unwrap();
        results.get(request_id).cloned()
    }

    /// Lista todos los requests de un usuario (sin los bytes del archivo)
    ///
    /// Incluye los terminados: es el historial completo del usuario, con
    /// el estado actual de cada request.
    ///
    /// El contrato no promete ningún orden; ordenar por antigüedad es un
    /// extra deliberado para que el cliente vea una lista estable.
    pub fn list_by_user(&self, user_id: &str) -> Vec<RequestSummary> {
        let requests = self.requests.lock().unwrap();

        let mut summaries: Vec<RequestSummary> = requests
            .values()
            .filter(|request| request.user_id == user_id)
            .map(RequestSummary::from)
            .collect();

        summaries.sort_by_key(|summary| summary.submitted_at);

        summaries
    }

    /// Cuenta los requests por estado, para /metrics
    pub fn stats(&self) -> StoreStats {
        let requests = self.requests.lock().unwrap();
        let results = self.results.lock().unwrap();

        let mut queued = 0;
        let mut processing = 0;

        for request in requests.values() {
            match request.status {
                ProcessingStatus::Queued => queued += 1,
                ProcessingStatus::Processing => processing += 1,
                _ => {}
            }
        }

        let mut completed = 0;
        let mut failed = 0;

        for response in results.values() {
            match response.status {
                ProcessingStatus::Completed => completed += 1,
                ProcessingStatus::Failed => failed += 1,
                _ => {}
            }
        }

        StoreStats {
            queued,
            processing,
            completed,
            failed,
        }
    }
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for RequestStore {
    fn clone(&self) -> Self {
        Self {
            requests: Arc::clone(&self.requests),
            results: Arc::clone(&self.results),
        }
    }
}

/// Conteo de requests por estado
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub queued: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhancement::types::{MediaType, Priority};

    fn sample_request(id: &str, user_id: &str) -> EnhancementRequest {
        EnhancementRequest::new(
            id.to_string(),
            user_id.to_string(),
            "clip.mp4".to_string(),
            vec![0xCA, 0xFE],
            MediaType::Video,
            Priority::Medium,
        )
    }

    #[test]
    fn test_insert_and_get() {
        let store = RequestStore::new();
        store.insert(sample_request("req-1", "user-1")).unwrap();

        let request = store.get_request("req-1").unwrap();
        assert_eq!(request.user_id, "user-1");
        assert_eq!(request.status, ProcessingStatus::Queued);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = RequestStore::new();
        store.insert(sample_request("req-1", "user-1")).unwrap();

        let result = store.insert(sample_request("req-1", "user-2"));
        assert!(matches!(result, Err(StoreError::DuplicateId(_))));
    }

    #[test]
    fn test_mark_processing_updates_status() {
        let store = RequestStore::new();
        store.insert(sample_request("req-1", "user-1")).unwrap();

        let request = store.mark_processing("req-1").unwrap();
        assert_eq!(request.status, ProcessingStatus::Processing);
        assert_eq!(
            store.get_request("req-1").unwrap().status,
            ProcessingStatus::Processing
        );
    }

    #[test]
    fn test_mark_processing_missing_returns_none() {
        let store = RequestStore::new();
        assert!(store.mark_processing("ghost").is_none());
    }

    #[test]
    fn test_mark_processing_only_from_queued() {
        let store = RequestStore::new();
        let request = sample_request("req-1", "user-1");
        store.insert(request.clone()).unwrap();

        // Una cancelación ya lo dejó terminal: el worker no debe tomarlo
        store.finish(
            "req-1",
            EnhancementResponse::failed(&request, "Request cancelled by user".to_string()),
        );

        assert!(store.mark_processing("req-1").is_none());
        assert_eq!(
            store.get_request("req-1").unwrap().status,
            ProcessingStatus::Failed
        );
    }

    #[test]
    fn test_finish_keeps_request_with_final_status() {
        let store = RequestStore::new();
        let request = sample_request("req-1", "user-1");
        store.insert(request.clone()).unwrap();

        store.finish("req-1", EnhancementResponse::completed(&request, vec![1]));

        // El request no desaparece: queda como historial con estado final
        let kept = store.get_request("req-1").unwrap();
        assert_eq!(kept.status, ProcessingStatus::Completed);
        let result = store.get_result("req-1").unwrap();
        assert_eq!(result.status, ProcessingStatus::Completed);
    }

    #[test]
    fn test_remove_discards_request() {
        let store = RequestStore::new();
        store.insert(sample_request("req-1", "user-1")).unwrap();

        store.remove("req-1");

        assert!(store.get_request("req-1").is_none());
        assert!(store.list_by_user("user-1").is_empty());
    }

    #[test]
    fn test_finish_last_write_wins() {
        let store = RequestStore::new();
        let request = sample_request("req-1", "user-1");
        store.insert(request.clone()).unwrap();

        store.finish(
            "req-1",
            EnhancementResponse::failed(&request, "Request cancelled by user".to_string()),
        );
        store.finish("req-1", EnhancementResponse::completed(&request, vec![1]));

        // La segunda escritura sobrescribe a la primera, también en el
        // estado del request
        let result = store.get_result("req-1").unwrap();
        assert_eq!(result.status, ProcessingStatus::Completed);
        assert_eq!(
            store.get_request("req-1").unwrap().status,
            ProcessingStatus::Completed
        );
    }

    #[test]
    fn test_get_result_is_repeatable() {
        let store = RequestStore::new();
        let request = sample_request("req-1", "user-1");
        store.insert(request.clone()).unwrap();
        store.finish("req-1", EnhancementResponse::completed(&request, vec![7]));

        assert!(store.get_result("req-1").is_some());
        assert!(store.get_result("req-1").is_some());
    }

    #[test]
    fn test_list_by_user_filters_and_sorts() {
        let store = RequestStore::new();

        let mut first = sample_request("req-1", "user-1");
        first.submitted_at = 100;
        let mut second = sample_request("req-2", "user-1");
        second.submitted_at = 50;
        let other = sample_request("req-3", "user-2");

        store.insert(first).unwrap();
        store.insert(second).unwrap();
        store.insert(other).unwrap();

        let listed = store.list_by_user("user-1");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "req-2");
        assert_eq!(listed[1].id, "req-1");
    }

    #[test]
    fn test_list_by_user_includes_finished_requests() {
        let store = RequestStore::new();
        let request = sample_request("req-1", "user-1");
        store.insert(request.clone()).unwrap();

        store.finish("req-1", EnhancementResponse::completed(&request, vec![]));

        let listed = store.list_by_user("user-1");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].status, ProcessingStatus::Completed);
    }

    #[test]
    fn test_stats_counts_by_status() {
        let store = RequestStore::new();
        let done = sample_request("req-done", "user-1");

        store.insert(sample_request("req-q", "user-1")).unwrap();
        store.insert(sample_request("req-p", "user-1")).unwrap();
        store.insert(done.clone()).unwrap();

        store.mark_processing("req-p");
        store.finish("req-done", EnhancementResponse::completed(&done, vec![]));

        let stats = store.stats();
        assert_eq!(stats.queued, 1);
        assert_eq!(stats.processing, 1);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.failed, 0);
    }
}
