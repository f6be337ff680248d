//! # Cola de Prioridad de Requests
//! src/enhancement/queue.rs
//!
//! Cola thread-safe que ordena requests pendientes por prioridad y,
//! dentro de la misma prioridad, por orden de llegada (timestamp de envío).
//!
//! `take_next` es la única operación bloqueante de todo el sistema y solo
//! la llama el worker. `close` la desbloquea para el shutdown.

use crate::enhancement::types::EnhancementRequest;
use std::collections::BinaryHeap;
use std::sync::{Arc, Mutex, Condvar};
use std::cmp::Ordering;

/// Wrapper para ordenar requests en el heap
#[derive(Clone)]
struct QueuedRequest {
    request: EnhancementRequest,
}

impl QueuedRequest {
    fn new(request: EnhancementRequest) -> Self {
        Self { request }
    }
}

// Implementar ordenamiento: mayor prioridad primero, y a igual prioridad
// el timestamp de envío menor (llegó antes) sale primero
impl PartialEq for QueuedRequest {
    fn eq(&self, other: &Self) -> bool {
        self.request.priority == other.request.priority
            && self.request.submitted_at == other.request.submitted_at
    }
}

impl Eq for QueuedRequest {}

impl PartialOrd for QueuedRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.request.priority.cmp(&other.request.priority) {
            Ordering::Equal => {
                // Misma prioridad: FIFO por timestamp
                // Invertimos para que BinaryHeap (max-heap) nos dé el menor
                other.request.submitted_at.cmp(&self.request.submitted_at)
            }
            ordering => ordering,
        }
    }
}

/// Estado interno protegido por el lock
struct QueueState {
    heap: BinaryHeap<QueuedRequest>,

    /// Una vez cerrada, `take_next` retorna None y `insert` deja de aceptar
    closed: bool,
}

/// Cola de prioridad thread-safe, sin límite de capacidad
pub struct PriorityQueue {
    state: Arc<Mutex<QueueState>>,

    /// Condvar para despertar al worker cuando llega un request
    condvar: Arc<Condvar>,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                closed: false,
            })),
            condvar: Arc::new(Condvar::new()),
        }
    }

    /// Encola un request pendiente
    ///
    /// Nunca bloquea. Retorna `false` si la cola ya fue cerrada
    /// (el request no se acepta durante el shutdown).
    pub fn insert(&self, request: EnhancementRequest) -> bool {
        let mut state = self.state.lock().unwrap();

        if state.closed {
            return false;
        }

        state.heap.push(QueuedRequest::new(request));

        // Despertar al worker si estaba esperando
        self.condvar.notify_one();

        true
    }

    /// Desencola el request de mayor prioridad
    ///
    /// Bloquea al worker hasta que haya un request disponible o la cola
    /// se cierre. Retorna `None` solo tras `close`: con el shutdown en
    /// marcha no se sirven más items, aunque queden pendientes.
    pub fn take_next(&self) -> Option<EnhancementRequest> {
        let mut state = self.state.lock().unwrap();

        loop {
            if state.closed {
                return None;
            }

            if let Some(queued) = state.heap.pop() {
                return Some(queued.request);
            }

            // Esperar a que haya requests (o al shutdown)
            state = self.condvar.wait(state).unwrap();
        }
    }

    /// Remueve un request específico por ID (para cancelación)
    ///
    /// Retorna `false` si el request ya no está en la cola: o el worker
    /// lo desencoló primero, o nunca existió. Para quien cancela, `false`
    /// significa "demasiado tarde", no un error.
    ///
    /// La remoción reconstruye el heap completo: O(n). A esta escala
    /// alcanza; con colas grandes haría falta un índice ID → posición.
    pub fn remove(&self, request_id: &str) -> bool {
        let mut state = self.state.lock().unwrap();

        let mut pending: Vec<QueuedRequest> = state.heap.drain().collect();

        let removed = pending
            .iter()
            .position(|queued| queued.request.id == request_id)
            .map(|idx| pending.remove(idx))
            .is_some();

        // Reconstruir el heap con los requests restantes
        state.heap = pending.into_iter().collect();

        removed
    }

    /// Cierra la cola: despierta al worker bloqueado y rechaza inserts
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.closed = true;
        self.condvar.notify_all();
    }

    /// Retorna el número de requests pendientes
    pub fn len(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.heap.len()
    }

    /// Verifica si la cola está vacía
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Obtiene estadísticas de la cola para /metrics
    pub fn stats(&self) -> QueueStats {
        let state = self.state.lock().unwrap();

        let mut by_priority = [0usize; 3]; // Low, Medium, High

        for queued in state.heap.iter() {
            let idx = queued.request.priority as usize - 1;
            by_priority[idx] += 1;
        }

        QueueStats {
            pending: state.heap.len(),
            low_priority: by_priority[0],
            medium_priority: by_priority[1],
            high_priority: by_priority[2],
        }
    }
}

impl Default for PriorityQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PriorityQueue {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            condvar: Arc::clone(&self.condvar),
        }
    }
}

/// Estadísticas de la cola
#[derive(Debug, Clone)]
pub struct QueueStats {
    pub pending: usize,
    pub low_priority: usize,
    pub medium_priority: usize,
    pub high_priority: usize,
}
