//! # Paso de Procesamiento de Medios
//! src/enhancement/processor.rs
//!
//! El trabajo real de mejora vive detrás del trait `MediaProcessor`.
//! El worker no sabe qué hay adentro: le entrega el request y recibe bytes
//! mejorados o un error. Eso permite enchufar un procesador instantáneo en
//! los tests y el simulado (con delay fijo) en producción.

use crate::enhancement::error::ProcessingError;
use crate::enhancement::types::EnhancementRequest;
use std::time::Duration;

/// Paso opaco de mejora de un archivo de medios
///
/// `Send + Sync` porque la instancia se comparte con el thread del worker.
pub trait MediaProcessor: Send + Sync {
    /// Procesa el request y retorna los bytes mejorados
    fn process(&self, request: &EnhancementRequest) -> Result<Vec<u8>, ProcessingError>;
}

/// Procesador simulado: duerme un delay fijo y retorna los bytes originales
///
/// Es el que corre en producción mientras no exista un pipeline real de
/// mejora. El delay imita el costo del procesamiento y hace observable el
/// estado Processing desde afuera.
pub struct SimulatedEnhancer {
    delay: Duration,
}

impl SimulatedEnhancer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl MediaProcessor for SimulatedEnhancer {
    fn process(&self, request: &EnhancementRequest) -> Result<Vec<u8>, ProcessingError> {
        std::thread::sleep(self.delay);
        Ok(request.file_data.clone())
    }
}

#[cfg(test)]
pub mod test_support {
    //! Procesadores de juguete para tests del worker y el manager

    use super::*;

    /// Retorna los bytes originales de inmediato, sin delay
    pub struct InstantProcessor;

    impl MediaProcessor for InstantProcessor {
        fn process(&self, request: &EnhancementRequest) -> Result<Vec<u8>, ProcessingError> {
            Ok(request.file_data.clone())
        }
    }

    /// Falla siempre con la misma razón
    pub struct FailingProcessor {
        pub reason: &'static str,
    }

    impl MediaProcessor for FailingProcessor {
        fn process(&self, _request: &EnhancementRequest) -> Result<Vec<u8>, ProcessingError> {
            Err(ProcessingError::new(self.reason))
        }
    }

    /// Duerme un delay configurable antes de responder, para tests que
    /// necesitan observar el estado Processing
    pub struct SlowProcessor {
        pub delay: Duration,
    }

    impl MediaProcessor for SlowProcessor {
        fn process(&self, request: &EnhancementRequest) -> Result<Vec<u8>, ProcessingError> {
            std::thread::sleep(self.delay);
            Ok(request.file_data.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::enhancement::types::{MediaType, Priority};

    fn sample_request() -> EnhancementRequest {
        EnhancementRequest::new(
            "req-1".to_string(),
            "user-1".to_string(),
            "photo.jpg".to_string(),
            vec![10, 20, 30],
            MediaType::Image,
            Priority::Medium,
        )
    }

    #[test]
    fn test_simulated_enhancer_returns_payload() {
        let enhancer = SimulatedEnhancer::new(Duration::from_millis(0));
        let enhanced = enhancer.process(&sample_request()).unwrap();
        assert_eq!(enhanced, vec![10, 20, 30]);
    }

    #[test]
    fn test_failing_processor_reports_reason() {
        let processor = FailingProcessor { reason: "corrupt frame" };
        let error = processor.process(&sample_request()).unwrap_err();
        assert_eq!(error.reason(), "corrupt frame");
    }
}
