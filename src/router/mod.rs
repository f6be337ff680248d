//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Router que mapea método + path HTTP a handlers.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router → Handler → Response
//! ```
//!
//! Los handlers son closures que capturan el manager y las métricas, así
//! el router no conoce el núcleo del servicio. Si no hay handler para el
//! par método/path, retorna 404 Not Found.

use crate::http::{Method, Request, Response, StatusCode};

/// Tipo de función handler
///
/// Un handler recibe un Request y retorna una Response. Es un closure
/// boxeado para poder capturar estado compartido (manager, métricas).
pub type Handler = Box<dyn Fn(&Request) -> Response + Send + Sync>;

/// Router que mapea método + path a handlers
pub struct Router {
    /// Rutas registradas: (método, path, handler)
    routes: Vec<(Method, String, Handler)>,
}

impl Router {
    /// Crea un nuevo router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Registra una ruta con su handler
    ///
    /// # Ejemplo
    /// ```
    /// use enhancement_server::router::Router;
    /// use enhancement_server::http::{Method, Response};
    ///
    /// let mut router = Router::new();
    /// router.register(Method::GET, "/status", Box::new(|_req| {
    ///     Response::json(r#"{"status": "ok"}"#)
    /// }));
    /// ```
    pub fn register(&mut self, method: Method, path: &str, handler: Handler) {
        self.routes.push((method, path.to_string(), handler));
    }

    /// Encuentra y ejecuta el handler apropiado para un request
    ///
    /// Si no encuentra un handler para el par método/path, retorna 404.
    pub fn route(&self, request: &Request) -> Response {
        let path = request.path();

        for (method, route_path, handler) in &self.routes {
            if *method == request.method() && route_path == path {
                let mut response = handler(request);
                self.add_common_headers(&mut response);
                return response;
            }
        }

        let mut response =
            Response::error(StatusCode::NotFound, &format!("Route not found: {}", path));
        self.add_common_headers(&mut response);
        response
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(&self, response: &mut Response) {
        response.add_header("Server", "Enhancement-HTTP/1.0");
        response.add_header("Connection", "close");
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
