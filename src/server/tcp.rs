//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Servidor TCP que maneja múltiples conexiones simultáneas usando
//! threads: cada conexión se procesa en su propio thread. El núcleo de
//! mejora vive detrás del router; acá solo se lee el request completo
//! (head + body según Content-Length), se rutea y se responde.

use crate::config::Config;
use crate::enhancement::handlers;
use crate::enhancement::manager::EnhancementManager;
use crate::enhancement::processor::SimulatedEnhancer;
use crate::http::request::find_bytes;
use crate::http::{Method, Request, Response, StatusCode};
use crate::metrics::MetricsCollector;
use crate::router::Router;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Resultado de leer un request del socket
enum ReadOutcome {
    /// Request completo (head + body)
    Complete(Vec<u8>),

    /// El peer cerró sin enviar nada
    Closed,

    /// El request excede el límite configurado
    TooLarge,
}

/// Servidor HTTP/1.0 concurrente con métricas
pub struct Server {
    config: Config,
    router: Arc<Router>,
    metrics: MetricsCollector,
    manager: EnhancementManager,
    listener: Option<TcpListener>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let metrics = MetricsCollector::new();

        let processor = Arc::new(SimulatedEnhancer::new(Duration::from_millis(
            config.processing_delay_ms,
        )));
        let manager = EnhancementManager::new(processor, metrics.clone());

        let router = Self::build_router(&manager, &metrics);

        Self {
            config,
            router: Arc::new(router),
            metrics,
            manager,
            listener: None,
        }
    }

    /// Registra todas las rutas del servicio
    fn build_router(manager: &EnhancementManager, metrics: &MetricsCollector) -> Router {
        let mut router = Router::new();

        // API de mejora
        let submit_manager = manager.clone();
        router.register(
            Method::POST,
            "/api/enhancement",
            Box::new(move |request| handlers::submit_handler(request, &submit_manager)),
        );

        let result_manager = manager.clone();
        router.register(
            Method::GET,
            "/api/enhancement/result",
            Box::new(move |request| handlers::result_handler(request, &result_manager)),
        );

        let list_manager = manager.clone();
        router.register(
            Method::GET,
            "/api/enhancement/user",
            Box::new(move |request| handlers::list_handler(request, &list_manager)),
        );

        // Cancelación por DELETE, y por POST para clientes sin DELETE
        let cancel_manager = manager.clone();
        router.register(
            Method::DELETE,
            "/api/enhancement/cancel",
            Box::new(move |request| handlers::cancel_handler(request, &cancel_manager)),
        );
        let cancel_manager_post = manager.clone();
        router.register(
            Method::POST,
            "/api/enhancement/cancel",
            Box::new(move |request| handlers::cancel_handler(request, &cancel_manager_post)),
        );

        // Observabilidad
        let metrics_collector = metrics.clone();
        let metrics_manager = manager.clone();
        router.register(
            Method::GET,
            "/metrics",
            Box::new(move |_request| {
                let mut body = metrics_collector.get_metrics_json();
                body["state"] = metrics_manager.get_stats();
                Response::json(&body.to_string())
            }),
        );

        router.register(
            Method::GET,
            "/status",
            Box::new(|_request| {
                Response::json(r#"{"status": "ok", "service": "media-enhancement"}"#)
            }),
        );

        router
    }

    pub fn run(&mut self) -> std::io::Result<()> {
        let address = self.config.address();
        println!("[*] Iniciando servidor en {}", address);

        let listener = TcpListener::bind(&address)?;
        println!("[+] Servidor escuchando en {}", address);
        println!("[*] Modo concurrente: un thread por conexion\n");

        self.listener = Some(listener);
        let listener = match self.listener.as_ref() {
            Some(listener) => listener,
            None => unreachable!(),
        };

        let max_upload_bytes = self.config.max_upload_bytes;

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let router = Arc::clone(&self.router);
                    let metrics = self.metrics.clone();

                    let peer_addr = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());

                    println!(" ✅ Nueva conexión desde: {} (spawning thread)", peer_addr);

                    metrics.increment_active_connections();

                    thread::spawn(move || {
                        if let Err(e) =
                            Self::handle_connection_static(stream, router, metrics.clone(), max_upload_bytes)
                        {
                            eprintln!("   ❌ Error en thread: {}", e);
                        }
                        metrics.decrement_active_connections();
                    });
                }
                Err(e) => {
                    eprintln!("   ❌ Error al aceptar conexión: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Detiene el worker de mejora (los requests pendientes no se procesan)
    pub fn shutdown(&self) {
        self.manager.shutdown();
    }

    fn handle_connection_static(
        mut stream: TcpStream,
        router: Arc<Router>,
        metrics: MetricsCollector,
        max_upload_bytes: usize,
    ) -> std::io::Result<()> {
        let start = Instant::now();

        // Generar Request ID único
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        start.elapsed().as_nanos().hash(&mut hasher);
        thread::current().id().hash(&mut hasher);
        let request_id = format!("{:016x}", hasher.finish());
        let thread_id = format!("{:?}", thread::current().id());

        let buffer = match Self::read_request(&mut stream, max_upload_bytes)? {
            ReadOutcome::Complete(buffer) => buffer,
            ReadOutcome::Closed => {
                println!("   ✅ Conexión cerrada");
                return Ok(());
            }
            ReadOutcome::TooLarge => {
                let response = Response::error(StatusCode::BadRequest, "Request body too large");
                stream.write_all(&response.to_bytes())?;
                stream.flush()?;
                return Ok(());
            }
        };

        println!("   ✅ {} bytes [req_id: {}]", buffer.len(), &request_id[..8]);

        let (response, path) = match Request::parse(&buffer) {
            Ok(request) => {
                let path = request.path().to_string();
                println!("   ✅ {} {}", request.method().as_str(), path);
                (router.route(&request), path)
            }
            Err(e) => {
                println!("   ❌ Parse error: {}", e);
                (
                    Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e)),
                    "/error".to_string(),
                )
            }
        };

        // Agregar headers de observabilidad
        let mut response = response;
        response.add_header("X-Request-Id", &request_id);
        response.add_header("X-Worker-Thread", &thread_id);
        response.add_header("X-Worker-Pid", &std::process::id().to_string());

        stream.write_all(&response.to_bytes())?;
        stream.flush()?;

        let latency = start.elapsed();
        metrics.record_request(&path, response.status().as_u16(), latency);

        println!("   ✅ {} ({:.2}ms)\n", response.status(), latency.as_secs_f64() * 1000.0);

        Ok(())
    }

    /// Lee un request completo del socket
    ///
    /// Primero acumula hasta ver el fin del head (`\r\n\r\n`), después
    /// sigue leyendo hasta juntar los bytes que declara Content-Length.
    /// Los uploads multipart no entran en una sola lectura de 8 KiB.
    fn read_request(stream: &mut TcpStream, max_bytes: usize) -> std::io::Result<ReadOutcome> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];

        // 1. Leer hasta tener el head completo
        let header_end = loop {
            if let Some(pos) = find_bytes(&buffer, b"\r\n\r\n") {
                break pos;
            }

            let bytes_read = stream.read(&mut chunk)?;
            if bytes_read == 0 {
                if buffer.is_empty() {
                    return Ok(ReadOutcome::Closed);
                }
                // Peer cerró sin terminar el head: parsear lo que haya
                return Ok(ReadOutcome::Complete(buffer));
            }

            buffer.extend_from_slice(&chunk[..bytes_read]);
            if buffer.len() > max_bytes {
                return Ok(ReadOutcome::TooLarge);
            }
        };

        // 2. Leer el body según Content-Length
        let content_length = Self::content_length_from_head(&buffer[..header_end]);
        let total_expected = header_end + 4 + content_length;

        if total_expected > max_bytes {
            return Ok(ReadOutcome::TooLarge);
        }

        while buffer.len() < total_expected {
            let bytes_read = stream.read(&mut chunk)?;
            if bytes_read == 0 {
                // Peer cerró antes de mandar todo el body declarado
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);
        }

        // Descartar bytes extra más allá de lo declarado
        if buffer.len() > total_expected {
            buffer.truncate(total_expected);
        }

        Ok(ReadOutcome::Complete(buffer))
    }

    /// Extrae Content-Length de los bytes del head (0 si no viene)
    fn content_length_from_head(head: &[u8]) -> usize {
        let head_str = String::from_utf8_lossy(head);
        for line in head_str.split("\r\n").skip(1) {
            if let Some(colon_pos) = line.find(':') {
                let name = line[..colon_pos].trim();
                if name.eq_ignore_ascii_case("Content-Length") {
                    return line[colon_pos + 1..].trim().parse().unwrap_or(0);
                }
            }
        }
        0
    }
}
