//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de mejora de medios con soporte para
//! argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./enhancement_server --port 8080 \
//!   --processing-delay-ms 5000 \
//!   --max-upload-bytes 10485760
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 ./enhancement_server
//! ```

use clap::Parser;

/// Configuración del servidor de mejora de medios
#[derive(Debug, Clone, Parser)]
#[command(name = "enhancement_server")]
#[command(about = "Servidor HTTP/1.0 de mejora de medios con cola de prioridad")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Delay simulado de procesamiento por request, en milisegundos
    #[arg(long = "processing-delay-ms", default_value = "5000", env = "PROCESSING_DELAY_MS")]
    pub processing_delay_ms: u64,

    /// Tamaño máximo del body de un request, en bytes
    #[arg(long = "max-upload-bytes", default_value = "10485760", env = "MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use enhancement_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.max_upload_bytes == 0 {
            return Err("Max upload size must be >= 1 byte".to_string());
        }
        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║           Media Enhancement Server Configuration             ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:          {}", self.address());
        println!();
        println!("🎞️  Processing:");
        println!("   Worker threads:   1 (single dispatcher)");
        println!("   Simulated delay:  {} ms", self.processing_delay_ms);
        println!("   Max upload size:  {} bytes", self.max_upload_bytes);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            processing_delay_ms: 5_000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
