//! # Media Enhancement Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor de mejora de medios.

use enhancement_server::config::Config;
use enhancement_server::server::Server;

fn main() {
    println!("=================================");
    println!("  Media Enhancement Server");
    println!("=================================\n");

    // Configuración desde CLI y variables de entorno
    let config = Config::new();

    if let Err(e) = config.validate() {
        eprintln!("💥 Configuración inválida: {}", e);
        std::process::exit(1);
    }

    config.print_summary();

    // Crear el servidor (arranca el worker de mejora)
    let mut server = Server::new(config);

    // Iniciar el servidor (esto bloqueará el thread)
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
