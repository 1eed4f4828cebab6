// main.rs
use geriapp::api_routes;
use geriapp::config::AppConfig;
use geriapp::input_process::Assistant;
use geriapp::interactive_mode::run_interactive_mode;
use geriapp::logging_setup::setup_logging;
use geriapp::session_manager::SessionManager;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;
use std::sync::Mutex;

fn startup_error(e: anyhow::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("{:#}", e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env().map_err(startup_error)?;
    setup_logging(&config.log_config).map_err(startup_error)?;

    info!("Starting GeriApp assistant on {}", config.bind_address);

    let assistant = Assistant::from_config(&config);

    if config.interactive_mode {
        let console_assistant = assistant.clone();
        // The console loop blocks on stdin, so it gets its own thread and runtime
        std::thread::spawn(move || {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to start console runtime: {}", e);
                    return;
                }
            };
            if let Err(e) = rt.block_on(run_interactive_mode(console_assistant)) {
                error!("Error in interactive mode: {}", e);
            }
        });
    }

    let assistant = web::Data::new(assistant);
    let sessions = web::Data::new(Mutex::new(SessionManager::new()));

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(assistant.clone())
            .app_data(sessions.clone())
            .configure(api_routes::configure)
    })
    .bind(config.bind_address)?
    .run()
    .await
}
