use actix_web::{App, HttpServer};
use std::io;

use whiteboard_server::config::ServerConfig;
use whiteboard_server::handlers::{cors, root};
use whiteboard_server::server::spawn_server;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config =
        ServerConfig::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let bind_addr = config.bind_addr();
    log::info!(
        "Starting whiteboard relay on {} (unclaimed policy: {:?})",
        bind_addr,
        config.unclaimed_policy
    );

    let srv_tx = spawn_server(&config);
    let allowed_origins = config.allowed_origins.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&allowed_origins))
            .data(srv_tx.clone())
            .configure(root)
    })
    .bind(bind_addr)?
    .run()
    .await
}
