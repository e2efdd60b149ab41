use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::{error, info};

use tictactoe_peer::config::Cli;
use tictactoe_peer::routes;
use tictactoe_peer::session::{FileChatLog, GameSession};
use tictactoe_peer::transport;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Cli::parse().into_config();

    let stream = transport::establish(&config).await.map_err(|e| {
        error!("{}", e);
        std::io::Error::from(e)
    })?;
    let (reader, writer) = stream.into_split();

    let ui_addr = config.ui_addr;
    let chat_log = Box::new(FileChatLog::new(&config.chat_log_path));
    let session = web::Data::new(GameSession::start(config, reader, writer, chat_log));

    info!("Open http://{} to play", ui_addr);

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(session.clone())
            .configure(routes::configure_routes)
    })
    .bind(ui_addr)?
    .run()
    .await
}
