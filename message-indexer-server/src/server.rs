use crate::{
    services::messages::{self, MessagesHandler},
    settings::Settings,
};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use message_indexer_logic::gateway::{LocalGateway, MessageGateway, RemoteGateway};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub async fn run(
    settings: Settings,
    db_connection: DatabaseConnection,
) -> Result<(), anyhow::Error> {
    let gateway: Box<dyn MessageGateway> = match settings.remote_gateway.clone() {
        Some(remote_settings) => Box::new(RemoteGateway::new(remote_settings)?),
        None => Box::new(LocalGateway::new(Arc::new(db_connection))),
    };
    let handler = web::Data::new(MessagesHandler::new(gateway, settings.max_page_size));

    let addr = settings.server.http.addr;
    tracing::info!("starting http server on addr {addr}");
    HttpServer::new(move || {
        App::new()
            .app_data(handler.clone())
            .configure(configure_routes)
    })
    .bind(addr)
    .context("failed to bind http server")?
    .run()
    .await?;

    Ok(())
}

pub fn configure_routes(config: &mut web::ServiceConfig) {
    config
        .route("/health", web::get().to(messages::health))
        .route("/api/v1/messages", web::get().to(messages::list_messages));
}
