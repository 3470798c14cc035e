use actix_web::{test, web, App};
use message_indexer_logic::{gateway::LocalGateway, repository, types::IndexedMessage};
use message_indexer_server::{configure_routes, services::messages::MessagesHandler};
use migration::{Migrator, MigratorTrait};
use pretty_assertions::assert_eq;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;

async fn init_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn seed(db: &DatabaseConnection) {
    for (id, sender, message, timestamp) in [
        ("0xabc-0", "0xS1", "Hello", 100),
        ("0xabc-1", "0xS2", "World", 100),
        ("0xdef-0", "0xS1", "newest", 200),
    ] {
        repository::messages::upsert(
            db,
            IndexedMessage {
                id: id.to_string(),
                sender: sender.to_string(),
                message: message.to_string(),
                timestamp,
            },
        )
        .await
        .unwrap();
    }
}

#[actix_web::test]
async fn list_messages_returns_recent_entities() {
    let db = init_db().await;
    seed(&db).await;
    let handler = web::Data::new(MessagesHandler::new(
        Box::new(LocalGateway::new(Arc::new(db))),
        100,
    ));
    let app =
        test::init_service(App::new().app_data(handler).configure(configure_routes)).await;

    let request = test::TestRequest::get()
        .uri("/api/v1/messages?limit=2")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], "0xdef-0");
    assert_eq!(items[1]["id"], "0xabc-0");
    assert_eq!(items[1]["message"], "Hello");
}

#[actix_web::test]
async fn list_messages_filters_by_sender() {
    let db = init_db().await;
    seed(&db).await;
    let handler = web::Data::new(MessagesHandler::new(
        Box::new(LocalGateway::new(Arc::new(db))),
        100,
    ));
    let app =
        test::init_service(App::new().app_data(handler).configure(configure_routes)).await;

    let request = test::TestRequest::get()
        .uri("/api/v1/messages?sender=0xS2")
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "0xabc-1");
}

#[actix_web::test]
async fn health_endpoint_responds() {
    let db = init_db().await;
    let handler = web::Data::new(MessagesHandler::new(
        Box::new(LocalGateway::new(Arc::new(db))),
        100,
    ));
    let app =
        test::init_service(App::new().app_data(handler).configure(configure_routes)).await;

    let request = test::TestRequest::get().uri("/health").to_request();
    let response = test::call_service(&app, request).await;
    assert!(response.status().is_success());
}
