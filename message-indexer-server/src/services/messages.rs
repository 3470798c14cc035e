use actix_web::{web, HttpResponse, Responder};
use message_indexer_logic::{
    gateway::{MessageGateway, MessageQuery, QueryError, SortDirection},
    types::IndexedMessage,
};
use serde::{Deserialize, Serialize};

pub struct MessagesHandler {
    gateway: Box<dyn MessageGateway>,
    max_page_size: u64,
}

impl MessagesHandler {
    pub fn new(gateway: Box<dyn MessageGateway>, max_page_size: u64) -> Self {
        Self {
            gateway,
            max_page_size,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<u64>,
    pub sender: Option<String>,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Serialize)]
pub struct ListMessagesResponse {
    pub items: Vec<IndexedMessage>,
}

pub async fn list_messages(
    handler: web::Data<MessagesHandler>,
    query: web::Query<ListMessagesQuery>,
) -> impl Responder {
    let request = MessageQuery {
        limit: query.limit.unwrap_or(50).clamp(1, handler.max_page_size),
        sender_filter: query.sender.clone(),
        direction: query.direction,
    };

    match handler.gateway.query(&request).await {
        Ok(items) => HttpResponse::Ok().json(ListMessagesResponse { items }),
        Err(QueryError::Timeout) => {
            tracing::warn!("message query timed out");
            HttpResponse::GatewayTimeout().finish()
        }
        Err(err) => {
            tracing::error!(error = %err, "message query failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
