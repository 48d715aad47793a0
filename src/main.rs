mod context;
mod error;
mod llm;
mod panel;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use services::assistant::{Assistant, AssistantSettings};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    // A missing credential disables generation instead of failing startup;
    // the assistant answers with its fixed advisory text.
    let llm: Option<Arc<dyn llm::LlmGenerate>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(provider = client.provider(), model = client.model(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client unavailable; assistant disabled");
            None
        }
    };

    let assistant = Assistant::new(llm, AssistantSettings::from_env());
    let state = state::AppState::new(assistant);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "aquaerp assistant listening");
    axum::serve(listener, app).await.expect("server failed");
}
