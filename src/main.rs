use std::sync::Arc;

use tracing_subscriber::fmt::writer::MakeWriterExt;

use ticket_triage::api;
use ticket_triage::config::{ServerConfig, TriageConfig};
use ticket_triage::pipeline::TriagePipeline;
use ticket_triage::pipeline::draft::TemplateDrafter;
use ticket_triage::store::{CsvEscalationLog, KnowledgeStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let server_config = ServerConfig::from_env();
    let triage_config = TriageConfig::from_env();

    // Log to stdout and a service log file
    let file_appender = tracing_appender::rolling::never(&server_config.log_dir, "ticket-triage.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(file_writer.and(std::io::stdout))
        .with_target(false)
        .with_ansi(false)
        .init();

    // ── Knowledge corpus ─────────────────────────────────────────────────
    let store = match KnowledgeStore::load_from_dir(&server_config.data_dir).await {
        Ok(store) if !store.is_empty() => {
            tracing::info!(dir = %server_config.data_dir.display(), "Loaded knowledge corpus from disk");
            store
        }
        Ok(_) => {
            tracing::info!("No documents on disk, using built-in corpus");
            KnowledgeStore::builtin()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load corpus, using built-in corpus");
            KnowledgeStore::builtin()
        }
    };

    // ── Pipeline ─────────────────────────────────────────────────────────
    let escalations = Arc::new(CsvEscalationLog::new(server_config.escalation_log.clone()));
    let pipeline = Arc::new(TriagePipeline::new(
        triage_config.clone(),
        Arc::new(store),
        Arc::new(TemplateDrafter::new()),
        escalations,
    ));

    eprintln!("🎫 Ticket Triage v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://0.0.0.0:{}", server_config.port);
    eprintln!("   Escalation log: {}", server_config.escalation_log.display());
    eprintln!(
        "   Retry budget: {} (step ceiling {})\n",
        triage_config.max_retries, triage_config.step_limit
    );

    // ── HTTP server ──────────────────────────────────────────────────────
    let app = api::routes(pipeline);
    let listener =
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server_config.port)).await?;
    tracing::info!(port = server_config.port, "Ticket triage server started");
    axum::serve(listener, app).await?;

    Ok(())
}
