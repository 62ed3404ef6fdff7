use engine::FileStorage;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "salone={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let storage = FileStorage::new(&settings.storage.path)?;
    let engine = engine::Engine::builder().storage(storage).build()?;
    tracing::info!("Engine loaded from {}", settings.storage.path);

    let bind = settings.server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}
