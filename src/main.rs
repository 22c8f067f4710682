//! Storyline - 章节写作服务
//!
//! - Domain: story/, chapter/
//! - Application: commands, queries, editor session, ports
//! - Infrastructure: http, memory, worker, persistence, adapters, events

use std::sync::Arc;

use storyline::application::{ChapterRepositoryPort, EditorFactory, EditorPort, StoryRepositoryPort};
use storyline::config::{load_config, print_config, AppConfig, StorageBackend};
use storyline::infrastructure::adapters::{PostgrestClient, RestChapterRepository, RestStoryRepository};
use storyline::infrastructure::editor::HtmlDocumentEditor;
use storyline::infrastructure::events::EventPublisher;
use storyline::infrastructure::http::{AppState, HttpServer, ServerConfig};
use storyline::infrastructure::memory::{
    InMemoryChapterStore, InMemorySessionManager, InMemoryStoryStore,
};
use storyline::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository, SqliteStoryRepository,
};
use storyline::infrastructure::worker::SessionReaper;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

type Repositories = (Arc<dyn StoryRepositoryPort>, Arc<dyn ChapterRepositoryPort>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Storyline - chapter writing service");
    print_config(&config);

    let (story_repo, chapter_repo) = build_repositories(&config).await?;

    let event_publisher = EventPublisher::new().arc();
    let session_manager = InMemorySessionManager::new().arc();
    let editor_factory: EditorFactory =
        Arc::new(|| Box::new(HtmlDocumentEditor::new()) as Box<dyn EditorPort>);

    // 空闲会话回收，关闭时保存所有会话
    let shutdown = CancellationToken::new();
    let reaper = SessionReaper::new(
        config.session.reaper_config(),
        session_manager.clone(),
        event_publisher.clone(),
    );
    let reaper_handle = tokio::spawn(reaper.run(shutdown.clone()));

    let state = AppState::new(
        session_manager,
        story_repo,
        chapter_repo,
        event_publisher,
        editor_factory,
        config.autosave.session_config(),
    );
    let server = HttpServer::new(
        ServerConfig::new(&config.server.host, config.server.port),
        Arc::new(state),
    );

    let signal = shutdown.clone();
    server
        .run_with_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
            signal.cancel();
        })
        .await?;

    // 服务器因其他原因退出时同样要保存会话
    shutdown.cancel();
    if let Err(e) = reaper_handle.await {
        tracing::error!(error = %e, "SessionReaper task failed");
    }

    tracing::info!("Server shutdown complete");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},storyline={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn build_repositories(config: &AppConfig) -> anyhow::Result<Repositories> {
    match config.storage.backend {
        StorageBackend::Sqlite => {
            // 确保数据目录存在
            if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let db_config =
                DatabaseConfig::new(&config.database.path, config.database.max_connections);
            let pool = create_pool(&db_config).await?;
            run_migrations(&pool).await?;

            let story_repo: Arc<dyn StoryRepositoryPort> =
                Arc::new(SqliteStoryRepository::new(pool.clone()));
            let chapter_repo: Arc<dyn ChapterRepositoryPort> =
                Arc::new(SqliteChapterRepository::new(pool));
            Ok((story_repo, chapter_repo))
        }
        StorageBackend::Rest => {
            let client = Arc::new(PostgrestClient::new(config.rest.client_config())?);
            let story_repo: Arc<dyn StoryRepositoryPort> =
                Arc::new(RestStoryRepository::new(client.clone()));
            let chapter_repo: Arc<dyn ChapterRepositoryPort> =
                Arc::new(RestChapterRepository::new(client));
            Ok((story_repo, chapter_repo))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            let story_repo: Arc<dyn StoryRepositoryPort> = InMemoryStoryStore::new().arc();
            let chapter_repo: Arc<dyn ChapterRepositoryPort> = InMemoryChapterStore::new().arc();
            Ok((story_repo, chapter_repo))
        }
    }
}
