use std::{process, sync::Arc};

use arbor::{
    application::{
        categories::{CascadePolicy, CategoryService},
        error::AppError,
        repos::{CategoriesRepo, CategoriesWriteRepo},
    },
    cache::{CacheConfig, CacheCoordinator, MemoryCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        memory::InMemoryCategories,
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let (reader, writer) = init_repositories(&settings).await?;

    let cache_config = CacheConfig::from(&settings.cache);
    let backend = Arc::new(MemoryCache::new(&cache_config));
    let cache = CacheCoordinator::new(backend, cache_config);
    let policy = CascadePolicy::from_settings(settings.cascade.reactivate_descendants);

    let categories = CategoryService::new(reader, writer, cache, policy);
    categories.health_check().await?;

    info!(
        addr = %settings.server.addr,
        cache_enabled = settings.cache.enabled,
        cascade_policy = ?policy,
        "Starting arbor"
    );

    let router = http::build_router(HttpState::new(categories));
    http::serve(&settings.server, router).await?;

    info!("arbor stopped");
    Ok(())
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let url = settings.database.url.as_deref().ok_or_else(|| {
        InfraError::configuration("database.url is required to run migrations")
    })?;
    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::from)?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;

    info!("Migrations applied");
    Ok(())
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<(Arc<dyn CategoriesRepo>, Arc<dyn CategoriesWriteRepo>), AppError> {
    let Some(url) = settings.database.url.as_deref() else {
        warn!("No database.url configured, keeping categories in memory");
        let memory = InMemoryCategories::new();
        let reader: Arc<dyn CategoriesRepo> = Arc::new(memory.clone());
        let writer: Arc<dyn CategoriesWriteRepo> = Arc::new(memory);
        return Ok((reader, writer));
    };

    let pool = PostgresRepositories::connect(url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::from)?;

    if settings.database.run_migrations {
        PostgresRepositories::run_migrations(&pool)
            .await
            .map_err(InfraError::from)?;
    }

    let repositories = PostgresRepositories::new(pool);
    let reader: Arc<dyn CategoriesRepo> = Arc::new(repositories.clone());
    let writer: Arc<dyn CategoriesWriteRepo> = Arc::new(repositories);
    Ok((reader, writer))
}
