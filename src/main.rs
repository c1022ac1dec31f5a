use std::{process, sync::Arc};

use postboard::{
    application::{
        credentials::CredentialHasher,
        error::AppError,
        posts::PostService,
        repos::{PostsRepo, PostsWriteRepo, SessionsRepo, UsersRepo},
        sessions::{self, SessionService},
        users::UserService,
    },
    config,
    domain::types::Role,
    infra::{
        credentials::Argon2Hasher,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, SessionCookie},
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

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
        config::Command::GrantAdmin(args) => run_grant_admin(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings.database).await?;
    let services = build_services(repositories, &settings.session);

    if let Err(err) = services.sessions.purge_expired().await {
        warn!(error = %err, "continuing with stale sessions");
    }

    let session_service = Arc::new(services.sessions);
    let purge_handle =
        sessions::spawn_purge_task(session_service.clone(), settings.session.purge_interval);

    let state = ApiState {
        posts: Arc::new(services.posts),
        users: Arc::new(services.users),
        sessions: session_service,
        cookie: Arc::new(SessionCookie {
            name: settings.session.cookie_name.clone(),
            secure: settings.session.secure_cookie,
            max_age: settings.session.ttl,
        }),
    };

    let result = serve_http(&settings, state).await;

    purge_handle.abort();
    let _ = purge_handle.await;

    result
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings.database).await?;
    info!("database migrations applied");
    Ok(())
}

async fn run_grant_admin(
    settings: config::Settings,
    args: config::GrantAdminArgs,
) -> Result<(), AppError> {
    let repositories = init_repositories(&settings.database).await?;
    let services = build_services(repositories, &settings.session);

    let user_id = services.users.grant_role(&args.username, Role::Admin).await?;
    info!(user_id, username = %args.username, "admin role granted");
    Ok(())
}

struct Services {
    posts: PostService,
    users: UserService,
    sessions: SessionService,
}

fn build_services(
    repositories: Arc<PostgresRepositories>,
    session: &config::SessionSettings,
) -> Services {
    let posts_repo: Arc<dyn PostsRepo> = repositories.clone();
    let posts_write_repo: Arc<dyn PostsWriteRepo> = repositories.clone();
    let users_repo: Arc<dyn UsersRepo> = repositories.clone();
    let sessions_repo: Arc<dyn SessionsRepo> = repositories;
    let hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2Hasher);

    let users = UserService::new(users_repo, hasher);
    Services {
        posts: PostService::new(posts_repo, posts_write_repo),
        sessions: SessionService::new(sessions_repo, users.clone(), session.ttl),
        users,
    }
}

/// Connect the pool and bring the schema up to date.
async fn init_repositories(
    database: &config::DatabaseSettings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_api_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
