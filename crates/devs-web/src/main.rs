mod auth;
mod background;
mod error;
mod handlers;
mod openapi;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post, put};
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use devs_core::analytics::DEFAULT_CAPACITY;
use devs_core::api::service::PublicConfig;
use devs_core::client::GraphqlClient;
use devs_core::prefs::PreferenceStore;

use auth::{AccessLogLayer, Credentials};
use openapi::ApiDoc;
use state::{AppContext, SharedState, WebAppInner};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(name = "devs-web", about = "DEVS content platform API server", version = devs_core::VERSION)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "0.0.0.0:8080", env = "DEVS_LISTEN")]
    listen: String,

    /// Public base URL of the site.
    #[arg(long, default_value = "http://localhost:3000", env = "DEVS_BASE_URL")]
    base_url: String,

    /// GraphQL endpoint of the content API. Content routes return 503 without it.
    #[arg(long, env = "DEVS_GRAPHQL_URL")]
    graphql_url: Option<String>,

    /// Bearer token sent to the content API.
    #[arg(long, env = "DEVS_GRAPHQL_TOKEN", hide_env_values = true)]
    graphql_token: Option<String>,

    /// Web analytics measurement id exposed to browsers.
    #[arg(long, env = "DEVS_ANALYTICS_ID")]
    analytics_id: Option<String>,

    /// Image upload cloud name exposed to browsers.
    #[arg(long, env = "DEVS_UPLOAD_CLOUD_NAME")]
    upload_cloud_name: Option<String>,

    /// Unsigned image upload preset exposed to browsers.
    #[arg(long, env = "DEVS_UPLOAD_PRESET")]
    upload_preset: Option<String>,

    /// Path to the UI preferences JSON file.
    #[arg(long, default_value = "devs-prefs.json", env = "DEVS_PREFS")]
    prefs: PathBuf,

    /// Maximum number of analytics entries kept in memory.
    #[arg(long, default_value_t = DEFAULT_CAPACITY, env = "DEVS_ANALYTICS_CAPACITY")]
    analytics_capacity: usize,

    /// Admin table refresh interval in seconds (0 disables the refresh loop).
    #[arg(long, default_value = "60", env = "DEVS_REFRESH_INTERVAL")]
    refresh_interval: u64,

    /// Basic Auth username for admin routes. If set, --admin-password is also required.
    #[arg(long, env = "DEVS_ADMIN_USER")]
    admin_user: Option<String>,

    /// Basic Auth password for admin routes.
    #[arg(long, env = "DEVS_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

// ============================================================
// Router
// ============================================================

pub(crate) fn build_router(ctx: AppContext, creds: Option<Credentials>) -> Router {
    let mut admin = Router::new()
        .route("/posts", post(handlers::handle_create_post))
        .route(
            "/posts/{id}",
            put(handlers::handle_update_post).delete(handlers::handle_delete_post),
        )
        .route("/categories", post(handlers::handle_create_category))
        .route(
            "/categories/{id}",
            put(handlers::handle_update_category).delete(handlers::handle_delete_category),
        )
        .route("/profile", put(handlers::handle_update_profile))
        .route("/tables/{table}", get(handlers::handle_table_view))
        .route(
            "/tables/{table}/actions",
            post(handlers::handle_table_action),
        );

    if let Some(creds) = creds {
        admin = admin.route_layer(axum::middleware::from_fn_with_state(
            creds,
            auth::basic_auth_middleware,
        ));
    }

    Router::new()
        .route("/api/v1/health", get(handlers::handle_health))
        .route("/api/v1/config", get(handlers::handle_config))
        .route("/api/v1/posts", get(handlers::handle_posts))
        .route("/api/v1/posts/{slug}", get(handlers::handle_post))
        .route("/api/v1/categories", get(handlers::handle_categories))
        .route(
            "/api/v1/preferences",
            get(handlers::handle_get_preferences).put(handlers::handle_put_preferences),
        )
        .route(
            "/api/v1/preferences/editor-mode",
            put(handlers::handle_put_editor_mode),
        )
        .route(
            "/api/analytics",
            get(handlers::handle_analytics_summary).post(handlers::handle_ingest_analytics),
        )
        .nest("/api/v1/admin", admin)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(ctx)
        .layer(AccessLogLayer)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "devs_web=info,devs_core=info".into()),
        )
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };
    runtime.block_on(async_main(args));
}

/// Logs a startup configuration error and exits.
fn fatal(msg: &str) -> ! {
    error!("{msg}");
    process::exit(1);
}

async fn async_main(args: Args) {
    info!(version = devs_core::VERSION, "starting");

    let client = match &args.graphql_url {
        Some(url) => match GraphqlClient::new(url, args.graphql_token.clone()) {
            Ok(client) => {
                info!(endpoint = %client.endpoint(), "content API configured");
                Some(client)
            }
            Err(e) => fatal(&format!("invalid --graphql-url: {e}")),
        },
        None => {
            warn!("no --graphql-url set, content routes are disabled");
            None
        }
    };

    let creds: Option<Credentials> = match (&args.admin_user, &args.admin_password) {
        (Some(user), Some(pass)) => {
            info!(user = %user, "basic auth enabled for admin routes");
            Some(Arc::new((user.clone(), pass.clone())))
        }
        (Some(_), None) | (None, Some(_)) => {
            fatal("--admin-user and --admin-password must both be set")
        }
        _ => {
            warn!("admin routes are not protected");
            None
        }
    };

    let prefs = PreferenceStore::load(&args.prefs);
    let state: SharedState = Arc::new(Mutex::new(WebAppInner::new(
        prefs,
        args.analytics_capacity,
    )));

    if let Some(client) = &client
        && args.refresh_interval > 0
    {
        let state_clone = state.clone();
        let client_clone = client.clone();
        let interval = Duration::from_secs(args.refresh_interval);
        tokio::spawn(async move {
            background::refresh_loop(state_clone, client_clone, interval).await;
        });
    }

    let ctx = AppContext {
        state,
        client,
        config: Arc::new(PublicConfig {
            base_url: args.base_url.clone(),
            analytics_id: args.analytics_id.clone(),
            upload_cloud_name: args.upload_cloud_name.clone(),
            upload_preset: args.upload_preset.clone(),
        }),
    };

    let app = build_router(ctx, creds).into_make_service_with_connect_info::<SocketAddr>();

    let addr: SocketAddr = match args.listen.parse() {
        Ok(addr) => addr,
        Err(e) => fatal(&format!("invalid listen address {}: {e}", args.listen)),
    };
    info!(%addr, "listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => fatal(&format!("failed to bind {addr}: {e}")),
    };

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
        process::exit(1);
    }
}
