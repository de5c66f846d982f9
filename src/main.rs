use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use yalt::config::Config;
use yalt::db::Database;
use yalt::middleware::localized;
use yalt::{load_translations, save_translations, LocaleContext, Translatable, Translations, Yalt, YaltError};

#[derive(Debug, Serialize)]
struct Article {
    id: i64,
    slug: String,
    #[serde(skip)]
    translations: Translations,
}

impl Translatable for Article {
    const TRANSLATABLE: &'static [&'static str] = &["title", "body"];
    const TABLE: &'static str = "articles";
    const FOREIGN_KEY: &'static str = "article_id";

    fn key(&self) -> Option<i64> {
        Some(self.id)
    }

    fn translations(&self) -> &Translations {
        &self.translations
    }

    fn translations_mut(&mut self) -> &mut Translations {
        &mut self.translations
    }

    fn fill_attributes(&mut self, attributes: Map<String, Value>) -> yalt::Result<()> {
        if let Some(slug) = attributes.get("slug").and_then(Value::as_str) {
            self.slug = slug.to_string();
        }
        Ok(())
    }
}

#[derive(Clone)]
struct AppState {
    db: Database,
    yalt: Arc<Yalt>,
}

enum ApiError {
    NotFound,
    Yalt(YaltError),
}

impl From<YaltError> for ApiError {
    fn from(err: YaltError) -> Self {
        Self::Yalt(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Yalt(YaltError::Database(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            Self::Yalt(
                err @ (YaltError::UnsupportedLocale(_) | YaltError::TranslationShape { .. }),
            ) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
            Self::Yalt(err) => {
                error!("Request failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn find_article(state: &AppState, id: i64) -> Result<Article, ApiError> {
    let row: Option<(i64, String)> = sqlx::query_as("SELECT id, slug FROM articles WHERE id = $1")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?;
    let (id, slug) = row.ok_or(ApiError::NotFound)?;

    let mut article = Article {
        id,
        slug,
        translations: Translations::new(),
    };
    load_translations(&mut article, &state.db, &state.yalt).await?;
    Ok(article)
}

/// Article with translatable fields in the request locale
async fn show_article(
    State(state): State<AppState>,
    Extension(mut locale): Extension<LocaleContext>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let article = find_article(&state, id).await?;
    Ok(Json(article.to_value_in(locale.current(), &state.yalt)?))
}

/// Article with every locale of every translatable field
async fn show_translations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let article = find_article(&state, id).await?;
    Ok(Json(article.to_localized_value(&state.yalt)?))
}

async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<Value>, ApiError> {
    let mut article = find_article(&state, id).await?;
    article.fill(payload, &state.yalt)?;

    sqlx::query("UPDATE articles SET slug = $1 WHERE id = $2")
        .bind(&article.slug)
        .bind(article.id)
        .execute(state.db.pool())
        .await?;
    save_translations(&mut article, &state.db, &state.yalt).await?;

    info!("Updated article {}", article.id);
    Ok(Json(article.to_localized_value(&state.yalt)?))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("yalt=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let yalt = Arc::new(Yalt::new(config.yalt.clone()));
    info!("Locales: {}", yalt.locales().join(", "));

    let db = Database::connect(&config.database_url).await?;
    let state = AppState {
        db,
        yalt: Arc::clone(&yalt),
    };

    let routes = Router::new()
        .route("/articles/:id", get(show_article).put(update_article))
        .route("/articles/:id/translations", get(show_translations));
    let app = localized(routes, yalt)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
