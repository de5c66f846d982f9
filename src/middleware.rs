//! Request locale middleware.
//!
//! Resolves the locale of every request from `Accept-Language`, the
//! authenticated user's stored preference and the application default,
//! hands it to handlers as a `LocaleContext` request extension and stamps
//! it on the response as `Content-Language`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE},
        HeaderValue,
    },
    middleware::{self, Next},
    response::Response,
    Router,
};
use tracing::{debug, warn};

use crate::Yalt;

/// A user type that stores a preferred interface locale.
pub trait HasLocalePreference {
    fn preferred_locale(&self) -> Option<String>;
}

/// Preferred locale of the authenticated user.
///
/// Authentication layers insert it into the request extensions before the
/// localization middleware runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredLocale(pub String);

impl PreferredLocale {
    pub fn from_user<U: HasLocalePreference + ?Sized>(user: &U) -> Option<Self> {
        user.preferred_locale().map(Self)
    }
}

/// Resolve the request locale, expose it to handlers and set
/// `Content-Language` on the response.
pub async fn localization(State(yalt): State<Arc<Yalt>>, mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let preference = request
        .extensions()
        .get::<PreferredLocale>()
        .map(|p| p.0.clone());

    let context = yalt.context_for_request(header.as_deref(), preference.as_deref());
    let locale = context.locale().to_string();
    debug!("Resolved request locale: {}", locale);

    request.extensions_mut().insert(context);

    let mut response = next.run(request).await;

    match HeaderValue::from_str(&locale) {
        Ok(value) => {
            response.headers_mut().insert(CONTENT_LANGUAGE, value);
        }
        Err(_) => warn!("Locale '{}' is not a valid header value", locale),
    }

    response
}

/// Install the localization middleware on every route of `router`.
pub fn localized<S>(router: Router<S>, yalt: Arc<Yalt>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(yalt, localization))
}
