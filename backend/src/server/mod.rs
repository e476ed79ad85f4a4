//! Server wiring: adapters, state construction, and the HTTP listener.

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::ports::SlotLockStore;
use crate::domain::{
    BookingCommandService, BookingQueryService, DirectoryService, IdentityService,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{auth, bookings, doctors, users};
use crate::middleware::Trace;
use crate::outbound::lock::{AnySlotLockStore, MemorySlotLockStore, RedisSlotLockStore};
use crate::outbound::persistence::{
    DbPool, DieselBookingRepository, DieselUserRepository, PoolConfig, run_pending_migrations,
};

pub use config::{AppConfig, ConfigError};

/// Wire the domain services over their production adapters.
pub fn build_http_state<L>(pool: DbPool, locks: Arc<L>, lock_ttl: Duration) -> HttpState
where
    L: SlotLockStore + 'static,
{
    let user_repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let booking_repo = Arc::new(DieselBookingRepository::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let identity = Arc::new(IdentityService::new(Arc::clone(&user_repo)));
    let directory = Arc::new(DirectoryService::new(Arc::clone(&user_repo)));
    let reserve = Arc::new(
        BookingCommandService::new(locks, Arc::clone(&booking_repo), user_repo, clock)
            .with_lock_ttl(lock_ttl),
    );
    let booking_query = Arc::new(BookingQueryService::new(booking_repo));

    HttpState {
        login: identity.clone(),
        registration: identity.clone(),
        users: directory,
        profile: identity,
        bookings: reserve,
        bookings_query: booking_query,
    }
}

fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}

/// Run database migrations, connect the adapters, and serve until stopped.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    run_pending_migrations(&config.database_url).map_err(std::io::Error::other)?;

    let pool = DbPool::new(PoolConfig::new(&config.database_url))
        .await
        .map_err(std::io::Error::other)?;

    let locks = match &config.redis_url {
        Some(url) => {
            let store = RedisSlotLockStore::connect(url)
                .await
                .map_err(std::io::Error::other)?;
            info!("slot locks backed by redis");
            Arc::new(AnySlotLockStore::Redis(store))
        }
        None => {
            warn!("REDIS_URL not set; slot locks are per-instance only");
            Arc::new(AnySlotLockStore::Memory(MemorySlotLockStore::new()))
        }
    };

    let state = build_http_state(pool, locks, config.lock_ttl);
    let health_state = web::Data::new(HealthState::new());
    let server_health_state = health_state.clone();
    let key = config.session_key.clone();
    let cookie_secure = config.cookie_secure;

    let server = HttpServer::new(move || {
        let api = web::scope("/api/v1")
            .wrap(session_middleware(key.clone(), cookie_secure))
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(bookings::create_booking)
            .service(bookings::my_bookings)
            .service(doctors::list_doctors)
            .service(users::update_profile)
            .service(users::profile_completion);

        let app = App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(server_health_state.clone())
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(feature = "metrics")]
        let app = app.wrap(make_metrics());

        #[cfg(debug_assertions)]
        let app = app.service(
            SwaggerUi::new("/docs/{_:.*}")
                .url("/api-docs/openapi.json", crate::doc::ApiDoc::openapi()),
        );

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "server listening");
    server.run().await
}

#[cfg(feature = "metrics")]
fn make_metrics() -> actix_web_prom::PrometheusMetrics {
    actix_web_prom::PrometheusMetricsBuilder::new("booking")
        .endpoint("/metrics")
        .build()
        .expect("configure Prometheus metrics")
}
