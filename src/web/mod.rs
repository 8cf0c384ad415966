//! HTTP surface: the search page, the analysis page and a JSON API.
//!
//! Handlers never hold the database lock across an `.await`; every query runs
//! in a synchronous helper that returns owned data. Corpus analysis is CPU
//! bound and runs on the blocking pool.

pub mod params;
pub mod render;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::analysis::{self, CorpusReport};
use crate::config::EqualifyConfig;
use crate::scholarship::filter::{self, Page};
use crate::scholarship::session::{SessionRegistry, SessionState};
use crate::scholarship::stats::{self, CollectionStats};
use crate::scholarship::{store, ListKind, Scholarship};

use params::{SearchParams, Tab};
use render::SearchView;

/// Cookie carrying the visitor's session id.
pub const SESSION_COOKIE: &str = "equalify_session";

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub sessions: Arc<SessionRegistry>,
    pub config: Arc<EqualifyConfig>,
}

impl AppState {
    pub fn new(conn: Connection, config: EqualifyConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            sessions: Arc::new(SessionRegistry::with_limits(
                Duration::from_secs(config.search.session_idle_secs),
                config.search.max_sessions,
            )),
            config: Arc::new(config),
        }
    }

    fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}

/// Errors returned by handlers, rendered as `{"error": ...}` with a matching
/// status code. Internal details are logged, never sent to the client.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::Internal(m) => {
                warn!(error = %m, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(format!("{e:#}"))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(search_page))
        .route("/mark", post(mark))
        .route("/analysis", get(analysis_page))
        .route("/api/scholarships", get(api_search))
        .route("/api/scholarships/{id}", get(api_scholarship))
        .route("/api/analysis", get(api_analysis))
        .route("/api/stats", get(api_stats))
        .route("/api/sessions", post(api_create_session))
        .route("/api/sessions/{session}/{kind}", get(api_session_list))
        .route(
            "/api/sessions/{session}/{kind}/{id}",
            put(api_session_mark).delete(api_session_unmark),
        )
        .with_state(state)
}

// --- Sessions ---

struct Visitor {
    session: String,
    /// Set when the session was created by this request.
    issued: bool,
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// The visitor's live session, or a fresh one when the cookie is missing,
/// unknown or expired.
fn visitor(state: &AppState, headers: &HeaderMap) -> Visitor {
    if let Some(session) = session_cookie(headers).filter(|s| state.sessions.exists(s)) {
        return Visitor {
            session,
            issued: false,
        };
    }
    let session = state.sessions.create();
    debug!(%session, "issued new session");
    Visitor {
        session,
        issued: true,
    }
}

fn session_gone(session: &str) -> ApiError {
    ApiError::NotFound(format!("session not found: {session}"))
}

fn with_cookie(mut response: Response, visitor: &Visitor) -> Result<Response, ApiError> {
    if visitor.issued {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            visitor.session
        );
        let value = HeaderValue::from_str(&cookie)
            .map_err(|e| ApiError::Internal(format!("invalid session cookie: {e}")))?;
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(response)
}

fn parse_kind(kind: &str) -> Result<ListKind, ApiError> {
    kind.parse().map_err(ApiError::BadRequest)
}

/// Add or remove `id` on a session list, persisting the flag into the
/// stored document when configured. Returns whether the list changed.
fn update_list(
    state: &AppState,
    session: &str,
    kind: ListKind,
    id: &str,
    add: bool,
) -> Result<bool, ApiError> {
    let conn = state.db()?;
    if store::get(&conn, id)?.is_none() {
        return Err(ApiError::NotFound(format!("scholarship not found: {id}")));
    }
    if !state.sessions.exists(session) {
        return Err(session_gone(session));
    }
    // Persist first so a failed write leaves the session untouched.
    if state.config.search.persist_flags {
        store::set_flag(&conn, id, kind, add)?;
    }
    let changed = state
        .sessions
        .with_session(session, |s| {
            if add {
                s.mark(kind, id)
            } else {
                s.unmark(kind, id)
            }
        })
        .ok_or_else(|| session_gone(session))?;
    info!(%session, %kind, %id, add, changed, "updated session list");
    Ok(changed)
}

// --- Search page ---

struct SearchResults {
    records: Vec<Scholarship>,
    page: usize,
    total_pages: usize,
    total_items: usize,
    session: SessionState,
    universities: Vec<String>,
}

fn run_search(
    state: &AppState,
    session: &str,
    params: &SearchParams,
) -> Result<SearchResults, ApiError> {
    let conn = state.db()?;
    let all = store::list_all(&conn)?;
    let universities: Vec<String> = all
        .iter()
        .flat_map(|r| r.universities())
        .map(String::from)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let results = match params.tab {
        Tab::All => {
            let page_size = params
                .page_size
                .unwrap_or(state.config.search.page_size)
                .max(1);
            let matched = filter::search(all, &params.filter, params.order);
            let total_pages = filter::total_pages(matched.len(), page_size);
            let session = state
                .sessions
                .with_session(session, |s| {
                    let requested = params.page.unwrap_or(s.page);
                    s.set_page(requested, total_pages);
                    s.clone()
                })
                .ok_or_else(|| session_gone(session))?;
            let page = filter::paginate(&matched, session.page, page_size);
            SearchResults {
                records: page.items,
                page: page.page,
                total_pages: page.total_pages,
                total_items: page.total_items,
                session,
                universities,
            }
        }
        Tab::List(kind) => {
            let session = state
                .sessions
                .with_session(session, |s| s.clone())
                .ok_or_else(|| session_gone(session))?;
            let mut records = store::get_many(&conn, &session.ids(kind))?;
            filter::sort_by_due_date(&mut records, params.order);
            let total_items = records.len();
            SearchResults {
                records,
                page: 1,
                total_pages: 1,
                total_items,
                session,
                universities,
            }
        }
    };
    Ok(results)
}

async fn search_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Response, ApiError> {
    let visitor = visitor(&state, &headers);
    let params = SearchParams::from_query(&query);
    let results = run_search(&state, &visitor.session, &params)?;
    debug!(
        tab = params.tab.as_str(),
        total = results.total_items,
        page = results.page,
        "rendered search page"
    );

    let html = render::search_page(&SearchView {
        params: &params,
        records: &results.records,
        page: results.page,
        total_pages: results.total_pages,
        total_items: results.total_items,
        session: &results.session,
        universities: &results.universities,
    });
    with_cookie(Html(html).into_response(), &visitor)
}

#[derive(Debug, Deserialize)]
struct MarkForm {
    kind: String,
    id: String,
    action: String,
    #[serde(default)]
    return_to: Option<String>,
}

async fn mark(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<MarkForm>,
) -> Result<Response, ApiError> {
    let kind = parse_kind(&form.kind)?;
    let add = match form.action.as_str() {
        "add" => true,
        "remove" => false,
        other => return Err(ApiError::BadRequest(format!("unknown action: {other}"))),
    };
    let visitor = visitor(&state, &headers);
    update_list(&state, &visitor.session, kind, &form.id, add)?;

    // Only same-site relative paths are followed.
    let target = form
        .return_to
        .filter(|t| t.starts_with('/') && !t.starts_with("//"))
        .unwrap_or_else(|| "/".to_string());
    let location = HeaderValue::from_str(&target).unwrap_or(HeaderValue::from_static("/"));
    let response = (StatusCode::SEE_OTHER, [(LOCATION, location)]).into_response();
    with_cookie(response, &visitor)
}

// --- Analysis ---

async fn corpus_report(state: &AppState) -> Result<CorpusReport, ApiError> {
    let records = {
        let conn = state.db()?;
        store::list_all(&conn)?
    };
    let config = state.config.analysis.clone();
    tokio::task::spawn_blocking(move || analysis::analyze_corpus(&records, &config))
        .await
        .map_err(|e| ApiError::Internal(format!("analysis task failed: {e}")))
}

async fn analysis_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let report = corpus_report(&state).await?;
    Ok(Html(render::analysis_page(&report)))
}

async fn api_analysis(State(state): State<AppState>) -> Result<Json<CorpusReport>, ApiError> {
    Ok(Json(corpus_report(&state).await?))
}

// --- JSON API ---

async fn api_search(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> Result<Json<Page<Scholarship>>, ApiError> {
    let params = SearchParams::from_query(&query);
    let all = {
        let conn = state.db()?;
        store::list_all(&conn)?
    };
    let matched = filter::search(all, &params.filter, params.order);
    let page_size = params
        .page_size
        .unwrap_or(state.config.search.page_size)
        .max(1);
    Ok(Json(filter::paginate(
        &matched,
        params.page.unwrap_or(1),
        page_size,
    )))
}

async fn api_scholarship(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Scholarship>, ApiError> {
    let conn = state.db()?;
    store::get(&conn, &id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("scholarship not found: {id}")))
}

async fn api_stats(State(state): State<AppState>) -> Result<Json<CollectionStats>, ApiError> {
    let conn = state.db()?;
    Ok(Json(stats::collection_stats(&conn)?))
}

#[derive(Debug, Serialize)]
struct CreatedSession {
    session: String,
}

async fn api_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreatedSession>) {
    let session = state.sessions.create();
    info!(%session, "created session");
    (StatusCode::CREATED, Json(CreatedSession { session }))
}

async fn api_session_list(
    State(state): State<AppState>,
    Path((session, kind)): Path<(String, String)>,
) -> Result<Json<Vec<Scholarship>>, ApiError> {
    let kind = parse_kind(&kind)?;
    let ids = state
        .sessions
        .with_session(&session, |s| s.ids(kind))
        .ok_or_else(|| session_gone(&session))?;
    let conn = state.db()?;
    Ok(Json(store::get_many(&conn, &ids)?))
}

#[derive(Debug, Serialize)]
struct ListChange {
    changed: bool,
}

async fn api_session_mark(
    State(state): State<AppState>,
    Path((session, kind, id)): Path<(String, String, String)>,
) -> Result<Json<ListChange>, ApiError> {
    let kind = parse_kind(&kind)?;
    let changed = update_list(&state, &session, kind, &id, true)?;
    Ok(Json(ListChange { changed }))
}

async fn api_session_unmark(
    State(state): State<AppState>,
    Path((session, kind, id)): Path<(String, String, String)>,
) -> Result<Json<ListChange>, ApiError> {
    let kind = parse_kind(&kind)?;
    let changed = update_list(&state, &session, kind, &id, false)?;
    Ok(Json(ListChange { changed }))
}
