//! HTTP handler functions for the Locofinder API.

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use locofinder_cache::{CacheStatus, Cached, keys};
use locofinder_database::LocationRepository;
use locofinder_scoring::{SCORABLE_FEATURES, score_location, score_locations};
use locofinder_server_models::{
    ApiHealth, CacheConnection, ExplainResponse, FeatureSchema, RankedLocation,
    RecommendResponse, ScoringRequest, SearchParams, SearchResponse,
};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;

/// Request header that skips the cache lookup when set to `true`, `1` or
/// `yes`.
pub const BYPASS_HEADER: &str = "X-Bypass-Cache";

/// Response header reporting `HIT`, `MISS` or `BYPASS`.
pub const CACHE_STATUS_HEADER: &str = "X-Cache";

fn bypass_requested(req: &HttpRequest) -> bool {
    req.headers()
        .get(BYPASS_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| {
            let v = v.trim();
            ["true", "1", "yes"]
                .iter()
                .any(|flag| v.eq_ignore_ascii_case(flag))
        })
}

fn cached_json<T: Serialize>(cached: Cached<T>) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((CACHE_STATUS_HEADER, cached.status.as_header_value()))
        .json(cached.value)
}

/// `GET /locations/search`
///
/// Returns one page of locations, optionally restricted to a state.
pub async fn search(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse, ApiError> {
    params.validate()?;

    let key = keys::search_key(params.state(), params.offset, params.limit);
    let filter = params.filter();
    let (offset, limit) = (params.offset, params.limit);
    let repository = Arc::clone(&state.repository);

    let cached = state
        .cache
        .get_or_compute(&key, bypass_requested(&req), move || async move {
            let page = repository.fetch_page(&filter, offset, limit).await?;
            Ok::<_, ApiError>(SearchResponse {
                total: page.total,
                offset,
                limit,
                locations: page.locations,
            })
        })
        .await?;

    Ok(cached_json(cached))
}

/// `POST /recommend`
///
/// Scores every location matching the filters against statistics of that
/// same cohort and returns the best `limit` of them.
pub async fn recommend(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ScoringRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = body.into_inner();
    request.validate()?;

    let bypass = bypass_requested(&req);
    let repository = Arc::clone(&state.repository);

    let cached = match keys::recommend_key(&request) {
        Ok(key) => {
            state
                .cache
                .get_or_compute(&key, bypass, move || rank_cohort(repository, request))
                .await?
        }
        Err(e) => {
            log::warn!("Could not derive recommend cache key: {e}");
            Cached {
                value: rank_cohort(repository, request).await?,
                status: CacheStatus::Miss,
            }
        }
    };

    Ok(cached_json(cached))
}

async fn rank_cohort(
    repository: Arc<dyn LocationRepository>,
    request: ScoringRequest,
) -> Result<RecommendResponse, ApiError> {
    let filters = request.filters.normalized();
    if filters.is_empty() {
        log::debug!("Scoring the whole dataset");
    }

    let cohort = repository.fetch_filtered(&filters).await?;
    if cohort.is_empty() {
        return Ok(RecommendResponse::empty());
    }

    let stats = repository.feature_ranges(Some(&filters)).await?;
    if stats.is_empty() {
        return Ok(RecommendResponse::empty());
    }

    let total_analyzed = cohort.len() as u64;
    let mut ranked = score_locations(cohort, &stats, &request.weights);
    ranked.truncate(request.limit as usize);

    Ok(RecommendResponse {
        total_analyzed,
        results: ranked.into_iter().map(RankedLocation::from).collect(),
    })
}

/// `GET /scoring/schema`
///
/// Lists every scorable feature with its dataset-wide range.
pub async fn schema(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stats = state.repository.feature_ranges(None).await?;

    let features: Vec<FeatureSchema> = SCORABLE_FEATURES
        .iter()
        .map(|descriptor| {
            let range = stats.get(&descriptor.feature);
            FeatureSchema {
                feature_name: descriptor.feature,
                description: descriptor.description.to_string(),
                min_value: range.map_or(0.0, |r| r.min),
                max_value: range.map_or(0.0, |r| r.max),
                optimization_direction: descriptor.direction,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(features))
}

/// `POST /scoring/explain/{location_id}`
///
/// Breaks one location's score down by feature, normalized against the
/// whole dataset.
pub async fn explain(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ScoringRequest>,
) -> Result<HttpResponse, ApiError> {
    let location_id = path.into_inner();
    let request = body.into_inner();
    request.validate()?;

    let Some(record) = state.repository.find_by_id(&location_id).await? else {
        return Err(ApiError::NotFound(location_id));
    };

    let stats = state.repository.feature_ranges(None).await?;
    let scored = score_location(record, &stats, &request.weights);

    Ok(HttpResponse::Ok().json(ExplainResponse::from(scored)))
}

/// `GET /health`
///
/// Always succeeds while the process is serving; the cache backend's
/// reachability is reported, never enforced.
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    let uptime = state.started_at.elapsed().as_secs_f64();

    HttpResponse::Ok().json(ApiHealth {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (uptime * 100.0).round() / 100.0,
        redis: CacheConnection::from(state.cache.is_available().await),
    })
}
