//! Single binary web server: JSON API for running stages (etapas) in memory.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, STAGE_TTL_HOURS (idle stages are dropped after this long).

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chaveamento::{
    cancel_elimination, cancel_groups, champion, finish_after_groups, generate_elimination,
    generate_groups, import_roster, record_result, record_walkover, start_match, Entrant, Player,
    SetScore, Side, Stage, StageConfig, StageError, StageId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// One stage plus its last activity time (for auto-cleanup).
/// Writers to a stage are serialized by its own lock; readers share it.
struct StageEntry {
    stage: RwLock<Stage>,
    last_activity: Mutex<Instant>,
}

impl StageEntry {
    fn new(stage: Stage) -> Self {
        Self {
            stage: RwLock::new(stage),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        if let Ok(mut t) = self.last_activity.lock() {
            *t = Instant::now();
        }
    }

    fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .map(|t| t.elapsed())
            .unwrap_or_default()
    }
}

/// In-memory state: stages by ID.
type AppState = Data<RwLock<HashMap<StageId, Arc<StageEntry>>>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateStageBody {
    name: String,
    #[serde(default)]
    config: StageConfig,
}

#[derive(Deserialize)]
struct AddEntrantBody {
    name: String,
    /// Player names; empty registers an individual named `name`.
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    seed: Option<u32>,
}

#[derive(Deserialize, Default)]
struct GenerateGroupsBody {
    /// Teams as lists of registered entrant ids (team formats only).
    #[serde(default)]
    manual_teams: Option<Vec<Vec<Uuid>>>,
    /// Fixes the shuffle used for automatic team formation.
    #[serde(default)]
    shuffle_seed: Option<u64>,
}

#[derive(Deserialize)]
struct ResultBody {
    score: Vec<SetScore>,
}

#[derive(Deserialize)]
struct WalkoverBody {
    winner: Side,
}

#[derive(Deserialize)]
struct StagePath {
    id: StageId,
}

#[derive(Deserialize)]
struct StageEntrantPath {
    id: StageId,
    entrant_id: Uuid,
}

#[derive(Deserialize)]
struct StageMatchPath {
    id: StageId,
    match_id: Uuid,
}

#[derive(Serialize)]
struct StandingRow {
    rank: u32,
    entrant_id: Uuid,
    name: String,
    points: u32,
    wins: u32,
    losses: u32,
    game_diff: i64,
    set_diff: i64,
}

#[derive(Serialize)]
struct GroupStandings {
    group_id: Uuid,
    label: String,
    complete: bool,
    rows: Vec<StandingRow>,
}

#[derive(Serialize)]
struct StandingsResponse {
    groups: Vec<GroupStandings>,
    champion: Option<Uuid>,
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn stage_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "No stage" }))
}

fn error_response(e: StageError) -> HttpResponse {
    log::warn!("Rejected request: {}", e);
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        StageError::MatchNotFound(_) | StageError::EntrantNotFound(_) => HttpResponse::NotFound().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// Find a stage and refresh its last activity.
fn stage_entry(state: &AppState, id: StageId) -> Result<Arc<StageEntry>, HttpResponse> {
    let g = state.read().map_err(|_| lock_error())?;
    let entry = g.get(&id).cloned().ok_or_else(stage_not_found)?;
    entry.touch();
    Ok(entry)
}

/// Run a mutating operation under the stage's write lock and answer with the stage.
fn mutate_stage<F>(state: &AppState, id: StageId, op: F) -> HttpResponse
where
    F: FnOnce(&mut Stage) -> Result<(), StageError>,
{
    let entry = match stage_entry(state, id) {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let mut stage = match entry.stage.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match op(&mut *stage) {
        Ok(()) => HttpResponse::Ok().json(&*stage),
        Err(e) => error_response(e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "chaveamento",
    })
}

/// Create a new stage (returns it with id; client stores id for subsequent requests).
#[post("/api/stages")]
async fn api_create_stage(state: AppState, body: Json<CreateStageBody>) -> HttpResponse {
    let body = body.into_inner();
    if let Err(e) = body.config.validate() {
        return error_response(e);
    }
    let stage = Stage::new(body.name.trim(), body.config);
    let id = stage.id;
    let resp = HttpResponse::Ok().json(&stage);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    g.insert(id, Arc::new(StageEntry::new(stage)));
    log::info!("Created stage {}", id);
    resp
}

/// Get a stage by id (404 if not found).
#[get("/api/stages/{id}")]
async fn api_get_stage(state: AppState, path: Path<StagePath>) -> HttpResponse {
    let entry = match stage_entry(&state, path.id) {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let stage = match entry.stage.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    HttpResponse::Ok().json(&*stage)
}

/// Replace the stage configuration (stage must be Open).
#[put("/api/stages/{id}/config")]
async fn api_set_config(state: AppState, path: Path<StagePath>, body: Json<StageConfig>) -> HttpResponse {
    let config = body.into_inner();
    mutate_stage(&state, path.id, |s| s.set_config(config))
}

/// Register an entrant (stage must be Open).
#[post("/api/stages/{id}/entrants")]
async fn api_add_entrant(state: AppState, path: Path<StagePath>, body: Json<AddEntrantBody>) -> HttpResponse {
    let body = body.into_inner();
    let entrant = if body.members.is_empty() {
        Entrant::individual(body.name, body.seed)
    } else {
        let players = body.members.iter().map(|m| Player::new(m.trim())).collect();
        Entrant::new(body.name, players, body.seed)
    };
    mutate_stage(&state, path.id, |s| s.add_entrant(entrant).map(|_| ()))
}

/// Withdraw an entrant (stage must be Open).
#[delete("/api/stages/{id}/entrants/{entrant_id}")]
async fn api_remove_entrant(state: AppState, path: Path<StageEntrantPath>) -> HttpResponse {
    let entrant_id = path.entrant_id;
    mutate_stage(&state, path.id, |s| s.remove_entrant(entrant_id))
}

/// Import a CSV roster: `name,seed,member...` with a header row.
#[post("/api/stages/{id}/entrants/import")]
async fn api_import_roster(state: AppState, path: Path<StagePath>, body: String) -> HttpResponse {
    mutate_stage(&state, path.id, |s| import_roster(s, body.as_bytes()).map(|_| ()))
}

/// Generate groups and their round-robin matches.
#[post("/api/stages/{id}/groups/generate")]
async fn api_generate_groups(
    state: AppState,
    path: Path<StagePath>,
    body: Option<Json<GenerateGroupsBody>>,
) -> HttpResponse {
    let body = body.map(Json::into_inner).unwrap_or_default();
    let mut rng = match body.shuffle_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    mutate_stage(&state, path.id, |s| {
        generate_groups(s, body.manual_teams.as_deref(), &mut rng)
    })
}

/// Cancel groups (only before any group result).
#[delete("/api/stages/{id}/groups")]
async fn api_cancel_groups(state: AppState, path: Path<StagePath>) -> HttpResponse {
    mutate_stage(&state, path.id, cancel_groups)
}

/// Ranked standings of every group, with names resolved.
#[get("/api/stages/{id}/standings")]
async fn api_standings(state: AppState, path: Path<StagePath>) -> HttpResponse {
    let entry = match stage_entry(&state, path.id) {
        Ok(e) => e,
        Err(resp) => return resp,
    };
    let stage = match entry.stage.read() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let groups = stage
        .groups
        .iter()
        .map(|g| GroupStandings {
            group_id: g.id,
            label: g.label(),
            complete: g.complete,
            rows: stage
                .standings_for(g.id)
                .into_iter()
                .map(|s| StandingRow {
                    rank: s.rank,
                    entrant_id: s.entrant_id,
                    name: stage
                        .participant(s.entrant_id)
                        .map(|e| e.display_name.clone())
                        .unwrap_or_default(),
                    points: s.points,
                    wins: s.wins,
                    losses: s.losses,
                    game_diff: s.game_diff(),
                    set_diff: s.set_diff(),
                })
                .collect(),
        })
        .collect();
    HttpResponse::Ok().json(StandingsResponse {
        groups,
        champion: champion(&stage),
    })
}

/// Mark a match as in progress.
#[put("/api/stages/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<StageMatchPath>) -> HttpResponse {
    let match_id = path.match_id;
    mutate_stage(&state, path.id, |s| start_match(s, match_id))
}

/// Record a played result (idempotent per match).
#[put("/api/stages/{id}/matches/{match_id}/result")]
async fn api_record_result(state: AppState, path: Path<StageMatchPath>, body: Json<ResultBody>) -> HttpResponse {
    let match_id = path.match_id;
    let score = body.into_inner().score;
    mutate_stage(&state, path.id, |s| record_result(s, match_id, score))
}

/// Award a walkover (idempotent per match).
#[put("/api/stages/{id}/matches/{match_id}/walkover")]
async fn api_record_walkover(state: AppState, path: Path<StageMatchPath>, body: Json<WalkoverBody>) -> HttpResponse {
    let match_id = path.match_id;
    let winner = body.winner;
    mutate_stage(&state, path.id, |s| record_walkover(s, match_id, winner))
}

/// Build the elimination bracket from final standings.
#[post("/api/stages/{id}/elimination/generate")]
async fn api_generate_elimination(state: AppState, path: Path<StagePath>) -> HttpResponse {
    mutate_stage(&state, path.id, generate_elimination)
}

/// Cancel the whole bracket (only before any knockout result).
#[delete("/api/stages/{id}/elimination")]
async fn api_cancel_elimination(state: AppState, path: Path<StagePath>) -> HttpResponse {
    mutate_stage(&state, path.id, cancel_elimination)
}

/// Close a single-group stage without elimination.
#[post("/api/stages/{id}/finish")]
async fn api_finish(state: AppState, path: Path<StagePath>) -> HttpResponse {
    mutate_stage(&state, path.id, finish_after_groups)
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_ttl_hours() -> u64 {
    12
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let ttl_hours: u64 = std::env::var("STAGE_TTL_HOURS")
        .ok()
        .and_then(|h| h.parse().ok())
        .unwrap_or_else(default_ttl_hours);
    let inactivity_timeout = Duration::from_secs(ttl_hours * 3600);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(RwLock::new(HashMap::new()));

    // Background task: every 30 minutes, remove stages idle past the TTL
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let before = g.len();
            g.retain(|_, entry| entry.idle_for() < inactivity_timeout);
            let removed = before - g.len();
            if removed > 0 {
                log::info!("Cleaned up {} inactive stage(s) (no activity for {}h)", removed, ttl_hours);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_stage)
            .service(api_get_stage)
            .service(api_set_config)
            .service(api_add_entrant)
            .service(api_remove_entrant)
            .service(api_import_roster)
            .service(api_generate_groups)
            .service(api_cancel_groups)
            .service(api_standings)
            .service(api_start_match)
            .service(api_record_result)
            .service(api_record_walkover)
            .service(api_generate_elimination)
            .service(api_cancel_elimination)
            .service(api_finish)
    })
    .bind(bind)?
    .run()
    .await
}
