//! In-process mock of the ministry REST API for integration tests.
//!
//! Serves the same endpoint surface the real backend exposes, with the
//! workflow rules enforced through the library's own `workflow` module
//! so client and server agree on the permission matrix.

use agriplan::types::{AnnualPlan, Breakdown, Performance, PlanAction, Profile, Quarter, Role, Status};
use agriplan::workflow;
use axum::extract::{Path, Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const LEAD_TOKEN: &str = "lead-token";
pub const MINISTER_TOKEN: &str = "minister-token";
pub const STRATEGIC_TOKEN: &str = "strategic-token";
pub const EXECUTIVE_TOKEN: &str = "executive-token";
pub const VIEW_TOKEN: &str = "view-token";
pub const ADVISOR_TOKEN: &str = "advisor-token";

#[derive(Default)]
struct Ministry {
    plans: Vec<AnnualPlan>,
    breakdowns: Vec<Breakdown>,
    performances: Vec<Performance>,
    next_id: i64,
}

impl Ministry {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn breakdown_status_for_plan(&self, plan: i64) -> Option<Status> {
        self.breakdowns
            .iter()
            .find(|b| b.plan == plan)
            .map(|b| b.status)
    }
}

type Shared = Arc<Mutex<Ministry>>;
type Reply<T> = Result<Json<T>, (StatusCode, Json<Value>)>;

fn err(status: StatusCode, detail: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail.into() })))
}

fn role_of(headers: &HeaderMap) -> Result<Role, (StatusCode, Json<Value>)> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Token "))
        .ok_or_else(|| {
            err(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            )
        })?;
    match token {
        LEAD_TOKEN => Ok(Role::LeadExecutiveBody),
        MINISTER_TOKEN => Ok(Role::StateMinister),
        STRATEGIC_TOKEN => Ok(Role::StrategicStaff),
        EXECUTIVE_TOKEN => Ok(Role::Executive),
        VIEW_TOKEN => Ok(Role::MinisterView),
        ADVISOR_TOKEN => Ok(Role::Advisor),
        _ => Err(err(StatusCode::UNAUTHORIZED, "Invalid token.")),
    }
}

fn parse_action(action: &str) -> Option<PlanAction> {
    match action {
        "submit" => Some(PlanAction::Submit),
        "approve" => Some(PlanAction::Approve),
        "validate" => Some(PlanAction::Validate),
        "final_approve" => Some(PlanAction::FinalApprove),
        "reject" => Some(PlanAction::Reject),
        _ => None,
    }
}

fn workflow_reply(e: workflow::WorkflowError) -> (StatusCode, Json<Value>) {
    let status = match e {
        workflow::WorkflowError::RoleNotPermitted { .. } => StatusCode::FORBIDDEN,
        _ => StatusCode::BAD_REQUEST,
    };
    err(status, e.to_string())
}

async fn me(headers: HeaderMap) -> Reply<Profile> {
    let role = role_of(&headers)?;
    Ok(Json(Profile {
        username: format!("{role}").to_lowercase(),
        role,
        is_superuser: false,
        sector: None,
        sector_name: None,
        department: None,
        department_name: None,
    }))
}

#[derive(Deserialize)]
struct PlanBody {
    year: i32,
    indicator: i64,
    target: Decimal,
}

async fn list_plans(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply<Vec<AnnualPlan>> {
    role_of(&headers)?;
    let year: Option<i32> = query.get("year").and_then(|y| y.parse().ok());
    let st = state.lock().unwrap();
    Ok(Json(
        st.plans
            .iter()
            .filter(|p| year.map_or(true, |y| p.year == y))
            .cloned()
            .collect(),
    ))
}

async fn create_plan(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<PlanBody>,
) -> Reply<AnnualPlan> {
    role_of(&headers)?;
    let mut st = state.lock().unwrap();
    let id = st.next_id();
    let plan = AnnualPlan {
        id,
        year: body.year,
        indicator: body.indicator,
        target: body.target,
        indicator_name: format!("Indicator {}", body.indicator),
        indicator_unit: "tonnes".to_string(),
        department_id: 1,
        department_name: "Crop Development".to_string(),
        sector_id: 1,
        sector_name: "Agriculture Development".to_string(),
        created_by: None,
        created_at: None,
    };
    st.plans.push(plan.clone());
    Ok(Json(plan))
}

#[derive(Deserialize)]
struct BreakdownBody {
    plan: i64,
    q1: Decimal,
    q2: Decimal,
    q3: Decimal,
    q4: Decimal,
}

fn new_breakdown(id: i64, body: &BreakdownBody) -> Breakdown {
    serde_json::from_value(json!({
        "id": id, "plan": body.plan,
        "q1": body.q1, "q2": body.q2, "q3": body.q3, "q4": body.q4,
        "status": "DRAFT",
    }))
    .expect("valid breakdown fixture")
}

async fn list_breakdowns(State(state): State<Shared>, headers: HeaderMap) -> Reply<Vec<Breakdown>> {
    role_of(&headers)?;
    Ok(Json(state.lock().unwrap().breakdowns.clone()))
}

async fn get_breakdown(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Reply<Breakdown> {
    role_of(&headers)?;
    let st = state.lock().unwrap();
    st.breakdowns
        .iter()
        .find(|b| b.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))
}

async fn create_breakdown(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<BreakdownBody>,
) -> Reply<Breakdown> {
    let role = role_of(&headers)?;
    if role != Role::LeadExecutiveBody {
        return Err(err(
            StatusCode::FORBIDDEN,
            "Only Lead Executive Body can create quarterly breakdowns.",
        ));
    }
    let mut st = state.lock().unwrap();
    if st.breakdowns.iter().any(|b| b.plan == body.plan) {
        return Err(err(
            StatusCode::BAD_REQUEST,
            "A breakdown already exists for this plan.",
        ));
    }
    let id = st.next_id();
    let bd = new_breakdown(id, &body);
    st.breakdowns.push(bd.clone());
    Ok(Json(bd))
}

async fn update_breakdown(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<BreakdownBody>,
) -> Reply<Breakdown> {
    let role = role_of(&headers)?;
    let mut st = state.lock().unwrap();
    let bd = st
        .breakdowns
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))?;
    if !workflow::can_edit_breakdown(role, bd.status) {
        return Err(err(
            StatusCode::FORBIDDEN,
            "Only Lead Executive Body can update quarterly breakdowns.",
        ));
    }
    bd.q1 = body.q1;
    bd.q2 = body.q2;
    bd.q3 = body.q3;
    bd.q4 = body.q4;
    Ok(Json(bd.clone()))
}

async fn breakdown_action(
    State(state): State<Shared>,
    Path((id, action)): Path<(i64, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply<Breakdown> {
    let role = role_of(&headers)?;
    let comment = body
        .get("comment")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();

    if action == "advisor_review" {
        if role != Role::Advisor {
            return Err(err(
                StatusCode::FORBIDDEN,
                "Only Advisors can leave advisor notes.",
            ));
        }
        let mut st = state.lock().unwrap();
        let bd = st
            .breakdowns
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))?;
        if bd.review_comment.is_empty() {
            bd.review_comment = format!("Advisor: {comment}");
        } else {
            bd.review_comment = format!("{}\nAdvisor: {comment}", bd.review_comment);
        }
        return Ok(Json(bd.clone()));
    }

    let action =
        parse_action(&action).ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))?;

    let mut st = state.lock().unwrap();
    let target = st
        .breakdowns
        .iter()
        .find(|b| b.id == id)
        .and_then(|b| st.plans.iter().find(|p| p.id == b.plan))
        .map(|p| p.target);
    let bd = st
        .breakdowns
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))?;

    if action == PlanAction::Submit {
        let target = target.ok_or_else(|| err(StatusCode::BAD_REQUEST, "Invalid plan."))?;
        workflow::check_breakdown_totals(bd, target).map_err(workflow_reply)?;
    }
    let next = workflow::authorize(role, bd.status, action, &comment).map_err(workflow_reply)?;
    bd.status = next;
    if matches!(action, PlanAction::Approve | PlanAction::Reject) {
        bd.review_comment = comment;
    }
    Ok(Json(bd.clone()))
}

#[derive(Deserialize)]
struct PerformanceBody {
    plan: i64,
    quarter: Quarter,
    value: Decimal,
}

fn new_performance(id: i64, body: &PerformanceBody) -> Performance {
    serde_json::from_value(json!({
        "id": id, "plan": body.plan, "quarter": body.quarter,
        "value": body.value, "status": "DRAFT",
    }))
    .expect("valid performance fixture")
}

async fn list_performances(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Reply<Vec<Performance>> {
    role_of(&headers)?;
    let quarter: Option<u8> = query.get("quarter").and_then(|q| q.parse().ok());
    let st = state.lock().unwrap();
    Ok(Json(
        st.performances
            .iter()
            .filter(|p| quarter.map_or(true, |q| p.quarter.number() == q))
            .cloned()
            .collect(),
    ))
}

async fn get_performance(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Reply<Performance> {
    role_of(&headers)?;
    let st = state.lock().unwrap();
    st.performances
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))
}

async fn create_performance(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<PerformanceBody>,
) -> Reply<Performance> {
    let role = role_of(&headers)?;
    let mut st = state.lock().unwrap();
    let bd_status = st.breakdown_status_for_plan(body.plan);
    if !bd_status.map_or(false, |s| workflow::can_edit_performance(role, s, Status::Draft)) {
        return Err(err(
            StatusCode::FORBIDDEN,
            "Only Lead Executive Body can create performance for an approved quarterly plan.",
        ));
    }
    let id = st.next_id();
    let perf = new_performance(id, &body);
    st.performances.push(perf.clone());
    Ok(Json(perf))
}

async fn update_performance(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<PerformanceBody>,
) -> Reply<Performance> {
    let role = role_of(&headers)?;
    let mut st = state.lock().unwrap();
    let bd_status = st.breakdown_status_for_plan(body.plan);
    let perf = st
        .performances
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))?;
    let editable = bd_status
        .map_or(false, |s| workflow::can_edit_performance(role, s, perf.status));
    if !editable {
        return Err(err(
            StatusCode::BAD_REQUEST,
            "Performance cannot be edited after approval/validation.",
        ));
    }
    perf.value = body.value;
    Ok(Json(perf.clone()))
}

async fn performance_action(
    State(state): State<Shared>,
    Path((id, action)): Path<(i64, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply<Performance> {
    let role = role_of(&headers)?;
    let action =
        parse_action(&action).ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))?;
    let comment = body
        .get("comment")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();

    let mut st = state.lock().unwrap();
    let bd_status = st
        .performances
        .iter()
        .find(|p| p.id == id)
        .and_then(|p| st.breakdown_status_for_plan(p.plan));
    let perf = st
        .performances
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| err(StatusCode::NOT_FOUND, "Not found."))?;

    if action == PlanAction::Submit {
        workflow::check_breakdown_approved(bd_status).map_err(workflow_reply)?;
    }
    let next = workflow::authorize(role, perf.status, action, &comment).map_err(workflow_reply)?;
    perf.status = next;
    if matches!(action, PlanAction::Approve | PlanAction::Reject) {
        perf.review_comment = comment;
    }
    Ok(Json(perf.clone()))
}

#[derive(Deserialize)]
struct BulkBody {
    breakdown_ids: Vec<i64>,
    performance_ids: Vec<i64>,
}

async fn submit_to_strategic(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<BulkBody>,
) -> Reply<Value> {
    let role = role_of(&headers)?;
    if role != Role::StateMinister {
        return Err(err(
            StatusCode::FORBIDDEN,
            "Only State Minister can submit to Strategic Affairs.",
        ));
    }
    let st = state.lock().unwrap();
    let breakdowns = body
        .breakdown_ids
        .iter()
        .filter(|id| {
            st.breakdowns
                .iter()
                .any(|b| b.id == **id && b.status == Status::Approved)
        })
        .count();
    let performances = body
        .performance_ids
        .iter()
        .filter(|id| {
            st.performances
                .iter()
                .any(|p| p.id == **id && p.status == Status::Approved)
        })
        .count();
    Ok(Json(json!({
        "breakdowns": breakdowns,
        "performances": performances,
    })))
}

fn app(state: Shared) -> Router {
    Router::new()
        .route("/api/me/", get(me))
        .route("/api/annual-plans/", get(list_plans).post(create_plan))
        .route(
            "/api/breakdowns/",
            get(list_breakdowns).post(create_breakdown),
        )
        .route(
            "/api/breakdowns/:id/",
            get(get_breakdown).put(update_breakdown),
        )
        .route("/api/breakdowns/:id/:action/", post(breakdown_action))
        .route(
            "/api/performances/",
            get(list_performances).post(create_performance),
        )
        .route(
            "/api/performances/:id/",
            get(get_performance).put(update_performance),
        )
        .route("/api/performances/:id/:action/", post(performance_action))
        .route("/api/reviews/submit-to-strategic/", post(submit_to_strategic))
        .with_state(state)
}

/// Start the mock ministry API on an ephemeral port and return its
/// base URL.
pub async fn spawn_ministry() -> String {
    let state: Shared = Arc::default();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().expect("mock server addr");
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("mock server");
    });
    format!("http://{addr}/")
}
