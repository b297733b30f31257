//! Typed HTTP client for the ministry planning REST API.
//!
//! Wraps every endpoint the pages consume: reference data CRUD, plan
//! and breakdown and performance CRUD with their workflow action
//! suffixes, the authenticated profile, token exchange, and the single
//! batched call (`submit-to-strategic`). Auth rides on every request
//! as `Authorization: Token <value>`. Errors are normalized through
//! [`ApiError`]; there is no retry and no cancellation.

use crate::error::ApiError;
use agriplan_types::{
    AnnualPlan, Breakdown, Department, Indicator, IndicatorGroup, Performance, PlanAction,
    Profile, Quarter, Sector, User,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// New-record payload for an annual plan.
#[derive(Debug, Clone, Serialize)]
pub struct PlanPayload {
    pub year: i32,
    pub indicator: i64,
    pub target: Decimal,
}

/// Quarterly allocation values for creating or updating a breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct BreakdownPayload {
    pub plan: i64,
    pub q1: Decimal,
    pub q2: Decimal,
    pub q3: Decimal,
    pub q4: Decimal,
}

/// A quarter's actual value for creating or updating a performance.
#[derive(Debug, Clone, Serialize)]
pub struct PerformancePayload {
    pub plan: i64,
    pub quarter: Quarter,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorPayload {
    pub name: String,
    pub unit: String,
    pub description: String,
    pub department: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPayload {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: agriplan_types::Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<i64>,
    pub is_active: bool,
}

/// Optional list filters for annual plans.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanQuery {
    pub year: Option<i32>,
}

/// Optional list filters for performances.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceQuery {
    pub year: Option<i32>,
    pub quarter: Option<Quarter>,
}

/// Receipt from the batched submit-to-strategic call.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkSubmitReceipt {
    #[serde(default)]
    pub breakdowns: u32,
    #[serde(default)]
    pub performances: u32,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    comment: &'a str,
}

#[derive(Serialize)]
struct NameBody<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct DepartmentBody<'a> {
    name: &'a str,
    sector: i64,
}

#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
    token: String,
}

impl ApiClient {
    /// Build a client for `base_url`, authenticating every request
    /// with `token`.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ApiError> {
        let base = parse_base(base_url)?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base,
            token: token.into(),
        })
    }

    /// Exchange credentials for an API token (`/api/auth/token/`).
    pub async fn obtain_token(
        base_url: &str,
        username: &str,
        password: &str,
    ) -> Result<String, ApiError> {
        #[derive(Serialize)]
        struct Credentials<'a> {
            username: &'a str,
            password: &'a str,
        }
        #[derive(Deserialize)]
        struct TokenResponse {
            token: String,
        }

        let base = parse_base(base_url)?;
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let url = base
            .join("api/auth/token/")
            .map_err(|_| ApiError::BaseUrl(base_url.to_string()))?;
        let response = http
            .post(url)
            .json(&Credentials { username, password })
            .send()
            .await?;
        let body: TokenResponse = decode(response).await?;
        Ok(body.token)
    }

    /// The authenticated user's own profile (`/api/me/`).
    pub async fn me(&self) -> Result<Profile, ApiError> {
        self.get("api/me/", &[]).await
    }

    // ── Reference data ───────────────────────────────────────────────

    pub async fn list_sectors(&self) -> Result<Vec<Sector>, ApiError> {
        self.get("api/sectors/", &[]).await
    }

    pub async fn create_sector(&self, name: &str) -> Result<Sector, ApiError> {
        self.post("api/sectors/", &NameBody { name }).await
    }

    pub async fn update_sector(&self, id: i64, name: &str) -> Result<Sector, ApiError> {
        self.put(&format!("api/sectors/{id}/"), &NameBody { name })
            .await
    }

    pub async fn delete_sector(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("api/sectors/{id}/")).await
    }

    pub async fn list_departments(
        &self,
        sector: Option<i64>,
    ) -> Result<Vec<Department>, ApiError> {
        let query = id_query("sector", sector);
        self.get("api/departments/", &query).await
    }

    pub async fn create_department(
        &self,
        name: &str,
        sector: i64,
    ) -> Result<Department, ApiError> {
        self.post("api/departments/", &DepartmentBody { name, sector })
            .await
    }

    pub async fn update_department(
        &self,
        id: i64,
        name: &str,
        sector: i64,
    ) -> Result<Department, ApiError> {
        self.put(
            &format!("api/departments/{id}/"),
            &DepartmentBody { name, sector },
        )
        .await
    }

    pub async fn delete_department(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("api/departments/{id}/")).await
    }

    pub async fn list_indicators(
        &self,
        department: Option<i64>,
    ) -> Result<Vec<Indicator>, ApiError> {
        let query = id_query("department", department);
        self.get("api/indicators/", &query).await
    }

    pub async fn create_indicator(
        &self,
        payload: &IndicatorPayload,
    ) -> Result<Indicator, ApiError> {
        self.post("api/indicators/", payload).await
    }

    pub async fn update_indicator(
        &self,
        id: i64,
        payload: &IndicatorPayload,
    ) -> Result<Indicator, ApiError> {
        self.put(&format!("api/indicators/{id}/"), payload).await
    }

    pub async fn delete_indicator(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("api/indicators/{id}/")).await
    }

    pub async fn list_indicator_groups(
        &self,
        department: Option<i64>,
    ) -> Result<Vec<IndicatorGroup>, ApiError> {
        let query = id_query("department", department);
        self.get("api/indicator-groups/", &query).await
    }

    // ── Annual plans ─────────────────────────────────────────────────

    pub async fn list_plans(&self, filter: PlanQuery) -> Result<Vec<AnnualPlan>, ApiError> {
        let mut query = Vec::new();
        if let Some(year) = filter.year {
            query.push(("year", year.to_string()));
        }
        self.get("api/annual-plans/", &query).await
    }

    pub async fn create_plan(&self, payload: &PlanPayload) -> Result<AnnualPlan, ApiError> {
        self.post("api/annual-plans/", payload).await
    }

    pub async fn update_plan(
        &self,
        id: i64,
        payload: &PlanPayload,
    ) -> Result<AnnualPlan, ApiError> {
        self.put(&format!("api/annual-plans/{id}/"), payload).await
    }

    pub async fn delete_plan(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("api/annual-plans/{id}/")).await
    }

    // ── Quarterly breakdowns ─────────────────────────────────────────

    pub async fn list_breakdowns(&self) -> Result<Vec<Breakdown>, ApiError> {
        self.get("api/breakdowns/", &[]).await
    }

    pub async fn get_breakdown(&self, id: i64) -> Result<Breakdown, ApiError> {
        self.get(&format!("api/breakdowns/{id}/"), &[]).await
    }

    pub async fn create_breakdown(
        &self,
        payload: &BreakdownPayload,
    ) -> Result<Breakdown, ApiError> {
        self.post("api/breakdowns/", payload).await
    }

    pub async fn update_breakdown(
        &self,
        id: i64,
        payload: &BreakdownPayload,
    ) -> Result<Breakdown, ApiError> {
        self.put(&format!("api/breakdowns/{id}/"), payload).await
    }

    pub async fn delete_breakdown(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("api/breakdowns/{id}/")).await
    }

    /// One workflow step on a breakdown. `comment` travels with reject
    /// and approve; the other actions ignore it.
    pub async fn breakdown_action(
        &self,
        id: i64,
        action: PlanAction,
        comment: &str,
    ) -> Result<Breakdown, ApiError> {
        self.post(
            &format!("api/breakdowns/{id}/{}/", action.endpoint_suffix()),
            &CommentBody { comment },
        )
        .await
    }

    /// Append an advisor note to a breakdown without moving its status.
    pub async fn breakdown_advisor_review(
        &self,
        id: i64,
        comment: &str,
    ) -> Result<Breakdown, ApiError> {
        self.post(
            &format!("api/breakdowns/{id}/advisor_review/"),
            &CommentBody { comment },
        )
        .await
    }

    // ── Quarterly performances ───────────────────────────────────────

    pub async fn list_performances(
        &self,
        filter: PerformanceQuery,
    ) -> Result<Vec<Performance>, ApiError> {
        let mut query = Vec::new();
        if let Some(year) = filter.year {
            query.push(("year", year.to_string()));
        }
        if let Some(quarter) = filter.quarter {
            query.push(("quarter", quarter.number().to_string()));
        }
        self.get("api/performances/", &query).await
    }

    pub async fn get_performance(&self, id: i64) -> Result<Performance, ApiError> {
        self.get(&format!("api/performances/{id}/"), &[]).await
    }

    pub async fn create_performance(
        &self,
        payload: &PerformancePayload,
    ) -> Result<Performance, ApiError> {
        self.post("api/performances/", payload).await
    }

    pub async fn update_performance(
        &self,
        id: i64,
        payload: &PerformancePayload,
    ) -> Result<Performance, ApiError> {
        self.put(&format!("api/performances/{id}/"), payload).await
    }

    pub async fn performance_action(
        &self,
        id: i64,
        action: PlanAction,
        comment: &str,
    ) -> Result<Performance, ApiError> {
        self.post(
            &format!("api/performances/{id}/{}/", action.endpoint_suffix()),
            &CommentBody { comment },
        )
        .await
    }

    /// The State Minister's batched hand-off of everything currently
    /// APPROVED to Strategic Affairs, one call instead of one per
    /// record.
    pub async fn submit_to_strategic(
        &self,
        breakdown_ids: &[i64],
        performance_ids: &[i64],
    ) -> Result<BulkSubmitReceipt, ApiError> {
        #[derive(Serialize)]
        struct Body<'a> {
            breakdown_ids: &'a [i64],
            performance_ids: &'a [i64],
        }
        self.post(
            "api/reviews/submit-to-strategic/",
            &Body {
                breakdown_ids,
                performance_ids,
            },
        )
        .await
    }

    // ── Users ────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get("api/users/", &[]).await
    }

    pub async fn create_user(&self, payload: &UserPayload) -> Result<User, ApiError> {
        self.post("api/users/", payload).await
    }

    pub async fn update_user(&self, id: i64, payload: &UserPayload) -> Result<User, ApiError> {
        self.put(&format!("api/users/{id}/"), payload).await
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("api/users/{id}/")).await
    }

    // ── Request plumbing ─────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self
            .base
            .join(path)
            .map_err(|_| ApiError::BaseUrl(format!("{}{path}", self.base)))?;
        debug!(%method, %url, "api request");
        Ok(self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Token {}", self.token)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .request(Method::GET, path)?
            .query(query)
            .send()
            .await?;
        decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::POST, path)?.json(body).send().await?;
        decode(response).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::PUT, path)?.json(body).send().await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.request(Method::DELETE, path)?.send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

fn parse_base(base_url: &str) -> Result<Url, ApiError> {
    let normalized = if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{base_url}/")
    };
    Url::parse(&normalized).map_err(|_| ApiError::BaseUrl(base_url.to_string()))
}

fn id_query(name: &'static str, value: Option<i64>) -> Vec<(&'static str, String)> {
    value
        .map(|id| vec![(name, id.to_string())])
        .unwrap_or_default()
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Normalize a failed response: surface the body's `detail` field if
/// one exists, else a generic message with the status code.
async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| {
            body.get("detail")
                .and_then(|d| d.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| generic_detail(status));
    ApiError::Api {
        status: status.as_u16(),
        detail,
    }
}

fn generic_detail(status: StatusCode) -> String {
    format!(
        "Request failed ({} {})",
        status.as_u16(),
        status.canonical_reason().unwrap_or("error")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_a_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000", "t").unwrap();
        assert_eq!(client.base.as_str(), "http://localhost:8000/");
        let url = client.base.join("api/sectors/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/sectors/");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ApiClient::new("not a url", "t").unwrap_err();
        assert!(matches!(err, ApiError::BaseUrl(_)));
    }

    #[test]
    fn action_paths_use_backend_suffixes() {
        assert_eq!(PlanAction::FinalApprove.endpoint_suffix(), "final_approve");
        assert_eq!(
            format!("api/breakdowns/5/{}/", PlanAction::Reject.endpoint_suffix()),
            "api/breakdowns/5/reject/"
        );
    }

    #[test]
    fn plan_payload_serializes_decimal_target() {
        let payload = PlanPayload {
            year: 2024,
            indicator: 3,
            target: Decimal::new(10000, 2),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["target"], "100.00");
        assert_eq!(json["year"], 2024);
    }
}
