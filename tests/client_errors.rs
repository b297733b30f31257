//! Error normalization and role enforcement as seen by the client:
//! every failure surfaces the backend's `detail` text through
//! `ApiError::user_message`, the way the page banners displayed it.

mod common;

use agriplan::client::{ApiClient, BreakdownPayload, PlanPayload};
use agriplan::types::PlanAction;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().expect("decimal literal")
}

#[tokio::test]
async fn backend_detail_text_surfaces_verbatim() {
    let base = common::spawn_ministry().await;
    let lead = ApiClient::new(&base, common::LEAD_TOKEN).unwrap();
    let advisor = ApiClient::new(&base, common::ADVISOR_TOKEN).unwrap();

    let plan = lead
        .create_plan(&PlanPayload {
            year: 2024,
            indicator: 1,
            target: dec("100.00"),
        })
        .await
        .unwrap();
    let refused = advisor
        .create_breakdown(&BreakdownPayload {
            plan: plan.id,
            q1: dec("25.00"),
            q2: dec("25.00"),
            q3: dec("25.00"),
            q4: dec("25.00"),
        })
        .await
        .unwrap_err();
    assert_eq!(refused.status(), Some(403));
    assert_eq!(
        refused.user_message(),
        "Only Lead Executive Body can create quarterly breakdowns."
    );
}

#[tokio::test]
async fn advisor_cannot_approve_a_submitted_breakdown() {
    let base = common::spawn_ministry().await;
    let lead = ApiClient::new(&base, common::LEAD_TOKEN).unwrap();
    let advisor = ApiClient::new(&base, common::ADVISOR_TOKEN).unwrap();

    let plan = lead
        .create_plan(&PlanPayload {
            year: 2024,
            indicator: 1,
            target: dec("80.00"),
        })
        .await
        .unwrap();
    let bd = lead
        .create_breakdown(&BreakdownPayload {
            plan: plan.id,
            q1: dec("20.00"),
            q2: dec("20.00"),
            q3: dec("20.00"),
            q4: dec("20.00"),
        })
        .await
        .unwrap();
    lead.breakdown_action(bd.id, PlanAction::Submit, "")
        .await
        .unwrap();

    let refused = advisor
        .breakdown_action(bd.id, PlanAction::Approve, "")
        .await
        .unwrap_err();
    assert_eq!(refused.status(), Some(403));
}

#[tokio::test]
async fn missing_token_is_a_401_with_detail() {
    let base = common::spawn_ministry().await;
    let anonymous = ApiClient::new(&base, "bogus-token").unwrap();

    let refused = anonymous.list_breakdowns().await.unwrap_err();
    assert_eq!(refused.status(), Some(401));
    assert_eq!(refused.user_message(), "Invalid token.");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Nothing listens on this port.
    let client = ApiClient::new("http://127.0.0.1:1/", "t").unwrap();
    let err = client.list_sectors().await.unwrap_err();
    assert_eq!(err.status(), None);
    assert_eq!(err.user_message(), "Network request failed. Please try again.");
}
