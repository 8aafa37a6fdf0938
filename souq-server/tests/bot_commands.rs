//! Bot command dispatch over the webhook: conversation interruption and
//! the /cancel acknowledgement.

mod common;

use tower::ServiceExt;

use common::{OWNER, post_json, test_state, webhook_message};
use souq_server::api;

#[tokio::test]
async fn cancel_during_a_wizard_acknowledges_and_stops_it() {
    let (state, channel) = test_state().await;
    let app = api::build_app(&state);

    let response = app
        .clone()
        .oneshot(post_json("/webhook", webhook_message(OWNER, "/add_product")))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);

    let response = app
        .clone()
        .oneshot(post_json("/webhook", webhook_message(OWNER, "/cancel")))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    let replies = channel.sent_to(OWNER);
    assert!(replies.iter().any(|m| m.text.contains("Cancelled.")));

    // The wizard is dead: plain text no longer advances it.
    let response = app
        .oneshot(post_json("/webhook", webhook_message(OWNER, "steam key")))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    let replies = channel.sent_to(OWNER);
    assert!(replies.iter().all(|m| !m.text.contains("Price?")));
}

#[tokio::test]
async fn cancel_with_nothing_in_flight_says_so() {
    let (state, channel) = test_state().await;
    let app = api::build_app(&state);

    let response = app
        .oneshot(post_json("/webhook", webhook_message(OWNER, "/cancel")))
        .await
        .expect("response");
    assert_eq!(response.status(), 200);
    let replies = channel.sent_to(OWNER);
    assert!(replies.iter().any(|m| m.text.contains("Nothing to cancel.")));
    assert!(replies.iter().all(|m| !m.text.contains("Cancelled.")));
}
