mod common;

use common::{client, get_json, signed_in_client};
use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::Client;
use rocket::serde::json::{json, Value};

#[test]
fn test_api_requires_login() {
    let client = client();
    let (status, body) = get_json(&client, "/api/topics");
    assert_eq!(status, Status::Unauthorized);
    assert_eq!(body["error"], "Authentication required");
}

#[test]
fn test_login_validation() {
    let client = client();
    let response = client
        .post("/api/auth/login")
        .json(&json!({ "email": "not-an-email", "password": "secret1" }))
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let response = client
        .post("/api/auth/login")
        .json(&json!({ "email": "ana@pulse.dev", "password": "123" }))
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[test]
fn test_login_and_logout() {
    let client = signed_in_client();
    let (status, me) = get_json(&client, "/api/auth/me");
    assert_eq!(status, Status::Ok);
    assert_eq!(me["email"], "ana@pulse.dev");
    assert_eq!(me["role"], "admin");

    let response = client.post("/api/auth/logout").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let (status, _) = get_json(&client, "/api/auth/me");
    assert_eq!(status, Status::Unauthorized);
}

#[test]
fn test_bearer_token_accepted() {
    let client = Client::untracked(common::rocket()).unwrap();
    let response = client
        .post("/api/auth/login")
        .json(&json!({ "email": "ana@pulse.dev", "password": "secret1" }))
        .dispatch();
    let session: Value = response.into_json().unwrap();
    let token = session["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 32);

    let response = client.get("/api/auth/me").dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .get("/api/auth/me")
        .header(Header::new("Authorization", format!("Bearer {token}")))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
}

#[test]
fn test_topics_and_unknown_topic() {
    let client = signed_in_client();
    let (status, topics) = get_json(&client, "/api/topics");
    assert_eq!(status, Status::Ok);
    assert_eq!(topics.as_array().unwrap().len(), 3);

    let (status, body) = get_json(&client, "/api/topics/nope/overview");
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["error"], "Topic not found: nope");
}

#[test]
fn test_topic_fetch_sets_active_project() {
    let client = signed_in_client();
    let (status, _) = get_json(&client, "/api/topics/topic_2");
    assert_eq!(status, Status::Ok);
    let (_, session) = get_json(&client, "/api/session");
    assert_eq!(session["project"]["topicId"], "topic_2");
    assert_eq!(session["project"]["topicName"], "City Transit Fare Increase");

    let response = client.post("/api/session/sidebar").dispatch();
    let state: Value = response.into_json().unwrap();
    assert_eq!(state["sidebarCollapsed"], true);
}

#[test]
fn test_overview_payload() {
    let client = signed_in_client();
    let (status, body) = get_json(&client, "/api/topics/topic_1/overview");
    assert_eq!(status, Status::Ok);
    assert!(body["stats"].as_array().is_some());
    assert_eq!(body["recentMentions"].as_array().unwrap().len(), 5);
    assert_eq!(body["recentMentions"][0]["id"], "m_001");
}

#[test]
fn test_mentions_filter_and_paginate() {
    let client = signed_in_client();
    let (_, page) = get_json(&client, "/api/topics/topic_1/mentions?page_size=5&page=3");
    assert_eq!(page["total"], 14);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["items"].as_array().unwrap().len(), 4);

    let (_, page) = get_json(&client, "/api/topics/topic_1/mentions?sentiment=negative");
    assert_eq!(page["total"], 4);

    let (_, page) = get_json(&client, "/api/topics/topic_1/mentions?platforms=twitter,news");
    assert_eq!(page["total"], 8);

    let (_, page) = get_json(&client, "/api/topics/topic_1/mentions?status=flagged");
    assert_eq!(page["total"], 2);
}

#[test]
fn test_mention_review_actions() {
    let client = signed_in_client();
    let response = client.post("/api/topics/topic_1/mentions/m_002/handled").dispatch();
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["message"], "Marked as handled");
    assert_eq!(ack["data"]["handled"], true);

    let (_, page) = get_json(&client, "/api/topics/topic_1/mentions?status=handled");
    assert_eq!(page["total"], 3);

    let response = client
        .put("/api/topics/topic_1/mentions/m_002/sentiment")
        .json(&json!({ "sentiment": "neutral" }))
        .dispatch();
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["data"]["sentiment"]["manual"], "neutral");

    let (_, page) = get_json(&client, "/api/topics/topic_1/mentions?sentiment=negative");
    assert_eq!(page["total"], 3);

    let response = client.post("/api/topics/topic_1/mentions/m_999/flagged").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn test_mentions_export() {
    let client = signed_in_client();
    let response = client
        .get("/api/topics/topic_1/mentions/export?sentiment=negative")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::CSV));
    let disposition = response.headers().get_one("Content-Disposition").unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"mentions-topic_1-"));

    let body = response.into_string().unwrap();
    let mut lines = body.lines();
    assert!(lines.next().unwrap().starts_with("id,published_at,platform"));
    assert_eq!(lines.count(), 4);
}

#[test]
fn test_comparison_hides_competitors() {
    let client = signed_in_client();
    let (_, view) = get_json(&client, "/api/topics/topic_1/comparison");
    assert_eq!(view["shareOfVoice"].as_array().unwrap().len(), 3);

    let (_, view) = get_json(&client, "/api/topics/topic_1/comparison?hidden=comp_brewline");
    let labels: Vec<&str> = view["shareOfVoice"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["Aurora Coffee", "North Bean"]);

    // the own brand cannot be hidden
    let (_, view) = get_json(
        &client,
        "/api/topics/topic_1/comparison?hidden=comp_own,comp_brewline,comp_northbean",
    );
    assert_eq!(view["shareOfVoice"].as_array().unwrap().len(), 1);
    assert_eq!(view["shareOfVoice"][0]["value"], 100.0);
}

#[test]
fn test_topic_config_draft_flow() {
    let client = signed_in_client();
    let (_, settings) = get_json(&client, "/api/topics/topic_1/settings");
    assert_eq!(settings["dirty"], false);

    let response = client
        .post("/api/topics/topic_1/settings/topic-config/keywords")
        .json(&json!({ "list": "primary", "keyword": "aurora oat latte" }))
        .dispatch();
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["data"]["dirty"], true);

    let response = client
        .post("/api/topics/topic_1/settings/topic-config/keywords")
        .json(&json!({ "list": "primary", "keyword": "AURORA COFFEE" }))
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let response = client.post("/api/topics/topic_1/settings/topic-config/cancel").dispatch();
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["data"]["dirty"], false);

    client
        .post("/api/topics/topic_1/settings/topic-config/keywords")
        .json(&json!({ "list": "primary", "keyword": "aurora oat latte" }))
        .dispatch();
    let response = client.post("/api/topics/topic_1/settings/topic-config/save").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let (_, settings) = get_json(&client, "/api/topics/topic_1/settings");
    assert_eq!(settings["dirty"], false);
    let (_, topic) = get_json(&client, "/api/topics/topic_1");
    assert!(topic["keywords"]
        .as_array()
        .unwrap()
        .iter()
        .any(|k| k == "aurora oat latte"));
}

#[test]
fn test_draft_replacement_follows_keyword_rules() {
    let client = signed_in_client();
    let (_, settings) = get_json(&client, "/api/topics/topic_1/settings");
    let mut draft = settings["draft"].clone();

    draft["primaryKeywords"] = json!(["aurora", "AURORA", "  "]);
    let response = client
        .put("/api/topics/topic_1/settings/topic-config")
        .json(&draft)
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let (_, settings) = get_json(&client, "/api/topics/topic_1/settings");
    assert_eq!(settings["dirty"], false);

    draft["primaryKeywords"] = json!(["  aurora  ", "oat latte"]);
    let response = client
        .put("/api/topics/topic_1/settings/topic-config")
        .json(&draft)
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["data"]["draft"]["primaryKeywords"], json!(["aurora", "oat latte"]));
}

#[test]
fn test_save_rejects_invalid_draft() {
    let client = signed_in_client();
    for platform in ["twitter", "facebook", "instagram", "tiktok", "news"] {
        client
            .post("/api/topics/topic_1/settings/topic-config/platforms")
            .json(&json!({ "platform": platform, "enabled": false }))
            .dispatch();
    }
    let response = client.post("/api/topics/topic_1/settings/topic-config/save").dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["error"], "Enable at least one platform");
}

#[test]
fn test_api_keys_and_webhooks() {
    let client = signed_in_client();
    let response = client
        .post("/api/topics/topic_1/settings/api-keys")
        .json(&json!({ "name": "CI export" }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let ack: Value = response.into_json().unwrap();
    let secret = ack["data"]["secret"].as_str().unwrap();
    assert!(secret.starts_with("sk_live_"));
    assert_eq!(ack["data"]["key"]["prefix"], &secret[..12]);

    let (_, settings) = get_json(&client, "/api/topics/topic_1/settings");
    assert_eq!(settings["apiKeys"].as_array().unwrap().len(), 3);

    let response = client.post("/api/topics/topic_1/settings/api-keys/key_1/toggle").dispatch();
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["data"]["status"], "revoked");

    let response = client
        .post("/api/topics/topic_1/settings/webhooks")
        .json(&json!({ "url": "ftp://example.com/hook" }))
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let response = client
        .post("/api/topics/topic_1/settings/webhooks")
        .json(&json!({ "url": "https://hooks.example.com/pulse" }))
        .dispatch();
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["data"]["events"][0], "alert.triggered");

    let response = client.delete("/api/topics/topic_1/settings/webhooks/wh_1").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let (_, settings) = get_json(&client, "/api/topics/topic_1/settings");
    assert_eq!(settings["webhooks"].as_array().unwrap().len(), 1);
}

#[test]
fn test_team_owner_is_protected() {
    let client = signed_in_client();
    let response = client.delete("/api/topics/topic_1/settings/team/member_1").dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let response = client
        .post("/api/topics/topic_1/settings/team")
        .json(&json!({ "email": "New.Person@Pulse.dev", "role": "viewer" }))
        .dispatch();
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["data"]["email"], "new.person@pulse.dev");
    assert_eq!(ack["data"]["status"], "pending");

    let response = client
        .post("/api/topics/topic_1/settings/team")
        .json(&json!({ "email": "new.person@pulse.dev", "role": "editor" }))
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[test]
fn test_generate_report() {
    let client = signed_in_client();
    let response = client
        .post("/api/topics/topic_1/reports/generate")
        .json(&json!({ "title": "June summary", "sections": ["overview", "sentiment"], "format": "pdf" }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    let ack: Value = response.into_json().unwrap();
    assert_eq!(ack["data"]["range"], "30d");
    assert_eq!(ack["data"]["status"], "ready");

    let (_, history) = get_json(&client, "/api/topics/topic_1/reports");
    assert_eq!(history[0]["title"], "June summary");
}

#[test]
fn test_malformed_body_is_json_error() {
    let client = signed_in_client();
    let response = client
        .post("/api/topics/topic_1/settings/alerts")
        .header(ContentType::JSON)
        .body("{\"name\": \"Spike\"}")
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().unwrap();
    assert!(body["error"].is_string());
}

#[test]
fn test_wizard_flow() {
    let client = signed_in_client();
    let response = client.post("/api/wizard/next").dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);

    client
        .post("/api/wizard/details")
        .json(&json!({ "name": "EV Charging", "description": "Charger reliability" }))
        .dispatch();
    let response = client.post("/api/wizard/next").dispatch();
    let view: Value = response.into_json().unwrap();
    assert_eq!(view["step"], 2);
    assert_eq!(view["canProceed"], false);

    client
        .post("/api/wizard/keywords")
        .json(&json!({ "list": "primary", "keyword": "ev charging" }))
        .dispatch();
    let response = client.post("/api/wizard/next").dispatch();
    let view: Value = response.into_json().unwrap();
    assert_eq!(view["step"], 3);

    let response = client.post("/api/wizard/submit").dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);

    client
        .post("/api/wizard/platforms")
        .json(&json!({ "platform": "twitter", "enabled": true }))
        .dispatch();
    let response = client.post("/api/wizard/submit").dispatch();
    assert_eq!(response.status(), Status::Ok);
    let ack: Value = response.into_json().unwrap();
    let id = ack["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(ack["data"]["platforms"], json!(["twitter"]));

    let (_, topics) = get_json(&client, "/api/topics");
    assert_eq!(topics.as_array().unwrap().len(), 4);
    let (status, _) = get_json(&client, &format!("/api/topics/{id}/overview"));
    assert_eq!(status, Status::Ok);

    let (_, wizard) = get_json(&client, "/api/wizard");
    assert_eq!(wizard["step"], 1);
}
