mod common;

use common::{client, post_form};
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;

fn browser() -> Client {
    let client = client();
    let (status, location) = post_form(&client, "/login", "email=ana%40pulse.dev&password=secret1");
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/projects"));
    client
}

fn page(client: &Client, uri: &str) -> (Status, String) {
    let response = client.get(uri.to_string()).dispatch();
    (response.status(), response.into_string().unwrap_or_default())
}

#[test]
fn test_pages_redirect_to_login() {
    let client = client();
    let response = client.get("/projects").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/login"));

    let response = client.get("/topics/topic_1/overview").dispatch();
    assert_eq!(response.headers().get_one("Location"), Some("/login"));
}

#[test]
fn test_login_page_renders() {
    let client = client();
    let (status, body) = page(&client, "/login");
    assert_eq!(status, Status::Ok);
    assert!(body.contains("Sign in to Pulse"));
}

#[test]
fn test_bad_login_shows_error() {
    let client = client();
    let (status, location) = post_form(&client, "/login", "email=nobody&password=secret1");
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/login"));
    let (_, body) = page(&client, "/login");
    assert!(body.contains("Enter a valid email address"));
}

#[test]
fn test_projects_after_login() {
    let client = browser();
    let (status, body) = page(&client, "/projects");
    assert_eq!(status, Status::Ok);
    assert!(body.contains("Welcome back, ana"));
    assert!(body.contains("Aurora Coffee"));
    assert!(body.contains("EcoCharge Launch"));

    let (_, body) = page(&client, "/projects?search=transit");
    assert!(body.contains("City Transit Fare Increase"));
    assert!(!body.contains("EcoCharge Launch"));

    // already signed in
    let response = client.get("/login").dispatch();
    assert_eq!(response.headers().get_one("Location"), Some("/projects"));
}

#[test]
fn test_unknown_topic_goes_back_to_projects() {
    let client = browser();
    let response = client.get("/topics/topic_404/overview").dispatch();
    assert_eq!(response.status(), Status::SeeOther);
    assert_eq!(response.headers().get_one("Location"), Some("/projects"));
    let (_, body) = page(&client, "/projects");
    assert!(body.contains("Topic not found: topic_404"));
}

#[test]
fn test_every_topic_page_renders() {
    let client = browser();
    let pages = [
        "overview",
        "trends",
        "trends?range=7d",
        "sentiment",
        "geo",
        "demographics",
        "influencers",
        "influencers?platform=twitter&min_followers=1000&bot_threshold=50",
        "mentions",
        "mentions?sentiment=negative&page=2&page_size=2",
        "comparison",
        "comparison?hidden=comp_brewline",
        "reports",
        "brand/overview",
        "brand/competitors",
        "brand/content",
        "settings/topic-config",
        "settings/team",
        "settings/notifications",
        "settings/api-keys",
    ];
    for name in pages {
        let (status, _) = page(&client, &format!("/topics/topic_1/{name}"));
        assert_eq!(status, Status::Ok, "{name} failed to render");
    }

    let response = client.get("/topics/topic_1").dispatch();
    assert_eq!(response.headers().get_one("Location"), Some("/topics/topic_1/overview"));
}

#[test]
fn test_invalid_trend_range_falls_back() {
    let client = browser();
    let (status, body) = page(&client, "/topics/topic_1/trends?range=5y");
    assert_eq!(status, Status::Ok);
    assert!(body.contains("toast-error"));
}

#[test]
fn test_topic_page_sets_active_project() {
    let client = browser();
    page(&client, "/topics/topic_2/sentiment");
    let (_, body) = page(&client, "/topics/topic_2/geo");
    assert!(body.contains("City Transit Fare Increase"));
}

#[test]
fn test_mention_actions_redirect_back() {
    let client = browser();
    let (status, location) = post_form(&client, "/topics/topic_1/mentions/m_002/handled", "");
    assert_eq!(status, Status::SeeOther);
    assert_eq!(location.as_deref(), Some("/topics/topic_1/mentions"));

    let (_, body) = page(&client, "/topics/topic_1/mentions");
    assert!(body.contains("Marked as handled"));

    post_form(&client, "/topics/topic_1/mentions/m_002/sentiment", "sentiment=positive");
    let (_, body) = page(&client, "/topics/topic_1/mentions");
    assert!(body.contains("Sentiment set to positive"));

    post_form(&client, "/topics/topic_1/mentions/m_404/flagged", "");
    let (_, body) = page(&client, "/topics/topic_1/mentions");
    assert!(body.contains("Mention not found: m_404"));
}

#[test]
fn test_export_download() {
    let client = browser();
    let response = client
        .get("/topics/topic_1/mentions/export.csv?platforms=twitter")
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::CSV));
    let body = response.into_string().unwrap();
    assert_eq!(body.lines().count(), 7);

    // one value per checked box, as the filter form submits them
    let response = client
        .get("/topics/topic_1/mentions/export.csv?platforms=twitter&platforms=news")
        .dispatch();
    assert_eq!(response.into_string().unwrap().lines().count(), 9);
}

#[test]
fn test_wizard_pages() {
    let client = browser();
    let (status, _) = page(&client, "/projects/new");
    assert_eq!(status, Status::Ok);

    post_form(&client, "/projects/new/details", "name=EV&description=");
    let (_, body) = page(&client, "/projects/new");
    assert!(body.contains("Topic name must be at least 3 characters"));

    post_form(&client, "/projects/new/details", "name=EV+Charging&description=Chargers");
    post_form(&client, "/projects/new/next", "");
    let (_, body) = page(&client, "/projects/new");
    assert!(body.contains("Add at least one primary keyword"));

    post_form(&client, "/projects/new/keywords", "list=primary&keyword=ev+charging");
    let (status, _) = post_form(&client, "/projects/new/next", "");
    assert_eq!(status, Status::SeeOther);

    let (_, location) = post_form(&client, "/projects/new/submit", "platforms=twitter&platforms=news");
    let location = location.unwrap();
    assert!(location.starts_with("/topics/topic_"));
    assert!(location.ends_with("/overview"));

    let (status, body) = page(&client, &location);
    assert_eq!(status, Status::Ok);
    assert!(body.contains("EV Charging"));
}

#[test]
fn test_settings_forms() {
    let client = browser();
    let (_, location) = post_form(
        &client,
        "/topics/topic_1/settings/topic-config/keywords",
        "list=secondary&keyword=oat+latte",
    );
    assert_eq!(location.as_deref(), Some("/topics/topic_1/settings/topic-config"));
    let (_, body) = page(&client, "/topics/topic_1/settings/topic-config");
    assert!(body.contains("oat latte"));

    post_form(&client, "/topics/topic_1/settings/team/member_1/remove", "");
    let (_, body) = page(&client, "/topics/topic_1/settings/team");
    assert!(body.contains("The owner cannot be removed"));

    post_form(&client, "/topics/topic_1/settings/api-keys", "name=Nightly+sync");
    let (_, body) = page(&client, "/topics/topic_1/settings/api-keys");
    assert!(body.contains("sk_live_"));
    assert!(body.contains("Nightly sync"));
}

#[test]
fn test_logout_clears_session() {
    let client = browser();
    let (_, location) = post_form(&client, "/logout", "");
    assert_eq!(location.as_deref(), Some("/login"));
    let response = client.get("/projects").dispatch();
    assert_eq!(response.headers().get_one("Location"), Some("/login"));
}
