use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use rocket::serde::json::{json, Value};
use rocket::{Build, Rocket};

/// Dashboard with no artificial latency
pub fn rocket() -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("mock_latency_ms", 0))
        .merge(("template_dir", concat!(env!("CARGO_MANIFEST_DIR"), "/templates")))
        .merge(("log_level", "off"));
    pulse_ui::build(figment).expect("dashboard assembles")
}

/// Cookie-tracking client, like a browser
pub fn client() -> Client {
    Client::tracked(rocket()).expect("valid rocket instance")
}

/// Client already signed in through the JSON API
#[allow(dead_code)]
pub fn signed_in_client() -> Client {
    let client = client();
    {
        let response = client
            .post("/api/auth/login")
            .json(&json!({ "email": "ana@pulse.dev", "password": "secret1" }))
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
    }
    client
}

#[allow(dead_code)]
pub fn post_form(client: &Client, uri: &str, body: &str) -> (Status, Option<String>) {
    let response = client
        .post(uri.to_string())
        .header(ContentType::Form)
        .body(body.to_string())
        .dispatch();
    let location = response.headers().get_one("Location").map(str::to_string);
    (response.status(), location)
}

#[allow(dead_code)]
pub fn get_json(client: &Client, uri: &str) -> (Status, Value) {
    let response = client.get(uri.to_string()).dispatch();
    let status = response.status();
    (status, response.into_json::<Value>().unwrap_or(Value::Null))
}
