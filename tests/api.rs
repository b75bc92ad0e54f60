use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Extension, Router,
};
use club_hub::{
    models::{Admin, PendingAdminRequest, User},
    store::{MemoryStore, SharedStore},
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn app() -> Router {
    let store = MemoryStore::new();
    store
        .insert_admin(Admin::from_request(PendingAdminRequest {
            account_ref: "A1".to_string(),
            club_name: "Robotics Club".to_string(),
            club_type: "technical".to_string(),
            logo: "https://cdn.example.com/robotics.png".to_string(),
            institute: "IIT".to_string(),
            email_id: "robotics@example.com".to_string(),
        }))
        .await;
    store
        .insert_user(User {
            clerk_id: "U1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            mobile_no: "9999999999".to_string(),
            institute: "IIT".to_string(),
        })
        .await;

    let store: SharedStore = Arc::new(store);
    club_hub::app().layer(Extension(store))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_raw(app, method, uri, body.map(|b| b.to_string())).await
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn assert_validation_envelope(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].is_string());
}

fn event_body(owner: &str) -> Value {
    json!({
        "ownerId": owner,
        "title": "RoboWars",
        "subtitle": "Battle of bots",
        "description": "Bring your bot",
        "date": "2026-11-02T10:00:00Z",
        "mode": "offline",
        "location": "Main Hall",
        "time": "10:00 AM",
        "fees": 100.0,
        "maxAllowedParticipants": 50,
        "noMaxParticipants": false,
        "coverImg": "https://cdn.example.com/cover.png",
        "detailImg": "https://cdn.example.com/detail.png",
        "supportFile": "https://cdn.example.com/rules.pdf",
        "visibility": true,
        "isAvailableToReg": true,
        "tags": ["robots"],
        "categories": ["technical"],
        "additionalInfo": "## Rules",
        "registeredUsers": ["U1", "U2"]
    })
}

#[tokio::test]
async fn signup_then_status_then_duplicate() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/admin/N1/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], 1);

    let signup = json!({
        "clerkId": "N1",
        "clubName": "Chess Club",
        "type": "cultural",
        "logo": "https://cdn.example.com/chess.png",
        "institute": "NIT",
        "emailId": "chess@example.com"
    });
    let (status, body) = send(&app, Method::POST, "/api/admin/signup", Some(signup.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["clubName"], "Chess Club");

    let (_, body) = send(&app, Method::GET, "/api/admin/N1/status", None).await;
    assert_eq!(body["data"]["status"], 2);
    let (_, body) = send(&app, Method::GET, "/api/admin/A1/status", None).await;
    assert_eq!(body["data"]["status"], 3);

    let (status, body) = send(&app, Method::POST, "/api/admin/signup", Some(signup)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn validation_errors_are_bad_requests() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/admin/signup",
        Some(json!({ "clerkId": "N1" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(&app, Method::GET, "/api/admin/undefined/status", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn event_lifecycle() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/api/event", Some(event_body("A1"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["_id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["ownerName"], "Robotics Club");
    assert_eq!(body["data"]["maxAllowedParticipants"], 50);

    let (status, body) = send(&app, Method::GET, &format!("/api/event/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["title"], "RoboWars");

    let (_, body) = send(&app, Method::GET, "/api/events/A1", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/event/{id}/registrations"),
        None,
    )
    .await;
    assert_eq!(body["data"]["eventName"], "RoboWars");
    assert_eq!(body["data"]["registrations"][0]["name"], "Ada");
    assert_eq!(body["data"]["registrations"][1]["message"], "User not found");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/event/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/event/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn event_for_unknown_owner_is_rejected() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/api/event", Some(event_body("ghost"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "owner_not_found");
    assert_eq!(body["message"], "Owner not found");
}

#[tokio::test]
async fn repeated_check_in_answers_300() {
    let app = app().await;
    let check_in = json!({ "eventId": "E1", "userId": "U1", "conf_number": "C1" });

    let (status, body) = send(&app, Method::POST, "/api/attendance", Some(check_in.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Attendance recorded successfully!");

    let (status, body) = send(&app, Method::POST, "/api/attendance", Some(check_in)).await;
    assert_eq!(status, StatusCode::MULTIPLE_CHOICES);
    assert_eq!(body["data"], "already_recorded");

    let (status, body) = send(&app, Method::GET, "/api/attendance/E1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Ada");
    assert_eq!(body["data"][0]["conf_number"], "C1");

    let (status, body) = send(&app, Method::GET, "/api/attendance/E2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Event not found");
}

#[tokio::test]
async fn member_roster_round_trip() {
    let app = app().await;

    for (member_type, name) in [("board", "Ada"), ("executive", "Linus")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/member",
            Some(json!({
                "_id": "ignored",
                "clerkId": "A1",
                "type": member_type,
                "name": name,
                "profilePhoto": "https://cdn.example.com/face.png"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/members/A1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["boardMembers"][0]["name"], "Ada");
    let member_id = body["data"]["executiveMembers"][0]["_id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_ne!(member_id, "ignored");

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/member",
        Some(json!({ "memberId": member_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/member",
        Some(json!({ "memberId": member_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn rejected_bodies_use_the_error_envelope() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/admin/A1",
        Some(json!({ "clubName": "X", "owner": "z" })),
    )
    .await;
    assert_validation_envelope(status, &body);

    let mut event = event_body("A1");
    event["fees"] = json!("free");
    let (status, body) = send(&app, Method::POST, "/api/event", Some(event)).await;
    assert_validation_envelope(status, &body);

    let (status, body) =
        send_raw(&app, Method::POST, "/api/attendance", Some("{".to_string())).await;
    assert_validation_envelope(status, &body);
}

#[tokio::test]
async fn admin_profile_can_be_fetched_edited_and_sent_back() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api/admin/A1", None).await;
    assert_eq!(status, StatusCode::OK);
    let mut profile = body["data"].clone();
    assert_eq!(profile["accountRef"], "A1");
    profile["bio"] = json!("We build robots");

    let (status, body) = send(&app, Method::PUT, "/api/admin/A1", Some(profile.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bio"], "We build robots");
    assert_eq!(body["data"]["clubName"], "Robotics Club");

    profile["accountRef"] = json!("B2");
    let (status, body) = send(&app, Method::PUT, "/api/admin/A1", Some(profile)).await;
    assert_validation_envelope(status, &body);
}

#[tokio::test]
async fn event_update_and_creator_listing() {
    let app = app().await;

    let (_, body) = send(&app, Method::POST, "/api/event", Some(event_body("A1"))).await;
    let id = body["data"]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/event/{id}"),
        Some(json!({ "title": "RoboWars 2", "noMaxParticipants": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "RoboWars 2");
    assert_eq!(body["data"]["subtitle"], "Battle of bots");
    assert_eq!(body["data"]["maxAllowedParticipants"], -1);
    assert_eq!(body["data"]["noMaxParticipants"], true);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/event/{id}"),
        Some(json!({ "owner": "A2" })),
    )
    .await;
    assert_validation_envelope(status, &body);

    let (status, body) = send(&app, Method::PUT, "/api/event/missing", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = send(&app, Method::GET, "/api/creator/A1/events", None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "RoboWars 2");

    let (_, body) = send(&app, Method::GET, "/api/creator/A9/events", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn member_update_keeps_the_owner() {
    let app = app().await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/member",
        Some(json!({
            "clerkId": "A1",
            "type": "executive",
            "name": "Ada",
            "profilePhoto": "https://cdn.example.com/face.png"
        })),
    )
    .await;
    let mut member = body["data"].clone();
    member["__v"] = json!(0);
    member["type"] = json!("board");

    let (status, body) = send(&app, Method::PUT, "/api/member", Some(member.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["type"], "board");
    assert_eq!(body["data"]["name"], "Ada");

    member["clerkId"] = json!("B2");
    let (status, body) = send(&app, Method::PUT, "/api/member", Some(member)).await;
    assert_validation_envelope(status, &body);

    let (_, body) = send(&app, Method::GET, "/api/members/A1", None).await;
    assert_eq!(body["data"]["boardMembers"].as_array().unwrap().len(), 1);
}
