use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use taxi_dispatch::config::EnvironmentConfig;
use taxi_dispatch::models::{Address, Role};
use taxi_dispatch::repositories::MemoryRideStore;
use taxi_dispatch::utils::jwt::generate_token;
use taxi_dispatch::{create_router, AppState};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    state: AppState,
    addresses: Vec<Address>,
}

impl TestApp {
    fn new(n: usize) -> Self {
        let config = EnvironmentConfig::from_lookup(|key| match key {
            "JWT_SECRET" => Some("test-secret".to_string()),
            _ => None,
        })
        .unwrap();

        let store = MemoryRideStore::new();
        let addresses: Vec<Address> = (0..n)
            .map(|i| Address::new("Москва", "Арбат", "Арбат", &format!("{}", 10 + i)))
            .collect();
        for address in &addresses {
            store.insert_address(address.clone()).unwrap();
        }

        let state = AppState::new(config, Arc::new(store));
        Self {
            router: create_router(state.clone()),
            state,
            addresses,
        }
    }

    fn token(&self, user_id: Uuid, role: Role) -> String {
        generate_token(user_id, role, &self.state.jwt).unwrap()
    }

    fn address_ids(&self) -> Vec<Uuid> {
        self.addresses.iter().map(|a| a.id).collect()
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }
}

fn decimal(value: &Value) -> f64 {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(0);
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ride_flow_over_http() {
    let app = TestApp::new(2);
    let consumer = Uuid::new_v4();
    let driver = Uuid::new_v4();
    let consumer_token = app.token(consumer, Role::Consumer);
    let driver_token = app.token(driver, Role::Driver);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/rides",
            Some(&consumer_token),
            Some(json!({ "addresses": app.address_ids() })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let ride = &body["data"];
    assert_eq!(ride["status"], "Searching driver");
    assert_eq!(ride["consumer"], consumer.to_string());
    assert_eq!(decimal(&ride["price"]), 1337.0);
    assert_eq!(ride["addresses"][0]["order"], 0);
    assert_eq!(ride["addresses"][1]["order"], 1);
    assert_eq!(ride["addresses"][0]["full_address"], "Москва Арбат Арбат 10");
    let ride_id = ride["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(Method::GET, "/api/rides/available", Some(&driver_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let accept = format!("/api/rides/{}/accept", ride_id);
    let (status, body) = app.call(Method::POST, &accept, Some(&driver_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Waiting driver");

    let (status, _) = app
        .call(Method::POST, &accept, Some(&app.token(Uuid::new_v4(), Role::Driver)), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let complete = format!("/api/rides/{}/complete_address", ride_id);
    let (status, body) = app.call(Method::POST, &complete, Some(&driver_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ride"]["status"], "In progress");
    assert_eq!(body["data"]["ride_closed"], false);

    let (status, body) = app.call(Method::POST, &complete, Some(&driver_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ride"]["status"], "Completed");
    assert_eq!(body["data"]["ride_closed"], true);

    let (status, body) = app.call(Method::POST, &complete, Some(&driver_token), None).await;
    assert_eq!(status, StatusCode::ALREADY_REPORTED);
    assert!(body["data"]["completed"].is_null());

    let (status, _) = app
        .call(Method::GET, "/api/rides/current", Some(&consumer_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_ride_errors() {
    let app = TestApp::new(2);
    let consumer_token = app.token(Uuid::new_v4(), Role::Consumer);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/rides",
            Some(&consumer_token),
            Some(json!({ "addresses": [app.addresses[0].id] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/rides",
            Some(&consumer_token),
            Some(json!({ "addresses": [app.addresses[0].id, app.addresses[0].id] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/rides",
            None,
            Some(json!({ "consumer": Uuid::new_v4(), "addresses": app.address_ids() })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let driver_token = app.token(Uuid::new_v4(), Role::Driver);
    let (status, _) = app
        .call(
            Method::POST,
            "/api/rides",
            Some(&driver_token),
            Some(json!({ "consumer": Uuid::new_v4(), "addresses": app.address_ids() })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/rides",
            Some(&consumer_token),
            Some(json!({ "consumer": Uuid::new_v4(), "addresses": app.address_ids() })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::GET, "/api/rides/current", Some(&consumer_token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::new(0);

    let (status, _) = app.call(Method::GET, "/api/rides/current", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::GET, "/api/rides/current", Some("not-a-token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let consumer_token = app.token(Uuid::new_v4(), Role::Consumer);
    let (status, _) = app
        .call(Method::GET, "/api/rides/available", Some(&consumer_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_queue_editing_over_http() {
    let app = TestApp::new(3);
    let consumer = Uuid::new_v4();
    let consumer_token = app.token(consumer, Role::Consumer);
    let ids = app.address_ids();

    let (_, body) = app
        .call(
            Method::POST,
            "/api/rides",
            Some(&consumer_token),
            Some(json!({ "addresses": [ids[0], ids[1]] })),
        )
        .await;
    let ride_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/rides/{}/addresses", ride_id),
            Some(&consumer_token),
            Some(json!({ "address": ids[2] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["addresses"][2]["order"], 2);

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/rides/{}/addresses", ride_id),
            Some(&consumer_token),
            Some(json!({ "address": ids[0] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let middle = body["data"]["addresses"][1]["id"].as_str().unwrap().to_string();
    let stranger = app.token(Uuid::new_v4(), Role::Consumer);
    let (status, _) = app
        .call(Method::DELETE, &format!("/api/stops/{}", middle), Some(&stranger), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(Method::DELETE, &format!("/api/stops/{}", middle), Some(&consumer_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let remaining: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["order"].as_i64().unwrap())
        .collect();
    assert_eq!(remaining, vec![0, 1]);
    assert_eq!(body["data"][0]["full_address"], app.addresses[0].full_address());
    assert_eq!(body["data"][1]["full_address"], app.addresses[2].full_address());

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/rides/{}/addresses/pending", ride_id),
            Some(&consumer_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let pending: Vec<String> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["address"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(pending, vec![ids[0].to_string(), ids[2].to_string()]);
    assert_eq!(body["data"][0]["full_address"], "Москва Арбат Арбат 10");
    assert_eq!(body["data"][1]["name"], "12");
}

#[tokio::test]
async fn test_addresses_over_http() {
    let app = TestApp::new(0);
    let consumer_token = app.token(Uuid::new_v4(), Role::Consumer);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/addresses",
            None,
            Some(json!({ "city": "Москва", "district": "Пресненский", "street": "Тверская", "name": "1" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut ids = Vec::new();
    for name in ["7", "3"] {
        let (status, body) = app
            .call(
                Method::POST,
                "/api/addresses",
                Some(&consumer_token),
                Some(json!({ "city": "Москва", "district": "Пресненский", "street": "Тверская", "name": name })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body["data"]["full_address"],
            format!("Москва Пресненский Тверская {}", name)
        );
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, _) = app
        .call(
            Method::POST,
            "/api/addresses",
            Some(&consumer_token),
            Some(json!({ "city": "Москва", "district": "Пресненский", "street": "Тверская", "name": "7" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/addresses",
            Some(&consumer_token),
            Some(json!({ "city": "Москва", "district": "", "street": "Тверская", "name": "12345678901" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.call(Method::GET, "/api/addresses", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["3", "7"]);

    let (status, body) = app
        .call(Method::GET, &format!("/api/addresses/{}", ids[0]), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "7");

    let (status, _) = app
        .call(Method::GET, &format!("/api/addresses/{}", Uuid::new_v4()), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/rides",
            Some(&consumer_token),
            Some(json!({ "addresses": ids })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["addresses"][0]["full_address"], "Москва Пресненский Тверская 7");
}

#[tokio::test]
async fn test_rating_over_http() {
    let app = TestApp::new(2);
    let consumer = Uuid::new_v4();
    let driver = Uuid::new_v4();
    let consumer_token = app.token(consumer, Role::Consumer);
    let driver_token = app.token(driver, Role::Driver);

    let (_, body) = app
        .call(
            Method::POST,
            "/api/rides",
            Some(&consumer_token),
            Some(json!({ "addresses": app.address_ids() })),
        )
        .await;
    let ride_id = body["data"]["id"].as_str().unwrap().to_string();
    app.call(Method::POST, &format!("/api/rides/{}/accept", ride_id), Some(&driver_token), None)
        .await;

    let rate = format!("/api/rides/{}/rate", ride_id);
    let (status, _) = app
        .call(Method::POST, &rate, Some(&consumer_token), Some(json!({ "rate": 7, "comment": "!" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .call(
            Method::POST,
            &rate,
            Some(&consumer_token),
            Some(json!({ "rate": 4, "comment": "Smooth ride" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["target"], driver.to_string());

    let (status, body) = app
        .call(Method::GET, &format!("/api/users/{}/rating?role=driver", driver), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decimal(&body["data"]["average_rating"]), 4.0);
}
