use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
};
use serde_json::{Value, json};
use std::collections::HashMap;

use mockup_clients::{ActiveCampaignClient, ActiveCampaignConfig, FieldType};
use mockup_core::{CrmClient, CrmError};
use mockup_model::LeadFields;

const TOKEN: &str = "secret";

#[derive(Default)]
struct Account {
    log: Vec<String>,
    contacts: Vec<Value>,
    fields: Vec<Value>,
    values: Vec<Value>,
    lists: Vec<Value>,
    subscriptions: Vec<(String, String)>,
    next_id: u32,
}

impl Account {
    fn id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }
}

type Shared = Arc<Mutex<Account>>;
type Reply = Result<Json<Value>, StatusCode>;

fn authorize(headers: &HeaderMap) -> Result<(), StatusCode> {
    match headers.get("Api-Token").and_then(|v| v.to_str().ok()) {
        Some(TOKEN) => Ok(()),
        _ => Err(StatusCode::FORBIDDEN),
    }
}

async fn find_contacts(
    State(s): State<Shared>,
    headers: HeaderMap,
    Query(q): Query<HashMap<String, String>>,
) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push("GET contacts".into());
    let email = q.get("email").cloned().unwrap_or_default();
    let found: Vec<Value> = acc.contacts.iter().filter(|c| c["email"] == email.as_str()).cloned().collect();
    Ok(Json(json!({ "contacts": found, "meta": { "total": found.len().to_string() } })))
}

async fn create_contact(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push("POST contacts".into());
    let mut contact = body["contact"].clone();
    contact["id"] = json!(acc.id());
    acc.contacts.push(contact.clone());
    Ok(Json(json!({ "contact": contact })))
}

async fn update_contact(
    State(s): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push(format!("PUT contacts/{id}"));
    let contact = acc
        .contacts
        .iter_mut()
        .find(|c| c["id"] == id.as_str())
        .ok_or(StatusCode::NOT_FOUND)?;
    for (k, v) in body["contact"].as_object().cloned().unwrap_or_default() {
        contact[k] = v;
    }
    Ok(Json(json!({ "contact": contact.clone() })))
}

async fn list_fields(State(s): State<Shared>, headers: HeaderMap) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push("GET fields".into());
    Ok(Json(json!({ "fields": acc.fields })))
}

async fn create_field(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push(format!("POST fields {}", body["field"]["type"].as_str().unwrap_or("")));
    let mut field = body["field"].clone();
    field["id"] = json!(acc.id());
    acc.fields.push(field.clone());
    Ok(Json(json!({ "field": field })))
}

async fn contact_values(State(s): State<Shared>, headers: HeaderMap, Path(id): Path<String>) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push("GET fieldValues".into());
    let values: Vec<Value> = acc.values.iter().filter(|v| v["contact"] == id.as_str()).cloned().collect();
    Ok(Json(json!({ "fieldValues": values })))
}

async fn create_value(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push("POST fieldValues".into());
    let mut value = body["fieldValue"].clone();
    value["id"] = json!(acc.id());
    acc.values.push(value.clone());
    Ok(Json(json!({ "fieldValue": value })))
}

async fn update_value(
    State(s): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push("PUT fieldValues".into());
    let value = acc
        .values
        .iter_mut()
        .find(|v| v["id"] == id.as_str())
        .ok_or(StatusCode::NOT_FOUND)?;
    value["value"] = body["fieldValue"]["value"].clone();
    Ok(Json(json!({ "fieldValue": value.clone() })))
}

async fn list_lists(State(s): State<Shared>, headers: HeaderMap) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push("GET lists".into());
    Ok(Json(json!({ "lists": acc.lists })))
}

async fn create_list(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push(format!("POST lists {}", body["list"]["stringid"].as_str().unwrap_or("")));
    let mut list = body["list"].clone();
    list["id"] = json!(acc.id());
    acc.lists.push(list.clone());
    Ok(Json(json!({ "list": list })))
}

async fn subscribe(State(s): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    authorize(&headers)?;
    let mut acc = s.lock().unwrap();
    acc.log.push("POST contactLists".into());
    let sub = &body["contactList"];
    let pair = (
        sub["contact"].as_str().unwrap_or_default().to_string(),
        sub["list"].as_str().unwrap_or_default().to_string(),
    );
    acc.subscriptions.push(pair);
    Ok(Json(json!({ "contactList": sub })))
}

async fn me(headers: HeaderMap) -> Reply {
    authorize(&headers)?;
    Ok(Json(json!({ "user": { "id": "1" } })))
}

async fn spawn_account() -> (String, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/api/3/users/me", get(me))
        .route("/api/3/contacts", get(find_contacts).post(create_contact))
        .route("/api/3/contacts/{id}", put(update_contact))
        .route("/api/3/contacts/{id}/fieldValues", get(contact_values))
        .route("/api/3/fields", get(list_fields).post(create_field))
        .route("/api/3/fieldValues", post(create_value))
        .route("/api/3/fieldValues/{id}", put(update_value))
        .route("/api/3/lists", get(list_lists).post(create_list))
        .route("/api/3/contactLists", post(subscribe))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), state)
}

fn client(base: &str, token: &str) -> ActiveCampaignClient {
    ActiveCampaignClient::new(ActiveCampaignConfig::new(base, token)).unwrap()
}

#[tokio::test]
async fn new_lead_is_created_tagged_and_subscribed() {
    let (base, state) = spawn_account().await;
    let crm = client(&base, TOKEN);
    let lead = LeadFields::new("ana@example.com")
        .with_name("Ana Maria Souza")
        .with_phone("+55 11 90000-0000")
        .with_segment("Varejo");

    let id = crm.sync_lead(&lead).await.unwrap();

    let acc = state.lock().unwrap();
    assert_eq!(acc.contacts.len(), 1);
    assert_eq!(acc.contacts[0]["id"], id.as_str());
    assert_eq!(acc.contacts[0]["firstName"], "Ana");
    assert_eq!(acc.contacts[0]["lastName"], "Maria Souza");
    assert_eq!(acc.fields[0]["title"], "Segmento de Negócio");
    assert_eq!(acc.values[0]["value"], "Varejo");
    assert_eq!(acc.lists[0]["name"], "Mockup Generator");
    assert_eq!(acc.subscriptions, vec![(id.clone(), acc.lists[0]["id"].as_str().unwrap().to_string())]);
    assert!(acc.log.contains(&"POST fields DROPDOWN".to_string()));
    assert!(acc.log.contains(&"POST lists mockup-generator".to_string()));
}

#[tokio::test]
async fn second_sync_updates_and_reuses_field_and_list() {
    let (base, state) = spawn_account().await;
    let crm = client(&base, TOKEN);
    let lead = LeadFields::new("bo@example.com").with_name("Bo");

    let first = crm.sync_lead_with_mockup(&lead, "https://b/mockups/1.png").await.unwrap();
    let second = crm.sync_lead_with_mockup(&lead, "https://b/mockups/2.png").await.unwrap();

    assert_eq!(first, second);
    let acc = state.lock().unwrap();
    assert_eq!(acc.contacts.len(), 1);
    assert_eq!(acc.fields.len(), 1);
    assert_eq!(acc.lists.len(), 1);
    assert_eq!(acc.values.len(), 1);
    assert_eq!(acc.values[0]["value"], "https://b/mockups/2.png");
    assert!(acc.log.contains(&format!("PUT contacts/{first}")));
    assert!(acc.log.contains(&"PUT fieldValues".to_string()));
}

#[tokio::test]
async fn field_lookup_ignores_case() {
    let (base, state) = spawn_account().await;
    state.lock().unwrap().fields.push(json!({ "id": "99", "title": "MOCKUP_URL", "type": "TEXT" }));
    let crm = client(&base, TOKEN);

    let field = crm.find_or_create_field("mockup_url", FieldType::Text).await.unwrap();
    assert_eq!(field.id, "99");
    assert_eq!(state.lock().unwrap().fields.len(), 1);
}

#[tokio::test]
async fn updates_report_unknown_contacts() {
    let (base, state) = spawn_account().await;
    let crm = client(&base, TOKEN);

    assert!(!crm.update_logo_url("ghost@example.com", "https://cdn/l.png").await.unwrap());
    assert!(state.lock().unwrap().values.is_empty());

    crm.sync_lead(&LeadFields::new("ghost@example.com")).await.unwrap();
    assert!(crm.update_logo_url("ghost@example.com", "https://cdn/l.png").await.unwrap());
    assert!(crm.update_mockup_url("ghost@example.com", "https://b/mockups/g.png").await.unwrap());

    let acc = state.lock().unwrap();
    let titles: Vec<&str> = acc.fields.iter().filter_map(|f| f["title"].as_str()).collect();
    assert_eq!(titles, vec!["mockup_logotipo", "mockup_url"]);
}

#[tokio::test]
async fn bad_token_is_a_final_status_error() {
    let (base, _) = spawn_account().await;
    let crm = client(&base, "wrong");

    assert!(crm.verify_credentials().await.is_err());
    let err = crm.sync_lead(&LeadFields::new("a@b.co")).await.unwrap_err();
    assert!(matches!(err, CrmError::Status { status: 403, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn invalid_lead_never_reaches_the_api() {
    let (base, state) = spawn_account().await;
    let crm = client(&base, TOKEN);

    let err = crm.sync_lead(&LeadFields::new("")).await.unwrap_err();
    assert!(matches!(err, CrmError::InvalidLead(_)));
    assert!(state.lock().unwrap().log.is_empty());
}

#[tokio::test]
async fn unreachable_account_is_retryable() {
    let crm = client("http://127.0.0.1:9", TOKEN);
    let err = crm.find_contact("a@b.co").await.unwrap_err();
    assert!(matches!(err, CrmError::Transport(_)));
    assert!(err.is_retryable());
}
