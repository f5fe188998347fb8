//! `openhab_item` against a mocked openHAB REST API.

use openhab_provider::testing::{
    assert_no_errors, assert_plan_creates, assert_plan_replaces, assert_warning_contains,
    ProviderTester, TestError,
};
use openhab_provider::{OpenhabProvider, ProviderError};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{basic_auth, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "oh.token";

async fn configured(server: &MockServer) -> ProviderTester<OpenhabProvider> {
    let tester = ProviderTester::new(OpenhabProvider::new("test"));
    assert_ok!(
        tester
            .configure(json!({
                "endpoint": format!("{}/rest", server.uri()),
                "api_token": TOKEN,
            }))
            .await
    );
    tester
}

fn config() -> Value {
    json!({
        "name": "Kitchen_Light",
        "type": "Switch",
        "label": "Kitchen Light",
        "category": null,
        "tags": null,
        "group_names": ["Kitchen"],
    })
}

fn server_item() -> Value {
    json!({
        "type": "Switch",
        "name": "Kitchen_Light",
        "label": "Kitchen Light",
        "tags": [],
        "groupNames": ["Kitchen"],
        "link": "http://openhab/rest/items/Kitchen_Light",
        "state": "NULL",
        "editable": true,
    })
}

#[tokio::test]
async fn test_create_item() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rest/items/Kitchen_Light"))
        .and(basic_auth(TOKEN, ""))
        .and(header("accept", "application/json"))
        .and(body_partial_json(json!({
            "type": "Switch",
            "name": "Kitchen_Light",
            "groupNames": ["Kitchen"],
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(server_item()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/items/Kitchen_Light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_item()))
        .expect(1)
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let created = assert_ok!(tester.lifecycle_create("openhab_item", config()).await);

    assert_no_errors(&created.diagnostics);
    assert_eq!(created.state["id"], json!("Kitchen_Light"));
    assert_eq!(created.state["group_names"], json!(["Kitchen"]));
    // left unset in the configuration, reported empty by the server
    assert_eq!(created.state["tags"], Value::Null);
    assert_eq!(created.state["category"], Value::Null);
}

#[tokio::test]
async fn test_create_existing_item_warns() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rest/items/Kitchen_Light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_item()))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let plan = assert_ok!(tester.plan_create("openhab_item", config()).await);
    assert_plan_creates(&plan);

    let created = assert_ok!(tester.create("openhab_item", plan.planned_state).await);
    assert_warning_contains(&created.diagnostics, "Create Item Warning");
    assert_eq!(
        created.diagnostics[0].detail.as_deref(),
        Some("Item Kitchen_Light was not created, but updated")
    );
}

#[tokio::test]
async fn test_update_missing_item_warns() {
    let server = MockServer::start().await;
    let mut relabeled = server_item();
    relabeled["label"] = json!("Kitchen Ceiling");
    Mock::given(method("PUT"))
        .and(path("/rest/items/Kitchen_Light"))
        .and(body_partial_json(json!({"label": "Kitchen Ceiling"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(relabeled.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/items/Kitchen_Light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(relabeled))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let prior = assert_ok!(tester.plan_create("openhab_item", config()).await).planned_state;

    let mut config = config();
    config["label"] = json!("Kitchen Ceiling");
    let updated = assert_ok!(tester.lifecycle_update("openhab_item", prior, config).await);

    assert_eq!(updated.state["label"], json!("Kitchen Ceiling"));
    assert_warning_contains(&updated.diagnostics, "Update Item Warning");
}

#[tokio::test]
async fn test_rename_requires_replace() {
    let server = MockServer::start().await;
    let tester = configured(&server).await;
    let prior = assert_ok!(tester.plan_create("openhab_item", config()).await).planned_state;

    let mut renamed = config();
    renamed["name"] = json!("Kitchen_Ceiling");
    let plan = assert_ok!(tester.plan_update("openhab_item", prior, renamed).await);
    assert_plan_replaces(&plan);
    assert_eq!(plan.planned_state["id"], json!("Kitchen_Ceiling"));
}

#[tokio::test]
async fn test_read_missing_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/items/Kitchen_Light"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let state = assert_ok!(tester.plan_create("openhab_item", config()).await).planned_state;
    assert_eq!(assert_ok!(tester.read("openhab_item", state).await), None);
}

#[tokio::test]
async fn test_lifecycle_create_reports_vanished_item() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201).set_body_json(server_item()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let err = assert_err!(tester.lifecycle_create("openhab_item", config()).await);
    assert!(matches!(err, TestError::Gone(_)));
}

#[tokio::test]
async fn test_delete_item() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/items/Kitchen_Light"))
        .and(basic_auth(TOKEN, ""))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let state = assert_ok!(tester.plan_create("openhab_item", config()).await).planned_state;
    assert_ok!(tester.lifecycle_delete("openhab_item", state).await);
}

#[tokio::test]
async fn test_delete_missing_item_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/items/Kitchen_Light"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let state = assert_ok!(tester.plan_create("openhab_item", config()).await).planned_state;
    assert_ok!(tester.delete("openhab_item", state).await);
}

#[tokio::test]
async fn test_api_errors_are_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(405).set_body_string("Item not editable"))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let state = assert_ok!(tester.plan_create("openhab_item", config()).await).planned_state;

    let err = assert_err!(tester.create("openhab_item", state.clone()).await);
    assert!(matches!(err, ProviderError::PermissionDenied(_)));

    let err = assert_err!(tester.delete("openhab_item", state).await);
    assert!(matches!(err, ProviderError::FailedPrecondition(_)));
    assert_eq!(err.message(), "Item not editable");
}

#[tokio::test]
async fn test_import_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/items/Kitchen_Light"))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_item()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/items/Attic_Light"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let imported = assert_ok!(tester.import_resource("openhab_item", "Kitchen_Light").await);
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].resource_type, "openhab_item");
    assert_eq!(imported[0].state["id"], json!("Kitchen_Light"));
    assert_eq!(imported[0].state["type"], json!("Switch"));
    assert_eq!(imported[0].state["tags"], Value::Null);

    let err = assert_err!(tester.import_resource("openhab_item", "Attic_Light").await);
    assert!(matches!(err, ProviderError::NotFound(_)));

    let err = assert_err!(tester.import_resource("openhab_item", "Attic Light").await);
    assert!(matches!(err, ProviderError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_operations_before_configure() {
    let tester = ProviderTester::new(OpenhabProvider::new("test"));
    let err = assert_err!(tester.create("openhab_item", config()).await);
    assert!(matches!(err, ProviderError::Configuration(_)));
}

#[tokio::test]
async fn test_configure_twice() {
    let server = MockServer::start().await;
    let tester = configured(&server).await;

    let err = assert_err!(
        tester
            .configure(json!({"endpoint": server.uri(), "api_token": TOKEN}))
            .await
    );
    assert!(err.to_string().contains("Provider already configured"));
}
