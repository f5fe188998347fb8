//! `openhab_link` against a mocked openHAB REST API.

use openhab_provider::testing::{
    assert_no_errors, assert_plan_changes_attribute, assert_plan_replaces, ProviderTester,
};
use openhab_provider::{OpenhabProvider, ProviderError};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{basic_auth, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "oh.token";
const CHANNEL: &str = "hue:0210:bridge:bulb1:color";
const LINK_PATH: &str = "/rest/links/Kitchen_Light/hue:0210:bridge:bulb1:color";

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
        "item_name": "Kitchen_Light",
        "channel_uid": CHANNEL,
        "configuration": {"profile": "system:offset", "offset": "2"},
    })
}

fn server_link() -> Value {
    json!({
        "itemName": "Kitchen_Light",
        "channelUID": CHANNEL,
        "configuration": {"profile": "system:offset", "offset": 2},
        "editable": true,
    })
}

#[tokio::test]
async fn test_create_link() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(LINK_PATH))
        .and(basic_auth(TOKEN, ""))
        .and(body_json(json!({
            "itemName": "Kitchen_Light",
            "channelUID": CHANNEL,
            "configuration": {"profile": "system:offset", "offset": "2"},
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LINK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_link()))
        .expect(1)
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let created = assert_ok!(tester.lifecycle_create("openhab_link", config()).await);

    assert_no_errors(&created.diagnostics);
    assert_eq!(
        created.state["id"],
        json!("Kitchen_Light-hue:0210:bridge:bulb1:color")
    );
    // numeric configuration values come back as strings
    assert_eq!(created.state["configuration"]["offset"], json!("2"));
}

#[tokio::test]
async fn test_create_link_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(LINK_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("Link is not editable"))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let plan = assert_ok!(tester.plan_create("openhab_link", config()).await);
    let err = assert_err!(tester.create("openhab_link", plan.planned_state).await);
    assert!(matches!(err, ProviderError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_changing_configuration_replaces() {
    let server = MockServer::start().await;
    let tester = configured(&server).await;
    let prior = assert_ok!(tester.plan_create("openhab_link", config()).await).planned_state;

    let mut config = config();
    config["configuration"] = json!({"profile": "system:follow"});
    let plan = assert_ok!(tester.plan_update("openhab_link", prior.clone(), config).await);
    assert_plan_replaces(&plan);
    assert_plan_changes_attribute(&plan, "configuration");

    let err = assert_err!(tester.update("openhab_link", prior, plan.planned_state).await);
    assert!(matches!(err, ProviderError::Unimplemented(_)));
}

#[tokio::test]
async fn test_read_and_delete_missing_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LINK_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(LINK_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let state = assert_ok!(tester.plan_create("openhab_link", config()).await).planned_state;

    assert_eq!(assert_ok!(tester.read("openhab_link", state.clone()).await), None);
    assert_ok!(tester.delete("openhab_link", state).await);
}

#[tokio::test]
async fn test_import_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LINK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(server_link()))
        .expect(1)
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let imported = assert_ok!(
        tester
            .import_resource("openhab_link", "Kitchen_Light-hue:0210:bridge:bulb1:color")
            .await
    );
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].state["item_name"], json!("Kitchen_Light"));
    assert_eq!(imported[0].state["channel_uid"], json!(CHANNEL));
    assert_eq!(imported[0].state["configuration"]["profile"], json!("system:offset"));

    let err = assert_err!(tester.import_resource("openhab_link", "Kitchen_Light").await);
    assert!(matches!(err, ProviderError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_import_missing_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tester = configured(&server).await;
    let err = assert_err!(
        tester
            .import_resource("openhab_link", "Kitchen_Light-hue:0210:bridge:bulb1:color")
            .await
    );
    assert!(matches!(err, ProviderError::NotFound(_)));
}
