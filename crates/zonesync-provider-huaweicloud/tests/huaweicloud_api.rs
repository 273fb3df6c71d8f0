//! Huawei Cloud provider against a mock DNS endpoint

use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zonesync_core::Error;
use zonesync_core::config::{Credentials, ProviderConfig};
use zonesync_core::traits::{DnsProvider, NewRecordSet, RecordSetUpdate, ZoneId};
use zonesync_provider_huaweicloud::HuaweiCloudProvider;

async fn setup() -> (MockServer, HuaweiCloudProvider) {
    let server = MockServer::start().await;

    let mut config = ProviderConfig::new(Credentials::new("test-ak", "test-sk"), "cn-north-4");
    config.endpoint = Some(server.uri());
    let provider = HuaweiCloudProvider::new(&config).expect("provider builds");

    (server, provider)
}

fn recordset(id: &str, name: &str, line: &str, records: &[&str]) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "type": "A",
        "records": records,
        "ttl": 300,
        "line": line,
        "status": "ACTIVE"
    })
}

#[tokio::test]
async fn list_zones_sends_signed_request_and_keeps_exact_match() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/zones"))
        .and(query_param("name", "example.com."))
        .and(query_param("type", "public"))
        .and(header_exists("X-Sdk-Date"))
        .and(header_exists("Authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [
                {"id": "zone-sub", "name": "sub.example.com."},
                {"id": "zone-main", "name": "example.com."}
            ],
            "metadata": {"total_count": 2}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let zones = provider.list_zones("example.com.").await.unwrap();

    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0].id, ZoneId::new("zone-main"));

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("Authorization").unwrap().to_str().unwrap();
    assert!(auth.starts_with("SDK-HMAC-SHA256 Access=test-ak, SignedHeaders=host;x-sdk-date, Signature="));
}

#[tokio::test]
async fn list_zones_empty_is_not_an_error() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [],
            "metadata": {"total_count": 0}
        })))
        .mount(&server)
        .await;

    assert!(provider.list_zones("missing.com.").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_zones_drops_similarly_named_zones() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/zones"))
        .and(query_param("name", "example.com."))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zones": [{"id": "zone-other", "name": "myexample.com."}],
            "metadata": {"total_count": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider.list_zones("example.com.").await.unwrap().is_empty());
}

#[tokio::test]
async fn list_record_sets_pages_until_total_count() {
    let (server, provider) = setup().await;

    let first_page: Vec<_> = (0..500)
        .map(|i| recordset(&format!("rs-{}", i), "www.example.com.", "default", &["1.1.1.1"]))
        .collect();

    Mock::given(method("GET"))
        .and(path("/v2.1/zones/zone-1/recordsets"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordsets": first_page,
            "metadata": {"total_count": 501}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2.1/zones/zone-1/recordsets"))
        .and(query_param("offset", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordsets": [recordset("rs-last", "api.example.com.", "Dianxin", &["2.2.2.2"])],
            "metadata": {"total_count": 501}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let records = provider.list_record_sets(&ZoneId::new("zone-1")).await.unwrap();

    assert_eq!(records.len(), 501);
    assert_eq!(records[0].id, "rs-0");
    assert_eq!(records[500].id, "rs-last");
    assert_eq!(records[500].effective_line(), "Dianxin");
}

#[tokio::test]
async fn create_record_set_posts_line_and_ttl() {
    let (server, provider) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v2.1/zones/zone-1/recordsets"))
        .and(header("Content-Type", "application/json"))
        .and(body_json(json!({
            "name": "www.example.com.",
            "type": "A",
            "records": ["9.9.9.9"],
            "ttl": 300,
            "line": "default"
        })))
        .respond_with(
            ResponseTemplate::new(202)
                .set_body_json(recordset("rs-new", "www.example.com.", "default", &["9.9.9.9"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = provider
        .create_record_set(
            &ZoneId::new("zone-1"),
            &NewRecordSet {
                name: "www.example.com.".to_string(),
                record_type: "A".to_string(),
                line: "default".to_string(),
                ttl: 300,
                values: vec!["9.9.9.9".to_string()],
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, "rs-new");
    assert_eq!(created.values, vec!["9.9.9.9"]);
}

#[tokio::test]
async fn partial_update_sends_only_id_and_records() {
    let (server, provider) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/v2.1/zones/zone-1/recordsets"))
        .and(body_json(json!({
            "recordsets": [{"id": "rs-1", "records": ["9.9.9.9"]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "recordsets": [recordset("rs-1", "www.example.com.", "default", &["9.9.9.9"])]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = provider
        .update_record_set(
            &ZoneId::new("zone-1"),
            &RecordSetUpdate::values_only("rs-1", vec!["9.9.9.9".to_string()]),
        )
        .await
        .unwrap();

    assert_eq!(updated.values, vec!["9.9.9.9"]);
    assert_eq!(updated.ttl, Some(300));
}

#[tokio::test]
async fn delete_record_set_and_error_mapping() {
    let (server, provider) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v2.1/zones/zone-1/recordsets/rs-2"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"id": "rs-2"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v2.1/zones/zone-1/recordsets/rs-gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "DNS.0305",
            "message": "The record set does not exist."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let zone = ZoneId::new("zone-1");
    provider.delete_record_set(&zone, "rs-2").await.unwrap();

    let err = provider.delete_record_set(&zone, "rs-gone").await.unwrap_err();
    match err {
        Error::ProviderRequest {
            provider,
            status,
            message,
        } => {
            assert_eq!(provider, "huaweicloud");
            assert_eq!(status, Some(404));
            assert_eq!(message, "DNS.0305: The record set does not exist.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn failed_call_is_not_retried() {
    let (server, provider) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v2/zones"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error_code": "APIGW.0301",
            "error_msg": "Incorrect IAM authentication information"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider.list_zones("example.com.").await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("APIGW.0301"));
}
