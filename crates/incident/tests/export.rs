//! Integration tests for fetching and exporting incidents

use chrono::NaiveDate;
use eyre::Result;
use incident::{Client, FetchError, IncidentQuery, write_incidents};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{Value, json};
use url::Url;

const PATH: &str = "/api/v2/incidents";

fn from_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 10).unwrap()
}

fn client(server: &ServerGuard) -> Result<Client> {
    Ok(Client::new("test-key".to_owned(), Url::parse(&server.url())?)?)
}

fn incidents() -> Value {
    json!([
        {
            "id": "101",
            "type": "incident",
            "attributes": {
                "name": "Checkout API down",
                "url": "https://shop.example.com/api",
                "status": "Resolved",
                "started_at": "2024-10-10T09:00:00.000Z",
                "acknowledged_at": "2024-10-10T09:02:00.000Z",
                "acknowledged_by": "alice@example.com",
                "resolved_at": "2024-10-10T09:30:00.000Z"
            }
        },
        {
            "id": "102",
            "type": "incident",
            "attributes": {
                "name": "Landing page timeout",
                "url": "https://example.com",
                "status": "Started",
                "started_at": "2024-10-12T17:45:00.000Z",
                "acknowledged_at": null,
                "acknowledged_by": null,
                "resolved_at": null
            }
        },
        {
            "id": "99",
            "type": "incident",
            "attributes": {
                "name": "Stale record from before the range",
                "status": "Resolved",
                "started_at": "2024-09-01T00:00:00.000Z",
                "acknowledged_at": null,
                "acknowledged_by": null
            }
        }
    ])
}

async fn export(client: &Client) -> Result<Value, FetchError> {
    let incidents = client.incidents(&IncidentQuery::new(from_date())).await?;
    let mut out = Vec::new();
    write_incidents(&mut out, &incidents).expect("writing to a Vec cannot fail");
    Ok(serde_json::from_slice(&out).expect("exported output is valid JSON"))
}

#[tokio::test]
async fn exports_remote_set_unfiltered_and_unsorted() -> Result<()> {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", PATH)
        .match_query(Matcher::UrlEncoded("from".into(), "2024-10-10".into()))
        .with_body(json!({ "data": incidents(), "pagination": { "next": null } }).to_string())
        .expect(1)
        .create_async()
        .await;

    let exported = export(&client(&server)?).await?;

    assert_eq!(exported, incidents());
    mock.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn downstream_filter_and_projection_see_consistent_shape() -> Result<()> {
    let mut server = Server::new_async().await;
    let two: Vec<Value> = incidents().as_array().unwrap()[..2].to_vec();
    let _mock = server
        .mock("GET", PATH)
        .match_query(Matcher::Any)
        .with_body(json!({ "data": two, "pagination": { "next": null } }).to_string())
        .create_async()
        .await;

    let exported = export(&client(&server)?).await?;

    // map(select(.attributes.status != "Resolved"))
    //   | map({name, started_at, acknowledged_at, acknowledged_by})
    let projected: Vec<Value> = exported
        .as_array()
        .unwrap()
        .iter()
        .filter(|i| i["attributes"]["status"] != "Resolved")
        .map(|i| {
            let a = &i["attributes"];
            json!({
                "name": a["name"],
                "started_at": a["started_at"],
                "acknowledged_at": a["acknowledged_at"],
                "acknowledged_by": a["acknowledged_by"],
            })
        })
        .collect();

    assert_eq!(
        projected,
        vec![json!({
            "name": "Landing page timeout",
            "started_at": "2024-10-12T17:45:00.000Z",
            "acknowledged_at": null,
            "acknowledged_by": null,
        })]
    );
    Ok(())
}

#[tokio::test]
async fn every_record_carries_acknowledgment_fields() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", PATH)
        .match_query(Matcher::Any)
        .with_body(
            json!({
                "data": [{ "id": "7", "attributes": { "name": "Cron missed", "status": "Started" } }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let exported = export(&client(&server)?).await?;
    let attributes = exported[0]["attributes"].as_object().unwrap();

    for key in ["name", "status", "started_at", "acknowledged_at", "acknowledged_by"] {
        assert!(attributes.contains_key(key), "missing {key}");
    }
    Ok(())
}

#[tokio::test]
async fn http_error_on_later_page_produces_no_output() -> Result<()> {
    let mut server = Server::new_async().await;
    let next = format!("{}{PATH}?page=2", server.url());
    let _first = server
        .mock("GET", PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_body(json!({ "data": incidents(), "pagination": { "next": next } }).to_string())
        .create_async()
        .await;
    let _second = server
        .mock("GET", PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(502)
        .create_async()
        .await;

    let result = export(&client(&server)?).await;

    let err = result.unwrap_err();
    assert!(matches!(err, FetchError::RemoteService(_)));
    assert_eq!(err.exit_code(), 1);
    Ok(())
}

#[tokio::test]
async fn forbidden_is_reported_as_authentication_failure() -> Result<()> {
    let mut server = Server::new_async().await;
    let _mock =
        server.mock("GET", PATH).match_query(Matcher::Any).with_status(403).create_async().await;

    let err = export(&client(&server)?).await.unwrap_err();

    assert!(matches!(err, FetchError::Authentication { .. }));
    assert_eq!(err.exit_code(), 3);
    Ok(())
}

#[tokio::test]
async fn records_with_unexpected_member_types_are_exported_unchanged() -> Result<()> {
    let mut server = Server::new_async().await;
    let records = json!([
        { "id": 123, "type": "incident", "attributes": { "status": "Started", "acknowledged_by": 42 } },
        { "attributes": { "name": "No id", "status": "Resolved", "started_at": null } }
    ]);
    let _mock = server
        .mock("GET", PATH)
        .match_query(Matcher::Any)
        .with_body(json!({ "data": records }).to_string())
        .create_async()
        .await;

    let exported = export(&client(&server)?).await?;

    assert_eq!(exported[0]["id"], 123);
    assert_eq!(exported[0]["attributes"]["acknowledged_by"], 42);
    assert!(exported[1].get("id").is_none());
    assert_eq!(exported[1]["attributes"]["name"], "No id");
    assert_eq!(exported.as_array().map(Vec::len), Some(2));
    Ok(())
}
