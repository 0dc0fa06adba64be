// Copyright 2026 abhirupbanerjee
// Licensed under the Apache License, Version 2.0

//! Integration test: a mock node and indexer served by axum on an
//! ephemeral port, exercised through `tzk_sdk::` only.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use tzk_sdk::indexer::IndexerClient;
use tzk_sdk::node::NodeClient;
use tzk_sdk::{
    BigMapNameLookup, BigMapRequest, ContractCall, Micheline, NameResolver, Predicate, RawValue,
    SchemaMeta, TezosContract, TzkError,
};

const TOKEN: &str = "KT1PWx2mnDueood7fEmfbBDKx1D9BAnnXitn";
const ALICE: &str = "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb";

// ── mock ──

#[derive(Default)]
struct Mock {
    script: Value,
    entrypoints: Value,
    storage: Value,
    /// Rows of `originated_account_maps`.
    account_maps: Vec<Value>,
    /// Rows of `big_maps`, filtered on `key_type` when asked.
    big_maps: Vec<Value>,
    /// Rows of `big_map_contents`.
    contents: Vec<Value>,
    script_calls: AtomicUsize,
    entrypoint_calls: AtomicUsize,
    indexer_calls: AtomicUsize,
    fail_script: AtomicBool,
}

type Shared = Arc<Mock>;

async fn script(State(mock): State<Shared>, Path(_address): Path<String>) -> Result<Json<Value>, StatusCode> {
    mock.script_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    if mock.fail_script.swap(false, Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(mock.script.clone()))
}

async fn entrypoints(State(mock): State<Shared>, Path(_address): Path<String>) -> Json<Value> {
    mock.entrypoint_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    Json(mock.entrypoints.clone())
}

async fn storage(State(mock): State<Shared>, Path(_address): Path<String>) -> Json<Value> {
    Json(mock.storage.clone())
}

/// Keep rows whose fields equal every `eq` predicate in the query; `in`
/// predicates on `big_map_id` are matched by membership.
fn select(rows: &[Value], query: &Value) -> Vec<Value> {
    let predicates = query["predicates"].as_array().cloned().unwrap_or_default();
    rows.iter()
        .filter(|row| {
            predicates.iter().all(|p| {
                let field = p["field"].as_str().unwrap();
                let set = p["set"].as_array().unwrap();
                match p["operation"].as_str().unwrap() {
                    "eq" => row.get(field) == set.first(),
                    "in" => set.iter().any(|v| row.get(field) == Some(v)),
                    other => panic!("mock does not support {other}"),
                }
            })
        })
        .take(query["limit"].as_u64().unwrap_or(100) as usize)
        .cloned()
        .collect()
}

async fn indexer(
    State(mock): State<Shared>,
    Path((_network, entity)): Path<(String, String)>,
    Json(query): Json<Value>,
) -> Json<Value> {
    mock.indexer_calls.fetch_add(1, Ordering::SeqCst);
    let rows = match entity.as_str() {
        "originated_account_maps" => select(&mock.account_maps, &query),
        "big_maps" => select(&mock.big_maps, &query),
        "big_map_contents" => select(&mock.contents, &query),
        other => panic!("unexpected entity {other}"),
    };
    Json(Value::Array(rows))
}

async fn serve(mock: Mock) -> (Shared, String) {
    let mock = Arc::new(mock);
    let contract = "/chains/main/blocks/head/context/contracts/{address}";
    let app = Router::new()
        .route(&format!("{contract}/script"), get(script))
        .route(&format!("{contract}/entrypoints"), get(entrypoints))
        .route(&format!("{contract}/storage"), get(storage))
        .route("/v2/data/tezos/{network}/{entity}", post(indexer))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (mock, format!("http://{addr}"))
}

fn contract_at(url: &str) -> TezosContract {
    let http = reqwest::Client::new();
    TezosContract::with_clients(
        TOKEN,
        NodeClient::new(url, http.clone()),
        IndexerClient::new(url, "mainnet", Some("test-key".into()), http),
    )
}

fn node(value: Value) -> Micheline {
    serde_json::from_value(value).unwrap()
}

// ── fixtures ──

fn transfer_pair() -> Value {
    json!({ "prim": "pair", "args": [{ "prim": "address" }, { "prim": "nat" }] })
}

fn token_parameter() -> Value {
    json!({
        "prim": "or",
        "args": [
            { "prim": "pair", "args": [{ "prim": "address" }, { "prim": "nat" }], "annots": ["%transfer"] },
            { "prim": "pair", "args": [{ "prim": "address" }, { "prim": "nat" }], "annots": ["%approve"] }
        ]
    })
}

fn token_mock() -> Mock {
    Mock {
        script: json!({
            "code": [
                { "prim": "parameter", "args": [token_parameter()] },
                { "prim": "storage", "args": [{
                    "prim": "pair",
                    "args": [
                        { "prim": "big_map", "args": [{ "prim": "address" }, { "prim": "nat" }], "annots": ["%ledger"] },
                        { "prim": "nat", "annots": ["%total_supply"] }
                    ]
                }] },
                { "prim": "code", "args": [[]] }
            ]
        }),
        entrypoints: json!({
            "entrypoints": {
                "transfer": transfer_pair(),
                "approve": transfer_pair()
            }
        }),
        storage: json!({ "prim": "Pair", "args": [{ "int": "31" }, { "int": "1000" }] }),
        ..Mock::default()
    }
}

// ── entrypoints ──

#[tokio::test]
async fn concurrent_resolution_is_single_flight() {
    let (mock, url) = serve(token_mock()).await;
    let contract = contract_at(&url);

    let (a, b) = tokio::join!(contract.entrypoints(), contract.entrypoints());
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(mock.script_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.entrypoint_calls.load(Ordering::SeqCst), 1);

    contract.entrypoints().await.unwrap();
    assert_eq!(mock.script_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn default_is_synthesized_from_parameter() {
    let (_mock, url) = serve(token_mock()).await;
    let contract = contract_at(&url);

    let entrypoints = contract.entrypoints().await.unwrap();
    assert_eq!(
        entrypoints.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["approve", "default", "transfer"]
    );
    let default = &entrypoints["default"];
    assert_eq!(default.node, node(token_parameter()));
    assert_eq!(default.schema.to_micheline().unwrap(), node(token_parameter()));
}

#[tokio::test]
async fn unbuildable_entrypoint_does_not_hide_the_others() {
    let mut mock = token_mock();
    mock.entrypoints["entrypoints"]["burn"] =
        json!({ "prim": "ticket", "args": [{ "prim": "unit" }] });
    let (_mock, url) = serve(mock).await;
    let contract = contract_at(&url);

    let call = contract
        .create_contract_call("transfer", json!([ALICE, 5]), None)
        .await
        .unwrap();
    assert_eq!(call.entrypoint, "transfer");

    let err = contract
        .create_contract_call("burn", json!({ "prim": "Unit" }), None)
        .await
        .unwrap_err();
    assert!(matches!(err, TzkError::Unsupported(_)), "{err}");
}

#[tokio::test]
async fn failed_fetch_is_retried() {
    let mock = token_mock();
    mock.fail_script.store(true, Ordering::SeqCst);
    let (mock, url) = serve(mock).await;
    let contract = contract_at(&url);

    let err = contract.entrypoints().await.unwrap_err();
    assert!(matches!(err, TzkError::Network { .. }), "{err}");

    contract.entrypoints().await.unwrap();
    assert_eq!(mock.script_calls.load(Ordering::SeqCst), 2);
}

// ── calls ──

#[tokio::test]
async fn named_call_from_native_value() {
    let (_mock, url) = serve(token_mock()).await;
    let contract = contract_at(&url);

    let call = contract
        .create_contract_call("transfer", json!([ALICE, 5]), Some(0))
        .await
        .unwrap();
    assert_eq!(
        call.parameters(),
        json!({
            "entrypoint": "transfer",
            "value": { "prim": "Pair", "args": [{ "string": ALICE }, { "int": "5" }] }
        })
    );
    assert_eq!(call.amount, Some(0));
}

#[tokio::test]
async fn unknown_entrypoint_is_untyped_default() {
    let (_mock, url) = serve(token_mock()).await;
    let contract = contract_at(&url);

    let value = json!({ "prim": "Unit" });
    let call = contract
        .create_contract_call("mint", value.clone(), None)
        .await
        .unwrap();
    assert_eq!(call.entrypoint, "default");
    assert_eq!(call.value, node(value));
}

#[tokio::test]
async fn or_value_at_default_is_renamed() {
    let (_mock, url) = serve(token_mock()).await;
    let contract = contract_at(&url);

    let narrowed = node(json!({ "prim": "Pair", "args": [{ "string": ALICE }, { "int": "5" }] }));
    let legacy = ContractCall::new(
        "default",
        Micheline::prim("Left", vec![narrowed.clone()]),
    );
    let call = contract
        .normalize_contract_call_parameters(legacy, None)
        .await
        .unwrap();
    assert_eq!(call.entrypoint, "transfer");
    assert_eq!(call.value, narrowed);

    let legacy = ContractCall::new(
        "default",
        Micheline::prim("Right", vec![narrowed.clone()]),
    );
    let call = contract
        .normalize_contract_call_parameters(legacy, None)
        .await
        .unwrap();
    assert_eq!(call.entrypoint, "approve");
}

#[tokio::test]
async fn non_or_and_named_calls_pass_through() {
    let (mock, url) = serve(token_mock()).await;
    let contract = contract_at(&url);

    let named = ContractCall::new("approve", Micheline::int(1));
    assert_eq!(
        contract
            .normalize_contract_call_parameters(named.clone(), None)
            .await
            .unwrap(),
        named
    );
    let bare = ContractCall::new("default", Micheline::int(1));
    assert_eq!(
        contract
            .normalize_contract_call_parameters(bare.clone(), Some("transfer"))
            .await
            .unwrap(),
        bare
    );
    // neither needed the node
    assert_eq!(mock.script_calls.load(Ordering::SeqCst), 0);
}

// ── storage and big maps ──

#[tokio::test]
async fn storage_decodes_as_record() {
    let (_mock, url) = serve(token_mock()).await;
    let contract = contract_at(&url);

    let storage = contract.storage().await.unwrap().as_raw_value().unwrap();
    assert_eq!(storage.get("ledger"), Some(&RawValue::Int(31.into())));
    assert_eq!(storage.get("total_supply"), Some(&RawValue::Int(1000.into())));
}

fn names_mock(hash: &str) -> Mock {
    Mock {
        account_maps: vec![json!({ "account_id": TOKEN, "big_map_id": 77 })],
        contents: vec![json!({
            "big_map_id": 77,
            "key": "0x616c6963652e74657a",
            "key_hash": hash,
            "value": "{\"prim\":\"Pair\",\"args\":[{\"string\":\"tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb\"},{\"int\":\"1\"}]}"
        })],
        ..Mock::default()
    }
}

fn record_type() -> SchemaMeta {
    let record = node(json!({
        "prim": "pair",
        "args": [
            { "prim": "address", "annots": ["%address"] },
            { "prim": "nat", "annots": ["%level"] }
        ]
    }));
    SchemaMeta::from_micheline(&record).unwrap().unwrap()
}

fn bytes_type() -> SchemaMeta {
    SchemaMeta::from_micheline(&node(json!({ "prim": "bytes" })))
        .unwrap()
        .unwrap()
}

fn alice_hash() -> String {
    tzk_sdk::TypedValue::bytes(json!(hex::encode("alice.tez")))
        .unwrap()
        .script_expr_hash()
        .unwrap()
}

#[tokio::test]
async fn big_map_value_present_and_absent() {
    let (mock, url) = serve(names_mock(&alice_hash())).await;
    let contract = contract_at(&url);

    let value = contract
        .big_map_value(None, json!(hex::encode("alice.tez")), &bytes_type(), &record_type())
        .await
        .unwrap()
        .expect("alice is registered");
    assert_eq!(
        value.as_raw_value().unwrap().get("address"),
        Some(&RawValue::String(ALICE.into()))
    );

    let missing = contract
        .big_map_value(None, json!(hex::encode("bob.tez")), &bytes_type(), &record_type())
        .await
        .unwrap();
    assert!(missing.is_none());

    // ids were resolved once: 1 id query + 2 content queries
    assert_eq!(mock.indexer_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn address_keyed_ledger_lookup() {
    let mock = Mock {
        account_maps: vec![json!({ "account_id": TOKEN, "big_map_id": 31 })],
        contents: vec![json!({
            "big_map_id": 31,
            "key": format!("\"{ALICE}\""),
            "key_hash": "exprtZBwZUeYYYfUs9B9Rg2ywHezVHnCCnmF9WsDQVrs582dSK63dC",
            "value": { "int": "500" }
        })],
        ..Mock::default()
    };
    let (_mock, url) = serve(mock).await;
    let contract = contract_at(&url);
    let address = SchemaMeta::from_micheline(&node(json!({ "prim": "address" })))
        .unwrap()
        .unwrap();
    let nat = SchemaMeta::from_micheline(&node(json!({ "prim": "nat" })))
        .unwrap()
        .unwrap();

    let balance = contract
        .big_map_value(None, json!(ALICE), &address, &nat)
        .await
        .unwrap()
        .expect("alice holds tokens");
    assert_eq!(balance.as_raw_value().unwrap(), RawValue::Int(500.into()));
}

#[tokio::test]
async fn concurrent_big_map_ids_are_single_flight() {
    let mock = Mock {
        account_maps: vec![
            json!({ "account_id": TOKEN, "big_map_id": 1 }),
            json!({ "account_id": TOKEN, "big_map_id": 2 }),
        ],
        ..Mock::default()
    };
    let (mock, url) = serve(mock).await;
    let contract = contract_at(&url);

    let (a, b) = tokio::join!(contract.big_map_ids(), contract.big_map_ids());
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(*a, vec![1, 2]);
    assert_eq!(mock.indexer_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn several_big_maps_need_a_filter() {
    let mock = Mock {
        account_maps: vec![
            json!({ "account_id": TOKEN, "big_map_id": 1 }),
            json!({ "account_id": TOKEN, "big_map_id": "2" }),
        ],
        big_maps: vec![
            json!({ "big_map_id": 1, "key_type": "address" }),
            json!({ "big_map_id": 2, "key_type": "bytes" }),
        ],
        ..Mock::default()
    };
    let (_mock, url) = serve(mock).await;
    let contract = contract_at(&url);

    assert!(matches!(
        contract.big_map_id(&[]).await,
        Err(TzkError::InvalidValue(_))
    ));
    assert_eq!(
        contract
            .big_map_id(&[Predicate::eq("key_type", "bytes")])
            .await
            .unwrap(),
        2
    );
    assert!(matches!(
        contract
            .big_map_id(&[Predicate::eq("key_type", "unit")])
            .await,
        Err(TzkError::NotFound(_))
    ));

    let rows = contract
        .big_map_values(&BigMapRequest {
            id: Some(2),
            ..BigMapRequest::default()
        })
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn contract_without_big_maps() {
    let (_mock, url) = serve(Mock::default()).await;
    let contract = contract_at(&url);
    assert!(matches!(
        contract.big_map_id(&[]).await,
        Err(TzkError::NotFound(_))
    ));
}

// ── names ──

#[tokio::test]
async fn name_resolution_through_big_map() {
    let (mock, url) = serve(names_mock(&alice_hash())).await;
    let contract = Arc::new(contract_at(&url));
    let resolver = NameResolver::new(
        BigMapNameLookup::new(contract, Some(77), record_type()),
        Duration::from_secs(60),
    );

    assert_eq!(
        resolver.resolve("alice.tez").await.unwrap().as_deref(),
        Some(ALICE)
    );
    assert_eq!(resolver.resolve("ALICE.tez").await.unwrap().as_deref(), Some(ALICE));
    assert_eq!(resolver.resolve("bob.tez").await.unwrap(), None);
    // explicit id: no id discovery, one content query per distinct name
    assert_eq!(mock.indexer_calls.load(Ordering::SeqCst), 2);
}
