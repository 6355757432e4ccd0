mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use common::{chapter, get, post, test_app};

#[tokio::test]
async fn root_reports_running() -> Result<()> {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Biology Learning Backend is running" }));
    Ok(())
}

#[tokio::test]
async fn create_then_show_returns_input_plus_id() -> Result<()> {
    let (app, _) = test_app();
    let input = chapter(4, "Genetika");

    let (status, created) = post(&app, "/api/chapters", input.clone()).await?;
    assert_eq!(status, StatusCode::OK, "{}", created);
    let id = created["id"].as_str().expect("id should be a string").to_string();

    let (status, shown) = get(&app, &format!("/api/chapters/{}", id)).await?;
    assert_eq!(status, StatusCode::OK);

    let mut expected = input;
    expected["id"] = json!(id);
    assert_eq!(shown, expected);
    Ok(())
}

#[tokio::test]
async fn defaults_are_stored_for_omitted_fields() -> Result<()> {
    let (app, _) = test_app();
    let (_, created) = post(
        &app,
        "/api/chapters",
        json!({ "number": 2, "title": "Sel", "summary": "Struktur sel" }),
    )
    .await?;
    let (_, shown) = get(&app, &format!("/api/chapters/{}", created["id"].as_str().unwrap())).await?;
    assert_eq!(shown["objectives"], json!([]));
    assert_eq!(shown["sections"], json!([]));
    assert_eq!(shown["reference"], json!(null));
    Ok(())
}

#[tokio::test]
async fn list_is_sorted_by_number_regardless_of_insert_order() -> Result<()> {
    let (app, _) = test_app();
    for (n, title) in [(3, "Ekologi"), (1, "Pengantar"), (2, "Sel"), (1, "Pengantar lagi")] {
        let (status, _) = post(&app, "/api/chapters", chapter(n, title)).await?;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&app, "/api/chapters").await?;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array");
    let numbers: Vec<i64> = items.iter().map(|c| c["number"].as_i64().unwrap()).collect();
    assert_eq!(numbers, vec![1, 1, 2, 3]);
    // Equal numbers keep insertion order
    assert_eq!(items[0]["title"], "Pengantar");
    assert_eq!(items[1]["title"], "Pengantar lagi");
    assert!(items.iter().all(|c| c["id"].is_string()));
    Ok(())
}

#[tokio::test]
async fn empty_store_lists_nothing() -> Result<()> {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/api/chapters").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn malformed_ids_are_400_never_404() -> Result<()> {
    let (app, _) = test_app();
    for bad in ["abc", "123", "not-a-uuid", "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"] {
        let (status, body) = get(&app, &format!("/api/chapters/{}", bad)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "id {}", bad);
        assert_eq!(body["detail"], "Invalid chapter id");
    }
    Ok(())
}

#[tokio::test]
async fn well_formed_unknown_id_is_404() -> Result<()> {
    let (app, _) = test_app();
    let (status, body) = get(&app, "/api/chapters/6f1c1c2e-5a51-4c1e-9a0e-2b0b5b0f3c11").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Chapter not found");
    Ok(())
}

#[tokio::test]
async fn invalid_chapter_is_422_with_every_field() -> Result<()> {
    let (app, db) = test_app();
    let (status, body) = post(
        &app,
        "/api/chapters",
        json!({ "number": 0, "title": "", "summary": "", "objectives": ["ok"] }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = body["field_errors"].as_object().expect("field_errors");
    for f in ["number", "title", "summary"] {
        assert!(fields.contains_key(f), "missing {} in {}", f, body);
    }
    assert!(db.list("chapter", &Default::default()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn wrongly_typed_chapter_is_422() -> Result<()> {
    let (app, db) = test_app();
    let (status, body) = post(
        &app,
        "/api/chapters",
        json!({ "number": 1, "title": "t", "summary": 5 }),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["body"].is_string(), "{}", body);
    assert!(db.list("chapter", &Default::default()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unreadable_body_is_422() -> Result<()> {
    let (app, _) = test_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/chapters")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))?;
    let (status, body) = common::send_request(&app, request).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["body"].is_string());
    Ok(())
}

#[tokio::test]
async fn client_supplied_id_is_ignored() -> Result<()> {
    let (app, _) = test_app();
    let mut input = chapter(1, "Pengantar");
    input["id"] = json!("mine");
    let (_, created) = post(&app, "/api/chapters", input).await?;
    assert_ne!(created["id"], "mine");
    let (status, _) = get(&app, &format!("/api/chapters/{}", created["id"].as_str().unwrap())).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
