// Integration tests for image upload, listing and deletion

mod common;

use axum::http::StatusCode;
use common::{setup_test_app, setup_test_app_with_media, RecordingMediaHost};
use serde_json::json;

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[tokio::test]
async fn test_upload_stores_image() {
    let app = setup_test_app().await;

    let response = app
        .post("/image")
        .bearer(&app.admin_token())
        .multipart_file("image", Some("lion.png"), "image/png", PNG_BYTES)
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response.json().await;
    assert_eq!(body["message"], "Image téléchargée et stockée avec succès");
    assert_eq!(body["data"]["label"], "lion.png");
    assert_eq!(body["data"]["public_id"], "arcadia/asset_1");
    assert!(body["data"]["url"]
        .as_str()
        .unwrap()
        .starts_with("https://res.cloudinary.com/"));

    let id = body["data"]["id"].as_str().unwrap();
    let stored = app.stored("images", id).await.unwrap();
    assert_eq!(stored["public_id"], "arcadia/asset_1");

    let uploads = app.media.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].staged_file_existed);
    assert_eq!(uploads[0].content_type, "image/png");
    assert!(!uploads[0].path.exists());
    assert!(app.staged_files().is_empty());
}

#[tokio::test]
async fn test_upload_without_file() {
    let app = setup_test_app().await;

    let response = app
        .post("/image")
        .bearer(&app.admin_token())
        .multipart_file("autre", Some("lion.png"), "image/png", PNG_BYTES)
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json().await["error"], "Aucun fichier téléchargé.");

    let response = app
        .post("/image")
        .bearer(&app.admin_token())
        .json(&json!({ "image": "lion.png" }))
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.media.uploads().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let app = setup_test_app().await;

    let response = app
        .post("/image")
        .bearer(&app.admin_token())
        .multipart_file("image", Some("notes.txt"), "text/plain", b"hello")
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json().await["error"],
        "Le fichier doit être une image."
    );
    assert!(app.media.uploads().is_empty());
    assert!(app.staged_files().is_empty());
}

#[tokio::test]
async fn test_staged_file_removed_when_media_host_fails() {
    let app = setup_test_app_with_media(RecordingMediaHost::failing()).await;

    let response = app
        .post("/image")
        .bearer(&app.admin_token())
        .multipart_file("image", Some("lion.png"), "image/png", PNG_BYTES)
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let uploads = app.media.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].staged_file_existed);
    assert!(app.staged_files().is_empty());

    let list = app.get("/image").send().await.json().await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_upload_requires_admin_and_cleans_up() {
    let app = setup_test_app().await;

    let response = app
        .post("/image")
        .bearer(&app.vet_token())
        .multipart_file("image", Some("lion.png"), "image/png", PNG_BYTES)
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.media.uploads().is_empty());
    assert!(app.staged_files().is_empty());
}

#[tokio::test]
async fn test_upload_without_file_name_gets_generated_label() {
    let app = setup_test_app().await;

    let response = app
        .post("/image")
        .bearer(&app.admin_token())
        .multipart_file("image", None, "image/jpeg", PNG_BYTES)
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let label = response.json().await["data"]["label"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(label.len(), 16);
    assert!(label.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
async fn test_list_and_get_images() {
    let app = setup_test_app().await;

    let response = app.get("/image").send().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json().await, json!([]));

    let id = app
        .seed(
            "images",
            json!({ "label": "zebre.jpg", "url": "https://res.cloudinary.com/x/image/upload/v1/zebre.jpg", "public_id": "zebre" }),
        )
        .await;

    let detail = app.get(&format!("/image/{}", id)).send().await.json().await;
    assert_eq!(detail["label"], "zebre.jpg");

    let response = app.get("/image/inconnue").send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.json().await["error"], "Image non trouvée.");
}

#[tokio::test]
async fn test_delete_image_destroys_remote_asset() {
    let app = setup_test_app().await;
    let id = app
        .seed(
            "images",
            json!({ "label": "zebre.jpg", "url": "https://res.cloudinary.com/x/image/upload/v1/zebre.jpg", "public_id": "arcadia/zebre" }),
        )
        .await;

    let response = app
        .delete(&format!("/image/{}", id))
        .bearer(&app.admin_token())
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.media.destroyed(), vec!["arcadia/zebre".to_string()]);
    assert!(app.stored("images", &id).await.is_none());
}

#[tokio::test]
async fn test_delete_image_derives_public_id_from_url() {
    let app = setup_test_app().await;
    let id = app
        .seed(
            "images",
            json!({ "label": "lion.jpg", "url": "https://res.cloudinary.com/demo/image/upload/v1712/arcadia/lion.jpg" }),
        )
        .await;

    let response = app
        .delete(&format!("/image/{}", id))
        .bearer(&app.admin_token())
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.media.destroyed(), vec!["lion".to_string()]);
}

#[tokio::test]
async fn test_delete_image_without_public_id() {
    let app = setup_test_app().await;
    let id = app
        .seed("images", json!({ "label": "vide", "url": "" }))
        .await;

    let response = app
        .delete(&format!("/image/{}", id))
        .bearer(&app.admin_token())
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json().await["error"], "Public ID introuvable.");
    assert!(app.media.destroyed().is_empty());
    assert!(app.stored("images", &id).await.is_some());
}

#[tokio::test]
async fn test_delete_unknown_image_checked_before_token() {
    let app = setup_test_app().await;

    let response = app.delete("/image/inconnue").send().await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
