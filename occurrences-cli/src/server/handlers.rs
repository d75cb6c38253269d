//! Route handlers. Every read re-parses the stored spreadsheet on the
//! blocking pool.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::Serialize;
use serde_json::{Value, json};

use super::{ApiError, AppState};
use crate::ingest::Occurrence;
use crate::services::{Metrics, find_by_id};

const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct OccurrenceList {
    pub count: usize,
    pub items: Vec<Occurrence>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub count: usize,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_occurrences(State(state): State<AppState>) -> Result<Json<OccurrenceList>, ApiError> {
    let items = load_records(&state).await?;
    Ok(Json(OccurrenceList {
        count: items.len(),
        items,
    }))
}

pub async fn get_occurrence(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Occurrence>, ApiError> {
    let records = load_records(&state).await?;
    find_by_id(&records, &id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("occurrence not found"))
}

pub async fn metrics(State(state): State<AppState>) -> Result<Json<Metrics>, ApiError> {
    let records = load_records(&state).await?;
    Ok(Json(Metrics::from_records(&records)))
}

pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {}", e)))?;

        let store = state.store.clone();
        let count = tokio::task::spawn_blocking(move || store.save_upload(&file_name, &bytes))
            .await
            .map_err(|e| ApiError::internal(format!("upload task failed: {}", e)))??;

        return Ok(Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            count,
        }));
    }

    Err(ApiError::bad_request(format!(
        "missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

async fn load_records(state: &AppState) -> Result<Vec<Occurrence>, ApiError> {
    let store = state.store.clone();
    let records = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|e| ApiError::internal(format!("parse task failed: {}", e)))??;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::IngestOptions;
    use crate::server::router;
    use crate::services::OccurrenceStore;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "occurrences-test-boundary";

    fn state(dir: &TempDir) -> AppState {
        AppState {
            store: OccurrenceStore::new(dir.path(), IngestOptions::default()).unwrap(),
        }
    }

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Lista de ocorrências").unwrap();
        for (col, header) in ["Ocorrência N.º", "Estado", "Local", "Impacto"].iter().enumerate() {
            sheet.write_string(1, col as u16, *header).unwrap();
        }
        sheet.write_number(2, 0, 7.0).unwrap();
        sheet.write_string(2, 1, "Em Curso").unwrap();
        sheet.write_string(2, 2, "Leiria").unwrap();
        sheet.write_string(2, 3, "Alta").unwrap();
        sheet.write_number(3, 0, 8.0).unwrap();
        sheet.write_string(3, 2, "Setúbal").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    fn multipart_request(file_name: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let dir = TempDir::new().unwrap();
        let Json(list) = list_occurrences(State(state(&dir))).await.unwrap();
        assert_eq!(list.count, 0);

        let Json(summary) = metrics(State(state(&dir))).await.unwrap();
        assert_eq!(summary.total, 0);
    }

    #[tokio::test]
    async fn test_upload_list_lookup_and_metrics() {
        let dir = TempDir::new().unwrap();
        let app = router(state(&dir), 1024 * 1024);

        let response = app
            .clone()
            .oneshot(multipart_request("ocorrencias.xlsx", &workbook_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["count"], 2);

        let response = app
            .clone()
            .oneshot(Request::get("/occurrences").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["items"][0]["severity"], "high");
        assert_eq!(body["items"][1]["status"], Value::Null);

        let response = app
            .clone()
            .oneshot(Request::get("/occurrences/8").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["location"], "Setúbal");

        let response = app
            .clone()
            .oneshot(Request::get("/occurrences/99").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["detail"], "occurrence not found");

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["by_severity"]["high"], 1);
        assert_eq!(body["by_severity"]["unknown"], 1);
        assert_eq!(body["by_status"]["Em Curso"], 1);
        assert_eq!(body["by_status"]["unknown"], 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_non_excel_name() {
        let dir = TempDir::new().unwrap();
        let app = router(state(&dir), 1024 * 1024);

        let response = app
            .oneshot(multipart_request("notes.txt", b"hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("not an Excel workbook"));
    }

    #[tokio::test]
    async fn test_corrupt_stored_file_is_server_error() {
        let dir = TempDir::new().unwrap();
        let state = state(&dir);
        std::fs::write(state.store.path(), b"").unwrap();

        let err = list_occurrences(State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
