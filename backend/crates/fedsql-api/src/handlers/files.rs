//! File table endpoints
//!
//! GET /api/files/ - List uploaded tables
//! PUT /api/files/{name} - Upload (or replace) `files.<name>` from a multipart form
//! DELETE /api/files/{name} - Drop `files.<name>`

use std::sync::Arc;

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use fedsql_core::AppContext;
use futures_util::StreamExt;

use super::map_gateway_error_to_response;
use crate::extractors::Tenant;
use crate::models::{ErrorCode, ErrorResponse};

/// Text parts are small; cap them well below the file limit.
const MAX_TEXT_PART_BYTES: usize = 4 * 1024;

#[derive(Debug, Default)]
struct UploadForm {
    file: Option<Vec<u8>>,
    file_name: Option<String>,
    original_file_name: Option<String>,
}

#[derive(Debug)]
enum UploadError {
    TooLarge(usize),
    Multipart(MultipartError),
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        UploadError::Multipart(err)
    }
}

/// Read a part into memory, failing once it exceeds `limit` bytes.
async fn read_part(field: &mut Field, limit: usize) -> Result<Vec<u8>, UploadError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if buf.len() + chunk.len() > limit {
            return Err(UploadError::TooLarge(limit));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Collect the `file` and `original_file_name` parts; others are drained.
async fn read_form(mut payload: Multipart, max_file_bytes: usize) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();
    while let Some(field) = payload.next().await {
        let mut field = field?;
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string);
                form.file = Some(read_part(&mut field, max_file_bytes).await?);
            }
            "original_file_name" => {
                let bytes = read_part(&mut field, MAX_TEXT_PART_BYTES).await?;
                let value = String::from_utf8_lossy(&bytes).trim().to_string();
                if !value.is_empty() {
                    form.original_file_name = Some(value);
                }
            }
            other => {
                log::debug!("Ignoring multipart field '{}'", other);
                while let Some(chunk) = field.next().await {
                    chunk?;
                }
            }
        }
    }
    Ok(form)
}

/// GET /api/files/
pub async fn list_files_handler(app_context: web::Data<Arc<AppContext>>, tenant: Tenant) -> HttpResponse {
    HttpResponse::Ok().json(app_context.files().list(&tenant.0))
}

/// PUT /api/files/{name}
///
/// The format is taken from the uploaded file name (or `original_file_name`)
/// and falls back to sniffing the payload.
pub async fn upload_file_handler(
    app_context: web::Data<Arc<AppContext>>,
    tenant: Tenant,
    path: web::Path<String>,
    payload: Multipart,
) -> HttpResponse {
    let name = path.into_inner();
    let files = app_context.files();

    let form = match read_form(payload, files.max_size_bytes()).await {
        Ok(form) => form,
        Err(UploadError::TooLarge(limit)) => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                ErrorCode::FileTooLarge,
                format!("Upload exceeds the {} byte limit", limit),
            ))
        }
        Err(UploadError::Multipart(e)) => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                ErrorCode::InvalidInput,
                format!("Invalid multipart payload: {}", e),
            ))
        }
    };

    let Some(bytes) = form.file else {
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            ErrorCode::MissingFile,
            "Multipart field 'file' is required",
        ));
    };

    match files.upload(
        &tenant.0,
        &name,
        &bytes,
        form.file_name.as_deref(),
        form.original_file_name.as_deref(),
    ) {
        Ok(table) => HttpResponse::Ok().json(table.info()),
        Err(err) => map_gateway_error_to_response(&err),
    }
}

/// DELETE /api/files/{name}
pub async fn delete_file_handler(
    app_context: web::Data<Arc<AppContext>>,
    tenant: Tenant,
    path: web::Path<String>,
) -> HttpResponse {
    let name = path.into_inner();
    match app_context.files().delete(&tenant.0, &name) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "name": name })),
        Err(err) => map_gateway_error_to_response(&err),
    }
}
