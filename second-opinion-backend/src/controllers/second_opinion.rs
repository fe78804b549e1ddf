//! Streamed second opinion over the current notes.
//!
//! Fragments are written to a chunked `text/plain` body as they arrive. If
//! generation fails before anything was sent, the request fails with a JSON
//! error instead; a failure mid-stream aborts the body.

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use bytes::Bytes;
use futures_util::StreamExt;

use crate::error::RelayError;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/second-opinion").route(web::post().to(second_opinion)));
}

async fn second_opinion(state: web::Data<AppState>) -> Result<HttpResponse, RelayError> {
    let stream = state.relay.generate_opinion().await.map_err(|e| {
        log::error!("Second opinion failed before streaming: {}", e);
        e
    })?;

    let body = stream.map(|item| match item {
        Ok(fragment) => Ok(Bytes::from(fragment)),
        Err(e) => {
            log::error!("Second opinion stream aborted: {}", e);
            Err(e)
        }
    });

    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(body))
}
