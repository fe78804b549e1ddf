//! Note actions: add, list, delete one, clear all.

use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use second_opinion_types::{
    CreateDetailForm, CreateDetailResponse, DeleteDetailForm, DeleteDetailResponse, ErrorResponse,
    ListDetailsResponse,
};

use crate::db::with_store;
use crate::error::StoreError;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/medical-details")
            .route(web::get().to(list_details))
            .route(web::post().to(create_detail)),
    );
    cfg.service(web::resource("/delete-detail").route(web::post().to(delete_detail)));
    cfg.service(web::resource("/clear-details").route(web::post().to(clear_details)));
}

async fn list_details(state: web::Data<AppState>) -> impl Responder {
    match with_store(&state.db, |db| db.list_medical_details()).await {
        Ok(details) => HttpResponse::Ok().json(ListDetailsResponse { ok: true, details }),
        Err(e) => {
            log::error!("Failed to list medical details: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}

async fn create_detail(state: web::Data<AppState>, form: web::Form<CreateDetailForm>) -> impl Responder {
    let details = form.into_inner().details.unwrap_or_default();

    match with_store(&state.db, move |db| db.add_medical_detail(&details)).await {
        Ok(detail) => HttpResponse::Ok().json(CreateDetailResponse::ok(detail)),
        Err(StoreError::Validation(msg)) => HttpResponse::BadRequest().json(CreateDetailResponse::err(msg)),
        Err(e) => {
            log::error!("Failed to add medical detail: {}", e);
            HttpResponse::InternalServerError().json(CreateDetailResponse::err(e.to_string()))
        }
    }
}

async fn delete_detail(state: web::Data<AppState>, form: web::Form<DeleteDetailForm>) -> impl Responder {
    let raw = form.into_inner().id.unwrap_or_default();
    let raw = raw.trim();

    if raw.is_empty() {
        return HttpResponse::BadRequest().json(DeleteDetailResponse::err("No id provided"));
    }
    let id: i64 = match raw.parse() {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().json(DeleteDetailResponse::err("Invalid id")),
    };

    match with_store(&state.db, move |db| db.delete_medical_detail(id)).await {
        Ok(deleted) => HttpResponse::Ok().json(DeleteDetailResponse::ok(deleted)),
        Err(e) => {
            log::error!("Failed to delete medical detail {}: {}", id, e);
            HttpResponse::InternalServerError().json(DeleteDetailResponse::err(e.to_string()))
        }
    }
}

/// Wipe every note, then send the browser back to the start page
async fn clear_details(state: web::Data<AppState>) -> impl Responder {
    match with_store(&state.db, |db| db.clear_medical_details()).await {
        Ok(()) => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .finish(),
        Err(e) => {
            log::error!("Failed to clear medical details: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new(e.to_string()))
        }
    }
}
