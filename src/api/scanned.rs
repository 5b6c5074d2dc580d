use crate::{
    database::MongoDB,
    middleware::auth::AuthenticatedUser,
    models::ScannedHistory,
    services::{places_service, product_service, scanned_history_service, user_service},
    utils::{codes, error::AppError},
};
use actix_web::{web, HttpResponse};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

const PRICE_VARIANCE_PERCENT: f64 = 10.0;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ScanBarcodeRequest {
    pub barcode: String,
}

impl ScanBarcodeRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.barcode.trim().is_empty() {
            return Err(AppError::Validation("Barcode is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct NearbyStoresQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    #[serde(rename = "productName")]
    pub product_name: Option<String>,
    pub price: Option<String>,
}

/// A store suggestion for a scanned product. The price is a display estimate
/// synthesized around the reference price, not sourced pricing.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct NearbyStore {
    pub id: String,
    #[serde(rename = "storeName")]
    pub store_name: String,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub price: String,
}

/// Barcode scan: resolve the product on Open Food Facts, then price it
/// against commerce listings. Authenticated scans are persisted; guest scans
/// are returned transiently.
#[utoipa::path(
    post,
    path = "/api/scanned",
    tag = "Scanned",
    request_body = ScanBarcodeRequest,
    responses(
        (status = 200, description = "Product resolved", body = crate::models::ScannedRecord),
        (status = 404, description = "Product or listing not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn scan_barcode(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    request: web::Json<ScanBarcodeRequest>,
) -> Result<HttpResponse, AppError> {
    request.validate()?;
    let barcode = request.barcode.clone();
    log::info!("📷 POST /api/scanned - barcode: {}", barcode);

    let product = product_service::lookup_product(&barcode).await?;

    let listing = product_service::search_commerce(&product.name)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", product.name)))?;

    log::info!(
        "🛒 Matched listing {} for {}",
        listing.asin.as_deref().unwrap_or("unknown"),
        product.name
    );

    let price = listing
        .product_minimum_offer_price
        .or(listing.product_price)
        .unwrap_or_default();
    let image_url = listing.product_photo.unwrap_or_default();

    let now = mongodb::bson::DateTime::now();
    let scanned = ScannedHistory {
        id: None,
        user_id: principal.id.clone(),
        barcode: barcode.clone(),
        name: product.name.clone(),
        price,
        category: product.category.clone(),
        image_url,
        weight: None,
        width: None,
        height: None,
        depth: None,
        color: None,
        volume: None,
        images_url: None,
        created_at: Some(now),
        updated_at: Some(now),
    };

    if principal.is_guest() {
        log::info!("👻 Guest scan, not persisted: {}", barcode);
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Product scanned successfully",
            "data": scanned.to_record(),
            "success": true
        })));
    }

    user_service::find_user_by_id(&db, &principal.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Request failed".to_string()))?;

    let scanned = scanned_history_service::save(&db, scanned).await?;

    log::info!("✅ Scan saved: {} ({})", product.name, barcode);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Product scanned successfully",
        "data": scanned.to_record(),
        "success": true
    })))
}

/// Nearby stores likely to stock a product, with an estimated price per
/// store. Public route: no principal is attached here.
pub async fn find_nearby_stores(
    query: web::Query<NearbyStoresQuery>,
) -> Result<HttpResponse, AppError> {
    let (lat, lng) = match (query.lat.as_deref(), query.lng.as_deref()) {
        (Some(lat), Some(lng)) if !lat.is_empty() && !lng.is_empty() => (lat, lng),
        _ => {
            return Err(AppError::Validation(
                "Latitude and longitude are required".to_string(),
            ));
        }
    };

    let product_name = match query.product_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(AppError::Validation(
                "Product name is required".to_string(),
            ));
        }
    };

    let reference_price: f64 = query
        .price
        .as_deref()
        .and_then(|p| p.parse().ok())
        .unwrap_or(0.0);

    log::info!(
        "🏪 GET /api/scanned/nearbystores - {} near {},{}",
        product_name,
        lat,
        lng
    );

    let places = places_service::nearby_search(lat, lng, product_name).await?;

    // Photo lookups fan out concurrently, one details call per place
    let photo_futures = places.iter().map(|place| {
        let place_id = place.place_id.clone();
        async move {
            places_service::first_photo_url(&place_id)
                .await
                .unwrap_or_else(|e| {
                    log::warn!("⚠️ Photo lookup failed for {}: {}", place_id, e);
                    None
                })
        }
    });
    let photos = join_all(photo_futures).await;

    let stores: Vec<NearbyStore> = places
        .iter()
        .zip(photos)
        .map(|(place, photo)| NearbyStore {
            id: Uuid::new_v4().to_string(),
            store_name: place.name.clone(),
            name: product_name.to_string(),
            image_url: photo.unwrap_or_default(),
            price: format!(
                "{:.2}",
                codes::generate_estimated_price(reference_price, PRICE_VARIANCE_PERCENT)
            ),
        })
        .collect();

    log::info!("✅ {} store(s) found for {}", stores.len(), product_name);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Nearby stores fetched successfully",
        "data": stores,
        "success": true
    })))
}

pub async fn get_all_scanned(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    log::info!("📋 GET /api/scanned");

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Scanned history fetched successfully",
            "data": [],
            "success": true
        })));
    }

    let scanned = scanned_history_service::find_all_scanned(&db, &principal.id).await?;
    let records: Vec<_> = scanned.iter().map(|item| item.to_record()).collect();

    Ok(HttpResponse::Ok().json(json!({
        "message": "Scanned history fetched successfully",
        "data": records,
        "success": true
    })))
}

pub async fn get_scanned_by_user(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    log::info!("📋 GET /api/scanned/users/{}", user_id);

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Scanned history fetched successfully",
            "data": [],
            "success": true
        })));
    }

    let scanned = scanned_history_service::find_by_user_id(&db, &user_id).await?;
    let records: Vec<_> = scanned.iter().map(|item| item.to_record()).collect();

    Ok(HttpResponse::Ok().json(json!({
        "message": "Scanned history fetched successfully",
        "data": records,
        "success": true
    })))
}

pub async fn get_scanned_by_barcode(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let barcode = path.into_inner();
    log::info!("📋 POST /api/scanned/barcode/{}", barcode);

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Scanned history fetched successfully",
            "data": [],
            "success": true
        })));
    }

    let scanned = scanned_history_service::find_by_barcode(&db, &barcode).await?;
    let records: Vec<_> = scanned.iter().map(|item| item.to_record()).collect();

    Ok(HttpResponse::Ok().json(json!({
        "message": "Scanned history fetched successfully",
        "data": records,
        "success": true
    })))
}

pub async fn get_scanned_by_id(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("📋 GET /api/scanned/{}", id);

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Scanned item fetched successfully",
            "data": {},
            "success": true
        })));
    }

    let scanned = scanned_history_service::find_by_scanned_id(&db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Scanned item not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Scanned item fetched successfully",
        "data": scanned.to_record(),
        "success": true
    })))
}

pub async fn delete_scanned(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    log::info!("🗑️ DELETE /api/scanned/{}", id);

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Scanned item deleted successfully",
            "data": {},
            "success": true
        })));
    }

    if !scanned_history_service::delete_by_id(&db, &id).await? {
        return Err(AppError::NotFound("Scanned item not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Scanned item deleted successfully",
        "data": {},
        "success": true
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_request_takes_barcode_in_the_body() {
        let request: ScanBarcodeRequest =
            serde_json::from_str(r#"{"barcode": "5000159407236"}"#).unwrap();
        assert_eq!(request.barcode, "5000159407236");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_scan_request_rejects_blank_barcode() {
        let request = ScanBarcodeRequest {
            barcode: " ".to_string(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_nearby_store_serializes_display_names() {
        let store = NearbyStore {
            id: Uuid::new_v4().to_string(),
            store_name: "Tesco Express".to_string(),
            name: "Oat Milk".to_string(),
            image_url: "".to_string(),
            price: "4.37".to_string(),
        };
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["storeName"], "Tesco Express");
        assert_eq!(json["imageUrl"], "");
        assert!(json.get("store_name").is_none());
    }
}
