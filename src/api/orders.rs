use crate::{
    database::MongoDB,
    middleware::auth::AuthenticatedUser,
    models::{Order, OrderItem},
    services::order_service,
    utils::error::AppError,
};
use actix_web::{web, HttpResponse};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateOrderItem {
    pub name: String,
    pub image: String,
    pub price: String,
    pub barcode: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<CreateOrderItem>,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    pub currency: String,
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
    #[serde(rename = "paymentMethod", default)]
    pub payment_method: Option<String>,
}

impl CreateOrderRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.items.is_empty() {
            return Err(AppError::Validation(
                "At least one item is required".to_string(),
            ));
        }
        if self.total_amount <= 0.0 {
            return Err(AppError::Validation(
                "Total amount must be greater than zero".to_string(),
            ));
        }
        if self.currency.trim().is_empty() {
            return Err(AppError::Validation("Currency is required".to_string()));
        }
        Ok(())
    }
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = crate::models::OrderResponse),
        (status = 400, description = "Invalid request")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    log::info!("🛍️ POST /api/orders - {} item(s)", request.items.len());

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Order created successfully",
            "data": {},
            "success": true
        })));
    }

    request.validate()?;

    let now = mongodb::bson::DateTime::now();
    let order = Order {
        id: None,
        user_id: principal.id.clone(),
        items: request
            .items
            .iter()
            .map(|item| OrderItem {
                id: ObjectId::new(),
                name: item.name.clone(),
                image: item.image.clone(),
                price: item.price.clone(),
                barcode: item.barcode.clone(),
                quantity: item.quantity,
            })
            .collect(),
        total_amount: request.total_amount,
        currency: request.currency.clone(),
        payment_intent_id: request.payment_intent_id.clone(),
        payment_method: request
            .payment_method
            .clone()
            .unwrap_or_else(|| "card".to_string()),
        payment_status: "pending".to_string(),
        created_at: Some(now),
        updated_at: Some(now),
    };

    let order = order_service::create_order(&db, order).await?;

    log::info!("✅ Order created: {}", order.id.map(|id| id.to_hex()).unwrap_or_default());

    Ok(HttpResponse::Created().json(json!({
        "message": "Order created successfully",
        "data": order.to_response(),
        "success": true
    })))
}

pub async fn get_all_orders(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
    log::info!("📦 GET /api/orders");

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Orders fetched successfully",
            "data": [],
            "success": true
        })));
    }

    let orders = order_service::get_all_orders(&db, &principal.id).await?;
    let orders: Vec<_> = orders.iter().map(|order| order.to_response()).collect();

    Ok(HttpResponse::Ok().json(json!({
        "message": "Orders fetched successfully",
        "data": orders,
        "success": true
    })))
}

pub async fn get_order(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    log::info!("📦 GET /api/orders/{}", order_id);

    if principal.is_guest() {
        return Ok(HttpResponse::Ok().json(json!({
            "message": "Order fetched successfully",
            "data": {},
            "success": true
        })));
    }

    let order = order_service::get_order_by_id(&db, &order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Order fetched successfully",
        "data": order.to_response(),
        "success": true
    })))
}

pub async fn delete_order(
    db: web::Data<MongoDB>,
    principal: web::ReqData<AuthenticatedUser>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    log::info!("🗑️ DELETE /api/orders/{}", order_id);

    if principal.is_guest() {
        return Err(AppError::Forbidden(
            "Access denied for guest users".to_string(),
        ));
    }

    order_service::get_order_by_id(&db, &order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    order_service::delete_order(&db, &order_id).await?;

    log::info!("✅ Order deleted: {}", order_id);

    Ok(HttpResponse::Ok().json(json!({
        "message": "Order deleted successfully",
        "data": {},
        "success": true
    })))
}
