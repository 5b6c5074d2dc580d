use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

fn default_payment_method() -> String {
    "card".to_string()
}

fn default_payment_status() -> String {
    "pending".to_string()
}

/// A single line item inside an order. Each item gets its own generated id
/// when the order is created.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub image: String,
    pub price: String,
    pub barcode: String,
    pub quantity: i32,
}

/// Persisted purchase record: a snapshot of cart items plus payment linkage.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub items: Vec<OrderItem>,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    pub currency: String,
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
    #[serde(rename = "paymentMethod", default = "default_payment_method")]
    pub payment_method: String,
    #[serde(rename = "paymentStatus", default = "default_payment_status")]
    pub payment_status: String,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OrderItemResponse {
    pub id: String,
    pub name: String,
    pub barcode: String,
    pub image: String,
    pub quantity: i32,
    pub price: String,
}

/// Public projection of an order: item ids are exposed as `id`, internal
/// identifiers never leak.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OrderResponse {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub items: Vec<OrderItemResponse>,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    pub currency: String,
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
    #[serde(rename = "paymentMethod")]
    pub payment_method: String,
    #[serde(rename = "paymentStatus")]
    pub payment_status: String,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn to_response(&self) -> OrderResponse {
        OrderResponse {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: self.user_id.clone(),
            items: self
                .items
                .iter()
                .map(|item| OrderItemResponse {
                    id: item.id.to_hex(),
                    name: item.name.clone(),
                    barcode: item.barcode.clone(),
                    image: item.image.clone(),
                    quantity: item.quantity,
                    price: item.price.clone(),
                })
                .collect(),
            total_amount: self.total_amount,
            currency: self.currency.clone(),
            payment_intent_id: self.payment_intent_id.clone(),
            payment_method: self.payment_method.clone(),
            payment_status: self.payment_status.clone(),
            created_at: self.created_at.map(|dt| dt.to_chrono()),
            updated_at: self.updated_at.map(|dt| dt.to_chrono()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order(item_count: usize) -> Order {
        Order {
            id: Some(ObjectId::new()),
            user_id: ObjectId::new().to_hex(),
            items: (0..item_count)
                .map(|i| OrderItem {
                    id: ObjectId::new(),
                    name: format!("item-{}", i),
                    image: "https://img.example/x.jpg".to_string(),
                    price: "2.99".to_string(),
                    barcode: format!("500015920{}", i),
                    quantity: 1,
                })
                .collect(),
            total_amount: 8.97,
            currency: "gbp".to_string(),
            payment_intent_id: "pi_123".to_string(),
            payment_method: "card".to_string(),
            payment_status: "pending".to_string(),
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        }
    }

    #[test]
    fn test_response_round_trips_all_items() {
        let order = sample_order(3);
        let response = order.to_response();

        assert_eq!(response.items.len(), 3);
        for (item, source) in response.items.iter().zip(order.items.iter()) {
            assert_eq!(item.id, source.id.to_hex());
            assert_eq!(item.name, source.name);
            assert_eq!(item.barcode, source.barcode);
            assert_eq!(item.image, source.image);
            assert_eq!(item.quantity, source.quantity);
            assert_eq!(item.price, source.price);
        }
    }

    #[test]
    fn test_response_leaks_no_internal_identifiers() {
        let order = sample_order(2);
        let json = serde_json::to_value(order.to_response()).unwrap();

        assert!(json.get("_id").is_none());
        assert!(json.get("__v").is_none());
        for item in json["items"].as_array().unwrap() {
            assert!(item.get("_id").is_none());
            assert!(item.get("id").is_some());
        }
    }
}
