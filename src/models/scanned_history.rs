use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Persisted record of a barcode lookup. Only authenticated scans are saved;
/// guest scans are returned transiently and never reach this collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScannedHistory {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub barcode: String,
    pub name: String,
    pub price: String,
    pub category: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(rename = "imagesUrl", skip_serializing_if = "Option::is_none")]
    pub images_url: Option<Vec<String>>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<BsonDateTime>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<BsonDateTime>,
}

/// Public projection of a scanned-history record.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ScannedRecord {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub barcode: String,
    pub name: String,
    pub price: String,
    pub category: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(rename = "imagesUrl", skip_serializing_if = "Option::is_none")]
    pub images_url: Option<Vec<String>>,
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ScannedHistory {
    pub fn to_record(&self) -> ScannedRecord {
        ScannedRecord {
            id: self.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: self.user_id.clone(),
            barcode: self.barcode.clone(),
            name: self.name.clone(),
            price: self.price.clone(),
            category: self.category.clone(),
            image_url: self.image_url.clone(),
            weight: self.weight.clone(),
            width: self.width.clone(),
            height: self.height.clone(),
            depth: self.depth.clone(),
            color: self.color.clone(),
            volume: self.volume.clone(),
            images_url: self.images_url.clone(),
            created_at: self.created_at.map(|dt| dt.to_chrono()),
            updated_at: self.updated_at.map(|dt| dt.to_chrono()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_projection_replaces_internal_id() {
        let oid = ObjectId::new();
        let scanned = ScannedHistory {
            id: Some(oid),
            user_id: ObjectId::new().to_hex(),
            barcode: "5000159407236".to_string(),
            name: "Snickers".to_string(),
            price: "0.89".to_string(),
            category: "Snacks".to_string(),
            image_url: "https://img.example/snickers.jpg".to_string(),
            weight: None,
            width: None,
            height: None,
            depth: None,
            color: None,
            volume: None,
            images_url: None,
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        };

        let json = serde_json::to_value(scanned.to_record()).unwrap();
        assert_eq!(json["id"], oid.to_hex());
        assert!(json.get("_id").is_none());
        assert!(json.get("__v").is_none());
        assert!(json.get("weight").is_none());
    }
}
