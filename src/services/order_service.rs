use crate::{
    database::{MongoDB, ORDERS_COLLECTION},
    models::Order,
    utils::error::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;

fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::Validation(format!("Invalid id: {}", id)))
}

pub async fn create_order(db: &MongoDB, mut order: Order) -> Result<Order, AppError> {
    let collection = db.collection::<Order>(ORDERS_COLLECTION);

    let result = collection.insert_one(&order).await?;
    order.id = result.inserted_id.as_object_id();

    Ok(order)
}

pub async fn get_all_orders(db: &MongoDB, user_id: &str) -> Result<Vec<Order>, AppError> {
    let collection = db.collection::<Order>(ORDERS_COLLECTION);

    let cursor = collection.find(doc! { "userId": user_id }).await?;
    let orders = cursor.try_collect().await?;

    Ok(orders)
}

pub async fn get_order_by_id(db: &MongoDB, order_id: &str) -> Result<Option<Order>, AppError> {
    let collection = db.collection::<Order>(ORDERS_COLLECTION);
    let oid = parse_object_id(order_id)?;

    let order = collection.find_one(doc! { "_id": oid }).await?;

    Ok(order)
}

/// Updates order fields (typically `paymentStatus`) and returns the updated
/// document. Supported at the service layer; no controller calls it yet.
pub async fn update_order_status(
    db: &MongoDB,
    order_id: &str,
    mut fields: Document,
) -> Result<Option<Order>, AppError> {
    let collection = db.collection::<Order>(ORDERS_COLLECTION);
    let oid = parse_object_id(order_id)?;

    fields.insert("updatedAt", mongodb::bson::DateTime::now());

    let order = collection
        .find_one_and_update(doc! { "_id": oid }, doc! { "$set": fields })
        .return_document(ReturnDocument::After)
        .await?;

    Ok(order)
}

pub async fn delete_order(db: &MongoDB, order_id: &str) -> Result<bool, AppError> {
    let collection = db.collection::<Order>(ORDERS_COLLECTION);
    let oid = parse_object_id(order_id)?;

    let result = collection.delete_one(doc! { "_id": oid }).await?;

    Ok(result.deleted_count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderItem;
    use mongodb::bson::DateTime as BsonDateTime;

    fn sample_order(user_id: &str) -> Order {
        Order {
            id: None,
            user_id: user_id.to_string(),
            items: vec![OrderItem {
                id: ObjectId::new(),
                name: "Milk".to_string(),
                image: "https://img.example/milk.jpg".to_string(),
                price: "1.20".to_string(),
                barcode: "5000159407236".to_string(),
                quantity: 2,
            }],
            total_amount: 2.4,
            currency: "gbp".to_string(),
            payment_intent_id: "pi_test".to_string(),
            payment_method: "card".to_string(),
            payment_status: "pending".to_string(),
            created_at: Some(BsonDateTime::now()),
            updated_at: Some(BsonDateTime::now()),
        }
    }

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_order_crud_round_trip() {
        dotenv::dotenv().ok();
        let uri = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017/checkout_buddy_test".to_string());
        let db = MongoDB::new(&uri).await.unwrap();

        let user_id = ObjectId::new().to_hex();
        let created = create_order(&db, sample_order(&user_id)).await.unwrap();
        let order_id = created.id.unwrap().to_hex();

        let fetched = get_order_by_id(&db, &order_id).await.unwrap().unwrap();
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.user_id, user_id);

        let updated = update_order_status(&db, &order_id, doc! { "paymentStatus": "paid" })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.payment_status, "paid");

        assert!(delete_order(&db, &order_id).await.unwrap());
        assert!(get_order_by_id(&db, &order_id).await.unwrap().is_none());
    }
}
