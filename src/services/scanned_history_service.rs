use crate::{
    database::{MongoDB, SCANNED_HISTORY_COLLECTION},
    models::ScannedHistory,
    utils::error::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::Validation(format!("Invalid id: {}", id)))
}

pub async fn save(db: &MongoDB, mut scanned: ScannedHistory) -> Result<ScannedHistory, AppError> {
    let collection = db.collection::<ScannedHistory>(SCANNED_HISTORY_COLLECTION);

    let result = collection.insert_one(&scanned).await?;
    scanned.id = result.inserted_id.as_object_id();

    Ok(scanned)
}

/// All scans for one user, newest first.
pub async fn find_by_user_id(db: &MongoDB, user_id: &str) -> Result<Vec<ScannedHistory>, AppError> {
    let collection = db.collection::<ScannedHistory>(SCANNED_HISTORY_COLLECTION);

    let cursor = collection
        .find(doc! { "userId": user_id })
        .sort(doc! { "createdAt": -1 })
        .await?;
    let scanned = cursor.try_collect().await?;

    Ok(scanned)
}

pub async fn find_by_barcode(db: &MongoDB, barcode: &str) -> Result<Vec<ScannedHistory>, AppError> {
    let collection = db.collection::<ScannedHistory>(SCANNED_HISTORY_COLLECTION);

    let cursor = collection.find(doc! { "barcode": barcode }).await?;
    let scanned = cursor.try_collect().await?;

    Ok(scanned)
}

pub async fn find_all_scanned(db: &MongoDB, user_id: &str) -> Result<Vec<ScannedHistory>, AppError> {
    let collection = db.collection::<ScannedHistory>(SCANNED_HISTORY_COLLECTION);

    let cursor = collection.find(doc! { "userId": user_id }).await?;
    let scanned = cursor.try_collect().await?;

    Ok(scanned)
}

pub async fn find_by_scanned_id(db: &MongoDB, id: &str) -> Result<Option<ScannedHistory>, AppError> {
    let collection = db.collection::<ScannedHistory>(SCANNED_HISTORY_COLLECTION);
    let oid = parse_object_id(id)?;

    let scanned = collection.find_one(doc! { "_id": oid }).await?;

    Ok(scanned)
}

pub async fn delete_by_id(db: &MongoDB, id: &str) -> Result<bool, AppError> {
    let collection = db.collection::<ScannedHistory>(SCANNED_HISTORY_COLLECTION);
    let oid = parse_object_id(id)?;

    let result = collection.delete_one(doc! { "_id": oid }).await?;

    Ok(result.deleted_count > 0)
}
