use crate::{
    database::{MongoDB, USERS_COLLECTION},
    models::User,
    utils::error::AppError,
};
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;

fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::Validation(format!("Invalid id: {}", id)))
}

pub async fn create_user(db: &MongoDB, mut user: User) -> Result<User, AppError> {
    let collection = db.collection::<User>(USERS_COLLECTION);

    let result = collection.insert_one(&user).await?;
    user.id = result.inserted_id.as_object_id();

    Ok(user)
}

/// Lookup by email, case-normalized to match the stored lowercased value.
pub async fn find_user_by_email(db: &MongoDB, email: &str) -> Result<Option<User>, AppError> {
    let collection = db.collection::<User>(USERS_COLLECTION);

    let user = collection
        .find_one(doc! { "email": email.to_lowercase() })
        .await?;

    Ok(user)
}

pub async fn find_user_by_id(db: &MongoDB, id: &str) -> Result<Option<User>, AppError> {
    let collection = db.collection::<User>(USERS_COLLECTION);
    let oid = parse_object_id(id)?;

    let user = collection.find_one(doc! { "_id": oid }).await?;

    Ok(user)
}

pub async fn find_user_by_verification_code(
    db: &MongoDB,
    code: &str,
) -> Result<Option<User>, AppError> {
    let collection = db.collection::<User>(USERS_COLLECTION);

    let user = collection
        .find_one(doc! { "verification_code": code })
        .await?;

    Ok(user)
}

pub async fn find_user_by_reset_code(db: &MongoDB, code: &str) -> Result<Option<User>, AppError> {
    let collection = db.collection::<User>(USERS_COLLECTION);

    let user = collection
        .find_one(doc! { "resetPasswordCode": code })
        .await?;

    Ok(user)
}

pub async fn find_all_users(db: &MongoDB) -> Result<Vec<User>, AppError> {
    let collection = db.collection::<User>(USERS_COLLECTION);

    let cursor = collection.find(doc! {}).await?;
    let users = cursor.try_collect().await?;

    Ok(users)
}

/// Applies a `$set` update and returns the post-update document, bumping the
/// `updatedAt` timestamp the way the original schema's timestamps did.
pub async fn update_user(
    db: &MongoDB,
    id: &str,
    mut fields: Document,
) -> Result<Option<User>, AppError> {
    let collection = db.collection::<User>(USERS_COLLECTION);
    let oid = parse_object_id(id)?;

    fields.insert("updatedAt", mongodb::bson::DateTime::now());

    let user = collection
        .find_one_and_update(doc! { "_id": oid }, doc! { "$set": fields })
        .return_document(ReturnDocument::After)
        .await?;

    Ok(user)
}

pub async fn delete_user(db: &MongoDB, id: &str) -> Result<bool, AppError> {
    let collection = db.collection::<User>(USERS_COLLECTION);
    let oid = parse_object_id(id)?;

    let result = collection.delete_one(doc! { "_id": oid }).await?;

    Ok(result.deleted_count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_object_id_rejects_garbage() {
        let err = parse_object_id("not-an-oid").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_parse_object_id_accepts_hex() {
        let oid = ObjectId::new();
        assert_eq!(parse_object_id(&oid.to_hex()).unwrap(), oid);
    }
}
