use crate::utils::error::AppError;
use serde::Deserialize;

const PLACES_NEARBY_URL: &str = "https://maps.googleapis.com/maps/api/place/nearbysearch/json";
const PLACES_DETAILS_URL: &str = "https://maps.googleapis.com/maps/api/place/details/json";
const PLACES_PHOTO_URL: &str = "https://maps.googleapis.com/maps/api/place/photo";

const NEARBY_SEARCH_RADIUS_METERS: u32 = 30000;

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    #[serde(default)]
    results: Vec<PlaceResult>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct PlaceDetailsResponse {
    result: Option<PlaceDetails>,
}

#[derive(Debug, Deserialize)]
struct PlaceDetails {
    #[serde(default)]
    photos: Vec<PlacePhoto>,
}

#[derive(Debug, Deserialize)]
struct PlacePhoto {
    photo_reference: String,
}

fn places_api_key() -> Result<String, AppError> {
    std::env::var("PLACES_URL_API_KEY")
        .map_err(|_| AppError::Internal("PLACES_URL_API_KEY not configured".to_string()))
}

/// Nearby-store search by coordinates + keyword, 30km radius.
pub async fn nearby_search(
    lat: &str,
    lng: &str,
    keyword: &str,
) -> Result<Vec<PlaceResult>, AppError> {
    let api_key = places_api_key()?;

    log::info!("📍 Nearby search at {},{} for '{}'", lat, lng, keyword);

    let client = reqwest::Client::new();
    let response = client
        .get(PLACES_NEARBY_URL)
        .query(&[
            ("location", format!("{},{}", lat, lng).as_str()),
            ("radius", NEARBY_SEARCH_RADIUS_METERS.to_string().as_str()),
            ("keyword", keyword),
            ("fields", "photos"),
            ("key", api_key.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::ExternalApi(format!(
            "Places API error: {}",
            response.status()
        )));
    }

    let body: NearbySearchResponse = response.json().await?;

    Ok(body.results)
}

/// Representative photo for a place: the first photo reference from place
/// details, turned into a fetchable URL. None when the place has no photos.
pub async fn first_photo_url(place_id: &str) -> Result<Option<String>, AppError> {
    let api_key = places_api_key()?;

    let client = reqwest::Client::new();
    let response = client
        .get(PLACES_DETAILS_URL)
        .query(&[
            ("place_id", place_id),
            ("fields", "photos"),
            ("key", api_key.as_str()),
        ])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::ExternalApi(format!(
            "Place details error: {}",
            response.status()
        )));
    }

    let body: PlaceDetailsResponse = response.json().await?;

    let photo_reference = body
        .result
        .and_then(|details| details.photos.into_iter().next())
        .map(|photo| photo.photo_reference);

    Ok(photo_reference.map(|reference| {
        format!(
            "{}?maxwidth=400&photoreference={}&key={}",
            PLACES_PHOTO_URL,
            urlencoding::encode(&reference),
            api_key
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_response_parses_results() {
        let json = r#"{
            "results": [
                {"place_id": "ChIJabc", "name": "Tesco Express", "vicinity": "High St"},
                {"place_id": "ChIJdef", "name": "Sainsbury's Local"}
            ],
            "status": "OK"
        }"#;
        let parsed: NearbySearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].name, "Tesco Express");
    }

    #[test]
    fn test_details_response_without_photos() {
        let json = r#"{"result": {}, "status": "OK"}"#;
        let parsed: PlaceDetailsResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.result.unwrap().photos.is_empty());
    }
}
