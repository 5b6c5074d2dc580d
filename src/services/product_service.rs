use crate::utils::error::AppError;
use serde::Deserialize;

const OPEN_FOOD_FACTS_API_BASE: &str = "https://world.openfoodfacts.net/api/v2";
const AMAZON_SEARCH_URL: &str = "https://real-time-amazon-data.p.rapidapi.com/search";
const AMAZON_SEARCH_HOST: &str = "real-time-amazon-data.p.rapidapi.com";

#[derive(Debug, Deserialize)]
struct OpenFoodFactsResponse {
    product: Option<OpenFoodFactsProduct>,
}

#[derive(Debug, Deserialize)]
struct OpenFoodFactsProduct {
    product_name: Option<String>,
    categories: Option<String>,
}

/// Canonical product identity from the open product database.
#[derive(Debug, Clone)]
pub struct ProductLookup {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct AmazonSearchResponse {
    data: AmazonSearchData,
}

#[derive(Debug, Deserialize)]
struct AmazonSearchData {
    #[serde(default)]
    products: Vec<AmazonProduct>,
}

/// First commerce listing matching a free-text query: pricing and a photo.
#[derive(Debug, Deserialize, Clone)]
pub struct AmazonProduct {
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub product_price: Option<String>,
    #[serde(default)]
    pub product_minimum_offer_price: Option<String>,
    #[serde(default)]
    pub product_photo: Option<String>,
}

fn rapid_api_key() -> Result<String, AppError> {
    std::env::var("X_RAPID_API_KEY")
        .map_err(|_| AppError::Internal("X_RAPID_API_KEY not configured".to_string()))
}

/// Resolves a barcode to its canonical name/category via Open Food Facts.
/// A missing category falls back to "Uncategorized".
pub async fn lookup_product(barcode: &str) -> Result<ProductLookup, AppError> {
    log::info!("🔍 Looking up barcode {} on Open Food Facts", barcode);

    let url = format!("{}/product/{}", OPEN_FOOD_FACTS_API_BASE, barcode);

    let client = reqwest::Client::new();
    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let body: OpenFoodFactsResponse = response.json().await?;

    let product = body
        .product
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let name = product
        .product_name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(ProductLookup {
        name,
        category: product
            .categories
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "Uncategorized".to_string()),
    })
}

/// Free-text commerce search. Returns the first (most relevant) listing, or
/// None when the marketplace has no match for the query.
pub async fn search_commerce(query: &str) -> Result<Option<AmazonProduct>, AppError> {
    let api_key = rapid_api_key()?;

    log::info!("🛒 Searching commerce listings for '{}'", query);

    let client = reqwest::Client::new();
    let response = client
        .get(AMAZON_SEARCH_URL)
        .query(&[
            ("query", query),
            ("page", "1"),
            ("country", "GB"),
            ("sort_by", "RELEVANCE"),
            ("product_condition", "ALL"),
            ("is_prime", "false"),
        ])
        .header("x-rapidapi-key", api_key)
        .header("x-rapidapi-host", AMAZON_SEARCH_HOST)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(AppError::ExternalApi(format!(
            "Commerce search error: {}",
            response.status()
        )));
    }

    let body: AmazonSearchResponse = response.json().await?;

    Ok(body.data.products.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_parses_empty_products() {
        let json = r#"{"data": {"products": []}}"#;
        let parsed: AmazonSearchResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.data.products.is_empty());
    }

    #[test]
    fn test_search_response_parses_listing() {
        let json = r#"{
            "data": {
                "products": [{
                    "asin": "B01N5IB20Q",
                    "product_price": "£4.99",
                    "product_minimum_offer_price": "£3.50",
                    "product_photo": "https://m.media-amazon.com/images/I/x.jpg",
                    "product_star_rating": "4.5"
                }]
            }
        }"#;
        let parsed: AmazonSearchResponse = serde_json::from_str(json).unwrap();
        let first = &parsed.data.products[0];
        assert_eq!(first.product_minimum_offer_price.as_deref(), Some("£3.50"));
        assert_eq!(
            first.product_photo.as_deref(),
            Some("https://m.media-amazon.com/images/I/x.jpg")
        );
    }

    #[tokio::test]
    #[ignore] // Hits the live Open Food Facts API
    async fn test_lookup_known_barcode() {
        // Nutella 750g
        let product = lookup_product("3017624010701").await.unwrap();
        assert!(!product.name.is_empty());
    }
}
