use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Check Out Buddy API",
        version = "1.0.0",
        description = "Backend API for the Check Out Buddy retail-scanning app. \n\n**Authentication:** Most endpoints require a JWT Bearer token; the literal token `guest` grants reduced-functionality guest access.\n\n**Features:**\n- Registration, login and email verification\n- Barcode scanning with product and price aggregation\n- Nearby store suggestions\n- Orders and Stripe payment intents\n- Emailed receipts with optional PDF attachment",
        contact(
            name = "Check Out Buddy Team",
            email = "support@checkoutbuddy.app"
        )
    ),
    paths(
        // Auth
        crate::api::auth::register,
        crate::api::auth::login,

        // Health
        crate::api::health::health_check,

        // Users
        crate::api::users::get_user,

        // Orders & payments
        crate::api::orders::create_order,
        crate::api::payments::create_intent,

        // Scanning
        crate::api::scanned::scan_barcode,
    ),
    components(
        schemas(
            crate::api::auth::RegisterRequest,
            crate::api::auth::LoginRequest,
            crate::api::auth::CodeRequest,
            crate::api::auth::EmailRequest,
            crate::api::auth::ResetPasswordRequest,
            crate::api::health::HealthResponse,
            crate::api::orders::CreateOrderRequest,
            crate::api::orders::CreateOrderItem,
            crate::api::payments::CreateIntentRequest,
            crate::api::receipt::ReceiptRequest,
            crate::api::scanned::ScanBarcodeRequest,
            crate::api::scanned::NearbyStore,
            crate::models::PublicUser,
            crate::models::OrderResponse,
            crate::models::OrderItemResponse,
            crate::models::ScannedRecord,
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login, email verification and password reset."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
        (name = "Users", description = "User profile management."),
        (name = "Orders", description = "Order history: cart snapshots linked to payment intents."),
        (name = "Payments", description = "Stripe payment intent creation."),
        (name = "Scanned", description = "Barcode scanning, scan history and nearby store suggestions."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Enter your JWT token, or `guest` for guest access"))
                        .build(),
                ),
            );
        }
    }
}
