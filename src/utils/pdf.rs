use crate::utils::error::AppError;
use printpdf::{BuiltinFont, Mm, PdfDocument};

/// Line items for a rendered receipt. Mirrors the fields required by the
/// receipt endpoints.
pub struct ReceiptDetails<'a> {
    pub product_name: &'a str,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub payment_method: &'a str,
    pub date: &'a str,
}

/// Renders a single-page A4 receipt PDF and returns the raw bytes for use as
/// an email attachment.
pub fn render_receipt_pdf(details: &ReceiptDetails) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) = PdfDocument::new("Receipt", Mm(210.0), Mm(297.0), "Layer 1");

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::Internal(format!("Failed to load PDF font: {}", e)))?;
    let title_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::Internal(format!("Failed to load PDF font: {}", e)))?;

    let current_layer = doc.get_page(page).get_layer(layer);

    current_layer.use_text("Receipt", 16.0, Mm(92.0), Mm(270.0), &title_font);
    current_layer.use_text("========================", 12.0, Mm(80.0), Mm(260.0), &font);

    let lines = [
        format!("Product Name: {}", details.product_name),
        format!("Subtotal: ${}", details.subtotal),
        format!("Tax (10%): ${}", details.tax),
        format!("Total: ${}", details.total),
    ];

    let mut y = 248.0;
    for line in &lines {
        current_layer.use_text(line.as_str(), 12.0, Mm(40.0), Mm(y), &font);
        y -= 8.0;
    }

    current_layer.use_text("========================", 12.0, Mm(80.0), Mm(y - 4.0), &font);
    y -= 16.0;

    current_layer.use_text(
        format!("Payment Method: {}", details.payment_method).as_str(),
        12.0,
        Mm(40.0),
        Mm(y),
        &font,
    );
    current_layer.use_text(
        format!("Date: {}", details.date).as_str(),
        12.0,
        Mm(40.0),
        Mm(y - 8.0),
        &font,
    );

    doc.save_to_bytes()
        .map_err(|e| AppError::Internal(format!("Failed to render receipt PDF: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_details() -> ReceiptDetails<'static> {
        ReceiptDetails {
            product_name: "Organic Oat Milk",
            subtotal: 4.5,
            tax: 0.45,
            total: 4.95,
            payment_method: "card",
            date: "2025-01-15",
        }
    }

    #[test]
    fn test_renders_valid_pdf_bytes() {
        let bytes = render_receipt_pdf(&sample_details()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }
}
