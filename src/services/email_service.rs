use crate::utils::{
    error::AppError,
    pdf::{render_receipt_pdf, ReceiptDetails},
};
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

const SENDER_NAME: &str = "Check Out Buddy";

/// Fields rendered into both the HTML receipt and the PDF attachment.
pub struct ReceiptEmail<'a> {
    pub email: &'a str,
    pub name: &'a str,
    pub product_name: &'a str,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub payment_method: &'a str,
    pub date: &'a str,
}

fn mail_username() -> Result<String, AppError> {
    std::env::var("MAIL_USERNAME")
        .map_err(|_| AppError::Email("MAIL_USERNAME not configured".to_string()))
}

fn build_transport() -> Result<AsyncSmtpTransport<Tokio1Executor>, AppError> {
    let username = mail_username()?;
    let password = std::env::var("MAIL_PASSWORD")
        .map_err(|_| AppError::Email("MAIL_PASSWORD not configured".to_string()))?;
    let host = std::env::var("MAIL_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string());
    let port: u16 = std::env::var("MAIL_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(587);

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
        .map_err(|e| AppError::Email(format!("SMTP transport error: {}", e)))?
        .port(port)
        .credentials(Credentials::new(username, password))
        .build();

    Ok(transport)
}

fn sender_mailbox() -> Result<Mailbox, AppError> {
    format!("{} <{}>", SENDER_NAME, mail_username()?)
        .parse()
        .map_err(|e| AppError::Email(format!("Invalid sender address: {}", e)))
}

fn recipient_mailbox(email: &str) -> Result<Mailbox, AppError> {
    email
        .parse()
        .map_err(|e| AppError::Email(format!("Invalid recipient address: {}", e)))
}

async fn send(message: Message) -> Result<(), AppError> {
    let transport = build_transport()?;

    transport
        .send(message)
        .await
        .map_err(|e| AppError::Email(format!("Failed to send email: {}", e)))?;

    Ok(())
}

pub async fn send_verification_code(email: &str, name: &str, code: &str) -> Result<(), AppError> {
    let message = Message::builder()
        .from(sender_mailbox()?)
        .to(recipient_mailbox(email)?)
        .subject("Verification code")
        .header(ContentType::TEXT_PLAIN)
        .body(format!(
            "Hello {}, your verification code is: {}",
            name, code
        ))
        .map_err(|e| AppError::Email(format!("Failed to build email: {}", e)))?;

    send(message).await?;

    log::info!("📧 Verification code sent to {}", email);
    Ok(())
}

pub async fn send_forgot_password_email(
    email: &str,
    name: &str,
    code: &str,
) -> Result<(), AppError> {
    let message = Message::builder()
        .from(sender_mailbox()?)
        .to(recipient_mailbox(email)?)
        .subject("Password Reset Request")
        .header(ContentType::TEXT_PLAIN)
        .body(format!(
            "Hello {},\n\nYou requested to reset your password. Please copy the code to reset it:\n\n{}\n\nIf you did not request this, please ignore this email.\n\nBest regards,\nCheck Out Buddy Team",
            name, code
        ))
        .map_err(|e| AppError::Email(format!("Failed to build email: {}", e)))?;

    send(message).await?;

    log::info!("📧 Password reset code sent to {}", email);
    Ok(())
}

pub(crate) fn render_receipt_html(receipt: &ReceiptEmail) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Receipt</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 20px; color: #333; }}
        .container {{ max-width: 600px; margin: auto; padding: 20px; border: 1px solid #ddd; border-radius: 8px; background-color: #f9f9f9; }}
        h1 {{ text-align: center; color: #333; }}
        .highlight {{ font-weight: bold; display: inline-block; width: 150px; }}
        .value {{ margin-left: 20px; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Receipt</h1>
        <p>Hello {name},</p>
        <p>Thank you for your purchase on {date}. Here is your receipt:</p>
        <hr>
        <div class="section">
            <p><span class="highlight">Product Name:</span><span class="value">{product_name}</span></p>
            <p><span class="highlight">Subtotal:</span><span class="value">${subtotal}</span></p>
            <p><span class="highlight">Tax (10%):</span><span class="value">${tax}</span></p>
            <p><span class="highlight">Total:</span><span class="value">${total}</span></p>
        </div>
        <hr>
        <div class="section">
            <p><span class="highlight">Payment Method:</span><span class="value">{payment_method}</span></p>
            <p><span class="highlight">Date:</span><span class="value">{date}</span></p>
        </div>
    </div>
</body>
</html>"#,
        name = receipt.name,
        date = receipt.date,
        product_name = receipt.product_name,
        subtotal = receipt.subtotal,
        tax = receipt.tax,
        total = receipt.total,
        payment_method = receipt.payment_method,
    )
}

/// HTML receipt email.
pub async fn send_receipt(receipt: &ReceiptEmail<'_>) -> Result<(), AppError> {
    let message = Message::builder()
        .from(sender_mailbox()?)
        .to(recipient_mailbox(receipt.email)?)
        .subject("Your Purchase Receipt")
        .header(ContentType::TEXT_HTML)
        .body(render_receipt_html(receipt))
        .map_err(|e| AppError::Email(format!("Failed to build email: {}", e)))?;

    send(message).await?;

    log::info!("📧 Receipt sent to {}", receipt.email);
    Ok(())
}

/// Receipt email with the rendered PDF attached.
pub async fn send_receipt_attachment(receipt: &ReceiptEmail<'_>) -> Result<(), AppError> {
    let pdf_bytes = render_receipt_pdf(&ReceiptDetails {
        product_name: receipt.product_name,
        subtotal: receipt.subtotal,
        tax: receipt.tax,
        total: receipt.total,
        payment_method: receipt.payment_method,
        date: receipt.date,
    })?;

    let attachment = Attachment::new("receipt.pdf".to_string()).body(
        pdf_bytes,
        "application/pdf"
            .parse()
            .map_err(|_| AppError::Email("Invalid attachment content type".to_string()))?,
    );

    let body_text = format!(
        "Hello {},\n\nPlease find your receipt attached.\n\nBest regards,\nThe Check Out Buddy Team",
        receipt.name
    );

    let message = Message::builder()
        .from(sender_mailbox()?)
        .to(recipient_mailbox(receipt.email)?)
        .subject("Your Purchase Receipt")
        .multipart(
            MultiPart::mixed()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(body_text),
                )
                .singlepart(attachment),
        )
        .map_err(|e| AppError::Email(format!("Failed to build email: {}", e)))?;

    send(message).await?;

    log::info!("📧 Receipt with PDF attachment sent to {}", receipt.email);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_html_contains_all_fields() {
        let receipt = ReceiptEmail {
            email: "a@b.com",
            name: "Ann",
            product_name: "Organic Oat Milk",
            subtotal: 4.5,
            tax: 0.45,
            total: 4.95,
            payment_method: "card",
            date: "2025-01-15",
        };

        let html = render_receipt_html(&receipt);
        assert!(html.contains("Hello Ann"));
        assert!(html.contains("Organic Oat Milk"));
        assert!(html.contains("$4.5"));
        assert!(html.contains("$4.95"));
        assert!(html.contains("card"));
        assert!(html.contains("2025-01-15"));
    }
}
