//! HTML error pages for browser-facing download routes

use msss_payments::PurchaseError;

/// Render the page shown when a download is refused or fails
pub fn error_page(error: &PurchaseError, support_email: Option<&str>) -> String {
    let (title, heading, footer) = match error {
        PurchaseError::Unauthenticated => (
            "Access Denied",
            "Access Denied",
            Footer::Link("/#book", "Purchase Mornings Shouldn't Suck →"),
        ),
        PurchaseError::PaymentNotVerified => ("Access Denied", "Access Denied", Footer::Support),
        PurchaseError::AddonNotPurchased => (
            "Access Denied",
            "Access Denied",
            Footer::Link("/#book", "Go back →"),
        ),
        PurchaseError::NotConfigured(_) => ("Error", "Download unavailable", Footer::Support),
        _ => ("Error", "Something went wrong", Footer::Support),
    };

    let message = match error {
        e if e.is_denial() => e.user_message().to_string(),
        PurchaseError::NotConfigured(_) => "This download has not been set up yet.".to_string(),
        _ => "Please try again.".to_string(),
    };

    let footer = match footer {
        Footer::Link(href, text) => format!(
            "<p><a href=\"{}\">{}</a></p>",
            escape_html(href),
            escape_html(text)
        ),
        Footer::Support => match support_email {
            Some(email) => format!("<p>Contact {} for help.</p>", escape_html(email)),
            None => "<p>Contact support for help.</p>".to_string(),
        },
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body style=\"font-family: system-ui; padding: 50px; text-align: center;\">\n\
         <h1>{heading}</h1>\n<p>{}</p>\n{footer}\n</body>\n</html>\n",
        escape_html(&message)
    )
}

enum Footer {
    Link(&'static str, &'static str),
    Support,
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_page_links_to_purchase() {
        let page = error_page(&PurchaseError::Unauthenticated, None);
        assert!(page.contains("You need to purchase the book to download it."));
        assert!(page.contains("href=\"/#book\""));
    }

    #[test]
    fn test_support_email_is_escaped() {
        let page = error_page(&PurchaseError::PaymentNotVerified, Some("<help>@x.com"));
        assert!(page.contains("&lt;help&gt;@x.com"));
        assert!(!page.contains("<help>"));
    }

    #[test]
    fn test_failure_page_hides_details() {
        let page = error_page(&PurchaseError::Gateway("secret detail".into()), None);
        assert!(page.contains("Something went wrong"));
        assert!(!page.contains("secret detail"));
    }
}
