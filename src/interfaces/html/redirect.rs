//! Auto-submitting form that sends the cardholder's browser to the issuer.

use quick_xml::escape::escape;

/// Form field names the issuer expects.
pub const PAYLOAD_FIELD: &str = "PaReq";
pub const RETURN_URL_FIELD: &str = "TermUrl";
pub const TRANSACTION_FIELD: &str = "MD";

/// Builds the HTML page that posts `payload` to `acs_url`.
///
/// Every value is escaped; the page works without script through the
/// visible submit button.
pub fn redirect_form(acs_url: &str, payload: &str, return_url: &str, transaction_id: &str) -> String {
    let mut html = String::with_capacity(payload.len() + 512);
    html.push_str("<!DOCTYPE html>\n<html>\n<head><title>Card authentication</title></head>\n");
    html.push_str("<body onload=\"document.forms[0].submit()\">\n");
    html.push_str(&format!(
        "<form name=\"downloadForm\" action=\"{}\" method=\"POST\">\n",
        escape(acs_url)
    ));
    for (name, value) in [
        (PAYLOAD_FIELD, payload),
        (RETURN_URL_FIELD, return_url),
        (TRANSACTION_FIELD, transaction_id),
    ] {
        html.push_str(&format!(
            "<input type=\"hidden\" name=\"{name}\" value=\"{}\">\n",
            escape(value)
        ));
    }
    html.push_str("<noscript><input type=\"submit\" value=\"Continue\"></noscript>\n");
    html.push_str("</form>\n</body>\n</html>\n");
    html
}
