use crate::domain::message::Message;

/// State kept between the redirect to the issuer and the issuer's answer.
///
/// Created when the challenge is issued and consumed exactly once when the
/// matching challenge response arrives, unless the TTL sweep gets it first.
#[derive(Debug, PartialEq, Clone)]
pub struct CachedTransaction {
    pub enrollment_request: Message,
    pub challenge_request: Message,
    pub acs_url: String,
    pub merchant_data: Option<String>,
    pub merchant_url: String,
    pub protocol: String,
}

impl CachedTransaction {
    pub fn pan(&self) -> Option<&str> {
        self.enrollment_request.get("pan")
    }

    pub fn xid(&self) -> Option<&str> {
        self.challenge_request.get("xid")
    }
}
