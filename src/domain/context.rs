use crate::domain::message::Message;

/// Request-scoped state threaded explicitly through one orchestration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub merchant_id: Option<String>,
    /// Authentication scheme, e.g. `ThreeDSecure`.
    pub protocol: String,
    /// Protocol version used for outbound messages.
    pub version: String,
}

impl RequestContext {
    pub fn new(protocol: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            merchant_id: None,
            protocol: protocol.into(),
            version: version.into(),
        }
    }

    /// Context for a local-interface request, honouring its `protocol` and
    /// `merchantID` fields when present.
    pub fn for_request(request: &Message, default_protocol: &str, version: &str) -> Self {
        let protocol = request
            .get_non_empty("protocol")
            .unwrap_or(default_protocol);
        let mut ctx = Self::new(protocol, version);
        ctx.merchant_id = request.get_non_empty("merchantID").map(str::to_string);
        ctx
    }
}

/// Newer protocol versions compare only the last four PAN digits.
pub fn version_masks_pan(version: &str) -> bool {
    version != crate::domain::message::VERSION_1_0_1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::{MessageType, VERSION_1_0_1, VERSION_1_0_2};

    #[test]
    fn test_for_request_reads_overrides() {
        let mut request = Message::new(MessageType::VerifyRequest, VERSION_1_0_2, "v1");
        request.set("merchantID", "m-1");
        request.set("protocol", "OtherScheme");
        let ctx = RequestContext::for_request(&request, "ThreeDSecure", VERSION_1_0_2);
        assert_eq!(ctx.protocol, "OtherScheme");
        assert_eq!(ctx.merchant_id.as_deref(), Some("m-1"));
    }

    #[test]
    fn test_pan_masking_by_version() {
        assert!(version_masks_pan(VERSION_1_0_2));
        assert!(!version_masks_pan(VERSION_1_0_1));
    }
}
