use crate::domain::ports::SignatureVerifier;
use crate::error::SignatureError;
use std::path::Path;
use tracing::debug;

/// Verifier used when no signature backend is wired in.
///
/// It never vouches for a document: a missing key store and a present one
/// both report the check as unavailable, which degrades the
/// authentication result instead of failing it.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSignatureVerifier;

impl SignatureVerifier for UnavailableSignatureVerifier {
    fn verify_signature(
        &self,
        document: &str,
        key_store_path: &str,
        _password: &str,
    ) -> Result<bool, SignatureError> {
        if key_store_path.is_empty() {
            return Err(SignatureError("no key store configured".to_string()));
        }
        if !Path::new(key_store_path).exists() {
            return Err(SignatureError(format!(
                "key store {key_store_path} not found"
            )));
        }
        debug!(len = document.len(), "no signature backend available");
        Err(SignatureError("no signature backend available".to_string()))
    }
}
