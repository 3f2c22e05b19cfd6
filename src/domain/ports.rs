//! Collaborators the engine depends on but does not implement itself.

use super::merchant::MerchantMeta;
use super::message::Message;
use crate::error::{CodecError, SignatureError, TransportError};
use async_trait::async_trait;
use std::sync::Arc;

/// Sends a protocol message to a directory server and returns its answer.
#[async_trait]
pub trait DirectoryTransport: Send + Sync {
    async fn send_to_directory(&self, msg: &Message, url: &str) -> Result<Message, TransportError>;
}

#[async_trait]
pub trait MerchantDirectory: Send + Sync {
    /// Returns `None` when the merchant is not known.
    async fn lookup_merchant_meta(&self, merchant_id: &str) -> Option<MerchantMeta>;
}

pub trait SignatureVerifier: Send + Sync {
    /// `Ok(false)` for a signature that does not verify, `Err` when the
    /// check could not be carried out.
    fn verify_signature(
        &self,
        document: &str,
        key_store_path: &str,
        password: &str,
    ) -> Result<bool, SignatureError>;
}

/// Compression used for challenge messages carried through the browser.
pub trait PayloadCodec: Send + Sync {
    fn compress(&self, document: &str) -> Result<Vec<u8>, CodecError>;
    fn decompress(&self, bytes: &[u8]) -> Result<String, CodecError>;
}

/// Best-effort delivery of `Error` messages to a counterpart.
///
/// Implementations must not block the caller; failures are logged only.
pub trait ErrorNotifier: Send + Sync {
    fn dispatch_error_notification(&self, url: &str, message: Message);
}

pub type DirectoryTransportBox = Box<dyn DirectoryTransport>;
pub type MerchantDirectoryBox = Box<dyn MerchantDirectory>;
pub type SignatureVerifierBox = Box<dyn SignatureVerifier>;
pub type PayloadCodecBox = Box<dyn PayloadCodec>;
/// Shared between the orchestrator and the pending transaction cache.
pub type ErrorNotifierRef = Arc<dyn ErrorNotifier>;
