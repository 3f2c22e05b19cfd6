#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tds_mpi::application::orchestrator::{AuthenticationOrchestrator, Collaborators};
use tds_mpi::application::registry::Registry;
use tds_mpi::config::Config;
use tds_mpi::domain::merchant::MerchantMeta;
use tds_mpi::domain::message::{Message, MessageType, VERSION_1_0_2};
use tds_mpi::domain::ports::{DirectoryTransport, ErrorNotifier, SignatureVerifier};
use tds_mpi::error::{SignatureError, TransportError};
use tds_mpi::infrastructure::codec::{DeflateCodec, encode_payload};
use tds_mpi::infrastructure::merchants::InMemoryMerchantDirectory;
use tds_mpi::infrastructure::range_cache::EnrollmentRangeCache;

pub const PROTOCOL: &str = "ThreeDSecure";
pub const DS_PRIMARY: &str = "https://ds1.example.com/ds";
pub const DS_BACKUP: &str = "https://ds2.example.com/ds";
pub const ACS_URL: &str = "https://acs.example.com/pa";
pub const ENROLLED_PAN: &str = "4111111111111111";
pub const CAVV: &str = "AAABBBCCCDDDEEEFFFGGGHHHIII=";

type Responder = dyn Fn(&Message, &str) -> Result<Message, TransportError> + Send + Sync;

/// Directory fake answering through a closure and recording every call.
#[derive(Clone)]
pub struct ScriptedDirectory {
    responder: Arc<Responder>,
    delay: Option<Duration>,
    pub calls: Arc<Mutex<Vec<(String, Message)>>>,
}

impl ScriptedDirectory {
    pub fn new(
        responder: impl Fn(&Message, &str) -> Result<Message, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Arc::new(responder),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answers every enrollment request for `ENROLLED_PAN` with `enrolled`.
    pub fn enrollment(enrolled: &'static str) -> Self {
        Self::new(move |request, _url| Ok(enrollment_response(request, enrolled)))
    }

    pub fn unreachable() -> Self {
        Self::new(|_request, url| {
            Err(TransportError::Http {
                url: url.to_string(),
                reason: "connection refused".to_string(),
            })
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn urls_called(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(url, _)| url.clone()).collect()
    }
}

#[async_trait]
impl DirectoryTransport for ScriptedDirectory {
    async fn send_to_directory(&self, msg: &Message, url: &str) -> Result<Message, TransportError> {
        self.calls.lock().push((url.to_string(), msg.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(msg, url)
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<(String, Message)>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, Message)> {
        self.sent.lock().clone()
    }
}

impl ErrorNotifier for RecordingNotifier {
    fn dispatch_error_notification(&self, url: &str, message: Message) {
        self.sent.lock().push((url.to_string(), message));
    }
}

#[derive(Clone, Copy)]
pub enum Verdict {
    Valid,
    Invalid,
    Unavailable,
}

pub struct StaticVerifier(pub Verdict);

impl SignatureVerifier for StaticVerifier {
    fn verify_signature(
        &self,
        _document: &str,
        _key_store_path: &str,
        _password: &str,
    ) -> Result<bool, SignatureError> {
        match self.0 {
            Verdict::Valid => Ok(true),
            Verdict::Invalid => Ok(false),
            Verdict::Unavailable => Err(SignatureError("key store locked".to_string())),
        }
    }
}

pub fn merchant() -> MerchantMeta {
    MerchantMeta {
        merchant_id: "m-1".to_string(),
        acquirer_bin: "412345".to_string(),
        password: Some("secret".to_string()),
        name: "Example Shop".to_string(),
        country_code: "840".to_string(),
        default_currency: "840".to_string(),
        default_url: "https://shop.example.com".to_string(),
    }
}

pub fn config() -> Config {
    let mut config = Config::default();
    config.directories = HashMap::from([(
        PROTOCOL.to_string(),
        vec![DS_PRIMARY.to_string(), DS_BACKUP.to_string()],
    )]);
    config.incomplete_notification_url = Some("https://mpi.example.com/incomplete".to_string());
    config.merchants = vec![merchant()];
    config
}

pub struct Harness {
    pub orchestrator: AuthenticationOrchestrator,
    pub directory: ScriptedDirectory,
    pub notifier: RecordingNotifier,
    pub ranges: Arc<EnrollmentRangeCache>,
}

pub fn harness(directory: ScriptedDirectory, verdict: Verdict) -> Harness {
    harness_with(config(), directory, verdict)
}

pub fn harness_with(config: Config, directory: ScriptedDirectory, verdict: Verdict) -> Harness {
    let notifier = RecordingNotifier::default();
    let ranges = Arc::new(EnrollmentRangeCache::new());
    let collaborators = Collaborators {
        directory: Box::new(directory.clone()),
        merchants: Box::new(InMemoryMerchantDirectory::from_merchants(
            config.merchants.clone(),
        )),
        verifier: Box::new(StaticVerifier(verdict)),
        codec: Box::new(DeflateCodec::new()),
        notifier: Arc::new(notifier.clone()),
    };
    let orchestrator = AuthenticationOrchestrator::new(
        config,
        Arc::new(Registry::standard()),
        Arc::clone(&ranges),
        collaborators,
    );
    Harness {
        orchestrator,
        directory,
        notifier,
        ranges,
    }
}

pub fn verify_request(pan: &str) -> Message {
    let mut msg = Message::new(MessageType::VerifyRequest, VERSION_1_0_2, "verify-1");
    msg.set("merchantID", "m-1");
    msg.set("pan", pan);
    msg.set("expiry", "2912");
    msg.set("purchAmount", "1234");
    msg.set("currency", "840");
    msg.set("exponent", "2");
    msg.set("desc", "Two books & a pen");
    msg.set("merchantData", "order-77");
    msg.set("merchantURL", "https://shop.example.com/return");
    msg
}

pub fn enrollment_response(request: &Message, enrolled: &str) -> Message {
    let mut msg = Message::new(MessageType::EnrollmentResponse, request.version(), request.id());
    msg.set("enrolled", enrolled);
    if enrolled == "Y" {
        msg.set("acctID", "acct-0001");
        msg.set("url", ACS_URL);
        msg.push("protocol", PROTOCOL);
    }
    msg
}

/// The issuer's answer to `challenge`, echoing its purchase fields.
pub fn challenge_response(challenge: &Message, status: &str) -> Message {
    let mut msg = Message::new(MessageType::ChallengeResponse, challenge.version(), challenge.id());
    for name in ["acqBIN", "merID", "xid", "date", "purchAmount", "currency", "exponent"] {
        msg.set(name, challenge.get(name).unwrap_or_default());
    }
    msg.set("time", "20240101 10:05:00");
    msg.set("status", status);
    if matches!(status, "Y" | "A") {
        msg.set("pan", "0000000000001111");
        msg.set("cavv", CAVV);
        msg.set("eci", "05");
        msg.set("cavvAlgorithm", "2");
    } else {
        msg.set("pan", "0000000000000000");
    }
    msg
}

pub fn auth_request(transaction_id: &str, answer: &Message) -> Message {
    let payload = encode_payload(&DeflateCodec::new(), &answer.to_wire()).unwrap();
    let mut msg = Message::new(MessageType::AuthRequest, VERSION_1_0_2, "auth-1");
    msg.set("transactionID", transaction_id);
    msg.set("paRes", payload);
    msg
}

/// Value of a hidden input in the redirect page.
pub fn form_value(html: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\" value=\"");
    let start = html.find(&marker)? + marker.len();
    let end = html[start..].find('"')? + start;
    Some(html[start..end].to_string())
}

/// Runs the first leg for an enrolled card and returns the verify response
/// together with the challenge request that was cached.
pub async fn issue_challenge(harness: &Harness) -> (Message, Message) {
    let response = harness
        .orchestrator
        .verify_enrollment(verify_request(ENROLLED_PAN))
        .await
        .unwrap();
    let transaction_id = response.get("transactionID").unwrap().to_string();
    let cached = harness
        .orchestrator
        .pending()
        .get_cached_item(&transaction_id)
        .await
        .unwrap();
    (response, cached.challenge_request.clone())
}
