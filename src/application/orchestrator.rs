//! End-to-end authentication flow on top of the protocol engine.
//!
//! A verify-request either completes immediately (not enrolled, unavailable)
//! or leaves a pending transaction behind and hands the merchant a redirect
//! page. The auth-request that comes back through the browser is matched
//! against that pending transaction before the result is released.

use super::engine::ProtocolEngine;
use super::registry::Registry;
use super::transform::display_amount;
use crate::config::{Config, ValueEncoding};
use crate::domain::card_range::CardRange;
use crate::domain::context::{RequestContext, version_masks_pan};
use crate::domain::merchant::MerchantMeta;
use crate::domain::message::reference::currency_exponent;
use crate::domain::message::{Message, MessageType};
use crate::domain::ports::{
    DirectoryTransportBox, ErrorNotifierRef, MerchantDirectoryBox, PayloadCodecBox,
    SignatureVerifierBox,
};
use crate::domain::transaction::CachedTransaction;
use crate::error::{ErrorKind, ProtocolError};
use crate::infrastructure::codec::{decode_payload, encode_payload};
use crate::infrastructure::pending::PendingTransactionCache;
use crate::infrastructure::range_cache::{EnrollmentRangeCache, RangeCacheError};
use crate::interfaces::html::redirect::redirect_form;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where one authentication attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Start,
    RangeChecked,
    EnrollmentRequested,
    NotEnrolled,
    Unavailable,
    Enrolled,
    ChallengeIssued,
    ChallengeAnswered,
    ResultMatched,
    Done,
    Failed,
}

impl AuthState {
    pub fn can_advance_to(self, next: AuthState) -> bool {
        use AuthState::*;
        match (self, next) {
            (Done | Failed, _) => false,
            (_, Failed) => true,
            (Start, RangeChecked)
            | (RangeChecked, EnrollmentRequested | NotEnrolled)
            | (EnrollmentRequested, NotEnrolled | Unavailable | Enrolled)
            | (Enrolled, ChallengeIssued)
            | (NotEnrolled | Unavailable | ChallengeIssued, Done)
            | (ChallengeIssued, ChallengeAnswered)
            | (ChallengeAnswered, ResultMatched | Done)
            | (ResultMatched, Done) => true,
            _ => false,
        }
    }
}

/// State of one call, logged on every transition.
#[derive(Debug)]
struct Flow {
    request_id: String,
    transaction_id: Option<String>,
    state: AuthState,
}

impl Flow {
    fn new(request_id: &str, state: AuthState) -> Self {
        Self {
            request_id: request_id.to_string(),
            transaction_id: None,
            state,
        }
    }

    fn advance(&mut self, next: AuthState) -> Result<(), ProtocolError> {
        if !self.state.can_advance_to(next) {
            error!(request_id = %self.request_id, from = ?self.state, to = ?next, "illegal state transition");
            return Err(ProtocolError::internal(
                &self.request_id,
                format!("illegal transition {:?} -> {next:?}", self.state),
            ));
        }
        debug!(
            request_id = %self.request_id,
            transaction_id = self.transaction_id.as_deref().unwrap_or(""),
            from = ?self.state,
            to = ?next,
            "state transition"
        );
        self.state = next;
        Ok(())
    }

    fn fail(&mut self, err: ProtocolError) -> ProtocolError {
        warn!(
            request_id = %self.request_id,
            transaction_id = self.transaction_id.as_deref().unwrap_or(""),
            state = ?self.state,
            code = %err.code,
            error = %err,
            "authentication failed"
        );
        self.state = AuthState::Failed;
        err
    }
}

/// External collaborators of the orchestrator.
pub struct Collaborators {
    pub directory: DirectoryTransportBox,
    pub merchants: MerchantDirectoryBox,
    pub verifier: SignatureVerifierBox,
    pub codec: PayloadCodecBox,
    pub notifier: ErrorNotifierRef,
}

pub struct AuthenticationOrchestrator {
    engine: ProtocolEngine,
    config: Config,
    ranges: Arc<EnrollmentRangeCache>,
    pending: PendingTransactionCache,
    directory: DirectoryTransportBox,
    merchants: MerchantDirectoryBox,
    verifier: SignatureVerifierBox,
    codec: PayloadCodecBox,
    notifier: ErrorNotifierRef,
}

impl AuthenticationOrchestrator {
    /// Creates a new `AuthenticationOrchestrator`.
    ///
    /// # Arguments
    ///
    /// * `config` - Directory URLs, timeouts, TTL and output encodings.
    /// * `registry` - Message handlers shared with the protocol engine.
    /// * `ranges` - Enrolled card ranges, possibly shared with a refresher.
    /// * `collaborators` - Transport, merchant lookup, signature, codec and notifier.
    pub fn new(
        config: Config,
        registry: Arc<Registry>,
        ranges: Arc<EnrollmentRangeCache>,
        collaborators: Collaborators,
    ) -> Self {
        let pending = PendingTransactionCache::new(
            config.pending_ttl(),
            Arc::clone(&collaborators.notifier),
            config.incomplete_notification_url.clone(),
        );
        Self {
            engine: ProtocolEngine::new(registry),
            config,
            ranges,
            pending,
            directory: collaborators.directory,
            merchants: collaborators.merchants,
            verifier: collaborators.verifier,
            codec: collaborators.codec,
            notifier: collaborators.notifier,
        }
    }

    pub fn engine(&self) -> &ProtocolEngine {
        &self.engine
    }

    pub fn ranges(&self) -> &EnrollmentRangeCache {
        &self.ranges
    }

    pub fn pending(&self) -> &PendingTransactionCache {
        &self.pending
    }

    /// Parses a local-interface document, runs it and renders the answer.
    pub async fn handle_document(&self, document: &str) -> String {
        match Message::from_wire(document) {
            Ok(request) => self.handle(request).await.to_wire(),
            Err(err) => {
                warn!(error = %err, "request document rejected");
                err.to_local_message(&self.config.protocol_version).to_wire()
            }
        }
    }

    /// Runs one local-interface request. Always answers with either the
    /// success message or a local error message.
    pub async fn handle(&self, request: Message) -> Message {
        let version = request.version().to_string();
        let transaction_id = request.get_non_empty("transactionID").map(str::to_string);
        let result = match request.kind() {
            MessageType::VerifyRequest => self.verify_enrollment(request).await,
            MessageType::AuthRequest => self.authenticate(request).await,
            other => Err(ProtocolError::new(ErrorKind::UnsupportedMessage, request.id())
                .with_detail(format!("{other} is not a merchant request"))),
        };
        match result {
            Ok(response) => response,
            Err(err) => {
                let mut msg = err.to_local_message(&version);
                msg.set_opt("transactionID", transaction_id);
                msg
            }
        }
    }

    /// First leg: enrollment check and, for enrolled cards, the redirect
    /// to the issuer.
    pub async fn verify_enrollment(&self, request: Message) -> Result<Message, ProtocolError> {
        let mut flow = Flow::new(request.id(), AuthState::Start);
        let result = self.run_verify(&mut flow, request).await;
        result.map_err(|err| flow.fail(err))
    }

    /// Second leg: the issuer's answer carried back through the browser.
    pub async fn authenticate(&self, request: Message) -> Result<Message, ProtocolError> {
        let mut flow = Flow::new(request.id(), AuthState::ChallengeIssued);
        let result = self.run_authenticate(&mut flow, request).await;
        result.map_err(|err| flow.fail(err))
    }

    /// Fetches the card range delta for `protocol` from the directory and
    /// applies it. Returns `false` when the delta was already applied.
    pub async fn refresh_card_ranges(
        &self,
        protocol: &str,
        merchant_id: &str,
    ) -> Result<bool, ProtocolError> {
        let mut ctx = RequestContext::new(protocol, &self.config.protocol_version);
        ctx.merchant_id = Some(merchant_id.to_string());

        let mut request = Message::with_new_id(MessageType::CardRangeRequest, &ctx.version);
        let merchant = self.merchant_meta(request.id(), merchant_id).await?;
        fill_merchant_credentials(&mut request, &merchant);
        request.set_opt("serialNumber", self.ranges.serial_number(protocol));
        self.engine.validate(&request)?;

        let (response, url) = self
            .exchange(&ctx, &request, MessageType::CardRangeResponse)
            .await?;
        let ranges = response
            .records("CR")
            .iter()
            .map(CardRange::from_record)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| ProtocolError::invalid(response.id(), "CR", "unreadable card range"))?;
        // Without a serial number every response counts as a new delta.
        let serial_number = response
            .get_non_empty("serialNumber")
            .unwrap_or(response.id());

        match self.ranges.apply_delta(protocol, serial_number, &ranges) {
            Ok(applied) => Ok(applied),
            Err(RangeCacheError::InvalidDelta(reason)) => {
                let err = ProtocolError::inconsistent(response.id(), "CR", reason);
                self.notify(&url, &err, &ctx.version);
                Err(err)
            }
        }
    }

    async fn run_verify(&self, flow: &mut Flow, request: Message) -> Result<Message, ProtocolError> {
        expect_kind(&request, MessageType::VerifyRequest)?;
        let ctx = RequestContext::for_request(
            &request,
            &self.config.default_protocol,
            &self.config.protocol_version,
        );
        let request = self.engine.process(request, &ctx)?;

        let pan = request.get("pan").unwrap_or_default();
        flow.advance(AuthState::RangeChecked)?;
        if self.ranges.is_loaded(&ctx.protocol) {
            if !self.ranges.verify_card(&ctx.protocol, pan) {
                info!(request_id = request.id(), protocol = %ctx.protocol, "card outside enrolled ranges");
                flow.advance(AuthState::NotEnrolled)?;
                let response = self.not_enrolled_response(&request)?;
                flow.advance(AuthState::Done)?;
                return Ok(response);
            }
        } else {
            debug!(protocol = %ctx.protocol, "no card ranges loaded, asking directory");
        }

        let merchant_id = ctx.merchant_id.as_deref().unwrap_or_default();
        let merchant = self.merchant_meta(request.id(), merchant_id).await?;
        let mut enrollment_request = self
            .engine
            .transform(&request, MessageType::EnrollmentRequest)?;
        enrollment_request.set_version(&ctx.version);
        fill_merchant_credentials(&mut enrollment_request, &merchant);
        self.engine.validate(&enrollment_request)?;

        flow.advance(AuthState::EnrollmentRequested)?;
        let (enrollment_response, _url) = self
            .exchange(&ctx, &enrollment_request, MessageType::EnrollmentResponse)
            .await?;

        match enrollment_response.get("enrolled") {
            Some("Y") => flow.advance(AuthState::Enrolled)?,
            Some("N") => flow.advance(AuthState::NotEnrolled)?,
            _ => flow.advance(AuthState::Unavailable)?,
        }
        if flow.state != AuthState::Enrolled {
            let mut response = self
                .engine
                .transform(&enrollment_response, MessageType::VerifyResponse)?;
            self.engine.transform_into(&request, &mut response)?;
            response.set_version(request.version());
            flow.advance(AuthState::Done)?;
            return Ok(response);
        }

        let response = self
            .issue_challenge(flow, &ctx, &request, &merchant, enrollment_request, enrollment_response)
            .await?;
        flow.advance(AuthState::Done)?;
        Ok(response)
    }

    fn not_enrolled_response(&self, request: &Message) -> Result<Message, ProtocolError> {
        let mut response = self
            .engine
            .transform(request, MessageType::VerifyResponse)?;
        response.set("enrolled", "N");
        response.set("iReqCode", "000");
        response.set("iReqDetail", "card not in an enrolled range");
        Ok(response)
    }

    async fn issue_challenge(
        &self,
        flow: &mut Flow,
        ctx: &RequestContext,
        request: &Message,
        merchant: &MerchantMeta,
        enrollment_request: Message,
        enrollment_response: Message,
    ) -> Result<Message, ProtocolError> {
        let mut challenge = self
            .engine
            .transform(request, MessageType::ChallengeRequest)?;
        self.engine
            .transform_into(&enrollment_response, &mut challenge)?;
        challenge.set_version(&ctx.version);
        fill_purchase_defaults(&mut challenge, merchant);
        self.engine.validate(&challenge)?;

        let acs_url = enrollment_response
            .get_non_empty("url")
            .ok_or_else(|| ProtocolError::missing(enrollment_response.id(), "url"))?
            .to_string();
        let merchant_url = request
            .get_non_empty("merchantURL")
            .or(Some(merchant.default_url.as_str()).filter(|url| !url.is_empty()))
            .or(self.config.term_url.as_deref())
            .ok_or_else(|| ProtocolError::missing(request.id(), "merchantURL"))?
            .to_string();

        let payload = encode_payload(self.codec.as_ref(), &challenge.to_wire())
            .map_err(|err| ProtocolError::internal(challenge.id(), err.to_string()))?;
        let transaction_id = new_transaction_id();
        flow.transaction_id = Some(transaction_id.clone());

        let mut response = self
            .engine
            .transform(&enrollment_response, MessageType::VerifyResponse)?;
        self.engine.transform_into(request, &mut response)?;
        response.set_version(request.version());
        response.set("transactionID", &transaction_id);
        response.set(
            "htmlForm",
            redirect_form(&acs_url, &payload, &merchant_url, &transaction_id),
        );

        self.pending
            .add_item(
                transaction_id.clone(),
                CachedTransaction {
                    enrollment_request,
                    challenge_request: challenge,
                    acs_url,
                    merchant_data: request.get_non_empty("merchantData").map(str::to_string),
                    merchant_url,
                    protocol: ctx.protocol.clone(),
                },
            )
            .await;
        flow.advance(AuthState::ChallengeIssued)?;
        info!(%transaction_id, "challenge issued");
        Ok(response)
    }

    async fn run_authenticate(
        &self,
        flow: &mut Flow,
        request: Message,
    ) -> Result<Message, ProtocolError> {
        expect_kind(&request, MessageType::AuthRequest)?;
        let ctx = RequestContext::for_request(
            &request,
            &self.config.default_protocol,
            &self.config.protocol_version,
        );
        let request = self.engine.process(request, &ctx)?;
        let transaction_id = request.get("transactionID").unwrap_or_default().to_string();
        flow.transaction_id = Some(transaction_id.clone());

        let document = decode_payload(self.codec.as_ref(), request.get("paRes").unwrap_or_default())
            .map_err(|err| ProtocolError::invalid(request.id(), "paRes", err.to_string()))?;
        let answer = Message::from_wire(&document)?;
        flow.advance(AuthState::ChallengeAnswered)?;

        if answer.kind() == MessageType::Error {
            let answer = self.engine.process(answer, &ctx)?;
            info!(%transaction_id, code = answer.get("errorCode").unwrap_or_default(), "issuer returned an error");
            let mut response = self.engine.transform(&answer, MessageType::LocalError)?;
            response.set_version(request.version());
            response.set("transactionID", &transaction_id);
            flow.advance(AuthState::Done)?;
            return Ok(response);
        }
        expect_kind(&answer, MessageType::ChallengeResponse)?;

        let signature_verified = self.check_signature(&document, answer.id());
        let answer = self.engine.process(answer, &ctx)?;

        let cached = self
            .pending
            .get_cached_item(&transaction_id)
            .await
            .ok_or_else(|| unknown_transaction(request.id(), &transaction_id))?;
        if let Err(err) = match_challenge(&cached, &answer) {
            self.notify(&cached.acs_url, &err, answer.version());
            return Err(err);
        }
        if self.pending.remove_item(&transaction_id).await.is_none() {
            return Err(unknown_transaction(request.id(), &transaction_id));
        }
        flow.advance(AuthState::ResultMatched)?;

        let mut response = self.engine.transform(&answer, MessageType::AuthResponse)?;
        response.set_version(request.version());
        response.set("transactionID", &transaction_id);
        response.set_opt("merchantData", cached.merchant_data.clone());
        response.set("merchantURL", &cached.merchant_url);
        self.reencode(&mut response)?;
        if !signature_verified {
            response.set("status", "U");
            for name in ["cavv", "eci", "cavvAlgorithm"] {
                response.remove(name);
            }
        }
        flow.advance(AuthState::Done)?;
        info!(
            %transaction_id,
            status = response.get("status").unwrap_or_default(),
            "authentication complete"
        );
        Ok(response)
    }

    async fn merchant_meta(
        &self,
        request_id: &str,
        merchant_id: &str,
    ) -> Result<MerchantMeta, ProtocolError> {
        self.merchants
            .lookup_merchant_meta(merchant_id)
            .await
            .ok_or_else(|| {
                ProtocolError::invalid(
                    request_id,
                    "merchantID",
                    format!("unknown merchant {merchant_id}"),
                )
            })
    }

    /// Sends `request` to the directory and checks the answer: an `Error`
    /// from the directory is surfaced, anything unexpected is reported back.
    async fn exchange(
        &self,
        ctx: &RequestContext,
        request: &Message,
        expected: MessageType,
    ) -> Result<(Message, String), ProtocolError> {
        let (response, url) = self.send_to_directories(ctx, request).await?;

        if response.kind() == MessageType::Error {
            let response = self.engine.process(response, ctx)?;
            return Err(error_from_message(&response));
        }
        let checked = if response.kind() != expected {
            Err(
                ProtocolError::new(ErrorKind::UnsupportedMessage, response.id()).with_detail(
                    format!("expected {expected}, received {}", response.kind()),
                ),
            )
        } else if response.id() != request.id() {
            Err(ProtocolError::new(ErrorKind::MatchMismatch, response.id())
                .with_field("Message/@id")
                .with_detail(format!("response to unknown request, expected {}", request.id())))
        } else {
            self.engine.process(response, ctx)
        };
        match checked {
            Ok(response) => Ok((response, url)),
            Err(err) => {
                self.notify(&url, &err, &ctx.version);
                Err(err)
            }
        }
    }

    /// Tries each configured directory in order.
    async fn send_to_directories(
        &self,
        ctx: &RequestContext,
        request: &Message,
    ) -> Result<(Message, String), ProtocolError> {
        let urls = self.config.directory_urls_for(&ctx.protocol);
        let timeout = self.config.directory_timeout();
        for url in urls {
            match tokio::time::timeout(timeout, self.directory.send_to_directory(request, url)).await {
                Ok(Ok(response)) => {
                    debug!(%url, id = response.id(), kind = %response.kind(), "directory answered");
                    return Ok((response, url.clone()));
                }
                Ok(Err(err)) => warn!(%url, error = %err, "directory request failed"),
                Err(_) => warn!(%url, ?timeout, "directory request timed out"),
            }
        }

        let err = ProtocolError::new(ErrorKind::DirectoryUnreachable, request.id()).with_detail(
            format!("no directory for {} answered", ctx.protocol),
        );
        if let Some(url) = urls.first() {
            self.notify(url, &err, &ctx.version);
        }
        Err(err)
    }

    fn check_signature(&self, document: &str, id: &str) -> bool {
        let (path, password) = self
            .config
            .key_store
            .as_ref()
            .map_or(("", ""), |key_store| {
                (key_store.path.as_str(), key_store.password.as_str())
            });
        match self.verifier.verify_signature(document, path, password) {
            Ok(true) => true,
            Ok(false) => {
                warn!(id, "issuer signature does not verify, result degraded");
                false
            }
            Err(err) => {
                let err = ProtocolError::new(ErrorKind::SignatureUnavailable, id)
                    .with_detail(err.to_string());
                warn!(error = %err, "result degraded");
                false
            }
        }
    }

    fn reencode(&self, response: &mut Message) -> Result<(), ProtocolError> {
        for (name, encoding) in [
            ("cavv", self.config.cavv_encoding),
            ("xid", self.config.xid_encoding),
        ] {
            if encoding == ValueEncoding::Hex
                && let Some(value) = response.get_non_empty(name)
            {
                let bytes = STANDARD
                    .decode(value)
                    .map_err(|err| ProtocolError::invalid(response.id(), name, err.to_string()))?;
                response.set(name, hex::encode(bytes));
            }
        }
        Ok(())
    }

    fn notify(&self, url: &str, err: &ProtocolError, version: &str) {
        debug!(url, code = %err.code, id = %err.id, "dispatching error notification");
        self.notifier
            .dispatch_error_notification(url, err.to_message(version));
    }
}

fn expect_kind(msg: &Message, kind: MessageType) -> Result<(), ProtocolError> {
    if msg.kind() == kind {
        return Ok(());
    }
    Err(
        ProtocolError::new(ErrorKind::UnsupportedMessage, msg.id())
            .with_detail(format!("expected {kind}, received {}", msg.kind())),
    )
}

fn unknown_transaction(request_id: &str, transaction_id: &str) -> ProtocolError {
    ProtocolError::new(ErrorKind::UnknownTransaction, request_id)
        .with_field("transactionID")
        .with_detail(format!("no pending transaction {transaction_id}"))
}

fn error_from_message(msg: &Message) -> ProtocolError {
    let mut err = ProtocolError::new(ErrorKind::UnexpectedInternal, msg.id());
    if let Some(code) = msg.get_non_empty("errorCode") {
        err.code = code.to_string();
    }
    if let Some(short_msg) = msg.get_non_empty("errorMessage") {
        err.short_msg = short_msg.to_string();
    }
    err.detail = msg.get_non_empty("errorDetail").map(str::to_string);
    err.vendor_code = msg.get_non_empty("vendorCode").map(str::to_string);
    err
}

fn fill_merchant_credentials(msg: &mut Message, merchant: &MerchantMeta) {
    msg.set("acqBIN", &merchant.acquirer_bin);
    msg.set("merID", &merchant.merchant_id);
    msg.set_opt("password", merchant.password.clone());
}

fn fill_purchase_defaults(challenge: &mut Message, merchant: &MerchantMeta) {
    challenge.set("acqBIN", &merchant.acquirer_bin);
    challenge.set("merID", &merchant.merchant_id);
    challenge.set("name", &merchant.name);
    challenge.set("country", &merchant.country_code);
    challenge.set("url", &merchant.default_url);
    if challenge.get_non_empty("currency").is_none() {
        challenge.set("currency", &merchant.default_currency);
    }
    if challenge.get_non_empty("exponent").is_none()
        && let Some(exponent) = challenge.get("currency").and_then(currency_exponent)
    {
        challenge.set("exponent", exponent.to_string());
    }
    challenge.set("xid", new_xid());
    challenge.set("date", purchase_date());

    let amount = display_amount(
        challenge.get("purchAmount").unwrap_or_default(),
        challenge.get("currency").unwrap_or_default(),
        challenge.get("exponent").unwrap_or_default(),
    );
    challenge.set_opt("amount", amount);
}

/// The cached PAN against the one echoed by the issuer. Newer versions echo
/// only the last four digits, left-padded with zeros.
fn pan_matches(cached: &str, echoed: &str, version: &str) -> bool {
    if !version_masks_pan(version) {
        return cached == echoed;
    }
    let last4 = &cached[cached.len().saturating_sub(4)..];
    let Some(padding) = echoed.strip_suffix(last4) else {
        return false;
    };
    padding.bytes().all(|b| b == b'0')
}

const MATCHED_FIELDS: [&str; 7] = [
    "acqBIN",
    "merID",
    "xid",
    "date",
    "purchAmount",
    "currency",
    "exponent",
];

/// Checks the challenge response against the request that was sent.
pub fn match_challenge(cached: &CachedTransaction, answer: &Message) -> Result<(), ProtocolError> {
    let challenge = &cached.challenge_request;
    let mismatch = |path: String, detail: String| {
        ProtocolError::new(ErrorKind::MatchMismatch, answer.id())
            .with_field(path)
            .with_detail(detail)
    };

    if answer.id() != challenge.id() {
        return Err(mismatch(
            "Message/@id".to_string(),
            format!("expected {}", challenge.id()),
        ));
    }
    let schema = crate::domain::message::schema::schema_for(MessageType::ChallengeResponse);
    for name in MATCHED_FIELDS {
        if answer.get(name) != challenge.get(name) {
            return Err(mismatch(
                schema.path_of(name),
                "differs from the challenge request".to_string(),
            ));
        }
    }
    // U and N carry an all-zero PAN by definition.
    if matches!(answer.get("status"), Some("Y" | "A")) {
        let cached_pan = cached.pan().unwrap_or_default();
        let echoed = answer.get("pan").unwrap_or_default();
        if !pan_matches(cached_pan, echoed, answer.version()) {
            return Err(mismatch(
                "pan".to_string(),
                "does not match the enrolled card".to_string(),
            ));
        }
    }
    Ok(())
}

fn new_transaction_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Purchase id: 20 random bytes, base64.
fn new_xid() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

fn purchase_date() -> String {
    chrono::Utc::now().format("%Y%m%d %H:%M:%S").to_string()
}
