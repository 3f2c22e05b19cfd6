use crate::domain::message::Message;
use crate::domain::ports::{DirectoryTransport, ErrorNotifier};
use crate::error::TransportError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const CONTENT_TYPE: &str = "text/xml; charset=utf-8";

fn transport_error(url: &str, err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::Http {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Posts protocol messages to directory servers over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDirectoryClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl DirectoryTransport for HttpDirectoryClient {
    async fn send_to_directory(&self, msg: &Message, url: &str) -> Result<Message, TransportError> {
        debug!(url, id = msg.id(), kind = %msg.kind(), "sending to directory");
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(msg.to_wire())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| transport_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Http {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|err| transport_error(url, err))?;
        Message::from_wire(&body).map_err(|err| TransportError::Decode {
            url: url.to_string(),
            reason: err.to_string(),
        })
    }
}

/// Fire-and-forget delivery of `Error` messages.
///
/// Each notification is posted from its own task; the caller never waits
/// and failures are only logged. A short-lived process calls [`drain`]
/// before exiting so that queued notifications are not dropped.
///
/// [`drain`]: HttpErrorNotifier::drain
#[derive(Debug)]
pub struct HttpErrorNotifier {
    client: reqwest::Client,
    timeout: Duration,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl HttpErrorNotifier {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Waits for every notification dispatched so far.
    pub async fn drain(&self) {
        let handles = std::mem::take(&mut *self.in_flight.lock());
        for handle in handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "error notification task failed");
            }
        }
    }
}

impl ErrorNotifier for HttpErrorNotifier {
    fn dispatch_error_notification(&self, url: &str, message: Message) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(url, id = message.id(), "no runtime, error notification dropped");
            return;
        };
        let request = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .body(message.to_wire())
            .timeout(self.timeout);
        let url = url.to_string();
        let id = message.id().to_string();
        let handle = runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(%url, %id, "error notification delivered");
                }
                Ok(response) => {
                    warn!(%url, %id, status = %response.status(), "error notification rejected");
                }
                Err(err) => {
                    warn!(%url, %id, error = %err, "error notification failed");
                }
            }
        });
        let mut in_flight = self.in_flight.lock();
        in_flight.retain(|handle| !handle.is_finished());
        in_flight.push(handle);
    }
}
