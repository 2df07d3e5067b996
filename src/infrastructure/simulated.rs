use crate::domain::payment::{PaymentOutcome, PaymentReceipt, PaymentRequest};
use crate::domain::ports::PaymentGateway;
use crate::domain::session::Session;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time;

/// What the simulated gateway does with each submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayBehavior {
    /// Settle successfully.
    Approve,
    /// Settle with `success: false` and the given server message.
    Decline(Option<String>),
    /// Fail at the transport level before producing a receipt.
    FailTransport,
}

/// In-process stand-in for the payment-submission collaborator.
///
/// The real platform charges cards behind an HTTP API; here the whole
/// exchange is simulated with a configurable latency and outcome. The
/// session credential is injected at construction and checked per call, the
/// same contract a real transport adapter would honor.
pub struct SimulatedGateway {
    session: Session,
    behavior: GatewayBehavior,
    latency: Duration,
    latency_schedule: Mutex<VecDeque<Duration>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<PaymentRequest>>,
}

impl SimulatedGateway {
    pub fn new(session: Session, behavior: GatewayBehavior, latency: Duration) -> Self {
        Self {
            session,
            behavior,
            latency,
            latency_schedule: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Per-call latencies consumed in order before falling back to the
    /// default, so one slow call can be scripted ahead of fast ones.
    pub fn with_latency_schedule(self, schedule: Vec<Duration>) -> Self {
        if let Ok(mut queue) = self.latency_schedule.lock() {
            queue.extend(schedule);
        }
        self
    }

    /// A gateway that approves every payment, with a pre-authenticated
    /// session. Convenient default for tests and the demo binary.
    pub fn approving(latency: Duration) -> Self {
        Self::new(
            Session::authenticated("demo-token"),
            GatewayBehavior::Approve,
            latency,
        )
    }

    pub fn declining(message: impl Into<String>, latency: Duration) -> Self {
        Self::new(
            Session::authenticated("demo-token"),
            GatewayBehavior::Decline(Some(message.into())),
            latency,
        )
    }

    pub fn failing(latency: Duration) -> Self {
        Self::new(
            Session::authenticated("demo-token"),
            GatewayBehavior::FailTransport,
            latency,
        )
    }

    /// Number of submissions received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<PaymentRequest> {
        self.last_request
            .lock()
            .map(|request| request.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn submit_payment(&self, request: PaymentRequest) -> Result<PaymentOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        let bearer = self.session.bearer().await.ok_or(PaymentError::Unauthorized)?;
        tracing::debug!(last_four = %request.card.last_four, "submitting payment");

        let latency = self
            .latency_schedule
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .unwrap_or(self.latency);
        time::sleep(latency).await;

        match &self.behavior {
            GatewayBehavior::Approve => Ok(PaymentOutcome::Settled(PaymentReceipt::approved(
                json!({
                    "amount": request.amount.value(),
                    "last_four": request.card.last_four,
                    "authorized_with": format!("Bearer {bearer}"),
                }),
            ))),
            GatewayBehavior::Decline(message) => {
                let receipt = match message {
                    Some(message) => PaymentReceipt::declined(message.clone()),
                    None => PaymentReceipt {
                        success: false,
                        message: None,
                        data: serde_json::Value::Null,
                    },
                };
                Ok(PaymentOutcome::Settled(receipt))
            }
            GatewayBehavior::FailTransport => {
                Err(PaymentError::Transport("connection refused".to_string()))
            }
        }
    }
}
