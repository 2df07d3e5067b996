use crate::domain::attempt::{
    CONTINUATION_DELAY, PaymentAttempt, PaymentStatus, RESET_DELAY, TICK_INTERVAL,
};
use crate::domain::form::PaymentForm;
use crate::domain::notice::Notice;
use crate::domain::payment::{Amount, PaymentOutcome, PaymentReceipt, PaymentRequest};
use crate::domain::ports::{NoticeSinkArc, PaymentGatewayArc};
use crate::error::Result;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;

const GENERIC_DECLINE: &str = "Your payment could not be processed. Please try again.";
const GENERIC_TRANSPORT_FAILURE: &str = "An unexpected error occurred. Please try again.";

/// Caller continuation, invoked at most once per attempt, only on success,
/// after the display delay.
pub type SuccessHandler = Arc<dyn Fn(PaymentReceipt) + Send + Sync>;

/// Events reported to the reducer. Everything that belongs to a specific
/// attempt carries that attempt's sequence number so stale timers and late
/// gateway resolutions can be dropped in arrival order.
#[derive(Debug)]
enum AttemptEvent {
    Submit(PaymentRequest),
    Tick { seq: u64 },
    Resolved { seq: u64, outcome: Result<PaymentOutcome> },
    ResetElapsed { seq: u64 },
    ContinuationElapsed { seq: u64, receipt: PaymentReceipt },
    Closed,
}

/// The periodic progress-increment task. Runs only while an attempt is
/// processing; cancellation is idempotent by construction.
struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    fn idle() -> Self {
        Self { handle: None }
    }

    fn start(&mut self, seq: u64, events: mpsc::UnboundedSender<AttemptEvent>) {
        self.cancel();
        self.handle = Some(tokio::spawn(async move {
            loop {
                time::sleep(TICK_INTERVAL).await;
                if events.send(AttemptEvent::Tick { seq }).is_err() {
                    break;
                }
            }
        }));
    }

    /// Cancelling a cancelled or never-started ticker is a no-op.
    fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The reducer task. Owns the attempt record and every transition; the
/// ticker, gateway call and timers only report events here.
struct Driver {
    gateway: PaymentGatewayArc,
    notices: NoticeSinkArc,
    on_success: Option<SuccessHandler>,
    state: watch::Sender<PaymentAttempt>,
    events: mpsc::UnboundedSender<AttemptEvent>,
    ticker: Ticker,
    seq: u64,
    amount: Option<Amount>,
}

impl Driver {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<AttemptEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                AttemptEvent::Submit(request) => self.on_submit(request),
                AttemptEvent::Tick { seq } if seq == self.seq => {
                    self.state.send_modify(PaymentAttempt::tick);
                }
                AttemptEvent::Resolved { seq, outcome } if seq == self.seq => {
                    self.on_resolved(outcome);
                }
                AttemptEvent::ResetElapsed { seq } if seq == self.seq => {
                    self.on_reset_elapsed();
                }
                AttemptEvent::ContinuationElapsed { seq, receipt } if seq == self.seq => {
                    self.on_continuation(receipt);
                }
                AttemptEvent::Closed => {
                    self.ticker.cancel();
                    tracing::debug!("payment form closed");
                    break;
                }
                stale => {
                    tracing::debug!(?stale, "dropping event from superseded attempt");
                }
            }
        }
    }

    fn on_submit(&mut self, request: PaymentRequest) {
        if self.state.borrow().status != PaymentStatus::Idle {
            tracing::debug!("submit ignored: an attempt is already active");
            return;
        }

        self.seq += 1;
        let seq = self.seq;
        self.amount = Some(request.amount);
        self.state
            .send_modify(|attempt| attempt.begin(request.card.last_four.clone()));
        tracing::info!(seq, last_four = %request.card.last_four, "payment attempt started");

        self.ticker.start(seq, self.events.clone());

        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = gateway.submit_payment(request).await;
            let _ = events.send(AttemptEvent::Resolved { seq, outcome });
        });

        // Armed at submission time, not on terminal-state entry. A gateway
        // slower than RESET_DELAY gets its attempt reset from under it.
        let events = self.events.clone();
        tokio::spawn(async move {
            time::sleep(RESET_DELAY).await;
            let _ = events.send(AttemptEvent::ResetElapsed { seq });
        });
    }

    fn on_resolved(&mut self, outcome: Result<PaymentOutcome>) {
        self.ticker.cancel();

        if self.state.borrow().status != PaymentStatus::Processing {
            tracing::debug!("resolution arrived after the attempt was reset, ignoring");
            return;
        }

        match outcome {
            Ok(PaymentOutcome::Settled(receipt)) if receipt.success => {
                self.enter_success(receipt, false);
            }
            Ok(PaymentOutcome::Degraded(receipt)) => {
                self.enter_success(receipt, true);
            }
            Ok(PaymentOutcome::Settled(receipt)) => {
                self.state.send_modify(PaymentAttempt::fail);
                let description = receipt
                    .message
                    .unwrap_or_else(|| GENERIC_DECLINE.to_string());
                tracing::info!(seq = self.seq, %description, "payment declined");
                self.notices.notify(Notice::error("Payment failed", description));
            }
            Err(error) => {
                self.state.send_modify(PaymentAttempt::fail);
                tracing::error!(seq = self.seq, %error, "payment submission failed");
                self.notices
                    .notify(Notice::error("Payment failed", GENERIC_TRANSPORT_FAILURE));
            }
        }
    }

    fn enter_success(&mut self, receipt: PaymentReceipt, degraded: bool) {
        self.state.send_modify(PaymentAttempt::succeed);
        let amount = self
            .amount
            .map(|amount| amount.display())
            .unwrap_or_else(|| format!("{:.2}", Decimal::ZERO));

        if degraded {
            tracing::warn!(seq = self.seq, "gateway unreachable, payment recorded in degraded mode");
            self.notices.notify(Notice::warn(
                "Payment accepted",
                format!("Your payment of ${amount} was recorded offline and awaits confirmation."),
            ));
        } else {
            tracing::info!(seq = self.seq, "payment succeeded");
            self.notices.notify(Notice::info(
                "Payment successful",
                format!("Your payment of ${amount} has been processed."),
            ));
        }

        if self.on_success.is_some() {
            let seq = self.seq;
            let events = self.events.clone();
            tokio::spawn(async move {
                time::sleep(CONTINUATION_DELAY).await;
                let _ = events.send(AttemptEvent::ContinuationElapsed { seq, receipt });
            });
        }
    }

    fn on_reset_elapsed(&mut self) {
        let status = self.state.borrow().status;
        match status {
            // The success display stays up; the continuation (when present)
            // owns the deferred reset.
            PaymentStatus::Success => {}
            PaymentStatus::Idle => {}
            PaymentStatus::Processing | PaymentStatus::Error => {
                if status == PaymentStatus::Processing {
                    self.ticker.cancel();
                    tracing::warn!(
                        seq = self.seq,
                        "reset timer fired while still processing; attempt reset early"
                    );
                }
                self.state.send_modify(PaymentAttempt::reset);
                self.amount = None;
            }
        }
    }

    fn on_continuation(&mut self, receipt: PaymentReceipt) {
        if let Some(on_success) = &self.on_success {
            on_success(receipt);
        }
        // Deferred reset: the success display ends once the continuation fires.
        self.state.send_modify(PaymentAttempt::reset);
        self.amount = None;
    }
}

/// Owns the editable form and the lifecycle of payment attempts.
///
/// All mutable attempt state lives behind a `watch` channel published by the
/// reducer task; `subscribe` hands out receivers for progress display.
pub struct PaymentController {
    form: PaymentForm,
    notices: NoticeSinkArc,
    events: mpsc::UnboundedSender<AttemptEvent>,
    state: watch::Receiver<PaymentAttempt>,
    closed: bool,
}

impl PaymentController {
    pub fn new(gateway: PaymentGatewayArc, notices: NoticeSinkArc) -> Self {
        Self::with_continuation(PaymentForm::new(), gateway, notices, None)
    }

    /// Builds a controller around a pre-filled form and an optional success
    /// continuation.
    pub fn with_continuation(
        form: PaymentForm,
        gateway: PaymentGatewayArc,
        notices: NoticeSinkArc,
        on_success: Option<SuccessHandler>,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(PaymentAttempt::idle());
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let driver = Driver {
            gateway,
            notices: Arc::clone(&notices),
            on_success,
            state: state_tx,
            events: events_tx.clone(),
            ticker: Ticker::idle(),
            seq: 0,
            amount: None,
        };
        tokio::spawn(driver.run(events_rx));

        Self {
            form,
            notices,
            events: events_tx,
            state: state_rx,
            closed: false,
        }
    }

    pub fn form(&self) -> &PaymentForm {
        &self.form
    }

    /// Current attempt snapshot.
    pub fn attempt(&self) -> PaymentAttempt {
        self.state.borrow().clone()
    }

    /// A receiver that observes every attempt transition, for progress
    /// display.
    pub fn subscribe(&self) -> watch::Receiver<PaymentAttempt> {
        self.state.clone()
    }

    /// The form is editable only between attempts.
    pub fn is_editable(&self) -> bool {
        !self.closed && self.state.borrow().status == PaymentStatus::Idle
    }

    /// Whether the submit affordance is enabled. Disabled while an attempt
    /// is processing, which is what rejects repeated submits.
    pub fn can_submit(&self) -> bool {
        self.is_editable()
    }

    pub fn set_amount(&mut self, input: &str) {
        if self.is_editable() {
            self.form.set_amount(input);
        }
    }

    pub fn set_card_number(&mut self, input: &str) {
        if self.is_editable() {
            self.form.set_card_number(input);
        }
    }

    pub fn set_expiry(&mut self, input: &str) {
        if self.is_editable() {
            self.form.set_expiry(input);
        }
    }

    pub fn set_cvv(&mut self, input: &str) {
        if self.is_editable() {
            self.form.set_cvv(input);
        }
    }

    pub fn set_name_on_card(&mut self, input: &str) {
        if self.is_editable() {
            self.form.set_name_on_card(input);
        }
    }

    /// Validates the form and, if it passes, opens an attempt.
    ///
    /// A validation failure surfaces one notice and changes no attempt
    /// state; a submit while an attempt is active does nothing at all.
    pub fn submit(&mut self) {
        if self.closed {
            return;
        }
        if self.state.borrow().status != PaymentStatus::Idle {
            tracing::debug!("submit ignored: attempt already in progress");
            return;
        }
        match self.form.validate() {
            Ok(request) => {
                let _ = self.events.send(AttemptEvent::Submit(request));
            }
            Err(error) => {
                tracing::debug!(%error, "submission rejected by validation");
                self.notices.notify(error.notice());
            }
        }
    }

    /// Tears the form down. In-flight work may still resolve afterwards but
    /// no state is mutated and no continuation fires once closed.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.events.send(AttemptEvent::Closed);
    }
}

impl Drop for PaymentController {
    fn drop(&mut self) {
        self.close();
    }
}
