use super::notice::Notice;
use super::payment::{PaymentOutcome, PaymentRequest};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// The payment-submission collaborator.
///
/// Implementations attach the session credential to outbound calls and own
/// the fallback policy for an unreachable transport. A transport-level `Err`
/// is handled by the form like a declined payment, differing only in the
/// notice text.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn submit_payment(&self, request: PaymentRequest) -> Result<PaymentOutcome>;
}

/// Fire-and-forget notification sink. The form never awaits or retries
/// delivery.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

pub type PaymentGatewayArc = Arc<dyn PaymentGateway>;
pub type NoticeSinkArc = Arc<dyn NoticeSink>;
