use crate::domain::payment::{PaymentOutcome, PaymentReceipt, PaymentRequest};
use crate::domain::ports::PaymentGateway;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;

/// Decorator that substitutes a placeholder result when the inner gateway's
/// transport is unreachable.
///
/// The substitution is explicit: the result comes back as
/// `PaymentOutcome::Degraded` and is logged, so callers can label it as
/// pending confirmation instead of presenting it as a genuine settlement.
pub struct FallbackGateway<G> {
    inner: G,
}

impl<G> FallbackGateway<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: PaymentGateway> PaymentGateway for FallbackGateway<G> {
    async fn submit_payment(&self, request: PaymentRequest) -> Result<PaymentOutcome> {
        match self.inner.submit_payment(request.clone()).await {
            Ok(outcome) => Ok(outcome),
            Err(error) => {
                tracing::warn!(
                    %error,
                    last_four = %request.card.last_four,
                    "gateway unreachable, substituting degraded-mode result"
                );
                Ok(PaymentOutcome::Degraded(PaymentReceipt {
                    success: true,
                    message: Some("Recorded offline; confirmation pending.".to_string()),
                    data: json!({
                        "amount": request.amount.value(),
                        "last_four": request.card.last_four,
                        "degraded": true,
                    }),
                }))
            }
        }
    }
}
