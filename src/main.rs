use clap::Parser;
use costshare::application::controller::{PaymentController, SuccessHandler};
use costshare::domain::attempt::{CONTINUATION_DELAY, PaymentStatus};
use costshare::domain::form::PaymentForm;
use costshare::domain::ports::{NoticeSinkArc, PaymentGatewayArc};
use costshare::domain::session::Session;
use costshare::infrastructure::fallback::FallbackGateway;
use costshare::infrastructure::simulated::{GatewayBehavior, SimulatedGateway};
use costshare::interfaces::console::ConsoleNoticeSink;
use miette::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Payment amount in dollars
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// Card number (formatting characters are stripped)
    #[arg(long)]
    card: String,

    /// Expiry as MMYY or MM/YY
    #[arg(long)]
    expiry: String,

    /// 3-digit CVV
    #[arg(long)]
    cvv: String,

    /// Name on card
    #[arg(long)]
    name: String,

    /// Simulate a declined card
    #[arg(long)]
    decline: bool,

    /// Simulate an unreachable gateway (degraded mode)
    #[arg(long)]
    offline: bool,

    /// Simulated gateway latency in milliseconds
    #[arg(long, default_value_t = 700)]
    latency_ms: u64,

    /// Session token attached to outbound gateway calls
    #[arg(long, default_value = "demo-token")]
    token: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let session = Session::new();
    session.login(cli.token.as_str()).await;

    let latency = Duration::from_millis(cli.latency_ms);
    let behavior = if cli.offline {
        GatewayBehavior::FailTransport
    } else if cli.decline {
        GatewayBehavior::Decline(Some("Card declined by issuer.".to_string()))
    } else {
        GatewayBehavior::Approve
    };
    let simulated = SimulatedGateway::new(session.clone(), behavior, latency);
    let gateway: PaymentGatewayArc = if cli.offline {
        // Offline runs exercise the degraded-mode substitution.
        Arc::new(FallbackGateway::new(simulated))
    } else {
        Arc::new(simulated)
    };

    let notices: NoticeSinkArc = Arc::new(ConsoleNoticeSink::new());
    let on_success: SuccessHandler = Arc::new(|receipt| {
        println!("Continuing to the dashboard with receipt: {}", receipt.data);
    });

    let mut controller = PaymentController::with_continuation(
        PaymentForm::new(),
        gateway,
        notices,
        Some(on_success),
    );
    controller.set_amount(&cli.amount);
    controller.set_card_number(&cli.card);
    controller.set_expiry(&cli.expiry);
    controller.set_cvv(&cli.cvv);
    controller.set_name_on_card(&cli.name);

    println!("Pay ${}", controller.form().display_amount());

    let mut attempts = controller.subscribe();
    controller.submit();

    // Give the attempt a moment to open; if validation failed it never will.
    let opened = tokio::time::timeout(Duration::from_millis(100), async {
        while attempts.borrow_and_update().status == PaymentStatus::Idle {
            if attempts.changed().await.is_err() {
                break;
            }
        }
    })
    .await
    .is_ok();

    if opened {
        let final_status = loop {
            let snapshot = attempts.borrow_and_update().clone();
            if snapshot.status == PaymentStatus::Processing {
                println!("Processing payment... {}%", snapshot.progress);
            } else {
                break snapshot.status;
            }
            if attempts.changed().await.is_err() {
                break snapshot.status;
            }
        };

        match final_status {
            PaymentStatus::Success => {
                // Leave the success display up long enough for the
                // continuation to fire.
                tokio::time::sleep(CONTINUATION_DELAY + Duration::from_millis(100)).await;
                println!("Transaction complete.");
            }
            PaymentStatus::Error => println!("Transaction failed."),
            _ => println!("Attempt was reset before the gateway resolved."),
        }
    }

    controller.close();
    Ok(())
}
