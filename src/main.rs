use concierge::kernel::controller::ConversationController;
use concierge::kernel::event::Event;
use concierge::kernel::session::{SessionIdentity, TabStorage};
use concierge::outputs::console::{parse_line, ConsoleLine, ConsoleTranscript};
use concierge::services::dialog::HttpDialogClient;
use concierge::{WidgetConfig, WidgetDriver};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging/tracing
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = WidgetConfig::from_env()?;
    tracing::info!("Concierge widget mounting against {}", config.api_base);

    // One tab per process.
    let storage = TabStorage::new();
    let session_id = SessionIdentity::new(Some(&storage)).get_or_create();

    let client = HttpDialogClient::new(&config);
    let view = ConsoleTranscript::new(&config.bot_title);
    let controller = ConversationController::new(config, session_id);
    let mut driver = WidgetDriver::new(controller, client, view);

    let shutdown = CancellationToken::new();
    let input_tx = driver.sender();
    let input_shutdown = shutdown.clone();

    tokio::spawn(async move {
        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = reader.lines();

        println!("Type /open to launch the chat, /quit to exit.");

        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                ConsoleLine::Action(action) => {
                    if let Err(e) = input_tx.send(Event::Input(action)).await {
                        tracing::error!("Failed to send input: {}", e);
                        break;
                    }
                }
                ConsoleLine::Quit => break,
                ConsoleLine::Unknown(raw) => println!("  unknown command: {}", raw),
            }
        }
        input_shutdown.cancel();
    });

    driver.run(shutdown).await;

    let snapshot = driver.controller.telemetry.snapshot();
    tracing::info!(
        "Session {} closed: {} turns dispatched, {} failed, {} stale dropped",
        driver.controller.session().id(),
        snapshot.turn_stats.messages + snapshot.turn_stats.events + snapshot.turn_stats.forms,
        snapshot.turn_stats.failed,
        snapshot.turn_stats.stale_discarded,
    );

    Ok(())
}
