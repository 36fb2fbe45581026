use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::kernel::controller::ConversationController;
use crate::kernel::effect::SideEffect;
use crate::kernel::event::{Event, TurnToken, UserAction};
use crate::outputs::transcript::TranscriptView;
use crate::services::dialog::DialogBackend;

const QUEUE_DEPTH: usize = 100;

/// Runs the controller against a real backend and view.
///
/// Events are handled one at a time from a single queue. Network calls and
/// pacing timers run as tasks that only ever post an event back.
pub struct WidgetDriver<B, V> {
    pub controller: ConversationController,
    backend: Arc<B>,
    view: V,
    tx: mpsc::Sender<Event>,
    rx: mpsc::Receiver<Event>,
    bot_delay: Duration,
    pacing: HashMap<TurnToken, CancellationToken>,
}

impl<B, V> WidgetDriver<B, V>
where
    B: DialogBackend,
    V: TranscriptView,
{
    pub fn new(controller: ConversationController, backend: B, view: V) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
        let bot_delay = controller.config().bot_delay;
        Self {
            controller,
            backend: Arc::new(backend),
            view,
            tx,
            rx,
            bot_delay,
            pacing: HashMap::new(),
        }
    }

    /// Handle for host callbacks (clicks, key presses) to post into.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn pending_timers(&self) -> usize {
        self.pacing.len()
    }

    pub fn act(&mut self, action: UserAction) {
        self.handle(Event::Input(action));
    }

    /// One controller step plus its effects, in order.
    pub fn handle(&mut self, event: Event) {
        if let Event::PaceElapsed { turn } = &event {
            self.pacing.remove(turn);
        }

        let effects = self.controller.step(event);
        for effect in effects {
            self.execute(effect);
        }
    }

    /// Waits for the next queued completion or input and handles it.
    pub async fn pump(&mut self) -> bool {
        match self.rx.recv().await {
            Some(event) => {
                self.handle(event);
                true
            }
            None => false,
        }
    }

    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("Widget driver started (bot delay {:?})", self.bot_delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }

        self.cancel_pacing();
        info!("Widget driver stopped");
    }

    fn execute(&mut self, effect: SideEffect) {
        match effect {
            SideEffect::Render(cmd) => cmd.apply_to(&mut self.view),

            SideEffect::SendMessage { turn, request } => {
                let backend = Arc::clone(&self.backend);
                let tx = self.tx.clone();
                debug!("Sending turn {:?}", turn);
                tokio::spawn(async move {
                    let result = backend.send_message(request).await;
                    let _ = tx.send(Event::ReplyReceived { turn, result }).await;
                });
            }

            SideEffect::SubmitForm { turn, submission } => {
                let backend = Arc::clone(&self.backend);
                let tx = self.tx.clone();
                debug!("Submitting {} form for turn {:?}", submission.action.as_str(), turn);
                tokio::spawn(async move {
                    let result = backend.submit_form(submission).await;
                    let _ = tx.send(Event::FormAcknowledged { turn, result }).await;
                });
            }

            SideEffect::SchedulePace { turn } => {
                let token = CancellationToken::new();
                if let Some(previous) = self.pacing.insert(turn, token.clone()) {
                    previous.cancel();
                }
                let tx = self.tx.clone();
                let delay = self.bot_delay;
                tokio::spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            let _ = tx.send(Event::PaceElapsed { turn }).await;
                        }
                    }
                });
            }

            SideEffect::CancelPacing => self.cancel_pacing(),
        }
    }

    fn cancel_pacing(&mut self) {
        for (turn, token) in self.pacing.drain() {
            debug!("Cancelled pacing for turn {:?}", turn);
            token.cancel();
        }
    }
}
