use tracing::{debug, info, warn};

use super::effect::{SideEffect, ViewCommand};
use super::event::{Event, Message, TurnToken, UserAction};
use super::modal::{FormKind, FormModal, FormValues};
use super::phase::{ConversationPhase, PhaseGraph, PhaseRequest};
use super::session::{Session, SessionId};
use super::suggestion::SuggestionSet;
use super::telemetry::event::{ModalSource, TelemetryEvent, TurnKind, TurnOutcome};
use super::telemetry::recorder::TelemetryRecorder;
use crate::config::WidgetConfig;
use crate::services::dialog::{DialogReply, FormAck, MessageRequest, NetworkError, Query};

pub const NOTICE_RECORDED: &str = "This chat is recorded.";
pub const APOLOGY: &str = "Sorry, something went wrong.";
pub const FORM_THANKS: &str = "Thanks! We will be in touch.";

/// Backend replies may address the user through this placeholder.
const NAME_PLACEHOLDER: &str = "$session.params.name";

/// What to show once the reading pause after a reply is over.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Affordance {
    Suggestions(SuggestionSet),
    Form(FormKind),
}

#[derive(Debug, Clone)]
struct PendingAffordance {
    turn: TurnToken,
    next: Affordance,
}

/// The conversation state machine.
///
/// `step` is pure with respect to I/O: it folds one event into the state and
/// returns the effects the driver must carry out, in order.
pub struct ConversationController {
    config: WidgetConfig,
    phase: ConversationPhase,
    session: Session,
    suggestions: Option<SuggestionSet>,
    modal: Option<FormModal>,
    pending: Option<PendingAffordance>,
    // Advanced on open and close; invalidates everything in flight.
    epoch: u64,
    turn_seq: u64,
    in_flight: Option<TurnToken>,
    pub telemetry: TelemetryRecorder,
}

impl ConversationController {
    pub fn new(config: WidgetConfig, session_id: SessionId) -> Self {
        let session = Session::with_identity(session_id, &config.default_name, &config.default_email);
        Self {
            config,
            phase: ConversationPhase::Closed,
            session,
            suggestions: None,
            modal: None,
            pending: None,
            epoch: 0,
            turn_seq: 0,
            in_flight: None,
            telemetry: TelemetryRecorder::new(),
        }
    }

    pub fn phase(&self) -> ConversationPhase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn suggestions(&self) -> Option<&SuggestionSet> {
        self.suggestions.as_ref()
    }

    pub fn modal(&self) -> Option<&FormModal> {
        self.modal.as_ref()
    }

    /// Token of the call whose completion is still awaited, if any.
    pub fn in_flight(&self) -> Option<TurnToken> {
        self.in_flight
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn step(&mut self, event: Event) -> Vec<SideEffect> {
        match event {
            Event::Input(action) => self.on_action(action),
            Event::ReplyReceived { turn, result } => self.on_reply(turn, result),
            Event::FormAcknowledged { turn, result } => self.on_form_ack(turn, result),
            Event::PaceElapsed { turn } => self.on_pace(turn),
        }
    }

    fn on_action(&mut self, action: UserAction) -> Vec<SideEffect> {
        let mut effects = Vec::new();

        match action {
            UserAction::Open => {
                if !self.transition(PhaseRequest::Open, &mut effects) {
                    return self.reject("open");
                }
                self.reset_conversation();
                effects.push(ViewCommand::SetVisible(true).into());
                effects.push(ViewCommand::Clear.into());
                effects.push(ViewCommand::ShowPrechat {
                    name: self.config.prechat_name.clone(),
                    email: self.config.prechat_email.clone(),
                }.into());
                effects.push(ViewCommand::SetInputEnabled(false).into());
            }

            UserAction::Close => {
                if !self.transition(PhaseRequest::Close, &mut effects) {
                    return self.reject("close");
                }
                let had_modal = self.modal.is_some();
                self.reset_conversation();
                effects.push(SideEffect::CancelPacing);
                if had_modal {
                    effects.push(ViewCommand::CloseModal.into());
                }
                effects.push(ViewCommand::Clear.into());
                effects.push(ViewCommand::SetVisible(false).into());
            }

            UserAction::SubmitPrechat { name, email } => {
                if !self.transition(PhaseRequest::PrechatCompleted, &mut effects) {
                    return self.reject("submit_prechat");
                }
                let fallbacks = self.session.apply_prechat(
                    &name,
                    &email,
                    &self.config.default_name,
                    &self.config.default_email,
                );
                if !fallbacks.is_empty() {
                    debug!("Pre-chat fields defaulted: {:?}", fallbacks);
                }

                effects.push(ViewCommand::Clear.into());
                self.say(NOTICE_RECORDED, &mut effects);
                let greeting = format!("Hi {}! How can I help?", self.session.name);
                self.say(&greeting, &mut effects);
                self.show_suggestions(SuggestionSet::main_menu(), &mut effects);
            }

            UserAction::SendMessage(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return effects;
                }
                // Typing past the star prompt dismisses it unrated.
                if self.transition(PhaseRequest::RatingDismissed, &mut effects) {
                    effects.push(ViewCommand::ClearRating.into());
                }
                if !self.transition(PhaseRequest::TurnDispatched, &mut effects) {
                    return self.reject("send_message");
                }
                self.begin_turn(text, &mut effects);
                let turn = self.next_turn(TurnKind::Message);
                effects.push(SideEffect::SendMessage {
                    turn,
                    request: MessageRequest::new(&self.session, Query::Message(text.to_string())),
                });
            }

            UserAction::SelectSuggestion(index) => {
                if self.phase != ConversationPhase::Active {
                    return self.reject("select_suggestion");
                }
                let Some(choice) = self.suggestions.as_ref().and_then(|set| set.get(index)).cloned() else {
                    return self.reject("select_suggestion");
                };

                if let Some(kind) = choice.opens_form() {
                    self.transition(PhaseRequest::OpenForm, &mut effects);
                    self.begin_turn(&choice.label, &mut effects);
                    self.open_modal(kind, ModalSource::QuickReply, &mut effects);
                } else {
                    self.transition(PhaseRequest::TurnDispatched, &mut effects);
                    self.begin_turn(&choice.label, &mut effects);
                    let turn = self.next_turn(TurnKind::Event);
                    effects.push(SideEffect::SendMessage {
                        turn,
                        request: MessageRequest::new(&self.session, Query::Event(choice.event)),
                    });
                }
            }

            UserAction::SubmitForm(values) => {
                return self.submit_form(values);
            }

            UserAction::CancelForm => {
                if !self.transition(PhaseRequest::FormCancelled, &mut effects) {
                    return self.reject("cancel_form");
                }
                self.modal = None;
                // An unacknowledged submission no longer has anywhere to land.
                self.in_flight = None;
                effects.push(ViewCommand::CloseModal.into());
            }

            UserAction::Rate(stars) => {
                if self.phase != ConversationPhase::Rating || !(1..=5).contains(&stars) {
                    return self.reject("rate");
                }
                self.transition(PhaseRequest::Rated, &mut effects);
                effects.push(ViewCommand::ClearRating.into());
                self.say(&format!("You rated us {} stars. Thank you!", stars), &mut effects);
                self.telemetry.record(TelemetryEvent::Rated { stars });
            }
        }

        effects
    }

    fn submit_form(&mut self, values: FormValues) -> Vec<SideEffect> {
        if self.phase != ConversationPhase::ModalOpen {
            return self.reject("submit_form");
        }
        let Some(modal) = self.modal.as_mut() else {
            return self.reject("submit_form");
        };
        let Some(submission) = modal.submit(&values, &self.session) else {
            debug!("Submit ignored, previous submission still pending");
            return Vec::new();
        };

        let turn = self.next_turn(TurnKind::Form);
        vec![SideEffect::SubmitForm { turn, submission }]
    }

    fn on_reply(&mut self, turn: TurnToken, result: Result<DialogReply, NetworkError>) -> Vec<SideEffect> {
        if self.in_flight != Some(turn) || self.phase != ConversationPhase::AwaitingReply {
            return self.discard_stale(turn);
        }
        self.in_flight = None;

        let mut effects = Vec::new();

        match result {
            Ok(reply) => {
                self.telemetry.record(TelemetryEvent::TurnResolved { turn, outcome: TurnOutcome::Replied });

                // A requested form is committed. Input stays off until the
                // pause ends and it opens straight from awaiting-reply.
                let next = match reply.confirm_modal() {
                    Some(kind) => Affordance::Form(kind),
                    None => {
                        self.transition(PhaseRequest::ReplyResolved, &mut effects);
                        Affordance::Suggestions(SuggestionSet::for_intent(&reply.intent))
                    }
                };

                let text = reply.reply.replace(NAME_PLACEHOLDER, &self.session.name);
                self.say(&text, &mut effects);

                self.pending = Some(PendingAffordance { turn, next });
                effects.push(SideEffect::SchedulePace { turn });
            }
            Err(e) => {
                warn!("Dialog turn {:?} failed: {}", turn, e);
                self.telemetry.record(TelemetryEvent::TurnResolved { turn, outcome: TurnOutcome::Failed });
                self.transition(PhaseRequest::ReplyResolved, &mut effects);
                self.say(APOLOGY, &mut effects);
            }
        }

        effects
    }

    fn on_pace(&mut self, turn: TurnToken) -> Vec<SideEffect> {
        let pending = match self.pending.take() {
            Some(p) if p.turn == turn => p,
            other => {
                self.pending = other;
                return self.discard_stale(turn);
            }
        };

        let mut effects = Vec::new();
        match pending.next {
            Affordance::Form(kind) => {
                if self.transition(PhaseRequest::OpenForm, &mut effects) {
                    self.open_modal(kind, ModalSource::ServerDirective, &mut effects);
                }
            }
            Affordance::Suggestions(set) => self.show_suggestions(set, &mut effects),
        }
        effects
    }

    fn on_form_ack(&mut self, turn: TurnToken, result: Result<FormAck, NetworkError>) -> Vec<SideEffect> {
        if self.in_flight != Some(turn) || self.phase != ConversationPhase::ModalOpen {
            return self.discard_stale(turn);
        }
        self.in_flight = None;

        let mut effects = Vec::new();
        match result {
            Ok(_) => {
                self.telemetry.record(TelemetryEvent::TurnResolved { turn, outcome: TurnOutcome::Replied });
                if let Some(modal) = self.modal.take() {
                    self.telemetry.record(TelemetryEvent::FormSubmitted { kind: modal.kind() });
                }
                self.transition(PhaseRequest::FormSubmitted, &mut effects);
                effects.push(ViewCommand::CloseModal.into());
                self.say(FORM_THANKS, &mut effects);
                effects.push(ViewCommand::ShowRating.into());
            }
            Err(e) => {
                warn!("Form submission {:?} failed: {}", turn, e);
                self.telemetry.record(TelemetryEvent::TurnResolved { turn, outcome: TurnOutcome::Failed });
                if let Some(modal) = self.modal.as_mut() {
                    modal.submission_failed();
                }
                self.say(APOLOGY, &mut effects);
            }
        }
        effects
    }

    /// Applies a phase change through the graph. Input enablement follows
    /// the phase.
    fn transition(&mut self, request: PhaseRequest, effects: &mut Vec<SideEffect>) -> bool {
        let Some(next) = PhaseGraph::transition(self.phase, request) else {
            return false;
        };
        if next != self.phase {
            info!("Phase {:?} -> {:?}", self.phase, next);
            self.telemetry.record(TelemetryEvent::PhaseTransition { from: self.phase, to: next });
            if next.accepts_input() != self.phase.accepts_input() {
                effects.push(ViewCommand::SetInputEnabled(next.accepts_input()).into());
            }
            self.phase = next;
        }
        true
    }

    /// Optimistic half of a turn: the user's words go on screen and the
    /// previous affordances come down.
    fn begin_turn(&mut self, text: &str, effects: &mut Vec<SideEffect>) {
        if self.pending.take().is_some() {
            effects.push(SideEffect::CancelPacing);
        }
        effects.push(ViewCommand::AppendMessage(Message::user(text)).into());
        self.clear_suggestions(effects);
    }

    fn next_turn(&mut self, kind: TurnKind) -> TurnToken {
        self.turn_seq += 1;
        let turn = TurnToken { epoch: self.epoch, turn: self.turn_seq };
        self.in_flight = Some(turn);
        debug!("Dispatching {:?} turn {:?}", kind, turn);
        self.telemetry.record(TelemetryEvent::TurnDispatched { turn, kind });
        turn
    }

    fn say(&self, text: &str, effects: &mut Vec<SideEffect>) {
        effects.push(ViewCommand::AppendMessage(Message::bot(text)).into());
    }

    fn show_suggestions(&mut self, set: SuggestionSet, effects: &mut Vec<SideEffect>) {
        self.suggestions = Some(set.clone());
        effects.push(ViewCommand::ShowSuggestions(set).into());
    }

    fn clear_suggestions(&mut self, effects: &mut Vec<SideEffect>) {
        if self.suggestions.take().is_some() {
            effects.push(ViewCommand::ClearSuggestions.into());
        }
    }

    fn open_modal(&mut self, kind: FormKind, source: ModalSource, effects: &mut Vec<SideEffect>) {
        if self.modal.take().is_some() {
            effects.push(ViewCommand::CloseModal.into());
        }
        self.modal = Some(FormModal::open(kind));
        self.telemetry.record(TelemetryEvent::ModalOpened { kind, source });
        effects.push(ViewCommand::OpenModal(kind).into());
    }

    /// Drops all per-visit state. The session identity survives.
    fn reset_conversation(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        self.pending = None;
        self.suggestions = None;
        self.modal = None;
    }

    fn discard_stale(&mut self, turn: TurnToken) -> Vec<SideEffect> {
        info!("Discarded stale completion for turn {:?} (in flight: {:?})", turn, self.in_flight);
        self.telemetry.record(TelemetryEvent::StaleDiscarded { turn });
        Vec::new()
    }

    fn reject(&mut self, action: &str) -> Vec<SideEffect> {
        warn!("Action '{}' is not offered in phase {:?}", action, self.phase);
        self.telemetry.record(TelemetryEvent::RejectedAction { phase: self.phase });
        Vec::new()
    }
}
