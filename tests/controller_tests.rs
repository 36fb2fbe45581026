use concierge::kernel::controller::{ConversationController, APOLOGY, FORM_THANKS, NOTICE_RECORDED};
use concierge::kernel::effect::{SideEffect, ViewCommand};
use concierge::kernel::event::{Event, Message, Origin, TurnToken, UserAction};
use concierge::kernel::modal::{FormKind, FormValues, Topic};
use concierge::kernel::phase::ConversationPhase;
use concierge::kernel::session::{SessionId, DEFAULT_EMAIL};
use concierge::kernel::telemetry::event::TelemetryEvent;
use concierge::kernel::telemetry::recorder::TelemetryRecorder;
use concierge::outputs::transcript::RecordingTranscript;
use concierge::services::dialog::{DialogReply, FormAck, NetworkError, Query};
use concierge::WidgetConfig;

fn controller() -> ConversationController {
    ConversationController::new(WidgetConfig::default(), SessionId::new())
}

fn render(view: &mut RecordingTranscript, effects: &[SideEffect]) {
    for effect in effects {
        if let SideEffect::Render(cmd) = effect {
            cmd.clone().apply_to(view);
        }
    }
}

fn act(c: &mut ConversationController, view: &mut RecordingTranscript, action: UserAction) -> Vec<SideEffect> {
    let effects = c.step(Event::Input(action));
    render(view, &effects);
    effects
}

fn feed(c: &mut ConversationController, view: &mut RecordingTranscript, event: Event) -> Vec<SideEffect> {
    let effects = c.step(event);
    render(view, &effects);
    effects
}

fn dispatched_turn(effects: &[SideEffect]) -> TurnToken {
    effects
        .iter()
        .find_map(|e| match e {
            SideEffect::SendMessage { turn, .. } | SideEffect::SubmitForm { turn, .. } => Some(*turn),
            _ => None,
        })
        .expect("a network effect")
}

/// Open the widget and get through pre-chat.
fn started() -> (ConversationController, RecordingTranscript) {
    let mut c = controller();
    let mut view = RecordingTranscript::new();
    act(&mut c, &mut view, UserAction::Open);
    act(&mut c, &mut view, UserAction::SubmitPrechat {
        name: "John Smith".into(),
        email: "JOHN@EXAMPLE.COM".into(),
    });
    (c, view)
}

/// Send a message and resolve it with `reply`, including the reading pause.
fn round_trip(c: &mut ConversationController, view: &mut RecordingTranscript, text: &str, reply: DialogReply) {
    let effects = act(c, view, UserAction::SendMessage(text.into()));
    let turn = dispatched_turn(&effects);
    feed(c, view, Event::ReplyReceived { turn, result: Ok(reply) });
    feed(c, view, Event::PaceElapsed { turn });
}

#[test]
fn test_open_enters_prechat_with_input_disabled() {
    let mut c = controller();
    let mut view = RecordingTranscript::new();

    act(&mut c, &mut view, UserAction::Open);

    assert_eq!(c.phase(), ConversationPhase::Prechat);
    assert!(view.visible);
    assert!(!view.input_enabled);
    assert_eq!(view.prechat, Some(("John Doe".to_string(), "john.doe@example.com".to_string())));
    assert!(view.messages.is_empty());
}

#[test]
fn test_prechat_scenario_greets_and_shows_main_menu() {
    let (c, view) = started();

    assert_eq!(c.phase(), ConversationPhase::Active);
    assert_eq!(c.session().name, "John");
    assert_eq!(c.session().email, "john@example.com");
    assert!(view.input_enabled);
    assert_eq!(view.bot_messages(), vec![NOTICE_RECORDED, "Hi John! How can I help?"]);
    assert!(view.prechat.is_none());

    let menu = view.suggestions.as_ref().expect("main menu");
    assert_eq!(
        menu.labels(),
        vec!["Submit support ticket", "Check ticket status", "Contact Sales", "Speak to Agent"]
    );
}

#[test]
fn test_prechat_never_blocks_on_bad_input() {
    let mut c = controller();
    let mut view = RecordingTranscript::new();
    act(&mut c, &mut view, UserAction::Open);
    act(&mut c, &mut view, UserAction::SubmitPrechat { name: "   ".into(), email: "not-an-email".into() });

    assert_eq!(c.phase(), ConversationPhase::Active);
    assert_eq!(c.session().name, "User");
    assert_eq!(c.session().email, DEFAULT_EMAIL);
    assert_eq!(view.bot_messages()[1], "Hi User! How can I help?");
}

#[test]
fn test_send_renders_user_bubble_before_dispatch() {
    let (mut c, mut view) = started();

    let effects = act(&mut c, &mut view, UserAction::SendMessage("  where is my order?  ".into()));

    let bubble = effects
        .iter()
        .position(|e| matches!(e, SideEffect::Render(ViewCommand::AppendMessage(m)) if *m == Message::user("where is my order?")))
        .expect("user bubble");
    let network = effects.iter().position(SideEffect::is_network).expect("dispatch");
    assert!(bubble < network);

    let user_bubbles = effects
        .iter()
        .filter(|e| matches!(e, SideEffect::Render(ViewCommand::AppendMessage(m)) if m.origin == Origin::User))
        .count();
    assert_eq!(user_bubbles, 1);

    assert_eq!(c.phase(), ConversationPhase::AwaitingReply);
    assert!(view.suggestions.is_none(), "suggestions are cleared on send");
    assert!(!view.input_enabled);

    match &effects[network] {
        SideEffect::SendMessage { request, .. } => {
            assert_eq!(request.query, Query::Message("where is my order?".into()));
            assert_eq!(request.name, "John");
            assert_eq!(request.email, "john@example.com");
            assert_eq!(request.session_id, c.session().id());
        }
        other => panic!("unexpected effect {:?}", other),
    }
}

#[test]
fn test_blank_message_is_ignored() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("   ".into()));
    assert!(effects.is_empty());
    assert_eq!(c.phase(), ConversationPhase::Active);
}

#[test]
fn test_reply_renders_then_paces_suggestions() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("status?".into()));
    let turn = dispatched_turn(&effects);

    let effects = feed(&mut c, &mut view, Event::ReplyReceived {
        turn,
        result: Ok(DialogReply::new("Your ticket is open.", "ticket_status")),
    });

    assert_eq!(c.phase(), ConversationPhase::Active);
    assert_eq!(view.last_message(), Some(&Message::bot("Your ticket is open.")));
    assert!(effects.contains(&SideEffect::SchedulePace { turn }));
    assert!(view.suggestions.is_none(), "affordance waits for the pause");

    feed(&mut c, &mut view, Event::PaceElapsed { turn });

    let set = view.suggestions.as_ref().expect("follow-up suggestions");
    assert_eq!(set.labels(), vec!["Submit support ticket", "Speak to Agent"]);
}

#[test]
fn test_support_request_intent_suggestions() {
    let (mut c, mut view) = started();
    round_trip(&mut c, &mut view, "help", DialogReply::new("Sure.", "support_request"));
    assert_eq!(view.suggestions.as_ref().map(|s| s.labels()), Some(vec!["Check ticket status", "Speak to Agent"]));
}

#[test]
fn test_unknown_intent_falls_back_to_main_menu() {
    let (mut c, mut view) = started();
    round_trip(&mut c, &mut view, "hello", DialogReply::new("Hi there.", "smalltalk.greeting"));
    assert_eq!(view.suggestions.as_ref().map(|s| s.len()), Some(4));
}

#[test]
fn test_confirm_modal_directive_opens_form_not_suggestions() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("my printer is broken".into()));
    let turn = dispatched_turn(&effects);

    let reply = DialogReply::new("Opening support ticket form...", "support_request").with_confirm_modal(FormKind::Support);
    feed(&mut c, &mut view, Event::ReplyReceived { turn, result: Ok(reply) });
    assert_eq!(c.phase(), ConversationPhase::AwaitingReply);
    assert!(!view.input_enabled);
    assert_eq!(view.last_message(), Some(&Message::bot("Opening support ticket form...")));

    let effects = feed(&mut c, &mut view, Event::PaceElapsed { turn });

    assert_eq!(c.phase(), ConversationPhase::ModalOpen);
    assert_eq!(view.modal, Some(FormKind::Support));
    assert!(!effects.iter().any(|e| matches!(e, SideEffect::Render(ViewCommand::ShowSuggestions(_)))));
    assert!(view.suggestions.is_none());
}

#[test]
fn test_requested_form_survives_typing_during_pause() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("my printer is broken".into()));
    let turn = dispatched_turn(&effects);
    let reply = DialogReply::new("Opening support ticket form...", "support_request").with_confirm_modal(FormKind::Support);
    feed(&mut c, &mut view, Event::ReplyReceived { turn, result: Ok(reply) });

    let effects = act(&mut c, &mut view, UserAction::SendMessage("hello?".into()));
    assert!(effects.is_empty(), "input is off until the form opens");

    feed(&mut c, &mut view, Event::PaceElapsed { turn });

    assert_eq!(c.phase(), ConversationPhase::ModalOpen);
    assert_eq!(view.modal, Some(FormKind::Support));
    assert_eq!(view.user_messages(), vec!["my printer is broken"]);
    assert_eq!(c.telemetry.snapshot().modal_stats.opened_by_server, 1);
}

#[test]
fn test_blank_reply_is_still_rendered() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("anyone?".into()));
    let turn = dispatched_turn(&effects);

    feed(&mut c, &mut view, Event::ReplyReceived { turn, result: Ok(DialogReply::new("  ", "ticket_status")) });

    assert_eq!(view.last_message(), Some(&Message::bot("  ")));
    assert_eq!(c.phase(), ConversationPhase::Active);
}

#[test]
fn test_network_failure_renders_apology_only() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("hello?".into()));
    let turn = dispatched_turn(&effects);
    let before = view.messages.len();

    let effects = feed(&mut c, &mut view, Event::ReplyReceived {
        turn,
        result: Err(NetworkError::Status(502)),
    });

    assert_eq!(c.phase(), ConversationPhase::Active);
    assert_eq!(view.messages.len(), before + 1);
    assert_eq!(view.last_message(), Some(&Message::bot(APOLOGY)));
    assert!(view.suggestions.is_none());
    assert!(!effects.iter().any(|e| matches!(e, SideEffect::SchedulePace { .. })));
    assert!(view.input_enabled, "user can type again");
}

#[test]
fn test_reply_placeholder_uses_display_name() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("hi".into()));
    let turn = dispatched_turn(&effects);
    feed(&mut c, &mut view, Event::ReplyReceived {
        turn,
        result: Ok(DialogReply::new("Welcome back, $session.params.name!", "")),
    });
    assert_eq!(view.last_message(), Some(&Message::bot("Welcome back, John!")));
}

#[test]
fn test_quick_reply_event_goes_to_backend() {
    let (mut c, mut view) = started();

    let effects = act(&mut c, &mut view, UserAction::SelectSuggestion(1));

    assert_eq!(view.user_messages(), vec!["Check ticket status"]);
    assert_eq!(c.phase(), ConversationPhase::AwaitingReply);
    match effects.iter().find(|e| e.is_network()) {
        Some(SideEffect::SendMessage { request, .. }) => {
            assert_eq!(request.query, Query::Event("TICKET_STATUS".into()));
        }
        other => panic!("expected event dispatch, got {:?}", other),
    }
}

#[test]
fn test_contact_sales_opens_modal_without_network() {
    let (mut c, mut view) = started();

    let effects = act(&mut c, &mut view, UserAction::SelectSuggestion(2));

    assert!(!effects.iter().any(SideEffect::is_network));
    assert_eq!(c.phase(), ConversationPhase::ModalOpen);
    assert_eq!(view.modal, Some(FormKind::Sales));
    assert_eq!(view.user_messages(), vec!["Contact Sales"]);
    assert!(view.suggestions.is_none());
}

#[test]
fn test_sales_form_submission_leads_to_rating() {
    let (mut c, mut view) = started();
    act(&mut c, &mut view, UserAction::SelectSuggestion(2));

    let effects = act(&mut c, &mut view, UserAction::SubmitForm(FormValues::new("  Acme ", " pricing? ")));
    let turn = dispatched_turn(&effects);
    match &effects[0] {
        SideEffect::SubmitForm { submission, .. } => {
            assert_eq!(submission.action, FormKind::Sales);
            assert_eq!(submission.topic, Topic::Company("Acme".into()));
            assert_eq!(submission.message, "pricing?");
            assert_eq!(submission.name, "John");
            assert_eq!(submission.email, "john@example.com");
        }
        other => panic!("expected form submission, got {:?}", other),
    }

    feed(&mut c, &mut view, Event::FormAcknowledged { turn, result: Ok(FormAck::ok()) });

    assert_eq!(c.phase(), ConversationPhase::Rating);
    assert!(view.modal.is_none());
    assert!(c.modal().is_none());
    assert_eq!(view.last_message(), Some(&Message::bot(FORM_THANKS)));
    assert!(view.rating_visible);
}

#[test]
fn test_double_submit_is_ignored_while_pending() {
    let (mut c, mut view) = started();
    act(&mut c, &mut view, UserAction::SelectSuggestion(0));

    let first = act(&mut c, &mut view, UserAction::SubmitForm(FormValues::new("Login", "Cannot sign in")));
    let second = act(&mut c, &mut view, UserAction::SubmitForm(FormValues::new("Login", "Cannot sign in")));

    assert_eq!(first.iter().filter(|e| e.is_network()).count(), 1);
    assert!(second.is_empty());
}

#[test]
fn test_failed_submission_keeps_modal_open() {
    let (mut c, mut view) = started();
    act(&mut c, &mut view, UserAction::SelectSuggestion(0));
    let effects = act(&mut c, &mut view, UserAction::SubmitForm(FormValues::new("Login", "Cannot sign in")));
    let turn = dispatched_turn(&effects);

    feed(&mut c, &mut view, Event::FormAcknowledged {
        turn,
        result: Err(NetworkError::Rejected("error".into())),
    });

    assert_eq!(c.phase(), ConversationPhase::ModalOpen);
    assert_eq!(view.modal, Some(FormKind::Support));
    assert_eq!(view.last_message(), Some(&Message::bot(APOLOGY)));
    assert!(!c.modal().map(|m| m.is_submitting()).unwrap_or(true), "submit is re-armed");

    let retry = act(&mut c, &mut view, UserAction::SubmitForm(FormValues::new("Login", "Cannot sign in")));
    assert_eq!(retry.iter().filter(|e| e.is_network()).count(), 1);
}

#[test]
fn test_cancel_form_returns_to_active_silently() {
    let (mut c, mut view) = started();
    act(&mut c, &mut view, UserAction::SelectSuggestion(0));
    let before = view.messages.len();

    act(&mut c, &mut view, UserAction::CancelForm);

    assert_eq!(c.phase(), ConversationPhase::Active);
    assert!(view.modal.is_none());
    assert_eq!(view.messages.len(), before);
    assert!(view.input_enabled);
}

#[test]
fn test_ack_after_cancel_is_discarded() {
    let (mut c, mut view) = started();
    act(&mut c, &mut view, UserAction::SelectSuggestion(0));
    let effects = act(&mut c, &mut view, UserAction::SubmitForm(FormValues::new("a", "b")));
    let turn = dispatched_turn(&effects);
    act(&mut c, &mut view, UserAction::CancelForm);

    let effects = feed(&mut c, &mut view, Event::FormAcknowledged { turn, result: Ok(FormAck::ok()) });

    assert!(effects.is_empty());
    assert_eq!(c.phase(), ConversationPhase::Active);
    assert!(!view.rating_visible);
}

#[test]
fn test_rating_is_one_shot() {
    let (mut c, mut view) = started();
    act(&mut c, &mut view, UserAction::SelectSuggestion(2));
    let effects = act(&mut c, &mut view, UserAction::SubmitForm(FormValues::new("Acme", "pricing?")));
    let turn = dispatched_turn(&effects);
    feed(&mut c, &mut view, Event::FormAcknowledged { turn, result: Ok(FormAck::ok()) });

    assert!(view.input_enabled, "free text stays open under the prompt");
    assert!(act(&mut c, &mut view, UserAction::Rate(9)).is_empty(), "out of range stars");
    assert!(view.rating_visible);

    act(&mut c, &mut view, UserAction::Rate(4));
    assert_eq!(view.last_message(), Some(&Message::bot("You rated us 4 stars. Thank you!")));
    assert!(!view.rating_visible);
    assert_eq!(c.phase(), ConversationPhase::Active);
    assert!(view.input_enabled);

    assert!(act(&mut c, &mut view, UserAction::Rate(5)).is_empty(), "prompt is gone");
}

#[test]
fn test_message_during_rating_dismisses_prompt() {
    let (mut c, mut view) = started();
    act(&mut c, &mut view, UserAction::SelectSuggestion(0));
    let effects = act(&mut c, &mut view, UserAction::SubmitForm(FormValues::new("Login", "Cannot sign in")));
    let turn = dispatched_turn(&effects);
    feed(&mut c, &mut view, Event::FormAcknowledged { turn, result: Ok(FormAck::ok()) });
    assert_eq!(c.phase(), ConversationPhase::Rating);

    let effects = act(&mut c, &mut view, UserAction::SendMessage("one more question".into()));

    assert_eq!(effects.iter().filter(|e| e.is_network()).count(), 1);
    assert!(effects.contains(&SideEffect::Render(ViewCommand::ClearRating)));
    assert!(!view.rating_visible);
    assert_eq!(c.phase(), ConversationPhase::AwaitingReply);
    assert_eq!(view.last_message(), Some(&Message::user("one more question")));
    assert!(act(&mut c, &mut view, UserAction::Rate(5)).is_empty(), "prompt is gone");
    assert_eq!(c.telemetry.snapshot().rating_stats.count, 0);
}

#[test]
fn test_actions_outside_their_phase_are_rejected() {
    let mut c = controller();
    let mut view = RecordingTranscript::new();

    assert!(act(&mut c, &mut view, UserAction::SendMessage("hi".into())).is_empty());
    assert!(act(&mut c, &mut view, UserAction::Close).is_empty());

    act(&mut c, &mut view, UserAction::Open);
    assert!(act(&mut c, &mut view, UserAction::SendMessage("hi".into())).is_empty());
    assert!(act(&mut c, &mut view, UserAction::SelectSuggestion(0)).is_empty());
    assert!(act(&mut c, &mut view, UserAction::Open).is_empty());
    assert_eq!(c.phase(), ConversationPhase::Prechat);

    act(&mut c, &mut view, UserAction::SubmitPrechat { name: "Ann".into(), email: "ann@example.org".into() });
    assert!(act(&mut c, &mut view, UserAction::SubmitForm(FormValues::default())).is_empty());
    assert!(act(&mut c, &mut view, UserAction::CancelForm).is_empty());
    assert!(act(&mut c, &mut view, UserAction::Rate(3)).is_empty());
    assert!(act(&mut c, &mut view, UserAction::SelectSuggestion(42)).is_empty());

    // Modal open: no free text.
    act(&mut c, &mut view, UserAction::SelectSuggestion(0));
    assert!(act(&mut c, &mut view, UserAction::SendMessage("hi".into())).is_empty());
    assert_eq!(c.phase(), ConversationPhase::ModalOpen);

    assert!(c.telemetry.snapshot().rejected_actions >= 9);
}

#[test]
fn test_reopen_always_returns_to_prechat() {
    // Reach each phase, then close and reopen.
    let drive_to: Vec<fn(&mut ConversationController, &mut RecordingTranscript)> = vec![
        |_, _| {},
        |c, v| {
            act(c, v, UserAction::SendMessage("pending".into()));
        },
        |c, v| {
            act(c, v, UserAction::SelectSuggestion(0));
        },
        |c, v| {
            act(c, v, UserAction::SelectSuggestion(2));
            let effects = act(c, v, UserAction::SubmitForm(FormValues::new("Acme", "q")));
            let turn = dispatched_turn(&effects);
            feed(c, v, Event::FormAcknowledged { turn, result: Ok(FormAck::ok()) });
        },
    ];

    for setup in drive_to {
        let (mut c, mut view) = started();
        setup(&mut c, &mut view);

        act(&mut c, &mut view, UserAction::Close);
        assert_eq!(c.phase(), ConversationPhase::Closed);
        assert!(!view.visible);
        assert!(view.modal.is_none());

        act(&mut c, &mut view, UserAction::Open);
        assert_eq!(c.phase(), ConversationPhase::Prechat);
        assert!(view.messages.is_empty());
        assert!(view.suggestions.is_none());
        assert!(!view.rating_visible);
        assert!(!view.input_enabled);
        assert!(c.in_flight().is_none());
        // Identity survives the reopen.
        assert_eq!(c.session().name, "John");
    }
}

#[test]
fn test_stale_reply_after_reopen_is_dropped() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("slow question".into()));
    let turn = dispatched_turn(&effects);

    act(&mut c, &mut view, UserAction::Close);
    act(&mut c, &mut view, UserAction::Open);

    let effects = feed(&mut c, &mut view, Event::ReplyReceived {
        turn,
        result: Ok(DialogReply::new("late answer", "ticket_status")),
    });

    assert!(effects.is_empty());
    assert!(view.messages.is_empty());
    assert_eq!(c.phase(), ConversationPhase::Prechat);
    assert_eq!(c.telemetry.snapshot().turn_stats.stale_discarded, 1);
}

#[test]
fn test_stale_pace_is_dropped_when_user_moves_on() {
    let (mut c, mut view) = started();
    let effects = act(&mut c, &mut view, UserAction::SendMessage("first".into()));
    let first = dispatched_turn(&effects);
    feed(&mut c, &mut view, Event::ReplyReceived { turn: first, result: Ok(DialogReply::new("one", "support_request")) });

    // Typing again before the pause ends supersedes the pending affordance.
    let effects = act(&mut c, &mut view, UserAction::SendMessage("second".into()));
    assert!(effects.contains(&SideEffect::CancelPacing));

    let effects = feed(&mut c, &mut view, Event::PaceElapsed { turn: first });
    assert!(effects.is_empty());
    assert!(view.suggestions.is_none());
    assert_eq!(c.phase(), ConversationPhase::AwaitingReply);
}

#[test]
fn test_telemetry_counts_without_content() {
    let (mut c, mut view) = started();
    round_trip(&mut c, &mut view, "hi", DialogReply::new("hello", "ticket_status"));
    let effects = act(&mut c, &mut view, UserAction::SendMessage("again".into()));
    let turn = dispatched_turn(&effects);
    feed(&mut c, &mut view, Event::ReplyReceived { turn, result: Err(NetworkError::Malformed("eof".into())) });

    let snap = c.telemetry.snapshot();
    assert_eq!(snap.turn_stats.messages, 2);
    assert_eq!(snap.turn_stats.replied, 1);
    assert_eq!(snap.turn_stats.failed, 1);
    assert!(snap.phase_transitions >= 4);

    let dump = format!("{:?}", c.telemetry.events().collect::<Vec<_>>());
    assert!(!dump.contains("hello"));
    assert!(!dump.contains("John"));
}

#[test]
fn test_recorder_evicts_oldest_and_counts_them() {
    let mut recorder = TelemetryRecorder::with_capacity(3);
    for stars in 1..=5 {
        recorder.record(TelemetryEvent::Rated { stars });
    }

    assert_eq!(recorder.len(), 3);
    let kept: Vec<_> = recorder
        .events()
        .filter_map(|e| match e {
            TelemetryEvent::Rated { stars } => Some(*stars),
            _ => None,
        })
        .collect();
    assert_eq!(kept, vec![3, 4, 5]);

    let snap = recorder.snapshot();
    assert_eq!(snap.evicted, 2);
    assert_eq!(snap.rating_stats.count, 3);
}
