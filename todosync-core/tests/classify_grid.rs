//! The full presence grid for `classify`.

use rstest::rstest;
use todosync_core::{classify, Action, Presence, ReconcileState};

#[rstest]
#[case(true, false, false, ReconcileState::CodeOnly, Action::CreateDocumentAndTicket)]
#[case(true, true, false, ReconcileState::CodeAndDoc, Action::CreateTicket)]
#[case(true, true, true, ReconcileState::Everywhere, Action::SyncOnChange)]
#[case(false, true, true, ReconcileState::DocAndTicket, Action::Sync)]
#[case(false, true, false, ReconcileState::DocOnly, Action::CreateTicket)]
#[case(false, false, true, ReconcileState::TicketOnly, Action::CloseTicket)]
#[case(false, false, false, ReconcileState::Absent, Action::Nothing)]
#[case(true, false, true, ReconcileState::CodeAndTicket, Action::Nothing)]
fn every_combination_has_one_action(
    #[case] code: bool,
    #[case] doc: bool,
    #[case] ticket: bool,
    #[case] state: ReconcileState,
    #[case] action: Action,
) {
    let got_state = ReconcileState::from_presence(Presence::new(code, doc, ticket));
    assert_eq!(got_state, state);
    assert_eq!(classify(got_state), action);
    // Pure: asking again, or asking in another order, gives the same answer.
    assert_eq!(classify(got_state), classify(state));
}

#[test]
fn two_combinations_collapse_to_nothing() {
    let nothing = ReconcileState::all()
        .iter()
        .filter(|s| classify(**s) == Action::Nothing)
        .count();
    assert_eq!(nothing, 2);
}
