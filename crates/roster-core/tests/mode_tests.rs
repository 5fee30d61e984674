use proptest::prelude::*;
use roster_core::{allowed_transitions, validate_transition, ModeKind};

fn any_mode() -> impl Strategy<Value = ModeKind> {
    prop_oneof![
        Just(ModeKind::Idle),
        Just(ModeKind::Creating),
        Just(ModeKind::Viewing),
        Just(ModeKind::Editing),
    ]
}

#[test]
fn idle_opens_every_modal() {
    assert!(validate_transition(ModeKind::Idle, ModeKind::Creating).is_ok());
    assert!(validate_transition(ModeKind::Idle, ModeKind::Viewing).is_ok());
    assert!(validate_transition(ModeKind::Idle, ModeKind::Editing).is_ok());

    assert!(validate_transition(ModeKind::Idle, ModeKind::Idle).is_err());
}

#[test]
fn open_modals_only_close() {
    for from in [ModeKind::Creating, ModeKind::Viewing, ModeKind::Editing] {
        assert_eq!(allowed_transitions(from), vec![ModeKind::Idle]);
    }
    // no direct view -> edit
    let err = validate_transition(ModeKind::Viewing, ModeKind::Editing).unwrap_err();
    assert_eq!(err.to_string(), "cannot go from viewing to editing");
}

proptest! {
    #[test]
    fn prop_validation_agrees_with_table(from in any_mode(), to in any_mode()) {
        let res = validate_transition(from, to);
        prop_assert_eq!(res.is_ok(), allowed_transitions(from).contains(&to));
    }

    #[test]
    fn prop_every_mode_can_reach_idle_within_one_step(from in any_mode()) {
        let reachable = from == ModeKind::Idle || validate_transition(from, ModeKind::Idle).is_ok();
        prop_assert!(reachable);
    }

    #[test]
    fn prop_walks_never_skip_idle(steps in proptest::collection::vec(any_mode(), 1..32)) {
        let mut current = ModeKind::Idle;
        for to in steps {
            if validate_transition(current, to).is_ok() {
                prop_assert!(current == ModeKind::Idle || to == ModeKind::Idle);
                current = to;
            }
        }
    }
}
