use roster_session::{
    GateClosed, GateState, IdentityProvider, InMemoryIdentityProvider, LoginForm, SessionGate,
    Account,
};

fn provider() -> InMemoryIdentityProvider {
    InMemoryIdentityProvider::new([Account::new("ops@school.test", "correct-horse")])
}

#[tokio::test]
async fn gate_tracks_full_session_lifecycle() {
    let provider = provider();
    let mut gate = SessionGate::new(provider.subscribe());
    assert_eq!(gate.state(), GateState::Loading);

    provider.restore();
    assert_eq!(gate.resolved().await, Some(GateState::Unauthenticated));
    assert_eq!(gate.require_session(), Err(GateClosed::Unauthenticated));

    let session = LoginForm::new("ops@school.test", "correct-horse")
        .submit(&provider)
        .await
        .unwrap();
    assert_eq!(gate.changed().await, Some(GateState::Authenticated(session.clone())));
    assert_eq!(gate.require_session(), Ok(session));

    provider.expire();
    assert_eq!(gate.changed().await, Some(GateState::Unauthenticated));
    assert!(!gate.is_authorized());
}

#[tokio::test]
async fn sign_out_closes_every_clone_of_the_gate() {
    let provider = provider();
    let gate = SessionGate::new(provider.subscribe());
    let other = gate.clone();

    provider.sign_in("ops@school.test", "correct-horse").await.unwrap();
    assert!(gate.is_authorized() && other.is_authorized());

    provider.sign_out().await;
    assert!(!gate.is_authorized());
    assert!(!other.is_authorized());
}
