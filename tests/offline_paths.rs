use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use ghiras::advisor::{
    mock_diagnosis, Advisor, AdvisorError, ChatHistory, ChatMessage, Language, TokioDelay,
};
use ghiras::config::Config;

fn offline() -> Advisor {
    Advisor::with_remote(None, &Config::default(), Arc::new(TokioDelay))
}

#[tokio::test(start_paused = true)]
async fn mock_diagnosis_takes_two_seconds() {
    let advisor = offline();
    assert!(!advisor.capability().is_available());

    let started = Instant::now();
    // Offline analysis ignores the image entirely.
    let result = advisor.diagnosis().analyze(&[], "").await.unwrap();

    assert!(started.elapsed() >= Duration::from_millis(2000));
    assert_eq!(result, mock_diagnosis());
}

#[tokio::test(start_paused = true)]
async fn offline_chat_replies_after_one_second() {
    let advisor = offline();
    assert!(advisor.sessions().create_session().is_none());

    for language in [Language::Ar, Language::En] {
        let mut history = ChatHistory::greeted(language);
        history.push(ChatMessage::user("Is my soil too salty?"));

        let started = Instant::now();
        let reply = advisor
            .exchange()
            .send(None, "Is my soil too salty?", language)
            .await;
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(reply, language.unreachable_reply());

        history.push(ChatMessage::assistant(reply));
        assert_eq!(history.len(), 3);
    }
}

#[test]
fn require_live_reports_missing_credential() {
    let err = offline().require_live().unwrap_err();
    assert!(matches!(err, AdvisorError::CredentialUnavailable));
}
