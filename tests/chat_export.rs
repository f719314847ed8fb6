mod common;

use mockall::Sequence;
use tempfile::TempDir;

use common::MockService;
use tablecast::{
    error::{BatchError, ServiceError},
    service::{
        chat::{CHAT_ERROR_REPLY, ChatSession},
        generate_email_draft, generate_paraphrased_options, ChatRole,
    },
    table::{chat_export_filename, convert_first_table_to_csv, detect_table, trigger_download},
    tasklet::download::FilesystemSaver,
};

#[test]
fn chat_history_should_be_forwarded_in_order() {
    let mut service = MockService::new();
    let mut seq = Sequence::new();

    service
        .expect_generate()
        .withf(|request| request.prompt == "Compare serde and csv" && request.history.is_empty())
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok("| Crate | Role |\n|---|---|\n| serde | framework |".to_string()));

    service
        .expect_generate()
        .withf(|request| {
            request.prompt == "Thanks"
                && request.history.len() == 2
                && request.history[0].role == ChatRole::User
                && request.history[1].role == ChatRole::Model
                && request.history[1].text.starts_with("| Crate |")
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok("You're welcome.".to_string()));

    let mut session = ChatSession::new();
    session.ask(&service, "Compare serde and csv");
    session.ask(&service, "Thanks");

    assert_eq!(session.messages().len(), 4);
}

#[test]
fn table_in_reply_should_be_exportable() -> Result<(), BatchError> {
    let mut service = MockService::new();
    service
        .expect_generate()
        .returning(|_| Ok("Sure:\n\n| A | B |\n|---|---|\n| 1 | 2 |\n\nAnything else?".to_string()));

    let temp_dir = TempDir::new()?;
    let saver = FilesystemSaver::new(temp_dir.path());
    let mut session = ChatSession::new();

    let reply = session.ask(&service, "give me a table").clone();
    assert!(detect_table(&reply.text));

    let csv = convert_first_table_to_csv(&reply.text).unwrap();
    let filename = chat_export_filename(&reply.id);
    trigger_download(&csv, &filename, &saver);

    let written = std::fs::read_to_string(temp_dir.path().join(&filename))?;
    assert_eq!(written, "\"A\",\"B\"\n\"1\",\"2\"");
    Ok(())
}

#[test]
fn quota_errors_should_become_a_generic_chat_reply() {
    let mut service = MockService::new();
    service
        .expect_generate()
        .returning(|_| Err(ServiceError::RateLimit));

    let mut session = ChatSession::new();
    let reply = session.ask(&service, "hello");

    assert_eq!(reply.text, CHAT_ERROR_REPLY);
    assert!(!detect_table(&reply.text));
}

#[test]
fn paraphrase_errors_should_be_surfaced() {
    let mut service = MockService::new();
    service
        .expect_generate()
        .returning(|_| Err(ServiceError::MissingApiKey));

    let result = generate_paraphrased_options(&service, "ship it");

    match result {
        Err(error) => assert_eq!(error.to_string(), "API Key is missing."),
        Ok(options) => panic!("unexpected options: {:?}", options),
    }
}

#[test]
fn email_request_should_carry_a_schema() -> Result<(), ServiceError> {
    let mut service = MockService::new();
    service
        .expect_generate()
        .withf(|request| {
            request.response_schema.is_some() && request.prompt.contains("Tone: Persuasive")
        })
        .returning(|_| Ok(r#"{"subject":"Proposal","body":"Dear [Name], ..."}"#.to_string()));

    let draft = generate_email_draft(&service, "adopt Rust", "Persuasive")?;

    assert_eq!(draft.subject, "Proposal");
    Ok(())
}
