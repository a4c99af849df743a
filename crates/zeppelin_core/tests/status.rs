use zeppelin_core::Status;

#[test]
fn terminal_set_is_finished_error_abort() {
    let terminal: Vec<_> = Status::ALL
        .into_iter()
        .filter(|status| status.is_terminal())
        .collect();
    assert_eq!(terminal, vec![Status::Finished, Status::Error, Status::Abort]);
}

#[test]
fn known_literals_decode_to_their_variant() {
    for status in Status::ALL {
        assert_eq!(Status::from_literal(status.as_str()), status);
        assert_eq!(status.to_string(), status.as_str());
    }
    assert_eq!(Status::from_literal("running"), Status::Running);
}

#[test]
fn unrecognised_or_absent_literal_is_unknown() {
    assert_eq!(Status::from_literal("QUEUED"), Status::Unknown);
    assert_eq!(Status::from_literal(""), Status::Unknown);
    assert_eq!(Status::from(None), Status::Unknown);
}
