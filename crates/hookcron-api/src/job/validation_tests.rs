use super::*;

fn valid_fields() -> JobFields {
    JobFields {
        name: "nightly-report".into(),
        trigger_type: "cron".into(),
        expression: "0 3 * * *".into(),
        http_method: "POST".into(),
        http_target_url: "https://example.com/hook?source=hookcron".into(),
        http_request_body: String::new(),
        json_web_token: String::new(),
    }
}

fn validation_message(result: JobResult<impl std::fmt::Debug>) -> String {
    match result {
        Err(JobError::Validation(message)) => message,
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_valid_create_passes() {
    let spec = validate_create(valid_fields()).unwrap();
    assert_eq!(spec.name, "nightly-report");
    assert_eq!(spec.expression, "0 3 * * *");
}

#[test]
fn test_name_length_bounds() {
    let mut fields = valid_fields();
    fields.name = "x".repeat(MAX_NAME_LEN);
    assert!(validate_create(fields.clone()).is_ok());

    fields.name = "x".repeat(MAX_NAME_LEN + 1);
    assert!(validation_message(validate_create(fields.clone())).contains("name"));

    fields.name.clear();
    assert!(validation_message(validate_create(fields)).contains("name"));
}

#[test]
fn test_unknown_trigger_type() {
    let mut fields = valid_fields();
    fields.trigger_type = "hourly".into();
    assert!(validation_message(validate_create(fields)).contains("triggerType 'hourly'"));
}

#[test]
fn test_blank_expression() {
    let mut fields = valid_fields();
    fields.expression = "  ".into();
    assert!(validation_message(validate_create(fields)).contains("expression"));
}

#[test]
fn test_method_is_case_sensitive() {
    let mut fields = valid_fields();
    fields.http_method = "post".into();
    assert!(validation_message(validate_create(fields.clone())).contains("httpMethod"));

    fields.http_method = "PATCH".into();
    assert!(validation_message(validate_create(fields)).contains("httpMethod"));
}

#[test]
fn test_target_url_rules() {
    for bad in ["", "example.com/hook", "/relative", "ftp://example.com/file", "http://"] {
        let mut fields = valid_fields();
        fields.http_target_url = bad.into();
        assert!(
            validation_message(validate_create(fields)).contains("httpTargetUrl"),
            "accepted {:?}",
            bad
        );
    }

    let mut fields = valid_fields();
    fields.http_target_url = "http://127.0.0.1:9000/x".into();
    assert!(validate_create(fields).is_ok());
}

#[test]
fn test_all_problems_reported_together() {
    let message = validation_message(validate_create(JobFields::default()));
    assert!(message.contains("name"));
    assert!(message.contains("triggerType"));
    assert!(message.contains("expression"));
    assert!(message.contains("httpMethod"));
    assert!(message.contains("httpTargetUrl"));
}

#[test]
fn test_replace_status_values() {
    let enable = validate_replace(DesiredJob {
        status: 1,
        fields: valid_fields(),
    })
    .unwrap();
    assert_eq!(enable.status, JobStatus::Enabled);

    let disable = validate_replace(DesiredJob {
        status: 2,
        fields: valid_fields(),
    })
    .unwrap();
    assert_eq!(disable.status, JobStatus::Disabled);

    for status in [0, 3, -1] {
        let message = validation_message(validate_replace(DesiredJob {
            status,
            fields: valid_fields(),
        }));
        assert!(message.contains("status"));
    }
}

#[test]
fn test_job_id_must_be_uuid_v4() {
    assert!(validate_job_id(&Uuid::new_v4().to_string()).is_ok());
    assert!(validate_job_id("not-a-uuid").is_err());
    // Version 1 UUID
    assert!(validate_job_id("c232ab00-9414-11ec-b3c8-9f6bdeced846").is_err());
}
