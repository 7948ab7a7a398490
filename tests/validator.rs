use kite::validate::{self, Rules, VarError};

#[test]
fn malformed_email_reports_one_email_violation() {
    let Err(VarError::Invalid(errors)) = validate::var("admin#admin.com", "required,email") else {
        panic!("expected a validation failure");
    };

    let tags: Vec<_> = errors.iter().map(|e| e.tag()).collect();
    assert_eq!(tags, ["email"]);
    assert_eq!(
        errors.to_string(),
        "Key: '' Error:Field validation for '' failed on the 'email' tag"
    );
    assert_eq!(errors.errors()[0].value(), "admin#admin.com");
}

#[test]
fn empty_value_reports_required_violation() {
    let Err(VarError::Invalid(errors)) = validate::var("", "required,email") else {
        panic!("expected a validation failure");
    };

    assert!(errors.has_tag("required"));
    assert_eq!(errors.errors()[0].value(), "");
}

#[test]
fn compiled_rules_are_reusable() {
    let rules: Rules = "required,email".parse().unwrap();
    assert_eq!(rules.rules().len(), 2);
    assert!(rules.check("admin@admin.com").is_ok());
    assert!(rules.check("admin").is_err());
}

#[test]
fn unknown_tag_is_a_rule_error() {
    assert!(matches!(validate::var("x", "required,emial"), Err(VarError::Rule(_))));
}
