use std::sync::{Arc, Mutex};

use fieldrelay::form::{
    FieldController, FieldOptions, FormController, FormData, FormError, FormMethod, FormOptions,
    FormRecord, InMemoryTransport, ResetTrigger, SubmitEvent, SubmitOutcome, SubmitTrigger,
    ValueBinding, rules,
};

#[derive(Clone, Debug, PartialEq, FormRecord)]
struct Signup {
    email: String,
    password: String,
    #[form(name = "password_confirm")]
    confirm: String,
    age: Option<u32>,
}

struct SignupForm {
    form: FormController,
    password: ValueBinding,
    email: FieldController,
    password_field: FieldController,
    confirm: FieldController,
    age: FieldController,
    received: Arc<Mutex<Vec<Signup>>>,
}

fn signup_form() -> SignupForm {
    let form = FormController::default();
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    form.set_record_handler(move |_event: &SubmitEvent, record: Signup| {
        sink.lock().expect("sink").push(record);
        Ok(())
    })
    .expect("record handler");

    let dispatch = form.dispatch();
    let password = ValueBinding::default();
    let email = FieldController::mount(
        &dispatch,
        FieldOptions::new("email")
            .required(true)
            .before_validate(|value| value.trim().to_string())
            .validator(rules::email("Enter a valid email")),
    )
    .expect("mount email");
    let password_field = FieldController::mount(
        &dispatch,
        FieldOptions::new("password")
            .required(true)
            .controlled(password.clone())
            .validator(rules::min_length(8, "At least 8 characters")),
    )
    .expect("mount password");
    let confirm = FieldController::mount(
        &dispatch,
        FieldOptions::new("password_confirm")
            .required(true)
            .validator(rules::equals_binding(password.clone(), "Passwords differ")),
    )
    .expect("mount confirm");
    let age = FieldController::mount(&dispatch, FieldOptions::new("age")).expect("mount age");

    SignupForm {
        form,
        password,
        email,
        password_field,
        confirm,
        age,
        received,
    }
}

fn received(form: &SignupForm) -> Vec<Signup> {
    form.received.lock().expect("received").clone()
}

#[test]
fn signup_waits_for_every_field_then_delivers_typed_record() {
    let signup = signup_form();

    assert_eq!(
        signup.form.submit().expect("first submit"),
        SubmitOutcome::Deferred
    );
    for field in [&signup.email, &signup.password_field, &signup.confirm] {
        assert_eq!(
            field.messages().expect("messages"),
            vec!["This field is required"]
        );
    }
    assert!(signup.age.is_valid().expect("optional age"));

    signup.email.input(" ada@example.com ").expect("email");
    signup.email.blur().expect("blur email");
    signup.password_field.input("correct horse").expect("password");
    signup.password_field.blur().expect("blur password");
    assert_eq!(signup.password.get().expect("binding"), "correct horse");
    assert!(received(&signup).is_empty());

    signup.confirm.input("correct horse").expect("confirm");
    signup.confirm.blur().expect("blur confirm");

    assert_eq!(
        received(&signup),
        vec![Signup {
            email: " ada@example.com ".to_string(),
            password: "correct horse".to_string(),
            confirm: "correct horse".to_string(),
            age: None,
        }]
    );
}

#[test]
fn editing_after_a_failed_attempt_requires_a_new_submit() {
    let signup = signup_form();
    signup.form.submit().expect("submit");

    signup.email.focus().expect("focus");
    signup.email.input("ada@example.com").expect("email");
    signup.email.blur().expect("blur");
    signup.password_field.input("correct horse").expect("password");
    signup.password_field.blur().expect("blur");
    signup.confirm.input("correct horse").expect("confirm");
    signup.confirm.blur().expect("blur");
    assert!(signup.form.is_valid().expect("valid"));
    assert!(received(&signup).is_empty());

    let outcome = SubmitTrigger::new().activate(&signup.form).expect("resubmit");
    assert_eq!(outcome, SubmitOutcome::Submitted);
    assert_eq!(received(&signup).len(), 1);
}

#[test]
fn reset_returns_every_field_to_its_defaults() {
    let signup = signup_form();
    signup.email.input("ada@example.com").expect("email");
    signup.password_field.input("correct horse").expect("password");
    signup.age.input("36").expect("age");
    signup.form.submit().expect("submit");

    let cleared = ResetTrigger::new(signup.form.dispatch())
        .activate()
        .expect("reset");

    assert_eq!(cleared, 4);
    assert_eq!(signup.password.get().expect("binding cleared"), "");
    assert_eq!(signup.age.value().expect("age"), "");
    assert!(!signup.form.submit_signal().expect("signal"));
    assert!(!signup.form.is_valid().expect("required fields blank"));
    assert!(signup.email.messages().expect("messages").is_empty());
}

#[test]
fn unparsable_value_surfaces_as_decode_error() {
    let signup = signup_form();
    signup.email.input("ada@example.com").expect("email");
    signup.password_field.input("correct horse").expect("password");
    signup.confirm.input("correct horse").expect("confirm");
    signup.age.input("thirty").expect("age");

    assert_eq!(
        signup.form.submit().expect("submit"),
        SubmitOutcome::Deferred
    );
    assert!(signup.form.is_valid().expect("every rule passed"));

    let error = signup.form.replay_pending().expect_err("age does not parse");
    assert!(matches!(error, FormError::InvalidValue { field: "age", .. }));
    assert!(received(&signup).is_empty());
    assert!(!signup.form.has_pending_submit().expect("attempt consumed"));
}

#[test]
fn dropping_a_form_section_unregisters_its_fields() {
    let form = FormController::default();
    let dispatch = form.dispatch();
    let name = FieldController::mount(&dispatch, FieldOptions::new("name").initial_value("Ada"))
        .expect("mount name");
    {
        let _section = (0..3)
            .map(|index| {
                FieldController::mount(
                    &dispatch,
                    FieldOptions::new(format!("extra_{index}")).required(true),
                )
                .expect("mount extra")
            })
            .collect::<Vec<_>>();
        assert_eq!(form.field_count().expect("count"), 4);
        assert!(!form.is_valid().expect("extras blank"));
    }

    assert_eq!(form.field_count().expect("count"), 1);
    assert!(form.is_valid().expect("only name left"));
    assert_eq!(
        form.collect().expect("collect"),
        FormData::from_iter([("name", "Ada")])
    );
    assert_eq!(form.clear_all().expect("clear"), 1);
    assert_eq!(name.value().expect("name"), "");
}

#[test]
fn get_forms_without_handler_encode_into_the_action() {
    let form = FormController::new(FormOptions {
        action: "/search?lang=en".to_string(),
        method: FormMethod::Get,
        allow_empty_submit: false,
    });
    let transport = InMemoryTransport::new();
    form.set_transport(transport.clone()).expect("transport");
    let _query = FieldController::mount(
        &form.dispatch(),
        FieldOptions::new("q").initial_value("rust & forms"),
    )
    .expect("mount query");

    SubmitTrigger::named("go").activate(&form).expect("submit");

    let delivered = transport.deliveries();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].action, "/search?lang=en&q=rust+%26+forms");
    assert!(delivered[0].body.is_empty());
}

#[test]
fn form_options_deserialize_with_defaults() {
    let options: FormOptions =
        serde_json::from_str(r#"{"action":"/login"}"#).expect("options json");
    assert_eq!(options.action, "/login");
    assert_eq!(options.method, FormMethod::Post);
    assert!(!options.allow_empty_submit);
}
