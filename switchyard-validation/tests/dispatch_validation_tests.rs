use async_trait::async_trait;
use std::sync::Arc;
use switchyard_core::{
    Action, ActionSpec, Dispatcher, Error, InputValidationSpec, MvcContext, RouteRegistry,
};
use switchyard_validation::{FieldSpec, FieldSpecList, Rule};

struct Register;

#[async_trait]
impl Action for Register {
    async fn execute(&self, ctx: &mut MvcContext, _: &Dispatcher) -> Result<(), Error> {
        ctx.set_view("registered");
        Ok(())
    }
}

fn fields() -> Arc<FieldSpecList> {
    Arc::new(
        FieldSpecList::new(vec![
            FieldSpec::new("email").required().rule(Rule::Email),
            FieldSpec::new("password")
                .required()
                .rule(Rule::MinLength { value: 8 }),
        ])
        .unwrap(),
    )
}

fn dispatcher() -> Dispatcher {
    let registry = RouteRegistry::builder()
        .register_action("Register", || Register)
        .action("register", ActionSpec::new("Register"))
        .input_validation(
            "register",
            InputValidationSpec::new(fields()).error_code(422),
        )
        .action("register.soft", ActionSpec::new("Register"))
        .input_validation(
            "register.soft",
            InputValidationSpec::new(fields()).throw_on_failure(false),
        )
        .action("register.off", ActionSpec::new("Register"))
        .input_validation("register.off", InputValidationSpec::new(fields()).enabled(false))
        .build()
        .unwrap();

    Dispatcher::new(Arc::new(registry))
}

#[tokio::test]
async fn test_valid_input_executes() {
    let mut ctx = MvcContext::new("register")
        .with_input("email", "ada@example.com")
        .with_input("password", "correct horse");

    dispatcher().dispatch(&mut ctx).await.unwrap();
    assert!(ctx.view().is_some());
    assert!(ctx.validation_errors().is_empty());
}

#[tokio::test]
async fn test_invalid_input_fails_with_declared_code() {
    let mut ctx = MvcContext::new("register").with_input("email", "nope");

    let err = dispatcher().dispatch(&mut ctx).await.unwrap_err();
    assert_eq!(err.status_code(), 422);
    assert!(err.to_string().contains("email must be a valid email"));
    assert!(err.to_string().contains("password is required"));
    assert!(ctx.view().is_none());
}

#[tokio::test]
async fn test_tolerated_failure_records_errors() {
    let mut ctx = MvcContext::new("register.soft").with_input("password", "short");

    dispatcher().dispatch(&mut ctx).await.unwrap();
    let fields: Vec<_> = ctx
        .validation_errors()
        .iter()
        .map(|e| e.field.as_str())
        .collect();
    assert_eq!(fields, vec!["email", "password"]);
    assert!(ctx.view().is_some());
}

#[tokio::test]
async fn test_disabled_validation_is_skipped() {
    let mut ctx = MvcContext::new("register.off");
    dispatcher().dispatch(&mut ctx).await.unwrap();
    assert!(ctx.validation_errors().is_empty());
}
