//! Builder surface tests: chain construction, context narrowing, schema
//! registration, and path naming.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::{ConfigError, RouterConfig};
use crate::error::{ActionError, ActionResult};
use crate::handler::ActionRequest;
use crate::middleware::{EmptyContext, StageRequest};
use crate::response::{ActionResponse, Responder};
use crate::router::{ActionRouter, RunOptions};
use crate::schema::SerdeSchema;

async fn echo(
    request: ActionRequest<EmptyContext, Value>,
    reply: Responder,
) -> ActionResult<ActionResponse<Value>> {
    Ok(reply.data(request.inputs))
}

#[tokio::test]
async fn bare_chain_hands_null_inputs_and_the_root_context_to_the_handler() {
    let action = ActionRouter::new().run(
        |request: ActionRequest<EmptyContext, Value>, reply: Responder| async move {
            assert_eq!(request.context, EmptyContext);
            assert!(request.inputs.is_null());
            Ok::<_, ActionError>(reply.data("done"))
        },
    );

    let response = action.invoke(json!({"ignored": true})).await.unwrap();
    assert_eq!(response.into_data(), Some("done"));
}

#[tokio::test]
async fn middleware_narrows_the_context_for_later_stages_and_the_handler() {
    #[derive(Debug, Clone, PartialEq)]
    struct UserContext {
        user: String,
    }

    let action = ActionRouter::new()
        .use_middleware(|_request: StageRequest<EmptyContext>| async move {
            Ok::<_, ActionError>(UserContext {
                user: "ada".to_string(),
            })
        })
        .use_middleware(|request: StageRequest<UserContext>| async move {
            assert_eq!(request.context.user, "ada");
            Ok::<_, ActionError>(request.context)
        })
        .run(
            |request: ActionRequest<UserContext, Value>, reply: Responder| async move {
                Ok::<_, ActionError>(reply.data(request.context.user))
            },
        );

    assert_eq!(action.stage_count(), 2);
    let response = action.invoke(Value::Null).await.unwrap();
    assert_eq!(response.into_data(), Some("ada".to_string()));
}

#[tokio::test]
async fn schema_output_reaches_the_handler_typed() {
    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Doubling {
        value: i64,
    }

    let action = ActionRouter::new()
        .input(SerdeSchema::<Doubling>::new())
        .unwrap()
        .run(
            |request: ActionRequest<EmptyContext, Doubling>, reply: Responder| async move {
                Ok::<_, ActionError>(reply.data(request.inputs.value * 2))
            },
        );

    assert!(action.has_schema());
    let response = action.invoke(json!({"value": 21})).await.unwrap();
    assert_eq!(response.into_data(), Some(42));
}

#[tokio::test]
async fn stages_before_the_schema_observe_null_inputs() {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    let action = ActionRouter::new()
        .use_middleware(move |request: StageRequest<EmptyContext>| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(request.inputs.clone());
                Ok::<_, ActionError>(request.context)
            }
        })
        .input(SerdeSchema::<Value>::new())
        .unwrap()
        .run(echo);

    let response = action.invoke(json!({"k": 1})).await.unwrap();
    assert_eq!(response.into_data(), Some(json!({"k": 1})));
    assert_eq!(seen.lock().unwrap().as_slice(), &[Value::Null]);
}

#[test]
fn a_second_schema_registration_is_rejected() {
    let validated = ActionRouter::new()
        .input(SerdeSchema::<Value>::new())
        .unwrap();
    let err = validated.input(SerdeSchema::<Value>::new()).unwrap_err();
    assert!(matches!(err, ConfigError::SchemaAlreadyRegistered));
}

#[tokio::test]
async fn declared_errors_surface_their_code_and_message() {
    let action = ActionRouter::new().run(
        |_request: ActionRequest<EmptyContext, Value>, _reply: Responder| async move {
            Err::<ActionResponse<()>, _>(ActionError::declared("forbidden", "nope"))
        },
    );

    let response = action.invoke(Value::Null).await.unwrap();
    let error = response.error().unwrap();
    assert_eq!(error.code, "forbidden");
    assert_eq!(error.message, "nope");
}

#[tokio::test]
async fn responder_resolves_configured_codes_and_honors_overrides() {
    let config = RouterConfig::new().with_error_code("unauthorized", "Access denied");

    let action = ActionRouter::with_config(config.clone()).run(
        |_request: ActionRequest<EmptyContext, Value>, reply: Responder| async move {
            Ok::<_, ActionError>(reply.error::<()>("unauthorized"))
        },
    );
    let response = action.invoke(Value::Null).await.unwrap();
    assert_eq!(response.error().unwrap().message, "Access denied");

    let action = ActionRouter::with_config(config).run(
        |_request: ActionRequest<EmptyContext, Value>, reply: Responder| async move {
            Ok::<_, ActionError>(reply.error_with::<()>("unauthorized", "custom"))
        },
    );
    let response = action.invoke(Value::Null).await.unwrap();
    assert_eq!(response.error().unwrap().message, "custom");
}

#[tokio::test]
async fn paths_join_chain_stage_and_action_names_lowercased() {
    let action = ActionRouter::with_config(RouterConfig::new().with_name("Billing"))
        .use_middleware_named("Auth", |request: StageRequest<EmptyContext>| async move {
            Ok::<_, ActionError>(request.context)
        })
        .run_with(echo, RunOptions::new().with_name("Charge"));

    assert_eq!(action.path(), "billing/auth/charge");
    assert_eq!(action.stage_count(), 1);
}

#[tokio::test]
async fn cloned_actions_share_the_frozen_pipeline() {
    let action = ActionRouter::new().run(echo);
    let clone = action.clone();

    assert_eq!(clone.path(), action.path());
    let response = clone.invoke(json!(7)).await.unwrap();
    assert_eq!(response.into_data(), Some(json!(7)));
}
