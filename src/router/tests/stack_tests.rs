//! Engine tests exercising schema placement and sequential stage execution
//! directly against the stack, including positions the public builders never
//! produce.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use crate::error::{ActionError, ActionResult};
use crate::middleware::{EmptyContext, StageRequest};
use crate::router::stack::execute_middleware_stack;
use crate::router::types::{BoxedParse, SchemaSlot, StageEntry};
use crate::router::wrapper::wrap_stage;
use crate::schema::SchemaViolation;
use crate::transport::{Cookies, Headers};

fn slot_at(index: usize) -> SchemaSlot {
    let parse: BoxedParse = Arc::new(|raw| Box::pin(async move { Ok(raw) }));
    SchemaSlot { parse, index }
}

fn counting_slot(index: usize, calls: Arc<AtomicUsize>) -> SchemaSlot {
    let parse: BoxedParse = Arc::new(move |raw| {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move { Ok(raw) })
    });
    SchemaSlot { parse, index }
}

fn rejecting_slot(index: usize) -> SchemaSlot {
    let parse: BoxedParse = Arc::new(|_raw| {
        Box::pin(async move {
            Err(ActionError::from(SchemaViolation::new("bad payload")))
        })
    });
    SchemaSlot { parse, index }
}

fn recording_stage(log: &Arc<Mutex<Vec<Value>>>) -> StageEntry {
    let log = Arc::clone(log);
    wrap_stage::<EmptyContext, _>(
        move |request: StageRequest<EmptyContext>| {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(request.inputs.clone());
                Ok::<_, ActionError>(request.context)
            }
        },
        "root".to_string(),
    )
}

async fn run_stack(
    stages: &[StageEntry],
    schema: Option<&SchemaSlot>,
    raw: Value,
) -> ActionResult<crate::router::types::PipelineContext> {
    execute_middleware_stack(
        stages,
        schema,
        raw,
        Cookies::new(),
        Headers::new(),
        Box::new(EmptyContext),
    )
    .await
}

#[tokio::test]
async fn schema_at_index_zero_is_visible_to_every_stage() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stages = vec![recording_stage(&log), recording_stage(&log)];

    let ctx = run_stack(&stages, Some(&slot_at(0)), json!({"k": 1}))
        .await
        .unwrap();

    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[json!({"k": 1}), json!({"k": 1})]
    );
    assert_eq!(ctx.inputs, json!({"k": 1}));
}

#[tokio::test]
async fn schema_mid_chain_splits_visibility_at_its_index() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stages = vec![
        recording_stage(&log),
        recording_stage(&log),
        recording_stage(&log),
    ];

    run_stack(&stages, Some(&slot_at(1)), json!("parsed"))
        .await
        .unwrap();

    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[Value::Null, json!("parsed"), json!("parsed")]
    );
}

#[tokio::test]
async fn schema_past_the_last_stage_validates_after_every_stage() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stages = vec![recording_stage(&log), recording_stage(&log)];

    let ctx = run_stack(&stages, Some(&slot_at(5)), json!("late"))
        .await
        .unwrap();

    assert_eq!(log.lock().unwrap().as_slice(), &[Value::Null, Value::Null]);
    assert_eq!(ctx.inputs, json!("late"));
}

#[tokio::test]
async fn without_a_schema_the_inputs_slot_stays_null() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stages = vec![recording_stage(&log)];

    let ctx = run_stack(&stages, None, json!({"dropped": true}))
        .await
        .unwrap();

    assert_eq!(log.lock().unwrap().as_slice(), &[Value::Null]);
    assert!(ctx.inputs.is_null());
    assert!(ctx.state.downcast::<EmptyContext>().is_ok());
}

#[tokio::test]
async fn the_schema_parses_at_most_once_per_invocation() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let calls = Arc::new(AtomicUsize::new(0));
    let stages = vec![
        recording_stage(&log),
        recording_stage(&log),
        recording_stage(&log),
    ];

    run_stack(
        &stages,
        Some(&counting_slot(0, Arc::clone(&calls))),
        json!(1),
    )
    .await
    .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn a_rejected_parse_stops_the_pipeline_at_the_schema_index() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let stages = vec![recording_stage(&log), recording_stage(&log)];

    let err = run_stack(&stages, Some(&rejecting_slot(1)), json!(1))
        .await
        .unwrap_err();

    assert!(matches!(err, ActionError::Invalid(_)));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn a_raw_stage_error_is_classified_with_its_registration_path() {
    let failing = wrap_stage::<EmptyContext, _>(
        |_request: StageRequest<EmptyContext>| async move {
            Err::<EmptyContext, _>(ActionError::other("db down"))
        },
        "root/broken".to_string(),
    );

    let err = run_stack(&[failing], None, Value::Null).await.unwrap_err();
    assert!(err.is_unhandled());
    assert_eq!(err.path(), Some("root/broken"));
}

#[tokio::test]
async fn stages_run_sequentially_and_thread_their_context() {
    #[derive(Debug)]
    struct Counting {
        n: u32,
    }

    let first = wrap_stage::<EmptyContext, _>(
        |_request: StageRequest<EmptyContext>| async move {
            Ok::<_, ActionError>(Counting { n: 1 })
        },
        "root".to_string(),
    );
    let second = wrap_stage::<Counting, _>(
        |request: StageRequest<Counting>| async move {
            assert_eq!(request.context.n, 1);
            Ok::<_, ActionError>(Counting {
                n: request.context.n + 1,
            })
        },
        "root".to_string(),
    );

    let ctx = execute_middleware_stack(
        &[first, second],
        None,
        Value::Null,
        Cookies::new(),
        Headers::new(),
        Box::new(EmptyContext),
    )
    .await
    .unwrap();

    let counting = ctx.state.downcast::<Counting>().unwrap();
    assert_eq!(counting.n, 2);
}
