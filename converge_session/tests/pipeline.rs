use converge::{Operation, OperationKind, OperationPayload, OperationSequence, OperationStatus};
use converge_session::{DocumentSnapshot, Pipeline, PipelineConfig, PipelineError};
use futures::future::join_all;
use pretty_assertions::assert_eq;
use test_case::test_case;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("converge_session=debug")),
        )
        .with_test_writer()
        .try_init();
}

fn insert(position: usize, content: &str) -> OperationPayload {
    OperationPayload::new(OperationKind::Insert, position).with_content(content)
}

fn delete(position: usize, length: usize) -> OperationPayload {
    OperationPayload::new(OperationKind::Delete, position).with_length(length)
}

async fn pipeline_with(session_id: &str, content: &str) -> Pipeline {
    init_logging();

    let pipeline = Pipeline::new(&PipelineConfig::default());
    assert!(pipeline.open_session(session_id, content).await);

    pipeline
}

async fn content(pipeline: &Pipeline, session_id: &str) -> String {
    pipeline.snapshot(session_id).await.unwrap().content
}

#[tokio::test]
async fn test_tied_inserts_converge() {
    let pipeline = pipeline_with("notes", "AC").await;

    pipeline.submit_operation("notes", 0, insert(1, "B")).await.unwrap();
    let second = pipeline.submit_operation("notes", 0, insert(1, "X")).await.unwrap();

    assert_eq!(second.operation, OperationSequence::from(Operation::insert(2, "X")));
    assert_eq!(content(&pipeline, "notes").await, "ABXC");
}

#[tokio::test]
async fn test_stale_delete_is_shifted() {
    let pipeline = pipeline_with("notes", "Hello World").await;

    let first = pipeline.submit_operation("notes", 0, insert(2, "XX")).await.unwrap();
    let second = pipeline.submit_operation("notes", 0, delete(6, 5)).await.unwrap();

    assert_eq!((first.version, second.version), (1, 2));
    assert_eq!(second.base_version, 0);
    assert_eq!(second.status, OperationStatus::Applied);
    assert_eq!(second.operation, OperationSequence::from(Operation::delete(8, 5)));
    assert_eq!(
        pipeline.snapshot("notes").await,
        Ok(DocumentSnapshot {
            version: 2,
            content: "HeXXllo ".to_owned()
        })
    );
}

#[tokio::test]
async fn test_insert_into_concurrently_deleted_text_survives() {
    let pipeline = pipeline_with("delete first", "abcdef").await;
    pipeline.submit_operation("delete first", 0, delete(1, 4)).await.unwrap();
    pipeline.submit_operation("delete first", 0, insert(3, "XY")).await.unwrap();

    pipeline.open_session("insert first", "abcdef").await;
    pipeline.submit_operation("insert first", 0, insert(3, "XY")).await.unwrap();
    let split = pipeline.submit_operation("insert first", 0, delete(1, 4)).await.unwrap();

    assert_eq!(split.operation.len(), 2);
    assert_eq!(content(&pipeline, "delete first").await, "aXYf");
    assert_eq!(content(&pipeline, "insert first").await, "aXYf");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_get_contiguous_versions() {
    let pipeline = pipeline_with("notes", "").await;
    let submitters = 64;

    let results = join_all((0..submitters).map(|i| {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            pipeline
                .submit_operation("notes", 0, insert(0, &format!("{i};")))
                .await
        })
    }))
    .await;

    let mut committed = results
        .into_iter()
        .map(|result| result.unwrap().unwrap())
        .collect::<Vec<_>>();
    committed.sort_by_key(|entry| entry.version);

    assert_eq!(
        committed.iter().map(|entry| entry.version).collect::<Vec<_>>(),
        (1..=submitters).collect::<Vec<u64>>()
    );
    assert_eq!(pipeline.document_version("notes").await, Ok(submitters));

    // every insert targeted the start, so earlier commits stay in front
    let expected = committed
        .iter()
        .map(|entry| match entry.operation.as_single() {
            Some(Operation::Insert { content, .. }) => content.clone(),
            other => panic!("unexpected operation {other:?}"),
        })
        .collect::<String>();
    assert_eq!(content(&pipeline, "notes").await, expected);
}

#[test_case("notes", 1, OperationPayload::new(OperationKind::Insert, 0), "Malformed insert operation: missing required field `content`" ; "malformed payload")]
#[test_case("notes", 0, delete(usize::MAX - 1, 5), "Malformed delete operation: `position + length` overflows" ; "range past usize max")]
#[test_case("notes", 0, delete(3, 1), "Transformed operation cannot be applied: Operation at position 5 spanning 1 characters does not fit into a document of 5 characters" ; "stale delete shifted out of bounds")]
#[test_case("notes", 2, insert(0, "z"), "Base version 2 is ahead of version 1 of session `notes`" ; "future base version")]
#[test_case("drafts", 0, insert(0, "z"), "Session `drafts` not found" ; "unknown session")]
#[tokio::test]
async fn test_rejections_leave_the_session_untouched(
    session_id: &str,
    base_version: u64,
    payload: OperationPayload,
    expected: &str,
) {
    let pipeline = pipeline_with("notes", "abc").await;
    pipeline.submit_operation("notes", 0, insert(0, "xy")).await.unwrap();

    let error = pipeline
        .submit_operation(session_id, base_version, payload)
        .await
        .unwrap_err();

    assert_eq!(error.to_string(), expected);
    assert_eq!(
        pipeline.snapshot("notes").await,
        Ok(DocumentSnapshot {
            version: 1,
            content: "xyabc".to_owned()
        })
    );
}

#[tokio::test]
async fn test_stale_delete_near_usize_max_is_rejected() {
    let pipeline = pipeline_with("notes", "abc").await;
    pipeline.submit_operation("notes", 0, insert(0, "xy")).await.unwrap();

    let submission = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            pipeline
                .submit_operation("notes", 0, delete(usize::MAX - 1, 1))
                .await
        })
    };

    assert!(matches!(
        submission.await.unwrap(),
        Err(PipelineError::OutOfBounds(_))
    ));
    assert_eq!(pipeline.document_version("notes").await, Ok(1));
    assert_eq!(content(&pipeline, "notes").await, "xyabc");
}

#[tokio::test]
async fn test_too_far_behind_is_rejected() {
    let pipeline = Pipeline::new(&PipelineConfig {
        max_backlog: 2,
        ..PipelineConfig::default()
    });
    pipeline.open_session("notes", "abc").await;

    for _ in 0..3 {
        let base_version = pipeline.document_version("notes").await.unwrap();
        pipeline
            .submit_operation("notes", base_version, insert(0, "x"))
            .await
            .unwrap();
    }

    let error = pipeline
        .submit_operation("notes", 0, insert(0, "y"))
        .await
        .unwrap_err();
    assert!(error.is_client_error());
    assert!(matches!(
        error,
        PipelineError::TooManyConcurrentOperations {
            backlog: 3,
            limit: 2,
            ..
        }
    ));

    pipeline
        .submit_operation("notes", 1, insert(0, "y"))
        .await
        .unwrap();
    // committed inserts win the tie at the start
    assert_eq!(content(&pipeline, "notes").await, "xxyxabc");
}

#[tokio::test]
async fn test_subscribers_see_commits_in_order() {
    let pipeline = pipeline_with("notes", "").await;
    let mut updates = pipeline.subscribe("notes").await.unwrap();

    let first = pipeline
        .submit_operation(
            "notes",
            0,
            insert(0, "Hi").with_author("ada", "laptop"),
        )
        .await
        .unwrap();
    let second = pipeline.submit_operation("notes", 1, insert(2, "!")).await.unwrap();

    assert_eq!(updates.recv().await.unwrap(), first);
    assert_eq!(updates.recv().await.unwrap(), second);
    assert_eq!(first.author.as_deref(), Some("ada"));
    assert_eq!(first.client_id.as_deref(), Some("laptop"));
    assert_eq!(
        pipeline.operations_since("notes", 1).await.unwrap(),
        vec![second]
    );
}

#[tokio::test]
async fn test_ended_session_rejects_submissions() {
    let pipeline = pipeline_with("notes", "abc").await;
    let mut updates = pipeline.subscribe("notes").await.unwrap();
    pipeline.submit_operation("notes", 0, insert(3, "d")).await.unwrap();

    pipeline.end_session("notes").await.unwrap();
    pipeline.end_session("notes").await.unwrap();

    assert_eq!(
        pipeline.submit_operation("notes", 1, insert(0, "x")).await,
        Err(PipelineError::SessionEnded("notes".to_owned()))
    );
    assert!(matches!(
        pipeline.subscribe("notes").await,
        Err(PipelineError::SessionEnded(_))
    ));
    assert_eq!(updates.recv().await.unwrap().version, 1);
    assert_eq!(updates.recv().await, Err(RecvError::Closed));

    assert_eq!(pipeline.operations_since("notes", 0).await.unwrap().len(), 1);
    assert_eq!(content(&pipeline, "notes").await, "abcd");
    assert!(!pipeline.open_session("notes", "").await);
}

#[tokio::test]
async fn test_restored_session_continues_the_log() {
    let original = pipeline_with("notes", "Hello").await;
    original.submit_operation("notes", 0, insert(5, " World")).await.unwrap();
    original.submit_operation("notes", 1, delete(0, 1)).await.unwrap();
    let log = original.operations_since("notes", 0).await.unwrap();

    let restored = Pipeline::new(&PipelineConfig::default());
    assert_eq!(
        restored.restore_session("notes", "Hello", log.clone()).await,
        Ok(true)
    );
    assert_eq!(
        restored.restore_session("notes", "Hello", log).await,
        Ok(false)
    );
    assert_eq!(
        restored.snapshot("notes").await,
        original.snapshot("notes").await
    );

    let next = restored
        .submit_operation("notes", 1, insert(0, "J"))
        .await
        .unwrap();
    assert_eq!(next.version, 3);
    assert_eq!(content(&restored, "notes").await, "Jello World");
}

#[tokio::test]
async fn test_restore_rejects_broken_history() {
    let original = pipeline_with("notes", "Hello").await;
    original.submit_operation("notes", 0, delete(0, 5)).await.unwrap();
    let log = original.operations_since("notes", 0).await.unwrap();

    let restored = Pipeline::new(&PipelineConfig::default());

    assert!(matches!(
        restored.restore_session("notes", "Hi", log).await,
        Err(PipelineError::InvalidHistory { .. })
    ));
    assert_eq!(
        restored.snapshot("notes").await,
        Err(PipelineError::SessionNotFound("notes".to_owned()))
    );
}
