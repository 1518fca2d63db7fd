//! In-memory repository contract tests.

use std::sync::Arc;

use super::helpers::{repo, request};
use chrono::Utc;
use errand::task_letter::{
    adapters::memory::InMemoryTaskLetterRepository,
    domain::{OfficialCompletion, RegisterNumber, TaskLetterId, TaskLetterPatch},
    ports::{TaskLetterRepository, TaskLetterRepositoryError},
    services::TaskLetterService,
};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identifiers_are_assigned_sequentially(repo: Arc<InMemoryTaskLetterRepository>) {
    let service = TaskLetterService::new(Arc::clone(&repo), Arc::new(DefaultClock));

    let mut ids = Vec::new();
    for number in ["A-1", "A-2", "A-3"] {
        let letter = service
            .create(request(number))
            .await
            .expect("task letter creation should succeed");
        ids.push(letter.id().value());
    }

    assert_eq!(ids, vec![1, 2, 3]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn identifiers_are_not_reused_after_delete(repo: Arc<InMemoryTaskLetterRepository>) {
    let service = TaskLetterService::new(Arc::clone(&repo), Arc::new(DefaultClock));
    let first = service
        .create(request("B-1"))
        .await
        .expect("task letter creation should succeed");
    service
        .delete(first.id())
        .await
        .expect("delete should succeed");

    let second = service
        .create(request("B-2"))
        .await
        .expect("task letter creation should succeed");

    assert_eq!(second.id().value(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_creates_keep_register_numbers_unique(
    repo: Arc<InMemoryTaskLetterRepository>,
) {
    let service = Arc::new(TaskLetterService::new(
        Arc::clone(&repo),
        Arc::new(DefaultClock),
    ));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let worker = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            worker.create(request("C-1")).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.expect("task should not panic").is_ok() {
            successes += 1;
        }
    }
    let listed = repo
        .list_newest_first()
        .await
        .expect("listing should succeed");

    assert_eq!(successes, 1);
    assert_eq!(listed.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_of_missing_letter_is_reported(repo: Arc<InMemoryTaskLetterRepository>) {
    let service = TaskLetterService::new(Arc::clone(&repo), Arc::new(DefaultClock));
    let created = service
        .create(request("D-1"))
        .await
        .expect("task letter creation should succeed");
    repo.delete(created.id())
        .await
        .expect("delete should succeed");

    let patched = repo
        .update_fields(created.id(), &TaskLetterPatch::default(), Utc::now())
        .await;
    let recorded = repo
        .update_official_details(created.id(), &OfficialCompletion::new(), Utc::now())
        .await;

    assert!(matches!(
        patched,
        Err(TaskLetterRepositoryError::NotFound(id)) if id == created.id()
    ));
    assert!(matches!(
        recorded,
        Err(TaskLetterRepositoryError::NotFound(id)) if id == created.id()
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn renumbering_onto_a_taken_register_number_is_rejected(
    repo: Arc<InMemoryTaskLetterRepository>,
) {
    let service = TaskLetterService::new(Arc::clone(&repo), Arc::new(DefaultClock));
    service
        .create(request("F-1"))
        .await
        .expect("task letter creation should succeed");
    let second = service
        .create(request("F-2"))
        .await
        .expect("task letter creation should succeed");
    let patch = TaskLetterPatch {
        register_number: Some(RegisterNumber::new("F-1").expect("valid register number")),
        ..TaskLetterPatch::default()
    };

    let result = repo.update_fields(second.id(), &patch, Utc::now()).await;
    let unchanged = repo
        .find_by_id(second.id())
        .await
        .expect("lookup should succeed");

    assert!(matches!(
        result,
        Err(TaskLetterRepositoryError::DuplicateRegisterNumber(ref number)) if number.as_str() == "F-1"
    ));
    assert_eq!(unchanged, Some(second));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lookup_by_register_number_uses_trimmed_value(repo: Arc<InMemoryTaskLetterRepository>) {
    let service = TaskLetterService::new(Arc::clone(&repo), Arc::new(DefaultClock));
    let created = service
        .create(request("  E-1  "))
        .await
        .expect("task letter creation should succeed");

    let found = repo
        .find_by_register_number(&RegisterNumber::new("E-1").expect("valid register number"))
        .await
        .expect("lookup should succeed");
    let missing = repo
        .find_by_id(TaskLetterId::new(99).expect("positive id"))
        .await
        .expect("lookup should succeed");

    assert_eq!(found, Some(created));
    assert!(missing.is_none());
}
