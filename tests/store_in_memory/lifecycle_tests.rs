//! Laziness, connection independence, and release guarantees.

use super::helpers::{StoreHarness, harness};
use doctask::bson::doc;
use doctask::store::{
    adapters::{
        MissingDatabaseError,
        memory::{FailureStage, InMemoryDocumentDriver},
    },
    domain::{CollectionName, DatabaseName, FieldKey, StoreConfig, StoreUrl},
    ports::DriverError,
    services::TaskAdapter,
};
use futures::future::join_all;
use rstest::rstest;
use std::sync::{Arc, Mutex};

#[rstest]
#[tokio::test]
async fn building_tasks_causes_no_driver_activity(harness: StoreHarness) -> eyre::Result<()> {
    let find = harness.adapter.find(doc! {}).from(harness.collection.clone());
    let distinct = harness
        .adapter
        .distinct(FieldKey::new("a")?)
        .from(harness.collection.clone());
    let insert = harness
        .adapter
        .insert(doc! { "a": 1 })
        .to(harness.collection.clone());
    let composed = harness
        .adapter
        .open(harness.collection.clone())
        .map(|handle| handle.connection_id());

    assert_eq!(harness.stats()?.connect_attempts, 0);

    insert.run().await?;
    assert_eq!(harness.stats()?.connect_attempts, 1);

    drop((find, distinct, composed));
    assert_eq!(harness.stats()?.connect_attempts, 1);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn opening_twice_yields_independent_connections(harness: StoreHarness) -> eyre::Result<()> {
    harness.seed([doc! { "a": 1 }])?;

    let first = harness.adapter.open(harness.collection.clone()).run().await?;
    let second = harness.adapter.open(harness.collection.clone()).run().await?;
    assert_ne!(first.connection_id(), second.connection_id());
    assert_eq!(harness.stats()?.open, 2);

    first.close(()).resolve().await;

    assert!(first.is_released());
    assert!(!second.is_released());
    let found = second.find(doc! {}).run().await?;
    assert_eq!(found.len(), 1);
    assert_eq!(harness.stats()?.open, 1);

    second.close(()).resolve().await;
    assert_eq!(harness.stats()?.open, 0);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn connect_failure_fails_the_task_and_skips_close(harness: StoreHarness) -> eyre::Result<()> {
    harness
        .driver
        .fail_next(FailureStage::Connect, "auth failed for user app")?;

    let result = harness
        .adapter
        .find(doc! {})
        .from(harness.collection.clone())
        .run()
        .await;

    let Err(error) = result else {
        eyre::bail!("expected connect failure");
    };
    assert!(error.is_connect());
    assert_eq!(error.driver_error().to_string(), "auth failed for user app");

    let stats = harness.stats()?;
    assert_eq!(stats.connect_attempts, 1);
    assert_eq!(stats.opened, 0);
    assert_eq!(stats.closed, 0);
    Ok(())
}

#[rstest]
#[case::no_scheme("localhost:27017/inventory")]
#[case::no_database("memory://localhost:27017")]
#[tokio::test]
async fn unusable_urls_fail_at_connect_without_retry(#[case] url: &str) -> eyre::Result<()> {
    let driver = Arc::new(InMemoryDocumentDriver::new());
    let adapter = TaskAdapter::new(Arc::clone(&driver), StoreConfig::new(StoreUrl::new(url)?));

    let result = adapter
        .open(CollectionName::new("items")?)
        .run()
        .await;

    assert!(matches!(result, Err(DriverError::Connect(_))));
    assert_eq!(driver.stats()?.connect_attempts, 1);
    Ok(())
}

#[tokio::test]
async fn missing_database_error_is_preserved_for_callers() -> eyre::Result<()> {
    let driver = Arc::new(InMemoryDocumentDriver::new());
    let config = StoreConfig::new(StoreUrl::new("memory://localhost")?);
    let adapter = TaskAdapter::new(driver, config);

    let Err(error) = adapter.open(CollectionName::new("items")?).run().await else {
        eyre::bail!("expected connect failure");
    };

    assert_eq!(
        error.downcast_ref::<MissingDatabaseError>(),
        Some(&MissingDatabaseError)
    );
    Ok(())
}

#[tokio::test]
async fn configured_database_overrides_the_url_path() -> eyre::Result<()> {
    let driver = Arc::new(InMemoryDocumentDriver::new());
    let archive = DatabaseName::new("archive")?;
    let collection = CollectionName::new("items")?;
    driver.seed(&archive, &collection, [doc! { "from": "archive" }])?;

    let config = StoreConfig::new(StoreUrl::new("memory://localhost/inventory")?)
        .with_database(archive);
    let found = TaskAdapter::new(driver, config)
        .find(doc! {})
        .from(collection)
        .run()
        .await?;

    assert_eq!(found, vec![doc! { "from": "archive" }]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn close_passes_any_value_through_even_when_already_released(
    harness: StoreHarness,
) -> eyre::Result<()> {
    let handle = harness.adapter.open(harness.collection.clone()).run().await?;
    handle.close(()).resolve().await;

    assert_eq!(handle.close("text").resolve().await, "text");
    assert_eq!(handle.close(vec![1, 2, 3]).resolve().await, vec![1, 2, 3]);
    assert_eq!(handle.close(Some('x')).resolve().await, Some('x'));
    assert_eq!(harness.stats()?.closed, 1);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn concurrent_chains_each_release_their_own_connection(
    harness: StoreHarness,
) -> eyre::Result<()> {
    harness.seed([doc! { "a": 1 }, doc! { "a": 2 }])?;
    harness.driver.fail_next(FailureStage::Find, "one query fails")?;

    let tasks = (0..8).map(|_| {
        harness
            .adapter
            .find(doc! { "a": 1 })
            .from(harness.collection.clone())
            .run()
    });
    let outcomes = join_all(tasks).await;

    let failures = outcomes.iter().filter(|outcome| outcome.is_err()).count();
    assert_eq!(failures, 1);
    for found in outcomes.into_iter().flatten() {
        assert_eq!(found, vec![doc! { "a": 1 }]);
    }

    let stats = harness.stats()?;
    assert_eq!(stats.opened, 8);
    assert_eq!(stats.closed, 8);
    assert_eq!(stats.open, 0);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn fork_delivers_the_outcome_to_callbacks(harness: StoreHarness) -> eyre::Result<()> {
    harness.seed([doc! { "a": 1 }])?;
    let delivered = Arc::new(Mutex::new(None));
    let on_resolve = Arc::clone(&delivered);

    harness
        .adapter
        .collection(harness.collection.clone())
        .find(doc! {})
        .fork(
            |error| panic!("find should not fail: {error}"),
            move |documents| {
                if let Ok(mut slot) = on_resolve.lock() {
                    *slot = Some(documents.len());
                }
            },
        )
        .await;

    let count = *delivered
        .lock()
        .map_err(|err| eyre::eyre!("lock poisoned: {err}"))?;
    assert_eq!(count, Some(1));
    Ok(())
}
