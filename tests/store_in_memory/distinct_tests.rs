//! Distinct-value lookups through `distinct(key).from(collection)`.

use super::helpers::{StoreHarness, harness};
use doctask::bson::{Bson, doc};
use doctask::store::{adapters::memory::FailureStage, domain::FieldKey, ports::DriverError};
use rstest::rstest;
use std::collections::BTreeSet;

#[rstest]
#[tokio::test]
async fn distinct_returns_each_value_once(harness: StoreHarness) -> eyre::Result<()> {
    harness.seed([doc! { "a": 1 }, doc! { "a": 2 }, doc! { "a": 1 }])?;

    let values = harness
        .adapter
        .distinct(FieldKey::new("a")?)
        .from(harness.collection.clone())
        .run()
        .await?;

    let as_set: BTreeSet<i32> = values.iter().filter_map(Bson::as_i32).collect();
    assert_eq!(values.len(), 2);
    assert_eq!(as_set, BTreeSet::from([1, 2]));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn distinct_reads_nested_fields(harness: StoreHarness) -> eyre::Result<()> {
    harness.seed([
        doc! { "address": { "city": "Lyon" } },
        doc! { "address": { "city": "Nantes" } },
        doc! { "address": { "city": "Lyon" } },
        doc! { "name": "no address" },
    ])?;

    let values = harness
        .adapter
        .collection(harness.collection.clone())
        .distinct(FieldKey::new("address.city")?)
        .run()
        .await?;

    assert_eq!(
        values,
        vec![Bson::String("Lyon".to_owned()), Bson::String("Nantes".to_owned())]
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn distinct_failure_releases_the_connection(harness: StoreHarness) -> eyre::Result<()> {
    harness.driver.fail_next(FailureStage::Distinct, "distinct too big")?;

    let result = harness
        .adapter
        .distinct(FieldKey::new("a")?)
        .from(harness.collection.clone())
        .run()
        .await;

    assert!(matches!(result, Err(DriverError::Operation(_))));
    let stats = harness.stats()?;
    assert_eq!((stats.opened, stats.closed), (1, 1));
    Ok(())
}
