//! Write behaviour of `insert(payload).to(collection)`.

use super::helpers::{StoreHarness, harness};
use doctask::bson::{Bson, doc};
use doctask::store::{
    domain::{DocumentBatch, InsertPayload},
    ports::DriverError,
};
use rstest::rstest;

#[rstest]
#[tokio::test]
async fn inserted_document_is_visible_to_a_later_find(harness: StoreHarness) -> eyre::Result<()> {
    let document = doc! { "_id": "sku-1", "name": "lamp" };

    let ack = harness
        .adapter
        .insert(document.clone())
        .to(harness.collection.clone())
        .run()
        .await?;
    let found = harness
        .adapter
        .find(doc! {})
        .from(harness.collection.clone())
        .run()
        .await?;

    assert_eq!(ack.inserted_ids(), &[Bson::String("sku-1".to_owned())]);
    assert!(found.contains(&document));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn insert_assigns_an_object_id_when_missing(harness: StoreHarness) -> eyre::Result<()> {
    let ack = harness
        .adapter
        .insert(doc! { "name": "desk" })
        .to(harness.collection.clone())
        .run()
        .await?;

    let [Bson::ObjectId(id)] = ack.inserted_ids() else {
        eyre::bail!("expected one generated object id, got {:?}", ack.inserted_ids());
    };
    let object_id = *id;
    let stored = harness.stored()?;
    assert_eq!(stored, vec![doc! { "_id": object_id, "name": "desk" }]);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn batch_insert_acknowledges_in_payload_order(harness: StoreHarness) -> eyre::Result<()> {
    let batch = DocumentBatch::new([doc! { "_id": 2 }, doc! { "_id": 1 }, doc! { "_id": 3 }])?;

    let ack = harness
        .adapter
        .insert(InsertPayload::from(batch))
        .to(harness.collection.clone())
        .run()
        .await?;

    assert_eq!(ack.inserted_count(), 3);
    assert_eq!(
        ack.inserted_ids(),
        &[Bson::Int32(2), Bson::Int32(1), Bson::Int32(3)]
    );
    assert_eq!(harness.stored()?.len(), 3);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn duplicate_id_fails_without_partial_writes(harness: StoreHarness) -> eyre::Result<()> {
    harness.seed([doc! { "_id": 1 }])?;
    let payload = InsertPayload::try_from(vec![doc! { "_id": 2 }, doc! { "_id": 1 }])?;

    let result = harness
        .adapter
        .insert(payload)
        .to(harness.collection.clone())
        .run()
        .await;

    assert!(matches!(result, Err(DriverError::Operation(_))));
    assert_eq!(harness.stored()?, vec![doc! { "_id": 1 }]);
    assert_eq!(harness.stats()?.open, 0);
    Ok(())
}
