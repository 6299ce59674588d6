//! Insert payloads and acknowledgements.

use super::StoreDomainError;
use mongodb::bson::{Bson, Document};

/// Documents handed to an insert operation.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPayload {
    /// A single document.
    Single(Document),
    /// A non-empty batch of documents, inserted in order.
    Batch(DocumentBatch),
}

impl InsertPayload {
    /// Returns the number of documents in the payload.
    #[must_use]
    pub fn document_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(batch) => batch.as_slice().len(),
        }
    }

    /// Returns the payload as a list of documents.
    #[must_use]
    pub fn into_documents(self) -> Vec<Document> {
        match self {
            Self::Single(document) => vec![document],
            Self::Batch(batch) => batch.into_documents(),
        }
    }
}

impl From<Document> for InsertPayload {
    fn from(document: Document) -> Self {
        Self::Single(document)
    }
}

impl From<DocumentBatch> for InsertPayload {
    fn from(batch: DocumentBatch) -> Self {
        Self::Batch(batch)
    }
}

impl TryFrom<Vec<Document>> for InsertPayload {
    type Error = StoreDomainError;

    fn try_from(documents: Vec<Document>) -> Result<Self, Self::Error> {
        DocumentBatch::new(documents).map(Self::Batch)
    }
}

/// Non-empty, ordered list of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentBatch(Vec<Document>);

impl DocumentBatch {
    /// Creates a batch.
    ///
    /// # Errors
    ///
    /// Returns [`StoreDomainError::EmptyInsertBatch`] when no documents are
    /// supplied.
    pub fn new(documents: impl IntoIterator<Item = Document>) -> Result<Self, StoreDomainError> {
        let collected: Vec<Document> = documents.into_iter().collect();
        if collected.is_empty() {
            return Err(StoreDomainError::EmptyInsertBatch);
        }
        Ok(Self(collected))
    }

    /// Returns the documents in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Document] {
        &self.0
    }

    /// Consumes the batch, returning its documents.
    #[must_use]
    pub fn into_documents(self) -> Vec<Document> {
        self.0
    }
}

/// Acknowledgement returned by the driver after an insert.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertAck {
    inserted_ids: Vec<Bson>,
}

impl InsertAck {
    /// Creates an acknowledgement listing inserted `_id` values in payload
    /// order.
    #[must_use]
    pub const fn new(inserted_ids: Vec<Bson>) -> Self {
        Self { inserted_ids }
    }

    /// Returns the `_id` of each inserted document, in payload order.
    #[must_use]
    pub fn inserted_ids(&self) -> &[Bson] {
        &self.inserted_ids
    }

    /// Returns how many documents were inserted.
    #[must_use]
    pub fn inserted_count(&self) -> usize {
        self.inserted_ids.len()
    }
}
