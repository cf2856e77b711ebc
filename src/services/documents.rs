use super::newest_first;
use crate::error::{validation_error, DespachoResult};
use crate::models::document::file_type_for;
use crate::models::event::non_blank;
use crate::models::{Case, Client, Document, NewDocument};
use crate::store::{ObjectStorage, Store, Table};
use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Uploaded documents: metadata rows in the store, bytes in object storage
pub struct DocumentBook {
    store: Arc<dyn Store>,
    storage: Arc<dyn ObjectStorage>,
    link_ttl: Duration,
    documents: Vec<Document>,
    error: Option<String>,
}

/// Random object key that keeps the extension of `file_name`
fn storage_name(file_name: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!("{}.{}", id, ext.to_ascii_lowercase())
        }
        _ => id,
    }
}

impl DocumentBook {
    /// `link_ttl` bounds the lifetime of download links
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn ObjectStorage>, link_ttl: Duration) -> Self {
        Self {
            store,
            storage,
            link_ttl,
            documents: Vec::new(),
            error: None,
        }
    }

    pub async fn load(store: Arc<dyn Store>, storage: Arc<dyn ObjectStorage>, link_ttl: Duration) -> Self {
        let mut book = Self::new(store, storage, link_ttl);
        book.refresh().await;
        book
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub async fn refresh(&mut self) {
        match self.fetch().await {
            Ok(documents) => {
                self.documents = documents;
                self.error = None;
            }
            Err(e) => {
                error!("Error fetching documents: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    async fn fetch(&self) -> DespachoResult<Vec<Document>> {
        let mut documents: Vec<Document> = self.store.select_as(Table::Documents).await?;
        let cases: Vec<Case> = self.store.select_as(Table::Cases).await?;
        let clients: Vec<Client> = self.store.select_as(Table::Clients).await?;

        let codes: HashMap<&str, Option<&String>> = cases
            .iter()
            .map(|c| (c.id.as_str(), c.code.as_ref()))
            .collect();
        let names: HashMap<&str, &str> = clients
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        for doc in &mut documents {
            doc.case_code = doc
                .case_id
                .as_deref()
                .and_then(|id| codes.get(id).copied().flatten())
                .cloned();
            doc.client_name = doc
                .client_id
                .as_deref()
                .and_then(|id| names.get(id))
                .map(|name| name.to_string());
        }

        newest_first(&mut documents, |d| Some(d.created_at.as_str()));
        Ok(documents)
    }

    /// Store the bytes under a fresh key, then record the metadata row
    pub async fn upload(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        content_type: &str,
        case_id: Option<String>,
        client_id: Option<String>,
        uploader_id: Option<String>,
    ) -> DespachoResult<Document> {
        if file_name.trim().is_empty() {
            return Err(validation_error("El archivo no tiene nombre"));
        }

        let file_path = storage_name(file_name);
        self.storage.upload(&file_path, bytes).await?;

        let payload = NewDocument {
            name: file_name.to_string(),
            file_path,
            file_type: file_type_for(content_type).to_string(),
            version: 1,
            case_id: non_blank(&case_id),
            client_id: non_blank(&client_id),
            uploader_id,
        };
        let stored: Document = self.store.insert_as(Table::Documents, &payload).await?;
        info!("Uploaded document {} as {}", stored.name, stored.file_path);

        self.refresh().await;
        Ok(self.find(&stored.id).cloned().unwrap_or(stored))
    }

    /// Remove the file and its row. A storage failure is only logged.
    pub async fn delete(&mut self, id: &str, file_path: &str) -> DespachoResult<()> {
        if let Err(e) = self.storage.remove(&[file_path.to_string()]).await {
            warn!("Error deleting file {} from storage: {}", file_path, e);
        }

        self.store.delete(Table::Documents, id).await?;
        info!("Deleted document {}", id);
        self.documents.retain(|d| d.id != id);
        Ok(())
    }

    /// Short-lived download link, `None` when the file is gone
    pub async fn download_url(&self, file_path: &str) -> DespachoResult<Option<String>> {
        self.storage.create_signed_url(file_path, self.link_ttl).await
    }

    pub fn for_case(&self, case_id: &str) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| d.case_id.as_deref() == Some(case_id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentKind;
    use crate::store::{InMemoryStore, LocalObjectStorage};
    use async_trait::async_trait;
    use serde_json::json;

    fn book(dir: &tempfile::TempDir) -> (Arc<dyn Store>, DocumentBook) {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        let storage: Arc<dyn ObjectStorage> =
            Arc::new(LocalObjectStorage::new(dir.path(), "http://localhost:3000").unwrap());
        let book = DocumentBook::new(Arc::clone(&store), storage, Duration::seconds(60));
        (store, book)
    }

    #[test]
    fn test_storage_name_keeps_extension() {
        let name = storage_name("Demanda Laboral.PDF");
        assert!(name.ends_with(".pdf"));
        assert_ne!(name, storage_name("Demanda Laboral.PDF"));
        assert!(!storage_name("sin_extension").contains('.'));
    }

    #[tokio::test]
    async fn test_upload_records_metadata_and_joins() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut book) = book(&dir);
        store
            .insert(Table::Cases, json!({"id": "k1", "code": "CIV-9", "client_id": "c1"}))
            .await
            .unwrap();

        let doc = book
            .upload("demanda.pdf", b"%PDF", "application/pdf", Some("k1".to_string()), Some(" ".to_string()), None)
            .await
            .unwrap();

        assert_eq!(doc.file_type.as_deref(), Some("legal"));
        assert_eq!(doc.version, 1);
        assert_eq!(doc.case_code.as_deref(), Some("CIV-9"));
        assert_eq!(doc.client_id, None);
        assert_eq!(doc.kind(), DocumentKind::Pdf);
        assert_eq!(book.for_case("k1").len(), 1);

        let url = book.download_url(&doc.file_path).await.unwrap().unwrap();
        assert!(url.starts_with("http://localhost:3000/files/"));
    }

    #[tokio::test]
    async fn test_non_pdf_is_filed_as_otro() {
        let dir = tempfile::tempdir().unwrap();
        let (_store, mut book) = book(&dir);
        let doc = book
            .upload("foto.png", b"\x89PNG", "image/png", None, None, None)
            .await
            .unwrap();
        assert_eq!(doc.file_type.as_deref(), Some("otro"));
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let (store, mut book) = book(&dir);
        let doc = book
            .upload("a.txt", b"a", "text/plain", None, None, None)
            .await
            .unwrap();

        book.delete(&doc.id, &doc.file_path).await.unwrap();
        assert!(book.documents().is_empty());
        assert!(store.get(Table::Documents, &doc.id).await.unwrap().is_none());
        assert!(book.download_url(&doc.file_path).await.unwrap().is_none());
    }

    struct BrokenStorage;

    #[async_trait]
    impl ObjectStorage for BrokenStorage {
        async fn upload(&self, _path: &str, _bytes: &[u8]) -> DespachoResult<()> {
            Err(crate::error::storage_error("bucket offline"))
        }

        async fn remove(&self, _paths: &[String]) -> DespachoResult<()> {
            Err(crate::error::storage_error("bucket offline"))
        }

        async fn create_signed_url(&self, _path: &str, _ttl: Duration) -> DespachoResult<Option<String>> {
            Ok(None)
        }

        async fn open_signed(&self, _token: &str) -> DespachoResult<Option<(String, Vec<u8>)>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_storage_failures() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new());
        store
            .insert(Table::Documents, json!({"id": "d1", "name": "a.pdf", "file_path": "a.pdf"}))
            .await
            .unwrap();
        let mut book = DocumentBook::load(Arc::clone(&store), Arc::new(BrokenStorage), Duration::seconds(60)).await;

        // Upload fails before any row is written
        assert!(book.upload("b.pdf", b"x", "application/pdf", None, None, None).await.is_err());
        assert_eq!(store.select(Table::Documents).await.unwrap().len(), 1);

        // Delete still removes the row
        book.delete("d1", "a.pdf").await.unwrap();
        assert!(store.select(Table::Documents).await.unwrap().is_empty());
    }
}
