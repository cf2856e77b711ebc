use super::newest_first;
use crate::error::{validation_error, DespachoResult};
use crate::models::{Case, Client, ClientChanges, NewClient};
use crate::store::{Store, Table};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Client list plus the operations that keep it in sync with the store
pub struct ClientBook {
    store: Arc<dyn Store>,
    clients: Vec<Client>,
    error: Option<String>,
}

impl ClientBook {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            clients: Vec::new(),
            error: None,
        }
    }

    /// Create the book and fetch immediately
    pub async fn load(store: Arc<dyn Store>) -> Self {
        let mut book = Self::new(store);
        book.refresh().await;
        book
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    /// Message of the last failed fetch
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find(&self, id: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Re-read all clients, newest first. A failure is kept in `error()`
    /// and leaves the previous list in place.
    pub async fn refresh(&mut self) {
        match self.fetch().await {
            Ok(clients) => {
                self.clients = clients;
                self.error = None;
            }
            Err(e) => {
                error!("Error fetching clients: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    async fn fetch(&self) -> DespachoResult<Vec<Client>> {
        let mut clients: Vec<Client> = self.store.select_as(Table::Clients).await?;
        let cases: Vec<Case> = self.store.select_as(Table::Cases).await?;

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for case in &cases {
            *counts.entry(case.client_id.as_str()).or_default() += 1;
        }
        for client in &mut clients {
            client.proceedings_count = Some(counts.get(client.id.as_str()).copied().unwrap_or(0));
        }

        newest_first(&mut clients, |c| c.created_at.as_deref());
        Ok(clients)
    }

    /// Insert a client and put it at the top of the list
    pub async fn add(&mut self, client: NewClient) -> DespachoResult<Client> {
        if client.name.trim().is_empty() || client.identification.trim().is_empty() {
            return Err(validation_error("Nombre e identificación son obligatorios"));
        }

        let mut stored: Client = self.store.insert_as(Table::Clients, &client).await?;
        stored.proceedings_count = Some(0);
        info!("Added client {} ({})", stored.name, stored.id);

        self.clients.insert(0, stored.clone());
        Ok(stored)
    }

    /// Write the editable fields and replace the local copy
    pub async fn update(&mut self, client: Client) -> DespachoResult<()> {
        if client.name.trim().is_empty() || client.identification.trim().is_empty() {
            return Err(validation_error("Nombre e identificación son obligatorios"));
        }

        self.store
            .update_with(Table::Clients, &client.id, &ClientChanges::from(&client))
            .await?;
        info!("Updated client {}", client.id);

        if let Some(slot) = self.clients.iter_mut().find(|c| c.id == client.id) {
            *slot = client;
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> DespachoResult<()> {
        self.store.delete(Table::Clients, id).await?;
        info!("Deleted client {}", id);
        self.clients.retain(|c| c.id != id);
        Ok(())
    }

    /// Clients whose name (ignoring case) or identification contains `term`
    pub fn search(&self, term: &str) -> Vec<&Client> {
        self.clients.iter().filter(|c| c.matches(term)).collect()
    }
}
