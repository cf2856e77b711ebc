use super::newest_first;
use crate::error::{validation_error, DespachoResult};
use crate::models::case::UNKNOWN_CLIENT;
use crate::models::{Case, CaseChanges, Client, NewCase};
use crate::store::{Store, Table};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

/// Case list with client names joined in
pub struct CaseBook {
    store: Arc<dyn Store>,
    cases: Vec<Case>,
    error: Option<String>,
}

impl CaseBook {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            cases: Vec::new(),
            error: None,
        }
    }

    pub async fn load(store: Arc<dyn Store>) -> Self {
        let mut book = Self::new(store);
        book.refresh().await;
        book
    }

    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    pub async fn refresh(&mut self) {
        match self.fetch().await {
            Ok(cases) => {
                self.cases = cases;
                self.error = None;
            }
            Err(e) => {
                error!("Error fetching cases: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    async fn fetch(&self) -> DespachoResult<Vec<Case>> {
        let mut cases: Vec<Case> = self.store.select_as(Table::Cases).await?;
        let clients: Vec<Client> = self.store.select_as(Table::Clients).await?;
        let names: HashMap<&str, &str> = clients
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect();

        for case in &mut cases {
            let name = names
                .get(case.client_id.as_str())
                .copied()
                .unwrap_or(UNKNOWN_CLIENT);
            case.client_name = Some(name.to_string());
        }

        newest_first(&mut cases, |c| c.created_at.as_deref());
        Ok(cases)
    }

    /// Insert a case and refetch so the client name is joined
    pub async fn add(&mut self, case: NewCase) -> DespachoResult<Case> {
        if case.client_id.trim().is_empty() {
            return Err(validation_error("El caso debe tener un cliente"));
        }

        let stored: Case = self.store.insert_as(Table::Cases, &case).await?;
        info!("Added case {}", stored.id);

        self.refresh().await;
        Ok(self.find(&stored.id).cloned().unwrap_or(stored))
    }

    pub async fn update(&mut self, case: &Case) -> DespachoResult<()> {
        if case.client_id.trim().is_empty() {
            return Err(validation_error("El caso debe tener un cliente"));
        }

        self.store
            .update_with(Table::Cases, &case.id, &CaseChanges::from(case))
            .await?;
        info!("Updated case {}", case.id);

        self.refresh().await;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> DespachoResult<()> {
        self.store.delete(Table::Cases, id).await?;
        info!("Deleted case {}", id);
        self.cases.retain(|c| c.id != id);
        Ok(())
    }

    /// Cases matching `term` on code, judicial number or client name
    pub fn search(&self, term: &str) -> Vec<&Case> {
        self.cases.iter().filter(|c| c.matches(term)).collect()
    }

    /// Cases of one client
    pub fn for_client(&self, client_id: &str) -> Vec<&Case> {
        self.cases.iter().filter(|c| c.client_id == client_id).collect()
    }
}
