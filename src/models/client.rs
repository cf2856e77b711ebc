use serde::{Deserialize, Serialize};

/// Natural person or legal entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    #[default]
    Natural,
    Juridica,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Prospecto,
    #[default]
    Activo,
    Inactivo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Client {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub client_type: ClientType,
    /// Cédula / RUC / passport number
    pub identification: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Number of cases for this client, computed on fetch
    #[serde(default)]
    pub proceedings_count: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewClient {
    #[serde(rename = "type", default)]
    pub client_type: ClientType,
    pub identification: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
}

/// Fields an update is allowed to touch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientChanges {
    pub name: String,
    #[serde(rename = "type")]
    pub client_type: ClientType,
    pub identification: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: ClientStatus,
}

impl From<&Client> for ClientChanges {
    fn from(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            client_type: client.client_type,
            identification: client.identification.clone(),
            email: client.email.clone(),
            phone: client.phone.clone(),
            address: client.address.clone(),
            status: client.status,
        }
    }
}

impl Client {
    /// Search match: name ignoring case, identification verbatim
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.to_lowercase()) || self.identification.contains(term)
    }
}
