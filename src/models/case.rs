use serde::{Deserialize, Serialize};

/// Subject-matter of a proceeding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    #[default]
    Civil,
    Penal,
    Laboral,
    Familia,
    Transito,
    ContenciosoAdmin,
    ContenciosoTributario,
    Constitucional,
    Inquilinato,
    Mediacion,
    Administrativo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Iniciado,
    EnTramite,
    Suspendido,
    Archivado,
    Finalizado,
}

impl CaseStatus {
    /// Still being worked on
    pub fn is_open(&self) -> bool {
        !matches!(self, CaseStatus::Archivado | CaseStatus::Finalizado)
    }
}

/// Client name used when the joined client row is missing
pub const UNKNOWN_CLIENT: &str = "Cliente Desconocido";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Case {
    #[serde(default)]
    pub id: String,
    /// Internal file code
    #[serde(default)]
    pub code: Option<String>,
    /// Court-assigned number
    #[serde(default)]
    pub judicial_number: Option<String>,
    #[serde(rename = "type", default)]
    pub case_type: CaseType,
    #[serde(default)]
    pub status: CaseStatus,
    pub client_id: String,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub responsible_lawyer_id: Option<String>,
    #[serde(default)]
    pub judicial_unit: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub opposing_party: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewCase {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub judicial_number: Option<String>,
    #[serde(rename = "type", default)]
    pub case_type: CaseType,
    #[serde(default)]
    pub status: CaseStatus,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub responsible_lawyer_id: Option<String>,
    #[serde(default)]
    pub judicial_unit: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub opposing_party: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub start_date: Option<String>,
}

/// Fields an update is allowed to touch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseChanges {
    pub code: Option<String>,
    pub judicial_number: Option<String>,
    #[serde(rename = "type")]
    pub case_type: CaseType,
    pub status: CaseStatus,
    pub client_id: String,
    pub judicial_unit: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub opposing_party: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub responsible_lawyer_id: Option<String>,
}

impl From<&Case> for CaseChanges {
    fn from(case: &Case) -> Self {
        Self {
            code: case.code.clone(),
            judicial_number: case.judicial_number.clone(),
            case_type: case.case_type,
            status: case.status,
            client_id: case.client_id.clone(),
            judicial_unit: case.judicial_unit.clone(),
            city: case.city.clone(),
            province: case.province.clone(),
            opposing_party: case.opposing_party.clone(),
            description: case.description.clone(),
            amount: case.amount,
            responsible_lawyer_id: case.responsible_lawyer_id.clone(),
        }
    }
}

impl Case {
    /// Search match: code and client name ignoring case, judicial number
    /// verbatim. Absent fields never match.
    pub fn matches(&self, term: &str) -> bool {
        let lowered = term.to_lowercase();
        let code = self
            .code
            .as_ref()
            .is_some_and(|c| c.to_lowercase().contains(&lowered));
        let judicial = self
            .judicial_number
            .as_ref()
            .is_some_and(|n| n.contains(term));
        let client = self
            .client_name
            .as_ref()
            .is_some_and(|n| n.to_lowercase().contains(&lowered));
        code || judicial || client
    }
}
