use serde::{Deserialize, Serialize};

/// Metadata row for an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    pub id: String,
    /// Original file name as uploaded
    pub name: String,
    /// Object key inside the document bucket
    pub file_path: String,
    #[serde(default)]
    pub file_type: Option<String>,
    #[serde(default = "first_version")]
    pub version: u32,
    #[serde(default)]
    pub case_id: Option<String>,
    #[serde(default)]
    pub case_code: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub uploader_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

fn first_version() -> u32 {
    1
}

/// Insert payload written after the file lands in storage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDocument {
    pub name: String,
    pub file_path: String,
    pub file_type: String,
    pub version: u32,
    pub case_id: Option<String>,
    pub client_id: Option<String>,
    pub uploader_id: Option<String>,
}

/// Coarse file kind, used for list icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Image,
    Pdf,
    Other,
}

impl DocumentKind {
    /// Classify by the extension of `file_name`
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" | "png" | "gif" => DocumentKind::Image,
            "pdf" => DocumentKind::Pdf,
            _ => DocumentKind::Other,
        }
    }
}

/// `file_type` stored for an upload: PDFs are filed as legal documents
pub fn file_type_for(content_type: &str) -> &'static str {
    if content_type.contains("pdf") {
        "legal"
    } else {
        "otro"
    }
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_file_name(&self.name)
    }
}
