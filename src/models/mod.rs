pub mod case;
pub mod client;
pub mod document;
pub mod event;
pub mod settings;

pub use case::{Case, CaseChanges, CaseStatus, CaseType, NewCase};
pub use client::{Client, ClientChanges, ClientStatus, ClientType, NewClient};
pub use document::{Document, DocumentKind, NewDocument};
pub use event::{CalendarEvent, EventChanges, EventStatus, EventType, NewEvent};
pub use settings::{CurrentUser, LawyerAccount, Role, UserPreferences};
