//! Orchestrator core: pure conversation controller and view-model helpers.
mod catalog;
mod effect;
mod extracted;
mod message;
mod msg;
mod response;
mod state;
mod update;
mod upload;
mod view_model;

pub use catalog::{default_domains, recommendations_for, Domain, RecommendedQuestion, DEFAULT_DOMAIN};
pub use effect::{Effect, SCROLL_DELAY};
pub use extracted::{humanize_key, ConfirmationRow, ExtractedData, ExtractedDataError};
pub use message::{ChatMessage, Conversation, FormDownload, MessageKind};
pub use msg::{Msg, RequestFailure};
pub use response::{mentions_form_download, AgentResponse};
pub use state::{AppState, Clock, RequestId};
pub use update::update;
pub use upload::{file_extension, is_supported_upload, ALLOWED_EXTENSIONS};
pub use view_model::AppViewModel;
