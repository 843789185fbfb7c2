//! Translation core: validation, backend dispatch and output cleanup.
//!
//! # Data Flow
//! ```text
//! decoded body → validator.rs → NormalizedRequest
//!     → dispatcher.rs → (cache) → backend.rs::Translator (openai.rs)
//!     → text.rs cleanup → TranslationResponse
//! ```

pub mod backend;
pub mod dispatcher;
pub mod languages;
pub mod openai;
pub mod text;
pub mod types;
pub mod validator;

pub use backend::{BackendError, Translator};
pub use dispatcher::{Dispatcher, Translation};
pub use languages::LanguageRegistry;
pub use openai::OpenAiTranslator;
pub use types::{ErrorResponse, NormalizedRequest, TranslationResponse};
pub use validator::{ValidationFailure, ValidationKind, Validator};
