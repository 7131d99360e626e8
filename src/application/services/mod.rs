//! Application services implementing the engine's use cases

pub mod engine;
pub mod ledger_service;
pub mod quest_service;
pub mod template_bank;
pub mod title_service;

pub use engine::{EngineError, ProgressionEngine};
pub use ledger_service::{LedgerError, LedgerService};
pub use quest_service::{QuestOutcome, QuestService};
pub use template_bank::{BankError, TemplateBank};
pub use title_service::TitleService;
