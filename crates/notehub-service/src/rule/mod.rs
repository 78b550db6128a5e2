//! Rule management, cascade resolution, and prompt formatting services.

pub mod prompt;
pub mod resolution;
pub mod service;

pub use prompt::PromptFormatter;
pub use resolution::ResolutionService;
pub use service::{CreateRuleRequest, RuleService, UpdateRuleRequest};
