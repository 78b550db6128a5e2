//! Domain limits shared across the engine.

/// Maximum directory nesting depth. A directory's `level` must stay
/// strictly below this value (a root-level directory has level 0).
pub const MAX_DEPTH: i32 = 10;

/// Maximum length of a directory name, in characters.
pub const MAX_DIRECTORY_NAME_LEN: usize = 100;

/// Maximum length of a rule name, in characters.
pub const MAX_RULE_NAME_LEN: usize = 100;

/// Maximum length of a rule's content body, in characters.
pub const MAX_RULE_CONTENT_LEN: usize = 15_000;

/// Directory names that are refused regardless of other validation.
/// Matched case-insensitively.
pub const RESERVED_DIRECTORY_NAMES: &[&str] = &[".", "..", "root"];

/// Maximum number of ids the store accepts in a single multi-get.
/// Callers fetching larger sets must chunk.
pub const IN_QUERY_LIMIT: usize = 10;
