pub mod format;
pub mod op;
pub mod reg;
pub mod word;

/// Number of words a program may occupy (2^20).
pub const MAX_WORDS: i32 = 1 << 20;
