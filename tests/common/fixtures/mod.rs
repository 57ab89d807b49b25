mod tracks;

// Re-export test fixtures
pub use tracks::*;
