//! The three domain agents

pub mod directory;
pub mod finder;
pub mod screener;

pub use directory::DirectoryAgent;
pub use finder::FinderAgent;
pub use screener::ScreenerAgent;
