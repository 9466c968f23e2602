// File manager tools

// Basic file operations
pub mod delete;
pub mod info;
pub mod ls;
pub mod mkdir;
pub mod read;
pub mod write;

// Search tools
pub mod search;

// Organization tools
pub mod duplicates;
pub mod organize;
pub mod rename;
pub mod stats;

pub use delete::DeletePathTool;
pub use duplicates::FindDuplicatesTool;
pub use info::FileInfoTool;
pub use ls::ListDirectoryTool;
pub use mkdir::CreateDirectoryTool;
pub use organize::OrganizeTool;
pub use read::ReadFileTool;
pub use rename::BatchRenameTool;
pub use search::SearchContentTool;
pub use stats::DirectoryStatisticsTool;
pub use write::WriteFileTool;
