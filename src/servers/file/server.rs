use super::tools::{
    BatchRenameTool, CreateDirectoryTool, DeletePathTool, DirectoryStatisticsTool, FileInfoTool,
    FindDuplicatesTool, ListDirectoryTool, OrganizeTool, ReadFileTool, SearchContentTool,
    WriteFileTool,
};
use crate::server::{register, Server, ToolMap};
use crate::OrganizerConfig;

/// Filesystem utilities plus the organization engine
pub struct FileManagerServer {
    tools: ToolMap,
}

impl FileManagerServer {
    pub fn new(config: &OrganizerConfig) -> Self {
        let options = config.engine_options();
        let mut tools = ToolMap::new();

        // Basic file operations
        register(&mut tools, ListDirectoryTool::new());
        register(&mut tools, ReadFileTool::new(config.read_limit));
        register(&mut tools, WriteFileTool::new());
        register(&mut tools, CreateDirectoryTool::new());
        register(&mut tools, DeletePathTool::new());
        register(&mut tools, FileInfoTool::new());

        // Search
        register(&mut tools, SearchContentTool::new());

        // Organization
        register(&mut tools, FindDuplicatesTool::new(options.clone()));
        register(&mut tools, OrganizeTool::new(options.clone()));
        register(&mut tools, BatchRenameTool::new(options.clone()));
        register(&mut tools, DirectoryStatisticsTool::new(options));

        log::debug!("File manager registered {} tools", tools.len());
        Self { tools }
    }
}

#[async_trait::async_trait]
impl Server for FileManagerServer {
    fn name(&self) -> &str {
        "file_manager"
    }

    fn description(&self) -> &str {
        "Filesystem utilities: listing, reading, writing and deleting files, content search, duplicate detection, organizing by type, batch renaming and directory statistics."
    }

    fn tools(&self) -> &ToolMap {
        &self.tools
    }
}
