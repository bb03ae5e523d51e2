//! EKS troubleshooting knowledge base

use crate::knowledge_base::{SEARCH_EKS_TROUBLESHOOT_GUIDE, SearchTroubleshootGuideArgs};
use crate::stdio::metadata::types::{ToolMetadata, build_schema};

pub fn knowledge_base_tools() -> Vec<ToolMetadata> {
    vec![ToolMetadata {
        name: SEARCH_EKS_TROUBLESHOOT_GUIDE,
        category: "knowledge_base",
        description: "Search the EKS Troubleshoot Guide for troubleshooting information. Covers EKS Auto mode node provisioning and bootstrap issues and EKS Auto mode controller failure modes. Returns symptoms and step-by-step short and long-term fixes for the query.",
        schema: build_schema::<SearchTroubleshootGuideArgs>(),
    }]
}
