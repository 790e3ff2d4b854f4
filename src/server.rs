//! MCP server exposing the search engine as tools.

use crate::state::SearchEngine;
use crate::tools::list_libraries::{ListLibrariesRequest, handle_list_libraries};
use crate::tools::reload::handle_reload;
use crate::tools::search::{SearchRequest, handle_search};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::path::PathBuf;
use std::sync::Arc;

/// MCP server for documentation search
#[derive(Clone)]
pub struct SearchServer {
    /// Shared engine; the refresh worker holds the same handle
    engine: Arc<SearchEngine>,

    /// Payload sources re-read by the reload tool
    sources: Arc<[PathBuf]>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for SearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchServer")
            .field("engine", &self.engine)
            .field("sources", &self.sources)
            .finish()
    }
}

#[tool_router]
impl SearchServer {
    pub fn new(engine: Arc<SearchEngine>, sources: Vec<PathBuf>) -> Self {
        Self {
            engine,
            sources: sources.into(),
            tool_router: Self::tool_router(),
        }
    }

    pub fn engine(&self) -> &Arc<SearchEngine> {
        &self.engine
    }

    #[tool(
        description = "Search documented Rust items across all loaded libraries. Matches names exactly, by prefix, by substring or fuzzily, and can filter by kind (`fn:`, `struct:`, ...), path (`sfmt::new`) and signature (`(u32) -> SFMT`, `-> ThreadRng`). Results are ranked by match quality.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(&self, Parameters(request): Parameters<SearchRequest>) -> std::result::Result<String, String> {
        handle_search(&self.engine, &request)
    }

    #[tool(
        description = "List the libraries currently loaded into the search corpus, with item counts and summaries.",
        input_schema = inline_schema_for_type::<ListLibrariesRequest>()
    )]
    async fn list_libraries(
        &self,
        Parameters(request): Parameters<ListLibrariesRequest>,
    ) -> std::result::Result<String, String> {
        Ok(handle_list_libraries(&self.engine, &request))
    }

    #[tool(
        description = "Re-read all configured index sources and publish them as a new corpus generation. If any source fails to load, the current corpus keeps serving."
    )]
    async fn reload(&self) -> std::result::Result<String, String> {
        handle_reload(&self.engine, &self.sources)
            .await
            .map_err(|e| format!("Reload failed: {:#}", e))
    }
}

#[tool_handler]
impl ServerHandler for SearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "rustdoc-search: ranked search over rustdoc indexes. \
                 Use search with a name, a kind prefix or a signature such as `-> String`. \
                 Use list_libraries to see what is loaded; reload picks up regenerated docs.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// so that nested definitions are emitted inline instead of as `$ref` patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let json_object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => JsonObject::new(),
    };

    Arc::new(json_object)
}
