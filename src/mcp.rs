use std::sync::Arc;

use rmcp::{
    ServerHandler,
    ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult,
        Content,
        Implementation,
        ServerCapabilities,
        ServerInfo,
    },
    tool,
    tool_handler,
    tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    book::Testament,
    error::{self, Error},
    format,
    reference::Reference,
    search::SearchRequest,
    service::Bible,
};

#[derive(Clone)]
pub struct VersefindMcpServer {
    state: Arc<Bible>,
    tool_router: ToolRouter<Self>,
}

impl VersefindMcpServer {
    fn new(bible: Bible) -> Self {
        Self {
            state: Arc::new(bible),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router(router = tool_router)]
impl VersefindMcpServer {
    /// Case-insensitive substring search over verse text and book names.
    #[tool(
        name = "bible_search",
        description = "Search Bible verses and book names (English and Amharic). Matches are case-insensitive substrings. Supports testament and book filters."
    )]
    pub async fn bible_search(
        &self,
        params: Parameters<SearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let params = params.0;
        let state = Arc::clone(&self.state);
        let query = params.query.clone();

        let response = tokio::task::spawn_blocking(move || {
            let index = state
                .ensure_loaded()
                .map_err(|e| mcp_error("corpus unavailable", e))?;

            let book = match params.book.as_deref() {
                Some(key) => {
                    let book = index.corpus().find_book(key).ok_or_else(|| {
                        rmcp::ErrorData::invalid_params(
                            format!("unknown book: {key}"),
                            None,
                        )
                    })?;
                    Some(book.number)
                }
                None => None,
            };

            let request = SearchRequest::dropdown(params.query)
                .with_book(book)
                .with_testament(params.testament)
                .with_limits(params.limit, params.per_book_cap);
            Ok::<_, rmcp::ErrorData>(index.search(&request))
        })
        .await
        .map_err(|e| mcp_error("search task failed", e))??;

        let summary = format::format_human(&response, &query, false);
        let structured = serde_json::to_value(&response)
            .map_err(|e| mcp_error("failed to serialize search results", e))?;

        let mut result = CallToolResult::success(vec![Content::text(summary)]);
        result.structured_content = Some(structured);
        Ok(result)
    }

    /// Fetch a chapter or a single verse.
    #[tool(
        name = "bible_get",
        description = "Get a passage by reference, e.g. \"John 3:16\" or \"Psalms 23\" for a whole chapter."
    )]
    pub async fn bible_get(
        &self,
        params: Parameters<GetParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let reference: Reference =
            params.0.reference.parse().map_err(|e: Error| {
                rmcp::ErrorData::invalid_params(e.to_string(), None)
            })?;
        let state = Arc::clone(&self.state);

        let (text, structured) = tokio::task::spawn_blocking(move || {
            let index = state
                .ensure_loaded()
                .map_err(|e| mcp_error("corpus unavailable", e))?;
            let passage = index.corpus().resolve(&reference).map_err(|e| {
                rmcp::ErrorData::invalid_params(e.to_string(), None)
            })?;
            let structured = serde_json::to_value(&passage)
                .map_err(|e| mcp_error("failed to serialize passage", e))?;
            Ok::<_, rmcp::ErrorData>((passage.to_string(), structured))
        })
        .await
        .map_err(|e| mcp_error("lookup task failed", e))??;

        let mut result = CallToolResult::success(vec![Content::text(text)]);
        result.structured_content = Some(structured);
        Ok(result)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for VersefindMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_server_info(
                Implementation::new("versefind", env!("CARGO_PKG_VERSION"))
                    .with_title("versefind MCP"),
            )
            .with_instructions(
                "Use bible_search to find verses containing a word or phrase, then bible_get to read the surrounding chapter.",
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Text to find; matched case-insensitively as a substring.
    pub query: String,
    /// Maximum number of results, book and verse matches combined
    /// (default: 100).
    pub limit: Option<usize>,
    /// Maximum verse matches listed per book (default: 15).
    pub per_book_cap: Option<usize>,
    /// Restrict to the old or new testament.
    pub testament: Option<Testament>,
    /// Restrict to one book, by number or name.
    pub book: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetParams {
    /// Reference such as "1 John 4:8" or "Genesis 1".
    pub reference: String,
}

fn mcp_error(message: &str, error: impl std::fmt::Display) -> rmcp::ErrorData {
    rmcp::ErrorData::internal_error(
        message.to_string(),
        Some(json!({ "error": error.to_string() })),
    )
}

pub fn run_mcp(bible: Bible) -> error::Result<()> {
    let server = VersefindMcpServer::new(bible);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        let transport = rmcp::transport::stdio();
        let running = server.serve(transport).await.map_err(|e| {
            Error::Config(format!("MCP server initialization failed: {e}"))
        })?;
        running
            .waiting()
            .await
            .map_err(|e| Error::Config(format!("MCP server error: {e}")))?;
        Ok(())
    })
}
