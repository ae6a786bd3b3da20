//! WebSearch tool for searching the web via Exa API or DuckDuckGo

use std::time::Duration;

use async_trait::async_trait;
use mnemo_core::memory::preview;
use mnemo_core::{Error, Result, Tool, ToolResult, WebSearchConfig};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

const EXA_SEARCH_URL: &str = "https://api.exa.ai/search";
const DUCKDUCKGO_URL: &str = "https://api.duckduckgo.com/";
const MAX_LIMIT: usize = 10;
const SUBTOPICS_PER_GROUP: usize = 3;
const SNIPPET_CHARS: usize = 300;

/// WebSearch tool for searching the web
pub struct WebSearchTool {
    client: Client,
    exa_api_key: Option<String>,
    default_limit: usize,
}

impl WebSearchTool {
    /// Create a new WebSearchTool from the web search configuration
    pub fn new(config: &WebSearchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self::with_client(client, config)
    }

    /// Create with custom client
    pub fn with_client(client: Client, config: &WebSearchConfig) -> Self {
        Self {
            client,
            exa_api_key: config.exa_api_key.clone(),
            default_limit: config.default_limit,
        }
    }
}

/// Search input parameters
#[derive(Debug, Deserialize)]
struct SearchInput {
    /// The search query
    query: String,
    /// Maximum number of results
    #[serde(default)]
    limit: Option<usize>,
    /// Use Exa API if available (default: true)
    #[serde(default = "default_true")]
    use_exa: bool,
}

fn default_true() -> bool {
    true
}

/// Exa API response structure
#[derive(Debug, Deserialize)]
struct ExaResponse {
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaResult {
    title: Option<String>,
    url: String,
    published_date: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// DuckDuckGo Instant Answer API response
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DuckDuckGoResponse {
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    abstract_text: Option<String>,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: Option<String>,
    #[serde(default)]
    abstract_source: Option<String>,
    #[serde(default)]
    related_topics: Vec<DuckDuckGoTopic>,
}

/// A related topic, or a named group of topics
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DuckDuckGoTopic {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "FirstURL", default)]
    first_url: Option<String>,
    #[serde(default)]
    topics: Vec<DuckDuckGoTopic>,
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
    published_date: Option<String>,
}

impl WebSearchTool {
    /// Search using Exa API
    async fn search_exa(&self, api_key: &str, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let body = json!({
            "query": query,
            "numResults": limit,
            "type": "auto",
            "contents": { "text": { "maxCharacters": SNIPPET_CHARS * 2 } }
        });

        let response = self
            .client
            .post(EXA_SEARCH_URL)
            .header("x-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::ExternalCollaborator(format!("Exa API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::ExternalCollaborator(format!(
                "Exa API error ({}): {}",
                status, body
            )));
        }

        let exa_response: ExaResponse = response.json().await.map_err(|e| {
            Error::ExternalCollaborator(format!("Failed to parse Exa response: {}", e))
        })?;

        Ok(exa_results(exa_response, limit))
    }

    /// Search using DuckDuckGo Instant Answer API
    async fn search_duckduckgo(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .get(DUCKDUCKGO_URL)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| {
                Error::ExternalCollaborator(format!("DuckDuckGo API request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(Error::ExternalCollaborator(format!(
                "DuckDuckGo API error: {}",
                response.status()
            )));
        }

        let ddg_response: DuckDuckGoResponse = response.json().await.map_err(|e| {
            Error::ExternalCollaborator(format!("Failed to parse DuckDuckGo response: {}", e))
        })?;

        Ok(duckduckgo_results(ddg_response, limit))
    }
}

fn exa_results(response: ExaResponse, limit: usize) -> Vec<SearchResult> {
    response
        .results
        .into_iter()
        .take(limit)
        .map(|r| SearchResult {
            title: r.title.unwrap_or_else(|| "No title".to_string()),
            url: r.url,
            snippet: preview(r.text.as_deref().unwrap_or_default().trim(), SNIPPET_CHARS),
            published_date: r.published_date,
        })
        .collect()
}

/// Abstract first, then related topics; grouped topics give up to three entries each
fn duckduckgo_results(response: DuckDuckGoResponse, limit: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if let Some(abstract_text) = response.abstract_text.filter(|t| !t.is_empty()) {
        results.push(SearchResult {
            title: response
                .heading
                .filter(|h| !h.is_empty())
                .or(response.abstract_source)
                .unwrap_or_else(|| "Summary".to_string()),
            url: response.abstract_url.unwrap_or_default(),
            snippet: abstract_text,
            published_date: None,
        });
    }

    for topic in &response.related_topics {
        if topic.topics.is_empty() {
            results.extend(topic_result(topic));
        } else {
            results.extend(
                topic
                    .topics
                    .iter()
                    .filter_map(topic_result)
                    .take(SUBTOPICS_PER_GROUP),
            );
        }
    }

    results.truncate(limit);
    results
}

fn topic_result(topic: &DuckDuckGoTopic) -> Option<SearchResult> {
    match (&topic.text, &topic.first_url) {
        (Some(text), Some(url)) if !text.is_empty() => Some(SearchResult {
            title: extract_title_from_text(text),
            url: url.clone(),
            snippet: text.clone(),
            published_date: None,
        }),
        _ => None,
    }
}

/// Format search results for output
fn format_results(results: &[SearchResult], query: &str) -> String {
    let mut output = format!("Search results for: \"{}\"\n\n", query);

    for (i, result) in results.iter().enumerate() {
        output.push_str(&format!("## [{}] {}\n", i + 1, result.title));
        output.push_str(&format!("URL: {}\n", result.url));
        if let Some(date) = &result.published_date {
            output.push_str(&format!("Published: {}\n", date));
        }
        output.push_str(&format!("{}\n\n", result.snippet));
    }

    output.push_str(&format!("Found {} results.\n", results.len()));
    output
}

/// Extract title from DuckDuckGo topic text (usually "Title - Description")
fn extract_title_from_text(text: &str) -> String {
    text.split(" - ").next().unwrap_or("Result").to_string()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web using Exa API (when configured) or DuckDuckGo. Returns titles, URLs, and snippets."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to look up"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5, max: 10)",
                    "minimum": 1,
                    "maximum": MAX_LIMIT
                },
                "use_exa": {
                    "type": "boolean",
                    "description": "Use Exa API if available (default: true). Set to false to force DuckDuckGo."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let search_input: SearchInput = serde_json::from_value(input).map_err(|e| {
            Error::ToolExecution(format!("Invalid input parameters: {}", e))
        })?;

        let query = search_input.query.trim();
        if query.is_empty() {
            return Ok(ToolResult::error("Query cannot be empty"));
        }

        let limit = search_input
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_LIMIT);

        tracing::info!(limit = limit, use_exa = search_input.use_exa, "Executing web search");
        tracing::debug!(query = %query, "Web search query");

        let mut outcome = None;
        if let Some(api_key) = self.exa_api_key.as_deref().filter(|_| search_input.use_exa) {
            tracing::debug!("Using Exa API for search");
            match self.search_exa(api_key, query, limit).await {
                Ok(results) => outcome = Some(results),
                Err(e) => {
                    tracing::warn!(error = %e, "Exa search failed, falling back to DuckDuckGo");
                }
            }
        }

        let results = match outcome {
            Some(results) => results,
            None => {
                tracing::debug!("Using DuckDuckGo for search");
                match self.search_duckduckgo(query, limit).await {
                    Ok(results) => results,
                    Err(e) => {
                        tracing::warn!(error = %e, "Web search failed");
                        return Ok(ToolResult::error(format!("Search failed: {}", e)));
                    }
                }
            }
        };

        if results.is_empty() {
            return Ok(ToolResult::success(format!(
                "No results found for '{}'.",
                query
            )));
        }

        Ok(ToolResult::success(format_results(&results, query)))
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(&WebSearchConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddg_fixture() -> DuckDuckGoResponse {
        serde_json::from_value(json!({
            "Heading": "Rust (programming language)",
            "AbstractText": "Rust is a general-purpose programming language.",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "AbstractSource": "Wikipedia",
            "RelatedTopics": [
                {
                    "Text": "Cargo - The Rust package manager",
                    "FirstURL": "https://duckduckgo.com/Cargo"
                },
                {
                    "Name": "Tools",
                    "Topics": [
                        { "Text": "Clippy - A linter", "FirstURL": "https://duckduckgo.com/Clippy" },
                        { "Text": "Rustfmt - A formatter", "FirstURL": "https://duckduckgo.com/Rustfmt" },
                        { "Text": "Miri - An interpreter", "FirstURL": "https://duckduckgo.com/Miri" },
                        { "Text": "Rustdoc - Docs", "FirstURL": "https://duckduckgo.com/Rustdoc" }
                    ]
                },
                { "Text": "", "FirstURL": "https://duckduckgo.com/Empty" }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_title_from_text() {
        let text = "Python - A programming language";
        assert_eq!(extract_title_from_text(text), "Python");
    }

    #[test]
    fn test_duckduckgo_results_order_and_groups() {
        let results = duckduckgo_results(ddg_fixture(), 10);
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Rust (programming language)", "Cargo", "Clippy", "Rustfmt", "Miri"]
        );
        assert_eq!(results[1].url, "https://duckduckgo.com/Cargo");
    }

    #[test]
    fn test_duckduckgo_results_respects_limit() {
        let results = duckduckgo_results(ddg_fixture(), 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_duckduckgo_empty_response() {
        let response: DuckDuckGoResponse =
            serde_json::from_value(json!({"AbstractText": "", "RelatedTopics": []})).unwrap();
        assert!(duckduckgo_results(response, 5).is_empty());
    }

    #[test]
    fn test_exa_results() {
        let response: ExaResponse = serde_json::from_value(json!({
            "results": [
                {
                    "title": "The Rust Book",
                    "url": "https://doc.rust-lang.org/book/",
                    "publishedDate": "2024-01-01",
                    "text": "  Welcome to the book.  "
                },
                { "title": null, "url": "https://example.com" }
            ]
        }))
        .unwrap();

        let results = exa_results(response, 5);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "Welcome to the book.");
        assert_eq!(results[0].published_date.as_deref(), Some("2024-01-01"));
        assert_eq!(results[1].title, "No title");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_format_results() {
        let results = vec![SearchResult {
            title: "Test Title".to_string(),
            url: "https://example.com".to_string(),
            snippet: "Test snippet".to_string(),
            published_date: Some("2024-01-01".to_string()),
        }];

        let output = format_results(&results, "test query");
        assert!(output.starts_with("Search results for: \"test query\""));
        assert!(output.contains("## [1] Test Title\nURL: https://example.com\n"));
        assert!(output.contains("Published: 2024-01-01"));
        assert!(output.ends_with("Found 1 results.\n"));
    }

    #[test]
    fn test_search_input_parsing() {
        let parsed: SearchInput =
            serde_json::from_value(json!({"query": "rust programming", "limit": 3})).unwrap();
        assert_eq!(parsed.query, "rust programming");
        assert_eq!(parsed.limit, Some(3));
        assert!(parsed.use_exa);
    }

    #[tokio::test]
    async fn test_empty_query_is_error_result() {
        let tool = WebSearchTool::default();
        let result = tool.execute(json!({"query": "   "})).await.unwrap();
        assert!(result.is_error);
        assert_eq!(result.output, "Query cannot be empty");
    }
}
