//! Query orchestration.
//!
//! [`QaService`] is the single front door over the engine: it owns the
//! shared [`DocumentIndex`] reference and the model provider, assembles
//! prompts from retrieved context plus a bounded conversation-history
//! window, and maps every internal failure to a fixed user-facing
//! message. `answer_query` never fails for a registered document — the
//! caller always gets a displayable response.

use std::sync::Arc;

use crate::citations::extract_citations;
use crate::config::Config;
use crate::context::build_context;
use crate::index::{DocumentIndex, IndexedDocument};
use crate::model::{create_model, ChatModel, DisabledModel, ModelError};
use crate::models::{ChatResponse, ChatRole, ChatTurn};

/// Conversation turns consulted when building the prompt.
pub const HISTORY_WINDOW_TURNS: usize = 6;

/// Pages fed to the summarization prompt.
const SUMMARY_PAGES: usize = 5;

/// Character cap on the summarization prompt's document body.
const SUMMARY_MAX_CHARS: usize = 8000;

/// Shown when the model provider is disabled or has no credential.
pub const MSG_NOT_CONFIGURED: &str = "I'm sorry, but the AI service is not properly configured. \
     Please check that your API key is set up correctly.";

/// Shown when the requested document is not registered.
pub const MSG_NO_DOCUMENT: &str = "I don't have access to any document right now. \
     Please upload a PDF first so I can help you analyze its contents.";

/// Shown when the API rejects the credential mid-conversation.
pub const MSG_BAD_CREDENTIALS: &str = "There's an issue with the API configuration. \
     Please check your API key and try again.";

/// Shown on any other model failure.
pub const MSG_MODEL_FAILURE: &str = "I apologize, but I encountered an error while processing \
     your request. Please try again in a moment.";

const MSG_SUMMARY_NOT_CONFIGURED: &str =
    "Unable to generate summary - AI service not configured.";
const MSG_SUMMARY_FAILURE: &str = "Unable to generate document summary at this time.";

/// Orchestrates registration, question answering, and summarization.
pub struct QaService {
    index: Arc<DocumentIndex>,
    model: Box<dyn ChatModel>,
    context_chars: usize,
}

impl QaService {
    pub fn new(index: Arc<DocumentIndex>, model: Box<dyn ChatModel>, context_chars: usize) -> Self {
        Self {
            index,
            model,
            context_chars,
        }
    }

    /// Build a service from configuration. A provider that cannot be
    /// initialized (missing credential) degrades to the disabled model
    /// with a warning — queries then answer with the fixed
    /// not-configured message instead of failing at startup.
    pub fn from_config(config: &Config, index: Arc<DocumentIndex>) -> Self {
        let model: Box<dyn ChatModel> = match create_model(&config.model) {
            Ok(model) => model,
            Err(e) => {
                eprintln!("warning: {}; answers will be unavailable", e);
                Box::new(DisabledModel)
            }
        };
        Self::new(index, model, config.context.max_chars)
    }

    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    /// Register page texts under `id`, replacing any prior registration.
    pub fn register_document(
        &self,
        id: impl Into<String>,
        pages: Vec<String>,
    ) -> Arc<IndexedDocument> {
        self.index.register(id, pages)
    }

    /// Drop a document. Subsequent queries against `id` answer with the
    /// no-document message.
    pub fn remove_document(&self, id: &str) -> bool {
        self.index.remove(id)
    }

    /// Answer `query` against a registered document.
    ///
    /// Runs retrieval, context assembly, the model call, and citation
    /// extraction. Every failure path returns a fixed message with no
    /// citations; the method itself never fails.
    pub async fn answer_query(
        &self,
        query: &str,
        document_id: &str,
        history: &[ChatTurn],
    ) -> ChatResponse {
        let doc = match self.index.get(document_id) {
            Some(doc) => doc,
            None => return fallback(MSG_NO_DOCUMENT),
        };

        let context = build_context(&doc.pages, query, self.context_chars);
        let prompt = build_prompt(&context, history, query);

        match self.model.complete(&prompt).await {
            Ok(answer) => {
                let citations = extract_citations(&answer, &doc.pages, query);
                ChatResponse {
                    content: answer.trim().to_string(),
                    citations,
                }
            }
            Err(ModelError::NotConfigured(_)) => fallback(MSG_NOT_CONFIGURED),
            Err(ModelError::Auth(_)) => fallback(MSG_BAD_CREDENTIALS),
            Err(e) => {
                eprintln!("model call failed: {}", e);
                fallback(MSG_MODEL_FAILURE)
            }
        }
    }

    /// Summarize a registered document from its first pages.
    ///
    /// Like `answer_query`, failures degrade to fixed messages rather
    /// than errors.
    pub async fn summarize_document(&self, document_id: &str) -> String {
        let doc = match self.index.get(document_id) {
            Some(doc) => doc,
            None => return MSG_NO_DOCUMENT.to_string(),
        };

        let body: String = doc
            .pages
            .iter()
            .take(SUMMARY_PAGES)
            .cloned()
            .collect::<Vec<_>>()
            .join("\n\n");
        let body: String = body.chars().take(SUMMARY_MAX_CHARS).collect();

        match self.model.complete(&build_summary_prompt(&body)).await {
            Ok(summary) => summary.trim().to_string(),
            Err(ModelError::NotConfigured(_)) => MSG_SUMMARY_NOT_CONFIGURED.to_string(),
            Err(e) => {
                eprintln!("summary call failed: {}", e);
                MSG_SUMMARY_FAILURE.to_string()
            }
        }
    }
}

fn fallback(message: &str) -> ChatResponse {
    ChatResponse {
        content: message.to_string(),
        citations: Vec::new(),
    }
}

/// Format the most recent [`HISTORY_WINDOW_TURNS`] turns as
/// `User:`/`Assistant:` lines.
fn build_history_block(history: &[ChatTurn]) -> String {
    let start = history.len().saturating_sub(HISTORY_WINDOW_TURNS);
    history[start..]
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assemble the full answer prompt: instructions, document context,
/// bounded history, and the current question.
fn build_prompt(context: &str, history: &[ChatTurn], question: &str) -> String {
    format!(
        "You are an AI assistant helping users understand and analyze PDF documents. \
         You have access to the content of a PDF document and should provide helpful, \
         accurate responses based on that content.\n\
         \n\
         Document Content:\n{context}\n\
         \n\
         Previous Conversation:\n{history}\n\
         \n\
         Current Question: {question}\n\
         \n\
         Instructions:\n\
         1. Answer the question based on the document content provided above\n\
         2. Be specific and cite relevant information from the document\n\
         3. If the question cannot be answered from the document, say so clearly\n\
         4. Keep responses concise but informative\n\
         5. When referencing specific information, mention the page number if available\n\
         6. If asked for a summary, provide a comprehensive overview of the key points\n\
         \n\
         Please provide a helpful response:",
        context = context,
        history = build_history_block(history),
        question = question,
    )
}

fn build_summary_prompt(body: &str) -> String {
    format!(
        "Please provide a comprehensive summary of this document. Focus on:\n\
         1. Main topics and themes\n\
         2. Key findings or arguments\n\
         3. Important conclusions\n\
         4. Overall structure and purpose\n\
         \n\
         Document content:\n{body}\n\
         \n\
         Provide a clear, well-structured summary:",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted model: returns a fixed result and records prompts.
    struct StubModel {
        result: Result<String, fn() -> ModelError>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl StubModel {
        fn answering(answer: &str) -> Self {
            Self {
                result: Ok(answer.to_string()),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing(err: fn() -> ModelError) -> Self {
            Self {
                result: Err(err),
                prompts: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn recorded_prompts(&self) -> Arc<Mutex<Vec<String>>> {
            self.prompts.clone()
        }
    }

    #[async_trait]
    impl ChatModel for StubModel {
        fn model_name(&self) -> &str {
            "stub"
        }

        async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.result {
                Ok(answer) => Ok(answer.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn service_with(model: Box<dyn ChatModel>) -> QaService {
        let service = QaService::new(
            Arc::new(DocumentIndex::new()),
            model,
            crate::context::DEFAULT_CONTEXT_CHARS,
        );
        service.register_document(
            "doc1",
            vec!["The mitochondria is the powerhouse of the cell. It generates ATP.".to_string()],
        );
        service
    }

    #[tokio::test]
    async fn test_answer_with_citations() {
        let service = service_with(Box::new(StubModel::answering(
            "The mitochondria is the powerhouse of the cell.",
        )));
        let response = service.answer_query("powerhouse", "doc1", &[]).await;
        assert_eq!(
            response.content,
            "The mitochondria is the powerhouse of the cell."
        );
        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.citations[0].page_number, 1);
    }

    #[tokio::test]
    async fn test_unknown_document_fixed_message() {
        let service = service_with(Box::new(StubModel::answering("never called")));
        let response = service.answer_query("anything", "missing", &[]).await;
        assert_eq!(response.content, MSG_NO_DOCUMENT);
        assert!(response.citations.is_empty());
    }

    #[tokio::test]
    async fn test_removed_document_behaves_as_missing() {
        let service = service_with(Box::new(StubModel::answering("never called")));
        assert!(service.remove_document("doc1"));
        let response = service.answer_query("powerhouse", "doc1", &[]).await;
        assert_eq!(response.content, MSG_NO_DOCUMENT);
    }

    #[tokio::test]
    async fn test_not_configured_fixed_message() {
        let service = service_with(Box::new(DisabledModel));
        let response = service.answer_query("powerhouse", "doc1", &[]).await;
        assert_eq!(response.content, MSG_NOT_CONFIGURED);
        assert!(response.citations.is_empty());
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_credentials_message() {
        let service = service_with(Box::new(StubModel::failing(|| {
            ModelError::Auth("403".to_string())
        })));
        let response = service.answer_query("powerhouse", "doc1", &[]).await;
        assert_eq!(response.content, MSG_BAD_CREDENTIALS);
        assert!(response.citations.is_empty());
    }

    #[tokio::test]
    async fn test_transient_failure_maps_to_generic_message() {
        for make in [
            (|| ModelError::RateLimited("429".to_string())) as fn() -> ModelError,
            || ModelError::Network("reset".to_string()),
            || ModelError::Timeout(30),
        ] {
            let service = service_with(Box::new(StubModel::failing(make)));
            let response = service.answer_query("powerhouse", "doc1", &[]).await;
            assert_eq!(response.content, MSG_MODEL_FAILURE);
            assert!(response.citations.is_empty());
        }
    }

    #[tokio::test]
    async fn test_prompt_carries_context_history_and_question() {
        let stub = StubModel::answering("ok");
        let prompts = stub.recorded_prompts();
        let service = QaService::new(
            Arc::new(DocumentIndex::new()),
            Box::new(stub),
            crate::context::DEFAULT_CONTEXT_CHARS,
        );
        service.register_document(
            "doc1",
            vec!["The mitochondria is the powerhouse of the cell. It generates ATP.".to_string()],
        );

        let history = vec![ChatTurn::user("what is this paper about?")];
        service.answer_query("powerhouse", "doc1", &history).await;

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let prompt = &prompts[0];
        assert!(prompt.contains("[Page 1]"));
        assert!(prompt.contains("powerhouse of the cell"));
        assert!(prompt.contains("User: what is this paper about?"));
        assert!(prompt.contains("Current Question: powerhouse"));
    }

    #[test]
    fn test_history_window_keeps_last_six() {
        let history: Vec<ChatTurn> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    ChatTurn::user(format!("question {i}"))
                } else {
                    ChatTurn::assistant(format!("answer {i}"))
                }
            })
            .collect();
        let block = build_history_block(&history);
        assert!(!block.contains("question 2"));
        assert!(block.contains("question 4"));
        assert!(block.contains("answer 9"));
        assert_eq!(block.lines().count(), HISTORY_WINDOW_TURNS);
        assert!(block.starts_with("User: question 4"));
    }

    #[test]
    fn test_prompt_layout() {
        let history = vec![ChatTurn::user("earlier question")];
        let prompt = build_prompt("\n[Page 1]\ncontext body\n", &history, "current question");
        assert!(prompt.contains("Document Content:"));
        assert!(prompt.contains("[Page 1]"));
        assert!(prompt.contains("User: earlier question"));
        assert!(prompt.contains("Current Question: current question"));
        let context_pos = prompt.find("Document Content:").unwrap();
        let history_pos = prompt.find("Previous Conversation:").unwrap();
        let question_pos = prompt.find("Current Question:").unwrap();
        assert!(context_pos < history_pos && history_pos < question_pos);
    }
}
