//! Retrieval-augmented question answering over one session

use std::sync::Arc;

use crate::cache::AnswerCache;
use crate::error::Result;
use crate::generation::PromptBuilder;
use crate::ingestion::ChunkIndexer;
use crate::providers::LlmProvider;
use crate::retrieval::RelevanceRanker;
use crate::types::{QaRequest, QaResponse};

/// Answers questions about a session from its most relevant chunks
pub struct QaService {
    cache: Arc<AnswerCache>,
    indexer: Arc<ChunkIndexer>,
    ranker: RelevanceRanker,
    llm: Arc<dyn LlmProvider>,
    prompts: PromptBuilder,
    top_k: usize,
}

impl QaService {
    pub fn new(
        cache: Arc<AnswerCache>,
        indexer: Arc<ChunkIndexer>,
        llm: Arc<dyn LlmProvider>,
        prompts: PromptBuilder,
        top_k: usize,
    ) -> Self {
        Self {
            cache,
            ranker: RelevanceRanker::new(Arc::clone(&indexer)),
            indexer,
            llm,
            prompts,
            top_k,
        }
    }

    /// Answer `request` about the session stored under `filename`
    ///
    /// A cached answer is returned without touching the document. Otherwise
    /// the document is indexed if needed, the top chunks become the prompt
    /// context and the generated answer is cached.
    pub async fn answer(&self, filename: &str, request: &QaRequest) -> Result<QaResponse> {
        let question = request.validated_question()?;

        if let Some(answer) = self.cache.get(filename, question).await? {
            return Ok(QaResponse::success(answer, true, 0));
        }

        self.indexer.ensure_chunks(filename).await?;
        let chunks = self.ranker.top_k(filename, question, self.top_k).await?;

        let context = PromptBuilder::build_context(&chunks);
        let prompt = self.prompts.qa_prompt(&context, &request.chat_history, question);

        tracing::info!(
            "Answering question on {} with {} chunks via {}/{}",
            filename,
            chunks.len(),
            self.llm.name(),
            self.llm.model()
        );
        let answer = self.llm.generate(&prompt).await?;

        self.cache.put_default(filename, question, &answer).await?;
        Ok(QaResponse::success(answer, false, chunks.len()))
    }

    /// Drop cached answers and chunks for a document, then rebuild the chunks
    pub async fn reindex(&self, filename: &str) -> Result<usize> {
        self.cache.invalidate_document(filename).await?;
        self.indexer.reindex(filename).await
    }
}
