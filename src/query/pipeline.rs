//! Online query path: embed, rank, prompt, generate

use std::sync::Arc;

use super::state::QueryEvent;
use crate::embedding::Embedder;
use crate::errors::Result;
use crate::generation::{self, Generator};
use crate::knowledge::{KnowledgeBase, KnowledgeRecord};
use crate::prompt::PromptBuilder;
use crate::retrieval::{self, ScoredRecord};
use crate::telemetry::{NoopObserver, PipelineEvent, PipelineObserver};

/// Default number of records placed in the prompt
pub const DEFAULT_TOP_K: usize = 3;

/// Ranked records selected for one question
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedContext {
    pub records: Vec<KnowledgeRecord>,
    pub similarities: Vec<f64>,
}

impl RetrievedContext {
    fn from_scored(scored: &[ScoredRecord<'_>]) -> Self {
        Self {
            records: scored.iter().map(|s| s.record.clone()).collect(),
            similarities: scored.iter().map(|s| s.similarity).collect(),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name.clone()).collect()
    }
}

/// Everything produced while answering one question
#[derive(Debug, Clone)]
pub struct Answer {
    pub question: String,
    pub context: RetrievedContext,
    pub prompt: String,
    pub text: String,
    /// False when `text` is an inline generation failure
    pub generated: bool,
}

/// Query pipeline over an immutable knowledge base handle
pub struct QueryPipeline {
    kb: KnowledgeBase,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    prompt_builder: PromptBuilder,
    top_k: usize,
    observer: Arc<dyn PipelineObserver>,
}

impl QueryPipeline {
    pub fn new(
        kb: KnowledgeBase,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            kb,
            embedder,
            generator,
            prompt_builder: PromptBuilder::default(),
            top_k: DEFAULT_TOP_K,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn generator_model(&self) -> &str {
        self.generator.model()
    }

    /// Embed the question; the only step that can fail a query
    pub async fn embed_question(&self, question: &str) -> Result<Vec<f64>> {
        let embedding = self.embedder.embed(question).await?;
        self.observer.on_event(&PipelineEvent::EmbeddingObtained {
            dimension: embedding.len(),
        });
        Ok(embedding)
    }

    /// Rank the knowledge base against an embedded question
    pub fn rank(&self, query: &[f64]) -> RetrievedContext {
        let scored = retrieval::top_k(query, &self.kb, self.top_k);
        let context = RetrievedContext::from_scored(&scored);
        self.observer.on_event(&PipelineEvent::RankingComplete {
            top: context.names(),
        });
        context
    }

    /// Build the generation prompt
    pub fn build_prompt(&self, question: &str, context: &RetrievedContext) -> String {
        let prompt = self.prompt_builder.build(question, &context.records);
        self.observer.on_event(&PipelineEvent::PromptBuilt {
            chars: prompt.chars().count(),
            contexts: context.records.len(),
        });
        prompt
    }

    /// Generate an answer; failures come back as inline text
    pub async fn generate(&self, prompt: &str) -> (String, bool) {
        let (text, generated) = generation::answer(self.generator.as_ref(), prompt).await;
        self.observer.on_event(&PipelineEvent::AnswerGenerated {
            chars: text.chars().count(),
            success: generated,
        });
        (text, generated)
    }

    /// Run the whole path for one question
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        self.ask_with_steps(question, |_| Ok(())).await
    }

    /// Run the whole path, reporting each completed step to `step`
    ///
    /// `step` sees `QuestionReceived` first and `AnswerReady` last; an error
    /// from it abandons the question.
    pub async fn ask_with_steps<F>(&self, question: &str, mut step: F) -> Result<Answer>
    where
        F: FnMut(QueryEvent) -> Result<()>,
    {
        step(QueryEvent::QuestionReceived)?;
        let query = self.embed_question(question).await?;

        step(QueryEvent::QueryEmbedded)?;
        let context = self.rank(&query);

        step(QueryEvent::Ranked)?;
        let prompt = self.build_prompt(question, &context);

        step(QueryEvent::PromptReady)?;
        let (text, generated) = self.generate(&prompt).await;

        step(QueryEvent::AnswerReady)?;

        Ok(Answer {
            question: question.to_string(),
            context,
            prompt,
            text,
            generated,
        })
    }
}
