use std::sync::Arc;
use std::time::Duration;

use tsmatch_core::{
    CandidateSource, ChartRenderer, MatchConfig, MatchError, NormalizedSeries, SeriesSink,
    TimeSeries, Variance, normalize,
};

/// Orchestrator that drives candidate sources through normalization,
/// scoring, ranking, persistence, and rendering.
pub struct Matcher {
    pub(crate) sources: Vec<Arc<dyn CandidateSource>>,
    pub(crate) sink: Option<Arc<dyn SeriesSink>>,
    pub(crate) renderer: Option<Arc<dyn ChartRenderer>>,
    pub(crate) cfg: MatchConfig,
}

/// Builder for constructing a `Matcher` with custom configuration.
pub struct MatcherBuilder {
    sources: Vec<Arc<dyn CandidateSource>>,
    sink: Option<Arc<dyn SeriesSink>>,
    renderer: Option<Arc<dyn ChartRenderer>>,
    cfg: MatchConfig,
}

impl Default for MatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MatcherBuilder {
    /// Create a new builder with default configuration.
    ///
    /// Starts with no sources, no sink, and no renderer. At least one source
    /// must be registered via [`with_source`](Self::with_source).
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: vec![],
            sink: None,
            renderer: None,
            cfg: MatchConfig::default(),
        }
    }

    /// Register a candidate source.
    ///
    /// Sources are enumerated in registration order. When two sources list the
    /// same candidate id, the first registered source serves it.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn CandidateSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Persist normalized series and the ranking through `sink`.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn SeriesSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Render one chart per report entry through `renderer`.
    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Number of top-ranked candidates kept in the assembled report.
    #[must_use]
    pub const fn top_k(mut self, k: usize) -> Self {
        self.cfg.top_k = k;
        self
    }

    /// Variance convention applied to the reference and every candidate.
    #[must_use]
    pub const fn variance(mut self, variance: Variance) -> Self {
        self.cfg.variance = variance;
        self
    }

    /// Set the per-candidate fetch timeout.
    ///
    /// A fetch that exceeds it is recorded as a `FetchTimeout` failure on that
    /// candidate only.
    #[must_use]
    pub const fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.fetch_timeout = timeout;
        self
    }

    /// Set an overall deadline for the candidate fan-out.
    ///
    /// Candidates that finished before the deadline keep their results; the
    /// rest are recorded as `RequestTimeout` failures.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Maximum number of candidates fetched and evaluated concurrently.
    #[must_use]
    pub const fn max_concurrency(mut self, n: usize) -> Self {
        self.cfg.max_concurrency = n;
        self
    }

    /// Toggle persistence of each normalized candidate.
    #[must_use]
    pub const fn persist_normalized(mut self, yes: bool) -> Self {
        self.cfg.persist_normalized = yes;
        self
    }

    /// Build the `Matcher` orchestrator.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no sources are registered, or if `top_k` or
    /// `max_concurrency` is zero.
    pub fn build(self) -> Result<Matcher, MatchError> {
        if self.sources.is_empty() {
            return Err(MatchError::InvalidArg(
                "no sources registered; add at least one via with_source(...)".to_string(),
            ));
        }
        if self.cfg.top_k == 0 {
            return Err(MatchError::InvalidArg(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if self.cfg.max_concurrency == 0 {
            return Err(MatchError::InvalidArg(
                "max_concurrency must be greater than zero".to_string(),
            ));
        }

        Ok(Matcher {
            sources: self.sources,
            sink: self.sink,
            renderer: self.renderer,
            cfg: self.cfg,
        })
    }
}

/// Attribute an opaque source error to the source that raised it.
///
/// Errors that already identify their origin pass through unchanged.
pub fn tag_err(source: &str, e: MatchError) -> MatchError {
    match e {
        e @ (MatchError::NotFound { .. }
        | MatchError::Store { .. }
        | MatchError::Validation { .. }
        | MatchError::InvalidSeries { .. }
        | MatchError::FetchTimeout { .. }
        | MatchError::RequestTimeout { .. }
        | MatchError::AllSourcesFailed(_)) => e,
        other => MatchError::Store {
            store: source.to_string(),
            msg: other.to_string(),
        },
    }
}

impl Matcher {
    /// Start building a new `Matcher`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use tsmatch::Matcher;
    ///
    /// let matcher = Matcher::builder()
    ///     .with_source(Arc::new(pg_source))
    ///     .sink(Arc::new(csv_sink))
    ///     .renderer(Arc::new(svg_renderer))
    ///     .top_k(5)
    ///     .build()?;
    /// let report = matcher.run(&reference).await?;
    /// ```
    #[must_use]
    pub fn builder() -> MatcherBuilder {
        MatcherBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Normalize the reference series with the configured variance convention.
    ///
    /// # Errors
    /// Returns `InsufficientData` or `DegenerateSeries` if the reference cannot
    /// be normalized; no candidate can be scored against it.
    pub fn normalize_reference(
        &self,
        reference: &TimeSeries,
    ) -> Result<Arc<NormalizedSeries>, MatchError> {
        normalize(reference, self.cfg.variance).map(Arc::new)
    }

    /// Wrap a source future with a timeout and standardized timeout error mapping.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "tsmatch::core::fetch_with_timeout",
            skip(source_name, fut),
            fields(
                source = source_name,
                timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            ),
        )
    )]
    pub(crate) async fn fetch_with_timeout<T, Fut>(
        source_name: &'static str,
        candidate: &str,
        timeout: Duration,
        fut: Fut,
    ) -> Result<T, MatchError>
    where
        Fut: std::future::Future<Output = Result<T, MatchError>>,
    {
        (tokio::time::timeout(timeout, fut).await)
            .unwrap_or_else(|_| Err(MatchError::fetch_timeout(source_name, candidate)))
    }

    /// Run blocking collaborator I/O on the blocking pool.
    pub(crate) async fn offload<T, F>(stage: &'static str, work: F) -> Result<T, MatchError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(work)
            .await
            .map_err(|e| MatchError::Other(format!("{stage} task failed: {e}")))
    }
}
