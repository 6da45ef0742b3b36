mod config;

#[cfg(test)]
mod tests;

pub use config::{ArchiveLimits, EngineConfig, EngineConfigBuilder};

use crate::analyzer::{
    AnalysisResult, Analyzer, AnalyzerRegistry, AnalyzerRegistryBuilder, Dispatch,
};
use crate::builtin;
use crate::container::{
    ActiveAnalyzer, ContainerBehaviour, ContainerFrame, ContainerProvider, FrameJournal,
    ProviderId,
};
use crate::context::AnalysisContext;
use crate::entity;
use crate::error::{AnalysisError, PartialFailure};
use crate::format::xml::XmlFormat;
use crate::format::{Format, FormatRegistry, FormatRegistryBuilder};
use crate::node::{Node, NodeFactory};
use crate::value::{KindHierarchy, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to read {}: {source}", path.display())]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Outcome of analyzing one top-level input
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Node describing the input, root of the description tree
    pub root: Node,
    pub result: AnalysisResult,
}

struct RegisteredProvider {
    id: ProviderId,
    provider: Arc<dyn ContainerProvider>,
}

/// Mutable builder wiring registries, providers and configuration together
pub struct EngineBuilder {
    analyzers: AnalyzerRegistryBuilder,
    formats: FormatRegistryBuilder,
    providers: Vec<Arc<dyn ContainerProvider>>,
    config: EngineConfig,
    journal: Option<Arc<FrameJournal>>,
    builtins: bool,
}

impl EngineBuilder {
    /// Create an empty builder; nothing is registered
    pub fn new() -> Self {
        Self {
            analyzers: AnalyzerRegistryBuilder::new(),
            formats: FormatRegistryBuilder::new(),
            providers: Vec::new(),
            config: EngineConfig::default(),
            journal: None,
            builtins: false,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Record every frame built into `journal`
    pub fn journal(mut self, journal: Arc<FrameJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Add the built-in formats, analyzers and container providers
    ///
    /// They are registered after everything added explicitly.
    pub fn with_builtins(mut self) -> Self {
        self.builtins = true;
        self
    }

    /// Declare additional kind relations
    pub fn hierarchy_mut(&mut self) -> &mut KindHierarchy {
        self.analyzers.hierarchy_mut()
    }

    pub fn register_analyzer(&mut self, analyzer: impl Analyzer + 'static) -> &mut Self {
        self.analyzers.register(analyzer);
        self
    }

    pub fn register_format(&mut self, format: impl Format + 'static) -> &mut Self {
        self.formats.register(format);
        self
    }

    pub fn register_xml_format(&mut self, format: impl XmlFormat + 'static) -> &mut Self {
        self.formats.register_xml(format);
        self
    }

    pub fn register_provider(&mut self, provider: impl ContainerProvider + 'static) -> &mut Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Freeze everything into an engine
    pub fn build(self) -> Engine {
        let config = self.config;
        let mut formats = self.formats;
        let mut analyzers = self.analyzers;
        let mut providers = self.providers;

        if self.builtins {
            builtin::register_formats(&mut formats, &config);
        }
        let formats = Arc::new(formats.race_capacity(config.race_capacity).build());

        if self.builtins {
            builtin::register_analyzers(&mut analyzers, Arc::clone(&formats));
            providers.extend(builtin::providers());
        }
        let analyzers = Arc::new(analyzers.error_policy(config.error_policy).build());

        let providers = providers
            .into_iter()
            .enumerate()
            .map(|(i, provider)| RegisteredProvider {
                id: ProviderId(i),
                provider,
            })
            .collect();

        Engine {
            analyzers,
            formats,
            providers,
            config,
            journal: self.journal,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursive analysis engine
///
/// Immutable once built; one engine can analyze any number of inputs. When
/// no container frame is active the engine is itself the dispatcher for
/// nested entities.
pub struct Engine {
    analyzers: Arc<AnalyzerRegistry>,
    formats: Arc<FormatRegistry>,
    providers: Vec<RegisteredProvider>,
    config: EngineConfig,
    journal: Option<Arc<FrameJournal>>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Engine with only the built-in collaborators and the given config
    pub fn with_defaults(config: EngineConfig) -> Self {
        EngineBuilder::new().config(config).with_builtins().build()
    }

    pub fn analyzers(&self) -> &AnalyzerRegistry {
        &self.analyzers
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Names of the registered container providers, in probing order
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.provider.name()).collect()
    }

    /// Analyze a top-level input with a fresh node tree
    pub fn analyze(&self, entity: &dyn Value) -> Result<Analysis, AnalysisError> {
        let nodes = NodeFactory::new();
        let root = nodes.root();
        let ctx = AnalysisContext::new(nodes, root.clone());

        let result = self.analyze_entity(None, entity, &ctx)?;
        Ok(Analysis { root, result })
    }

    /// Load a file or directory from disk and analyze it
    pub fn analyze_path(&self, path: &Path) -> Result<Analysis, EngineError> {
        let entity = entity::load_path(path).map_err(|source| EngineError::Source {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.analyze(entity.as_value())?)
    }

    /// Analyze `entity`, arriving through `frame` (none for a top-level input)
    ///
    /// Active container analyzers of the frame see the entity first, then
    /// providers not already active try to root a container at it. The
    /// entity's own frame is built when anything follows, roots or blocks.
    /// The flat registry then gets the entity, or, when a container analyzer
    /// claimed it, the claiming analyzers descend into it. Either way the
    /// children go through the entity's own frame when one was built.
    pub fn analyze_entity(
        &self,
        frame: Option<&ContainerFrame<'_>>,
        entity: &dyn Value,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        if ctx.depth() > self.config.max_depth {
            debug!(depth = ctx.depth(), entity = ?entity.label(), "depth limit reached");
            let failure = PartialFailure::DepthLimit(self.config.max_depth);
            ctx.node().add_class(failure.tag());
            return Ok(AnalysisResult::partial(ctx.node().clone(), failure));
        }

        let policy = self.analyzers.error_policy();
        let mut followers = Vec::new();
        let mut blocking = frame.is_some_and(ContainerFrame::is_blocking);
        let mut claimed = AnalysisResult::declined();
        let mut claimers = Vec::new();

        if let Some(frame) = frame {
            for active in frame.active() {
                let step = match active.analyzer.analyze(frame.value(), entity, ctx, frame) {
                    Ok(step) => step,
                    Err(err) => {
                        policy.contain(active.analyzer.name(), err)?;
                        continue;
                    }
                };
                if step.behaviour.contains(ContainerBehaviour::FOLLOW_CHILDREN) {
                    followers.push(active.clone());
                }
                if step.behaviour.contains(ContainerBehaviour::BLOCK_OTHER) {
                    blocking = true;
                }
                if !step.result.is_declined() {
                    claimers.push(Arc::clone(&active.analyzer));
                }
                claimed = claimed.merge(step.result);
            }
        }

        let mut rooted = Vec::new();
        if !blocking {
            for registered in &self.providers {
                if frame.is_some_and(|f| f.is_active(registered.id)) {
                    continue;
                }
                match registered.provider.match_root(entity, ctx) {
                    Ok(Some(analyzer)) => {
                        debug!(
                            provider = registered.provider.name(),
                            analyzer = analyzer.name(),
                            "container root matched"
                        );
                        rooted.push(ActiveAnalyzer {
                            analyzer,
                            provider: registered.id,
                        });
                    }
                    Ok(None) => {}
                    Err(err) => policy.contain(registered.provider.name(), err)?,
                }
            }
        }

        let own = if followers.is_empty() && rooted.is_empty() && !blocking {
            None
        } else {
            followers.extend(rooted);
            Some(self.build_frame(frame, entity, ctx, followers, blocking))
        };
        let dispatch: &dyn Dispatch = match &own {
            Some(own) => own,
            None => self,
        };

        if claimed.is_declined() {
            let result = self.analyzers.dispatch(entity, ctx, dispatch)?;
            return Ok(self.classify(claimed.merge(result)));
        }

        for claimer in &claimers {
            match claimer.descend(entity, ctx, dispatch) {
                Ok(walked) => claimed = claimed.merge(walked),
                Err(err) => policy.contain(claimer.name(), err)?,
            }
        }
        Ok(self.classify(claimed))
    }

    fn build_frame<'a>(
        &'a self,
        parent: Option<&'a ContainerFrame<'a>>,
        entity: &'a dyn Value,
        ctx: &AnalysisContext,
        active: Vec<ActiveAnalyzer>,
        blocking: bool,
    ) -> ContainerFrame<'a> {
        let names: Vec<String> = active.iter().map(|a| a.analyzer.name().to_string()).collect();
        trace!(
            depth = ctx.depth(),
            entity = ?entity.label(),
            analyzers = ?names,
            blocking,
            "frame built"
        );

        let record = self.journal.as_ref().map(|journal| {
            journal.record(
                parent.and_then(ContainerFrame::record),
                ctx.depth(),
                entity_name(entity),
                names,
                blocking,
            )
        });
        ContainerFrame::new(self, parent, entity, active, blocking, record)
    }

    /// Turn a partial failure into a classification of the described node
    fn classify(&self, result: AnalysisResult) -> AnalysisResult {
        if let (Some(node), Some(failure)) = (&result.node, &result.failure) {
            node.add_class(failure.tag());
        }
        result
    }
}

fn entity_name(entity: &dyn Value) -> String {
    match entity.label() {
        Some(label) => format!("{} {}", entity.kind(), label),
        None => entity.kind().to_string(),
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("analyzers", &self.analyzers.names())
            .field("formats", &self.formats.formats().count())
            .field("providers", &self.provider_names())
            .field("config", &self.config)
            .finish()
    }
}

impl Dispatch for Engine {
    fn analyze_entity(
        &self,
        entity: &dyn Value,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        Engine::analyze_entity(self, None, entity, ctx)
    }

    fn analyze_value(
        &self,
        value: &dyn Value,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.analyzers.dispatch(value, ctx, self)
    }
}
