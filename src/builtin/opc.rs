use crate::analyzer::Dispatch;
use crate::container::{ContainerAnalyzer, ContainerProvider, ContainerStep};
use crate::context::AnalysisContext;
use crate::entity::{DirectoryEntity, Entity, FileEntity};
use crate::error::AnalysisError;
use crate::value::Value;
use crate::xml::{XmlTokenReader, XmlTokenSource, read_prolog};
use anyhow::{Context, bail};
use std::collections::HashMap;
use std::io::BufReader;
use std::sync::Arc;
use tracing::debug;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Parsed `[Content_Types].xml` of an Open Packaging Conventions package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// Lowercased extension -> content type
    defaults: HashMap<String, String>,
    /// Lowercased part name -> content type
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    pub fn parse(source: &mut dyn XmlTokenSource) -> anyhow::Result<Self> {
        let (info, _) = read_prolog(source).context("Failed to read content types")?;
        if info.root_name() != "Types" || info.root_namespace() != Some(CONTENT_TYPES_NS) {
            bail!("unexpected root element <{}>", info.root_name());
        }

        let mut types = Self::default();
        while let Some(token) = source.next_token()? {
            if !token.is_start() || token.depth != 1 {
                continue;
            }
            let content_type = token.attribute("ContentType");
            match (token.name.as_str(), content_type) {
                ("Default", Some(content_type)) => {
                    if let Some(ext) = token.attribute("Extension") {
                        types
                            .defaults
                            .insert(ext.to_lowercase(), content_type.to_string());
                    }
                }
                ("Override", Some(content_type)) => {
                    if let Some(part) = token.attribute("PartName") {
                        types
                            .overrides
                            .insert(part.to_lowercase(), content_type.to_string());
                    }
                }
                _ => {}
            }
        }
        Ok(types)
    }

    /// Content type of a part such as `/word/document.xml`
    ///
    /// Part names compare case-insensitively; an override wins over the
    /// default for the part's extension.
    pub fn lookup(&self, part_name: &str) -> Option<&str> {
        let part_name = part_name.to_lowercase();
        if let Some(content_type) = self.overrides.get(&part_name) {
            return Some(content_type);
        }
        let (_, ext) = part_name.rsplit_once('.')?;
        self.defaults.get(ext).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.defaults.len() + self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Roots a package at any directory holding a `[Content_Types].xml`
pub struct OpcProvider;

impl ContainerProvider for OpcProvider {
    fn name(&self) -> &str {
        "opc"
    }

    fn match_root(
        &self,
        entity: &dyn Value,
        _ctx: &AnalysisContext,
    ) -> Result<Option<Arc<dyn ContainerAnalyzer>>, AnalysisError> {
        let Some(dir) = entity.downcast_ref::<DirectoryEntity>() else {
            return Ok(None);
        };
        let Some(Entity::File(manifest)) = dir.find_ignore_case(CONTENT_TYPES_PART) else {
            return Ok(None);
        };

        let types = read_manifest(manifest)
            .with_context(|| format!("Invalid package manifest {}", manifest.path()))?;
        debug!(root = dir.path(), types = types.len(), "package manifest read");

        Ok(Some(Arc::new(OpcAnalyzer {
            root: dir.path().to_string(),
            types,
        })))
    }
}

fn read_manifest(manifest: &FileEntity) -> anyhow::Result<ContentTypes> {
    let stream = manifest.open().context("Failed to open content types")?;
    let mut reader = XmlTokenReader::new(BufReader::new(stream));
    ContentTypes::parse(&mut reader)
}

/// Annotates every part of a package with its content type
pub struct OpcAnalyzer {
    root: String,
    types: ContentTypes,
}

impl OpcAnalyzer {
    /// Part name of `path` relative to the package root, e.g. `/word/document.xml`
    fn part_name(&self, path: &str) -> String {
        let relative = if self.root.is_empty() {
            path
        } else {
            path.strip_prefix(&self.root)
                .map(|rest| rest.trim_start_matches('/'))
                .unwrap_or(path)
        };
        format!("/{}", relative)
    }
}

impl ContainerAnalyzer for OpcAnalyzer {
    fn name(&self) -> &str {
        "opc-content-types"
    }

    fn analyze(
        &self,
        _parent: &dyn Value,
        entity: &dyn Value,
        ctx: &AnalysisContext,
        _dispatch: &dyn Dispatch,
    ) -> Result<ContainerStep, AnalysisError> {
        if entity.is::<DirectoryEntity>() {
            return Ok(ContainerStep::follow());
        }
        let Some(file) = entity.downcast_ref::<FileEntity>() else {
            return Ok(ContainerStep::pass());
        };

        let part_name = self.part_name(file.path());
        if let Some(content_type) = self.types.lookup(&part_name) {
            let node = ctx.node();
            node.set("partName", &part_name);
            node.set("contentType", content_type);
        }
        // Parts are leaves of the package, whatever they contain.
        Ok(ContainerStep::pass())
    }
}
