use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Contextual services available to format matchers
///
/// Contexts are persistent: [`MatchContext::with_service`] layers a new entry
/// over the existing ones and returns a new context, leaving the original
/// untouched. Layers are shared between every context derived from them.
#[derive(Clone, Default)]
pub struct MatchContext {
    head: Option<Arc<Layer>>,
}

struct Layer {
    service: Service,
    parent: Option<Arc<Layer>>,
}

/// A type-keyed service entry
#[derive(Clone)]
pub struct Service {
    key: TypeId,
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl Service {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            key: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            value: Arc::new(value),
        }
    }
}

impl MatchContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context with one more service; a later entry of the same
    /// type shadows earlier ones
    pub fn with_service<T: Any + Send + Sync>(&self, service: T) -> Self {
        self.with_services([Service::new(service)])
    }

    /// Derive a context with several services layered in order
    pub fn with_services(&self, services: impl IntoIterator<Item = Service>) -> Self {
        let mut head = self.head.clone();
        for service in services {
            head = Some(Arc::new(Layer {
                service,
                parent: head,
            }));
        }
        Self { head }
    }

    /// Look up the most recently layered service of type `T`
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        let key = TypeId::of::<T>();
        self.layers()
            .find(|layer| layer.service.key == key)
            .and_then(|layer| layer.service.value.downcast_ref::<T>())
    }

    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Number of layered entries, shadowed ones included
    pub fn len(&self) -> usize {
        self.layers().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn layers(&self) -> impl Iterator<Item = &Layer> {
        std::iter::successors(self.head.as_deref(), |layer| layer.parent.as_deref())
    }
}

impl fmt::Debug for MatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.layers().map(|layer| layer.service.name))
            .finish()
    }
}

/// Name of the file the analyzed stream came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName(pub String);

impl SourceName {
    /// Lower-cased extension, if the name has one
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.0)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
    }
}

