//! Independently encapsulated dashboard components.
//!
//! A component only exposes `render`; it receives its input as serialized text
//! at its instantiation point and owns the shadow root it renders into. The
//! registry is the only way a parent instantiates a child.

mod assessment;
mod criteria;
mod reporting;

use std::collections::BTreeMap;
use std::sync::Arc;

use super::channel::{self, BoundaryPayload, Decoded};
use super::markup::{Element, Node};

pub use assessment::AssessmentEngine;
pub use criteria::{CriteriaDataset, CriteriaEntry, CriteriaError, CriteriaGuide};
pub use reporting::{Reporting, DOWNLOAD_PATH};

pub trait Component: Send + Sync {
    fn tag(&self) -> &'static str;

    /// Renders the private scope from the raw attribute payload.
    fn render(&self, payload: Option<&str>) -> Vec<Node>;
}

/// Component whose input crosses the boundary through [`channel`].
pub trait TypedComponent: Send + Sync {
    const TAG: &'static str;
    type Input: BoundaryPayload;

    fn render_decoded(&self, input: &Decoded<Self::Input>) -> Vec<Node>;
}

impl<C: TypedComponent> Component for C {
    fn tag(&self) -> &'static str {
        C::TAG
    }

    fn render(&self, payload: Option<&str>) -> Vec<Node> {
        let decoded = channel::decode::<C::Input>(payload);
        self.render_decoded(&decoded)
    }
}

type Factory = Arc<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Tag to constructor table used for every mount.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: BTreeMap<&'static str, Factory>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the criteria guide, assessment engine and reporting components.
    pub fn standard(criteria: Arc<CriteriaDataset>) -> Self {
        let mut registry = Self::new();
        registry.register(CriteriaGuide::TAG, move || {
            Box::new(CriteriaGuide::new(criteria.clone())) as Box<dyn Component>
        });
        registry.register(AssessmentEngine::TAG, || {
            Box::new(AssessmentEngine) as Box<dyn Component>
        });
        registry.register(Reporting::TAG, || Box::new(Reporting) as Box<dyn Component>);
        registry
    }

    pub fn register<F>(&mut self, tag: &'static str, factory: F)
    where
        F: Fn() -> Box<dyn Component> + Send + Sync + 'static,
    {
        self.factories.insert(tag, Arc::new(factory));
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    /// Instantiates `tag` with an encoded payload and renders it into its own
    /// shadow root. Unknown tags mount as an empty element.
    pub fn mount(&self, tag: &str, payload: Option<String>) -> Element {
        let mut host = Element::new(tag);
        if let Some(payload) = &payload {
            host = host.with_attr("data", payload.as_str());
        }

        match self.factories.get(tag) {
            Some(factory) => {
                let component = factory();
                host.child(Node::ShadowRoot(component.render(payload.as_deref())))
            }
            None => {
                tracing::warn!(tag, "mount requested for unregistered component");
                host
            }
        }
    }

    /// Mounts a typed component, encoding its input on the way in.
    pub fn mount_with<C: TypedComponent>(&self, input: &C::Input) -> Element {
        self.mount(C::TAG, Some(channel::encode(input)))
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("tags", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
