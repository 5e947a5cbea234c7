//! Access to the externally-owned element tree.
//!
//! The search engine never touches a platform API directly. Everything it
//! knows about an element comes through [`ElementAdapter`], which makes the
//! engine testable against an in-memory tree.

use uilocator_core::error::Result;

/// Synchronous, blocking view of a live element tree.
///
/// Listing methods return elements in the order the platform reports them;
/// that order is not guaranteed to be stable between calls. Any method may
/// fail with [`uilocator_core::Error::AdapterFailure`] when the tree is not
/// accessible.
pub trait ElementAdapter {
    /// Opaque handle to one element
    type Element: Clone + std::fmt::Debug;

    fn list_top_level_roots(&self) -> Result<Vec<Self::Element>>;

    fn list_children(&self, element: &Self::Element) -> Result<Vec<Self::Element>>;

    fn class_name(&self, element: &Self::Element) -> Result<String>;

    /// Superclass names, most specific first
    fn superclass_chain(&self, element: &Self::Element) -> Result<Vec<String>>;

    /// Platform classification of the element (e.g. "PushButton")
    fn resolved_type(&self, element: &Self::Element) -> Result<String>;

    fn id(&self, element: &Self::Element) -> Result<Option<String>>;

    fn name(&self, element: &Self::Element) -> Result<Option<String>>;

    fn text(&self, element: &Self::Element) -> Result<String>;

    fn caption(&self, element: &Self::Element) -> Result<String>;

    fn property(&self, element: &Self::Element, name: &str) -> Result<String>;
}

impl<T: ElementAdapter + ?Sized> ElementAdapter for &T {
    type Element = T::Element;

    fn list_top_level_roots(&self) -> Result<Vec<Self::Element>> {
        (**self).list_top_level_roots()
    }

    fn list_children(&self, element: &Self::Element) -> Result<Vec<Self::Element>> {
        (**self).list_children(element)
    }

    fn class_name(&self, element: &Self::Element) -> Result<String> {
        (**self).class_name(element)
    }

    fn superclass_chain(&self, element: &Self::Element) -> Result<Vec<String>> {
        (**self).superclass_chain(element)
    }

    fn resolved_type(&self, element: &Self::Element) -> Result<String> {
        (**self).resolved_type(element)
    }

    fn id(&self, element: &Self::Element) -> Result<Option<String>> {
        (**self).id(element)
    }

    fn name(&self, element: &Self::Element) -> Result<Option<String>> {
        (**self).name(element)
    }

    fn text(&self, element: &Self::Element) -> Result<String> {
        (**self).text(element)
    }

    fn caption(&self, element: &Self::Element) -> Result<String> {
        (**self).caption(element)
    }

    fn property(&self, element: &Self::Element, name: &str) -> Result<String> {
        (**self).property(element, name)
    }
}

/// The attributes every visited element is counted by, read once per visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFacts {
    pub class_name: String,
    /// The class name followed by its superclasses, most specific first
    pub lineage: Vec<String>,
    pub resolved_type: String,
    pub id: Option<String>,
    pub name: Option<String>,
}

impl ElementFacts {
    pub fn collect<A: ElementAdapter + ?Sized>(adapter: &A, element: &A::Element) -> Result<Self> {
        let class_name = adapter.class_name(element)?;
        let mut lineage = vec![class_name.clone()];
        lineage.extend(
            adapter
                .superclass_chain(element)?
                .into_iter()
                .enumerate()
                .filter(|(position, ancestor)| !(*position == 0 && *ancestor == class_name))
                .map(|(_, ancestor)| ancestor),
        );

        Ok(Self {
            resolved_type: adapter.resolved_type(element)?,
            id: adapter.id(element)?,
            name: adapter.name(element)?,
            class_name,
            lineage,
        })
    }
}
