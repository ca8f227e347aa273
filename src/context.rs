use crate::component::ComponentRegistry;
use crate::property::PropertyLibrary;

/// Read-only tables a structure consults while it updates.
#[derive(Debug, Clone, Copy)]
pub struct FeaContext<'a> {
    pub components: &'a ComponentRegistry,
    pub library: &'a PropertyLibrary,
}

impl<'a> FeaContext<'a> {
    #[must_use]
    pub fn new(components: &'a ComponentRegistry, library: &'a PropertyLibrary) -> Self {
        Self {
            components,
            library,
        }
    }
}
