//! Style catalog, reference resolution and style composition.
//!
//! This module contains:
//! - `StyleDefinition` and `StyleCatalog`, read from `<Style>`/`<StyleMap>`
//! - Reference resolution through style-map aliases
//! - `StylePolicy`, the defaults used whenever a style part is absent

mod catalog;
mod policy;
mod resolve;

pub use catalog::{IconStyle, LabelStyle, LineStyle, PolyStyle, StyleCatalog, StyleDefinition};
pub use policy::StylePolicy;
pub use resolve::{MAX_ALIAS_HOPS, normalize_reference};
