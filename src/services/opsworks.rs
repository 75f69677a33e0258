//! The `aws_opsworks_*_layer` resource family.
//!
//! Every layer type shares one lifecycle; they differ only in the API type
//! identifier, the default layer name and the table of type-specific
//! attributes packed into the API's string map.

mod attributes;
mod error;
mod layer;
mod layer_types;
mod types;

pub use attributes::{AttrDefault, AttrKind, AttrValue, AttributeTable, Attributes, LayerAttribute};
pub use error::LayerError;
pub use layer::{LayerConfig, LayerService, LayerState};
pub use layer_types::{LAYER_TYPES, LayerType, SchemaAttribute, SchemaKind, lookup};
pub use types::{LayerBody, LifecycleEventConfiguration, Recipes, ShutdownEventConfiguration};
