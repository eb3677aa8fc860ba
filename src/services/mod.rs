// Link tree services
// Stateless engines: ids, normalization, tree lookup and edits, search,
// text format, url hints, settings and file binding.

pub mod file_binding;
pub mod id_generator;
pub mod normalizer;
pub mod settings_engine;
pub mod text_codec;
pub mod tree_filter;
pub mod tree_index;
pub mod tree_ops;
pub mod url_hint;
