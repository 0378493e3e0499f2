// Softmatch: expand hand-written seed terms into weighted topic vocabularies.
//
// This is the library root. Topic terms are grown through word embedding
// neighbors (topics), looked up through a model adapter (model), and used to
// score free text (scoring).

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod scoring;
pub mod topics;
