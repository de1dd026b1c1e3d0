//! Generation pipeline - planner, synthesizer, corrector, and the
//! orchestrating retry loop.

pub mod corrector;
pub mod orchestrator;
pub mod planner;
pub mod synthesizer;

pub use corrector::Corrector;
pub use orchestrator::Pipeline;
pub use planner::Planner;
pub use synthesizer::CodeSynthesizer;
