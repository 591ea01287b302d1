//! Quest engine: declarative quest definitions, trigger evaluation and
//! transactional reward collection.

mod catalog;
mod condition;
mod definition;
mod engine;
mod gate;
mod reward;
mod sequence;

pub use catalog::*;
pub use condition::*;
pub use definition::*;
pub use engine::*;
pub use reward::{Reward, RewardKind};
pub use sequence::*;
