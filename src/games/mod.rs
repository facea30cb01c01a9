pub mod blackjack;
pub mod combinatorics;
pub mod crash;
pub mod mines;
pub mod plinko;
pub mod processor;
pub mod random;
pub mod scratch;
pub mod slots;
pub mod types;
pub mod weighted;

pub use processor::GameProcessor;
pub use random::{SeededSource, SequenceSource, SharedSource, VerifiableSource};
pub use types::*;
