pub mod generator;
mod generator_proptest;
#[cfg(feature = "simulation")]
pub mod mem_space;
pub mod registry;
pub mod space;
pub mod stats;
pub mod tags;
pub mod update_loop;

pub use generator::{generate_reading, SimulatedReading};
#[cfg(feature = "simulation")]
pub use mem_space::{MemHandle, MemSpace};
pub use registry::{build_registry, Equipment, Registry};
pub use space::{NodeSpace, SpaceError, WritableHandle};
pub use stats::{SharedStats, TickStats};
pub use tags::{TagName, TagTable};
pub use update_loop::{LoopConfig, RunState, UpdateLoop};
