use crate::tags::TagTable;
use rand::Rng;

/// One freshly sampled value per tag. Produced per equipment per tick and
/// consumed by a single write pass; never retained.
pub type SimulatedReading = TagTable<f64>;

/// Samples a full reading, each tag uniform within its inclusive range.
///
/// The RNG is passed in so seeded runs are reproducible.
pub fn generate_reading<R: Rng + ?Sized>(rng: &mut R) -> SimulatedReading {
    TagTable::from_fn(|tag| rng.random_range(tag.range()))
}
