use crate::generator::SimulatedReading;
use crate::space::{NodeSpace, SpaceError, WritableHandle};
use crate::tags::{TagName, TagTable};
use log::debug;

/// One named equipment and the writable handle for each of its tags.
#[derive(Debug)]
pub struct Equipment<H> {
    name: String,
    tags: TagTable<H>,
}

impl<H> Equipment<H> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &TagTable<H> {
        &self.tags
    }
}

impl<H: WritableHandle> Equipment<H> {
    /// Writes a full reading into this equipment's tags. All seven tags are
    /// written before the caller moves to the next equipment.
    pub fn apply(&mut self, reading: &SimulatedReading) -> Result<(), SpaceError> {
        for tag in TagName::ALL {
            self.tags[tag].set_value(reading[tag])?;
        }
        Ok(())
    }
}

/// The equipment entries created at startup, in `Equipment_1..N` order.
#[derive(Debug)]
pub struct Registry<H> {
    equipment: Vec<Equipment<H>>,
}

impl<H> Registry<H> {
    pub fn len(&self) -> usize {
        self.equipment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equipment<H>> {
        self.equipment.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Equipment<H>> {
        self.equipment.iter_mut()
    }
}

pub fn equipment_name(n: usize) -> String {
    format!("Equipment_{n}")
}

/// Creates `Equipment_1..Equipment_N`, one object node per equipment and one
/// variable (initial value 0) per tag. The first failure propagates; no
/// partial registry is returned.
pub fn build_registry<S: NodeSpace>(
    space: &mut S,
    count: usize,
) -> Result<Registry<S::Handle>, SpaceError> {
    let mut equipment = Vec::with_capacity(count);
    for n in 1..=count {
        let name = equipment_name(n);
        let object = space.add_object(&name)?;
        let tags = TagTable::try_from_fn(|tag| space.add_variable(&object, tag, 0.0))?;
        debug!("created {name} with {} tags", TagName::COUNT);
        equipment.push(Equipment { name, tags });
    }
    Ok(Registry { equipment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_space::MemSpace;

    #[test]
    fn builds_n_entries_with_the_full_tag_set() {
        let mut space = MemSpace::new();
        let registry = build_registry(&mut space, 5).unwrap();

        assert_eq!(registry.len(), 5);
        for (i, equipment) in registry.iter().enumerate() {
            assert_eq!(equipment.name(), format!("Equipment_{}", i + 1));
            assert_eq!(equipment.tags().iter().count(), TagName::COUNT);
        }
    }

    #[test]
    fn variables_start_at_zero() {
        let mut space = MemSpace::new();
        build_registry(&mut space, 2).unwrap();

        for n in 1..=2 {
            let name = equipment_name(n);
            for tag in TagName::ALL {
                assert_eq!(space.value(&name, tag), Some(0.0));
            }
        }
    }

    #[test]
    fn duplicate_object_name_fails_the_build() {
        let mut space = MemSpace::new();
        space.add_object("Equipment_1").unwrap();

        let result = build_registry(&mut space, 1);
        assert!(matches!(
            result,
            Err(SpaceError::ObjectCreate { name }) if name == "Equipment_1"
        ));
    }

    #[test]
    fn variable_failure_mid_build_propagates() {
        // Equipment_1 takes 7 variables; the failure lands on the third tag
        // of Equipment_2.
        let mut space = MemSpace::fail_variable_create_after(9);

        let result = build_registry(&mut space, 5);
        match result {
            Err(SpaceError::VariableCreate { object, tag }) => {
                assert_eq!(object, "Equipment_2");
                assert_eq!(tag, TagName::Torque);
            }
            other => panic!("expected VariableCreate error, got {other:?}"),
        }
        assert_eq!(space.total_writes(), 0);
    }
}
