use crate::particle::{Group, Particle, ParticleId};

struct Slot {
    generation: u32,
    particle: Option<Particle>,
}

/// Generational arena that owns every live particle.
///
/// Freed slots are reused with a bumped generation, so a handle to a deleted
/// particle never resolves to its successor. `order` keeps registration order
/// for enumeration.
#[derive(Default)]
pub(crate) struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<ParticleId>,
}

impl Registry {
    pub(crate) fn insert(&mut self, build: impl FnOnce(ParticleId) -> Particle) -> ParticleId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.generation = slot.generation.wrapping_add(1);
                ParticleId { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, particle: None });
                ParticleId { index, generation: 0 }
            }
        };
        self.slots[id.index as usize].particle = Some(build(id));
        self.order.push(id);
        id
    }

    pub(crate) fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let particle = slot.particle.take()?;
        self.free.push(id.index);
        self.order.retain(|&other| other != id);
        Some(particle)
    }

    pub(crate) fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.particle.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.particle.as_mut())
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn ids(&self) -> &[ParticleId] {
        &self.order
    }

    /// Live particles in registration order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.order.iter().filter_map(move |&id| self.get(id))
    }
}

/// Rosters of the pairwise interaction groups, in registration order.
#[derive(Debug, Default)]
pub(crate) struct Groups {
    gravity: Vec<ParticleId>,
    charge: Vec<ParticleId>,
    cohesion: Vec<ParticleId>,
}

impl Groups {
    pub(crate) fn members(&self, group: Group) -> &[ParticleId] {
        match group {
            Group::Gravity => &self.gravity,
            Group::Charge => &self.charge,
            Group::Cohesion => &self.cohesion,
        }
    }

    pub(crate) fn enroll(&mut self, group: Group, id: ParticleId) {
        self.roster_mut(group).push(id);
    }

    pub(crate) fn withdraw(&mut self, group: Group, id: ParticleId) {
        self.roster_mut(group).retain(|&member| member != id);
    }

    fn roster_mut(&mut self, group: Group) -> &mut Vec<ParticleId> {
        match group {
            Group::Gravity => &mut self.gravity,
            Group::Charge => &mut self.charge,
            Group::Cohesion => &mut self.cohesion,
        }
    }
}
