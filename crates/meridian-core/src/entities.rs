use meridian_protocol::EntityId;

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Generational storage for units and cities.
///
/// - Iteration is in ascending slot order, which is also creation order until a
///   slot is reused.
/// - A removed entity's id never resolves again, even after its slot is reused.
#[derive(Clone, Debug)]
pub struct EntityStore<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<T> EntityStore<T> {
    fn live_slot(&self, id: EntityId) -> Option<&Slot<T>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    pub fn insert(&mut self, value: T) -> EntityId {
        self.live += 1;
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    value: None,
                });
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.value = Some(value);
        EntityId::new(index, slot.generation)
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.live_slot(id)?.value.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?
            .value
            .as_mut()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Frees the slot and bumps its generation so `id` goes stale.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter_ordered(&self) -> impl Iterator<Item = (EntityId, &T)> {
        (0u32..)
            .zip(&self.slots)
            .filter_map(|(index, slot)| Some((EntityId::new(index, slot.generation), slot.value.as_ref()?)))
    }

    pub fn iter_ordered_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        (0u32..)
            .zip(self.slots.iter_mut())
            .filter_map(|(index, slot)| Some((EntityId::new(index, slot.generation), slot.value.as_mut()?)))
    }

    /// Ids of entities matching `pred`, collected so the caller may mutate the store.
    pub fn ids_where(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<EntityId> {
        self.iter_ordered()
            .filter_map(|(id, value)| pred(value).then_some(id))
            .collect()
    }
}
