//=========================================================================
// Handle Table
//=========================================================================
//
// Generation-checked slot table backing the opaque ABI handles.
//
// Architecture:
//   insert(value) → EngineHandle { slot index + 1 | generation << 32 }
//   get(handle)   → Some(&value) iff slot occupied and generation matches
//   remove(handle)→ frees slot, bumps generation (old handle goes stale)
//
// The raw value 0 is never produced, so it is free to act as null.
//
//=========================================================================

//=== EngineHandle ========================================================

/// Opaque handle for a running engine, passed by value across the ABI.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(u64);

impl EngineHandle {
    pub const NULL: EngineHandle = EngineHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    fn new(index: usize, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64 + 1))
    }

    /// Splits the handle into (slot index, generation); `None` for null.
    fn parts(self) -> Option<(usize, u32)> {
        let low = (self.0 & 0xFFFF_FFFF) as usize;
        if low == 0 {
            return None;
        }
        Some((low - 1, (self.0 >> 32) as u32))
    }
}

//=== Slot ================================================================

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

//=== HandleTable =========================================================

/// Slot table whose handles go stale once their entry is removed.
#[derive(Debug)]
pub struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> HandleTable<T> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores `value` and returns its handle.
    pub fn insert(&mut self, value: T) -> EngineHandle {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.value = Some(value);
                EngineHandle::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot { generation: 0, value: Some(value) });
                EngineHandle::new(self.slots.len() - 1, 0)
            }
        }
    }

    pub fn get(&self, handle: EngineHandle) -> Option<&T> {
        let (index, generation) = handle.parts()?;
        self.slots
            .get(index)
            .filter(|slot| slot.generation == generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Removes the entry; the handle (and every copy of it) goes stale.
    pub fn remove(&mut self, handle: EngineHandle) -> Option<T> {
        let (index, generation) = handle.parts()?;
        let slot = self.slots.get_mut(index)?;
        if slot.generation != generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index);
        Some(value)
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
