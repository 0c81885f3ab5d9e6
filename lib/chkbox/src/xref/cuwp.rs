use crate::error::{Entity, Result};
use crate::rich::CuwpSlot;
use crate::section::{CuwpSlotsSection, CuwpUsageSection, CUWP_SLOT_COUNT};
use crate::xref::slots::{Allocation, SlotTable};

#[derive(Clone, Debug)]
pub struct CuwpLookup {
  table: SlotTable<CuwpSlot>,
}

impl CuwpLookup {
  pub fn empty() -> Self {
    Self {
      table: SlotTable::new(Entity::CuwpSlot, 1, CUWP_SLOT_COUNT),
    }
  }

  /// All 64 slots, so any slot id a trigger names resolves. Without a section every slot is
  /// blank.
  pub fn build(section: Option<&CuwpSlotsSection>) -> Result<Self> {
    let slots = (1..=CUWP_SLOT_COUNT as u32).map(|id| match section {
      Some(section) => CuwpSlot::from_record(&section.slots[id as usize - 1], id),
      None => CuwpSlot {
        index: Some(id),
        ..CuwpSlot::default()
      },
    });
    Self::rebuild(slots)
  }

  /// A fresh table holding `slots`, in order. Templates equal up to their index collapse into
  /// one slot.
  pub fn rebuild(slots: impl IntoIterator<Item = CuwpSlot>) -> Result<Self> {
    Ok(Self::empty().add(slots).finish()?.into())
  }

  pub fn len(&self) -> usize {
    self.table.len()
  }

  pub fn is_empty(&self) -> bool {
    self.table.is_empty()
  }

  pub fn get(&self, id: u32) -> Option<&CuwpSlot> {
    self.table.get(id)
  }

  pub fn id_of(&self, slot: &CuwpSlot) -> Option<u32> {
    self.table.id_of(slot)
  }

  pub fn iter(&self) -> impl Iterator<Item = (u32, &CuwpSlot)> {
    self.table.iter()
  }

  pub fn add(&self, candidates: impl IntoIterator<Item = CuwpSlot>) -> Allocation<CuwpSlot> {
    self.table.add(candidates)
  }

  /// Writes the occupied slots over `base`, which supplies the bytes of every free slot, and
  /// marks exactly the occupied ones as used.
  pub fn to_sections(&self, base: &[CuwpSlot]) -> (CuwpSlotsSection, CuwpUsageSection) {
    let mut slots = CuwpSlotsSection::default();
    let mut usage = CuwpUsageSection::default();

    for (position, slot) in base.iter().take(CUWP_SLOT_COUNT).enumerate() {
      slots.slots[position] = slot.to_record();
    }
    for (id, slot) in self.iter() {
      let position = id as usize - 1;
      slots.slots[position] = slot.to_record();
      usage.used[position] = 1;
    }

    (slots, usage)
  }
}

impl From<SlotTable<CuwpSlot>> for CuwpLookup {
  fn from(table: SlotTable<CuwpSlot>) -> Self {
    Self { table }
  }
}
