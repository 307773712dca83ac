//! Greedy bone-limited polygon partitioning
//!
//! Skinned geometry must be split so that no draw group references more
//! distinct bones than the hardware palette holds. Polygons are assigned
//! first-fit to the earliest group that can take their bone set; a new
//! group is opened when none can. After partitioning, each group freezes
//! into a dense global-to-local bone remap table.
//!
//! Local slot numbering is ascending by global bone index. This is the
//! contract: remap order is deterministic and independent of insertion
//! history.

use std::collections::BTreeSet;

/// A polygon whose own bone set cannot fit any group.
///
/// This is a configuration error on the caller's side (too many influences
/// per vertex for the chosen capacity); it is reported loudly instead of
/// producing an over-capacity group.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("polygon {polygon} references {bones} distinct bones, group capacity is {capacity}")]
pub struct PartitionError {
    pub polygon: usize,
    pub bones: usize,
    pub capacity: usize,
}

/// A set of polygons constrained to a fixed number of distinct bones.
#[derive(Debug, Clone)]
pub struct BoneGroup {
    capacity: usize,
    bones: BTreeSet<u32>,
    remap: Option<Vec<i32>>,
}

impl BoneGroup {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            bones: BTreeSet::new(),
            remap: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admitted global bone indices, ascending.
    pub fn bones(&self) -> impl Iterator<Item = u32> + '_ {
        self.bones.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Try to take a polygon's bone set.
    ///
    /// Merges `required` and succeeds when the union fits the capacity.
    /// A full group still accepts (read-only) a polygon whose bones it
    /// already holds; everything else is rejected without mutation.
    pub fn admit(&mut self, required: &BTreeSet<u32>) -> bool {
        debug_assert!(self.remap.is_none(), "admit on a frozen group");

        let union_len = self.bones.union(required).count();
        if union_len <= self.capacity {
            self.bones.extend(required.iter().copied());
            true
        } else if self.bones.len() >= self.capacity {
            required.is_subset(&self.bones)
        } else {
            false
        }
    }

    /// Freeze the group and build the dense remap table: one slot per
    /// admitted bone in ascending global order, sized `max(bones) + 1`,
    /// `-1` in unused entries. Further `admit` calls are invalid.
    pub fn remap(&mut self) -> &[i32] {
        if self.remap.is_none() {
            let table = match self.bones.iter().next_back() {
                Some(&max) => {
                    let mut table = vec![-1; max as usize + 1];
                    for (slot, &bone) in self.bones.iter().enumerate() {
                        table[bone as usize] = slot as i32;
                    }
                    table
                }
                None => Vec::new(),
            };
            self.remap = Some(table);
        }
        self.remap.as_deref().unwrap()
    }

    /// Local slot of a global bone index, once frozen.
    pub fn local_index(&self, global: u32) -> Option<u32> {
        let table = self.remap.as_deref()?;
        match table.get(global as usize) {
            Some(&slot) if slot >= 0 => Some(slot as u32),
            _ => None,
        }
    }
}

/// Result of partitioning one material's polygons.
#[derive(Debug)]
pub struct Partition {
    pub groups: Vec<BoneGroup>,
    /// Group index per polygon, in input order.
    pub polygon_groups: Vec<usize>,
}

/// Assign each polygon (given as its set of referenced bone indices) to a
/// bone-limited group, first-fit over groups in creation order.
pub fn partition(
    polygons: &[BTreeSet<u32>],
    capacity: usize,
) -> Result<Partition, PartitionError> {
    let mut groups: Vec<BoneGroup> = Vec::new();
    let mut polygon_groups = Vec::with_capacity(polygons.len());

    for (polygon, required) in polygons.iter().enumerate() {
        if required.len() > capacity {
            return Err(PartitionError {
                polygon,
                bones: required.len(),
                capacity,
            });
        }

        let slot = match groups.iter_mut().position(|g| g.admit(required)) {
            Some(slot) => slot,
            None => {
                let mut group = BoneGroup::new(capacity);
                let admitted = group.admit(required);
                debug_assert!(admitted, "fresh group rejected a fitting polygon");
                groups.push(group);
                groups.len() - 1
            }
        };
        polygon_groups.push(slot);
    }

    Ok(Partition {
        groups,
        polygon_groups,
    })
}
