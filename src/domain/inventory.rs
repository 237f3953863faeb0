//! VM inventory records and group filtering.

/// Group label for inventory rows that carry no group name.
pub const UNGROUPED: &str = "(ungrouped)";

/// One managed VM as described by the inventory source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRecord {
    /// Group the VM belongs to ([`UNGROUPED`] when the source left it blank).
    pub group: String,
    /// Target VM name, unique within the inventory.
    pub vm_name: String,
}

/// The loaded inventory, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    pub records: Vec<VmRecord>,
}

impl Inventory {
    /// Group names in first-appearance order.
    #[must_use]
    pub fn groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for record in &self.records {
            if !groups.contains(&record.group.as_str()) {
                groups.push(&record.group);
            }
        }
        groups
    }

    /// Records visible under the given group filter. An empty filter means
    /// every group.
    #[must_use]
    pub fn filtered(&self, groups: &[String]) -> Vec<&VmRecord> {
        self.records
            .iter()
            .filter(|r| groups.is_empty() || groups.iter().any(|g| g == &r.group))
            .collect()
    }

    /// Look up a record by VM name.
    #[must_use]
    pub fn find(&self, vm_name: &str) -> Option<&VmRecord> {
        self.records.iter().find(|r| r.vm_name == vm_name)
    }
}
