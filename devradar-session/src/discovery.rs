use devradar_model::{Dev, DevId};

/// Devs found by the last query plus everything pushed since.
///
/// Insertion order is kept. Uniqueness by id is not enforced by [`append`];
/// [`upsert`] is the opt-in merge used by `DiscoveryPolicy::MergeById`.
///
/// [`append`]: DiscoverySet::append
/// [`upsert`]: DiscoverySet::upsert
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoverySet {
    devs: Vec<Dev>,
}

impl DiscoverySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wholesale replace with a fresh query result.
    pub fn replace_all(&mut self, devs: Vec<Dev>) {
        self.devs = devs;
    }

    pub fn append(&mut self, dev: Dev) {
        self.devs.push(dev);
    }

    /// Replace the first entry sharing `dev.id`, or append when there is none.
    /// Returns `true` when an existing entry was replaced.
    pub fn upsert(&mut self, dev: Dev) -> bool {
        match self.devs.iter_mut().find(|existing| existing.id == dev.id) {
            Some(existing) => {
                *existing = dev;
                true
            }
            None => {
                self.devs.push(dev);
                false
            }
        }
    }

    pub fn get(&self, id: &DevId) -> Option<&Dev> {
        self.devs.iter().find(|dev| &dev.id == id)
    }

    pub fn len(&self) -> usize {
        self.devs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dev> {
        self.devs.iter()
    }

    pub fn as_slice(&self) -> &[Dev] {
        &self.devs
    }

    pub fn ids(&self) -> Vec<DevId> {
        self.devs.iter().map(|dev| dev.id.clone()).collect()
    }
}

impl<'a> IntoIterator for &'a DiscoverySet {
    type Item = &'a Dev;
    type IntoIter = std::slice::Iter<'a, Dev>;

    fn into_iter(self) -> Self::IntoIter {
        self.devs.iter()
    }
}
