//! Identifies each sync committee subnet by an integer identifier.
use std::ops::{Deref, DerefMut};
use std::sync::LazyLock;

const MAX_SYNC_SUBNET_ID: usize = 4;

static SYNC_SUBNET_ID_TO_STRING: LazyLock<Vec<String>> = LazyLock::new(|| {
    let mut v = Vec::with_capacity(MAX_SYNC_SUBNET_ID);
    for i in 0..MAX_SYNC_SUBNET_ID {
        v.push(i.to_string());
    }
    v
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyncSubnetId(u64);

pub fn sync_subnet_id_to_string(i: u64) -> &'static str {
    if i < MAX_SYNC_SUBNET_ID as u64 {
        SYNC_SUBNET_ID_TO_STRING
            .get(i as usize)
            .expect("index below MAX_SYNC_SUBNET_ID")
    } else {
        "sync subnet id out of range"
    }
}

impl SyncSubnetId {
    pub fn new(id: u64) -> Self {
        id.into()
    }
}

impl Deref for SyncSubnetId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SyncSubnetId {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<u64> for SyncSubnetId {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

impl From<SyncSubnetId> for u64 {
    fn from(from: SyncSubnetId) -> u64 {
        from.0
    }
}

impl AsRef<str> for SyncSubnetId {
    fn as_ref(&self) -> &str {
        sync_subnet_id_to_string(self.0)
    }
}
