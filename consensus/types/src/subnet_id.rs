//! Identifies each attestation subnet by an integer identifier.
use crate::{ChainSpec, Epoch, EthSpec, Uint256};
use std::ops::{Deref, DerefMut};
use std::sync::LazyLock;
use std::time::Duration;
use swap_or_not_shuffle::compute_shuffled_index;

const MAX_SUBNET_ID: usize = 64;

static SUBNET_ID_TO_STRING: LazyLock<Vec<String>> = LazyLock::new(|| {
    let mut v = Vec::with_capacity(MAX_SUBNET_ID);
    for i in 0..MAX_SUBNET_ID {
        v.push(i.to_string());
    }
    v
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubnetId(u64);

pub fn subnet_id_to_string(i: u64) -> &'static str {
    if i < MAX_SUBNET_ID as u64 {
        SUBNET_ID_TO_STRING
            .get(i as usize)
            .expect("index below MAX_SUBNET_ID")
    } else {
        "subnet id out of range"
    }
}

impl SubnetId {
    pub fn new(id: u64) -> Self {
        id.into()
    }

    /// Computes the set of subnets the node with `node_id` participates in
    /// during the subscription window containing `epoch`.
    ///
    /// The assignment is a pure function of `(node_id, epoch)` within a
    /// window of `EPOCHS_PER_SUBNET_SUBSCRIPTION` epochs.
    pub fn compute_subnets_for_epoch<E: EthSpec>(
        node_id: Uint256,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Result<Vec<SubnetId>, &'static str> {
        (0..spec.subnets_per_node)
            .map(|index| Self::compute_subscribed_subnet::<E>(node_id, epoch, index, spec))
            .collect()
    }

    /// Computes the `index`'th subscribed subnet for `node_id` at `epoch`.
    pub fn compute_subscribed_subnet<E: EthSpec>(
        node_id: Uint256,
        epoch: Epoch,
        index: u64,
        spec: &ChainSpec,
    ) -> Result<SubnetId, &'static str> {
        let (node_offset, node_id_prefix) = compute_offset_and_prefix(node_id, spec);

        let subscription_event_idx =
            (node_offset + epoch.as_u64()) / spec.epochs_per_subnet_subscription;
        let permutation_seed = ethereum_hashing::hash(&subscription_event_idx.to_le_bytes());

        let num_prefixes = 1usize << spec.attestation_subnet_prefix_bits;
        let permutated_prefix = compute_shuffled_index(
            node_id_prefix as usize,
            num_prefixes,
            &permutation_seed,
            spec.shuffle_round_count,
        )
        .ok_or("unable to shuffle")? as u64;

        Ok(SubnetId::new(
            (permutated_prefix + index) % spec.attestation_subnet_count,
        ))
    }

    /// How long the assignment computed at `epoch` remains valid.
    ///
    /// Strictly positive and at most one full subscription window.
    pub fn compute_subscription_expiration<E: EthSpec>(
        node_id: Uint256,
        epoch: Epoch,
        spec: &ChainSpec,
    ) -> Duration {
        let (node_offset, _) = compute_offset_and_prefix(node_id, spec);
        let past_epochs = (node_offset + epoch.as_u64()) % spec.epochs_per_subnet_subscription;
        let remaining_epochs = spec.epochs_per_subnet_subscription - past_epochs;
        let epoch_duration = E::slots_per_epoch() * spec.seconds_per_slot;
        Duration::from_secs(remaining_epochs * epoch_duration)
    }
}

/// Splits a 256-bit node id into the permutation offset and the
/// `ATTESTATION_SUBNET_PREFIX_BITS`-wide prefix.
fn compute_offset_and_prefix(node_id: Uint256, spec: &ChainSpec) -> (u64, u64) {
    let node_offset = (node_id % Uint256::from(spec.epochs_per_subnet_subscription)).as_u64();
    // The remaining bits fit a u64 for any sane prefix width.
    let rem_bits = spec.node_id_bits - spec.attestation_subnet_prefix_bits;
    let node_id_prefix = (node_id >> rem_bits as usize).as_u64();
    (node_offset, node_id_prefix)
}

impl Deref for SubnetId {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SubnetId {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<u64> for SubnetId {
    fn from(x: u64) -> Self {
        Self(x)
    }
}

impl From<SubnetId> for u64 {
    fn from(from: SubnetId) -> u64 {
        from.0
    }
}

impl From<&SubnetId> for u64 {
    fn from(from: &SubnetId) -> u64 {
        from.0
    }
}

impl AsRef<str> for SubnetId {
    fn as_ref(&self) -> &str {
        subnet_id_to_string(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MainnetEthSpec;

    fn node_id_from_bytes(bytes: &[u8]) -> Uint256 {
        Uint256::from_big_endian(bytes)
    }

    fn fixed_node_id() -> Uint256 {
        let bytes = hex::decode("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef")
            .unwrap();
        node_id_from_bytes(&bytes)
    }

    #[test]
    fn subnets_are_in_range() {
        let spec = ChainSpec::mainnet();
        for seed in 0u64..32 {
            let node_id = Uint256::from(seed) * Uint256::from(u64::MAX);
            let subnets = SubnetId::compute_subnets_for_epoch::<MainnetEthSpec>(
                node_id,
                Epoch::new(seed * 1000),
                &spec,
            )
            .unwrap();
            assert_eq!(subnets.len(), spec.subnets_per_node as usize);
            for subnet in subnets {
                assert!(*subnet < spec.attestation_subnet_count);
            }
        }
    }

    #[test]
    fn assignment_is_reproducible() {
        let spec = ChainSpec::mainnet();
        let epoch = Epoch::new(12345);
        let first =
            SubnetId::compute_subnets_for_epoch::<MainnetEthSpec>(fixed_node_id(), epoch, &spec)
                .unwrap();
        let second =
            SubnetId::compute_subnets_for_epoch::<MainnetEthSpec>(fixed_node_id(), epoch, &spec)
                .unwrap();
        assert_eq!(first, second);
        // The assignment is `SUBNETS_PER_NODE` consecutive ids mod the
        // subnet count.
        assert_eq!(
            (*first[0] + 1) % spec.attestation_subnet_count,
            *first[1] % spec.attestation_subnet_count
        );
    }

    #[test]
    fn assignment_is_stable_within_window() {
        let spec = ChainSpec::mainnet();
        let node_id = fixed_node_id();
        let node_offset = (node_id % Uint256::from(spec.epochs_per_subnet_subscription)).as_u64();

        // Pick an epoch in the middle of a subscription window so that both
        // neighbours share the window.
        let window = spec.epochs_per_subnet_subscription;
        let epoch = Epoch::new(10 * window + window / 2 - node_offset % window);
        let at = |e: Epoch| {
            SubnetId::compute_subnets_for_epoch::<MainnetEthSpec>(node_id, e, &spec).unwrap()
        };
        assert_eq!(at(epoch), at(epoch + 1));
        assert_eq!(at(epoch), at(epoch - 1));
    }

    #[test]
    fn expiration_is_positive_and_bounded() {
        let spec = ChainSpec::mainnet();
        let max = Duration::from_secs(
            spec.epochs_per_subnet_subscription
                * MainnetEthSpec::slots_per_epoch()
                * spec.seconds_per_slot,
        );
        for epoch in [0u64, 1, 255, 256, 12345, 1 << 40] {
            let expiration = SubnetId::compute_subscription_expiration::<MainnetEthSpec>(
                fixed_node_id(),
                Epoch::new(epoch),
                &spec,
            );
            assert!(expiration > Duration::ZERO);
            assert!(expiration <= max);
        }
    }

    #[test]
    fn expiration_counts_down_across_the_window() {
        let spec = ChainSpec::mainnet();
        let node_id = fixed_node_id();
        let epoch_duration =
            Duration::from_secs(MainnetEthSpec::slots_per_epoch() * spec.seconds_per_slot);
        let first = SubnetId::compute_subscription_expiration::<MainnetEthSpec>(
            node_id,
            Epoch::new(1000),
            &spec,
        );
        let second = SubnetId::compute_subscription_expiration::<MainnetEthSpec>(
            node_id,
            Epoch::new(1001),
            &spec,
        );
        if first > epoch_duration {
            assert_eq!(first - epoch_duration, second);
        } else {
            // Window rolled over; the expiration resets to the full window.
            assert_eq!(
                second,
                Duration::from_secs(
                    spec.epochs_per_subnet_subscription
                        * MainnetEthSpec::slots_per_epoch()
                        * spec.seconds_per_slot
                )
            );
        }
    }
}
