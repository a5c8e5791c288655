/// Protocol constants consumed by the coordination core.
///
/// Values default to mainnet. The full set of chain parameters lives with
/// the external configuration loader; only the constants this repository
/// reads are carried here.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainSpec {
    /*
     * Subnet participation
     */
    pub attestation_subnet_count: u64,
    pub sync_committee_subnet_count: u64,
    pub subnets_per_node: u64,
    pub epochs_per_subnet_subscription: u64,
    pub node_id_bits: u64,
    pub attestation_subnet_prefix_bits: u64,

    /*
     * Shuffling and time
     */
    pub shuffle_round_count: u8,
    pub seconds_per_slot: u64,
}

impl ChainSpec {
    pub fn mainnet() -> Self {
        Self {
            attestation_subnet_count: 64,
            sync_committee_subnet_count: 4,
            subnets_per_node: 2,
            epochs_per_subnet_subscription: 256,
            node_id_bits: 256,
            attestation_subnet_prefix_bits: 6,
            shuffle_round_count: 90,
            seconds_per_slot: 12,
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        ChainSpec::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_covers_subnet_count() {
        let spec = ChainSpec::mainnet();
        // Every permuted prefix must land inside the subnet id space.
        assert!(1u64 << spec.attestation_subnet_prefix_bits >= spec.attestation_subnet_count);
    }
}
