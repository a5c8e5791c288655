/// Knobs for subnet peer discovery and broadcast gating.
#[derive(Clone, Debug)]
pub struct NetworkConfig {
    /// How many nodes to read from the discovery iterator per dial batch.
    pub min_peers_in_subnet_search: usize,
    /// Caps the dial batch size when set.
    pub max_concurrent_dials: Option<usize>,
    /// The peer count a subnet should reach before broadcasts are
    /// considered healthy.
    pub min_peers_per_subnet: usize,
    /// Appended to every gossip topic before querying pubsub.
    pub protocol_suffix: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            min_peers_in_subnet_search: 20,
            max_concurrent_dials: None,
            min_peers_per_subnet: 6,
            protocol_suffix: "/ssz_snappy".to_string(),
        }
    }
}
