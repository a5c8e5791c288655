pub use metrics::*;
use std::sync::LazyLock;

pub static SUBNET_PEER_SEARCHES: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "discovery_subnet_peer_searches",
        "Count of searches for peers on a particular subnet",
    )
});
pub static SUBNET_PEERS_DIALED: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "discovery_subnet_peers_dialed",
        "Count of dials made to peers discovered on a subnet",
    )
});
