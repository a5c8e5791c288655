//! Fake discovery, pubsub and dialer implementations for testing the
//! subnet service without a network.

use crate::{
    Discovery, NetworkConfig, PeerDialer, PeerInfo, SubnetService, TopicPeers,
};
use alloy_rlp::bytes::Bytes;
use async_trait::async_trait;
use discv5::enr::CombinedKey;
use discv5::Enr;
use libp2p::PeerId;
use parking_lot::Mutex;
use sloggers::{null::NullLoggerBuilder, Build};
use std::collections::HashMap;
use std::sync::Arc;
use types::{ChainSpec, MainnetEthSpec};

pub type E = MainnetEthSpec;

/// A discovery listener over a fixed queue of records.
pub struct FakeDiscovery {
    enr_key: CombinedKey,
    local_enr: Mutex<Enr>,
    nodes: Mutex<Vec<Enr>>,
}

impl FakeDiscovery {
    pub fn new() -> Self {
        let enr_key = CombinedKey::generate_secp256k1();
        let local_enr = Enr::builder().build(&enr_key).expect("enr should build");
        Self {
            enr_key,
            local_enr: Mutex::new(local_enr),
            nodes: Mutex::new(vec![]),
        }
    }

    pub fn set_nodes(&self, nodes: Vec<Enr>) {
        *self.nodes.lock() = nodes;
    }

    pub fn push_node(&self, node: Enr) {
        self.nodes.lock().push(node);
    }
}

impl Discovery for FakeDiscovery {
    fn random_nodes(&self) -> Box<dyn Iterator<Item = Enr> + Send> {
        Box::new(self.nodes.lock().clone().into_iter())
    }

    fn local_enr(&self) -> Enr {
        self.local_enr.lock().clone()
    }

    fn enr_insert(&self, key: &str, value: &[u8]) -> Result<(), String> {
        self.local_enr
            .lock()
            .insert(key, &Bytes::copy_from_slice(value), &self.enr_key)
            .map(|_| ())
            .map_err(|e| format!("{:?}", e))
    }
}

/// A combined fake pubsub router and transport dialer. Dialed peers join
/// the configured topic, so searches can observe progress.
#[derive(Default)]
pub struct FakeNetwork {
    topic_peers: Mutex<HashMap<String, Vec<PeerId>>>,
    join_topic_on_connect: Mutex<Option<String>>,
    fail_conversions: Mutex<usize>,
    pub peer_info_calls: Mutex<usize>,
    dials: Mutex<usize>,
    in_flight: Mutex<usize>,
    max_in_flight: Mutex<usize>,
}

impl FakeNetwork {
    pub fn add_topic_peers(&self, topic: &str, count: usize) {
        let mut peers = self.topic_peers.lock();
        let entry = peers.entry(topic.to_string()).or_default();
        for _ in 0..count {
            entry.push(PeerId::random());
        }
    }

    /// Peers successfully dialed are added to `topic`.
    pub fn join_on_connect(&self, topic: &str) {
        *self.join_topic_on_connect.lock() = Some(topic.to_string());
    }

    /// The next `count` conversion attempts yield no address.
    pub fn fail_conversions(&self, count: usize) {
        *self.fail_conversions.lock() = count;
    }

    pub fn dial_count(&self) -> usize {
        *self.dials.lock()
    }

    pub fn max_in_flight(&self) -> usize {
        *self.max_in_flight.lock()
    }
}

impl TopicPeers for FakeNetwork {
    fn list_peers(&self, topic: &str) -> Vec<PeerId> {
        self.topic_peers
            .lock()
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PeerDialer for FakeNetwork {
    fn peer_info(&self, _enr: &Enr) -> Option<PeerInfo> {
        *self.peer_info_calls.lock() += 1;
        let mut failures = self.fail_conversions.lock();
        if *failures > 0 {
            *failures -= 1;
            return None;
        }
        Some(PeerInfo {
            peer_id: PeerId::random(),
            multiaddrs: vec![],
        })
    }

    async fn connect_with_peer(&self, info: PeerInfo) -> Result<(), String> {
        {
            let mut in_flight = self.in_flight.lock();
            *in_flight += 1;
            let mut max = self.max_in_flight.lock();
            *max = std::cmp::max(*max, *in_flight);
        }
        tokio::task::yield_now().await;
        {
            let mut in_flight = self.in_flight.lock();
            *in_flight -= 1;
        }
        *self.dials.lock() += 1;
        if let Some(topic) = self.join_topic_on_connect.lock().clone() {
            self.topic_peers
                .lock()
                .entry(topic)
                .or_default()
                .push(info.peer_id);
        }
        Ok(())
    }
}

pub struct TestRig {
    pub service: Arc<SubnetService<E>>,
    pub discovery: Arc<FakeDiscovery>,
    pub network: Arc<FakeNetwork>,
}

impl TestRig {
    pub fn new() -> Self {
        Self::with_config(NetworkConfig::default())
    }

    pub fn with_config(config: NetworkConfig) -> Self {
        let discovery = Arc::new(FakeDiscovery::new());
        let network = Arc::new(FakeNetwork::default());
        let log = NullLoggerBuilder.build().expect("logger should build");
        let service = Arc::new(SubnetService::<E>::new(
            Some(discovery.clone()),
            network.clone(),
            network.clone(),
            config,
            ChainSpec::mainnet(),
            &log,
        ));
        Self {
            service,
            discovery,
            network,
        }
    }

    pub fn without_discovery() -> Self {
        let network = Arc::new(FakeNetwork::default());
        let log = NullLoggerBuilder.build().expect("logger should build");
        let service = Arc::new(SubnetService::<E>::new(
            None,
            network.clone(),
            network.clone(),
            NetworkConfig::default(),
            ChainSpec::mainnet(),
            &log,
        ));
        Self {
            service,
            discovery: Arc::new(FakeDiscovery::new()),
            network,
        }
    }
}
