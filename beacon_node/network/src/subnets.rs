//! Reading and writing the subnet bitfield entries of ENRs.
//!
//! Both entries store the raw SSZ bitfield as an RLP byte string:
//! `attnets` is 64 bits wide, `syncnets` 4 bits. Decoding enforces the
//! exact byte width for the subnet count.

use crate::Error;
use alloy_rlp::{bytes::Bytes, BufMut, Decodable, Encodable};
use discv5::Enr;
use ssz::Encode;
use ssz_types::typenum::Unsigned;
use ssz_types::BitVector;
use types::{EnrAttestationBitfield, EnrSyncCommitteeBitfield, EthSpec};

pub const ATTESTATION_BITFIELD_ENR_KEY: &str = "attnets";
pub const SYNC_COMMITTEE_BITFIELD_ENR_KEY: &str = "syncnets";

/// The `attnets` ENR entry.
#[derive(Clone, Debug, PartialEq)]
pub struct AttestationBitfieldEntry<E: EthSpec>(pub EnrAttestationBitfield<E>);

impl<E: EthSpec> Encodable for AttestationBitfieldEntry<E> {
    fn encode(&self, out: &mut dyn BufMut) {
        Bytes::from(self.0.as_ssz_bytes()).encode(out);
    }
}

impl<E: EthSpec> Decodable for AttestationBitfieldEntry<E> {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let bytes = Bytes::decode(buf)?;
        let bitfield = BitVector::from_bytes(bytes.to_vec().into())
            .map_err(|_| alloy_rlp::Error::Custom("invalid attnets bitfield length"))?;
        Ok(Self(bitfield))
    }
}

/// The `syncnets` ENR entry.
#[derive(Clone, Debug, PartialEq)]
pub struct SyncCommitteeBitfieldEntry<E: EthSpec>(pub EnrSyncCommitteeBitfield<E>);

impl<E: EthSpec> Encodable for SyncCommitteeBitfieldEntry<E> {
    fn encode(&self, out: &mut dyn BufMut) {
        Bytes::from(self.0.as_ssz_bytes()).encode(out);
    }
}

impl<E: EthSpec> Decodable for SyncCommitteeBitfieldEntry<E> {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let bytes = Bytes::decode(buf)?;
        let bitfield = BitVector::from_bytes(bytes.to_vec().into())
            .map_err(|_| alloy_rlp::Error::Custom("invalid syncnets bitfield length"))?;
        Ok(Self(bitfield))
    }
}

/// Reads the attestation subnets entry from a node's ENR.
pub fn att_subnets<E: EthSpec>(enr: &Enr) -> Result<EnrAttestationBitfield<E>, Error> {
    match enr.get_decodable::<AttestationBitfieldEntry<E>>(ATTESTATION_BITFIELD_ENR_KEY) {
        Some(Ok(entry)) => Ok(entry.0),
        Some(Err(e)) => Err(Error::Enr(format!("invalid attnets entry: {:?}", e))),
        None => Err(Error::Enr("no attnets entry".to_string())),
    }
}

/// Reads the sync subnets entry from a node's ENR and returns the indices
/// of the sync committee subnets the node participates in.
pub fn sync_subnets<E: EthSpec>(enr: &Enr) -> Result<Vec<u64>, Error> {
    let bitfield = match enr
        .get_decodable::<SyncCommitteeBitfieldEntry<E>>(SYNC_COMMITTEE_BITFIELD_ENR_KEY)
    {
        Some(Ok(entry)) => entry.0,
        Some(Err(e)) => return Err(Error::Enr(format!("invalid syncnets entry: {:?}", e))),
        None => return Err(Error::Enr("no syncnets entry".to_string())),
    };
    Ok((0..E::SyncCommitteeSubnetCount::to_u64())
        .filter(|index| bitfield.get(*index as usize).unwrap_or(false))
        .collect())
}
