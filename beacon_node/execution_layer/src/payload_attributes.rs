use crate::engine_api::Error;
use superstruct::superstruct;
use types::{Address, ForkName, Hash256, Withdrawal};

/// Attributes sent with a forkchoice update to ask the engine to start
/// building a payload for the next slot.
///
/// The variant is keyed by fork: `V1` for Bellatrix, `V2` for Capella
/// (withdrawals), `V3` for Deneb and Electra (parent beacon block root).
/// "No proposal intended" is expressed as `Option::None` at the call site,
/// not as a variant here.
#[superstruct(
    variants(V1, V2, V3),
    variant_attributes(derive(Clone, Debug, PartialEq, Eq)),
    cast_error(ty = "Error", expr = "Error::IncorrectStateVariant"),
    partial_getter_error(ty = "Error", expr = "Error::IncorrectStateVariant")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadAttributes {
    #[superstruct(getter(copy))]
    pub timestamp: u64,
    #[superstruct(getter(copy))]
    pub prev_randao: Hash256,
    #[superstruct(getter(copy))]
    pub suggested_fee_recipient: Address,
    #[superstruct(only(V2, V3))]
    pub withdrawals: Vec<Withdrawal>,
    #[superstruct(only(V3), partial_getter(copy))]
    pub parent_beacon_block_root: Hash256,
}

impl PayloadAttributes {
    /// The only constructor: picks the variant from `fork_name` and rejects
    /// field sets that do not match it.
    pub fn new(
        fork_name: ForkName,
        timestamp: u64,
        prev_randao: Hash256,
        suggested_fee_recipient: Address,
        withdrawals: Option<Vec<Withdrawal>>,
        parent_beacon_block_root: Option<Hash256>,
    ) -> Result<Self, Error> {
        match fork_name {
            ForkName::Bellatrix => {
                if withdrawals.is_some() || parent_beacon_block_root.is_some() {
                    return Err(Error::BadConversion(
                        "bellatrix attributes carry neither withdrawals nor a parent beacon block root"
                            .to_string(),
                    ));
                }
                Ok(PayloadAttributes::V1(PayloadAttributesV1 {
                    timestamp,
                    prev_randao,
                    suggested_fee_recipient,
                }))
            }
            ForkName::Capella => {
                if parent_beacon_block_root.is_some() {
                    return Err(Error::BadConversion(
                        "capella attributes carry no parent beacon block root".to_string(),
                    ));
                }
                let withdrawals = withdrawals.ok_or_else(|| {
                    Error::BadConversion("capella attributes require withdrawals".to_string())
                })?;
                Ok(PayloadAttributes::V2(PayloadAttributesV2 {
                    timestamp,
                    prev_randao,
                    suggested_fee_recipient,
                    withdrawals,
                }))
            }
            ForkName::Deneb | ForkName::Electra => {
                let withdrawals = withdrawals.ok_or_else(|| {
                    Error::BadConversion("deneb attributes require withdrawals".to_string())
                })?;
                let parent_beacon_block_root = parent_beacon_block_root.ok_or_else(|| {
                    Error::BadConversion(
                        "deneb attributes require a parent beacon block root".to_string(),
                    )
                })?;
                Ok(PayloadAttributes::V3(PayloadAttributesV3 {
                    timestamp,
                    prev_randao,
                    suggested_fee_recipient,
                    withdrawals,
                    parent_beacon_block_root,
                }))
            }
            fork => Err(Error::UnsupportedForkVariant(format!(
                "payload attributes do not exist at fork {}",
                fork
            ))),
        }
    }
}
