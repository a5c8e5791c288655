pub use metrics::*;
use std::sync::LazyLock;

pub static FORKCHOICE_UPDATED_VALID_NODE_COUNT: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| {
        try_create_int_counter(
            "forkchoice_updated_valid_node_count",
            "Count of fork choice updated calls where the engine returned VALID",
        )
    });
pub static FORKCHOICE_UPDATED_INVALID_NODE_COUNT: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| {
        try_create_int_counter(
            "forkchoice_updated_invalid_node_count",
            "Count of fork choice updated calls where the engine returned INVALID",
        )
    });
pub static FORKCHOICE_UPDATED_OPTIMISTIC_NODE_COUNT: LazyLock<Result<IntCounter>> =
    LazyLock::new(|| {
        try_create_int_counter(
            "forkchoice_updated_optimistic_node_count",
            "Count of fork choice updated calls where the engine was still syncing",
        )
    });
pub static NEW_PAYLOAD_VALID_NODE_COUNT: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "new_payload_valid_node_count",
        "Count of new payload calls where the engine returned VALID",
    )
});
pub static NEW_PAYLOAD_INVALID_NODE_COUNT: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "new_payload_invalid_node_count",
        "Count of new payload calls where the engine returned INVALID",
    )
});
pub static NEW_PAYLOAD_OPTIMISTIC_NODE_COUNT: LazyLock<Result<IntCounter>> = LazyLock::new(|| {
    try_create_int_counter(
        "new_payload_optimistic_node_count",
        "Count of new payload calls where the engine was still syncing",
    )
});
