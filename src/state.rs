//! Default `state` generator for the authorization redirect.
//!
//! WeChat echoes `state` back on the callback untouched, so it only has to be
//! unique per authorization attempt. We use time-based (version 1) UUIDs with a
//! random node id chosen once per process.

use std::sync::OnceLock;

use uuid::Uuid;

/// Generate a fresh opaque state value (hyphenated v1 UUID).
pub fn generate_state() -> String {
    Uuid::now_v1(node_id()).to_string()
}

fn node_id() -> &'static [u8; 6] {
    static NODE: OnceLock<[u8; 6]> = OnceLock::new();
    NODE.get_or_init(|| {
        let random = Uuid::new_v4();
        let mut node = [0u8; 6];
        node.copy_from_slice(&random.as_bytes()[..6]);
        // multicast bit marks a random (non-MAC) node id
        node[0] |= 0x01;
        node
    })
}
