//! Block hash type.

use crate::hash::digest_type;
use serde::{Deserialize, Serialize};
use std::fmt;

digest_type!(
    /// A 32-byte block hash identifying a block on the canonical chain.
    BlockHash
);
