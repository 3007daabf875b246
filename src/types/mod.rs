//! Value types shared by the runtime modules
//!
//! Bounded integers and coin sets, fixed-point decimals and the three address
//! kinds (account, validator operator, consensus).

pub mod address;
pub mod coin;
pub mod dec;

pub use address::{AccAddress, ConsAddress, ValAddress, ADDRESS_CHECK_SUM_LEN, ADDRESS_LEN};
pub use coin::{validate_denom, Coin, Coins, Int, MAX_INT_BITS};
pub use dec::{Dec, DEC_PRECISION};
